// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use indexmap::{IndexMap, IndexSet};

use crate::model::TypeName;

use super::{Binding, ComponentDescriptor, Key};

/// The resolved bindings of one component and, recursively, its subcomponents.
///
/// Built once by [`BindingGraphFactory`](super::BindingGraphFactory) and never modified.
#[derive(Clone, Debug)]
pub struct BindingGraph {
    pub(crate) component: ComponentDescriptor,
    pub(crate) bindings: IndexMap<Key, Binding>,
    pub(crate) members_injection_bindings: IndexMap<Key, Binding>,
    pub(crate) inherited: IndexMap<Key, usize>,
    pub(crate) cycle_keys: IndexSet<Key>,
    pub(crate) children: Vec<BindingGraph>,
}

impl BindingGraph {
    /// The component this graph is for.
    #[must_use]
    pub fn component(&self) -> &ComponentDescriptor {
        &self.component
    }

    /// The bindings owned by this component, in discovery order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// The binding owned by this component for a key.
    #[must_use]
    pub fn binding(&self, key: &Key) -> Option<&Binding> {
        self.bindings.get(key)
    }

    /// The position of a binding in discovery order.
    #[must_use]
    pub fn binding_index(&self, key: &Key) -> Option<usize> {
        self.bindings.get_index_of(key)
    }

    /// The members injection binding for a type.
    #[must_use]
    pub fn members_injection_binding(&self, key: &Key) -> Option<&Binding> {
        self.members_injection_bindings.get(key)
    }

    /// The members injection bindings, in discovery order.
    pub fn members_injection_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.members_injection_bindings.values()
    }

    /// How many components up the owner of a key is: 0 for this component.
    #[must_use]
    pub fn owner_distance(&self, key: &Key) -> Option<usize> {
        if self.bindings.contains_key(key) {
            Some(0)
        } else {
            self.inherited.get(key).copied()
        }
    }

    /// Keys resolved by an ancestor, with the distance to the owning ancestor.
    pub fn inherited_keys(&self) -> impl Iterator<Item = (&Key, usize)> {
        self.inherited.iter().map(|(key, distance)| (key, *distance))
    }

    /// Returns `true` if the key is on a dependency cycle within this component.
    #[must_use]
    pub fn is_on_cycle(&self, key: &Key) -> bool {
        self.cycle_keys.contains(key)
    }

    /// The keys on dependency cycles.
    pub fn cycle_keys(&self) -> impl Iterator<Item = &Key> {
        self.cycle_keys.iter()
    }

    /// The subcomponent graphs.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The graph of the named direct subcomponent.
    #[must_use]
    pub fn child(&self, name: &TypeName) -> Option<&Self> {
        self.children.iter().find(|child| child.component.type_name() == name)
    }
}
