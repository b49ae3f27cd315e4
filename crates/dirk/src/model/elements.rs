// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use indexmap::IndexMap;

use super::{TypeElement, TypeName, TypeRef};

/// Read-only queries over the declarations of one compilation unit.
///
/// This is the only way the generator observes user code. Implementations are expected to be
/// cheap to query repeatedly; nothing is cached on the generator side.
pub trait Elements: Debug {
    /// Looks up a declared type by its qualified name.
    fn type_element(&self, name: &TypeName) -> Option<&TypeElement>;

    /// All declared types, in discovery order.
    fn type_elements(&self) -> Box<dyn Iterator<Item = &TypeElement> + '_>;

    /// The direct supertypes (superclass first, then traits) of a declared type.
    fn direct_supertypes(&self, name: &TypeName) -> Vec<TypeRef> {
        self.type_element(name)
            .map(|element| element.superclass().into_iter().chain(element.interfaces()).cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `sub` is `sup` or transitively extends/implements it.
    ///
    /// Only type names are compared; type arguments are ignored.
    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        let (Some(sub_name), Some(sup_name)) = (sub.name(), sup.name()) else {
            return sub == sup;
        };

        let mut pending = vec![sub_name.clone()];
        let mut seen = Vec::new();
        while let Some(name) = pending.pop() {
            if &name == sup_name {
                return true;
            }
            if seen.contains(&name) {
                continue;
            }
            pending.extend(self.direct_supertypes(&name).iter().filter_map(TypeRef::name).cloned());
            seen.push(name);
        }
        false
    }
}

/// An in-memory [`Elements`] implementation.
#[derive(Clone, Debug, Default)]
pub struct ElementModel {
    types: IndexMap<TypeName, TypeElement>,
}

impl ElementModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type, replacing any previous declaration with the same name.
    #[must_use]
    pub fn with_type(mut self, element: TypeElement) -> Self {
        self.add(element);
        self
    }

    /// Adds a type, replacing any previous declaration with the same name.
    pub fn add(&mut self, element: TypeElement) {
        self.types.insert(element.name().clone(), element);
    }

    /// The number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Elements for ElementModel {
    fn type_element(&self, name: &TypeName) -> Option<&TypeElement> {
        self.types.get(name)
    }

    fn type_elements(&self) -> Box<dyn Iterator<Item = &TypeElement> + '_> {
        Box::new(self.types.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_walks_superclasses_and_traits() {
        let model = ElementModel::new()
            .with_type(TypeElement::trait_type("app::Service"))
            .with_type(TypeElement::class("app::Base").implementing(TypeRef::declared("app::Service")))
            .with_type(TypeElement::class("app::Impl").with_superclass(TypeRef::declared("app::Base")));

        assert!(model.is_subtype(&TypeRef::declared("app::Impl"), &TypeRef::declared("app::Service")));
        assert!(model.is_subtype(&TypeRef::declared("app::Impl"), &TypeRef::declared("app::Impl")));
        assert!(!model.is_subtype(&TypeRef::declared("app::Service"), &TypeRef::declared("app::Impl")));
    }

    #[test]
    fn discovery_order_is_preserved() {
        let model = ElementModel::new()
            .with_type(TypeElement::class("app::B"))
            .with_type(TypeElement::class("app::A"));

        let names: Vec<_> = model.type_elements().map(|element| element.name().as_str()).collect();
        assert_eq!(names, ["app::B", "app::A"]);
    }
}
