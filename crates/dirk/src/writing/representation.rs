// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binding::{Binding, BindingGraph, RequestKind};

/// How generated code obtains the value of a binding for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingRepresentation {
    /// The creation expression is inlined at the request site.
    DirectInstance,
    /// A private method of the component wraps the creation expression.
    PrivateMethod,
    /// A lazily initialized framework field; instances are derived with `get()`.
    FrameworkInstance,
}

/// Chooses the representation for a request of `binding`.
///
/// `usages` is the number of instance requests for the binding within the requesting shard.
#[must_use]
pub fn select_representation(binding: &Binding, request: RequestKind, graph: &BindingGraph, usages: usize) -> BindingRepresentation {
    if request.framework_type().is_some() || needs_framework_instance(binding, graph) {
        return BindingRepresentation::FrameworkInstance;
    }
    if request == RequestKind::MembersInjection || binding.requires_method_encapsulation() || usages > 1 {
        return BindingRepresentation::PrivateMethod;
    }
    BindingRepresentation::DirectInstance
}

/// Returns `true` if even instance requests must go through the framework instance: the value
/// is cached, produced asynchronously, or needed lazily to break a cycle.
#[must_use]
pub fn needs_framework_instance(binding: &Binding, graph: &BindingGraph) -> bool {
    binding.is_scoped() || binding.is_production() || graph.is_on_cycle(binding.key())
}
