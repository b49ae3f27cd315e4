// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Keys, bindings and the resolved binding graph of a component.
//!
//! A [`ComponentDescriptor`] describes what a component declares. The [`BindingGraphFactory`]
//! turns it into a [`BindingGraph`] by resolving every entry point, transitively, against the
//! installed modules, the `@Inject` constructors and the bindings of ancestor components.

mod bindings;
mod component;
mod declarations;
mod graph;
mod key;
mod map_type;
mod request;
mod resolver;

pub use bindings::{
    Argument, AssistedFactoryMethod, AssistedParameter, Binding, BindingKind, BindingSource, BindingType, ContributionType,
    InjectionSite, MultibindingEntry, Scope,
};
pub use component::{ComponentDescriptor, EntryPoint, EntryPointKind};
pub use declarations::{Declaration, ModuleDeclarations};
pub use graph::BindingGraph;
pub use key::{ContributionId, Key, KeyTag};
pub use map_type::{MapType, SetType, map_of, set_of};
pub use request::{DependencyRequest, FrameworkType, RequestKind};
pub use resolver::BindingGraphFactory;
