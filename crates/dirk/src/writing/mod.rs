// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Code generation.
//!
//! Generators turn resolved graphs and validated declarations into token streams. Every
//! generator returns a [`GeneratedSource`]; turning it into a file is left to the
//! [`Processor`](crate::Processor).

mod annotation_creator;
mod component_generator;
mod component_implementation;
mod entry_point;
pub(crate) mod naming;
mod representation;
mod switching_providers;

use proc_macro2::TokenStream;

use crate::model::TypeName;

pub use annotation_creator::{
    AnnotationCreatorGenerator, UnwrappedMapKeyGenerator, annotation_instance_tokens, annotation_value_tokens, creator_module,
    map_key_expression,
};
pub use component_generator::ComponentGenerator;
pub use entry_point::{AndroidEntryPointMetadata, FragmentGenerator};
pub use representation::{BindingRepresentation, needs_framework_instance, select_representation};
pub use switching_providers::{MAX_CASES_PER_SWITCH, SwitchingProviders};

/// The output of one generator, before formatting.
#[derive(Clone, Debug)]
pub struct GeneratedSource {
    /// The qualified name of the generated item, which also names the file.
    pub name: TypeName,
    /// The generated items.
    pub tokens: TokenStream,
}
