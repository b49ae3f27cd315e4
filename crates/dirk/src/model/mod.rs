// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The declaration and type model the generator reads from.

mod annotation;
mod element;
mod elements;
mod types;

pub use annotation::{AnnotationMirror, AnnotationValue};
pub use element::{ElementRef, ExecutableElement, ExecutableKind, TypeElement, TypeKind, VariableElement};
pub use elements::{ElementModel, Elements};
pub use types::{TypeName, TypeRef};
pub(crate) use types::usize_literal;
