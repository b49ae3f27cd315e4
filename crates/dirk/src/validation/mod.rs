// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Declaration validators.
//!
//! Validators never stop at the first problem: every error found for a declaration is collected
//! into its [`ValidationReport`]. A declaration whose report is not clean is excluded from code
//! generation.

mod assisted;
mod binding_method;
mod binds;
mod map_key;
mod module;
mod multibinds;
mod provides;
mod report;

pub use assisted::AssistedParameterValidator;
pub use binding_method::{
    Abstractness, AllowsMultibindings, AllowsScoping, BindingMethodKind, BindingMethodRules, BindingMethodValidator,
    ExceptionSuperclass,
};
pub use binds::BindsMethod;
pub use map_key::validate_map_key;
pub use module::ModuleValidator;
pub use multibinds::MultibindsMethod;
pub use provides::{ProducesMethod, ProvidesMethod};
pub use report::{CollectingMessager, Diagnostic, Messager, Severity, ValidationReport};

use crate::model::ExecutableElement;

/// The binding method kinds whose annotation is present on `method`.
#[must_use]
pub fn binding_method_kinds(method: &ExecutableElement) -> Vec<&'static dyn BindingMethodKind> {
    let kinds: [&'static dyn BindingMethodKind; 4] = [&ProvidesMethod, &ProducesMethod, &BindsMethod, &MultibindsMethod];
    kinds
        .into_iter()
        .filter(|kind| method.has_annotation(kind.rules().annotation))
        .collect()
}
