// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::type_names;

use super::binding_method::{
    Abstractness, AllowsMultibindings, AllowsScoping, BindingMethodKind, BindingMethodRules, ExceptionSuperclass,
};

static PROVIDES_RULES: BindingMethodRules = BindingMethodRules {
    annotation: type_names::PROVIDES,
    enclosing_annotations: &[type_names::MODULE, type_names::PRODUCER_MODULE],
    abstractness: Abstractness::MustBeConcrete,
    exceptions: ExceptionSuperclass::RuntimeExceptionsOnly,
    multibindings: AllowsMultibindings::AllowsMultibindings,
    scoping: AllowsScoping::AllowsScoping,
};

static PRODUCES_RULES: BindingMethodRules = BindingMethodRules {
    annotation: type_names::PRODUCES,
    enclosing_annotations: &[type_names::PRODUCER_MODULE],
    abstractness: Abstractness::MustBeConcrete,
    exceptions: ExceptionSuperclass::AnyException,
    multibindings: AllowsMultibindings::AllowsMultibindings,
    scoping: AllowsScoping::NoScoping,
};

/// `@Provides` methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProvidesMethod;

impl BindingMethodKind for ProvidesMethod {
    fn rules(&self) -> &BindingMethodRules {
        &PROVIDES_RULES
    }
}

/// `@Produces` methods. Only valid in producer modules; may be asynchronous.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProducesMethod;

impl BindingMethodKind for ProducesMethod {
    fn rules(&self) -> &BindingMethodRules {
        &PRODUCES_RULES
    }
}
