// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binding::{MapType, SetType};
use crate::model::{Elements, ExecutableElement, TypeElement, TypeRef};
use crate::type_names;

use super::ValidationReport;
use super::binding_method::{
    Abstractness, AllowsMultibindings, AllowsScoping, BindingMethodKind, BindingMethodRules, ExceptionSuperclass,
};

static RULES: BindingMethodRules = BindingMethodRules {
    annotation: type_names::MULTIBINDS,
    enclosing_annotations: &[type_names::MODULE, type_names::PRODUCER_MODULE],
    abstractness: Abstractness::MustBeAbstract,
    exceptions: ExceptionSuperclass::NoExceptions,
    multibindings: AllowsMultibindings::NoMultibindings,
    scoping: AllowsScoping::NoScoping,
};

/// `@Multibinds` declarations: abstract, parameterless methods naming a possibly empty map or set.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultibindsMethod;

impl BindingMethodKind for MultibindsMethod {
    fn rules(&self) -> &BindingMethodRules {
        &RULES
    }

    fn check_type(&self, _elements: &dyn Elements, method: &ExecutableElement, report: &mut ValidationReport) {
        let return_type = method.return_type();
        if !is_valid_multibinds_type(return_type) {
            report.add_error(RULES.binding_methods(&format!("must return Map<K, V> or Set<T>, found {return_type}")));
        }
    }

    fn check_parameters(&self, _elements: &dyn Elements, _owner: &TypeElement, method: &ExecutableElement, report: &mut ValidationReport) {
        if !method.parameters().is_empty() {
            report.add_error(RULES.binding_methods("cannot have parameters"));
        }
    }
}

fn is_valid_multibinds_type(ty: &TypeRef) -> bool {
    let is_plain = |ty: &TypeRef| !ty.is_wildcard() && !type_names::is_framework_type(ty);

    if let Some(map) = MapType::from(ty) {
        return !map.is_raw() && map.key_type().is_some() && map.value_type().is_some_and(is_plain);
    }
    if let Some(set) = SetType::from(ty) {
        return !set.is_raw() && set.element_type().is_some_and(is_plain);
    }
    false
}
