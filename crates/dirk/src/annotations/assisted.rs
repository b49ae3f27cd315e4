// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{ExecutableElement, ExecutableKind, TypeElement, VariableElement};
use crate::type_names;

/// Returns `true` for constructors annotated `@AssistedInject`.
#[must_use]
pub fn is_assisted_inject_constructor(executable: &ExecutableElement) -> bool {
    executable.kind() == ExecutableKind::Constructor && executable.has_annotation(type_names::ASSISTED_INJECT)
}

/// The `@AssistedInject` constructor of a type, if it has one.
#[must_use]
pub fn assisted_inject_constructor(element: &TypeElement) -> Option<&ExecutableElement> {
    element.constructors().iter().find(|c| is_assisted_inject_constructor(c))
}

/// Returns `true` for types annotated `@AssistedFactory`.
#[must_use]
pub fn is_assisted_factory_type(element: &TypeElement) -> bool {
    element.has_annotation(type_names::ASSISTED_FACTORY)
}

/// The creation method of an assisted factory: its single abstract method.
#[must_use]
pub fn assisted_factory_method(element: &TypeElement) -> Option<&ExecutableElement> {
    let mut abstract_methods = element.methods().iter().filter(|method| method.is_abstract());
    match (abstract_methods.next(), abstract_methods.next()) {
        (Some(method), None) => Some(method),
        _ => None,
    }
}

/// Returns `true` for parameters annotated `@Assisted`.
#[must_use]
pub fn is_assisted_parameter(parameter: &VariableElement) -> bool {
    parameter.has_annotation(type_names::ASSISTED)
}

/// The identifier of an assisted parameter: its `value` attribute, empty when unset.
#[must_use]
pub fn assisted_identifier(parameter: &VariableElement) -> String {
    parameter
        .annotations()
        .iter()
        .find(|annotation| annotation.is(type_names::ASSISTED))
        .and_then(|annotation| match annotation.value("value") {
            Some(crate::model::AnnotationValue::Str(id)) => Some(id.clone()),
            _ => None,
        })
        .unwrap_or_default()
}
