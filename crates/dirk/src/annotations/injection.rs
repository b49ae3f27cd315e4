// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{AnnotationMirror, Elements, ExecutableElement, TypeElement};
use crate::type_names;

/// Returns `true` if the annotation's type is itself annotated with `meta`.
fn is_meta_annotated(elements: &dyn Elements, annotation: &AnnotationMirror, meta: &str) -> bool {
    elements
        .type_element(annotation.annotation_type())
        .is_some_and(|element| element.has_annotation(meta))
}

/// The qualifier annotations among `annotations`.
pub fn qualifiers<'a>(elements: &dyn Elements, annotations: &'a [AnnotationMirror]) -> Vec<&'a AnnotationMirror> {
    annotations
        .iter()
        .filter(|annotation| annotation.is(type_names::NAMED) || is_meta_annotated(elements, annotation, type_names::QUALIFIER))
        .collect()
}

/// The scope annotations among `annotations`.
pub fn scopes<'a>(elements: &dyn Elements, annotations: &'a [AnnotationMirror]) -> Vec<&'a AnnotationMirror> {
    annotations
        .iter()
        .filter(|annotation| {
            annotation.is(type_names::SINGLETON)
                || annotation.is(type_names::REUSABLE)
                || is_meta_annotated(elements, annotation, type_names::SCOPE)
        })
        .collect()
}

/// The map key annotations among `annotations`.
pub fn map_keys<'a>(elements: &dyn Elements, annotations: &'a [AnnotationMirror]) -> Vec<&'a AnnotationMirror> {
    annotations
        .iter()
        .filter(|annotation| is_meta_annotated(elements, annotation, type_names::MAP_KEY))
        .collect()
}

/// The `@Inject` constructor of a type, if it has one.
#[must_use]
pub fn inject_constructor(element: &TypeElement) -> Option<&ExecutableElement> {
    element
        .constructors()
        .iter()
        .find(|constructor| constructor.has_annotation(type_names::INJECT))
}
