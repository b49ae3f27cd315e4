// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{AnnotationMirror, AnnotationValue, Elements, ExecutableElement, TypeElement, TypeKind, TypeRef};
use crate::type_names;

/// A `@MapKey` annotation on an annotation type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapKeyAnnotation {
    annotation: AnnotationMirror,
}

impl MapKeyAnnotation {
    /// The `@MapKey` annotation on a type, if it has one.
    #[must_use]
    pub fn of(element: &TypeElement) -> Option<Self> {
        element.annotation(type_names::MAP_KEY).map(|annotation| Self {
            annotation: annotation.clone(),
        })
    }

    /// Whether the map key is the value of the single member rather than the annotation itself.
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn unwrap_value(&self) -> bool {
        self.annotation
            .value("unwrap_value")
            .and_then(AnnotationValue::as_bool)
            .unwrap_or(true)
    }

    /// The annotation itself.
    #[must_use]
    pub fn annotation(&self) -> &AnnotationMirror {
        &self.annotation
    }
}

/// The members of an annotation type, in declaration order.
#[must_use]
pub fn annotation_members(element: &TypeElement) -> &[ExecutableElement] {
    element.methods()
}

/// The type used as the map key for a map key annotation instance.
///
/// Wrapped keys use the annotation type itself; unwrapped keys use the type of the single member.
#[must_use]
pub fn map_key_type(elements: &dyn Elements, map_key: &AnnotationMirror) -> Option<TypeRef> {
    let element = elements.type_element(map_key.annotation_type())?;
    let annotation = MapKeyAnnotation::of(element)?;
    if !annotation.unwrap_value() {
        return Some(element.as_type());
    }

    match annotation_members(element) {
        [member] => Some(member.return_type().clone()),
        _ => None,
    }
}

/// The key value of an unwrapped map key instance.
#[must_use]
pub fn unwrapped_value<'a>(elements: &dyn Elements, map_key: &'a AnnotationMirror) -> Option<&'a AnnotationValue> {
    let element = elements.type_element(map_key.annotation_type())?;
    match annotation_members(element) {
        [member] => map_key.value(member.name()),
        _ => None,
    }
}

/// The annotation types reachable from the members of `element`, including nested ones,
/// in discovery order. `element` itself is not included.
#[must_use]
pub fn nested_annotation_types<'a>(elements: &'a dyn Elements, element: &TypeElement) -> Vec<&'a TypeElement> {
    let mut found: Vec<&TypeElement> = Vec::new();
    let mut pending: Vec<TypeRef> = annotation_members(element).iter().map(|m| m.return_type().clone()).collect();
    pending.reverse();

    while let Some(ty) = pending.pop() {
        let ty = match ty {
            TypeRef::Array(inner) => *inner,
            other => other,
        };
        let Some(nested) = ty.name().and_then(|name| elements.type_element(name)) else {
            continue;
        };
        if nested.kind() != TypeKind::Annotation || nested.name() == element.name() || found.iter().any(|f| f.name() == nested.name()) {
            continue;
        }
        found.push(nested);
        let mut members: Vec<TypeRef> = annotation_members(nested).iter().map(|m| m.return_type().clone()).collect();
        members.reverse();
        pending.extend(members);
    }

    found
}
