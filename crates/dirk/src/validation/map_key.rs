// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::annotations::{MapKeyAnnotation, annotation_members};
use crate::model::{TypeElement, TypeRef};

use super::ValidationReport;

/// Validates a `@MapKey` annotation type.
///
/// Returns `None` if the type is not annotated `@MapKey`.
#[must_use]
pub fn validate_map_key(element: &TypeElement) -> Option<ValidationReport> {
    let annotation = MapKeyAnnotation::of(element)?;
    let mut report = ValidationReport::new(element.element_ref());

    let members = annotation_members(element);
    if members.is_empty() {
        report.add_error("Map key annotations must have members");
    } else if annotation.unwrap_value() {
        match members {
            [member] => {
                if matches!(member.return_type(), TypeRef::Array(_)) {
                    report.add_error("Map key annotations with unwrapped values cannot use arrays");
                }
            }
            _ => report.add_error("Map key annotations with unwrapped values must have exactly one member"),
        }
    }

    Some(report)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::model::{AnnotationMirror, AnnotationValue, ExecutableElement};
    use crate::type_names;

    fn key(unwrap: bool, members: &[TypeRef]) -> TypeElement {
        let mut element = TypeElement::annotation_type("app::Key")
            .annotated(AnnotationMirror::new(type_names::MAP_KEY).with_value("unwrap_value", AnnotationValue::Bool(unwrap)));
        for (i, ty) in members.iter().enumerate() {
            element = element.with_method(ExecutableElement::method(format!("m{i}"), ty.clone()).abstract_method());
        }
        element
    }

    #[rstest]
    #[case(true, vec![TypeRef::primitive("str")], None)]
    #[case(true, vec![], Some("Map key annotations must have members"))]
    #[case(false, vec![], Some("Map key annotations must have members"))]
    #[case(
        true,
        vec![TypeRef::primitive("str"), TypeRef::primitive("i32")],
        Some("Map key annotations with unwrapped values must have exactly one member")
    )]
    #[case(false, vec![TypeRef::primitive("str"), TypeRef::primitive("i32")], None)]
    #[case(
        true,
        vec![TypeRef::Array(Box::new(TypeRef::primitive("i32")))],
        Some("Map key annotations with unwrapped values cannot use arrays")
    )]
    fn map_key_shapes(#[case] unwrap: bool, #[case] members: Vec<TypeRef>, #[case] error: Option<&str>) {
        let report = validate_map_key(&key(unwrap, &members)).unwrap();
        assert_eq!(report.errors().first().copied(), error);
    }

    #[test]
    fn other_types_are_skipped() {
        assert!(validate_map_key(&TypeElement::annotation_type("app::Plain")).is_none());
    }
}
