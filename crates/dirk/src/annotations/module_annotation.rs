// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use once_cell::unsync::OnceCell;
use thiserror::Error;

use crate::model::{AnnotationMirror, TypeElement, TypeName, TypeRef};
use crate::type_names;

const MODULE_ANNOTATIONS: [&str; 2] = [type_names::MODULE, type_names::PRODUCER_MODULE];

/// Returned when a [`ModuleAnnotation`] is requested for an annotation of another type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{annotation} is not a Module or ProducerModule annotation")]
pub struct NotAModuleAnnotation {
    annotation: String,
}

/// A `@Module` or `@ProducerModule` annotation.
///
/// The attribute lists are computed on first access and kept; the wrapped annotation never
/// changes after construction.
#[derive(Clone, Debug)]
pub struct ModuleAnnotation {
    annotation: AnnotationMirror,
    includes: OnceCell<Vec<TypeRef>>,
    subcomponents: OnceCell<Vec<TypeRef>>,
}

impl ModuleAnnotation {
    /// Wraps a module annotation.
    ///
    /// # Errors
    ///
    /// Fails unless [`Self::is_module_annotation`] holds for the annotation.
    pub fn new(annotation: AnnotationMirror) -> Result<Self, NotAModuleAnnotation> {
        if !Self::is_module_annotation(&annotation) {
            return Err(NotAModuleAnnotation {
                annotation: annotation.to_string(),
            });
        }

        Ok(Self {
            annotation,
            includes: OnceCell::new(),
            subcomponents: OnceCell::new(),
        })
    }

    /// The module annotation on a type, if it has one.
    #[must_use]
    pub fn of(element: &TypeElement) -> Option<Self> {
        element
            .annotations()
            .iter()
            .find(|annotation| Self::is_module_annotation(annotation))
            .and_then(|annotation| Self::new(annotation.clone()).ok())
    }

    /// Returns `true` for `@Module` and `@ProducerModule`.
    #[must_use]
    pub fn is_module_annotation(annotation: &AnnotationMirror) -> bool {
        MODULE_ANNOTATIONS.iter().any(|name| annotation.is(name))
    }

    /// The qualified names of the module annotation types.
    #[must_use]
    pub fn module_annotations() -> &'static [&'static str] {
        &MODULE_ANNOTATIONS
    }

    /// The annotation itself.
    #[must_use]
    pub fn annotation(&self) -> &AnnotationMirror {
        &self.annotation
    }

    /// The simple name of the annotation, e.g. `Module`.
    #[must_use]
    pub fn annotation_name(&self) -> &str {
        self.annotation.annotation_type().simple_name()
    }

    /// Returns `true` for `@ProducerModule`.
    #[must_use]
    pub fn is_producer_module(&self) -> bool {
        self.annotation.is(type_names::PRODUCER_MODULE)
    }

    /// The types listed in `includes`, as written. May contain unresolved types.
    #[must_use]
    pub fn includes_as_types(&self) -> &[TypeRef] {
        self.includes.get_or_init(|| self.type_list("includes"))
    }

    /// The modules listed in `includes`, in declaration order, skipping unresolved entries.
    #[must_use]
    pub fn includes(&self) -> Vec<TypeName> {
        Self::names(self.includes_as_types())
    }

    /// The types listed in `subcomponents`, as written. May contain unresolved types.
    #[must_use]
    pub fn subcomponents_as_types(&self) -> &[TypeRef] {
        self.subcomponents.get_or_init(|| self.type_list("subcomponents"))
    }

    /// The subcomponents listed in `subcomponents`, in declaration order, skipping unresolved
    /// entries.
    #[must_use]
    pub fn subcomponents(&self) -> Vec<TypeName> {
        Self::names(self.subcomponents_as_types())
    }

    fn type_list(&self, attribute: &str) -> Vec<TypeRef> {
        self.annotation
            .value(attribute)
            .map(|value| value.as_list().into_iter().filter_map(|v| v.as_type().cloned()).collect())
            .unwrap_or_default()
    }

    fn names(types: &[TypeRef]) -> Vec<TypeName> {
        types
            .iter()
            .filter(|ty| !ty.is_error())
            .filter_map(TypeRef::name)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationValue;

    fn type_value(name: &str) -> AnnotationValue {
        AnnotationValue::Type(TypeRef::declared(name))
    }

    #[test]
    fn attributes_in_declaration_order() {
        let annotation = AnnotationMirror::new(type_names::MODULE)
            .with_value(
                "includes",
                AnnotationValue::Array(vec![type_value("app::X"), type_value("app::Y")]),
            )
            .with_value("subcomponents", AnnotationValue::Array(vec![type_value("app::Z")]));

        let module = ModuleAnnotation::new(annotation).unwrap();
        assert_eq!(module.includes(), [TypeName::new("app::X"), TypeName::new("app::Y")]);
        assert_eq!(module.subcomponents(), [TypeName::new("app::Z")]);
        assert_eq!(module.annotation_name(), "Module");
        assert!(!module.is_producer_module());
    }

    #[test]
    fn missing_attributes_are_empty() {
        let module = ModuleAnnotation::new(AnnotationMirror::new(type_names::PRODUCER_MODULE)).unwrap();
        assert!(module.includes().is_empty());
        assert!(module.subcomponents().is_empty());
        assert!(module.is_producer_module());
    }

    #[test]
    fn rejects_other_annotations() {
        let error = ModuleAnnotation::new(AnnotationMirror::new(type_names::COMPONENT)).unwrap_err();
        assert_eq!(error.to_string(), "@dirk::Component is not a Module or ProducerModule annotation");
    }

    #[test]
    fn unresolved_includes_are_kept_as_types_only() {
        let annotation = AnnotationMirror::new(type_names::MODULE).with_value(
            "includes",
            AnnotationValue::Array(vec![
                type_value("app::X"),
                AnnotationValue::Type(TypeRef::Error("Missing".into())),
            ]),
        );

        let module = ModuleAnnotation::new(annotation).unwrap();
        assert_eq!(module.includes_as_types().len(), 2);
        assert_eq!(module.includes(), [TypeName::new("app::X")]);
    }
}
