// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::annotations::{
    assisted_factory_method, is_assisted_factory_type, is_assisted_inject_constructor, is_assisted_parameter, qualifiers,
};
use crate::model::{Elements, ExecutableElement, TypeElement};

use super::ValidationReport;

const PLACEMENT_ERROR: &str = "@Assisted parameters can only be used within an @AssistedInject-annotated constructor.";
const QUALIFIER_ERROR: &str = "Qualifiers cannot be used with @Assisted parameters.";

/// Checks where `@Assisted` parameters appear.
///
/// Legal places are `@AssistedInject` constructors and the creation method of an
/// `@AssistedFactory`. The generated `copy` method of a data class mirrors its constructor
/// parameters, annotations included, so it is tolerated as well.
#[derive(Clone, Copy, Debug)]
pub struct AssistedParameterValidator<'a> {
    elements: &'a dyn Elements,
}

impl<'a> AssistedParameterValidator<'a> {
    /// Creates a validator over the given declarations.
    #[must_use]
    pub fn new(elements: &'a dyn Elements) -> Self {
        Self { elements }
    }

    /// Validates every constructor and method of `owner`.
    #[must_use]
    pub fn validate_type(&self, owner: &TypeElement) -> ValidationReport {
        let mut report = ValidationReport::new(owner.element_ref());
        for executable in owner.constructors().iter().chain(owner.methods()) {
            report.merge(self.validate(owner, executable));
        }
        report
    }

    /// Validates the `@Assisted` parameters of one executable.
    #[must_use]
    pub fn validate(&self, owner: &TypeElement, executable: &ExecutableElement) -> ValidationReport {
        let location = executable.element_ref(owner.name());
        let mut report = ValidationReport::new(location.clone());

        let placement_allowed = is_assisted_inject_constructor(executable)
            || Self::is_assisted_factory_create_method(owner, executable)
            || Self::is_data_class_copy_method(owner, executable);

        for parameter in executable.parameters().iter().filter(|p| is_assisted_parameter(p)) {
            let parameter_location = location.parameter(parameter.name());
            if !placement_allowed {
                report.add_error_at(PLACEMENT_ERROR, parameter_location.clone());
            }
            for _ in qualifiers(self.elements, parameter.annotations()) {
                report.add_error_at(QUALIFIER_ERROR, parameter_location.clone());
            }
        }

        report
    }

    fn is_assisted_factory_create_method(owner: &TypeElement, executable: &ExecutableElement) -> bool {
        is_assisted_factory_type(owner)
            && assisted_factory_method(owner).is_some_and(|method| std::ptr::eq(method, executable))
    }

    fn is_data_class_copy_method(owner: &TypeElement, executable: &ExecutableElement) -> bool {
        owner.is_data_class() && executable.name() == "copy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationMirror, ElementModel, TypeRef, VariableElement};
    use crate::type_names;

    fn assisted(name: &str) -> VariableElement {
        VariableElement::new(name, TypeRef::primitive("i32")).annotated(AnnotationMirror::new(type_names::ASSISTED))
    }

    #[test]
    fn misplaced_parameters_get_one_error_each() {
        let owner = TypeElement::class("app::Foo").with_method(
            ExecutableElement::method("configure", TypeRef::Unit)
                .with_parameter(assisted("a"))
                .with_parameter(assisted("b"))
                .with_parameter(VariableElement::new("c", TypeRef::primitive("i32"))),
        );
        let model = ElementModel::new();

        let report = AssistedParameterValidator::new(&model).validate_type(&owner);
        assert_eq!(report.errors(), [PLACEMENT_ERROR, PLACEMENT_ERROR]);
        assert_eq!(report.items()[0].location().to_string(), "app::Foo::configure(a)");
    }

    #[test]
    fn assisted_inject_constructor_is_allowed() {
        let owner = TypeElement::class("app::Foo").with_constructor(
            ExecutableElement::constructor()
                .annotated(AnnotationMirror::new(type_names::ASSISTED_INJECT))
                .with_parameter(assisted("a")),
        );
        let model = ElementModel::new();
        assert!(AssistedParameterValidator::new(&model).validate_type(&owner).is_clean());
    }

    #[test]
    fn factory_overload_of_the_create_method_is_flagged() {
        let owner = TypeElement::trait_type("app::FooFactory")
            .annotated(AnnotationMirror::new(type_names::ASSISTED_FACTORY))
            .with_method(
                ExecutableElement::method("create", TypeRef::declared("app::Foo"))
                    .abstract_method()
                    .with_parameter(assisted("a")),
            )
            .with_method(
                ExecutableElement::method("create", TypeRef::declared("app::Foo"))
                    .with_parameter(assisted("a"))
                    .with_parameter(assisted("b")),
            );
        let model = ElementModel::new();

        let report = AssistedParameterValidator::new(&model).validate_type(&owner);
        assert_eq!(report.errors(), [PLACEMENT_ERROR, PLACEMENT_ERROR]);
        assert_eq!(report.items()[0].location().to_string(), "app::FooFactory::create(a)");
    }

    #[test]
    fn data_class_copy_is_tolerated() {
        let owner = TypeElement::class("app::Foo")
            .data_class()
            .with_method(ExecutableElement::method("copy", TypeRef::declared("app::Foo")).with_parameter(assisted("a")));
        let model = ElementModel::new();
        assert!(AssistedParameterValidator::new(&model).validate_type(&owner).is_clean());
    }

    #[test]
    fn qualifiers_on_assisted_parameters_are_errors() {
        let owner = TypeElement::class("app::Foo").with_constructor(
            ExecutableElement::constructor()
                .annotated(AnnotationMirror::new(type_names::ASSISTED_INJECT))
                .with_parameter(assisted("a").annotated(AnnotationMirror::new(type_names::NAMED))),
        );
        let model = ElementModel::new();
        let report = AssistedParameterValidator::new(&model).validate_type(&owner);
        assert_eq!(report.errors(), [QUALIFIER_ERROR]);
    }
}
