// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::annotations::ModuleAnnotation;
use crate::model::{Elements, TypeElement, TypeRef};
use crate::type_names;

use super::binding_method::BindingMethodValidator;
use super::{ValidationReport, binding_method_kinds};

/// Validates a module: its `includes` and `subcomponents` lists, then every binding method.
#[derive(Clone, Copy, Debug)]
pub struct ModuleValidator<'a> {
    elements: &'a dyn Elements,
}

impl<'a> ModuleValidator<'a> {
    /// Creates a validator over the given declarations.
    #[must_use]
    pub fn new(elements: &'a dyn Elements) -> Self {
        Self { elements }
    }

    /// Validates one module type.
    #[must_use]
    pub fn validate(&self, module: &TypeElement) -> ValidationReport {
        let mut report = ValidationReport::new(module.element_ref());
        let Some(annotation) = ModuleAnnotation::of(module) else {
            report.add_error(format!("{} is not annotated with @Module or @ProducerModule", module.name()));
            return report;
        };

        for included in annotation.includes_as_types() {
            match self.resolve(included) {
                None => report.add_error(format!("@{} includes {included}, which could not be resolved", annotation.annotation_name())),
                Some(element) if element.name() == module.name() => {
                    report.add_error(format!("@{} cannot include itself", annotation.annotation_name()));
                }
                Some(element) if ModuleAnnotation::of(element).is_none() => report.add_error(format!(
                    "{} is listed as a module, but is not annotated with @Module or @ProducerModule",
                    element.name()
                )),
                Some(_) => {}
            }
        }

        for subcomponent in annotation.subcomponents_as_types() {
            match self.resolve(subcomponent) {
                None => report.add_error(format!(
                    "@{} lists subcomponent {subcomponent}, which could not be resolved",
                    annotation.annotation_name()
                )),
                Some(element) if !element.has_annotation(type_names::SUBCOMPONENT) => report.add_error(format!(
                    "{} is listed as a subcomponent, but is not annotated with @Subcomponent",
                    element.name()
                )),
                Some(_) => {}
            }
        }

        let methods = BindingMethodValidator::new(self.elements);
        for method in module.methods() {
            match binding_method_kinds(method).as_slice() {
                [] => {}
                [kind] => report.merge(methods.validate(*kind, module, method)),
                _ => report.add_error_at(
                    "Binding methods may not have more than one binding method annotation",
                    method.element_ref(module.name()),
                ),
            }
        }

        report
    }

    fn resolve(&self, ty: &TypeRef) -> Option<&'a TypeElement> {
        if ty.is_error() {
            return None;
        }
        ty.name().and_then(|name| self.elements.type_element(name))
    }
}
