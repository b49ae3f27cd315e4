// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::annotations::{MapKeyAnnotation, map_key_type, map_keys, qualifiers, scopes, unwrapped_value};
use crate::binding::SetType;
use crate::model::{AnnotationMirror, Elements, ExecutableElement, TypeElement, TypeRef, VariableElement};
use crate::type_names;

use super::ValidationReport;

/// Whether a binding method must be abstract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Abstractness {
    /// The method must be abstract.
    MustBeAbstract,
    /// The method must have a body.
    MustBeConcrete,
}

/// Which thrown types a binding method may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExceptionSuperclass {
    /// No thrown types at all.
    NoExceptions,
    /// Only subtypes of `RuntimeException`.
    RuntimeExceptionsOnly,
    /// Anything.
    AnyException,
}

/// Whether a binding method may contribute to a multibinding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowsMultibindings {
    /// Multibinding annotations are errors.
    NoMultibindings,
    /// At most one multibinding annotation.
    AllowsMultibindings,
}

/// Whether a binding method may be scoped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowsScoping {
    /// Scope annotations are errors.
    NoScoping,
    /// At most one scope annotation.
    AllowsScoping,
}

/// The structural requirements shared by every binding method of one kind.
#[derive(Clone, Copy, Debug)]
pub struct BindingMethodRules {
    /// The qualified name of the method annotation, e.g. `dirk::Provides`.
    pub annotation: &'static str,
    /// The annotations the enclosing type must carry one of.
    pub enclosing_annotations: &'static [&'static str],
    /// Abstractness requirement.
    pub abstractness: Abstractness,
    /// Thrown types requirement.
    pub exceptions: ExceptionSuperclass,
    /// Multibinding requirement.
    pub multibindings: AllowsMultibindings,
    /// Scoping requirement.
    pub scoping: AllowsScoping,
}

impl BindingMethodRules {
    /// The simple name of the method annotation.
    #[must_use]
    pub fn annotation_name(&self) -> &'static str {
        self.annotation.rsplit("::").next().unwrap_or(self.annotation)
    }

    /// Formats a message as `@Name methods <message>`.
    #[must_use]
    pub fn binding_methods(&self, message: &str) -> String {
        format!("@{} methods {message}", self.annotation_name())
    }
}

/// The parts of binding method validation that differ per kind.
pub trait BindingMethodKind {
    /// The structural rules of this kind.
    fn rules(&self) -> &BindingMethodRules;

    /// Checks the return type.
    fn check_type(&self, _elements: &dyn Elements, method: &ExecutableElement, report: &mut ValidationReport) {
        check_return_type(self.rules(), method.return_type(), report);
    }

    /// Checks the parameters.
    fn check_parameters(&self, elements: &dyn Elements, owner: &TypeElement, method: &ExecutableElement, report: &mut ValidationReport) {
        for parameter in method.parameters() {
            check_dependency_request(elements, owner, method, parameter, report);
        }
    }
}

/// The default return type check: a value that is not a framework wrapper.
pub(crate) fn check_return_type(rules: &BindingMethodRules, return_type: &TypeRef, report: &mut ValidationReport) {
    if return_type.is_unit() {
        report.add_error(rules.binding_methods("must return a value (not unit)"));
    } else if type_names::is_framework_type(return_type) {
        report.add_error(rules.binding_methods(&format!("must not return framework types, found {return_type}")));
    } else if return_type.is_error() {
        report.add_error(rules.binding_methods(&format!("return an unresolved type: {return_type}")));
    }
}

/// Checks a parameter as a dependency request.
///
/// `@Assisted` placement is not checked here; the assisted parameter validator owns it.
pub(crate) fn check_dependency_request(
    elements: &dyn Elements,
    owner: &TypeElement,
    method: &ExecutableElement,
    parameter: &VariableElement,
    report: &mut ValidationReport,
) {
    let location = method.element_ref(owner.name()).parameter(parameter.name());

    if qualifiers(elements, parameter.annotations()).len() > 1 {
        report.add_error_at("A single dependency request may not use more than one qualifier", location.clone());
    }

    let mut ty = parameter.ty();
    while type_names::is_framework_type(ty) {
        match ty.type_arguments() {
            [inner] => ty = inner,
            _ => {
                report.add_error_at(format!("{ty} cannot be requested without a type argument"), location);
                return;
            }
        }
    }

    if ty.is_wildcard() {
        report.add_error_at("Dependency requests may not use wildcard types", location);
    }
}

/// Validates binding methods against a [`BindingMethodKind`].
#[derive(Clone, Copy, Debug)]
pub struct BindingMethodValidator<'a> {
    elements: &'a dyn Elements,
}

impl<'a> BindingMethodValidator<'a> {
    /// Creates a validator over the given declarations.
    #[must_use]
    pub fn new(elements: &'a dyn Elements) -> Self {
        Self { elements }
    }

    /// Validates `method`, declared in `owner`, as a binding method of `kind`.
    #[must_use]
    pub fn validate(&self, kind: &dyn BindingMethodKind, owner: &TypeElement, method: &ExecutableElement) -> ValidationReport {
        let rules = kind.rules();
        let mut report = ValidationReport::new(method.element_ref(owner.name()));

        Self::check_enclosing_element(rules, owner, &mut report);
        Self::check_abstractness(rules, method, &mut report);
        if !method.type_parameters().is_empty() {
            report.add_error(rules.binding_methods("may not have type parameters"));
        }
        kind.check_type(self.elements, method, &mut report);
        self.check_thrown_types(rules, method, &mut report);
        self.check_multibindings(rules, method, &mut report);
        self.check_scopes(rules, method, &mut report);
        if qualifiers(self.elements, method.annotations()).len() > 1 {
            report.add_error(rules.binding_methods("may not use more than one qualifier"));
        }
        kind.check_parameters(self.elements, owner, method, &mut report);

        report
    }

    fn check_enclosing_element(rules: &BindingMethodRules, owner: &TypeElement, report: &mut ValidationReport) {
        if rules.enclosing_annotations.iter().any(|annotation| owner.has_annotation(annotation)) {
            return;
        }

        let names: Vec<String> = rules
            .enclosing_annotations
            .iter()
            .map(|annotation| format!("@{}", annotation.rsplit("::").next().unwrap_or(annotation)))
            .collect();
        report.add_error(rules.binding_methods(&format!("can only be present within a {}", names.join(" or "))));
    }

    fn check_abstractness(rules: &BindingMethodRules, method: &ExecutableElement, report: &mut ValidationReport) {
        match (rules.abstractness, method.is_abstract()) {
            (Abstractness::MustBeAbstract, false) => report.add_error(rules.binding_methods("must be abstract")),
            (Abstractness::MustBeConcrete, true) => report.add_error(rules.binding_methods("cannot be abstract")),
            _ => {}
        }
    }

    fn check_thrown_types(&self, rules: &BindingMethodRules, method: &ExecutableElement, report: &mut ValidationReport) {
        let thrown = method.thrown_types();
        match rules.exceptions {
            ExceptionSuperclass::AnyException => {}
            ExceptionSuperclass::NoExceptions => {
                if !thrown.is_empty() {
                    report.add_error(rules.binding_methods("may not throw"));
                }
            }
            ExceptionSuperclass::RuntimeExceptionsOnly => {
                let runtime_exception = TypeRef::declared(type_names::RUNTIME_EXCEPTION);
                if thrown.iter().any(|ty| !self.elements.is_subtype(ty, &runtime_exception)) {
                    report.add_error(rules.binding_methods("may only throw unchecked exceptions"));
                }
            }
        }
    }

    fn check_multibindings(&self, rules: &BindingMethodRules, method: &ExecutableElement, report: &mut ValidationReport) {
        let multibinding_annotations: Vec<_> = [type_names::INTO_SET, type_names::ELEMENTS_INTO_SET, type_names::INTO_MAP]
            .into_iter()
            .filter(|annotation| method.has_annotation(annotation))
            .collect();
        let keys = map_keys(self.elements, method.annotations());

        match rules.multibindings {
            AllowsMultibindings::NoMultibindings => {
                if !multibinding_annotations.is_empty() {
                    report.add_error(rules.binding_methods("cannot have multibinding annotations"));
                }
                if !keys.is_empty() {
                    report.add_error(rules.binding_methods("cannot have map key annotations"));
                }
                return;
            }
            AllowsMultibindings::AllowsMultibindings => {}
        }

        if multibinding_annotations.len() > 1 {
            report.add_error(rules.binding_methods("cannot have more than one multibinding annotation"));
        }

        let into_map = method.has_annotation(type_names::INTO_MAP);
        match (into_map, keys.as_slice()) {
            (true, []) => report.add_error(rules.binding_methods("of type map must declare a map key")),
            (true, [key]) => {
                if map_key_type(self.elements, key).is_none() {
                    report.add_error(format!("{key} is not a valid map key"));
                } else if self.is_unwrapped(key) && unwrapped_value(self.elements, key).is_none() {
                    report.add_error(format!("{key} is missing its map key value"));
                }
            }
            (true, _) => report.add_error(rules.binding_methods("may not have more than one map key")),
            (false, []) => {}
            (false, _) => report.add_error(rules.binding_methods("with a map key must also be annotated @IntoMap")),
        }

        if method.has_annotation(type_names::ELEMENTS_INTO_SET) && SetType::from(method.return_type()).is_none_or(|set| set.is_raw()) {
            report.add_error(rules.binding_methods("annotated with @ElementsIntoSet must return a Set"));
        }
    }

    fn is_unwrapped(&self, key: &AnnotationMirror) -> bool {
        self.elements
            .type_element(key.annotation_type())
            .and_then(MapKeyAnnotation::of)
            .is_some_and(|annotation| annotation.unwrap_value())
    }

    fn check_scopes(&self, rules: &BindingMethodRules, method: &ExecutableElement, report: &mut ValidationReport) {
        let scopes = scopes(self.elements, method.annotations());
        match rules.scoping {
            AllowsScoping::NoScoping if !scopes.is_empty() => {
                report.add_error(rules.binding_methods("cannot be scoped"));
            }
            AllowsScoping::AllowsScoping if scopes.len() > 1 => {
                report.add_error(rules.binding_methods("cannot use more than one scope"));
            }
            _ => {}
        }
    }
}
