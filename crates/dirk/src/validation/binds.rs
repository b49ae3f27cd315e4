// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::{Elements, ExecutableElement, TypeElement};
use crate::type_names;

use super::ValidationReport;
use super::binding_method::{
    Abstractness, AllowsMultibindings, AllowsScoping, BindingMethodKind, BindingMethodRules, ExceptionSuperclass,
    check_dependency_request,
};

static RULES: BindingMethodRules = BindingMethodRules {
    annotation: type_names::BINDS,
    enclosing_annotations: &[type_names::MODULE, type_names::PRODUCER_MODULE],
    abstractness: Abstractness::MustBeAbstract,
    exceptions: ExceptionSuperclass::NoExceptions,
    multibindings: AllowsMultibindings::AllowsMultibindings,
    scoping: AllowsScoping::AllowsScoping,
};

/// `@Binds` methods: abstract methods whose single parameter is bound to the return type.
#[derive(Clone, Copy, Debug, Default)]
pub struct BindsMethod;

impl BindingMethodKind for BindsMethod {
    fn rules(&self) -> &BindingMethodRules {
        &RULES
    }

    fn check_parameters(&self, elements: &dyn Elements, owner: &TypeElement, method: &ExecutableElement, report: &mut ValidationReport) {
        let [parameter] = method.parameters() else {
            report.add_error(RULES.binding_methods("must have exactly one parameter, whose type is assignable to the return type"));
            return;
        };

        check_dependency_request(elements, owner, method, parameter, report);
        if !elements.is_subtype(parameter.ty(), method.return_type()) {
            report.add_error_at(
                RULES.binding_methods(&format!(
                    "must have a parameter assignable to the return type: {} is not a subtype of {}",
                    parameter.ty(),
                    method.return_type()
                )),
                method.element_ref(owner.name()).parameter(parameter.name()),
            );
        }
    }
}
