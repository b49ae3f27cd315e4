// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Wrappers for `@AndroidEntryPoint` types.

mod fragment;

pub use fragment::FragmentGenerator;

use crate::model::{AnnotationValue, Elements, TypeElement, TypeName, TypeRef};
use crate::type_names;
use crate::validation::ValidationReport;

/// What the generators need to know about an `@AndroidEntryPoint` type.
#[derive(Clone, Debug)]
pub struct AndroidEntryPointMetadata<'a> {
    element: &'a TypeElement,
    base: TypeRef,
    base_element: Option<&'a TypeElement>,
    generated_name: TypeName,
}

impl<'a> AndroidEntryPointMetadata<'a> {
    /// Reads the metadata of an `@AndroidEntryPoint` type.
    ///
    /// The base type is the annotation's `value`, or the superclass if no value is given. With
    /// an explicit base, the annotated type must extend the generated wrapper unless
    /// `validate_superclass` is `false`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if the type is not a valid entry point.
    pub fn of(elements: &'a dyn Elements, element: &'a TypeElement, validate_superclass: bool) -> Result<Self, ValidationReport> {
        let mut report = ValidationReport::new(element.element_ref());
        let Some(annotation) = element.annotation(type_names::ANDROID_ENTRY_POINT) else {
            report.add_error(format!("{} is not annotated with @AndroidEntryPoint", element.name()));
            return Err(report);
        };

        let generated_name = generated_name(element.name());
        let (base, explicit) = match (annotation.value("value"), element.superclass()) {
            (Some(AnnotationValue::Type(base)), _) => (base.clone(), true),
            (_, Some(superclass)) => (superclass.clone(), false),
            (_, None) => {
                report.add_error(format!("@AndroidEntryPoint type {} must extend a base type", element.name()));
                return Err(report);
            }
        };

        if explicit && validate_superclass {
            let superclass = element.superclass();
            if superclass.and_then(TypeRef::name) != Some(&generated_name) {
                let found = superclass.map_or_else(|| "nothing".to_string(), ToString::to_string);
                report.add_error(format!(
                    "@AndroidEntryPoint class expected [{generated_name}] but found [{found}]. Did you forget to extend the generated type?"
                ));
            }
        }

        if !elements.is_subtype(&base, &TypeRef::declared(type_names::FRAGMENT)) {
            report.add_error(format!(
                "@AndroidEntryPoint base type {base} is not supported; expected a subtype of {}",
                type_names::FRAGMENT
            ));
        }

        if !report.is_clean() {
            return Err(report);
        }

        Ok(Self {
            element,
            base_element: base.name().and_then(|name| elements.type_element(name)),
            base,
            generated_name,
        })
    }

    /// The annotated type.
    #[must_use]
    pub fn element(&self) -> &'a TypeElement {
        self.element
    }

    /// The type the generated wrapper delegates to.
    #[must_use]
    pub fn base(&self) -> &TypeRef {
        &self.base
    }

    /// The type parameters of the base type, which the wrapper repeats.
    #[must_use]
    pub fn type_parameters(&self) -> &'a [String] {
        self.base_element.map(TypeElement::type_parameters).unwrap_or_default()
    }

    /// The name of the generated wrapper: `Dirk_<Name>`.
    #[must_use]
    pub fn generated_name(&self) -> &TypeName {
        &self.generated_name
    }

    /// Returns `true` if the base type is itself an entry point, in which case its wrapper
    /// already installs the view model factory.
    #[must_use]
    pub fn overrides_android_entry_point_class(&self) -> bool {
        self.base_element
            .is_some_and(|base| base.has_annotation(type_names::ANDROID_ENTRY_POINT))
    }
}

fn generated_name(name: &TypeName) -> TypeName {
    name.peer(&format!("Dirk_{}", name.simple_name()))
}
