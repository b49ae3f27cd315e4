// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use tracing::{Level, event};

use crate::annotations::{MapKeyAnnotation, annotation_members, nested_annotation_types, unwrapped_value};
use crate::model::{AnnotationMirror, AnnotationValue, Elements, TypeElement, TypeKind, TypeName};

use super::GeneratedSource;
use super::naming::{ident, pascal_to_snake_case};

/// The module holding the creator functions generated for a map key annotation type.
#[must_use]
pub fn creator_module(map_key: &TypeName) -> TypeName {
    map_key.peer(&format!("{}_creator", pascal_to_snake_case(map_key.simple_name())))
}

fn creator_function(annotation_type: &TypeName) -> proc_macro2::Ident {
    ident(&format!("create_{}", pascal_to_snake_case(annotation_type.simple_name())))
}

/// Renders an annotation value as an expression.
///
/// Nested annotations are built by the creator functions in `creators`.
#[must_use]
pub fn annotation_value_tokens(elements: &dyn Elements, value: &AnnotationValue, creators: &TypeName) -> TokenStream {
    match value {
        AnnotationValue::Bool(value) => quote!(#value),
        AnnotationValue::Int(value) => {
            let literal = Literal::i64_unsuffixed(*value);
            quote!(#literal)
        }
        AnnotationValue::Char(value) => {
            let literal = Literal::character(*value);
            quote!(#literal)
        }
        AnnotationValue::Str(value) => {
            let literal = Literal::string(value);
            quote!(#literal)
        }
        AnnotationValue::Type(ty) => quote!(::core::any::TypeId::of::<#ty>()),
        AnnotationValue::Enum { ty, constant } => {
            let constant = ident(constant);
            quote!(#ty::#constant)
        }
        AnnotationValue::Annotation(annotation) => annotation_instance_tokens(elements, annotation, creators),
        AnnotationValue::Array(values) => {
            let values = values.iter().map(|value| annotation_value_tokens(elements, value, creators));
            quote!(::std::vec![#(#values),*])
        }
    }
}

/// Renders a call to the creator function building `annotation`, passing its members in
/// declaration order.
#[must_use]
pub fn annotation_instance_tokens(elements: &dyn Elements, annotation: &AnnotationMirror, creators: &TypeName) -> TokenStream {
    let function = creator_function(annotation.annotation_type());
    let members = elements
        .type_element(annotation.annotation_type())
        .map(annotation_members)
        .unwrap_or_default();
    let arguments = members.iter().map(|member| match annotation.value(member.name()) {
        Some(value) => annotation_value_tokens(elements, value, creators),
        None => quote!(::core::default::Default::default()),
    });
    quote!(#creators::#function(#(#arguments),*))
}

/// The expression of the map key an `@IntoMap` contribution is stored under.
#[must_use]
pub fn map_key_expression(elements: &dyn Elements, map_key: &AnnotationMirror) -> TokenStream {
    let creators = creator_module(map_key.annotation_type());
    let unwrap = elements
        .type_element(map_key.annotation_type())
        .and_then(MapKeyAnnotation::of)
        .is_none_or(|annotation| annotation.unwrap_value());

    if unwrap && let Some(value) = unwrapped_value(elements, map_key) {
        return annotation_value_tokens(elements, value, &creators);
    }
    annotation_instance_tokens(elements, map_key, &creators)
}

/// Generates the creator functions of `@MapKey(unwrap_value = false)` annotation types: one for
/// the key annotation and one for every annotation type nested in its members.
#[derive(Clone, Copy, Debug)]
pub struct AnnotationCreatorGenerator<'a> {
    elements: &'a dyn Elements,
}

impl<'a> AnnotationCreatorGenerator<'a> {
    /// Creates a generator.
    #[must_use]
    pub fn new(elements: &'a dyn Elements) -> Self {
        Self { elements }
    }

    /// Generates the creator module for `map_key`.
    #[must_use]
    pub fn generate(&self, map_key: &TypeElement) -> GeneratedSource {
        let mut annotation_types = vec![map_key];
        annotation_types.extend(nested_annotation_types(self.elements, map_key));
        creator_source(map_key, &annotation_types)
    }
}

/// Generates creator functions for the annotation types nested in an unwrapped map key whose
/// single member is itself an annotation.
#[derive(Clone, Copy, Debug)]
pub struct UnwrappedMapKeyGenerator<'a> {
    elements: &'a dyn Elements,
}

impl<'a> UnwrappedMapKeyGenerator<'a> {
    /// Creates a generator.
    #[must_use]
    pub fn new(elements: &'a dyn Elements) -> Self {
        Self { elements }
    }

    /// Returns `true` if the single member of `map_key` is an annotation type.
    #[must_use]
    pub fn applies_to(&self, map_key: &TypeElement) -> bool {
        match annotation_members(map_key) {
            [member] => member
                .return_type()
                .name()
                .and_then(|name| self.elements.type_element(name))
                .is_some_and(|element| element.kind() == TypeKind::Annotation),
            _ => false,
        }
    }

    /// Generates the creator module for the annotations nested in `map_key`.
    #[must_use]
    pub fn generate(&self, map_key: &TypeElement) -> GeneratedSource {
        let nested = nested_annotation_types(self.elements, map_key);
        creator_source(map_key, &nested)
    }
}

fn creator_source(map_key: &TypeElement, annotation_types: &[&TypeElement]) -> GeneratedSource {
    let name = creator_module(map_key.name());
    let functions = annotation_types.iter().map(|element| creator_function_tokens(element));
    event!(
        Level::DEBUG,
        map_key = %map_key.name(),
        functions = annotation_types.len(),
        "annotation creators generated"
    );

    GeneratedSource {
        name,
        tokens: quote! {
            #![allow(clippy::all, reason = "generated code")]
            #(#functions)*
        },
    }
}

#[cfg_attr(test, mutants::skip)]
fn creator_function_tokens(element: &TypeElement) -> TokenStream {
    let function = creator_function(element.name());
    let ty = element.name();
    let names: Vec<_> = annotation_members(element).iter().map(|member| ident(member.name())).collect();
    let types = annotation_members(element).iter().map(|member| member.return_type());
    quote! {
        pub fn #function(#(#names: #types),*) -> #ty {
            #ty { #(#names),* }
        }
    }
}
