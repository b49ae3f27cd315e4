// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builders for the declaration models used across the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use dirk::binding::{BindingGraph, BindingGraphFactory, ComponentDescriptor};
use dirk::model::{
    AnnotationMirror, AnnotationValue, ElementModel, Elements, ExecutableElement, TypeElement, TypeName, TypeRef, VariableElement,
};
use dirk::writing::ComponentGenerator;
use dirk::{CollectingMessager, CompilationContext, CompilerOptions, InMemoryFiler, ProcessingSummary, Processor, type_names};

pub fn ty(name: &str) -> TypeRef {
    TypeRef::declared(name)
}

pub fn annotation(name: &str) -> AnnotationMirror {
    AnnotationMirror::new(name)
}

pub fn types(names: &[&str]) -> AnnotationValue {
    AnnotationValue::Array(names.iter().map(|name| AnnotationValue::Type(ty(name))).collect())
}

pub fn parameter(name: &str, ty: TypeRef) -> VariableElement {
    VariableElement::new(name, ty)
}

pub fn provider_of(name: &str) -> TypeRef {
    TypeRef::generic(type_names::PROVIDER, [ty(name)])
}

/// A root component with the given modules and provision methods `(name, type)`.
pub fn component(name: &str, modules: &[&str], provisions: &[(&str, TypeRef)]) -> TypeElement {
    entry_points(TypeElement::trait_type(name), type_names::COMPONENT, modules, provisions)
}

/// A subcomponent with the given modules and provision methods.
pub fn subcomponent(name: &str, modules: &[&str], provisions: &[(&str, TypeRef)]) -> TypeElement {
    entry_points(TypeElement::trait_type(name), type_names::SUBCOMPONENT, modules, provisions)
}

fn entry_points(element: TypeElement, annotation_type: &str, modules: &[&str], provisions: &[(&str, TypeRef)]) -> TypeElement {
    let element = element.annotated(annotation(annotation_type).with_value("modules", types(modules)));
    provisions.iter().fold(element, |element, (method, ty)| {
        element.with_method(ExecutableElement::method(*method, ty.clone()).abstract_method())
    })
}

/// A type with an `@Inject` constructor taking the given parameters.
pub fn injectable(name: &str, parameters: &[(&str, TypeRef)]) -> TypeElement {
    TypeElement::class(name).with_constructor(inject_constructor(parameters))
}

pub fn inject_constructor(parameters: &[(&str, TypeRef)]) -> ExecutableElement {
    parameters.iter().fold(
        ExecutableElement::constructor().annotated(annotation(type_names::INJECT)),
        |constructor, (name, ty)| constructor.with_parameter(parameter(name, ty.clone())),
    )
}

pub fn module(name: &str) -> TypeElement {
    TypeElement::class(name).annotated(annotation(type_names::MODULE))
}

/// A static `@Provides` method.
pub fn provides(name: &str, ty: TypeRef) -> ExecutableElement {
    ExecutableElement::method(name, ty)
        .annotated(annotation(type_names::PROVIDES))
        .static_method()
}

/// An abstract `@Binds` method binding `implementation` to `ty`.
pub fn binds(name: &str, ty: TypeRef, implementation: TypeRef) -> ExecutableElement {
    ExecutableElement::method(name, ty)
        .annotated(annotation(type_names::BINDS))
        .abstract_method()
        .with_parameter(parameter("implementation", implementation))
}

/// A `@Scope` annotation type.
pub fn scope_annotation(name: &str) -> TypeElement {
    TypeElement::annotation_type(name).annotated(annotation(type_names::SCOPE))
}

/// A string-keyed `@MapKey` annotation type.
pub fn string_key(name: &str) -> TypeElement {
    TypeElement::annotation_type(name)
        .annotated(annotation(type_names::MAP_KEY))
        .with_method(ExecutableElement::method("value", TypeRef::primitive("str")).abstract_method())
}

pub fn string_key_value(name: &str, value: &str) -> AnnotationMirror {
    annotation(name).with_value("value", AnnotationValue::Str(value.into()))
}

/// Resolves the graph of a root component, returning the messages reported on failure.
pub fn resolve(model: &ElementModel, component: &str) -> Result<BindingGraph, Vec<String>> {
    let element = model
        .type_element(&TypeName::new(component))
        .expect("component is declared in the model");
    let descriptor = ComponentDescriptor::root(model, element).map_err(|report| {
        report.errors().into_iter().map(ToString::to_string).collect::<Vec<_>>()
    })?;

    let messager = CollectingMessager::new();
    BindingGraphFactory::new(model, &messager)
        .create(&descriptor)
        .ok_or_else(|| messager.errors())
}

/// Generates and pretty-prints the implementation of a root component.
pub fn generate(model: &ElementModel, component: &str, options: &CompilerOptions) -> String {
    let graph = resolve(model, component).expect("graph resolves");
    let source = ComponentGenerator::new(model, options)
        .expect("options are valid")
        .generate(&graph)
        .expect("generation succeeds");
    prettyplease::unparse(&syn::parse2(source.tokens).expect("generated code parses"))
}

/// Runs the whole processor.
pub fn process(model: &ElementModel, options: &CompilerOptions) -> (ProcessingSummary, InMemoryFiler, CollectingMessager) {
    let messager = CollectingMessager::new();
    let mut filer = InMemoryFiler::new();
    let summary = Processor::new(CompilationContext::new(model, options, &messager))
        .process(&mut filer)
        .expect("processing succeeds");
    (summary, filer, messager)
}

pub fn options(raw: &[(&str, &str)]) -> CompilerOptions {
    CompilerOptions::from_map(raw.iter().copied())
}
