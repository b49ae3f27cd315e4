// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "test code")]

mod util;

use dirk::model::{AnnotationValue, ElementModel, ExecutableElement, TypeElement, TypeRef};
use dirk::{CollectingMessager, CompilationContext, CompilerOptions, Error, InMemoryFiler, Processor, type_names};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use util::*;

fn database_app() -> ElementModel {
    ElementModel::new()
        .with_type(component("app::App", &[], &[("database", ty("app::Database"))]))
        .with_type(injectable("app::Database", &[]))
}

#[test]
#[traced_test]
fn valid_component_is_generated_and_formatted() {
    let (summary, filer, messager) = process(&database_app(), &CompilerOptions::default());

    assert_eq!(summary.generated, ["app::DirkApp"]);
    assert!(summary.skipped.is_empty());
    assert!(!messager.has_errors());

    let file = filer.file("app::DirkApp").expect("component file written");
    assert!(file.contents.contains("fn database(&self) -> app::Database {"), "{}", file.contents);
    assert!(logs_contain("generated file written"));
}

#[test]
fn unformatted_output_is_the_raw_token_stream() {
    let (_, filer, _) = process(&database_app(), &options(&[("dirk.formatGeneratedSource", "false")]));

    let contents = &filer.files()[0].contents;
    assert!(contents.contains("app :: Database :: new ()"), "{contents}");
    assert!(!contents.contains('\n'), "{contents}");
}

#[test]
fn malformed_option_aborts_the_compilation() {
    let options = options(&[("dirk.formatGeneratedSource", "maybe")]);
    let messager = CollectingMessager::new();
    let mut filer = InMemoryFiler::new();

    let error = Processor::new(CompilationContext::new(&database_app(), &options, &messager))
        .process(&mut filer)
        .unwrap_err();

    assert!(matches!(error, Error::Config(_)));
    assert_eq!(
        error.to_string(),
        "expected a value of true/false for the flag \"dirk.formatGeneratedSource\", got instead: maybe"
    );
    assert!(filer.files().is_empty());
}

#[test]
fn invalid_module_suppresses_dependent_components_only() {
    let model = ElementModel::new()
        .with_type(component("app::Broken", &["app::BadModule"], &[("database", ty("app::Database"))]))
        .with_type(component("app::Working", &[], &[("database", ty("app::Database"))]))
        .with_type(
            module("app::BadModule").with_method(
                ExecutableElement::method("database", ty("app::Database"))
                    .annotated(annotation(type_names::PROVIDES))
                    .abstract_method(),
            ),
        )
        .with_type(injectable("app::Database", &[]));

    let (summary, _, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.generated, ["app::DirkWorking"]);
    assert_eq!(summary.skipped, ["app::BadModule", "app::Broken"]);
    assert_eq!(messager.errors(), ["@Provides methods cannot be abstract"]);
}

#[test]
fn graph_errors_skip_the_component() {
    let model = ElementModel::new().with_type(component("app::App", &[], &[("missing", ty("app::Missing"))]));

    let (summary, filer, messager) = process(&model, &CompilerOptions::default());

    assert!(summary.generated.is_empty());
    assert_eq!(summary.skipped, ["app::App"]);
    assert!(filer.files().is_empty());
    assert_eq!(
        messager.errors(),
        ["app::Missing cannot be provided without an @Inject constructor or a @Provides-annotated method"]
    );
}

#[test]
fn wrapped_map_key_gets_creator_functions() {
    let model = ElementModel::new().with_type(
        TypeElement::annotation_type("app::Route")
            .annotated(annotation(type_names::MAP_KEY).with_value("unwrap_value", AnnotationValue::Bool(false)))
            .with_method(ExecutableElement::method("path", TypeRef::primitive("str")).abstract_method())
            .with_method(ExecutableElement::method("weight", TypeRef::primitive("i32")).abstract_method()),
    );

    let (summary, filer, _) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.generated, ["app::route_creator"]);
    let contents = &filer.files()[0].contents;
    assert!(contents.contains("pub fn create_route(path: &'static str, weight: i32) -> app::Route {"), "{contents}");
}

#[test]
fn map_key_without_members_is_rejected() {
    let model = ElementModel::new()
        .with_type(TypeElement::annotation_type("app::EmptyKey").annotated(annotation(type_names::MAP_KEY)));

    let (summary, filer, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.skipped, ["app::EmptyKey"]);
    assert!(filer.files().is_empty());
    assert_eq!(messager.errors(), ["Map key annotations must have members"]);
}

#[test]
fn misplaced_assisted_parameter_is_reported() {
    let model = ElementModel::new().with_type(
        injectable("app::Download", &[])
            .with_method(
                ExecutableElement::method("retry", TypeRef::Unit)
                    .with_parameter(parameter("attempt", TypeRef::primitive("u32")).annotated(annotation(type_names::ASSISTED))),
            ),
    );

    let (summary, _, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.skipped, ["app::Download"]);
    assert_eq!(
        messager.errors(),
        ["@Assisted parameters can only be used within an @AssistedInject-annotated constructor."]
    );
}

#[test]
fn component_using_an_invalid_assisted_type_is_skipped() {
    let model = ElementModel::new()
        .with_type(component("app::App", &[], &[("downloads", ty("app::DownloadFactory"))]))
        .with_type(
            TypeElement::class("app::Download").with_constructor(
                ExecutableElement::constructor()
                    .annotated(annotation(type_names::ASSISTED_INJECT))
                    .with_parameter(
                        parameter("url", ty("app::Url"))
                            .annotated(annotation(type_names::ASSISTED))
                            .annotated(annotation(type_names::NAMED)),
                    ),
            ),
        )
        .with_type(
            TypeElement::trait_type("app::DownloadFactory")
                .annotated(annotation(type_names::ASSISTED_FACTORY))
                .with_method(
                    ExecutableElement::method("create", ty("app::Download"))
                        .abstract_method()
                        .with_parameter(parameter("url", ty("app::Url"))),
                ),
        );

    let (summary, filer, messager) = process(&model, &CompilerOptions::default());

    assert!(summary.generated.is_empty());
    assert_eq!(summary.skipped, ["app::Download", "app::App"]);
    assert!(filer.files().is_empty());
    assert_eq!(messager.errors(), ["Qualifiers cannot be used with @Assisted parameters."]);
}
