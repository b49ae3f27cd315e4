// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "test code")]

mod util;

use dirk::model::{ElementModel, ExecutableElement, TypeElement, TypeRef};
use dirk::type_names;
use dirk::validation::{BindingMethodValidator, BindsMethod, ModuleValidator, MultibindsMethod, ProducesMethod, ProvidesMethod};
use pretty_assertions::assert_eq;
use rstest::rstest;
use util::*;

fn validate_module(model: &ElementModel, module: &TypeElement) -> Vec<String> {
    ModuleValidator::new(model)
        .validate(module)
        .errors()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn well_formed_module_is_clean() {
    let store = module("app::StoreModule")
        .abstract_type()
        .with_method(binds("bind_store", ty("app::Store"), ty("app::DiskStore")))
        .with_method(provides("path", ty("app::Path")));
    let model = ElementModel::new()
        .with_type(TypeElement::class("app::DiskStore").implementing(ty("app::Store")))
        .with_type(store.clone());

    assert_eq!(validate_module(&model, &store), Vec::<String>::new());
}

#[test]
fn includes_and_subcomponents_must_resolve() {
    let broken = TypeElement::class("app::Broken").annotated(
        annotation(type_names::MODULE)
            .with_value("includes", types(&["app::Missing", "app::Broken", "app::NotAModule"]))
            .with_value("subcomponents", types(&["app::NotASubcomponent"])),
    );
    let model = ElementModel::new()
        .with_type(TypeElement::class("app::NotAModule"))
        .with_type(TypeElement::trait_type("app::NotASubcomponent"))
        .with_type(broken.clone());

    insta::assert_debug_snapshot!(validate_module(&model, &broken), @r#"
    [
        "@Module includes app::Missing, which could not be resolved",
        "@Module cannot include itself",
        "app::NotAModule is listed as a module, but is not annotated with @Module or @ProducerModule",
        "app::NotASubcomponent is listed as a subcomponent, but is not annotated with @Subcomponent",
    ]
    "#);
}

#[test]
fn method_with_two_binding_annotations_is_rejected() {
    let module = module("app::Confused").with_method(provides("value", ty("app::Value")).annotated(annotation(type_names::BINDS)));
    let model = ElementModel::new().with_type(module.clone());

    assert_eq!(
        validate_module(&model, &module),
        ["Binding methods may not have more than one binding method annotation"]
    );
}

#[rstest]
#[case::returns_unit(
    ExecutableElement::method("nothing", TypeRef::Unit).annotated(annotation(type_names::PROVIDES)).static_method(),
    "@Provides methods must return a value (not unit)"
)]
#[case::abstract_method(
    ExecutableElement::method("value", ty("app::Value")).annotated(annotation(type_names::PROVIDES)).abstract_method(),
    "@Provides methods cannot be abstract"
)]
#[case::generic(
    provides("value", ty("app::Value")).with_type_parameter("T"),
    "@Provides methods may not have type parameters"
)]
#[case::returns_provider(
    provides("value", provider_of("app::Value")),
    "@Provides methods must not return framework types, found dirk::Provider<app::Value>"
)]
#[case::map_key_without_into_map(
    provides("value", ty("app::Value")).annotated(string_key_value("app::StringKey", "home")),
    "@Provides methods with a map key must also be annotated @IntoMap"
)]
#[case::into_map_without_key(
    provides("value", ty("app::Value")).annotated(annotation(type_names::INTO_MAP)),
    "@Provides methods of type map must declare a map key"
)]
fn provides_method_errors(#[case] method: ExecutableElement, #[case] expected: &str) {
    let owner = module("app::Values");
    let model = ElementModel::new().with_type(string_key("app::StringKey"));

    let report = BindingMethodValidator::new(&model).validate(&ProvidesMethod, &owner, &method);

    assert_eq!(report.errors(), [expected]);
}

#[test]
fn provides_outside_a_module_is_rejected() {
    let owner = TypeElement::class("app::NotAModule");
    let model = ElementModel::new();

    let report = BindingMethodValidator::new(&model).validate(&ProvidesMethod, &owner, &provides("value", ty("app::Value")));

    assert_eq!(
        report.errors(),
        ["@Provides methods can only be present within a @Module or @ProducerModule"]
    );
}

#[test]
fn produces_requires_a_producer_module() {
    let method = ExecutableElement::method("value", ty("app::Value"))
        .annotated(annotation(type_names::PRODUCES))
        .async_method();
    let model = ElementModel::new();

    let in_module = BindingMethodValidator::new(&model).validate(&ProducesMethod, &module("app::Values"), &method);
    let in_producer_module = BindingMethodValidator::new(&model).validate(
        &ProducesMethod,
        &TypeElement::class("app::Values").annotated(annotation(type_names::PRODUCER_MODULE)),
        &method,
    );

    assert_eq!(in_module.errors(), ["@Produces methods can only be present within a @ProducerModule"]);
    assert!(in_producer_module.is_clean());
}

#[test]
fn binds_parameter_must_be_a_subtype() {
    let model = ElementModel::new().with_type(TypeElement::class("app::Unrelated"));
    let method = binds("bind_store", ty("app::Store"), ty("app::Unrelated"));

    let report = BindingMethodValidator::new(&model).validate(&BindsMethod, &module("app::Stores"), &method);

    assert_eq!(
        report.errors(),
        ["@Binds methods must have a parameter assignable to the return type: app::Unrelated is not a subtype of app::Store"]
    );
}

#[test]
fn binds_needs_exactly_one_parameter() {
    let model = ElementModel::new();
    let method = ExecutableElement::method("bind_store", ty("app::Store"))
        .annotated(annotation(type_names::BINDS))
        .abstract_method();

    let report = BindingMethodValidator::new(&model).validate(&BindsMethod, &module("app::Stores"), &method);

    assert_eq!(
        report.errors(),
        ["@Binds methods must have exactly one parameter, whose type is assignable to the return type"]
    );
}

#[rstest]
#[case::not_a_collection(ty("app::Plugin"), "@Multibinds methods must return Map<K, V> or Set<T>, found app::Plugin")]
#[case::set_of_providers(
    TypeRef::generic(type_names::SET, [provider_of("app::Plugin")]),
    "@Multibinds methods must return Map<K, V> or Set<T>, found std::collections::HashSet<dirk::Provider<app::Plugin>>"
)]
fn multibinds_return_type_errors(#[case] return_type: TypeRef, #[case] expected: &str) {
    let model = ElementModel::new();
    let method = ExecutableElement::method("plugins", return_type)
        .annotated(annotation(type_names::MULTIBINDS))
        .abstract_method();

    let report = BindingMethodValidator::new(&model).validate(&MultibindsMethod, &module("app::Plugins"), &method);

    assert_eq!(report.errors(), [expected]);
}

#[test]
fn multibinds_cannot_take_parameters() {
    let model = ElementModel::new();
    let method = ExecutableElement::method("plugins", dirk::binding::set_of(ty("app::Plugin")))
        .annotated(annotation(type_names::MULTIBINDS))
        .abstract_method()
        .with_parameter(parameter("seed", ty("app::Plugin")));

    let report = BindingMethodValidator::new(&model).validate(&MultibindsMethod, &module("app::Plugins"), &method);

    assert_eq!(report.errors(), ["@Multibinds methods cannot have parameters"]);
}
