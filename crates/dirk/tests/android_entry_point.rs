// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "test code")]

mod util;

use dirk::CompilerOptions;
use dirk::model::{AnnotationValue, ElementModel, TypeElement, TypeRef};
use dirk::type_names;
use pretty_assertions::assert_eq;
use util::*;

fn base_fragment() -> TypeElement {
    TypeElement::class("app::BaseFragment").implementing(ty(type_names::FRAGMENT))
}

fn entry_point(name: &str) -> TypeElement {
    TypeElement::class(name).annotated(annotation(type_names::ANDROID_ENTRY_POINT))
}

fn generated_fragment(model: &ElementModel, options: &CompilerOptions, name: &str) -> String {
    let (summary, filer, messager) = process(model, options);
    assert!(!messager.has_errors(), "{:?}", messager.errors());
    assert!(summary.generated.iter().any(|generated| generated == name), "{summary:?}");
    filer.file(name).expect("wrapper written").contents.clone()
}

#[test]
fn wrapper_overrides_lifecycle_hooks() {
    let model = ElementModel::new()
        .with_type(base_fragment())
        .with_type(entry_point("app::HomeFragment").with_superclass(ty("app::BaseFragment")));

    let generated = generated_fragment(&model, &CompilerOptions::default(), "app::Dirk_HomeFragment");

    assert!(generated.contains("pub trait HomeFragment_GeneratedInjector {"), "{generated}");
    assert!(
        generated.contains("fn inject_home_fragment(&self, fragment: &dyn ::dirk_android::Fragment);"),
        "{generated}"
    );
    assert!(generated.contains("pub struct Dirk_HomeFragment {"), "{generated}");
    assert!(generated.contains("base: app::BaseFragment,"), "{generated}");
    assert!(generated.contains("impl ::dirk_android::Fragment for Dirk_HomeFragment"), "{generated}");
    for hook in ["fn on_attach(", "fn on_attach_activity(", "fn context(", "fn on_get_layout_inflater("] {
        assert!(generated.contains(hook), "missing {hook} in {generated}");
    }
    assert!(generated.contains("DefaultViewModelFactories::fragment_factory"), "{generated}");
    assert!(generated.contains("self.component_context.borrow().is_none()"), "{generated}");
    assert!(!generated.contains("disable_get_context_fix"), "{generated}");
}

#[test]
fn get_context_fix_adds_runtime_switch() {
    let model = ElementModel::new()
        .with_type(base_fragment())
        .with_type(entry_point("app::HomeFragment").with_superclass(ty("app::BaseFragment")));
    let options = options(&[("dirk.android.useFragmentGetContextFix", "true")]);

    let generated = generated_fragment(&model, &options, "app::Dirk_HomeFragment");

    assert!(generated.contains("disable_get_context_fix: ::std::cell::Cell<bool>,"), "{generated}");
    assert!(generated.contains("!self.disable_get_context_fix.get()"), "{generated}");
    assert!(generated.contains("is_fragment_get_context_fix_disabled"), "{generated}");
}

#[test]
fn entry_point_base_keeps_its_own_view_model_factory() {
    let model = ElementModel::new()
        .with_type(TypeElement::class("app::RootFragment").implementing(ty(type_names::FRAGMENT)))
        .with_type(entry_point("app::BaseFragment").with_superclass(ty("app::RootFragment")))
        .with_type(entry_point("app::HomeFragment").with_superclass(ty("app::BaseFragment")));

    let base = generated_fragment(&model, &CompilerOptions::default(), "app::Dirk_BaseFragment");
    let home = generated_fragment(&model, &CompilerOptions::default(), "app::Dirk_HomeFragment");

    assert!(base.contains("fn default_view_model_provider_factory("), "{base}");
    assert!(!home.contains("fn default_view_model_provider_factory("), "{home}");
}

#[test]
fn generic_base_parameters_are_repeated() {
    let model = ElementModel::new()
        .with_type(base_fragment().with_type_parameter("T"))
        .with_type(entry_point("app::HomeFragment").with_superclass(TypeRef::generic("app::BaseFragment", [ty("T")])));

    let generated = generated_fragment(&model, &CompilerOptions::default(), "app::Dirk_HomeFragment");

    assert!(generated.contains("pub struct Dirk_HomeFragment<T> {"), "{generated}");
    assert!(generated.contains("impl<T> Dirk_HomeFragment<T> {"), "{generated}");
    assert!(generated.contains("base: app::BaseFragment<T>,"), "{generated}");
}

#[test]
fn explicit_base_requires_extending_the_generated_type() {
    let model = ElementModel::new().with_type(base_fragment()).with_type(
        TypeElement::class("app::HomeFragment").annotated(
            annotation(type_names::ANDROID_ENTRY_POINT).with_value("value", AnnotationValue::Type(ty("app::BaseFragment"))),
        ),
    );

    let (summary, filer, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.skipped, ["app::HomeFragment"]);
    assert!(filer.files().is_empty());
    assert_eq!(
        messager.errors(),
        ["@AndroidEntryPoint class expected [app::Dirk_HomeFragment] but found [nothing]. Did you forget to extend the generated type?"]
    );
}

#[test]
fn superclass_validation_can_be_disabled() {
    let model = ElementModel::new().with_type(base_fragment()).with_type(
        TypeElement::class("app::HomeFragment").annotated(
            annotation(type_names::ANDROID_ENTRY_POINT).with_value("value", AnnotationValue::Type(ty("app::BaseFragment"))),
        ),
    );
    let options = options(&[("dirk.android.internal.disableAndroidSuperclassValidation", "true")]);

    let generated = generated_fragment(&model, &options, "app::Dirk_HomeFragment");

    assert!(generated.contains("base: app::BaseFragment,"), "{generated}");
}

#[test]
fn non_fragment_base_is_rejected() {
    let model = ElementModel::new()
        .with_type(TypeElement::class("app::Widget"))
        .with_type(entry_point("app::HomeWidget").with_superclass(ty("app::Widget")));

    let (summary, _, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(summary.skipped, ["app::HomeWidget"]);
    assert_eq!(
        messager.errors(),
        ["@AndroidEntryPoint base type app::Widget is not supported; expected a subtype of dirk_android::Fragment"]
    );
}

#[test]
fn entry_point_without_base_is_rejected() {
    let model = ElementModel::new().with_type(entry_point("app::Orphan"));

    let (_, _, messager) = process(&model, &CompilerOptions::default());

    assert_eq!(messager.errors(), ["@AndroidEntryPoint type app::Orphan must extend a base type"]);
}
