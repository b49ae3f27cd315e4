// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "test code")]

mod util;

use dirk::binding::{BindingKind, ContributionType, Key, map_of, set_of};
use dirk::model::{ElementModel, TypeName, TypeRef};
use dirk::type_names;
use pretty_assertions::assert_eq;
use util::*;

#[test]
fn missing_binding_is_reported_once_and_siblings_still_resolve() {
    let model = ElementModel::new()
        .with_type(component(
            "app::App",
            &[],
            &[("missing", ty("app::Missing")), ("present", ty("app::Present"))],
        ))
        .with_type(injectable("app::Present", &[]));

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["app::Missing cannot be provided without an @Inject constructor or a @Provides-annotated method"]
    );
}

#[test]
fn duplicate_provisions_name_every_source() {
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::DbModule"], &[("db", ty("app::Db"))]))
        .with_type(
            module("app::DbModule")
                .with_method(provides("primary", ty("app::Db")))
                .with_method(provides("secondary", ty("app::Db"))),
        );

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["app::Db is bound multiple times: app::DbModule::primary, app::DbModule::secondary"]
    );
}

#[test]
fn direct_cycle_is_an_error() {
    let model = ElementModel::new()
        .with_type(component("app::App", &[], &[("a", ty("app::A"))]))
        .with_type(injectable("app::A", &[("b", ty("app::B"))]))
        .with_type(injectable("app::B", &[("a", ty("app::A"))]));

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(errors, ["Found a dependency cycle: app::A -> app::B -> app::A"]);
}

#[test]
fn cycle_through_provider_resolves_and_is_marked() {
    let model = ElementModel::new()
        .with_type(component("app::App", &[], &[("a", ty("app::A"))]))
        .with_type(injectable("app::A", &[("b", provider_of("app::B"))]))
        .with_type(injectable("app::B", &[("a", ty("app::A"))]));

    let graph = resolve(&model, "app::App").expect("provider breaks the cycle");

    assert!(graph.is_on_cycle(&Key::of(ty("app::A"))));
    assert!(graph.is_on_cycle(&Key::of(ty("app::B"))));
    assert_eq!(graph.cycle_keys().count(), 2);
}

#[test]
fn binds_resolves_to_the_implementation() {
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::StoreModule"], &[("store", ty("app::Store"))]))
        .with_type(
            module("app::StoreModule")
                .abstract_type()
                .with_method(binds("bind_store", ty("app::Store"), ty("app::DiskStore"))),
        )
        .with_type(injectable("app::DiskStore", &[]));

    let graph = resolve(&model, "app::App").expect("graph resolves");

    let store = graph.binding(&Key::of(ty("app::Store"))).expect("store is bound");
    assert_eq!(store.kind(), BindingKind::Delegate);
    assert_eq!(store.dependencies()[0].key(), &Key::of(ty("app::DiskStore")));
    assert_eq!(
        graph.binding(&Key::of(ty("app::DiskStore"))).map(|binding| binding.kind()),
        Some(BindingKind::Injection)
    );
}

#[test]
fn set_contributions_are_aggregated_in_declaration_order() {
    let plugin = ty("app::Plugin");
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::Plugins"], &[("plugins", set_of(plugin.clone()))]))
        .with_type(
            module("app::Plugins")
                .with_method(provides("first", plugin.clone()).annotated(annotation(type_names::INTO_SET)))
                .with_method(provides("second", plugin.clone()).annotated(annotation(type_names::INTO_SET))),
        );

    let graph = resolve(&model, "app::App").expect("graph resolves");

    let set = graph.binding(&Key::of(set_of(plugin.clone()))).expect("set is bound");
    assert_eq!(set.kind(), BindingKind::MultiboundSet);
    let methods: Vec<_> = set
        .dependencies()
        .iter()
        .filter_map(|dependency| dependency.key().contribution())
        .map(|id| id.method().to_string())
        .collect();
    assert_eq!(methods, ["first", "second"]);
    assert!(
        set.entries()
            .iter()
            .all(|entry| entry.contribution_type == ContributionType::IntoSet)
    );
}

#[test]
fn multibinds_declaration_allows_an_empty_set() {
    let plugin = ty("app::Plugin");
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::Plugins"], &[("plugins", set_of(plugin.clone()))]))
        .with_type(
            module("app::Plugins").abstract_type().with_method(
                dirk::model::ExecutableElement::method("plugins", set_of(plugin.clone()))
                    .annotated(annotation(type_names::MULTIBINDS))
                    .abstract_method(),
            ),
        );

    let graph = resolve(&model, "app::App").expect("declared multibinding may be empty");

    let set = graph.binding(&Key::of(set_of(plugin))).expect("set is bound");
    assert_eq!(set.kind(), BindingKind::MultiboundSet);
    assert!(set.dependencies().is_empty());
}

#[test]
fn duplicate_map_keys_are_reported() {
    let page = ty("app::Page");
    let home = || string_key_value("app::PageKey", "home");
    let model = ElementModel::new()
        .with_type(string_key("app::PageKey"))
        .with_type(component(
            "app::App",
            &["app::Pages"],
            &[("pages", map_of(TypeRef::primitive("str"), page.clone()))],
        ))
        .with_type(
            module("app::Pages")
                .with_method(
                    provides("home", page.clone())
                        .annotated(annotation(type_names::INTO_MAP))
                        .annotated(home()),
                )
                .with_method(
                    provides("landing", page.clone())
                        .annotated(annotation(type_names::INTO_MAP))
                        .annotated(home()),
                ),
        );

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].starts_with("The same map key is bound more than once for std::collections::HashMap<str, app::Page>"),
        "{errors:?}"
    );
    assert!(errors[0].ends_with("is contributed by app::Pages::home and app::Pages::landing"), "{errors:?}");
}

#[test]
fn unscoped_component_rejects_scoped_binding() {
    let model = ElementModel::new()
        .with_type(scope_annotation("app::AppScope"))
        .with_type(component("app::App", &[], &[("cache", ty("app::Cache"))]))
        .with_type(injectable("app::Cache", &[]).annotated(annotation("app::AppScope")));

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["app::Cache is scoped with @app::AppScope but app::App does not have that scope"]
    );
}

#[test]
fn scoped_binding_is_owned_by_the_component_with_the_scope() {
    let model = ElementModel::new()
        .with_type(scope_annotation("app::AppScope"))
        .with_type(
            component("app::App", &[], &[("child", ty("app::Child"))]).annotated(annotation("app::AppScope")),
        )
        .with_type(subcomponent("app::Child", &[], &[("cache", ty("app::Cache"))]))
        .with_type(injectable("app::Cache", &[]).annotated(annotation("app::AppScope")));

    let graph = resolve(&model, "app::App").expect("graph resolves");
    let cache = Key::of(ty("app::Cache"));

    let child = graph.child(&TypeName::new("app::Child")).expect("child graph");
    assert_eq!(child.owner_distance(&cache), Some(1));
    assert!(child.binding(&cache).is_none());
    assert_eq!(graph.owner_distance(&cache), Some(0));
    assert!(graph.binding(&cache).is_some_and(|binding| binding.is_scoped()));
}

#[test]
fn subcomponent_inherits_parent_module_bindings() {
    let config = ty("app::Config");
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::ConfigModule"], &[("child", ty("app::Child"))]))
        .with_type(module("app::ConfigModule").with_method(provides("config", config.clone())))
        .with_type(subcomponent("app::Child", &[], &[("config", config.clone())]));

    let graph = resolve(&model, "app::App").expect("graph resolves");

    let child = graph.child(&TypeName::new("app::Child")).expect("child graph");
    assert_eq!(child.owner_distance(&Key::of(config.clone())), Some(1));
    assert_eq!(child.inherited_keys().count(), 1);
    assert_eq!(
        graph.binding(&Key::of(ty("app::Child"))).map(|binding| binding.kind()),
        Some(BindingKind::SubcomponentCreator)
    );
    assert!(graph.binding(&Key::of(config)).is_some());
}

#[test]
fn subcomponent_cannot_rebind_a_parent_binding() {
    let config = ty("app::Config");
    let model = ElementModel::new()
        .with_type(component("app::App", &["app::ParentModule"], &[("child", ty("app::Child"))]))
        .with_type(module("app::ParentModule").with_method(provides("config", config.clone())))
        .with_type(subcomponent("app::Child", &["app::ChildModule"], &[("config", config.clone())]))
        .with_type(module("app::ChildModule").with_method(provides("config", config)));

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["app::Config is bound multiple times: app::ParentModule::config, app::ChildModule::config"]
    );
}

#[test]
fn assisted_inject_type_cannot_be_requested_directly() {
    let model = ElementModel::new()
        .with_type(component("app::App", &[], &[("download", ty("app::Download"))]))
        .with_type(
            dirk::model::TypeElement::class("app::Download").with_constructor(
                dirk::model::ExecutableElement::constructor()
                    .annotated(annotation(type_names::ASSISTED_INJECT))
                    .with_parameter(parameter("url", ty("app::Url")).annotated(annotation(type_names::ASSISTED))),
            ),
        );

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["app::Download cannot be requested directly because its constructor is @AssistedInject; request its @AssistedFactory instead"]
    );
}

#[test]
fn factory_parameters_must_pair_with_assisted_parameters() {
    let model = ElementModel::new()
        .with_type(component("app::App", &[], &[("downloads", ty("app::DownloadFactory"))]))
        .with_type(
            dirk::model::TypeElement::class("app::Download").with_constructor(
                dirk::model::ExecutableElement::constructor()
                    .annotated(annotation(type_names::ASSISTED_INJECT))
                    .with_parameter(parameter("url", ty("app::Url")).annotated(annotation(type_names::ASSISTED))),
            ),
        )
        .with_type(
            dirk::model::TypeElement::trait_type("app::DownloadFactory")
                .annotated(annotation(type_names::ASSISTED_FACTORY))
                .with_method(
                    dirk::model::ExecutableElement::method("create", ty("app::Download"))
                        .abstract_method()
                        .with_parameter(parameter("retries", TypeRef::primitive("u32"))),
                ),
        );

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["The parameters of the factory method must match the @Assisted parameters of app::Download: expected (app::Url), found (u32)"]
    );
}

#[test]
fn component_descriptor_rejects_misshapen_entry_points() {
    let model = ElementModel::new().with_type(
        component("app::App", &[], &[]).with_method(
            dirk::model::ExecutableElement::method("build", ty("app::Thing"))
                .abstract_method()
                .with_parameter(parameter("first", ty("app::A")))
                .with_parameter(parameter("second", ty("app::B"))),
        ),
    );

    let errors = resolve(&model, "app::App").unwrap_err();

    assert_eq!(
        errors,
        ["Component methods must either take no parameters and return a value, or take one parameter and return nothing"]
    );
}
