// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Qualified names of the annotations and framework types the generator recognizes.

#![expect(missing_docs, reason = "the constants are named after the annotation or type they identify")]

// Binding annotations.
pub const MODULE: &str = "dirk::Module";
pub const PRODUCER_MODULE: &str = "dirk::producers::ProducerModule";
pub const PROVIDES: &str = "dirk::Provides";
pub const PRODUCES: &str = "dirk::producers::Produces";
pub const BINDS: &str = "dirk::Binds";
pub const MULTIBINDS: &str = "dirk::multibindings::Multibinds";
pub const INTO_SET: &str = "dirk::multibindings::IntoSet";
pub const ELEMENTS_INTO_SET: &str = "dirk::multibindings::ElementsIntoSet";
pub const INTO_MAP: &str = "dirk::multibindings::IntoMap";
pub const MAP_KEY: &str = "dirk::MapKey";

// Injection annotations.
pub const INJECT: &str = "dirk::Inject";
pub const QUALIFIER: &str = "dirk::Qualifier";
pub const SCOPE: &str = "dirk::Scope";
pub const NAMED: &str = "dirk::Named";
pub const SINGLETON: &str = "dirk::Singleton";
pub const REUSABLE: &str = "dirk::Reusable";

// Assisted injection.
pub const ASSISTED: &str = "dirk::assisted::Assisted";
pub const ASSISTED_INJECT: &str = "dirk::assisted::AssistedInject";
pub const ASSISTED_FACTORY: &str = "dirk::assisted::AssistedFactory";

// Components.
pub const COMPONENT: &str = "dirk::Component";
pub const SUBCOMPONENT: &str = "dirk::Subcomponent";

// Framework types.
pub const PROVIDER: &str = "dirk::Provider";
pub const LAZY: &str = "dirk::Lazy";
pub const PRODUCER: &str = "dirk::producers::Producer";
pub const PRODUCED: &str = "dirk::producers::Produced";
pub const PRODUCER_FUTURE: &str = "dirk::producers::ProducerFuture";
pub const RUNTIME_EXCEPTION: &str = "dirk::RuntimeException";

// Collections.
pub const MAP: &str = "std::collections::HashMap";
pub const SET: &str = "std::collections::HashSet";

// Android entry points.
pub const ANDROID_ENTRY_POINT: &str = "dirk_android::AndroidEntryPoint";
pub const FRAGMENT: &str = "dirk_android::Fragment";

/// Framework wrapper types that are not valid binding types on their own.
pub const FRAMEWORK_TYPES: [&str; 5] = [PROVIDER, LAZY, PRODUCER, PRODUCED, PRODUCER_FUTURE];

/// Returns `true` if the type is one of the framework wrapper types.
#[must_use]
pub fn is_framework_type(ty: &crate::model::TypeRef) -> bool {
    FRAMEWORK_TYPES.iter().any(|name| ty.is_declared_as(name))
}
