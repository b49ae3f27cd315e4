// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::annotations::qualifiers;
use crate::model::{AnnotationMirror, ElementRef, Elements, TypeRef};
use crate::type_names;

use super::Key;

/// How a dependency is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    /// `T`.
    Instance,
    /// `Provider<T>`.
    Provider,
    /// `Lazy<T>`.
    Lazy,
    /// `Provider<Lazy<T>>`.
    ProviderOfLazy,
    /// `Producer<T>`.
    Producer,
    /// `Produced<T>`.
    Produced,
    /// `ProducerFuture<T>`.
    Future,
    /// Injection of the members of an existing instance.
    MembersInjection,
}

impl RequestKind {
    /// Returns `true` if satisfying the request needs the instance immediately.
    ///
    /// A cycle made only of such requests cannot be constructed.
    #[must_use]
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Instance | Self::Produced | Self::Future | Self::MembersInjection)
    }

    /// The framework type a request of this kind is served from, if it needs one.
    #[must_use]
    pub fn framework_type(self) -> Option<FrameworkType> {
        match self {
            Self::Provider | Self::Lazy | Self::ProviderOfLazy => Some(FrameworkType::Provider),
            Self::Producer => Some(FrameworkType::Producer),
            Self::Instance | Self::Produced | Self::Future | Self::MembersInjection => None,
        }
    }

    /// Splits a requested type into the request kind and the key type.
    #[must_use]
    pub fn from_type(ty: &TypeRef) -> (Self, &TypeRef) {
        fn single_argument(ty: &TypeRef) -> Option<&TypeRef> {
            match ty.type_arguments() {
                [argument] => Some(argument),
                _ => None,
            }
        }

        let Some(argument) = single_argument(ty) else {
            return (Self::Instance, ty);
        };

        if ty.is_declared_as(type_names::PROVIDER) {
            if argument.is_declared_as(type_names::LAZY)
                && let Some(inner) = single_argument(argument)
            {
                return (Self::ProviderOfLazy, inner);
            }
            return (Self::Provider, argument);
        }

        let kind = [
            (type_names::LAZY, Self::Lazy),
            (type_names::PRODUCER, Self::Producer),
            (type_names::PRODUCED, Self::Produced),
            (type_names::PRODUCER_FUTURE, Self::Future),
        ]
        .into_iter()
        .find_map(|(name, kind)| ty.is_declared_as(name).then_some(kind));

        match kind {
            Some(kind) => (kind, argument),
            None => (Self::Instance, ty),
        }
    }
}

/// The kind of framework instance a binding is exposed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameworkType {
    /// `dirk::Provider`.
    Provider,
    /// `dirk::producers::Producer`.
    Producer,
}

/// A request for a key, with the kind of access the requester needs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DependencyRequest {
    key: Key,
    kind: RequestKind,
    element: ElementRef,
}

impl DependencyRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(key: Key, kind: RequestKind, element: ElementRef) -> Self {
        Self { key, kind, element }
    }

    /// Creates the request for a declared type, e.g. a parameter or an entry point's return type.
    #[must_use]
    pub fn for_type(elements: &dyn Elements, ty: &TypeRef, annotations: &[AnnotationMirror], element: ElementRef) -> Self {
        let (kind, key_type) = RequestKind::from_type(ty);
        let qualifier = qualifiers(elements, annotations).first().map(|q| (*q).clone());
        Self::new(Key::new(key_type.clone(), qualifier), kind, element)
    }

    /// Creates a members injection request for the given type.
    #[must_use]
    pub fn for_members_injection(ty: &TypeRef, element: ElementRef) -> Self {
        Self::new(Key::of(ty.clone()), RequestKind::MembersInjection, element)
    }

    /// The requested key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// How the key is requested.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The requesting element.
    #[must_use]
    pub fn element(&self) -> &ElementRef {
        &self.element
    }
}
