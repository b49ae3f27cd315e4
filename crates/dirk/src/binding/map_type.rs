// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::model::TypeRef;
use crate::type_names;

/// A structural view over a `HashMap<K, V>` type.
#[derive(Clone, Copy, Debug)]
pub struct MapType<'a> {
    ty: &'a TypeRef,
}

impl<'a> MapType<'a> {
    /// Returns `true` if `ty` is the map type, parameterized or not.
    #[must_use]
    pub fn is_map(ty: &TypeRef) -> bool {
        ty.is_declared_as(type_names::MAP)
    }

    /// Views `ty` as a map, if it is one.
    #[must_use]
    pub fn from(ty: &'a TypeRef) -> Option<Self> {
        Self::is_map(ty).then_some(Self { ty })
    }

    /// Returns `true` if the map has no type arguments.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.ty.type_arguments().is_empty()
    }

    /// The key type.
    #[must_use]
    pub fn key_type(&self) -> Option<&'a TypeRef> {
        self.ty.type_arguments().first()
    }

    /// The value type.
    #[must_use]
    pub fn value_type(&self) -> Option<&'a TypeRef> {
        self.ty.type_arguments().get(1)
    }

    /// Returns `true` if the value type is the given framework wrapper, e.g. `Provider<V>`.
    #[must_use]
    pub fn values_are_type_of(&self, wrapper: &str) -> bool {
        self.value_type().is_some_and(|value| value.is_declared_as(wrapper))
    }
}

/// A structural view over a `HashSet<T>` type.
#[derive(Clone, Copy, Debug)]
pub struct SetType<'a> {
    ty: &'a TypeRef,
}

impl<'a> SetType<'a> {
    /// Returns `true` if `ty` is the set type, parameterized or not.
    #[must_use]
    pub fn is_set(ty: &TypeRef) -> bool {
        ty.is_declared_as(type_names::SET)
    }

    /// Views `ty` as a set, if it is one.
    #[must_use]
    pub fn from(ty: &'a TypeRef) -> Option<Self> {
        Self::is_set(ty).then_some(Self { ty })
    }

    /// Returns `true` if the set has no type arguments.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.ty.type_arguments().is_empty()
    }

    /// The element type.
    #[must_use]
    pub fn element_type(&self) -> Option<&'a TypeRef> {
        self.ty.type_arguments().first()
    }
}

/// `HashMap<key, value>`.
#[must_use]
pub fn map_of(key: TypeRef, value: TypeRef) -> TypeRef {
    TypeRef::generic(type_names::MAP, [key, value])
}

/// `HashSet<element>`.
#[must_use]
pub fn set_of(element: TypeRef) -> TypeRef {
    TypeRef::generic(type_names::SET, [element])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_parts() {
        let ty = map_of(
            TypeRef::primitive("str"),
            TypeRef::generic(type_names::PROVIDER, [TypeRef::declared("app::Handler")]),
        );
        let map = MapType::from(&ty).unwrap();
        assert!(!map.is_raw());
        assert_eq!(map.key_type(), Some(&TypeRef::primitive("str")));
        assert!(map.values_are_type_of(type_names::PROVIDER));
        assert!(SetType::from(&ty).is_none());
    }

    #[test]
    fn raw_set() {
        let ty = TypeRef::declared(type_names::SET);
        let set = SetType::from(&ty).unwrap();
        assert!(set.is_raw());
        assert_eq!(set.element_type(), None);
    }
}
