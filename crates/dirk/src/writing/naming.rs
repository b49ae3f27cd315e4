// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::collections::HashSet;

use proc_macro2::{Ident, Span};

use crate::binding::Key;
use crate::model::{AnnotationValue, TypeName, TypeRef};
use crate::type_names;

/// Convert `PascalCase` to `snake_case`.
pub(crate) fn pascal_to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let follows_lower = i > 0 && chars[i - 1].is_lowercase();
            let starts_word = i > 0 && chars.get(i + 1).is_some_and(|next| next.is_lowercase()) && chars[i - 1].is_uppercase();
            if follows_lower || starts_word {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(*ch);
        }
    }

    result
}

/// Creates an identifier, escaping Rust keywords.
pub(crate) fn ident(name: &str) -> Ident {
    if syn::parse_str::<Ident>(name).is_ok() {
        Ident::new(name, Span::call_site())
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}

/// The name of the generated implementation of a root component: `DirkAppComponent`.
pub(crate) fn component_impl_name(component: &TypeName) -> String {
    format!("Dirk{}", component.simple_name())
}

/// The name of the generated implementation of a subcomponent, prefixed by its parent's.
pub(crate) fn subcomponent_impl_name(parent_impl: &str, component: &TypeName) -> String {
    format!("{parent_impl}_{}", component.simple_name())
}

/// A readable base name for members generated for a key, like `http_client` or
/// `named_base_url_string`.
pub(crate) fn key_base_name(key: &Key) -> String {
    let mut name = String::new();
    if let Some(qualifier) = key.qualifier() {
        let label = match qualifier.value("value") {
            Some(AnnotationValue::Str(value)) if qualifier.is(type_names::NAMED) => value.clone(),
            _ => qualifier.annotation_type().simple_name().to_string(),
        };
        name.push_str(&pascal_to_snake_case(&sanitize(&label)));
        name.push('_');
    }
    name.push_str(&type_base_name(key.ty()));
    if let Some(id) = key.contribution() {
        name = format!("{}_{}", pascal_to_snake_case(id.module().simple_name()), id.method());
    }
    name
}

fn type_base_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Declared { name, args } => {
            let mut base = pascal_to_snake_case(name.simple_name());
            for arg in args {
                base.push('_');
                base.push_str(&type_base_name(arg));
            }
            base
        }
        TypeRef::Primitive(name) => name.clone(),
        TypeRef::Array(element) => format!("{}_array", type_base_name(element)),
        TypeRef::Wildcard { bound: Some(bound) } => type_base_name(bound),
        TypeRef::Wildcard { bound: None } | TypeRef::Error(_) => "any".to_string(),
        TypeRef::Unit => "unit".to_string(),
    }
}

fn sanitize(label: &str) -> String {
    label.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

/// Hands out member names that are unique within one generated type.
#[derive(Debug, Default)]
pub(crate) struct UniqueNames {
    used: RefCell<HashSet<String>>,
}

impl UniqueNames {
    /// Claims `base`, or `base2`, `base3`, ... if it is taken.
    pub(crate) fn claim(&self, base: &str) -> Ident {
        let mut used = self.used.borrow_mut();
        let mut candidate = base.to_string();
        let mut suffix = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        ident(&candidate)
    }

    /// Marks a name as taken, e.g. a fixed member like `this`.
    pub(crate) fn reserve(&self, name: &str) {
        self.used.borrow_mut().insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::set_of;
    use crate::model::AnnotationMirror;

    #[test]
    fn test_pascal_to_snake_case() {
        assert_eq!(pascal_to_snake_case("PascalCase"), "pascal_case");
        assert_eq!(pascal_to_snake_case("HttpClient"), "http_client");
        assert_eq!(pascal_to_snake_case("HTTPClient"), "http_client");
        assert_eq!(pascal_to_snake_case("Simple"), "simple");
        assert_eq!(pascal_to_snake_case("WithNumbers123"), "with_numbers123");
    }

    #[test]
    fn key_names_include_qualifier_and_arguments() {
        let named = AnnotationMirror::new(type_names::NAMED).with_value("value", AnnotationValue::Str("base-url".into()));
        let key = Key::new(TypeRef::primitive("str"), Some(named));
        assert_eq!(key_base_name(&key), "base_url_str");

        let set = Key::of(set_of(TypeRef::declared("app::Plugin")));
        assert_eq!(key_base_name(&set), "hash_set_plugin");
    }

    #[test]
    fn unique_names_get_suffixes() {
        let names = UniqueNames::default();
        names.reserve("this");
        assert_eq!(names.claim("this").to_string(), "this2");
        assert_eq!(names.claim("db").to_string(), "db");
        assert_eq!(names.claim("db").to_string(), "db2");
    }

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("name").to_string(), "name");
    }
}
