// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt, quote};

/// A `::`-separated qualified name of a declared type, such as `app::net::Client`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    /// Creates a type name from its qualified form.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The qualified name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// The path of the module enclosing this type, if the name is qualified.
    #[must_use]
    pub fn module_path(&self) -> Option<&str> {
        self.0.rsplit_once("::").map(|(module, _)| module)
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split("::").filter(|segment| !segment.is_empty())
    }

    /// Returns `true` if this is the given qualified name.
    #[must_use]
    pub fn is(&self, qualified_name: &str) -> bool {
        self.0 == qualified_name
    }

    /// Returns a sibling name in the same module, e.g. `app::Foo` -> `app::Dirk_Foo`.
    #[must_use]
    pub fn peer(&self, simple_name: &str) -> Self {
        match self.module_path() {
            Some(module) => Self(format!("{module}::{simple_name}")),
            None => Self(simple_name.to_string()),
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl ToTokens for TypeName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let mut first = true;
        for segment in self.segments() {
            if !first {
                tokens.extend(quote!(::));
            }
            first = false;
            tokens.append(Ident::new(segment, Span::call_site()));
        }
    }
}

/// A reference to a type as it appears in a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    /// A declared (nominal) type with its type arguments, if any.
    Declared {
        /// The declared type.
        name: TypeName,
        /// Type arguments in declaration order.
        args: Vec<TypeRef>,
    },

    /// A wildcard type argument with an optional upper bound.
    Wildcard {
        /// The upper bound.
        bound: Option<Box<TypeRef>>,
    },

    /// A primitive such as `bool`, `i32` or `str`.
    Primitive(String),

    /// An array (sequence) of the element type.
    Array(Box<TypeRef>),

    /// The unit type, the return type of methods that return nothing.
    Unit,

    /// A type that could not be resolved by the element model.
    Error(String),
}

impl TypeRef {
    /// A declared type without type arguments.
    #[must_use]
    pub fn declared(name: impl Into<TypeName>) -> Self {
        Self::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A declared type with type arguments.
    #[must_use]
    pub fn generic(name: impl Into<TypeName>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Declared {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// A primitive type.
    #[must_use]
    pub fn primitive(name: &str) -> Self {
        Self::Primitive(name.to_string())
    }

    /// A wildcard, bounded or not.
    #[must_use]
    pub fn wildcard(bound: Option<Self>) -> Self {
        Self::Wildcard { bound: bound.map(Box::new) }
    }

    /// The declared type name, if this is a declared type.
    #[must_use]
    pub fn name(&self) -> Option<&TypeName> {
        match self {
            Self::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The type arguments of a declared type; empty otherwise.
    #[must_use]
    pub fn type_arguments(&self) -> &[Self] {
        match self {
            Self::Declared { args, .. } => args,
            _ => &[],
        }
    }

    /// Returns `true` if this is a declared type with the given qualified name.
    #[must_use]
    pub fn is_declared_as(&self, qualified_name: &str) -> bool {
        self.name().is_some_and(|name| name.is(qualified_name))
    }

    /// Returns `true` for wildcard types.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    /// Returns `true` for the unit type.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Returns `true` if this type or any of its arguments failed to resolve.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            Self::Error(_) => true,
            Self::Declared { args, .. } => args.iter().any(Self::is_error),
            Self::Wildcard { bound } => bound.as_deref().is_some_and(Self::is_error),
            Self::Array(element) => element.is_error(),
            Self::Primitive(_) | Self::Unit => false,
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Wildcard { bound: None } => f.write_str("_"),
            Self::Wildcard { bound: Some(bound) } => write!(f, "_: {bound}"),
            Self::Primitive(name) => f.write_str(name),
            Self::Array(element) => write!(f, "[{element}]"),
            Self::Unit => f.write_str("()"),
            Self::Error(text) => write!(f, "{{error: {text}}}"),
        }
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            Self::Declared { name, args } => {
                name.to_tokens(tokens);
                if !args.is_empty() {
                    tokens.extend(quote!(<#(#args),*>));
                }
            }
            Self::Wildcard { bound: Some(bound) } => bound.to_tokens(tokens),
            Self::Wildcard { bound: None } | Self::Error(_) => tokens.extend(quote!(_)),
            Self::Primitive(name) if name == "str" => tokens.extend(quote!(&'static str)),
            Self::Primitive(name) => tokens.append(Ident::new(name, Span::call_site())),
            Self::Array(element) => tokens.extend(quote!(::std::vec::Vec<#element>)),
            Self::Unit => tokens.extend(quote!(())),
        }
    }
}

/// Renders a `usize` as an unsuffixed literal, used for case ids and capacities.
pub(crate) fn usize_literal(value: usize) -> Literal {
    Literal::usize_unsuffixed(value)
}
