// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use crate::model::{AnnotationMirror, TypeName, TypeRef};

/// Identifies one multibinding contribution: the module method that declares it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContributionId {
    module: TypeName,
    method: String,
}

impl ContributionId {
    /// Creates a contribution id.
    #[must_use]
    pub fn new(module: TypeName, method: impl Into<String>) -> Self {
        Self {
            module,
            method: method.into(),
        }
    }

    /// The declaring module.
    #[must_use]
    pub fn module(&self) -> &TypeName {
        &self.module
    }

    /// The declaring method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// Distinguishes keys that never match a plain request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyTag {
    /// One contribution to a multibinding.
    Contribution(ContributionId),
    /// The construction of an `@AssistedInject` type, only reachable through its factory.
    AssistedInjection,
}

/// What a binding provides: a canonical type plus an optional qualifier.
///
/// Bounded wildcards are replaced by their bound, so `Set<_: Foo>` and `Set<Foo>` are the
/// same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    ty: TypeRef,
    qualifier: Option<AnnotationMirror>,
    tag: Option<KeyTag>,
}

impl Key {
    /// Creates a key, canonicalizing the type.
    #[must_use]
    pub fn new(ty: TypeRef, qualifier: Option<AnnotationMirror>) -> Self {
        Self {
            ty: canonicalize(ty),
            qualifier,
            tag: None,
        }
    }

    /// An unqualified key.
    #[must_use]
    pub fn of(ty: TypeRef) -> Self {
        Self::new(ty, None)
    }

    /// The key of one contribution declared by `module::method`.
    #[must_use]
    pub fn for_contribution(&self, module: TypeName, method: impl Into<String>) -> Self {
        Self {
            tag: Some(KeyTag::Contribution(ContributionId::new(module, method))),
            ..self.clone()
        }
    }

    /// The key of the assisted construction of this type.
    #[must_use]
    pub fn for_assisted_injection(&self) -> Self {
        Self {
            tag: Some(KeyTag::AssistedInjection),
            ..self.clone()
        }
    }

    /// The canonical type.
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// The qualifier, if any.
    #[must_use]
    pub fn qualifier(&self) -> Option<&AnnotationMirror> {
        self.qualifier.as_ref()
    }

    /// The tag, if this key does not match plain requests.
    #[must_use]
    pub fn tag(&self) -> Option<&KeyTag> {
        self.tag.as_ref()
    }

    /// The contribution this key identifies, if any.
    #[must_use]
    pub fn contribution(&self) -> Option<&ContributionId> {
        match &self.tag {
            Some(KeyTag::Contribution(id)) => Some(id),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier} ")?;
        }
        write!(f, "{}", self.ty)?;
        match &self.tag {
            Some(KeyTag::Contribution(id)) => write!(f, " [contribution from {}::{}]", id.module, id.method),
            Some(KeyTag::AssistedInjection) => f.write_str(" [assisted]"),
            None => Ok(()),
        }
    }
}

fn canonicalize(ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::Wildcard { bound: Some(bound) } => canonicalize(*bound),
        TypeRef::Declared { name, args } => TypeRef::Declared {
            name,
            args: args.into_iter().map(canonicalize).collect(),
        },
        TypeRef::Array(element) => TypeRef::Array(Box::new(canonicalize(*element))),
        other => other,
    }
}
