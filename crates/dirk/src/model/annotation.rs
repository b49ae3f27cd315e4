// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use super::{TypeName, TypeRef};

/// The value of a single annotation attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationValue {
    /// A boolean literal.
    Bool(bool),
    /// An integer literal.
    Int(i64),
    /// A character literal.
    Char(char),
    /// A string literal.
    Str(String),
    /// A type literal.
    Type(TypeRef),
    /// An enum constant.
    Enum {
        /// The enum type.
        ty: TypeName,
        /// The constant name.
        constant: String,
    },
    /// A nested annotation.
    Annotation(AnnotationMirror),
    /// An array of values.
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// The boolean, if this is a boolean literal.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The type, if this is a type literal.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Views this value as a list: arrays yield their elements, scalars yield themselves.
    #[must_use]
    pub fn as_list(&self) -> Vec<&Self> {
        match self {
            Self::Array(values) => values.iter().collect(),
            other => vec![other],
        }
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Char(value) => write!(f, "{value:?}"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Enum { ty, constant } => write!(f, "{ty}::{constant}"),
            Self::Annotation(annotation) => write!(f, "{annotation}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// An annotation instance: its type and the attribute values that were set explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationMirror {
    annotation_type: TypeName,
    values: Vec<(String, AnnotationValue)>,
}

impl AnnotationMirror {
    /// Creates an annotation without attribute values.
    #[must_use]
    pub fn new(annotation_type: impl Into<TypeName>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            values: Vec::new(),
        }
    }

    /// Adds an attribute value.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.push((name.into(), value));
        self
    }

    /// The annotation type.
    #[must_use]
    pub fn annotation_type(&self) -> &TypeName {
        &self.annotation_type
    }

    /// The explicitly set attribute values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[(String, AnnotationValue)] {
        &self.values
    }

    /// The value of the named attribute, if it was set.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// Returns `true` if this annotation has the given qualified type name.
    #[must_use]
    pub fn is(&self, qualified_name: &str) -> bool {
        self.annotation_type.is(qualified_name)
    }
}

impl Display for AnnotationMirror {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation_type)?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}

/// Finds the first annotation of the given type.
pub(crate) fn find_annotation<'a>(annotations: &'a [AnnotationMirror], qualified_name: &str) -> Option<&'a AnnotationMirror> {
    annotations.iter().find(|annotation| annotation.is(qualified_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_values() {
        let annotation = AnnotationMirror::new("dirk::Named").with_value("value", AnnotationValue::Str("primary".into()));
        assert_eq!(annotation.to_string(), "@dirk::Named(value = \"primary\")");
    }

    #[test]
    fn scalar_value_as_list() {
        let value = AnnotationValue::Type(TypeRef::declared("app::Module"));
        assert_eq!(value.as_list().len(), 1);

        let array = AnnotationValue::Array(vec![value.clone(), value]);
        assert_eq!(array.as_list().len(), 2);
    }
}
