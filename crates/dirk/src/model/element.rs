// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

use super::annotation::find_annotation;
use super::{AnnotationMirror, TypeName, TypeRef};

/// The kind of a declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A concrete or abstract class-like type.
    Class,
    /// A trait (interface).
    Trait,
    /// An annotation type.
    Annotation,
    /// An enum.
    Enum,
}

/// A declared type.
#[derive(Clone, Debug)]
pub struct TypeElement {
    name: TypeName,
    kind: TypeKind,
    annotations: Vec<AnnotationMirror>,
    type_parameters: Vec<String>,
    superclass: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    fields: Vec<VariableElement>,
    constructors: Vec<ExecutableElement>,
    methods: Vec<ExecutableElement>,
    is_abstract: bool,
    is_data_class: bool,
}

impl TypeElement {
    /// Creates a type of the given kind with no members.
    #[must_use]
    pub fn new(name: impl Into<TypeName>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            is_abstract: matches!(kind, TypeKind::Trait | TypeKind::Annotation),
            is_data_class: false,
        }
    }

    /// Creates a class.
    #[must_use]
    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Creates a trait.
    #[must_use]
    pub fn trait_type(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Trait)
    }

    /// Creates an annotation type.
    #[must_use]
    pub fn annotation_type(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeKind::Annotation)
    }

    /// Adds an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a type parameter.
    #[must_use]
    pub fn with_type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    /// Sets the superclass.
    #[must_use]
    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Adds an implemented trait.
    #[must_use]
    pub fn implementing(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: VariableElement) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a constructor.
    #[must_use]
    pub fn with_constructor(mut self, constructor: ExecutableElement) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: ExecutableElement) -> Self {
        self.methods.push(method);
        self
    }

    /// Marks a class as abstract.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Marks the type as a data class, whose generated `copy` method mirrors its constructor.
    #[must_use]
    pub fn data_class(mut self) -> Self {
        self.is_data_class = true;
        self
    }

    /// The qualified name.
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// The kind of this type.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The annotations on this type.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationMirror] {
        &self.annotations
    }

    /// The first annotation of the given type, if present.
    #[must_use]
    pub fn annotation(&self, qualified_name: &str) -> Option<&AnnotationMirror> {
        find_annotation(&self.annotations, qualified_name)
    }

    /// Returns `true` if an annotation of the given type is present.
    #[must_use]
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotation(qualified_name).is_some()
    }

    /// The declared type parameters.
    #[must_use]
    pub fn type_parameters(&self) -> &[String] {
        &self.type_parameters
    }

    /// The superclass, if any.
    #[must_use]
    pub fn superclass(&self) -> Option<&TypeRef> {
        self.superclass.as_ref()
    }

    /// The implemented traits.
    #[must_use]
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// The fields.
    #[must_use]
    pub fn fields(&self) -> &[VariableElement] {
        &self.fields
    }

    /// The constructors.
    #[must_use]
    pub fn constructors(&self) -> &[ExecutableElement] {
        &self.constructors
    }

    /// The methods.
    #[must_use]
    pub fn methods(&self) -> &[ExecutableElement] {
        &self.methods
    }

    /// Returns `true` for abstract classes, traits and annotation types.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns `true` for data classes.
    #[must_use]
    pub fn is_data_class(&self) -> bool {
        self.is_data_class
    }

    /// This type as a type reference, with its type parameters as arguments.
    #[must_use]
    pub fn as_type(&self) -> TypeRef {
        TypeRef::generic(
            self.name.clone(),
            self.type_parameters.iter().map(|parameter| TypeRef::declared(parameter.as_str())),
        )
    }

    /// A location pointing at this type.
    #[must_use]
    pub fn element_ref(&self) -> ElementRef {
        ElementRef::of_type(self.name.clone())
    }
}

/// Distinguishes constructors from methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutableKind {
    /// A constructor function (`Type::new`).
    Constructor,
    /// A method.
    Method,
}

/// A constructor or method.
#[derive(Clone, Debug)]
pub struct ExecutableElement {
    name: String,
    kind: ExecutableKind,
    annotations: Vec<AnnotationMirror>,
    type_parameters: Vec<String>,
    parameters: Vec<VariableElement>,
    return_type: TypeRef,
    thrown_types: Vec<TypeRef>,
    is_abstract: bool,
    is_static: bool,
    is_async: bool,
}

impl ExecutableElement {
    /// Creates a constructor named `new`.
    #[must_use]
    pub fn constructor() -> Self {
        Self {
            name: "new".to_string(),
            kind: ExecutableKind::Constructor,
            annotations: Vec::new(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: TypeRef::Unit,
            thrown_types: Vec::new(),
            is_abstract: false,
            is_static: true,
            is_async: false,
        }
    }

    /// Creates a concrete instance method.
    #[must_use]
    pub fn method(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: ExecutableKind::Method,
            return_type,
            is_static: false,
            ..Self::constructor()
        }
    }

    /// Renames the executable.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a type parameter.
    #[must_use]
    pub fn with_type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: VariableElement) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a thrown (error) type.
    #[must_use]
    pub fn throwing(mut self, ty: TypeRef) -> Self {
        self.thrown_types.push(ty);
        self
    }

    /// Marks the method as abstract.
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Marks the method as an associated (static) function.
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the method as asynchronous.
    #[must_use]
    pub fn async_method(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// The simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructor or method.
    #[must_use]
    pub fn kind(&self) -> ExecutableKind {
        self.kind
    }

    /// The annotations on this executable.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationMirror] {
        &self.annotations
    }

    /// The first annotation of the given type, if present.
    #[must_use]
    pub fn annotation(&self, qualified_name: &str) -> Option<&AnnotationMirror> {
        find_annotation(&self.annotations, qualified_name)
    }

    /// Returns `true` if an annotation of the given type is present.
    #[must_use]
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotation(qualified_name).is_some()
    }

    /// The declared type parameters.
    #[must_use]
    pub fn type_parameters(&self) -> &[String] {
        &self.type_parameters
    }

    /// The parameters.
    #[must_use]
    pub fn parameters(&self) -> &[VariableElement] {
        &self.parameters
    }

    /// The return type; unit for constructors.
    #[must_use]
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// The declared thrown (error) types.
    #[must_use]
    pub fn thrown_types(&self) -> &[TypeRef] {
        &self.thrown_types
    }

    /// Returns `true` for abstract methods.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns `true` for associated functions and constructors.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns `true` for asynchronous methods.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// A location pointing at this executable inside `owner`.
    #[must_use]
    pub fn element_ref(&self, owner: &TypeName) -> ElementRef {
        ElementRef::of_member(owner.clone(), self.name.clone())
    }
}

/// A parameter or field.
#[derive(Clone, Debug)]
pub struct VariableElement {
    name: String,
    ty: TypeRef,
    annotations: Vec<AnnotationMirror>,
}

impl VariableElement {
    /// Creates a variable.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation.
    #[must_use]
    pub fn annotated(mut self, annotation: AnnotationMirror) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// The annotations on this variable.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationMirror] {
        &self.annotations
    }

    /// Returns `true` if an annotation of the given type is present.
    #[must_use]
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        find_annotation(&self.annotations, qualified_name).is_some()
    }
}

/// A printable source location: a type, one of its members, or a member's parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    type_name: TypeName,
    member: Option<String>,
    parameter: Option<String>,
}

impl ElementRef {
    /// Points at a type.
    #[must_use]
    pub fn of_type(type_name: TypeName) -> Self {
        Self {
            type_name,
            member: None,
            parameter: None,
        }
    }

    /// Points at a member of a type.
    #[must_use]
    pub fn of_member(type_name: TypeName, member: impl Into<String>) -> Self {
        Self {
            type_name,
            member: Some(member.into()),
            parameter: None,
        }
    }

    /// Points at a parameter of this member.
    #[must_use]
    pub fn parameter(&self, parameter: impl Into<String>) -> Self {
        Self {
            parameter: Some(parameter.into()),
            ..self.clone()
        }
    }

    /// The enclosing type.
    #[must_use]
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// The member name, if this points at a member.
    #[must_use]
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }
}

impl Display for ElementRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if let Some(member) = &self.member {
            write!(f, "::{member}")?;
        }
        if let Some(parameter) = &self.parameter {
            write!(f, "({parameter})")?;
        }
        Ok(())
    }
}
