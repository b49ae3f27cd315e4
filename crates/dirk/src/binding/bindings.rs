// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};

use crate::model::{AnnotationMirror, ElementRef, TypeName, TypeRef};
use crate::type_names;

use super::{DependencyRequest, FrameworkType, Key};

/// How a binding is satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// An `@Inject` constructor.
    Injection,
    /// An `@AssistedInject` constructor, called from its factory.
    AssistedInjection,
    /// A generated implementation of an `@AssistedFactory`.
    AssistedFactory,
    /// A `@Provides` method.
    Provision,
    /// A `@Produces` method.
    Production,
    /// A `@Binds` method.
    Delegate,
    /// A set aggregated from contributions.
    MultiboundSet,
    /// A map aggregated from contributions.
    MultiboundMap,
    /// The component itself.
    Component,
    /// A new instance of a child component.
    SubcomponentCreator,
    /// Injection of the members of an existing instance.
    MembersInjection,
}

impl BindingKind {
    /// Returns `true` for kinds whose instance is built by calling user code with the
    /// dependencies as arguments.
    #[must_use]
    pub fn is_construction(self) -> bool {
        matches!(
            self,
            Self::Injection | Self::AssistedInjection | Self::Provision | Self::Production | Self::MultiboundSet | Self::MultiboundMap
        )
    }

    /// Returns `true` for multibinding aggregations.
    #[must_use]
    pub fn is_multibinding(self) -> bool {
        matches!(self, Self::MultiboundSet | Self::MultiboundMap)
    }
}

/// The broad category of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Synchronously provided.
    Provision,
    /// Asynchronously produced.
    Production,
    /// Members injection into an existing instance.
    MembersInjection,
}

/// How a module method contributes its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContributionType {
    /// The only binding for its key.
    Unique,
    /// One element of a set.
    IntoSet,
    /// Several elements of a set.
    ElementsIntoSet,
    /// One entry of a map.
    IntoMap,
}

impl ContributionType {
    /// Reads the contribution type from a method's annotations.
    #[must_use]
    pub fn from_annotations(annotations: &[AnnotationMirror]) -> Self {
        if annotations.iter().any(|a| a.is(type_names::INTO_SET)) {
            Self::IntoSet
        } else if annotations.iter().any(|a| a.is(type_names::ELEMENTS_INTO_SET)) {
            Self::ElementsIntoSet
        } else if annotations.iter().any(|a| a.is(type_names::INTO_MAP)) {
            Self::IntoMap
        } else {
            Self::Unique
        }
    }
}

/// A scope annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope(AnnotationMirror);

impl Scope {
    /// Wraps a scope annotation.
    #[must_use]
    pub fn new(annotation: AnnotationMirror) -> Self {
        Self(annotation)
    }

    /// Returns `true` for `@Reusable`, which may be cached in any component.
    #[must_use]
    pub fn is_reusable(&self) -> bool {
        self.0.is(type_names::REUSABLE)
    }

    /// The annotation.
    #[must_use]
    pub fn annotation(&self) -> &AnnotationMirror {
        &self.0
    }
}

/// The declaration a binding comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingSource {
    /// A constructor of the bound type.
    Constructor {
        /// The constructed type.
        ty: TypeName,
        /// The constructor name.
        name: String,
    },
    /// A method of a module.
    ModuleMethod {
        /// The module.
        module: TypeName,
        /// The method name.
        method: String,
        /// Whether the method is an associated function, callable without a module instance.
        is_static: bool,
        /// Whether the method is asynchronous.
        is_async: bool,
    },
    /// A declared type other than a constructor: a component, factory or injected type.
    Type(TypeName),
    /// Synthesized by the graph builder.
    Synthetic,
}

/// One argument of the generated constructor or method call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    /// The dependency at the given index.
    Dependency(usize),
    /// The assisted parameter at the given index, passed through from the factory method.
    Assisted(usize),
}

/// A member injected after construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InjectionSite {
    /// An `@Inject` field, assigned from one dependency.
    Field {
        /// The field name.
        name: String,
        /// The dependency index.
        dependency: usize,
    },
    /// An `@Inject` method, called with a run of dependencies.
    Method {
        /// The method name.
        name: String,
        /// The dependency indices, in parameter order.
        dependencies: Vec<usize>,
    },
}

/// A parameter of an assisted factory method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssistedParameter {
    /// The parameter name.
    pub name: String,
    /// The parameter type.
    pub ty: TypeRef,
    /// The `@Assisted` identifier, empty when unset. Together with the type it pairs factory
    /// parameters with constructor parameters.
    pub identifier: String,
}

impl AssistedParameter {
    /// Returns `true` if both parameters have the same type and identifier.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.ty == other.ty && self.identifier == other.identifier
    }
}

impl Display for AssistedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identifier.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "@Assisted(\"{}\") {}", self.identifier, self.ty)
        }
    }
}

/// The creation method of an assisted factory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssistedFactoryMethod {
    /// The method name.
    pub name: String,
    /// The parameters.
    pub parameters: Vec<AssistedParameter>,
    /// The created type.
    pub return_type: TypeRef,
}

/// One contribution of a multibinding, in dependency order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultibindingEntry {
    /// How the contribution adds to the collection.
    pub contribution_type: ContributionType,
    /// The map key, for map contributions.
    pub map_key: Option<AnnotationMirror>,
}

/// How to satisfy one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub(crate) key: Key,
    pub(crate) kind: BindingKind,
    pub(crate) binding_type: BindingType,
    pub(crate) dependencies: Vec<DependencyRequest>,
    pub(crate) source: BindingSource,
    pub(crate) element: ElementRef,
    pub(crate) scope: Option<Scope>,
    pub(crate) contribution_type: ContributionType,
    pub(crate) map_key: Option<AnnotationMirror>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) injection_sites: Vec<InjectionSite>,
    pub(crate) assisted_parameters: Vec<AssistedParameter>,
    pub(crate) factory_method: Option<AssistedFactoryMethod>,
    pub(crate) entries: Vec<MultibindingEntry>,
}

impl Binding {
    /// Creates an unscoped, unique binding without dependencies.
    #[must_use]
    pub fn new(key: Key, kind: BindingKind, source: BindingSource, element: ElementRef) -> Self {
        let binding_type = match kind {
            BindingKind::Production => BindingType::Production,
            BindingKind::MembersInjection => BindingType::MembersInjection,
            _ => BindingType::Provision,
        };

        Self {
            key,
            kind,
            binding_type,
            dependencies: Vec::new(),
            source,
            element,
            scope: None,
            contribution_type: ContributionType::Unique,
            map_key: None,
            arguments: Vec::new(),
            injection_sites: Vec::new(),
            assisted_parameters: Vec::new(),
            factory_method: None,
            entries: Vec::new(),
        }
    }

    /// The key this binding satisfies.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// How the binding is satisfied.
    #[must_use]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Provision, production or members injection.
    #[must_use]
    pub fn binding_type(&self) -> BindingType {
        self.binding_type
    }

    /// The dependencies, in argument order.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyRequest] {
        &self.dependencies
    }

    /// Where the binding is declared.
    #[must_use]
    pub fn source(&self) -> &BindingSource {
        &self.source
    }

    /// The declaring element, used as the location of diagnostics.
    #[must_use]
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    /// The scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Returns `true` if the binding is scoped.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// How the binding contributes to its key.
    #[must_use]
    pub fn contribution_type(&self) -> ContributionType {
        self.contribution_type
    }

    /// The map key of an `@IntoMap` contribution.
    #[must_use]
    pub fn map_key(&self) -> Option<&AnnotationMirror> {
        self.map_key.as_ref()
    }

    /// The arguments of the generated call.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Members injected after construction.
    #[must_use]
    pub fn injection_sites(&self) -> &[InjectionSite] {
        &self.injection_sites
    }

    /// The assisted parameters of an assisted injection.
    #[must_use]
    pub fn assisted_parameters(&self) -> &[AssistedParameter] {
        &self.assisted_parameters
    }

    /// The creation method of an assisted factory.
    #[must_use]
    pub fn factory_method(&self) -> Option<&AssistedFactoryMethod> {
        self.factory_method.as_ref()
    }

    /// The contributions of a multibinding, one per dependency.
    #[must_use]
    pub fn entries(&self) -> &[MultibindingEntry] {
        &self.entries
    }

    /// The framework type this binding is exposed through.
    #[must_use]
    pub fn framework_type(&self) -> FrameworkType {
        match self.binding_type {
            BindingType::Production => FrameworkType::Producer,
            BindingType::Provision | BindingType::MembersInjection => FrameworkType::Provider,
        }
    }

    /// Returns `true` if the binding is produced asynchronously.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.binding_type == BindingType::Production
    }

    /// Returns `true` if generated code must construct the instance itself, which needs a
    /// method when there are arguments to evaluate.
    #[must_use]
    pub fn requires_method_encapsulation(&self) -> bool {
        self.kind.is_construction() && !self.dependencies.is_empty()
    }
}
