// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compile-time dependency injection code generator.
//!
//! # Summary
//!
//! `dirk` reads declarations carrying binding annotations (components, modules, `@Inject`
//! constructors, assisted factories, map and set contributions) and generates the Rust code
//! that wires the object graph together. Nothing is looked up at runtime: every dependency is
//! resolved while generating, and a missing or ambiguous binding is reported before any code
//! is written.
//!
//! # Pipeline
//!
//! - **Validation** - binding methods, modules, map keys and `@Assisted` parameters are
//!   checked first. Invalid declarations are reported and excluded from generation.
//! - **Resolution** - each root component gets a [`BindingGraph`](binding::BindingGraph),
//!   with child graphs for its subcomponents.
//! - **Generation** - every binding request is satisfied inline, through a private method or
//!   through a lazily created provider, and the component implementation is emitted.
//!
//! # Quick Start
//!
//! ```rust
//! use dirk::model::{AnnotationMirror, ElementModel, ExecutableElement, TypeElement, TypeRef};
//! use dirk::{CollectingMessager, CompilationContext, CompilerOptions, InMemoryFiler, Processor, type_names};
//!
//! let model = ElementModel::new()
//!     .with_type(
//!         TypeElement::trait_type("app::AppComponent")
//!             .annotated(AnnotationMirror::new(type_names::COMPONENT))
//!             .with_method(ExecutableElement::method("database", TypeRef::declared("app::Database")).abstract_method()),
//!     )
//!     .with_type(
//!         TypeElement::class("app::Database")
//!             .with_constructor(ExecutableElement::constructor().annotated(AnnotationMirror::new(type_names::INJECT))),
//!     );
//!
//! let options = CompilerOptions::default();
//! let messager = CollectingMessager::new();
//! let mut filer = InMemoryFiler::new();
//!
//! let summary = Processor::new(CompilationContext::new(&model, &options, &messager)).process(&mut filer)?;
//!
//! assert_eq!(summary.generated, ["app::DirkAppComponent"]);
//! assert!(filer.files()[0].contents.contains("app::Database::new()"));
//! # Ok::<(), dirk::Error>(())
//! ```
//!
//! # Configuration
//!
//! Generation is tuned through [`CompilerOptions`], built from the `dirk.<name>` options the
//! host passes in. See [`BooleanOption`] and [`IntOption`] for the recognized names.
//!
//! # Logging
//!
//! The generator emits `tracing` events for rejected declarations, resolution summaries,
//! representation choices and written files. No subscriber is installed.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod annotations;
pub mod binding;
mod error;
pub mod model;
mod options;
mod processor;
pub mod type_names;
pub mod validation;
pub mod writing;

pub use error::{Error, Result};
pub use options::{BooleanOption, CompilerOptions, ConfigError, DEFAULT_KEYS_PER_COMPONENT_SHARD, IntOption};
pub use processor::{CompilationContext, Filer, GeneratedFile, InMemoryFiler, ProcessingSummary, Processor};
pub use validation::{CollectingMessager, Diagnostic, Messager, Severity, ValidationReport};
