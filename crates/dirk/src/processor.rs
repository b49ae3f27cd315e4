// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The compilation driver.

use std::collections::HashSet;
use std::fmt::Debug;

use tracing::{Level, event};

use crate::annotations::{MapKeyAnnotation, ModuleAnnotation};
use crate::binding::{BindingGraph, BindingGraphFactory, ComponentDescriptor};
use crate::error::{Error, Result};
use crate::model::{Elements, TypeElement, TypeKind, TypeName};
use crate::options::CompilerOptions;
use crate::type_names;
use crate::validation::{
    AssistedParameterValidator, BindingMethodValidator, Messager, ModuleValidator, ValidationReport, binding_method_kinds,
    validate_map_key,
};
use crate::writing::{
    AndroidEntryPointMetadata, AnnotationCreatorGenerator, ComponentGenerator, FragmentGenerator, GeneratedSource,
    UnwrappedMapKeyGenerator,
};

/// The collaborators shared by every step of a compilation.
#[derive(Clone, Copy, Debug)]
pub struct CompilationContext<'a> {
    elements: &'a dyn Elements,
    options: &'a CompilerOptions,
    messager: &'a dyn Messager,
}

impl<'a> CompilationContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(elements: &'a dyn Elements, options: &'a CompilerOptions, messager: &'a dyn Messager) -> Self {
        Self {
            elements,
            options,
            messager,
        }
    }

    /// The declarations being compiled.
    #[must_use]
    pub fn elements(&self) -> &'a dyn Elements {
        self.elements
    }

    /// The compiler options.
    #[must_use]
    pub fn options(&self) -> &'a CompilerOptions {
        self.options
    }

    /// The diagnostics sink.
    #[must_use]
    pub fn messager(&self) -> &'a dyn Messager {
        self.messager
    }

    /// Prints the report and returns `true` if it holds no errors.
    fn accept(&self, report: &ValidationReport) -> bool {
        report.print_messages_to(self.messager);
        report.is_clean()
    }
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    /// The qualified name of the generated item.
    pub name: String,
    /// The Rust source.
    pub contents: String,
}

/// Receives generated files.
pub trait Filer: Debug {
    /// Stores one file.
    fn write(&mut self, file: GeneratedFile);
}

/// A [`Filer`] that keeps files in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFiler {
    files: Vec<GeneratedFile>,
}

impl InMemoryFiler {
    /// Creates an empty filer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The files written so far, in write order.
    #[must_use]
    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    /// Looks up a file by name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.name == name)
    }
}

impl Filer for InMemoryFiler {
    fn write(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }
}

/// What a compilation produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// The names of the generated files.
    pub generated: Vec<String>,
    /// Declarations left without generated code because they or something they depend on is
    /// invalid.
    pub skipped: Vec<String>,
}

impl ProcessingSummary {
    fn skip(&mut self, name: &TypeName, reason: &str) {
        event!(Level::DEBUG, declaration = %name, reason, "declaration skipped");
        self.skipped.push(name.to_string());
    }
}

/// Runs validation and generation over one compilation unit.
///
/// Problems in user declarations are reported through the [`Messager`] and only suppress
/// generation for what they affect. Only malformed options and internal failures end the
/// compilation with an [`Error`].
#[derive(Debug)]
pub struct Processor<'a> {
    context: CompilationContext<'a>,
}

impl<'a> Processor<'a> {
    /// Creates a processor.
    #[must_use]
    pub fn new(context: CompilationContext<'a>) -> Self {
        Self { context }
    }

    /// Validates every declaration and writes the generated files to `filer`.
    ///
    /// # Errors
    ///
    /// Returns an error if an option is malformed, if generated code fails to parse for
    /// formatting, or if generation reaches a state validation should have excluded.
    pub fn process(&self, filer: &mut dyn Filer) -> Result<ProcessingSummary> {
        let mut output = Output {
            filer,
            format: self.context.options.format_generated_source()?,
            summary: ProcessingSummary::default(),
        };

        self.process_map_keys(&mut output)?;
        let mut invalid = self.validate_binding_methods(&mut output.summary);
        invalid.extend(self.validate_assisted_parameters(&mut output.summary));
        self.process_entry_points(&mut output)?;
        self.process_components(&invalid, &mut output)?;

        event!(
            Level::DEBUG,
            generated = output.summary.generated.len(),
            skipped = output.summary.skipped.len(),
            "compilation processed"
        );
        Ok(output.summary)
    }

    fn types(&self) -> impl Iterator<Item = &'a TypeElement> + 'a {
        self.context.elements.type_elements()
    }

    fn process_map_keys(&self, output: &mut Output<'_>) -> Result<()> {
        let elements = self.context.elements;
        for element in self.types().filter(|element| element.kind() == TypeKind::Annotation) {
            let Some(report) = validate_map_key(element) else {
                continue;
            };
            if !self.context.accept(&report) {
                output.summary.skip(element.name(), "invalid map key");
                continue;
            }

            let unwrapped = UnwrappedMapKeyGenerator::new(elements);
            if MapKeyAnnotation::of(element).is_some_and(|annotation| !annotation.unwrap_value()) {
                output.write(AnnotationCreatorGenerator::new(elements).generate(element))?;
            } else if unwrapped.applies_to(element) {
                output.write(unwrapped.generate(element))?;
            }
        }
        Ok(())
    }

    /// Validates modules and the binding methods of every other type. Returns the modules that
    /// failed validation.
    fn validate_binding_methods(&self, summary: &mut ProcessingSummary) -> HashSet<TypeName> {
        let elements = self.context.elements;
        let modules = ModuleValidator::new(elements);
        let methods = BindingMethodValidator::new(elements);
        let mut invalid = HashSet::new();

        for element in self.types() {
            let report = if ModuleAnnotation::of(element).is_some() {
                modules.validate(element)
            } else {
                let mut report = ValidationReport::new(element.element_ref());
                for method in element.methods() {
                    for kind in binding_method_kinds(method) {
                        report.merge(methods.validate(kind, element, method));
                    }
                }
                report
            };

            if !self.context.accept(&report) {
                summary.skip(element.name(), "invalid binding methods");
                invalid.insert(element.name().clone());
            }
        }
        invalid
    }

    /// Validates `@Assisted` parameters of every type. Returns the types that failed validation.
    fn validate_assisted_parameters(&self, summary: &mut ProcessingSummary) -> HashSet<TypeName> {
        let validator = AssistedParameterValidator::new(self.context.elements);
        let mut invalid = HashSet::new();
        for element in self.types() {
            if !self.context.accept(&validator.validate_type(element)) {
                summary.skip(element.name(), "invalid @Assisted parameters");
                invalid.insert(element.name().clone());
            }
        }
        invalid
    }

    fn process_entry_points(&self, output: &mut Output<'_>) -> Result<()> {
        let options = self.context.options;
        let validate_superclass = !options.is_android_superclass_validation_disabled()?;
        let use_get_context_fix = options.use_fragment_get_context_fix()?;

        for element in self
            .types()
            .filter(|element| element.has_annotation(type_names::ANDROID_ENTRY_POINT))
        {
            match AndroidEntryPointMetadata::of(self.context.elements, element, validate_superclass) {
                Ok(metadata) => output.write(FragmentGenerator::new(&metadata, use_get_context_fix).generate())?,
                Err(report) => {
                    self.context.accept(&report);
                    output.summary.skip(element.name(), "invalid entry point");
                }
            }
        }
        Ok(())
    }

    fn process_components(&self, invalid: &HashSet<TypeName>, output: &mut Output<'_>) -> Result<()> {
        let elements = self.context.elements;
        let generator = ComponentGenerator::new(elements, self.context.options)?;
        let graphs = BindingGraphFactory::new(elements, self.context.messager);

        for element in self.types().filter(|element| ComponentDescriptor::is_root_component(element)) {
            let descriptor = match ComponentDescriptor::root(elements, element) {
                Ok(descriptor) => descriptor,
                Err(report) => {
                    self.context.accept(&report);
                    output.summary.skip(element.name(), "invalid component");
                    continue;
                }
            };

            if depends_on_any(&descriptor, invalid) {
                output.summary.skip(element.name(), "depends on an invalid module");
                continue;
            }

            let Some(graph) = graphs.create(&descriptor) else {
                output.summary.skip(element.name(), "binding graph has errors");
                continue;
            };
            if uses_any(&graph, invalid) {
                output.summary.skip(element.name(), "uses an invalid declaration");
                continue;
            }
            output.write(generator.generate(&graph)?)?;
        }
        Ok(())
    }
}

/// Returns `true` if the component or one of its descendants installs one of `modules`.
fn depends_on_any(descriptor: &ComponentDescriptor, modules: &HashSet<TypeName>) -> bool {
    descriptor.modules().iter().any(|module| modules.contains(module))
        || descriptor.children().iter().any(|child| depends_on_any(child, modules))
}

/// Returns `true` if a binding in the graph or its children is declared by one of `types`.
fn uses_any(graph: &BindingGraph, types: &HashSet<TypeName>) -> bool {
    graph
        .bindings()
        .chain(graph.members_injection_bindings())
        .any(|binding| types.contains(binding.element().type_name()))
        || graph.children().iter().any(|child| uses_any(child, types))
}

struct Output<'f> {
    filer: &'f mut dyn Filer,
    format: bool,
    summary: ProcessingSummary,
}

impl Output<'_> {
    fn write(&mut self, source: GeneratedSource) -> Result<()> {
        let name = source.name.to_string();
        let contents = if self.format {
            let file = syn::parse2::<syn::File>(source.tokens).map_err(|source| Error::Format {
                file: name.clone(),
                source,
            })?;
            prettyplease::unparse(&file)
        } else {
            source.tokens.to_string()
        };

        event!(Level::DEBUG, file = %name, bytes = contents.len(), "generated file written");
        self.summary.generated.push(name.clone());
        self.filer.write(GeneratedFile { name, contents });
        Ok(())
    }
}
