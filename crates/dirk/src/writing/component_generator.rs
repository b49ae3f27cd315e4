// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binding::BindingGraph;
use crate::error::Result;
use crate::model::Elements;
use crate::options::CompilerOptions;

use super::GeneratedSource;
use super::component_implementation::{ComponentImplementation, GenerationSettings};
use super::naming::component_impl_name;

/// Generates the implementation of a root component, with its subcomponents nested inside.
#[derive(Clone, Copy, Debug)]
pub struct ComponentGenerator<'a> {
    elements: &'a dyn Elements,
    settings: GenerationSettings,
}

impl<'a> ComponentGenerator<'a> {
    /// Creates a generator configured from `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if a generation option is malformed.
    pub fn new(elements: &'a dyn Elements, options: &CompilerOptions) -> Result<Self> {
        Ok(Self {
            elements,
            settings: GenerationSettings {
                fast_init: options.fast_init()?,
                keys_per_shard: options.keys_per_component_shard()?,
            },
        })
    }

    /// Generates `Dirk<Component>` for a resolved root graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation) if the graph
    /// references a key it does not bind.
    pub fn generate(&self, graph: &BindingGraph) -> Result<GeneratedSource> {
        let component = graph.component().type_name();
        let name = component_impl_name(component);
        let tokens = ComponentImplementation::new(self.elements, self.settings, graph, None, &name).generate()?;
        Ok(GeneratedSource {
            name: component.peer(&name),
            tokens,
        })
    }
}
