// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use indexmap::IndexMap;

use crate::annotations::{map_key_type, map_keys, qualifiers, scopes};
use crate::model::{AnnotationMirror, ElementRef, Elements, ExecutableElement, TypeName};
use crate::type_names;

use super::{Argument, Binding, BindingKind, BindingSource, ContributionId, ContributionType, DependencyRequest, Key, Scope, map_of, set_of};

/// A binding method declared in a module.
#[derive(Clone, Debug)]
pub struct Declaration {
    module: TypeName,
    method: ExecutableElement,
    kind: BindingKind,
    contribution_type: ContributionType,
    key: Key,
    map_key: Option<AnnotationMirror>,
}

impl Declaration {
    /// The declaring module.
    #[must_use]
    pub fn module(&self) -> &TypeName {
        &self.module
    }

    /// The method.
    #[must_use]
    pub fn method(&self) -> &ExecutableElement {
        &self.method
    }

    /// The key of the binding: the unique key, or the key of this contribution.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// How the method contributes.
    #[must_use]
    pub fn contribution_type(&self) -> ContributionType {
        self.contribution_type
    }

    /// The map key of an `@IntoMap` contribution.
    #[must_use]
    pub fn map_key(&self) -> Option<&AnnotationMirror> {
        self.map_key.as_ref()
    }

    /// The location of the declaration.
    #[must_use]
    pub fn element(&self) -> ElementRef {
        self.method.element_ref(&self.module)
    }

    /// Builds the binding declared by this method.
    #[must_use]
    pub fn to_binding(&self, elements: &dyn Elements) -> Binding {
        let element = self.element();
        let mut binding = Binding::new(
            self.key.clone(),
            self.kind,
            BindingSource::ModuleMethod {
                module: self.module.clone(),
                method: self.method.name().to_string(),
                is_static: self.method.is_static(),
                is_async: self.method.is_async(),
            },
            element.clone(),
        );

        binding.dependencies = self
            .method
            .parameters()
            .iter()
            .map(|parameter| {
                DependencyRequest::for_type(elements, parameter.ty(), parameter.annotations(), element.parameter(parameter.name()))
            })
            .collect();
        binding.arguments = (0..binding.dependencies.len()).map(Argument::Dependency).collect();
        binding.scope = scopes(elements, self.method.annotations()).first().map(|scope| Scope::new((*scope).clone()));
        binding.contribution_type = self.contribution_type;
        binding.map_key.clone_from(&self.map_key);
        binding
    }
}

/// The binding declarations of the modules installed in one component.
#[derive(Clone, Debug, Default)]
pub struct ModuleDeclarations {
    unique: IndexMap<Key, Vec<Declaration>>,
    contributions: IndexMap<Key, Vec<Declaration>>,
    multibinds: IndexMap<Key, Vec<ElementRef>>,
}

impl ModuleDeclarations {
    /// Collects the declarations of `modules`, in module then method order.
    #[must_use]
    pub fn for_modules(elements: &dyn Elements, modules: &[TypeName]) -> Self {
        let mut declarations = Self::default();
        for module in modules {
            let Some(element) = elements.type_element(module) else {
                continue;
            };
            for method in element.methods() {
                declarations.add(elements, module, method);
            }
        }
        declarations
    }

    fn add(&mut self, elements: &dyn Elements, module: &TypeName, method: &ExecutableElement) {
        let qualifier = qualifiers(elements, method.annotations()).first().map(|q| (*q).clone());
        let return_type = method.return_type().clone();

        if method.has_annotation(type_names::MULTIBINDS) {
            self.multibinds
                .entry(Key::new(return_type, qualifier))
                .or_default()
                .push(method.element_ref(module));
            return;
        }

        let kind = if method.has_annotation(type_names::PROVIDES) {
            BindingKind::Provision
        } else if method.has_annotation(type_names::PRODUCES) {
            BindingKind::Production
        } else if method.has_annotation(type_names::BINDS) {
            BindingKind::Delegate
        } else {
            return;
        };

        let contribution_type = ContributionType::from_annotations(method.annotations());
        let map_key = map_keys(elements, method.annotations()).first().map(|key| (*key).clone());
        let plain_key = Key::new(return_type.clone(), qualifier.clone());

        let multibinding_key = match contribution_type {
            ContributionType::Unique => None,
            ContributionType::IntoSet => Some(Key::new(set_of(return_type), qualifier)),
            ContributionType::ElementsIntoSet => Some(Key::new(return_type, qualifier)),
            ContributionType::IntoMap => {
                let Some(key_type) = map_key.as_ref().and_then(|key| map_key_type(elements, key)) else {
                    return;
                };
                Some(Key::new(map_of(key_type, return_type), qualifier))
            }
        };

        let key = match &multibinding_key {
            Some(_) => plain_key.for_contribution(module.clone(), method.name()),
            None => plain_key,
        };
        let declaration = Declaration {
            module: module.clone(),
            method: method.clone(),
            kind,
            contribution_type,
            key,
            map_key,
        };

        match multibinding_key {
            Some(multibinding_key) => self.contributions.entry(multibinding_key).or_default().push(declaration),
            None => self.unique.entry(declaration.key.clone()).or_default().push(declaration),
        }
    }

    /// The unique (non-multibinding) declarations for a key.
    #[must_use]
    pub fn unique(&self, key: &Key) -> &[Declaration] {
        self.unique.get(key).map_or(&[], Vec::as_slice)
    }

    /// The contributions to the multibinding with the given key.
    #[must_use]
    pub fn contributions(&self, key: &Key) -> &[Declaration] {
        self.contributions.get(key).map_or(&[], Vec::as_slice)
    }

    /// The contribution with the given id.
    #[must_use]
    pub fn contribution(&self, id: &ContributionId) -> Option<&Declaration> {
        self.contributions
            .values()
            .flatten()
            .find(|declaration| declaration.key.contribution() == Some(id))
    }

    /// The `@Multibinds` declarations for a key.
    #[must_use]
    pub fn multibinds(&self, key: &Key) -> &[ElementRef] {
        self.multibinds.get(key).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if the key is a multibinding with contributions or a `@Multibinds`
    /// declaration here.
    #[must_use]
    pub fn declares_multibinding(&self, key: &Key) -> bool {
        self.contributions.contains_key(key) || self.multibinds.contains_key(key)
    }

    /// Returns `true` if any declaration here binds the key.
    #[must_use]
    pub fn declares(&self, key: &Key) -> bool {
        self.unique.contains_key(key) || self.declares_multibinding(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementModel, TypeElement, TypeRef};

    #[test]
    fn contributions_are_grouped_by_multibinding_key() {
        let module = TypeElement::class("app::Plugins")
            .annotated(AnnotationMirror::new(type_names::MODULE))
            .with_method(
                ExecutableElement::method("first", TypeRef::declared("app::Plugin"))
                    .annotated(AnnotationMirror::new(type_names::PROVIDES))
                    .annotated(AnnotationMirror::new(type_names::INTO_SET)),
            )
            .with_method(
                ExecutableElement::method("second", TypeRef::declared("app::Plugin"))
                    .annotated(AnnotationMirror::new(type_names::PROVIDES))
                    .annotated(AnnotationMirror::new(type_names::INTO_SET)),
            )
            .with_method(
                ExecutableElement::method("name", TypeRef::primitive("str")).annotated(AnnotationMirror::new(type_names::PROVIDES)),
            );
        let model = ElementModel::new().with_type(module);

        let declarations = ModuleDeclarations::for_modules(&model, &[TypeName::new("app::Plugins")]);
        let set_key = Key::of(set_of(TypeRef::declared("app::Plugin")));
        let methods: Vec<_> = declarations.contributions(&set_key).iter().map(|d| d.method().name()).collect();
        assert_eq!(methods, ["first", "second"]);
        assert!(declarations.declares(&Key::of(TypeRef::primitive("str"))));
        assert!(!declarations.declares(&Key::of(TypeRef::declared("app::Plugin"))));
    }
}
