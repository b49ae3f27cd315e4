// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use indexmap::IndexSet;

use crate::annotations::{ModuleAnnotation, scopes};
use crate::model::{Elements, ExecutableElement, TypeElement, TypeName, TypeRef};
use crate::type_names;
use crate::validation::ValidationReport;

use super::{DependencyRequest, Scope};

/// The shape of a component entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPointKind {
    /// `fn foo(&self) -> Foo`.
    Provision,
    /// `fn inject(&self, target: &mut Foo)`.
    MembersInjection,
    /// `fn child(&self) -> ChildComponent` where the return type is a subcomponent.
    SubcomponentFactory,
}

/// An abstract method of a component and the request it makes.
#[derive(Clone, Debug)]
pub struct EntryPoint {
    method: ExecutableElement,
    kind: EntryPointKind,
    request: DependencyRequest,
}

impl EntryPoint {
    /// The component method.
    #[must_use]
    pub fn method(&self) -> &ExecutableElement {
        &self.method
    }

    /// The shape of the method.
    #[must_use]
    pub fn kind(&self) -> EntryPointKind {
        self.kind
    }

    /// The request the method makes.
    #[must_use]
    pub fn request(&self) -> &DependencyRequest {
        &self.request
    }
}

/// Everything the graph builder needs to know about one component declaration.
#[derive(Clone, Debug)]
pub struct ComponentDescriptor {
    element: TypeElement,
    is_subcomponent: bool,
    modules: Vec<TypeName>,
    scopes: Vec<Scope>,
    entry_points: Vec<EntryPoint>,
    children: Vec<ComponentDescriptor>,
}

impl ComponentDescriptor {
    /// Returns `true` for types annotated `@Component`.
    #[must_use]
    pub fn is_root_component(element: &TypeElement) -> bool {
        element.has_annotation(type_names::COMPONENT)
    }

    /// Describes a root component and, transitively, its subcomponents.
    ///
    /// # Errors
    ///
    /// Returns the report of every problem found if the component or any descendant is malformed.
    pub fn root(elements: &dyn Elements, element: &TypeElement) -> Result<Self, ValidationReport> {
        let mut report = ValidationReport::new(element.element_ref());
        if !Self::is_root_component(element) {
            report.add_error(format!("{} is not annotated with @Component", element.name()));
            return Err(report);
        }

        let mut ancestors = Vec::new();
        let descriptor = Self::create(elements, element, false, &mut ancestors, &mut report);
        match descriptor {
            Some(descriptor) if report.is_clean() => Ok(descriptor),
            _ => Err(report),
        }
    }

    fn create(
        elements: &dyn Elements,
        element: &TypeElement,
        is_subcomponent: bool,
        ancestors: &mut Vec<TypeName>,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        if ancestors.contains(element.name()) {
            report.add_error(format!("{} is a descendant of itself", element.name()));
            return None;
        }

        let annotation_type = if is_subcomponent { type_names::SUBCOMPONENT } else { type_names::COMPONENT };
        let declared_modules: Vec<TypeRef> = element
            .annotation(annotation_type)
            .and_then(|annotation| annotation.value("modules"))
            .map(|value| value.as_list().into_iter().filter_map(|v| v.as_type().cloned()).collect())
            .unwrap_or_default();
        let modules = module_closure(elements, element, &declared_modules, report);

        let mut entry_points = Vec::new();
        let mut child_names: IndexSet<TypeName> = IndexSet::new();
        for method in element.methods().iter().filter(|method| method.is_abstract()) {
            if let Some(entry_point) = entry_point(elements, element, method, report) {
                if entry_point.kind == EntryPointKind::SubcomponentFactory
                    && let Some(name) = entry_point.request.key().ty().name()
                {
                    child_names.insert(name.clone());
                }
                entry_points.push(entry_point);
            }
        }
        for module in &modules {
            if let Some(annotation) = elements.type_element(module).and_then(ModuleAnnotation::of) {
                child_names.extend(annotation.subcomponents());
            }
        }

        ancestors.push(element.name().clone());
        let mut children = Vec::new();
        for name in child_names {
            match elements.type_element(&name) {
                Some(child) if child.has_annotation(type_names::SUBCOMPONENT) => {
                    if let Some(descriptor) = Self::create(elements, child, true, ancestors, report) {
                        children.push(descriptor);
                    }
                }
                _ => report.add_error(format!("{name} is used as a subcomponent, but is not annotated with @Subcomponent")),
            }
        }
        ancestors.pop();

        Some(Self {
            element: element.clone(),
            is_subcomponent,
            modules,
            scopes: scopes(elements, element.annotations()).into_iter().cloned().map(Scope::new).collect(),
            entry_points,
            children,
        })
    }

    /// The component type.
    #[must_use]
    pub fn element(&self) -> &TypeElement {
        &self.element
    }

    /// The component's qualified name.
    #[must_use]
    pub fn type_name(&self) -> &TypeName {
        self.element.name()
    }

    /// Returns `true` for subcomponents.
    #[must_use]
    pub fn is_subcomponent(&self) -> bool {
        self.is_subcomponent
    }

    /// The installed modules: the declared ones and everything they include, in declaration
    /// order without duplicates.
    #[must_use]
    pub fn modules(&self) -> &[TypeName] {
        &self.modules
    }

    /// The scopes of the component.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Returns `true` if the component has the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes.contains(scope)
    }

    /// The entry points, in declaration order.
    #[must_use]
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// The direct subcomponents.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }
}

fn module_closure(elements: &dyn Elements, component: &TypeElement, declared: &[TypeRef], report: &mut ValidationReport) -> Vec<TypeName> {
    let mut seen: IndexSet<TypeName> = IndexSet::new();
    let mut pending: Vec<TypeName> = Vec::new();

    for ty in declared.iter().rev() {
        match ty.name().filter(|_| !ty.is_error()) {
            Some(name) => pending.push(name.clone()),
            None => report.add_error(format!("{} lists module {ty}, which could not be resolved", component.name())),
        }
    }

    while let Some(name) = pending.pop() {
        if seen.contains(&name) {
            continue;
        }
        let Some(module) = elements.type_element(&name).and_then(ModuleAnnotation::of) else {
            report.add_error(format!("{name} is listed as a module, but is not annotated with @Module or @ProducerModule"));
            continue;
        };
        pending.extend(module.includes().into_iter().rev());
        seen.insert(name);
    }

    seen.into_iter().collect()
}

fn entry_point(elements: &dyn Elements, component: &TypeElement, method: &ExecutableElement, report: &mut ValidationReport) -> Option<EntryPoint> {
    let location = method.element_ref(component.name());
    let return_type = method.return_type();

    let returns_subcomponent = return_type
        .name()
        .and_then(|name| elements.type_element(name))
        .is_some_and(|element| element.has_annotation(type_names::SUBCOMPONENT));

    let (kind, request) = match method.parameters() {
        [] if returns_subcomponent => (
            EntryPointKind::SubcomponentFactory,
            DependencyRequest::for_type(elements, return_type, &[], location),
        ),
        [] if !return_type.is_unit() => (
            EntryPointKind::Provision,
            DependencyRequest::for_type(elements, return_type, method.annotations(), location),
        ),
        [target] if return_type.is_unit() => (
            EntryPointKind::MembersInjection,
            DependencyRequest::for_members_injection(target.ty(), location.parameter(target.name())),
        ),
        _ => {
            report.add_error_at(
                "Component methods must either take no parameters and return a value, or take one parameter and return nothing",
                location,
            );
            return None;
        }
    };

    Some(EntryPoint {
        method: method.clone(),
        kind,
        request,
    })
}
