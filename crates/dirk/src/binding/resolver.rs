// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{Level, event};

use crate::annotations::{
    assisted_factory_method, assisted_identifier, assisted_inject_constructor, inject_constructor, is_assisted_factory_type,
    is_assisted_parameter, scopes,
};
use crate::model::{ElementRef, Elements, ExecutableElement, TypeElement};
use crate::type_names;
use crate::validation::{Messager, ValidationReport};

use super::{
    Argument, AssistedFactoryMethod, AssistedParameter, Binding, BindingGraph, BindingKind, BindingSource, BindingType,
    ComponentDescriptor, Declaration, DependencyRequest, InjectionSite, Key, KeyTag, MapType, ModuleDeclarations,
    MultibindingEntry, RequestKind, Scope,
};

/// Where a resolved key lives relative to the requesting component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ownership {
    Local,
    Ancestor(usize),
}

impl Ownership {
    fn up(self) -> Self {
        match self {
            Self::Local => Self::Ancestor(1),
            Self::Ancestor(distance) => Self::Ancestor(distance + 1),
        }
    }
}

/// Builds [`BindingGraph`]s for root components.
#[derive(Clone, Copy, Debug)]
pub struct BindingGraphFactory<'a> {
    elements: &'a dyn Elements,
    messager: &'a dyn Messager,
}

impl<'a> BindingGraphFactory<'a> {
    /// Creates a factory reading declarations from `elements` and reporting to `messager`.
    #[must_use]
    pub fn new(elements: &'a dyn Elements, messager: &'a dyn Messager) -> Self {
        Self { elements, messager }
    }

    /// Resolves the graph of a root component and all of its subcomponents.
    ///
    /// Every problem is reported to the messager. Returns `None` if any component in the tree
    /// has an error, since nothing of a partially resolved tree can be generated.
    #[must_use]
    pub fn create(&self, descriptor: &ComponentDescriptor) -> Option<BindingGraph> {
        let resolver = Resolver::new(self.elements, None, descriptor);
        resolver.resolve_entry_points();
        let (graph, report) = resolver.into_graph();

        report.print_messages_to(self.messager);
        if !report.is_clean() {
            event!(Level::DEBUG, component = %descriptor.type_name(), "binding graph has errors");
            return None;
        }

        event!(
            Level::DEBUG,
            component = %descriptor.type_name(),
            bindings = graph.bindings.len(),
            subcomponents = graph.children.len(),
            "binding graph resolved"
        );
        Some(graph)
    }
}

struct Resolver<'a> {
    elements: &'a dyn Elements,
    parent: Option<&'a Resolver<'a>>,
    descriptor: &'a ComponentDescriptor,
    declarations: ModuleDeclarations,
    resolved: RefCell<IndexMap<Key, Binding>>,
    members: RefCell<IndexMap<Key, Binding>>,
    inherited: RefCell<IndexMap<Key, usize>>,
    failed: RefCell<HashSet<Key>>,
    edges: RefCell<Vec<(Key, Key, RequestKind)>>,
    report: RefCell<ValidationReport>,
}

impl<'a> Resolver<'a> {
    fn new(elements: &'a dyn Elements, parent: Option<&'a Resolver<'a>>, descriptor: &'a ComponentDescriptor) -> Self {
        Self {
            elements,
            parent,
            descriptor,
            declarations: ModuleDeclarations::for_modules(elements, descriptor.modules()),
            resolved: RefCell::new(IndexMap::new()),
            members: RefCell::new(IndexMap::new()),
            inherited: RefCell::new(IndexMap::new()),
            failed: RefCell::new(HashSet::new()),
            edges: RefCell::new(Vec::new()),
            report: RefCell::new(ValidationReport::new(descriptor.element().element_ref())),
        }
    }

    fn error(&self, message: impl Into<String>, location: ElementRef) {
        self.report.borrow_mut().add_error_at(message, location);
    }

    fn resolve_entry_points(&self) {
        for entry_point in self.descriptor.entry_points() {
            self.resolve_request(None, entry_point.request());
        }
    }

    /// Resolves this component's children, then freezes everything into a graph.
    ///
    /// Children are resolved while this resolver is still open because they may ask it to
    /// resolve more keys, for example a binding scoped to this component.
    fn into_graph(self) -> (BindingGraph, ValidationReport) {
        let mut children = Vec::new();
        let mut child_reports = Vec::new();
        for child in self.descriptor.children() {
            let resolver = Resolver::new(self.elements, Some(&self), child);
            resolver.resolve_entry_points();
            let (graph, report) = resolver.into_graph();
            children.push(graph);
            child_reports.push(report);
        }

        let cycle_keys = self.find_cycles();
        let mut report = self.report.into_inner();
        for child_report in child_reports {
            report.merge(child_report);
        }

        let graph = BindingGraph {
            component: self.descriptor.clone(),
            bindings: self.resolved.into_inner(),
            members_injection_bindings: self.members.into_inner(),
            inherited: self.inherited.into_inner(),
            cycle_keys,
            children,
        };
        (graph, report)
    }

    fn resolve_request(&self, from: Option<&Key>, request: &DependencyRequest) {
        if request.kind() == RequestKind::MembersInjection {
            self.resolve_members_injection(request);
            return;
        }

        let ownership = self.resolve_key(request.key(), request.element());
        if let (Some(Ownership::Local), Some(from)) = (ownership, from) {
            self.edges
                .borrow_mut()
                .push((from.clone(), request.key().clone(), request.kind()));
        }
    }

    /// Returns `true` if this component or an ancestor declares the key or already resolved it.
    fn can_resolve(&self, key: &Key) -> bool {
        self.declarations.declares(key)
            || self.resolved.borrow().contains_key(key)
            || self.inherited.borrow().contains_key(key)
            || self.parent.is_some_and(|parent| parent.can_resolve(key))
    }

    fn resolve_key(&self, key: &Key, site: &ElementRef) -> Option<Ownership> {
        if self.resolved.borrow().contains_key(key) {
            return Some(Ownership::Local);
        }
        if let Some(distance) = self.inherited.borrow().get(key) {
            return Some(Ownership::Ancestor(*distance));
        }
        if self.failed.borrow().contains(key) {
            return None;
        }

        let ownership = self.lookup(key, site);
        match ownership {
            Some(Ownership::Ancestor(distance)) => {
                self.inherited.borrow_mut().insert(key.clone(), distance);
            }
            Some(Ownership::Local) => {}
            None => {
                self.failed.borrow_mut().insert(key.clone());
            }
        }
        ownership
    }

    fn lookup(&self, key: &Key, site: &ElementRef) -> Option<Ownership> {
        if let Some(id) = key.contribution() {
            if let Some(declaration) = self.declarations.contribution(id) {
                return Some(self.insert(declaration.to_binding(self.elements)));
            }
            return self.resolve_in_parent(key, site);
        }

        let unique = self.declarations.unique(key);
        if let [_, ..] = unique {
            let mut sources = self.ancestor_declarations(key);
            sources.extend_from_slice(unique);
            if sources.len() > 1 || self.has_multibinding_declaration(key) {
                self.report_duplicates(key, &sources, site);
                return None;
            }
        }
        if let [declaration] = unique {
            return Some(self.insert(declaration.to_binding(self.elements)));
        }
        if self.declarations.declares_multibinding(key) {
            return self.multibinding(key, site).map(|binding| self.insert(binding));
        }

        if let Some(parent) = self.parent
            && parent.can_resolve(key)
        {
            return self.resolve_in_parent(key, site);
        }

        self.implicit(key, site)
    }

    fn resolve_in_parent(&self, key: &Key, site: &ElementRef) -> Option<Ownership> {
        let Some(parent) = self.parent else {
            self.report_missing(key, site);
            return None;
        };
        parent.resolve_key(key, site).map(Ownership::up)
    }

    /// Explicit declarations of the key in ancestors, outermost first.
    fn ancestor_declarations(&self, key: &Key) -> Vec<Declaration> {
        let mut ancestors = Vec::new();
        let mut current = self.parent;
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = ancestor.parent;
        }
        ancestors
            .iter()
            .rev()
            .flat_map(|ancestor| ancestor.declarations.unique(key).iter().cloned())
            .collect()
    }

    fn has_multibinding_declaration(&self, key: &Key) -> bool {
        self.declarations.declares_multibinding(key) || self.parent.is_some_and(|parent| parent.has_multibinding_declaration(key))
    }

    /// Inserts a local binding, then resolves its dependencies.
    ///
    /// The binding is visible before its dependencies are resolved, so a cycle ends at the
    /// first repeated key.
    fn insert(&self, binding: Binding) -> Ownership {
        let key = binding.key().clone();
        let dependencies = binding.dependencies().to_vec();
        event!(Level::TRACE, component = %self.descriptor.type_name(), key = %key, kind = ?binding.kind(), "binding resolved");
        self.resolved.borrow_mut().insert(key.clone(), binding);

        for dependency in &dependencies {
            self.resolve_request(Some(&key), dependency);
        }
        Ownership::Local
    }

    /// All contributions from this component and its ancestors, outermost first.
    fn contributions(&self, key: &Key) -> Vec<Declaration> {
        let mut contributions = self.parent.map(|parent| parent.contributions(key)).unwrap_or_default();
        for declaration in self.declarations.contributions(key) {
            if !contributions.iter().any(|existing| existing.key() == declaration.key()) {
                contributions.push(declaration.clone());
            }
        }
        contributions
    }

    fn multibinding(&self, key: &Key, site: &ElementRef) -> Option<Binding> {
        let contributions = self.contributions(key);
        let is_map = MapType::is_map(key.ty());
        let kind = if is_map { BindingKind::MultiboundMap } else { BindingKind::MultiboundSet };

        if is_map && !self.check_map_keys(key, &contributions, site) {
            return None;
        }

        let mut binding = Binding::new(key.clone(), kind, BindingSource::Synthetic, site.clone());
        binding.dependencies = contributions
            .iter()
            .map(|declaration| DependencyRequest::new(declaration.key().clone(), RequestKind::Instance, declaration.element()))
            .collect();
        binding.arguments = (0..binding.dependencies.len()).map(Argument::Dependency).collect();
        binding.entries = contributions
            .iter()
            .map(|declaration| MultibindingEntry {
                contribution_type: declaration.contribution_type(),
                map_key: declaration.map_key().cloned(),
            })
            .collect();
        if contributions.iter().any(|declaration| declaration.method().has_annotation(type_names::PRODUCES)) {
            binding.binding_type = BindingType::Production;
        }
        Some(binding)
    }

    fn check_map_keys(&self, key: &Key, contributions: &[Declaration], site: &ElementRef) -> bool {
        let mut seen: IndexMap<String, &Declaration> = IndexMap::new();
        let mut valid = true;
        for declaration in contributions {
            let Some(map_key) = declaration.map_key().map(ToString::to_string) else {
                continue;
            };
            if let Some(first) = seen.get(&map_key) {
                self.error(
                    format!(
                        "The same map key is bound more than once for {key}: {map_key} is contributed by {} and {}",
                        first.element(),
                        declaration.element()
                    ),
                    site.clone(),
                );
                valid = false;
            } else {
                seen.insert(map_key, declaration);
            }
        }
        valid
    }

    fn implicit(&self, key: &Key, site: &ElementRef) -> Option<Ownership> {
        if key.qualifier().is_some() {
            self.report_missing(key, site);
            return None;
        }

        let Some(name) = key.ty().name() else {
            self.report_missing(key, site);
            return None;
        };

        if key.tag().is_none() {
            if name == self.descriptor.type_name() {
                let binding = Binding::new(key.clone(), BindingKind::Component, BindingSource::Type(name.clone()), site.clone());
                return Some(self.insert(binding));
            }
            if self.descriptor.children().iter().any(|child| child.type_name() == name) {
                let binding = Binding::new(
                    key.clone(),
                    BindingKind::SubcomponentCreator,
                    BindingSource::Type(name.clone()),
                    site.clone(),
                );
                return Some(self.insert(binding));
            }
        }

        let Some(element) = self.elements.type_element(name) else {
            self.report_missing(key, site);
            return None;
        };

        if let Some(constructor) = assisted_inject_constructor(element) {
            if key.tag() == Some(&KeyTag::AssistedInjection) {
                return Some(self.insert(self.assisted_injection_binding(key, element, constructor)));
            }
            self.error(
                format!(
                    "{name} cannot be requested directly because its constructor is @AssistedInject; request its @AssistedFactory instead"
                ),
                site.clone(),
            );
            return None;
        }
        if key.tag().is_some() {
            self.report_missing(key, site);
            return None;
        }

        if let Some(constructor) = inject_constructor(element) {
            let binding = self.injection_binding(key, element, constructor);
            if let Some(scope) = binding.scope().filter(|scope| !scope.is_reusable())
                && !self.descriptor.has_scope(scope)
            {
                if self.ancestor_has_scope(scope) {
                    return self.resolve_in_parent(key, site);
                }
                self.error(
                    format!(
                        "{name} is scoped with {} but {} does not have that scope",
                        scope.annotation(),
                        self.descriptor.type_name()
                    ),
                    site.clone(),
                );
                return None;
            }
            return Some(self.insert(binding));
        }

        if is_assisted_factory_type(element) {
            return self.assisted_factory_binding(key, element, site).map(|binding| self.insert(binding));
        }

        self.report_missing(key, site);
        None
    }

    fn ancestor_has_scope(&self, scope: &Scope) -> bool {
        self.parent
            .is_some_and(|parent| parent.descriptor.has_scope(scope) || parent.ancestor_has_scope(scope))
    }

    fn injection_binding(&self, key: &Key, element: &TypeElement, constructor: &ExecutableElement) -> Binding {
        let location = constructor.element_ref(element.name());
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::Injection,
            BindingSource::Constructor {
                ty: element.name().clone(),
                name: constructor.name().to_string(),
            },
            location.clone(),
        );
        for parameter in constructor.parameters() {
            binding.arguments.push(Argument::Dependency(binding.dependencies.len()));
            binding.dependencies.push(DependencyRequest::for_type(
                self.elements,
                parameter.ty(),
                parameter.annotations(),
                location.parameter(parameter.name()),
            ));
        }
        binding.scope = scopes(self.elements, element.annotations())
            .first()
            .map(|scope| Scope::new((*scope).clone()));
        self.add_injection_sites(&mut binding, element);
        binding
    }

    fn assisted_injection_binding(&self, key: &Key, element: &TypeElement, constructor: &ExecutableElement) -> Binding {
        let location = constructor.element_ref(element.name());
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::AssistedInjection,
            BindingSource::Constructor {
                ty: element.name().clone(),
                name: constructor.name().to_string(),
            },
            location.clone(),
        );
        for parameter in constructor.parameters() {
            if is_assisted_parameter(parameter) {
                binding.arguments.push(Argument::Assisted(binding.assisted_parameters.len()));
                binding.assisted_parameters.push(AssistedParameter {
                    name: parameter.name().to_string(),
                    ty: parameter.ty().clone(),
                    identifier: assisted_identifier(parameter),
                });
            } else {
                binding.arguments.push(Argument::Dependency(binding.dependencies.len()));
                binding.dependencies.push(DependencyRequest::for_type(
                    self.elements,
                    parameter.ty(),
                    parameter.annotations(),
                    location.parameter(parameter.name()),
                ));
            }
        }
        self.add_injection_sites(&mut binding, element);
        binding
    }

    fn assisted_factory_binding(&self, key: &Key, element: &TypeElement, site: &ElementRef) -> Option<Binding> {
        let Some(method) = assisted_factory_method(element) else {
            self.error(
                format!("The @AssistedFactory-annotated type {} must have exactly one abstract method", element.name()),
                site.clone(),
            );
            return None;
        };

        let location = method.element_ref(element.name());
        let parameters: Vec<AssistedParameter> = method
            .parameters()
            .iter()
            .map(|parameter| AssistedParameter {
                name: parameter.name().to_string(),
                ty: parameter.ty().clone(),
                identifier: assisted_identifier(parameter),
            })
            .collect();
        if !self.factory_parameters_match(method, &parameters, &location) {
            return None;
        }

        let target = Key::of(method.return_type().clone()).for_assisted_injection();
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::AssistedFactory,
            BindingSource::Type(element.name().clone()),
            element.element_ref(),
        );
        binding.dependencies = vec![DependencyRequest::new(target, RequestKind::Provider, location)];
        binding.factory_method = Some(AssistedFactoryMethod {
            name: method.name().to_string(),
            parameters,
            return_type: method.return_type().clone(),
        });
        Some(binding)
    }

    /// Checks that the factory parameters pair up with the `@Assisted` constructor parameters of
    /// the created type, by type and identifier.
    ///
    /// A created type without an `@AssistedInject` constructor is left to dependency resolution.
    fn factory_parameters_match(
        &self,
        method: &ExecutableElement,
        parameters: &[AssistedParameter],
        location: &ElementRef,
    ) -> bool {
        let Some(target) = method.return_type().name().and_then(|name| self.elements.type_element(name)) else {
            return true;
        };
        let Some(constructor) = assisted_inject_constructor(target) else {
            return true;
        };

        let expected: Vec<AssistedParameter> = constructor
            .parameters()
            .iter()
            .filter(|parameter| is_assisted_parameter(parameter))
            .map(|parameter| AssistedParameter {
                name: parameter.name().to_string(),
                ty: parameter.ty().clone(),
                identifier: assisted_identifier(parameter),
            })
            .collect();
        let paired = expected.len() == parameters.len()
            && expected
                .iter()
                .all(|wanted| parameters.iter().filter(|parameter| parameter.matches(wanted)).count() == 1);
        if paired {
            return true;
        }

        let list = |parameters: &[AssistedParameter]| {
            parameters.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };
        self.error(
            format!(
                "The parameters of the factory method must match the @Assisted parameters of {}: expected ({}), found ({})",
                target.name(),
                list(&expected),
                list(parameters)
            ),
            location.clone(),
        );
        false
    }

    fn members_injection_binding(&self, key: &Key, element: &TypeElement) -> Binding {
        let mut binding = Binding::new(
            key.clone(),
            BindingKind::MembersInjection,
            BindingSource::Type(element.name().clone()),
            element.element_ref(),
        );
        self.add_injection_sites(&mut binding, element);
        binding
    }

    fn add_injection_sites(&self, binding: &mut Binding, element: &TypeElement) {
        for field in element.fields().iter().filter(|field| field.has_annotation(type_names::INJECT)) {
            binding.injection_sites.push(InjectionSite::Field {
                name: field.name().to_string(),
                dependency: binding.dependencies.len(),
            });
            binding.dependencies.push(DependencyRequest::for_type(
                self.elements,
                field.ty(),
                field.annotations(),
                ElementRef::of_member(element.name().clone(), field.name()),
            ));
        }

        for method in element.methods().iter().filter(|method| method.has_annotation(type_names::INJECT)) {
            let location = method.element_ref(element.name());
            let mut dependencies = Vec::new();
            for parameter in method.parameters() {
                dependencies.push(binding.dependencies.len());
                binding.dependencies.push(DependencyRequest::for_type(
                    self.elements,
                    parameter.ty(),
                    parameter.annotations(),
                    location.parameter(parameter.name()),
                ));
            }
            binding.injection_sites.push(InjectionSite::Method {
                name: method.name().to_string(),
                dependencies,
            });
        }
    }

    fn resolve_members_injection(&self, request: &DependencyRequest) {
        let key = request.key();
        if self.members.borrow().contains_key(key) {
            return;
        }

        let Some(element) = key.ty().name().and_then(|name| self.elements.type_element(name)) else {
            self.report_missing(key, request.element());
            return;
        };

        let binding = self.members_injection_binding(key, element);
        let dependencies = binding.dependencies().to_vec();
        self.members.borrow_mut().insert(key.clone(), binding);
        for dependency in &dependencies {
            self.resolve_request(None, dependency);
        }
    }

    fn report_missing(&self, key: &Key, site: &ElementRef) {
        self.error(
            format!("{key} cannot be provided without an @Inject constructor or a @Provides-annotated method"),
            site.clone(),
        );
    }

    fn report_duplicates(&self, key: &Key, unique: &[Declaration], site: &ElementRef) {
        let mut sources: Vec<String> = unique.iter().map(|declaration| declaration.element().to_string()).collect();
        if self.has_multibinding_declaration(key) {
            sources.push("a multibinding declaration".to_string());
        }
        self.error(format!("{key} is bound multiple times: {}", sources.join(", ")), site.clone());
    }

    /// Finds dependency cycles among local bindings.
    ///
    /// A cycle made only of direct requests is an error. Every key on any cycle is returned so
    /// generation can break the cycle through a framework instance.
    fn find_cycles(&self) -> IndexSet<Key> {
        let bindings = self.resolved.borrow();
        let mut graph = DiGraph::<usize, bool>::new();
        let nodes: Vec<_> = (0..bindings.len()).map(|index| graph.add_node(index)).collect();

        for (from, to, kind) in self.edges.borrow().iter() {
            if let (Some(from), Some(to)) = (bindings.get_index_of(from), bindings.get_index_of(to)) {
                graph.add_edge(nodes[from], nodes[to], kind.is_direct());
            }
        }

        let direct = graph.filter_map(|_, node| Some(*node), |_, is_direct| is_direct.then_some(()));
        for scc in tarjan_scc(&direct) {
            let Some(path) = cycle_path(&direct, &scc) else {
                continue;
            };
            let keys: Vec<&Key> = path.iter().filter_map(|&node| bindings.get_index(direct[node]).map(|(key, _)| key)).collect();
            let location = bindings
                .get_index(direct[path[0]])
                .map_or_else(|| self.descriptor.element().element_ref(), |(_, binding)| binding.element().clone());
            let cycle: Vec<String> = keys.iter().map(ToString::to_string).collect();
            self.error(format!("Found a dependency cycle: {}", cycle.join(" -> ")), location);
        }

        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| cycle_path(&graph, scc).is_some())
            .flatten()
            .filter_map(|node| bindings.get_index(graph[node]).map(|(key, _)| key.clone()))
            .collect()
    }
}

/// Walks one cycle through a strongly connected component, starting and ending at its
/// earliest node. Returns `None` if the component is a single node without a self edge.
fn cycle_path<E>(graph: &DiGraph<usize, E>, scc: &[NodeIndex]) -> Option<Vec<NodeIndex>> {
    let start = scc.iter().copied().min()?;
    if scc.len() == 1 {
        return graph.contains_edge(start, start).then(|| vec![start, start]);
    }

    let mut previous: IndexMap<NodeIndex, NodeIndex> = IndexMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                let mut path = vec![start, node];
                let mut current = node;
                while let Some(&before) = previous.get(&current) {
                    path.push(before);
                    current = before;
                }
                path.reverse();
                return Some(path);
            }
            if scc.contains(&next) && !previous.contains_key(&next) {
                previous.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}
