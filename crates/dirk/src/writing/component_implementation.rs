// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::iter;

use indexmap::IndexMap;
use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{ToTokens, quote};
use tracing::{Level, event};

use crate::binding::{
    Argument, AssistedParameter, Binding, BindingGraph, BindingKind, BindingSource, ContributionType, EntryPoint, EntryPointKind,
    InjectionSite, Key, RequestKind,
};
use crate::error::{Error, Result};
use crate::model::{Elements, TypeName, usize_literal};

use super::annotation_creator::map_key_expression;
use super::naming::{UniqueNames, ident, key_base_name, pascal_to_snake_case, subcomponent_impl_name};
use super::representation::{BindingRepresentation, needs_framework_instance, select_representation};
use super::switching_providers::SwitchingProviders;

/// The expression generated code reaches a component through: `self` in component methods and
/// `component` in closures and dispatch types.
#[derive(Clone, Debug)]
pub(crate) struct Receiver(TokenStream);

impl Receiver {
    pub(crate) fn this() -> Self {
        Self(quote!(self))
    }

    pub(crate) fn component() -> Self {
        Self(quote!(component))
    }

    /// The same receiver, walked `distance` components up the parent chain.
    fn ancestor(&self, distance: usize) -> Self {
        let inner = &self.0;
        let parents = iter::repeat_n(quote!(.parent), distance);
        Self(quote!(#inner #(#parents)*))
    }
}

impl ToTokens for Receiver {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.0.to_tokens(tokens);
    }
}

/// Where a framework field lives: in the component itself (shard 0) or in one of its shards.
/// The field name doubles as the name of its accessor method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MemberSelect {
    shard: usize,
    field: Ident,
}

impl MemberSelect {
    fn path(&self, receiver: &Receiver) -> TokenStream {
        let field = &self.field;
        if self.shard == 0 {
            quote!(#receiver.#field)
        } else {
            let shard = shard_field(self.shard);
            quote!(#receiver.#shard.#field)
        }
    }
}

fn shard_field(shard: usize) -> Ident {
    ident(&format!("shard{shard}"))
}

fn invariant(message: impl Into<String>) -> Error {
    Error::InvariantViolation(message.into())
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct GenerationSettings {
    pub(crate) fast_init: bool,
    pub(crate) keys_per_shard: usize,
}

/// The generated implementation of one component while it is being written.
///
/// Every member is created on first request and memoized, so a binding gets exactly one
/// initialization expression however often it is requested. Subcomponents are written while
/// their parent is still open because they add accessors to it.
#[derive(Debug)]
pub(crate) struct ComponentImplementation<'a> {
    elements: &'a dyn Elements,
    settings: GenerationSettings,
    graph: &'a BindingGraph,
    parent: Option<&'a ComponentImplementation<'a>>,
    name: Ident,
    names: UniqueNames,
    usages: IndexMap<(Key, usize), usize>,
    module_fields: RefCell<IndexMap<TypeName, Ident>>,
    framework_instances: RefCell<IndexMap<Key, MemberSelect>>,
    private_methods: RefCell<IndexMap<Key, Ident>>,
    creation_methods: RefCell<IndexMap<Key, Ident>>,
    injection_methods: RefCell<IndexMap<Key, Ident>>,
    factories: RefCell<IndexMap<Key, Ident>>,
    fields: RefCell<Vec<(MemberSelect, TokenStream)>>,
    methods: RefCell<Vec<TokenStream>>,
    items: RefCell<Vec<TokenStream>>,
    switching: SwitchingProviders,
}

impl<'a> ComponentImplementation<'a> {
    pub(crate) fn new(
        elements: &'a dyn Elements,
        settings: GenerationSettings,
        graph: &'a BindingGraph,
        parent: Option<&'a ComponentImplementation<'a>>,
        name: &str,
    ) -> Self {
        let names = UniqueNames::default();
        for reserved in ["this", "parent", "new"] {
            names.reserve(reserved);
        }

        Self {
            elements,
            settings,
            graph,
            parent,
            name: ident(name),
            names,
            usages: count_usages(graph, settings.keys_per_shard),
            module_fields: RefCell::new(IndexMap::new()),
            framework_instances: RefCell::new(IndexMap::new()),
            private_methods: RefCell::new(IndexMap::new()),
            creation_methods: RefCell::new(IndexMap::new()),
            injection_methods: RefCell::new(IndexMap::new()),
            factories: RefCell::new(IndexMap::new()),
            fields: RefCell::new(Vec::new()),
            methods: RefCell::new(Vec::new()),
            items: RefCell::new(Vec::new()),
            switching: SwitchingProviders::new(name),
        }
    }

    /// The framework instance supplier of a local binding, created on first use.
    pub(crate) fn framework_instance(&self, binding: &Binding) -> Result<MemberSelect> {
        if let Some(select) = self.framework_instances.borrow().get(binding.key()) {
            return Ok(select.clone());
        }

        let suffix = if binding.is_production() { "producer" } else { "provider" };
        let select = MemberSelect {
            shard: self.shard_of(binding.key()),
            field: self.names.claim(&format!("{}_{suffix}", key_base_name(binding.key()))),
        };
        self.framework_instances
            .borrow_mut()
            .insert(binding.key().clone(), select.clone());

        let creation = self.framework_creation_expression(binding)?;
        let creation = match binding.scope() {
            Some(scope) if scope.is_reusable() => quote!(::dirk::SingleCheck::provider(#creation)),
            Some(_) => quote!(::dirk::Scoped::provider(#creation)),
            None => creation,
        };

        let framework_type = framework_type(binding);
        let field = &select.field;
        let path = select.path(&Receiver::this());
        self.methods.borrow_mut().push(quote! {
            fn #field(&self) -> #framework_type {
                #path.get_or_init(|| #creation).clone()
            }
        });
        self.fields
            .borrow_mut()
            .push((select.clone(), quote!(::std::cell::OnceCell<#framework_type>)));

        event!(Level::TRACE, key = %binding.key(), field = %field, shard = select.shard, "framework instance field added");
        Ok(select)
    }

    /// The expression satisfying a request for `key` made from `shard`.
    pub(crate) fn request_expression(&self, key: &Key, kind: RequestKind, receiver: &Receiver, shard: usize) -> Result<TokenStream> {
        match self.graph.owner_distance(key) {
            Some(0) => {}
            Some(distance) => return self.inherited_expression(key, kind, receiver, distance),
            None => {
                return Err(invariant(format!(
                    "{key} is requested in {} but has no binding",
                    self.graph.component().type_name()
                )));
            }
        }

        let binding = self.local_binding(key)?;
        let usages = self.usages.get(&(key.clone(), shard)).copied().unwrap_or_default();
        let representation = select_representation(binding, kind, self.graph, usages);
        event!(Level::TRACE, key = %key, request = ?kind, representation = ?representation, "binding representation selected");

        match representation {
            BindingRepresentation::FrameworkInstance => {
                let select = self.framework_instance(binding)?;
                let accessor = &select.field;
                Ok(framework_request(binding, kind, &quote!(#receiver.#accessor())))
            }
            BindingRepresentation::PrivateMethod => {
                let method = self.private_method(binding)?;
                Ok(quote!(#receiver.#method()))
            }
            BindingRepresentation::DirectInstance => self.creation_expression(binding, receiver, shard, &[]),
        }
    }

    fn inherited_expression(&self, key: &Key, kind: RequestKind, receiver: &Receiver, distance: usize) -> Result<TokenStream> {
        let owner = self.ancestor(distance)?;
        let binding = owner.local_binding(key)?;
        let receiver = receiver.ancestor(distance);

        if kind.framework_type().is_some() || needs_framework_instance(binding, owner.graph) {
            let select = owner.framework_instance(binding)?;
            let accessor = &select.field;
            return Ok(framework_request(binding, kind, &quote!(#receiver.#accessor())));
        }
        let method = owner.private_method(binding)?;
        Ok(quote!(#receiver.#method()))
    }

    fn framework_creation_expression(&self, binding: &Binding) -> Result<TokenStream> {
        let shard = self.shard_of(binding.key());

        if binding.kind() == BindingKind::Delegate {
            let [dependency] = binding.dependencies() else {
                return Err(invariant(format!("delegate binding for {} must have one dependency", binding.key())));
            };
            let delegate = self.request_expression(dependency.key(), RequestKind::Provider, &Receiver::this(), shard)?;
            return Ok(quote!(::dirk::Provider::map(#delegate, ::core::convert::Into::into)));
        }

        if binding.is_production() {
            let method = self.creation_method(binding)?;
            return Ok(quote! {
                ::dirk::producers::Producer::new({
                    let this = self.this.clone();
                    move || {
                        let component = ::dirk::internal::upgrade(&this);
                        async move { component.#method().await }
                    }
                })
            });
        }

        let delegate_source = self.delegate_source(binding, shard)?;
        if self.settings.fast_init {
            return Ok(self
                .switching
                .new_framework_instance_creation_expression(binding, delegate_source));
        }
        Ok(quote! {
            ::dirk::Provider::new({
                let this = self.this.clone();
                move || {
                    let component = ::dirk::internal::upgrade(&this);
                    #delegate_source
                }
            })
        })
    }

    /// The unscoped instance a framework instance hands out, with the component bound to
    /// `component`.
    ///
    /// When instance requests are themselves derived from the framework instance, inlining
    /// them would recurse, so a dedicated creation method is used instead.
    fn delegate_source(&self, binding: &Binding, shard: usize) -> Result<TokenStream> {
        let receiver = Receiver::component();
        if needs_framework_instance(binding, self.graph) {
            let method = self.creation_method(binding)?;
            Ok(quote!(#receiver.#method()))
        } else if binding.requires_method_encapsulation() {
            let method = self.private_method(binding)?;
            Ok(quote!(#receiver.#method()))
        } else {
            self.creation_expression(binding, &receiver, shard, &[])
        }
    }

    fn private_method(&self, binding: &Binding) -> Result<Ident> {
        if let Some(method) = self.private_methods.borrow().get(binding.key()) {
            return Ok(method.clone());
        }

        let method = self.names.claim(&key_base_name(binding.key()));
        self.private_methods
            .borrow_mut()
            .insert(binding.key().clone(), method.clone());

        let body = self.creation_expression(binding, &Receiver::this(), self.shard_of(binding.key()), &[])?;
        let ty = value_type(binding);
        self.methods.borrow_mut().push(quote! {
            fn #method(&self) -> #ty {
                #body
            }
        });
        Ok(method)
    }

    fn creation_method(&self, binding: &Binding) -> Result<Ident> {
        if let Some(method) = self.creation_methods.borrow().get(binding.key()) {
            return Ok(method.clone());
        }

        let method = self.names.claim(&format!("new_{}", key_base_name(binding.key())));
        self.creation_methods
            .borrow_mut()
            .insert(binding.key().clone(), method.clone());

        let body = self.creation_expression(binding, &Receiver::this(), self.shard_of(binding.key()), &[])?;
        let ty = value_type(binding);
        let asyncness = binding.is_production().then(|| quote!(async));
        self.methods.borrow_mut().push(quote! {
            #asyncness fn #method(&self) -> #ty {
                #body
            }
        });
        Ok(method)
    }

    /// The expression constructing a new instance of `binding`.
    ///
    /// `assisted` names the factory parameters that satisfy assisted arguments.
    pub(crate) fn creation_expression(
        &self,
        binding: &Binding,
        receiver: &Receiver,
        shard: usize,
        assisted: &[AssistedParameter],
    ) -> Result<TokenStream> {
        let arguments = binding
            .arguments()
            .iter()
            .map(|argument| match argument {
                Argument::Dependency(index) => self.dependency_expression(binding, *index, receiver, shard),
                Argument::Assisted(index) => assisted_argument(binding, *index, assisted),
            })
            .collect::<Result<Vec<_>>>()?;

        match (binding.kind(), binding.source()) {
            (BindingKind::Injection | BindingKind::AssistedInjection, BindingSource::Constructor { ty, name }) => {
                let constructor = ident(name);
                let construction = quote!(#ty::#constructor(#(#arguments),*));
                if binding.injection_sites().is_empty() {
                    return Ok(construction);
                }
                let injections = self.injection_statements(binding, &quote!(instance), receiver, shard)?;
                Ok(quote!({
                    let mut instance = #construction;
                    #(#injections)*
                    instance
                }))
            }
            (
                BindingKind::Provision | BindingKind::Production,
                BindingSource::ModuleMethod {
                    module,
                    method,
                    is_static,
                    is_async,
                },
            ) => {
                let method = ident(method);
                let call = if *is_static {
                    quote!(#module::#method(#(#arguments),*))
                } else {
                    let field = self.module_field(module);
                    quote!(#receiver.#field.#method(#(#arguments),*))
                };
                Ok(if *is_async { quote!(#call.await) } else { call })
            }
            (BindingKind::Delegate, _) => {
                let [delegate] = arguments.as_slice() else {
                    return Err(invariant(format!("delegate binding for {} must have one argument", binding.key())));
                };
                Ok(quote!(::core::convert::Into::into(#delegate)))
            }
            (BindingKind::MultiboundSet, _) => Ok(set_expression(binding, &arguments)),
            (BindingKind::MultiboundMap, _) => self.map_expression(binding, &arguments),
            (BindingKind::Component, _) => Ok(quote!(::dirk::internal::upgrade(&#receiver.this))),
            (BindingKind::SubcomponentCreator, _) => {
                let child = self.child_impl_name(binding.key())?;
                Ok(quote!(#child::new(::dirk::internal::upgrade(&#receiver.this))))
            }
            (BindingKind::AssistedFactory, _) => {
                let factory = self.assisted_factory(binding)?;
                Ok(quote!(::std::rc::Rc::new(#factory::new(#receiver.this.clone()))))
            }
            (kind, source) => Err(invariant(format!(
                "cannot construct the {kind:?} binding for {} from {source:?}",
                binding.key()
            ))),
        }
    }

    fn dependency_expression(&self, binding: &Binding, index: usize, receiver: &Receiver, shard: usize) -> Result<TokenStream> {
        let request = binding
            .dependencies()
            .get(index)
            .ok_or_else(|| invariant(format!("{} has no dependency {index}", binding.key())))?;
        self.request_expression(request.key(), request.kind(), receiver, shard)
    }

    fn injection_statements(&self, binding: &Binding, target: &TokenStream, receiver: &Receiver, shard: usize) -> Result<Vec<TokenStream>> {
        binding
            .injection_sites()
            .iter()
            .map(|site| match site {
                InjectionSite::Field { name, dependency } => {
                    let name = ident(name);
                    let value = self.dependency_expression(binding, *dependency, receiver, shard)?;
                    Ok(quote!(#target.#name = #value;))
                }
                InjectionSite::Method { name, dependencies } => {
                    let name = ident(name);
                    let values = dependencies
                        .iter()
                        .map(|index| self.dependency_expression(binding, *index, receiver, shard))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(quote!(#target.#name(#(#values),*);))
                }
            })
            .collect()
    }

    fn map_expression(&self, binding: &Binding, arguments: &[TokenStream]) -> Result<TokenStream> {
        if arguments.is_empty() {
            return Ok(quote!(::std::collections::HashMap::new()));
        }

        let insertions = binding
            .entries()
            .iter()
            .zip(arguments)
            .map(|(entry, argument)| {
                let map_key = entry
                    .map_key
                    .as_ref()
                    .ok_or_else(|| invariant(format!("a contribution to {} has no map key", binding.key())))?;
                let key = map_key_expression(self.elements, map_key);
                Ok(quote!(map.insert(#key, #argument);))
            })
            .collect::<Result<Vec<_>>>()?;
        let capacity = usize_literal(arguments.len());
        Ok(quote!({
            let mut map = ::std::collections::HashMap::with_capacity(#capacity);
            #(#insertions)*
            map
        }))
    }

    fn module_field(&self, module: &TypeName) -> Ident {
        if let Some(field) = self.module_fields.borrow().get(module) {
            return field.clone();
        }
        let field = self.names.claim(&pascal_to_snake_case(module.simple_name()));
        self.module_fields.borrow_mut().insert(module.clone(), field.clone());
        field
    }

    fn members_injection_method(&self, key: &Key) -> Result<Ident> {
        if let Some(method) = self.injection_methods.borrow().get(key) {
            return Ok(method.clone());
        }

        let binding = self
            .graph
            .members_injection_binding(key)
            .ok_or_else(|| invariant(format!("no members injection binding for {key}")))?;
        let method = self.names.claim(&format!("inject_{}", key_base_name(key)));
        self.injection_methods.borrow_mut().insert(key.clone(), method.clone());

        let statements = self.injection_statements(binding, &quote!(instance), &Receiver::this(), 0)?;
        let ty = key.ty();
        self.methods.borrow_mut().push(quote! {
            fn #method(&self, instance: &mut #ty) {
                #(#statements)*
            }
        });
        Ok(method)
    }

    fn assisted_factory(&self, binding: &Binding) -> Result<Ident> {
        if let Some(name) = self.factories.borrow().get(binding.key()) {
            return Ok(name.clone());
        }

        let BindingSource::Type(factory_type) = binding.source() else {
            return Err(invariant(format!("assisted factory {} has no factory type", binding.key())));
        };
        let method = binding
            .factory_method()
            .ok_or_else(|| invariant(format!("assisted factory {} has no creation method", binding.key())))?;
        let [target] = binding.dependencies() else {
            return Err(invariant(format!("assisted factory {} must depend on its target", binding.key())));
        };

        let name = ident(&format!("{}_{}", self.name, factory_type.simple_name()));
        self.factories.borrow_mut().insert(binding.key().clone(), name.clone());

        let distance = self
            .graph
            .owner_distance(target.key())
            .ok_or_else(|| invariant(format!("{} has no binding", target.key())))?;
        let owner = self.ancestor(distance)?;
        let target_binding = owner.local_binding(target.key())?;
        let body = owner.creation_expression(
            target_binding,
            &Receiver::component().ancestor(distance),
            owner.shard_of(target.key()),
            &method.parameters,
        )?;

        let upgrade = mentions(&body, "component")
            .then(|| quote!(let component = ::dirk::internal::upgrade(&self.component);));
        let component = &self.name;
        let method_name = ident(&method.name);
        let parameters = method.parameters.iter().map(|parameter| {
            let name = ident(&parameter.name);
            let ty = &parameter.ty;
            quote!(#name: #ty)
        });
        let return_type = &method.return_type;
        self.items.borrow_mut().push(quote! {
            #[allow(non_camel_case_types)]
            pub struct #name {
                component: ::std::rc::Weak<#component>,
            }

            impl #name {
                fn new(component: ::std::rc::Weak<#component>) -> Self {
                    Self { component }
                }
            }

            impl #factory_type for #name {
                fn #method_name(&self, #(#parameters),*) -> #return_type {
                    #upgrade
                    #body
                }
            }
        });
        Ok(name)
    }

    fn entry_point_method(&self, entry_point: &EntryPoint) -> Result<TokenStream> {
        let method = entry_point.method();
        let name = ident(method.name());
        let request = entry_point.request();

        match entry_point.kind() {
            EntryPointKind::MembersInjection => {
                let [parameter] = method.parameters() else {
                    return Err(invariant(format!("members injection method {name} must take one parameter")));
                };
                let parameter_name = ident(parameter.name());
                let ty = parameter.ty();
                let injector = self.members_injection_method(request.key())?;
                Ok(quote! {
                    fn #name(&self, #parameter_name: &mut #ty) {
                        self.#injector(#parameter_name);
                    }
                })
            }
            EntryPointKind::Provision | EntryPointKind::SubcomponentFactory => {
                let return_type = self.request_type(request.key(), request.kind());
                let expression = self.request_expression(request.key(), request.kind(), &Receiver::this(), 0)?;
                let asyncness = method.is_async().then(|| quote!(async));
                Ok(quote! {
                    #asyncness fn #name(&self) -> #return_type {
                        #expression
                    }
                })
            }
        }
    }

    /// The Rust type of a request, e.g. `::dirk::Lazy<app::Db>`.
    fn request_type(&self, key: &Key, kind: RequestKind) -> TokenStream {
        let value = self
            .graph
            .owner_distance(key)
            .and_then(|distance| self.ancestor(distance).ok())
            .and_then(|owner| owner.graph.binding(key))
            .map_or_else(|| key.ty().to_token_stream(), value_type);

        match kind {
            RequestKind::Instance | RequestKind::MembersInjection => value,
            RequestKind::Provider => quote!(::dirk::Provider<#value>),
            RequestKind::Lazy => quote!(::dirk::Lazy<#value>),
            RequestKind::ProviderOfLazy => quote!(::dirk::Provider<::dirk::Lazy<#value>>),
            RequestKind::Producer => quote!(::dirk::producers::Producer<#value>),
            RequestKind::Produced => quote!(::dirk::producers::Produced<#value>),
            RequestKind::Future => quote!(::dirk::producers::ProducerFuture<#value>),
        }
    }

    fn child_impl_name(&self, key: &Key) -> Result<Ident> {
        let child = key
            .ty()
            .name()
            .ok_or_else(|| invariant(format!("subcomponent key {key} is not a declared type")))?;
        Ok(ident(&subcomponent_impl_name(&self.name.to_string(), child)))
    }

    fn local_binding(&self, key: &Key) -> Result<&'a Binding> {
        self.graph
            .binding(key)
            .ok_or_else(|| invariant(format!("{key} is not bound in {}", self.graph.component().type_name())))
    }

    fn ancestor(&self, distance: usize) -> Result<&Self> {
        let mut current = self;
        for _ in 0..distance {
            current = current
                .parent
                .ok_or_else(|| invariant(format!("{} has no ancestor at distance {distance}", self.name)))?;
        }
        Ok(current)
    }

    fn shard_of(&self, key: &Key) -> usize {
        self.graph
            .binding_index(key)
            .map_or(0, |index| index / self.settings.keys_per_shard)
    }

    /// Writes the entry points and subcomponents, then assembles the component.
    pub(crate) fn generate(self) -> Result<TokenStream> {
        let entry_points = self
            .graph
            .component()
            .entry_points()
            .iter()
            .map(|entry_point| self.entry_point_method(entry_point))
            .collect::<Result<Vec<_>>>()?;

        let mut children = Vec::new();
        let name = self.name.to_string();
        for child in self.graph.children() {
            let child_name = subcomponent_impl_name(&name, child.component().type_name());
            let implementation = ComponentImplementation::new(self.elements, self.settings, child, Some(&self), &child_name);
            children.push(implementation.generate()?);
        }

        Ok(self.assemble(&entry_points, &children))
    }

    #[cfg_attr(test, mutants::skip)]
    fn assemble(&self, entry_points: &[TokenStream], children: &[TokenStream]) -> TokenStream {
        let name = &self.name;
        let component = self.graph.component().type_name();

        let (module_names, module_types): (Vec<_>, Vec<_>) = self
            .module_fields
            .borrow()
            .iter()
            .map(|(module, field)| (field.clone(), module.clone()))
            .unzip();

        let fields = self.fields.borrow();
        let shard_count = fields.iter().map(|(select, _)| select.shard).max().unwrap_or_default();
        let shard_fields = |shard: usize| -> (Vec<Ident>, Vec<TokenStream>) {
            fields
                .iter()
                .filter(|(select, _)| select.shard == shard)
                .map(|(select, ty)| (select.field.clone(), ty.clone()))
                .unzip()
        };

        let (own_names, own_types) = shard_fields(0);
        let shard_names: Vec<_> = (1..=shard_count).map(shard_field).collect();
        let shard_types: Vec<_> = (1..=shard_count).map(|shard| ident(&format!("{name}Shard{shard}"))).collect();
        let shard_structs = shard_types.iter().enumerate().map(|(index, shard_type)| {
            let (names, types) = shard_fields(index + 1);
            quote! {
                #[derive(Default)]
                struct #shard_type {
                    #(#names: #types,)*
                }
            }
        });

        let (parent_field, parent_parameter, parent_init) = match self.parent {
            Some(parent) => {
                let parent = &parent.name;
                (
                    quote!(parent: ::std::rc::Rc<#parent>,),
                    quote!(parent: ::std::rc::Rc<#parent>),
                    quote!(parent,),
                )
            }
            None => (TokenStream::new(), TokenStream::new(), TokenStream::new()),
        };

        let methods = self.methods.borrow();
        let items = self.items.borrow();
        let switching = self.switching.type_definitions();

        event!(
            Level::DEBUG,
            component = %component,
            fields = fields.len(),
            methods = methods.len(),
            shards = shard_count + 1,
            subcomponents = children.len(),
            "component implementation generated"
        );

        quote! {
            #[allow(non_camel_case_types)]
            pub struct #name {
                this: ::std::rc::Weak<Self>,
                #parent_field
                #(#module_names: #module_types,)*
                #(#own_names: #own_types,)*
                #(#shard_names: #shard_types,)*
            }

            #(#shard_structs)*

            impl #name {
                pub fn new(#parent_parameter) -> ::std::rc::Rc<Self> {
                    ::std::rc::Rc::new_cyclic(|this| Self {
                        this: this.clone(),
                        #parent_init
                        #(#module_names: ::core::default::Default::default(),)*
                        #(#own_names: ::std::cell::OnceCell::new(),)*
                        #(#shard_names: ::core::default::Default::default(),)*
                    })
                }

                #(#methods)*
            }

            impl #component for #name {
                #(#entry_points)*
            }

            #switching
            #(#items)*
            #(#children)*
        }
    }
}

/// Counts the instance requests for each key per requesting shard.
fn count_usages(graph: &BindingGraph, keys_per_shard: usize) -> IndexMap<(Key, usize), usize> {
    let mut usages: IndexMap<(Key, usize), usize> = IndexMap::new();
    let mut count = |key: &Key, shard: usize| *usages.entry((key.clone(), shard)).or_default() += 1;

    for (index, binding) in graph.bindings().enumerate() {
        for dependency in binding.dependencies().iter().filter(|d| d.kind() == RequestKind::Instance) {
            count(dependency.key(), index / keys_per_shard);
        }
    }
    for binding in graph.members_injection_bindings() {
        for dependency in binding.dependencies().iter().filter(|d| d.kind() == RequestKind::Instance) {
            count(dependency.key(), 0);
        }
    }
    for entry_point in graph.component().entry_points() {
        if entry_point.request().kind() == RequestKind::Instance {
            count(entry_point.request().key(), 0);
        }
    }
    usages
}

/// The Rust type of an instance of `binding`. Components and factories are handed out as
/// shared trait objects.
fn value_type(binding: &Binding) -> TokenStream {
    let ty = binding.key().ty();
    match binding.kind() {
        BindingKind::Component | BindingKind::SubcomponentCreator | BindingKind::AssistedFactory => {
            quote!(::std::rc::Rc<dyn #ty>)
        }
        _ => ty.to_token_stream(),
    }
}

fn framework_type(binding: &Binding) -> TokenStream {
    let value = value_type(binding);
    if binding.is_production() {
        quote!(::dirk::producers::Producer<#value>)
    } else {
        quote!(::dirk::Provider<#value>)
    }
}

/// Derives the requested form of a binding from its framework instance.
fn framework_request(binding: &Binding, kind: RequestKind, framework: &TokenStream) -> TokenStream {
    let production = binding.is_production();
    match kind {
        RequestKind::Provider => framework.clone(),
        RequestKind::Lazy => quote!(::dirk::Lazy::new(#framework)),
        RequestKind::ProviderOfLazy => quote!(::dirk::ProviderOfLazy::new(#framework)),
        RequestKind::Producer if production => framework.clone(),
        RequestKind::Producer => quote!(::dirk::producers::Producer::from_provider(#framework)),
        RequestKind::Produced if production => quote!(#framework.produced().await),
        RequestKind::Produced => quote!(::dirk::producers::Produced::successful(#framework.get())),
        RequestKind::Future if production => quote!(#framework.get()),
        RequestKind::Future => quote!(::dirk::producers::ProducerFuture::ready(#framework.get())),
        RequestKind::Instance | RequestKind::MembersInjection if production => quote!(#framework.get().await),
        RequestKind::Instance | RequestKind::MembersInjection => quote!(#framework.get()),
    }
}

fn set_expression(binding: &Binding, arguments: &[TokenStream]) -> TokenStream {
    if arguments.is_empty() {
        return quote!(::std::collections::HashSet::new());
    }

    let insertions = binding
        .entries()
        .iter()
        .zip(arguments)
        .map(|(entry, argument)| match entry.contribution_type {
            ContributionType::ElementsIntoSet => quote!(set.extend(#argument);),
            ContributionType::Unique | ContributionType::IntoSet | ContributionType::IntoMap => quote!(set.insert(#argument);),
        });
    let capacity = usize_literal(arguments.len());
    quote!({
        let mut set = ::std::collections::HashSet::with_capacity(#capacity);
        #(#insertions)*
        set
    })
}

/// Returns `true` if `tokens` contain the identifier `name` at any depth.
fn mentions(tokens: &TokenStream, name: &str) -> bool {
    tokens.clone().into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => ident == name,
        TokenTree::Group(group) => mentions(&group.stream(), name),
        TokenTree::Punct(_) | TokenTree::Literal(_) => false,
    })
}

/// The factory parameter passed for the assisted constructor parameter at `index`.
fn assisted_argument(binding: &Binding, index: usize, factory_parameters: &[AssistedParameter]) -> Result<TokenStream> {
    let wanted = binding
        .assisted_parameters()
        .get(index)
        .ok_or_else(|| invariant(format!("{} has no assisted parameter {index}", binding.key())))?;
    let parameter = factory_parameters
        .iter()
        .find(|parameter| parameter.matches(wanted))
        .ok_or_else(|| invariant(format!("no factory parameter is passed as {wanted} to {}", binding.key())))?;
    Ok(ident(&parameter.name).to_token_stream())
}
