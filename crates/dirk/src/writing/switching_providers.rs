// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::{Level, event};

use crate::binding::Binding;
use crate::model::usize_literal;

use super::naming::ident;

/// The most cases a single switching provider type dispatches over.
pub const MAX_CASES_PER_SWITCH: usize = 100;

#[derive(Debug)]
struct SwitchingProviderType {
    name: Ident,
    cases: Vec<TokenStream>,
}

/// Creates framework instances that share a few dispatch types instead of one closure type per
/// binding.
///
/// Every framework instance is a `(dispatch type, case id)` pair. `get()` matches on the id and
/// evaluates the binding's delegate expression against the upgraded component.
#[derive(Debug)]
pub struct SwitchingProviders {
    owner: Ident,
    types: RefCell<Vec<SwitchingProviderType>>,
}

impl SwitchingProviders {
    /// Creates an empty set of switching providers for the named component implementation.
    #[must_use]
    pub fn new(owner: &str) -> Self {
        Self {
            owner: ident(owner),
            types: RefCell::new(Vec::new()),
        }
    }

    /// Allocates the next case for `binding` and returns the expression creating its framework
    /// instance.
    ///
    /// `delegate_source` evaluates to the binding's unscoped instance, with the component
    /// available as `component`.
    pub fn new_framework_instance_creation_expression(&self, binding: &Binding, delegate_source: TokenStream) -> TokenStream {
        let mut types = self.types.borrow_mut();
        if types.last().is_none_or(|last| last.cases.len() >= MAX_CASES_PER_SWITCH) {
            let name = ident(&format!("{}SwitchingProvider{}", self.owner, types.len()));
            event!(Level::DEBUG, provider = %name, "switching provider type started");
            types.push(SwitchingProviderType { name, cases: Vec::new() });
        }

        let last = types.len() - 1;
        let current = &mut types[last];
        let id = current.cases.len();
        current.cases.push(delegate_source);
        event!(Level::TRACE, provider = %current.name, case = id, key = %binding.key(), "switching provider case allocated");

        let name = &current.name;
        let id = usize_literal(id);
        quote! {
            ::dirk::Provider::switching(#name::new(self.this.clone(), #id))
        }
    }

    /// The `(type name, case id)` of every allocated case, in allocation order.
    #[must_use]
    pub fn allocations(&self) -> Vec<(String, usize)> {
        self.types
            .borrow()
            .iter()
            .flat_map(|ty| (0..ty.cases.len()).map(|id| (ty.name.to_string(), id)))
            .collect()
    }

    /// Returns `true` if no case was allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.borrow().is_empty()
    }

    /// The definitions of the dispatch types.
    #[cfg_attr(test, mutants::skip)]
    #[must_use]
    pub fn type_definitions(&self) -> TokenStream {
        let owner = &self.owner;
        let types = self.types.borrow();
        let definitions = types.iter().map(|ty| {
            let name = &ty.name;
            let ids = (0..ty.cases.len()).map(usize_literal);
            let cases = &ty.cases;
            quote! {
                #[derive(Clone)]
                struct #name {
                    component: ::std::rc::Weak<#owner>,
                    id: usize,
                }

                impl #name {
                    fn new(component: ::std::rc::Weak<#owner>, id: usize) -> Self {
                        Self { component, id }
                    }
                }

                impl<T: 'static> ::dirk::internal::Switch<T> for #name {
                    fn get(&self) -> T {
                        let component = ::dirk::internal::upgrade(&self.component);
                        match self.id {
                            #( #ids => ::dirk::internal::cast(#cases), )*
                            id => ::dirk::internal::unknown_case(id),
                        }
                    }
                }
            }
        });
        quote!(#(#definitions)*)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingKind, BindingSource, Key};
    use crate::model::{ElementRef, TypeName, TypeRef};

    fn binding(index: usize) -> Binding {
        let name = TypeName::new(format!("app::Type{index}"));
        Binding::new(
            Key::of(TypeRef::declared(name.clone())),
            BindingKind::Injection,
            BindingSource::Synthetic,
            ElementRef::of_type(name),
        )
    }

    #[test]
    fn empty_until_first_allocation() {
        let providers = SwitchingProviders::new("DirkApp");
        assert!(providers.is_empty());
        assert!(providers.type_definitions().is_empty());

        let _ = providers.new_framework_instance_creation_expression(&binding(0), quote!(app::Type0::new()));
        assert!(!providers.is_empty());
    }

    #[test]
    fn cases_roll_over_to_a_new_type() {
        let providers = SwitchingProviders::new("DirkApp");
        for index in 0..=MAX_CASES_PER_SWITCH {
            let _ = providers.new_framework_instance_creation_expression(&binding(index), quote!(()));
        }

        let allocations = providers.allocations();
        assert_eq!(allocations.len(), MAX_CASES_PER_SWITCH + 1);
        assert_eq!(allocations[0], ("DirkAppSwitchingProvider0".to_string(), 0));
        assert_eq!(
            allocations[MAX_CASES_PER_SWITCH - 1],
            ("DirkAppSwitchingProvider0".to_string(), MAX_CASES_PER_SWITCH - 1)
        );
        assert_eq!(allocations[MAX_CASES_PER_SWITCH], ("DirkAppSwitchingProvider1".to_string(), 0));
    }

    #[test]
    fn creation_expression_names_type_and_case() {
        let providers = SwitchingProviders::new("DirkApp");
        let _ = providers.new_framework_instance_creation_expression(&binding(0), quote!(app::Type0::new()));
        let second = providers.new_framework_instance_creation_expression(&binding(1), quote!(app::Type1::new()));

        assert_eq!(
            second.to_string(),
            quote!(::dirk::Provider::switching(DirkAppSwitchingProvider0::new(self.this.clone(), 1))).to_string()
        );
        let definitions = providers.type_definitions().to_string();
        assert!(definitions.contains("struct DirkAppSwitchingProvider0"));
        assert!(definitions.contains(&quote!(1 => ::dirk::internal::cast(app::Type1::new())).to_string()));
    }

    #[test]
    fn definitions_cover_every_dispatch_type() {
        let providers = SwitchingProviders::new("DirkApp");
        for index in 0..=MAX_CASES_PER_SWITCH {
            let _ = providers.new_framework_instance_creation_expression(&binding(index), quote!(()));
        }

        let definitions = providers.type_definitions().to_string();
        assert!(definitions.contains("struct DirkAppSwitchingProvider0"));
        assert!(definitions.contains("struct DirkAppSwitchingProvider1"));
        assert_eq!(definitions.matches("unknown_case").count(), 2);
    }
}
