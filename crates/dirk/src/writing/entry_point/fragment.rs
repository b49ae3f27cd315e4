// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use proc_macro2::TokenStream;
use quote::quote;
use tracing::{Level, event};

use super::AndroidEntryPointMetadata;
use crate::writing::GeneratedSource;
use crate::writing::naming::{ident, pascal_to_snake_case};

/// Generates the `Dirk_<Name>` wrapper of an `@AndroidEntryPoint` fragment.
///
/// The wrapper owns the base fragment and overrides its lifecycle hooks so that the component
/// context is installed and the fragment injected before the base sees them.
#[derive(Clone, Copy, Debug)]
pub struct FragmentGenerator<'a> {
    metadata: &'a AndroidEntryPointMetadata<'a>,
    use_get_context_fix: bool,
}

impl<'a> FragmentGenerator<'a> {
    /// Creates a generator. `use_get_context_fix` makes `context()` return `None` once the
    /// base fragment has been removed, unless the host disabled the fix at runtime.
    #[must_use]
    pub fn new(metadata: &'a AndroidEntryPointMetadata<'a>, use_get_context_fix: bool) -> Self {
        Self {
            metadata,
            use_get_context_fix,
        }
    }

    /// Generates the wrapper and its injector trait.
    #[must_use]
    pub fn generate(&self) -> GeneratedSource {
        let generated = self.metadata.generated_name();
        let name = ident(generated.simple_name());
        let base = self.metadata.base();
        let parameters: Vec<_> = self.metadata.type_parameters().iter().map(|p| ident(p)).collect();
        let generics = if parameters.is_empty() {
            TokenStream::new()
        } else {
            quote!(<#(#parameters),*>)
        };
        let simple = self.metadata.element().name().simple_name();
        let injector = ident(&format!("{simple}_GeneratedInjector"));
        let inject_method = ident(&format!("inject_{}", pascal_to_snake_case(simple)));

        let (fix_field, fix_init, fix_assignment, context_guard) = if self.use_get_context_fix {
            (
                quote!(disable_get_context_fix: ::std::cell::Cell<bool>,),
                quote!(disable_get_context_fix: ::std::cell::Cell::new(false),),
                quote! {
                    self.disable_get_context_fix
                        .set(::dirk_android::FragmentGetContextFix::is_fragment_get_context_fix_disabled(context.as_ref()));
                },
                // Only ever true once the component context is set.
                quote!(!self.disable_get_context_fix.get()),
            )
        } else {
            (
                TokenStream::new(),
                TokenStream::new(),
                TokenStream::new(),
                quote!(self.component_context.borrow().is_none()),
            )
        };

        let view_model_factory = (!self.metadata.overrides_android_entry_point_class()).then(view_model_factory_method);

        event!(
            Level::DEBUG,
            entry_point = %self.metadata.element().name(),
            generated = %generated,
            get_context_fix = self.use_get_context_fix,
            "fragment wrapper generated"
        );

        let tokens = quote! {
            pub trait #injector {
                fn #inject_method(&self, fragment: &dyn ::dirk_android::Fragment);
            }

            #[allow(non_camel_case_types)]
            pub struct #name #generics {
                base: #base,
                component_context: ::std::cell::RefCell<::core::option::Option<::dirk_android::ContextWrapper>>,
                #fix_field
                component_manager: ::std::cell::OnceCell<::dirk_android::FragmentComponentManager>,
                injected: ::std::cell::Cell<bool>,
            }

            impl #generics #name #generics {
                pub fn new(base: #base) -> Self {
                    Self {
                        base,
                        component_context: ::std::cell::RefCell::new(::core::option::Option::None),
                        #fix_init
                        component_manager: ::std::cell::OnceCell::new(),
                        injected: ::std::cell::Cell::new(false),
                    }
                }

                fn initialize_component_context(&self) {
                    if self.component_context.borrow().is_some() {
                        return;
                    }
                    // The layout inflater of this context comes from the base context, not from
                    // the base fragment's inflater.
                    let context = self.base.context();
                    let wrapper = ::dirk_android::FragmentComponentManager::create_context_wrapper(context.as_ref(), self);
                    *self.component_context.borrow_mut() = ::core::option::Option::Some(wrapper);
                    #fix_assignment
                }

                fn component_manager(&self) -> &::dirk_android::FragmentComponentManager {
                    self.component_manager.get_or_init(::dirk_android::FragmentComponentManager::new)
                }

                fn inject(&self) {
                    if !self.injected.replace(true) {
                        self.component_manager()
                            .generated_component::<dyn #injector>()
                            .#inject_method(self);
                    }
                }
            }

            impl #generics ::dirk_android::Fragment for #name #generics
            where
                #base: ::dirk_android::Fragment,
            {
                fn on_attach(&self, context: &::dirk_android::Context) {
                    self.base.on_attach(context);
                    self.initialize_component_context();
                    self.inject();
                }

                fn on_attach_activity(&self, activity: &::dirk_android::Activity) {
                    self.base.on_attach_activity(activity);
                    assert!(
                        self.component_context
                            .borrow()
                            .as_ref()
                            .is_none_or(|context| ::dirk_android::FragmentComponentManager::find_activity(context) == ::core::option::Option::Some(activity)),
                        "on_attach called multiple times with different contexts; dirk fragments should not be retained"
                    );
                    self.initialize_component_context();
                    self.inject();
                }

                fn context(&self) -> ::core::option::Option<::dirk_android::Context> {
                    if self.base.context().is_none() && #context_guard {
                        return ::core::option::Option::None;
                    }
                    self.initialize_component_context();
                    self.component_context
                        .borrow()
                        .as_ref()
                        .map(::dirk_android::ContextWrapper::as_context)
                }

                fn on_get_layout_inflater(
                    &self,
                    saved_instance_state: ::core::option::Option<&::dirk_android::Bundle>,
                ) -> ::dirk_android::LayoutInflater {
                    let inflater = self.base.on_get_layout_inflater(saved_instance_state);
                    ::dirk_android::LayoutInflater::from(
                        ::dirk_android::FragmentComponentManager::create_inflater_context_wrapper(inflater, self),
                    )
                }

                #view_model_factory
            }
        };

        GeneratedSource {
            name: generated.clone(),
            tokens,
        }
    }
}

#[cfg_attr(test, mutants::skip)]
fn view_model_factory_method() -> TokenStream {
    quote! {
        fn default_view_model_provider_factory(&self) -> ::dirk_android::ViewModelProviderFactory {
            ::dirk_android::DefaultViewModelFactories::fragment_factory(self, self.base.default_view_model_provider_factory())
        }
    }
}
