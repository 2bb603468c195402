use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

use crate::derive_data::ReflectMeta;
use crate::path;

/// Generate `impl Reflect for T`.
///
/// `kind` is the variant name shared by `ReflectKind`, `ReflectRef` and `ReflectMut`.
pub(crate) fn impl_trait_reflect(meta: &ReflectMeta, kind: &str) -> TokenStream {
    let vc_field_ = meta.vc_field_path();
    let reflect_ = path::reflect_(vc_field_);
    let macro_exports_ = path::macro_exports_(vc_field_);
    let reflect_kind_ = path::reflect_kind_(vc_field_);
    let reflect_ref_ = path::reflect_ref_(vc_field_);
    let reflect_mut_ = path::reflect_mut_(vc_field_);

    let kind = Ident::new(kind, Span::call_site());
    let type_path = meta.type_path();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics(&[]);

    let default_fn = meta.attrs().default.map(|span| {
        quote::quote_spanned! { span =>
            #[inline]
            fn reflect_default(&self) -> #macro_exports_::Option<#macro_exports_::Box<dyn #reflect_>> {
                #macro_exports_::Option::Some(
                    #macro_exports_::Box::new(<Self as ::core::default::Default>::default())
                )
            }
        }
    });

    let debug_fn = meta.attrs().debug.map(|span| {
        quote::quote_spanned! { span =>
            #[inline]
            fn reflect_debug(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Debug::fmt(self, f)
            }
        }
    });

    quote! {
        impl #impl_generics #reflect_ for #type_path #ty_generics #where_clause {
            #[inline]
            fn as_reflect(&self) -> &dyn #reflect_ {
                self
            }

            #[inline]
            fn as_reflect_mut(&mut self) -> &mut dyn #reflect_ {
                self
            }

            fn set(
                &mut self,
                value: #macro_exports_::Box<dyn #reflect_>,
            ) -> #macro_exports_::Result<(), #macro_exports_::Box<dyn #reflect_>> {
                *self = value.take::<Self>()?;
                #macro_exports_::Result::Ok(())
            }

            #[inline]
            fn reflect_kind(&self) -> #reflect_kind_ {
                #reflect_kind_::#kind
            }

            #[inline]
            fn reflect_ref(&self) -> #reflect_ref_<'_> {
                #reflect_ref_::#kind(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> #reflect_mut_<'_> {
                #reflect_mut_::#kind(self)
            }

            #default_fn

            #debug_fn
        }
    }
}
