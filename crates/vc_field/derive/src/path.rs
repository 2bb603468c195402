//! This independent module is used to provide the required path.
//! So as to minimize changes when the `vc_field` structure is modified.
//!
//! The only special feature is the path of vc_field itself,
//! See [`vc_field`] function doc.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `vc_field` crate.
///
/// Not all crates can access the field crate itself through `vc_field`,
/// we have to scan the builder's `Cargo.toml`.
///
/// 1. For crates that depend on `vc_field`, `::vc_field` is returned here.
/// 2. For crates that depend on `vc_probe`, `::vc_probe::field` is returned here.
/// 3. For other situations, `::vc_field` is returned here, but this may be incorrect.
///
/// The cost of this function is relatively high (accessing files, obtaining
/// read-write lock permissions, querying content...), so the crate path is
/// obtained once per invocation and passed around.
pub(crate) fn vc_field() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_field"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn macro_exports_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::__macro_exports
    }
}

#[inline(always)]
pub(crate) fn reflect_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::Reflect
    }
}

#[inline(always)]
pub(crate) fn from_slot_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::access::FromSlot
    }
}

#[inline(always)]
pub(crate) fn struct_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::ops::Struct
    }
}

#[inline(always)]
pub(crate) fn repr_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::ops::Repr
    }
}

#[inline(always)]
pub(crate) fn reflect_kind_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::ops::ReflectKind
    }
}

#[inline(always)]
pub(crate) fn reflect_ref_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::ops::ReflectRef
    }
}

#[inline(always)]
pub(crate) fn reflect_mut_(vc_field_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_field_path::ops::ReflectMut
    }
}
