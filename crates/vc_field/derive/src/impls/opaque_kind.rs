use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ReflectMeta;

/// Implement reflection for an opaque leaf type.
pub(crate) fn impl_opaque(meta: &ReflectMeta) -> TokenStream {
    let reflect_impl = super::impl_trait_reflect(meta, "Opaque");
    let from_slot_impl = super::impl_from_slot(meta);

    quote! {
        #reflect_impl

        #from_slot_impl
    }
}
