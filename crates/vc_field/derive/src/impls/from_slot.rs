use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ReflectMeta;
use crate::path;

/// Generate `impl FromSlot for T`, reading a concrete copy.
///
/// Returns an empty stream without the `clone` flag.
pub(crate) fn impl_from_slot(meta: &ReflectMeta) -> TokenStream {
    if meta.attrs().clone.is_none() {
        return TokenStream::new();
    }

    let vc_field_ = meta.vc_field_path();
    let reflect_ = path::reflect_(vc_field_);
    let from_slot_ = path::from_slot_(vc_field_);
    let repr_ = path::repr_(vc_field_);
    let macro_exports_ = path::macro_exports_(vc_field_);

    let type_path = meta.type_path();
    let (impl_generics, ty_generics, where_clause) =
        meta.split_generics(&[quote!(Self: ::core::clone::Clone)]);

    quote! {
        impl #impl_generics #from_slot_ for #type_path #ty_generics #where_clause {
            const REPR: #repr_ = #repr_::Concrete;

            #[inline]
            fn from_value(value: &dyn #reflect_) -> #macro_exports_::Option<Self> {
                value.downcast_ref::<Self>().map(::core::clone::Clone::clone)
            }
        }
    }
}
