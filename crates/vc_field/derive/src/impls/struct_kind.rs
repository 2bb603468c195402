use proc_macro2::{Literal, TokenStream};
use quote::quote;

use crate::derive_data::ReflectStruct;
use crate::path;

/// Implement reflection for a struct with named fields.
pub(crate) fn impl_struct(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();

    let reflect_impl = super::impl_trait_reflect(meta, "Struct");
    let from_slot_impl = super::impl_from_slot(meta);
    let struct_impl = impl_struct_ops(info);

    quote! {
        #reflect_impl

        #struct_impl

        #from_slot_impl
    }
}

/// Generate the accessor table, `impl Struct for T`.
fn impl_struct_ops(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let vc_field_ = meta.vc_field_path();
    let reflect_ = path::reflect_(vc_field_);
    let struct_ = path::struct_(vc_field_);
    let macro_exports_ = path::macro_exports_(vc_field_);

    let mut names = Vec::new();
    let mut idents = Vec::new();
    let mut indices = Vec::new();
    for field in info.active_fields() {
        let Some(index) = field.reflection_index else {
            continue;
        };
        names.push(field.member_name());
        idents.push(field.ident());
        indices.push(Literal::usize_unsuffixed(index));
    }

    let type_path = meta.type_path();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics(&[]);

    quote! {
        impl #impl_generics #struct_ for #type_path #ty_generics #where_clause {
            fn index_of(&self, name: &str) -> #macro_exports_::Option<usize> {
                match name {
                    #( #names => #macro_exports_::Option::Some(#indices), )*
                    _ => #macro_exports_::Option::None,
                }
            }

            fn field_at(&self, index: usize) -> #macro_exports_::Option<&dyn #reflect_> {
                match index {
                    #( #indices => #macro_exports_::Option::Some(#reflect_::as_reflect(&self.#idents)), )*
                    _ => #macro_exports_::Option::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> #macro_exports_::Option<&mut dyn #reflect_> {
                match index {
                    #( #indices => #macro_exports_::Option::Some(#reflect_::as_reflect_mut(&mut self.#idents)), )*
                    _ => #macro_exports_::Option::None,
                }
            }
        }
    }
}
