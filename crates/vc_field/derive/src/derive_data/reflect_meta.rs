use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Generics, ImplGenerics, Path, Type, TypeGenerics};

use super::TypeAttributes;

/// Type-level information shared by every generated impl.
pub(crate) struct ReflectMeta<'a> {
    vc_field_path: Path,
    attrs: TypeAttributes,
    /// The ident of a local type, or the full path of a foreign type.
    type_path: TokenStream,
    generics: &'a Generics,
    /// Types of the fields in the accessor table.
    active_types: Vec<Type>,
}

impl core::fmt::Debug for ReflectMeta<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReflectMeta")
            .field("vc_field_path", &self.vc_field_path.to_token_stream())
            .field("type_path", &self.type_path)
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<'a> ReflectMeta<'a> {
    #[inline]
    pub fn new(attrs: TypeAttributes, type_path: TokenStream, generics: &'a Generics) -> Self {
        Self {
            attrs,
            type_path,
            generics,
            vc_field_path: crate::path::vc_field(),
            active_types: Vec::new(),
        }
    }

    /// Used for [`ReflectStruct`](crate::derive_data::ReflectStruct),
    /// set the active field types during initialization.
    #[inline]
    pub(super) fn set_active_types(&mut self, active_types: Vec<Type>) {
        self.active_types = active_types;
    }

    #[inline]
    pub fn vc_field_path(&self) -> &Path {
        &self.vc_field_path
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn type_path(&self) -> &TokenStream {
        &self.type_path
    }

    /// Split generics for an impl block.
    ///
    /// The where clause keeps the user's predicates and adds:
    ///
    /// - `T: Any` for every type parameter, since reflected values are `'static`.
    /// - `FieldTy: Reflect` for every active field of a generic type.
    /// - `extra` predicates, e.g. `Self: Clone`.
    pub fn split_generics(
        &self,
        extra: &[TokenStream],
    ) -> (ImplGenerics<'_>, TypeGenerics<'_>, TokenStream) {
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut predicates: Vec<TokenStream> = where_clause
            .map(|clause| clause.predicates.iter().map(ToTokens::to_token_stream).collect())
            .unwrap_or_default();

        let is_generic = self.generics.type_params().next().is_some();
        if is_generic {
            let reflect_ = crate::path::reflect_(&self.vc_field_path);
            for param in self.generics.type_params() {
                let ident = &param.ident;
                predicates.push(quote!(#ident: ::core::any::Any));
            }
            for ty in &self.active_types {
                predicates.push(quote!(#ty: #reflect_));
            }
        }

        predicates.extend(extra.iter().cloned());

        let where_tokens = if predicates.is_empty() {
            TokenStream::new()
        } else {
            quote!(where #(#predicates,)*)
        };

        (impl_generics, ty_generics, where_tokens)
    }
}
