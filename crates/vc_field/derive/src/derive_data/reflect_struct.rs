use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, Ident, Type};

use super::{FieldAttributes, ReflectMeta, TypeAttributes};

// -----------------------------------------------------------------------------
// StructField

/// A field of a derived struct.
pub(crate) struct StructField<'a> {
    pub data: &'a Field,
    pub ident: &'a Ident,
    pub attrs: FieldAttributes,
    /// The position in the accessor table; `None` for ignored fields.
    pub reflection_index: Option<usize>,
}

impl StructField<'_> {
    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    /// The member name as seen by a path, without the `r#` prefix.
    pub fn member_name(&self) -> String {
        use syn::ext::IdentExt;
        self.ident().unraw().to_string()
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.data.ty
    }
}

// -----------------------------------------------------------------------------
// ReflectStruct

/// Everything needed to derive field access for a struct.
pub(crate) struct ReflectStruct<'a> {
    meta: ReflectMeta<'a>,
    fields: Vec<StructField<'a>>,
}

impl<'a> ReflectStruct<'a> {
    pub fn from_input(ast: &'a DeriveInput) -> syn::Result<Self> {
        let fields = match &ast.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => Some(&named.named),
                Fields::Unit => None,
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new(
                        ast.ident.span(),
                        "tuple structs are not supported, members are addressed by name",
                    ));
                }
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "enums are not supported, only structs with named fields",
                ));
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "unions are not supported, only structs with named fields",
                ));
            }
        };

        if let Some(lifetime) = ast.generics.lifetimes().next() {
            return Err(syn::Error::new(
                lifetime.span(),
                "reflected types must be `'static`, lifetime parameters are not supported",
            ));
        }

        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;

        let mut reflection_index = 0_usize;
        let mut struct_fields = Vec::new();
        for data in fields.into_iter().flatten() {
            let Some(ident) = data.ident.as_ref() else {
                return Err(syn::Error::new(data.span(), "expected a named field"));
            };
            let attrs = FieldAttributes::parse_attrs(&data.attrs)?;
            let index = if attrs.ignore.is_some() {
                None
            } else {
                reflection_index += 1;
                Some(reflection_index - 1)
            };
            struct_fields.push(StructField {
                data,
                ident,
                attrs,
                reflection_index: index,
            });
        }

        let ident = &ast.ident;
        let mut meta = ReflectMeta::new(attrs, quote!(#ident), &ast.generics);
        meta.set_active_types(
            struct_fields
                .iter()
                .filter(|field| field.attrs.ignore.is_none())
                .map(|field| field.ty().clone())
                .collect(),
        );

        Ok(Self {
            meta,
            fields: struct_fields,
        })
    }

    #[inline]
    pub fn meta(&self) -> &ReflectMeta<'a> {
        &self.meta
    }

    /// Fields in the accessor table, in declaration order.
    pub fn active_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields
            .iter()
            .filter(|field| field.reflection_index.is_some())
    }
}
