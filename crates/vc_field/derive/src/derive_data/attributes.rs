//! Provide some tools for parsing `#[reflect(..)]` attributes.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Attribute, Ident, Token};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Type Attributes

/// Type-level flags: whether the specified standard trait is available.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    pub clone: Option<Span>,
    pub default: Option<Span>,
    pub debug: Option<Span>,
}

impl TypeAttributes {
    /// Parse every `#[reflect(..)]` attribute of a type.
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                attr.parse_nested_meta(|meta| this.parse_meta(&meta))?;
            }
        }
        Ok(this)
    }

    /// Parse a comma separated flag list, e.g. the `(clone, debug)` of
    /// [`impl_reflect_opaque`](crate::impl_reflect_opaque).
    pub fn parse_stream(&mut self, input: ParseStream) -> syn::Result<()> {
        let flags = Punctuated::<Ident, Token![,]>::parse_terminated(input)?;
        for flag in &flags {
            self.set_flag(flag)?;
        }
        Ok(())
    }

    fn parse_meta(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        match meta.path.get_ident() {
            Some(flag) => self.set_flag(flag),
            None => Err(meta.error("expected a flag: `clone`, `default` or `debug`")),
        }
    }

    fn set_flag(&mut self, flag: &Ident) -> syn::Result<()> {
        let slot = match flag.to_string().as_str() {
            "clone" => &mut self.clone,
            "default" => &mut self.default,
            "debug" => &mut self.debug,
            "ignore" => {
                return Err(syn::Error::new(
                    flag.span(),
                    "`ignore` can only be applied to fields",
                ));
            }
            _ => {
                return Err(syn::Error::new(
                    flag.span(),
                    "unknown flag, expected `clone`, `default` or `debug`",
                ));
            }
        };

        if slot.is_some() {
            return Err(syn::Error::new(flag.span(), "duplicate flag"));
        }
        *slot = Some(flag.span());
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Field Attributes

/// Field-level attributes.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    /// `#[reflect(ignore)]`: the field is not part of the accessor table.
    pub ignore: Option<Span>,
}

impl FieldAttributes {
    /// Parse every `#[reflect(..)]` attribute of a field.
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if !meta.path.is_ident("ignore") {
                    return Err(meta.error("unknown field attribute, expected `ignore`"));
                }
                if this.ignore.is_some() {
                    return Err(meta.error("duplicate `ignore`"));
                }
                this.ignore = Some(meta.path.require_ident()?.span());
                Ok(())
            })?;
        }
        Ok(this)
    }
}
