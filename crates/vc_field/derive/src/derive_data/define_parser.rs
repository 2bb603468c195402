use syn::parse::ParseStream;
use syn::{Generics, Path, parenthesized, token::Paren};

use super::TypeAttributes;

// -----------------------------------------------------------------------------
// Opaque Parser

/// A struct used to define a simple reflection-opaque types (including primitives).
pub(crate) struct ReflectOpaqueParser {
    pub attrs: TypeAttributes,
    pub type_path: Path,
    pub generics: Generics,
}

impl ReflectOpaqueParser {
    /// Parse the input stream of [`impl_reflect_opaque`](crate::impl_reflect_opaque).
    ///
    /// Format: `path<generics> where .. (..flags..)`
    pub fn parse(input: ParseStream) -> syn::Result<Self> {
        let origin_span = input.span();

        let type_path = Path::parse_mod_style(input)?;

        let mut generics = input.parse::<Generics>()?;
        generics.where_clause = input.parse()?;

        let mut attrs = TypeAttributes::default();
        if input.peek(Paren) {
            let content;
            parenthesized!(content in input);
            attrs.parse_stream(&content)?;
        }

        if attrs.clone.is_none() {
            return Err(syn::Error::new(
                origin_span,
                "opaque types are only readable as copies, the `clone` flag is required",
            ));
        }

        Ok(Self {
            attrs,
            type_path,
            generics,
        })
    }
}
