//! See following macros:
//!
//! - [`Reflect`](derive_reflect)
//! - [`impl_reflect_opaque`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Field Access Derivation
///
/// `#[derive(Reflect)]` on a struct with named fields implements:
///
/// - `Reflect`, with kind `Struct`.
/// - `Struct`: the accessor table mapping member names to fields, in
///   declaration order.
/// - `FromSlot`, only with the `clone` flag.
///
/// Field visibility does not matter: the generated impls live next to the
/// type, so private members are reachable by name.
///
/// Every non-ignored field type must implement `Reflect`.
///
/// ## Available Traits
///
/// The macro cannot detect whether a type implements standard traits, so
/// declare them with flags:
///
/// ```rust, ignore
/// #[derive(Reflect, Clone, Default, Debug)]
/// #[reflect(clone, default, debug)]
/// struct Foo { /* ... */ }
/// ```
///
/// - `clone`: Standard `Clone`. The type can be read as a concrete copy.
/// - `default`: Standard `Default`. A slot of this type can be reset.
/// - `debug`: Standard `Debug`. Used by `reflect_debug`.
///
/// These attributes can only be applied at the type level.
///
/// ## ignore
///
/// `#[reflect(ignore)]` hides a field from the accessor table, as if it
/// did not exist. Indices of the remaining fields stay dense. The field type
/// does not need to implement `Reflect`.
///
/// ```rust, ignore
/// #[derive(Reflect)]
/// struct Foo {
///     name: String,
///     #[reflect(ignore)]
///     cache: Option<fn()>,
/// }
/// ```
///
/// This attribute can only be used on fields.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    use crate::derive_data::ReflectStruct;

    let ast = parse_macro_input!(input as DeriveInput);

    let info = match ReflectStruct::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let reflect_impls = impls::impl_struct(&info);

    TokenStream::from(quote! {
        const _: () = {
            #reflect_impls
        };
    })
}

/// Implements reflection for `Opaque` types.
///
/// Opaque types are leaves of the path walk: they have no members.
/// Because of the orphan rule, this is typically used inside `vc_field`.
///
/// Syntax: `path<generics> (..flags..)`.
///
/// ## Example
///
/// ```rust, ignore
/// impl_reflect_opaque!(u64 (clone, default, debug));
/// impl_reflect_opaque!(::alloc::string::String (clone, default, debug));
/// impl_reflect_opaque!(::alloc::vec::Vec<T: Clone> (clone, default));
/// ```
///
/// Opaque values can only be read as copies, so `clone` is required.
///
/// See available flags in [`derive Reflect`](derive_reflect).
#[proc_macro]
pub fn impl_reflect_opaque(input: TokenStream) -> TokenStream {
    use crate::derive_data::{ReflectMeta, ReflectOpaqueParser};

    let ReflectOpaqueParser {
        attrs,
        type_path,
        generics,
    } = parse_macro_input!(input with ReflectOpaqueParser::parse);

    let meta = ReflectMeta::new(attrs, quote!(#type_path), &generics);

    let reflect_impls = impls::impl_opaque(&meta);

    quote! {
        const _: () = {
            #reflect_impls
        };
    }
    .into()
}
