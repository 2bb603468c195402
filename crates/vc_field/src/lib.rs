#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro emits `::vc_field` paths. Inside this crate (tests and
// doc tests) that name must resolve to the crate itself.
extern crate self as vc_field;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod reflection;

pub mod access;
pub mod impls;
pub mod ops;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use access::{AccessError, FromSlot, Place, WriteHandle};
pub use access::{get_field, prepare_write, try_get_field, try_prepare_write};
pub use ops::{Dyn, Shared, shared};
pub use reflection::Reflect;
pub use vc_field_derive as derive;
