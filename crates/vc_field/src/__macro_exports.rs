//! Items referenced by code generated from `vc_field_derive`.
//!
//! Generated code cannot assume the invoking crate declares `extern crate alloc`.

pub use alloc::boxed::Box;
pub use core::option::Option;
pub use core::result::Result;
