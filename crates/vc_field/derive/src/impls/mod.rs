//! Code generation for the derived traits.

mod from_slot;
mod opaque_kind;
mod struct_kind;
mod trait_reflect;

pub(crate) use opaque_kind::impl_opaque;
pub(crate) use struct_kind::impl_struct;

use from_slot::impl_from_slot;
use trait_reflect::impl_trait_reflect;
