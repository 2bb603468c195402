//! Representation-specific views of reflected values.
//!
//! Every [`Reflect`](crate::Reflect) value is one of four kinds:
//!
//! - [`Struct`]: a composite with named members, navigable by the path walk.
//! - [`SharedRef`]: a [`Shared<T>`] or [`WeakShared<T>`] reference; copying it copies the address.
//! - [`DynamicRef`]: a [`Dyn<I>`] wrapper holding a value or a reference behind a capability set.
//! - Opaque: a leaf value with no members.
//!
//! The kind determines the slot's declared [`Repr`].

// -----------------------------------------------------------------------------
// Modules

mod dynamic;
mod kind;
mod shared;
mod struct_ops;

// -----------------------------------------------------------------------------
// Exports

pub use dynamic::{Dyn, DynRef, DynamicRef, Held};
pub(crate) use dynamic::held_shared;
pub use kind::{ReflectKind, ReflectMut, ReflectRef, Repr};
pub use shared::{Shared, SharedCell, SharedRef, WeakShared, shared};
pub use struct_ops::Struct;
