//! Path-based field access over reflected object graphs.
//!
//! A path is an ordered list of member names. The walk starts at a root,
//! dereferences intermediate [`Shared`] references and [`Dyn`] wrappers, and
//! ends at the terminal member's [`Slot`]. From there:
//!
//! - [`get_field`] coerces the slot into a caller-chosen target type. Concrete
//!   targets copy; [`Shared<U>`], [`Place<U>`] and [`Dyn<I>`] alias the
//!   original storage.
//! - [`prepare_write`] captures the slot's address in a [`WriteHandle`] that
//!   can assign or reset the slot any number of times.
//!
//! Only slots reached through a shared cell have an address. A plain root can
//! be read, but its embedded members cannot be aliased or written.
//!
//! # Example
//!
//! ```
//! use vc_field::{Place, Shared, derive::Reflect, get_field, prepare_write, shared};
//!
//! #[derive(Reflect, Clone)]
//! #[reflect(clone)]
//! struct Stats {
//!     level: u32,
//! }
//!
//! #[derive(Reflect)]
//! struct Player {
//!     name: String,
//!     stats: Stats,
//!     rival: Option<u64>,
//! }
//!
//! let player: Shared<Player> = shared(Player {
//!     name: "a".into(),
//!     stats: Stats { level: 1 },
//!     rival: None,
//! });
//!
//! // Concrete reads copy.
//! let mut stats: Stats = get_field(&player, &["stats"]);
//! stats.level = 99;
//! assert_eq!(get_field::<u32>(&player, &["stats", "level"]), 1);
//!
//! // Places alias.
//! let level: Place<u32> = get_field(&player, &["stats", "level"]);
//! *level.borrow_mut() = 2;
//! assert_eq!(player.borrow().stats.level, 2);
//!
//! // Writes go straight into the graph.
//! prepare_write(&player, &["rival"]).apply(Some(7_u64));
//! assert_eq!(*level.borrow(), 2);
//! assert_eq!(player.borrow().rival, Some(7));
//! ```
//!
//! [`Shared`]: crate::Shared
//! [`Shared<U>`]: crate::Shared
//! [`Dyn`]: crate::Dyn
//! [`Dyn<I>`]: crate::Dyn

// -----------------------------------------------------------------------------
// Modules

mod address;
mod coerce;
mod error;
mod navigator;
mod write;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Exports

pub use address::{Address, Place};
pub use coerce::FromSlot;
pub use error::AccessError;
pub use navigator::Slot;
pub use write::WriteHandle;

use crate::Reflect;

// -----------------------------------------------------------------------------
// Operations

/// Reads the member at `path` below `root`, coerced into `T`.
///
/// See [`FromSlot`] for the available targets.
///
/// # Errors
///
/// - [`AccessError::EmptyPath`] if `path` is empty.
/// - [`AccessError::MissingField`] if a segment names no member.
/// - [`AccessError::TypeMismatch`] if the slot cannot be coerced into `T`.
/// - [`AccessError::Unaddressable`] if `T` aliases and the slot has no address.
/// - [`AccessError::BorrowConflict`] if a crossed cell is mutably borrowed.
pub fn try_get_field<T: FromSlot>(
    root: &(impl Reflect + ?Sized),
    path: &[&str],
) -> Result<T, AccessError> {
    navigator::navigate(root.as_reflect(), path, coerce::coerce::<T>)
}

/// Reads the member at `path` below `root`, coerced into `T`.
///
/// # Panics
///
/// Panics with the [`AccessError`] text where [`try_get_field`] would fail.
#[track_caller]
pub fn get_field<T: FromSlot>(root: &(impl Reflect + ?Sized), path: &[&str]) -> T {
    match try_get_field(root, path) {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

/// Resolves `path` below `root` into a reusable [`WriteHandle`].
///
/// # Errors
///
/// - [`AccessError::EmptyPath`] if `path` is empty.
/// - [`AccessError::MissingField`] if a segment names no member.
/// - [`AccessError::Unaddressable`] if the slot is not reached through a
///   shared cell.
/// - [`AccessError::BorrowConflict`] if a crossed cell is mutably borrowed.
pub fn try_prepare_write(
    root: &(impl Reflect + ?Sized),
    path: &[&str],
) -> Result<WriteHandle, AccessError> {
    navigator::navigate(root.as_reflect(), path, WriteHandle::new)
}

/// Resolves `path` below `root` into a reusable [`WriteHandle`].
///
/// # Panics
///
/// Panics with the [`AccessError`] text where [`try_prepare_write`] would fail.
#[track_caller]
pub fn prepare_write(root: &(impl Reflect + ?Sized), path: &[&str]) -> WriteHandle {
    match try_prepare_write(root, path) {
        Ok(handle) => handle,
        Err(err) => panic!("{err}"),
    }
}
