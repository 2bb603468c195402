use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// An error returned from a failed field read or write.
///
/// Every variant describes misuse at the call site: a path or a type that
/// cannot match the live object shape. The panicking entry points
/// ([`get_field`], [`prepare_write`], [`WriteHandle::apply`]) abort with the
/// `Display` text of this error.
///
/// [`get_field`]: crate::get_field
/// [`prepare_write`]: crate::prepare_write
/// [`WriteHandle::apply`]: crate::WriteHandle::apply
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("Field path is empty")]
    EmptyPath,

    #[error("Missing field `{field}` on `{container}` at path depth {depth}")]
    MissingField {
        container: &'static str,
        field: String,
        depth: usize,
    },

    #[error("Type mismatch: requested `{requested}`, found `{actual}`")]
    TypeMismatch {
        requested: &'static str,
        actual: &'static str,
    },

    #[error("Slot of type `{type_name}` has no address: it is not reached through a shared reference")]
    Unaddressable { type_name: &'static str },

    #[error("Type `{type_name}` has no default value to reset to")]
    NoDefault { type_name: &'static str },

    #[error("Value of type `{type_name}` is already mutably borrowed")]
    BorrowConflict { type_name: &'static str },

    #[error("Weak reference `{type_name}` no longer points to a live value")]
    Dangling { type_name: &'static str },
}

impl AccessError {
    #[cold]
    pub(crate) fn dangling(reference: &dyn crate::Reflect) -> Self {
        Self::Dangling {
            type_name: reference.reflect_type_name(),
        }
    }

    #[inline]
    pub(crate) fn type_mismatch<T: ?Sized>(actual: &'static str) -> Self {
        Self::TypeMismatch {
            requested: core::any::type_name::<T>(),
            actual,
        }
    }
}
