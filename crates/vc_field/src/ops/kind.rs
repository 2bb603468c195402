use core::fmt;

use crate::Reflect;
use crate::ops::{DynamicRef, SharedRef, Struct};

// -----------------------------------------------------------------------------
// Repr

/// The declared representation of a slot, or the representation a target
/// type asks for.
///
/// `Reference` and `Dynamic` are *abstract*: reading or writing through them
/// can alias the original storage. `Concrete` always copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repr {
    /// A plain value.
    Concrete,
    /// A shared reference, [`Shared<T>`](crate::Shared) or [`Place<T>`](crate::Place).
    Reference,
    /// A dynamic wrapper, [`Dyn<I>`](crate::Dyn).
    Dynamic,
}

impl Repr {
    /// Returns `true` for `Reference` and `Dynamic`.
    #[inline]
    pub const fn is_abstract(self) -> bool {
        !matches!(self, Self::Concrete)
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Concrete => "concrete",
            Self::Reference => "reference",
            Self::Dynamic => "dynamic",
        })
    }
}

// -----------------------------------------------------------------------------
// ReflectKind

/// A pure enumeration of reflected kinds, without the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectKind {
    Struct,
    Shared,
    Dynamic,
    Opaque,
}

impl ReflectKind {
    /// The slot representation a value of this kind declares.
    #[inline]
    pub const fn repr(self) -> Repr {
        match self {
            Self::Struct | Self::Opaque => Repr::Concrete,
            Self::Shared => Repr::Reference,
            Self::Dynamic => Repr::Dynamic,
        }
    }
}

impl fmt::Display for ReflectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Shared => "shared reference",
            Self::Dynamic => "dynamic wrapper",
            Self::Opaque => "opaque value",
        })
    }
}

// -----------------------------------------------------------------------------
// ReflectRef / ReflectMut

/// An immutable enumeration of reflected kinds.
pub enum ReflectRef<'a> {
    Struct(&'a dyn Struct),
    Shared(&'a dyn SharedRef),
    Dynamic(&'a dyn DynamicRef),
    Opaque(&'a dyn Reflect),
}

/// A mutable enumeration of reflected kinds.
pub enum ReflectMut<'a> {
    Struct(&'a mut dyn Struct),
    Shared(&'a mut dyn SharedRef),
    Dynamic(&'a mut dyn DynamicRef),
    Opaque(&'a mut dyn Reflect),
}
