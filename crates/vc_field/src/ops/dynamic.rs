use alloc::rc::Rc;
use core::any::{Any, TypeId};
use core::cell::{BorrowError, Ref, RefCell};
use core::fmt;
use core::ops::Deref;
use core::ptr::NonNull;

use crate::Reflect;
use crate::ops::{Shared, SharedCell};
use crate::reflection::impl_reflect_cast_fn;

// -----------------------------------------------------------------------------
// Dyn

/// A dynamic wrapper: a value of an unknown concrete type, seen through the
/// capability set `I`.
///
/// The wrapper holds either an owned value or a shared reference. Reading a
/// member through a `Dyn` unwraps it to the held value; only the
/// [`Shared`](Dyn::Shared) case keeps the slot addressable.
///
/// `I` is usually a trait object whose trait has [`Reflect`] as supertrait.
///
/// ```
/// use vc_field::{Dyn, Reflect, shared};
/// use std::rc::Rc;
///
/// trait Named: Reflect {
///     fn name(&self) -> String;
/// }
///
/// impl Named for String {
///     fn name(&self) -> String {
///         self.clone()
///     }
/// }
///
/// let by_value: Dyn<dyn Named> = Dyn::Value(Rc::new(String::from("a")));
/// let by_ref: Dyn<dyn Named> = Dyn::Shared(shared(String::from("b")));
///
/// assert_eq!(by_value.borrow().name(), "a");
/// assert_eq!(by_ref.borrow().name(), "b");
/// assert!(by_ref.is_shared());
/// ```
pub enum Dyn<I: ?Sized> {
    /// An owned value. Not addressable through the wrapper.
    Value(Rc<I>),
    /// A shared reference to the held value.
    Shared(Shared<I>),
}

impl<I: ?Sized> Clone for Dyn<I> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(Rc::clone(value)),
            Self::Shared(cell) => Self::Shared(Rc::clone(cell)),
        }
    }
}

impl<I: ?Sized> Dyn<I> {
    /// Returns `true` if the wrapper holds a shared reference.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.as_shared().is_some()
    }

    /// Returns the shared reference, if the wrapper holds one.
    #[inline]
    pub fn as_shared(&self) -> Option<&Shared<I>> {
        match self {
            Self::Value(_) => None,
            Self::Shared(cell) => Some(cell),
        }
    }

    /// Borrows the held value.
    ///
    /// # Panics
    ///
    /// Panics if the held reference is currently mutably borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow(&self) -> DynRef<'_, I> {
        match self {
            Self::Value(value) => DynRef::Value(value),
            Self::Shared(cell) => DynRef::Shared(cell.borrow()),
        }
    }

    /// Borrows the held value, failing if the held reference is currently
    /// mutably borrowed.
    #[inline]
    pub fn try_borrow(&self) -> Result<DynRef<'_, I>, BorrowError> {
        match self {
            Self::Value(value) => Ok(DynRef::Value(value)),
            Self::Shared(cell) => RefCell::try_borrow(cell).map(DynRef::Shared),
        }
    }

    /// Returns `true` if both wrappers hold the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => Rc::ptr_eq(a, b),
            (Self::Shared(a), Self::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<I: ?Sized + Reflect> Dyn<I> {
    /// Retypes the held reference as a [`Shared<U>`] to the same cell.
    ///
    /// Returns `Ok(None)` if the wrapper holds an owned value, or if the held
    /// value is not a `U`.
    pub fn downcast_shared<U: Reflect>(&self) -> Result<Option<Shared<U>>, BorrowError> {
        held_shared::<U>(self)
    }
}

impl<I: ?Sized> fmt::Debug for Dyn<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "Dyn::Value({:p})", Rc::as_ptr(value)),
            Self::Shared(cell) => write!(f, "Dyn::Shared({:p})", Rc::as_ptr(cell)),
        }
    }
}

// -----------------------------------------------------------------------------
// DynRef

/// A borrow of the value held by a [`Dyn`].
pub enum DynRef<'a, I: ?Sized> {
    Value(&'a I),
    Shared(Ref<'a, I>),
}

impl<I: ?Sized> Deref for DynRef<'_, I> {
    type Target = I;

    #[inline]
    fn deref(&self) -> &I {
        match self {
            Self::Value(value) => value,
            Self::Shared(guard) => guard,
        }
    }
}

// -----------------------------------------------------------------------------
// DynamicRef

/// What a dynamic wrapper holds, as seen by the path walk.
pub enum Held<'a> {
    /// An owned value, reachable only by reference to the wrapper.
    Value(&'a dyn Reflect),
    /// A shared cell, which becomes the new address anchor.
    Shared(Rc<dyn SharedCell>),
}

mod sealed {
    pub trait Sealed {}

    impl<I: ?Sized> Sealed for super::Dyn<I> {}
}

/// The reflected view of a [`Dyn<I>`] member.
///
/// This trait is sealed: [`Dyn<I>`] is its only implementor.
pub trait DynamicRef: Reflect + sealed::Sealed {
    /// Returns what the wrapper holds.
    fn held(&self) -> Held<'_>;

    /// Returns a new strong reference to the held cell as a thin pointer, if
    /// the wrapper holds a reference to a value whose concrete type is
    /// `pointee`, as reported by [`Any::type_id`].
    ///
    /// A returned pointer owns one strong count of an `Rc<RefCell<P>>`, where
    /// `P` is the type identified by `pointee`.
    #[doc(hidden)]
    fn clone_shared_raw(&self, pointee: TypeId) -> Result<Option<NonNull<()>>, BorrowError>;
}

impl<I: ?Sized + Reflect> DynamicRef for Dyn<I> {
    fn held(&self) -> Held<'_> {
        match self {
            Self::Value(value) => Held::Value((**value).as_reflect()),
            Self::Shared(cell) => Held::Shared(Rc::new(Rc::clone(cell))),
        }
    }

    fn clone_shared_raw(&self, pointee: TypeId) -> Result<Option<NonNull<()>>, BorrowError> {
        let Some(cell) = self.as_shared() else {
            return Ok(None);
        };
        // `Any::type_id` cannot be overridden, unlike `Reflect::ty_id`.
        if Any::type_id(&*RefCell::try_borrow(cell)?) != pointee {
            return Ok(None);
        }
        let raw = Rc::into_raw(Rc::clone(cell));
        Ok(NonNull::new(raw.cast_mut().cast::<()>()))
    }
}

/// Retypes the reference held by `dynamic` as a [`Shared<U>`].
pub(crate) fn held_shared<U: Reflect>(
    dynamic: &dyn DynamicRef,
) -> Result<Option<Shared<U>>, BorrowError> {
    let Some(raw) = dynamic.clone_shared_raw(TypeId::of::<U>())? else {
        return Ok(None);
    };
    #[expect(unsafe_code, reason = "pointee type is already checked")]
    // SAFETY: `DynamicRef` is sealed to `Dyn<I>`, whose `clone_shared_raw`
    // only yields a pointer when `Any::type_id` of the held value is `U`'s,
    // so it came from `Rc::<RefCell<U>>::into_raw` and owns one count.
    let cell = unsafe { Rc::from_raw(raw.as_ptr().cast_const().cast::<RefCell<U>>()) };
    Ok(Some(cell))
}

impl<I: ?Sized + Reflect> Reflect for Dyn<I> {
    impl_reflect_cast_fn!(Dynamic);

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Ok(value) => {
                let kind = if self.is_shared() { "Shared" } else { "Value" };
                write!(f, "Dyn::{kind}({:?})", (*value).as_reflect())
            }
            Err(_) => write!(f, "Dyn::Shared(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::any::TypeId;

    use crate::Reflect;
    use crate::ops::{Dyn, DynamicRef, Held, ReflectKind, Repr, shared};
    use crate::reflection::impl_reflect_cast_fn;

    trait Named: Reflect {
        fn name(&self) -> String;
    }

    impl Named for String {
        fn name(&self) -> String {
            self.clone()
        }
    }

    /// Reports the `TypeId` of `String` while being a `u64`.
    struct Mislabeled(u64);

    impl Reflect for Mislabeled {
        impl_reflect_cast_fn!(Opaque);

        fn ty_id(&self) -> TypeId {
            TypeId::of::<String>()
        }
    }

    impl Named for Mislabeled {
        fn name(&self) -> String {
            format!("{}", self.0)
        }
    }

    #[test]
    fn dyn_reports_dynamic_repr() {
        let value: Dyn<dyn Named> = Dyn::Value(Rc::new(String::from("a")));
        assert_eq!(value.reflect_kind(), ReflectKind::Dynamic);
        assert_eq!(value.reflect_repr(), Repr::Dynamic);
    }

    #[test]
    fn held_exposes_value_or_cell() {
        let by_value: Dyn<dyn Named> = Dyn::Value(Rc::new(String::from("a")));
        let Held::Value(held) = by_value.held() else {
            panic!("expected an owned value");
        };
        assert_eq!(held.downcast_ref::<String>().unwrap(), "a");

        let cell = shared(String::from("b"));
        let by_ref: Dyn<dyn Named> = Dyn::Shared(cell.clone());
        let Held::Shared(anchor) = by_ref.held() else {
            panic!("expected a shared cell");
        };
        assert_eq!(anchor.as_ptr(), Rc::as_ptr(&cell).cast::<()>());
    }

    #[test]
    fn downcast_shared_keeps_identity() {
        let cell = shared(String::from("b"));
        let by_ref: Dyn<dyn Named> = Dyn::Shared(cell.clone());

        let typed = by_ref.downcast_shared::<String>().unwrap().unwrap();
        assert!(Rc::ptr_eq(&typed, &cell));

        typed.borrow_mut().push('!');
        assert_eq!(by_ref.borrow().name(), "b!");

        assert!(by_ref.downcast_shared::<u32>().unwrap().is_none());

        let by_value: Dyn<dyn Named> = Dyn::Value(Rc::new(String::new()));
        assert!(by_value.downcast_shared::<String>().unwrap().is_none());
    }

    #[test]
    fn downcast_shared_ignores_reported_type_id() {
        let by_ref: Dyn<dyn Named> = Dyn::Shared(shared(Mislabeled(7)));
        assert!(!by_ref.borrow().as_reflect().is::<String>());

        assert!(by_ref.downcast_shared::<String>().unwrap().is_none());
        let typed = by_ref.downcast_shared::<Mislabeled>().unwrap().unwrap();
        assert_eq!(typed.borrow().name(), "7");
    }

    #[test]
    fn ptr_eq_compares_allocations() {
        let cell = shared(String::from("c"));
        let a: Dyn<dyn Named> = Dyn::Shared(cell.clone());
        let b = a.clone();
        let c: Dyn<dyn Named> = Dyn::Shared(shared(String::from("c")));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
