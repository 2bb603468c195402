use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use core::fmt;

use crate::Reflect;
use crate::reflection::impl_reflect_cast_fn;

// -----------------------------------------------------------------------------
// Shared

/// A shared, interior-mutable reference: the reference representation of the
/// object graph.
///
/// Copying a `Shared<T>` copies the address only; every copy observes writes
/// made through any other. Cycles are allowed and are how a child refers
/// back to its parent.
///
/// ```
/// use vc_field::{Shared, shared};
/// use std::rc::Rc;
///
/// let a: Shared<u32> = shared(1);
/// let b = Rc::clone(&a);
/// *b.borrow_mut() = 2;
///
/// assert_eq!(*a.borrow(), 2);
/// ```
pub type Shared<T> = Rc<RefCell<T>>;

/// Allocates `value` behind a new [`Shared`] reference.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// A weak shared reference: a [`Shared`] that does not keep its target alive.
///
/// This is how a child refers back to its parent without leaking the cycle.
/// Unlike `Shared<T>` it has a null state, [`Weak::new`], which is also its
/// default value.
///
/// ```
/// use vc_field::ops::WeakShared;
/// use vc_field::shared;
/// use std::rc::Rc;
///
/// let parent = shared(1_u8);
/// let link: WeakShared<u8> = Rc::downgrade(&parent);
///
/// assert_eq!(*link.upgrade().unwrap().borrow(), 1);
/// drop(parent);
/// assert!(link.upgrade().is_none());
/// ```
pub type WeakShared<T> = Weak<RefCell<T>>;

// -----------------------------------------------------------------------------
// SharedCell

/// A type-erased shared cell.
///
/// Slot addresses are anchored at the nearest enclosing cell. The cell may
/// hold a concrete `T` or a capability-set trait object, so the anchor only
/// exposes the value as `dyn Reflect`.
pub trait SharedCell {
    /// Immutably borrows the held value.
    fn try_borrow(&self) -> Result<Ref<'_, dyn Reflect>, BorrowError>;

    /// Mutably borrows the held value.
    fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Reflect>, BorrowMutError>;

    /// Returns the address of the cell allocation, for identity checks.
    fn as_ptr(&self) -> *const ();

    /// Returns the name of the declared pointee type, for diagnostics.
    fn pointee_type_name(&self) -> &'static str;
}

impl<T: ?Sized + Reflect> SharedCell for Rc<RefCell<T>> {
    #[inline]
    fn try_borrow(&self) -> Result<Ref<'_, dyn Reflect>, BorrowError> {
        RefCell::try_borrow(self).map(|value| Ref::map(value, |value| value.as_reflect()))
    }

    #[inline]
    fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Reflect>, BorrowMutError> {
        RefCell::try_borrow_mut(self)
            .map(|value| RefMut::map(value, |value| value.as_reflect_mut()))
    }

    #[inline]
    fn as_ptr(&self) -> *const () {
        Rc::as_ptr(self).cast::<()>()
    }

    #[inline]
    fn pointee_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

impl fmt::Debug for dyn SharedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedCell<{}>({:p})", self.pointee_type_name(), self.as_ptr())
    }
}

// -----------------------------------------------------------------------------
// SharedRef

/// The reflected view of a [`Shared<T>`] or [`WeakShared<T>`] member.
pub trait SharedRef: Reflect {
    /// Returns a type-erased handle to the referenced cell.
    ///
    /// Returns `None` if a weak reference no longer points to a live value.
    fn cell(&self) -> Option<Rc<dyn SharedCell>>;
}

impl<T: Reflect> SharedRef for Shared<T> {
    #[inline]
    fn cell(&self) -> Option<Rc<dyn SharedCell>> {
        Some(Rc::new(Rc::clone(self)))
    }
}

impl<T: Reflect> SharedRef for WeakShared<T> {
    #[inline]
    fn cell(&self) -> Option<Rc<dyn SharedCell>> {
        let cell: Rc<dyn SharedCell> = Rc::new(self.upgrade()?);
        Some(cell)
    }
}

impl<T: Reflect> Reflect for Shared<T> {
    impl_reflect_cast_fn!(Shared);

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shared<{}>({:p})",
            core::any::type_name::<T>(),
            Rc::as_ptr(self)
        )
    }
}

impl<T: Reflect> Reflect for WeakShared<T> {
    impl_reflect_cast_fn!(Shared);

    #[inline]
    fn reflect_default(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Weak::<RefCell<T>>::new()))
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WeakShared<{}>({:p})",
            core::any::type_name::<T>(),
            Weak::as_ptr(self)
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;

    use crate::ops::{ReflectKind, ReflectRef, Repr, Shared, SharedCell, WeakShared, shared};
    use crate::Reflect;

    #[test]
    fn shared_reports_reference_repr() {
        let value: Shared<String> = shared(String::from("a"));
        assert_eq!(value.reflect_kind(), ReflectKind::Shared);
        assert_eq!(value.reflect_repr(), Repr::Reference);
    }

    #[test]
    fn cell_is_the_same_allocation() {
        let value: Shared<u32> = shared(7);
        let ReflectRef::Shared(view) = value.reflect_ref() else {
            panic!("expected a shared reference");
        };
        let cell = view.cell().unwrap();

        assert_eq!(cell.as_ptr(), Rc::as_ptr(&value).cast::<()>());
        assert_eq!(cell.try_borrow().unwrap().downcast_ref::<u32>(), Some(&7));

        *cell.try_borrow_mut().unwrap().downcast_mut::<u32>().unwrap() = 8;
        assert_eq!(*value.borrow(), 8);
    }

    #[test]
    fn cell_reports_borrow_conflicts() {
        let value: Shared<u32> = shared(7);
        let cell: Rc<dyn SharedCell> = Rc::new(Rc::clone(&value));

        let guard = value.borrow_mut();
        assert!(cell.try_borrow().is_err());
        drop(guard);
        assert!(cell.try_borrow().is_ok());
    }

    #[test]
    fn weak_cell_follows_the_target() {
        let value: Shared<u32> = shared(7);
        let link: WeakShared<u32> = Rc::downgrade(&value);
        let ReflectRef::Shared(view) = link.reflect_ref() else {
            panic!("expected a shared reference");
        };

        let cell = view.cell().unwrap();
        assert_eq!(cell.as_ptr(), Rc::as_ptr(&value).cast::<()>());
        drop(cell);

        drop(value);
        assert!(view.cell().is_none());
    }

    #[test]
    fn weak_default_is_null() {
        let value: Shared<u32> = shared(7);
        let mut link: WeakShared<u32> = Rc::downgrade(&value);

        let default = link.reflect_default().unwrap();
        assert!(link.set(default).is_ok());
        assert!(link.upgrade().is_none());
    }
}
