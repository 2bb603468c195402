use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::type_name;
use core::cell::{Ref, RefMut};
use core::fmt;
use core::marker::PhantomData;

use crate::Reflect;
use crate::access::AccessError;
use crate::ops::{ReflectMut, ReflectRef, SharedCell};

// -----------------------------------------------------------------------------
// Address

/// The address of a slot: the nearest enclosing shared cell, plus the chain
/// of struct member indices that leads from the cell's value to the slot.
///
/// An address keeps its anchor cell alive, and every step below the anchor
/// crosses a struct embedded by value, so an address cannot dangle.
///
/// Two addresses are equal if they share the same cell allocation and the
/// same index chain, i.e. if they denote the same storage.
#[derive(Clone)]
pub struct Address {
    anchor: Rc<dyn SharedCell>,
    steps: Vec<usize>,
}

impl Address {
    /// Creates the address of the value held by `anchor`.
    #[inline]
    pub(crate) fn new(anchor: Rc<dyn SharedCell>) -> Self {
        Self {
            anchor,
            steps: Vec::new(),
        }
    }

    /// Returns the address of the member at `index` below this one.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(index);
        Self {
            anchor: Rc::clone(&self.anchor),
            steps,
        }
    }

    /// Returns the anchor cell.
    #[inline]
    pub fn anchor(&self) -> &Rc<dyn SharedCell> {
        &self.anchor
    }

    /// Returns the member indices from the anchor's value to the slot.
    #[inline]
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Immutably borrows the slot.
    ///
    /// The anchor cell stays borrowed until the guard is dropped.
    pub fn try_borrow(&self) -> Result<Ref<'_, dyn Reflect>, AccessError> {
        let root = self.anchor.try_borrow().map_err(|_| self.conflict())?;
        // Steps only cross structs embedded by value, whose shape is static.
        Ref::filter_map(root, |root| descend(root, &self.steps))
            .map_err(|root| Self::lost(&*root))
    }

    /// Mutably borrows the slot.
    ///
    /// The anchor cell stays mutably borrowed until the guard is dropped.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Reflect>, AccessError> {
        let root = self.anchor.try_borrow_mut().map_err(|_| self.conflict())?;
        RefMut::filter_map(root, |root| descend_mut(root, &self.steps))
            .map_err(|root| Self::lost(&*root))
    }

    #[cold]
    fn lost(root: &dyn Reflect) -> AccessError {
        AccessError::Unaddressable {
            type_name: root.reflect_type_name(),
        }
    }

    #[inline]
    fn conflict(&self) -> AccessError {
        AccessError::BorrowConflict {
            type_name: self.anchor.pointee_type_name(),
        }
    }
}

impl PartialEq for Address {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.anchor.as_ptr(), other.anchor.as_ptr()) && self.steps == other.steps
    }
}

impl Eq for Address {}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("anchor", &self.anchor.as_ptr())
            .field("steps", &self.steps)
            .finish()
    }
}

fn descend<'r>(mut value: &'r dyn Reflect, steps: &[usize]) -> Option<&'r dyn Reflect> {
    for &index in steps {
        let ReflectRef::Struct(container) = value.reflect_ref() else {
            return None;
        };
        value = container.field_at(index)?;
    }
    Some(value)
}

#[inline]
fn step_mut(base: &mut dyn Reflect, index: usize) -> Option<&mut dyn Reflect> {
    match base.reflect_mut() {
        ReflectMut::Struct(container) => container.field_at_mut(index),
        _ => None,
    }
}

fn descend_mut<'r>(mut value: &'r mut dyn Reflect, steps: &[usize]) -> Option<&'r mut dyn Reflect> {
    for &index in steps {
        value = step_mut(value, index)?;
    }
    Some(value)
}

// -----------------------------------------------------------------------------
// Place

/// A typed reference to any addressable slot, including a member embedded by
/// value in a struct.
///
/// Reading a `Place<U>` aliases the original storage: writes through the
/// place are observed by every later read of the same path.
///
/// # Example
///
/// ```
/// use vc_field::{Place, derive::Reflect, get_field, shared};
///
/// #[derive(Reflect)]
/// struct Player {
///     name: String,
/// }
///
/// let root = shared(Player { name: "a".into() });
///
/// let name: Place<String> = get_field(&root, &["name"]);
/// name.borrow_mut().push('b');
///
/// assert_eq!(root.borrow().name, "ab");
/// ```
pub struct Place<U> {
    address: Address,
    _marker: PhantomData<fn() -> U>,
}

impl<U> Clone for Place<U> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            _marker: PhantomData,
        }
    }
}

impl<U: Reflect> Place<U> {
    /// Creates a place from an address that is known to hold a `U`.
    #[inline]
    pub(crate) fn new_unchecked(address: Address) -> Self {
        Self {
            address,
            _marker: PhantomData,
        }
    }

    /// Returns the address of the slot.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Immutably borrows the slot.
    pub fn try_borrow(&self) -> Result<Ref<'_, U>, AccessError> {
        let slot = self.address.try_borrow()?;
        Ref::filter_map(slot, |slot| slot.downcast_ref::<U>())
            .map_err(|slot| AccessError::type_mismatch::<U>(slot.reflect_type_name()))
    }

    /// Mutably borrows the slot.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, U>, AccessError> {
        let slot = self.address.try_borrow_mut()?;
        RefMut::filter_map(slot, |slot| slot.downcast_mut::<U>())
            .map_err(|slot| AccessError::type_mismatch::<U>(slot.reflect_type_name()))
    }

    /// Immutably borrows the slot.
    ///
    /// # Panics
    ///
    /// Panics if the enclosing cell is currently mutably borrowed.
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, U> {
        match self.try_borrow() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Mutably borrows the slot.
    ///
    /// # Panics
    ///
    /// Panics if the enclosing cell is currently borrowed.
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, U> {
        match self.try_borrow_mut() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns `true` if both places denote the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<U> fmt::Debug for Place<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Place")
            .field("type", &type_name::<U>())
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;

    use crate::access::{AccessError, Address, Place};
    use crate::derive::Reflect;
    use crate::ops::{SharedCell, shared};

    #[derive(Reflect)]
    struct Inner {
        text: String,
    }

    #[derive(Reflect)]
    struct Outer {
        count: u32,
        inner: Inner,
    }

    fn sample() -> crate::Shared<Outer> {
        shared(Outer {
            count: 1,
            inner: Inner {
                text: String::from("x"),
            },
        })
    }

    #[test]
    fn equal_addresses_share_anchor_and_steps() {
        let root = sample();
        let a = Address::new(Rc::new(Rc::clone(&root))).child(1).child(0);
        let b = Address::new(Rc::new(Rc::clone(&root))).child(1).child(0);
        let c = Address::new(Rc::new(Rc::clone(&root))).child(0);
        let other = Address::new(Rc::new(sample())).child(1).child(0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, other);
        assert_eq!(a.steps(), &[1, 0]);
    }

    #[test]
    fn place_reads_and_writes_nested_storage() {
        let root = sample();
        let anchor: Rc<dyn SharedCell> = Rc::new(Rc::clone(&root));
        let text: Place<String> = Place::new_unchecked(Address::new(anchor).child(1).child(0));

        assert_eq!(*text.borrow(), "x");
        text.borrow_mut().push('y');
        assert_eq!(root.borrow().inner.text, "xy");
        assert_eq!(root.borrow().count, 1);
    }

    #[test]
    fn place_reports_conflicts() {
        let root = sample();
        let anchor: Rc<dyn SharedCell> = Rc::new(Rc::clone(&root));
        let count: Place<u32> = Place::new_unchecked(Address::new(anchor).child(0));

        let guard = root.borrow();
        assert!(count.try_borrow().is_ok());
        assert!(matches!(
            count.try_borrow_mut(),
            Err(AccessError::BorrowConflict { .. })
        ));
        drop(guard);
        *count.borrow_mut() = 5;
        assert_eq!(root.borrow().count, 5);
    }
}
