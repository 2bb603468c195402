use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use crate::Reflect;
use crate::access::{AccessError, Address, Slot};
use crate::ops::Repr;

// -----------------------------------------------------------------------------
// WriteHandle

/// A resolved, reusable write target.
///
/// Created by [`prepare_write`](crate::prepare_write). The handle captures the
/// slot's address and static type once; every assignment writes straight into
/// the original storage, so all aliases of the slot observe it immediately.
///
/// # Example
///
/// ```
/// use vc_field::{derive::Reflect, get_field, prepare_write, shared};
///
/// #[derive(Reflect)]
/// struct Counter {
///     hits: u32,
/// }
///
/// let root = shared(Counter { hits: 3 });
/// let hits = prepare_write(&root, &["hits"]);
///
/// hits.apply(10_u32);
/// assert_eq!(get_field::<u32>(&root, &["hits"]), 10);
///
/// hits.reset();
/// assert_eq!(root.borrow().hits, 0);
/// ```
#[derive(Clone)]
pub struct WriteHandle {
    address: Address,
    type_id: TypeId,
    type_name: &'static str,
    repr: Repr,
}

impl WriteHandle {
    /// Binds a handle to an addressable slot.
    pub(crate) fn new(slot: Slot<'_>) -> Result<Self, AccessError> {
        let repr = slot.repr();
        let (value, address) = slot.into_parts();
        let Some(address) = address else {
            return Err(AccessError::Unaddressable {
                type_name: value.reflect_type_name(),
            });
        };
        Ok(Self {
            address,
            type_id: value.ty_id(),
            type_name: value.reflect_type_name(),
            repr,
        })
    }

    /// Returns the address of the slot.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the static type name of the slot.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the declared representation of the slot.
    #[inline]
    pub fn repr(&self) -> Repr {
        self.repr
    }

    /// Assigns `value` to the slot, or resets the slot to its type's default
    /// when `value` is `None`.
    ///
    /// The value must be exactly the slot's static type. All checks run
    /// before the slot is touched, so a failed call leaves it unchanged.
    pub fn try_assign(&self, value: Option<Box<dyn Reflect>>) -> Result<(), AccessError> {
        if let Some(value) = &value
            && value.ty_id() != self.type_id
        {
            let err = AccessError::TypeMismatch {
                requested: self.type_name,
                actual: value.reflect_type_name(),
            };
            log::warn!("rejected write to {:?}: {err}", self.address);
            return Err(err);
        }

        let mut slot = self.address.try_borrow_mut()?;
        let value = match value {
            Some(value) => value,
            None => slot.reflect_default().ok_or_else(|| {
                log::warn!("rejected reset of `{}`: no default value", self.type_name);
                AccessError::NoDefault {
                    type_name: self.type_name,
                }
            })?,
        };

        slot.set(value).map_err(|value| AccessError::TypeMismatch {
            requested: self.type_name,
            actual: value.reflect_type_name(),
        })?;

        log::debug!("assigned `{}` at {:?}", self.type_name, self.address);
        Ok(())
    }

    /// Assigns `value` to the slot.
    ///
    /// See [`try_assign`](Self::try_assign) for the failure cases.
    #[inline]
    pub fn try_apply<V: Reflect>(&self, value: V) -> Result<(), AccessError> {
        self.try_assign(Some(Box::new(value)))
    }

    /// Resets the slot to its type's default value.
    ///
    /// Shared references and dynamic wrappers have no default and return
    /// [`AccessError::NoDefault`].
    #[inline]
    pub fn try_reset(&self) -> Result<(), AccessError> {
        self.try_assign(None)
    }

    /// Assigns `value` to the slot, or resets it when `value` is `None`.
    ///
    /// # Panics
    ///
    /// Panics with the [`AccessError`] text on failure.
    #[track_caller]
    pub fn assign(&self, value: Option<Box<dyn Reflect>>) {
        if let Err(err) = self.try_assign(value) {
            panic!("{err}");
        }
    }

    /// Assigns `value` to the slot.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not the slot's type, or if the slot is borrowed.
    #[track_caller]
    pub fn apply<V: Reflect>(&self, value: V) {
        if let Err(err) = self.try_apply(value) {
            panic!("{err}");
        }
    }

    /// Resets the slot to its type's default value.
    ///
    /// # Panics
    ///
    /// Panics if the slot's type has no default, or if the slot is borrowed.
    #[track_caller]
    pub fn reset(&self) {
        if let Err(err) = self.try_reset() {
            panic!("{err}");
        }
    }
}

impl fmt::Debug for WriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteHandle")
            .field("type", &self.type_name)
            .field("repr", &self.repr)
            .field("address", &self.address)
            .finish()
    }
}
