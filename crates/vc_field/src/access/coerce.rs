use alloc::rc::{Rc, Weak};

use crate::Reflect;
use crate::access::{AccessError, Address, Place, Slot};
use crate::ops::{Dyn, Held, ReflectRef, Repr, Shared, SharedCell, WeakShared};

// -----------------------------------------------------------------------------
// FromSlot

/// A type that a slot can be read into.
///
/// The associated [`REPR`](FromSlot::REPR) tells the coercion engine which
/// representation the caller asks for; the hooks perform the final typed
/// conversion. A hook returns `None` when the slot's underlying type does not
/// fit, which surfaces as [`AccessError::TypeMismatch`].
///
/// | target | `REPR` | hook |
/// |---|---|---|
/// | `T: Reflect + Clone` | `Concrete` | [`from_value`](FromSlot::from_value), an independent copy |
/// | [`Shared<U>`] | `Reference` | [`from_abstract`](FromSlot::from_abstract), the cell itself |
/// | [`WeakShared<U>`] | `Reference` | `from_abstract`, a weak handle to the cell |
/// | [`Place<U>`] | `Reference` | [`from_address`](FromSlot::from_address) or `from_abstract`, the slot's storage |
/// | [`Dyn<I>`] | `Dynamic` | `from_abstract`, the wrapper itself |
///
/// Leaf types implement this trait in this crate. Derived structs implement
/// it with the `#[reflect(clone)]` flag.
///
/// [`WeakShared<U>`]: crate::ops::WeakShared
pub trait FromSlot: Sized {
    /// The representation this target asks for.
    const REPR: Repr;

    /// Copies a concrete value out of `value`.
    #[inline]
    fn from_value(value: &dyn Reflect) -> Option<Self> {
        let _ = value;
        None
    }

    /// Retypes the abstract value of a reference or dynamic slot.
    #[inline]
    fn from_abstract(value: &dyn Reflect) -> Result<Option<Self>, AccessError> {
        let _ = value;
        Ok(None)
    }

    /// Takes the address of a slot holding `value`.
    #[inline]
    fn from_address(address: Address, value: &dyn Reflect) -> Option<Self> {
        let _ = (address, value);
        None
    }
}

// -----------------------------------------------------------------------------
// Coercion

/// Converts a resolved slot into the target `T`.
pub(crate) fn coerce<T: FromSlot>(slot: Slot<'_>) -> Result<T, AccessError> {
    let repr = slot.repr();
    let (value, address) = slot.into_parts();

    match (repr.is_abstract(), T::REPR.is_abstract()) {
        (false, false) => {
            T::from_value(value).ok_or_else(|| AccessError::type_mismatch::<T>(value.reflect_type_name()))
        }
        (false, true) => {
            let Some(address) = address else {
                return Err(AccessError::Unaddressable {
                    type_name: value.reflect_type_name(),
                });
            };
            T::from_address(address, value)
                .ok_or_else(|| AccessError::type_mismatch::<T>(value.reflect_type_name()))
        }
        (true, false) => with_pointee(value, |pointee| {
            T::from_value(pointee)
                .ok_or_else(|| AccessError::type_mismatch::<T>(pointee.reflect_type_name()))
        }),
        (true, true) => {
            if let Some(found) = T::from_abstract(value)? {
                return Ok(found);
            }
            // The slot itself may be the requested target, e.g. `Place<Shared<U>>`.
            address
                .and_then(|address| T::from_address(address, value))
                .ok_or_else(|| AccessError::type_mismatch::<T>(value.reflect_type_name()))
        }
    }
}

/// Dereferences an abstract value exactly once and hands the pointee to `f`.
fn with_pointee<R>(
    value: &dyn Reflect,
    f: impl FnOnce(&dyn Reflect) -> Result<R, AccessError>,
) -> Result<R, AccessError> {
    let cell = match value.reflect_ref() {
        ReflectRef::Shared(reference) => reference.cell().ok_or_else(|| AccessError::dangling(value))?,
        ReflectRef::Dynamic(dynamic) => match dynamic.held() {
            Held::Value(held) => return f(held),
            Held::Shared(cell) => cell,
        },
        ReflectRef::Struct(_) | ReflectRef::Opaque(_) => return f(value),
    };
    let guard = borrow_cell(&cell)?;
    f(&*guard)
}

#[inline]
fn borrow_cell(cell: &Rc<dyn SharedCell>) -> Result<core::cell::Ref<'_, dyn Reflect>, AccessError> {
    cell.try_borrow().map_err(|_| AccessError::BorrowConflict {
        type_name: cell.pointee_type_name(),
    })
}

// -----------------------------------------------------------------------------
// Abstract targets

impl<U: Reflect> FromSlot for Shared<U> {
    const REPR: Repr = Repr::Reference;

    fn from_abstract(value: &dyn Reflect) -> Result<Option<Self>, AccessError> {
        if let Some(cell) = value.downcast_ref::<Shared<U>>() {
            return Ok(Some(Rc::clone(cell)));
        }
        if let Some(link) = value.downcast_ref::<WeakShared<U>>() {
            return link.upgrade().map(Some).ok_or_else(|| AccessError::dangling(value));
        }
        match value.reflect_ref() {
            ReflectRef::Dynamic(dynamic) => crate::ops::held_shared::<U>(dynamic).map_err(|_| {
                AccessError::BorrowConflict {
                    type_name: value.reflect_type_name(),
                }
            }),
            _ => Ok(None),
        }
    }
}

impl<U: Reflect> FromSlot for WeakShared<U> {
    const REPR: Repr = Repr::Reference;

    fn from_abstract(value: &dyn Reflect) -> Result<Option<Self>, AccessError> {
        if let Some(link) = value.downcast_ref::<WeakShared<U>>() {
            return Ok(Some(Weak::clone(link)));
        }
        let strong = <Shared<U> as FromSlot>::from_abstract(value)?;
        Ok(strong.as_ref().map(Rc::downgrade))
    }
}

impl<U: Reflect> FromSlot for Place<U> {
    const REPR: Repr = Repr::Reference;

    fn from_abstract(value: &dyn Reflect) -> Result<Option<Self>, AccessError> {
        let cell = match value.reflect_ref() {
            ReflectRef::Shared(reference) => reference.cell().ok_or_else(|| AccessError::dangling(value))?,
            ReflectRef::Dynamic(dynamic) => match dynamic.held() {
                Held::Shared(cell) => cell,
                Held::Value(held) => {
                    if !held.is::<U>() {
                        return Ok(None);
                    }
                    return Err(AccessError::Unaddressable {
                        type_name: held.reflect_type_name(),
                    });
                }
            },
            ReflectRef::Struct(_) | ReflectRef::Opaque(_) => return Ok(None),
        };
        if !borrow_cell(&cell)?.is::<U>() {
            return Ok(None);
        }
        Ok(Some(Place::new_unchecked(Address::new(cell))))
    }

    #[inline]
    fn from_address(address: Address, value: &dyn Reflect) -> Option<Self> {
        value.is::<U>().then(|| Place::new_unchecked(address))
    }
}

impl<I: ?Sized + Reflect> FromSlot for Dyn<I> {
    const REPR: Repr = Repr::Dynamic;

    #[inline]
    fn from_abstract(value: &dyn Reflect) -> Result<Option<Self>, AccessError> {
        Ok(value.downcast_ref::<Dyn<I>>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::any::TypeId;

    use crate::access::{AccessError, Place, try_get_field};
    use crate::derive::Reflect;
    use crate::ops::{Dyn, Shared, shared};
    use crate::reflection::impl_reflect_cast_fn;

    trait Label: crate::Reflect {
        fn label(&self) -> String;
    }

    #[derive(Reflect, Clone, Debug, PartialEq)]
    #[reflect(clone)]
    struct Tag {
        text: String,
    }

    impl Label for Tag {
        fn label(&self) -> String {
            self.text.clone()
        }
    }

    #[derive(Reflect)]
    struct Holder {
        tag: Tag,
        shared_tag: Shared<Tag>,
        owned: Dyn<dyn Label>,
        nested: Shared<Shared<Tag>>,
    }

    /// Claims to be a `String` through `ty_id`.
    struct Counter(u64);

    impl crate::Reflect for Counter {
        impl_reflect_cast_fn!(Opaque);

        fn ty_id(&self) -> TypeId {
            TypeId::of::<String>()
        }
    }

    impl Label for Counter {
        fn label(&self) -> String {
            format!("{}", self.0)
        }
    }

    #[derive(Reflect)]
    struct Wrapper {
        slot: Dyn<dyn Label>,
    }

    fn holder() -> Shared<Holder> {
        shared(Holder {
            tag: Tag {
                text: String::from("embedded"),
            },
            shared_tag: shared(Tag {
                text: String::from("shared"),
            }),
            owned: Dyn::Value(Rc::new(Tag {
                text: String::from("owned"),
            })),
            nested: shared(shared(Tag {
                text: String::from("nested"),
            })),
        })
    }

    #[test]
    fn concrete_targets_copy_through_one_reference() {
        let root = holder();
        let tag: Tag = try_get_field(&root, &["shared_tag"]).unwrap();
        assert_eq!(tag.text, "shared");

        let tag: Tag = try_get_field(&root, &["owned"]).unwrap();
        assert_eq!(tag.text, "owned");
    }

    #[test]
    fn unwrap_stops_after_one_dereference() {
        let root = holder();
        let res = try_get_field::<Tag>(&root, &["nested"]);
        assert!(matches!(res, Err(AccessError::TypeMismatch { .. })));

        let outer: Shared<Shared<Tag>> = try_get_field(&root, &["nested"]).unwrap();
        assert_eq!(outer.borrow().borrow().text, "nested");
    }

    #[test]
    fn shared_targets_cannot_alias_embedded_fields() {
        let root = holder();
        let res = try_get_field::<Shared<Tag>>(&root, &["tag"]);
        assert!(matches!(res, Err(AccessError::TypeMismatch { .. })));
    }

    #[test]
    fn owned_dynamic_values_are_not_addressable() {
        let root = holder();
        let res = try_get_field::<Place<Tag>>(&root, &["owned"]);
        assert!(matches!(res, Err(AccessError::Unaddressable { .. })));

        let res = try_get_field::<Place<String>>(&root, &["owned", "text"]);
        assert!(matches!(res, Err(AccessError::Unaddressable { .. })));
    }

    #[test]
    fn place_of_a_reference_slot() {
        let root = holder();
        let slot: Place<Shared<Tag>> = try_get_field(&root, &["shared_tag"]).unwrap();
        let replacement = shared(Tag {
            text: String::from("replaced"),
        });
        *slot.borrow_mut() = Rc::clone(&replacement);

        let current: Shared<Tag> = try_get_field(&root, &["shared_tag"]).unwrap();
        assert!(Rc::ptr_eq(&current, &replacement));
    }

    #[test]
    fn dynamic_targets_clone_the_wrapper() {
        let root = holder();
        let owned: Dyn<dyn Label> = try_get_field(&root, &["owned"]).unwrap();
        assert_eq!(owned.borrow().label(), "owned");
        assert!(owned.ptr_eq(&root.borrow().owned));

        let res = try_get_field::<Dyn<dyn Label>>(&root, &["shared_tag"]);
        assert!(matches!(res, Err(AccessError::TypeMismatch { .. })));
    }

    #[test]
    fn retyping_checks_the_real_type() {
        let counter = shared(Counter(3));
        let root = Wrapper {
            slot: Dyn::Shared(counter.clone()),
        };

        let res = try_get_field::<Shared<String>>(&root, &["slot"]);
        assert!(matches!(res, Err(AccessError::TypeMismatch { .. })));

        let res = try_get_field::<Place<String>>(&root, &["slot"]);
        assert!(matches!(res, Err(AccessError::TypeMismatch { .. })));

        let alias: Shared<Counter> = try_get_field(&root, &["slot"]).unwrap();
        assert!(Rc::ptr_eq(&alias, &counter));
    }
}
