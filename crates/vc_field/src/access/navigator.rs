use alloc::rc::Rc;
use alloc::string::ToString;

use crate::Reflect;
use crate::access::{AccessError, Address};
use crate::ops::{Held, ReflectRef, Repr, SharedCell};

// -----------------------------------------------------------------------------
// Slot

/// The terminal storage location of a resolved path.
///
/// A slot borrows the live graph and only lives for the duration of one walk.
/// It is addressable when it was reached through a shared cell without
/// crossing a dynamic wrapper that holds a value.
pub struct Slot<'a> {
    value: &'a dyn Reflect,
    address: Option<Address>,
}

impl<'a> Slot<'a> {
    /// Returns the value stored in the slot.
    #[inline]
    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }

    /// Returns the address of the slot, if it has one.
    #[inline]
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Returns the declared representation of the slot.
    #[inline]
    pub fn repr(&self) -> Repr {
        self.value.reflect_repr()
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (&'a dyn Reflect, Option<Address>) {
        (self.value, self.address)
    }
}

// -----------------------------------------------------------------------------
// Navigator

/// Resolves `path` against `root` and hands the terminal slot to `visit`.
///
/// Intermediate shared references and dynamic wrappers are dereferenced
/// before each member lookup; the terminal member is not. Every cell crossed
/// on the way stays immutably borrowed until `visit` returns.
pub(crate) fn navigate<R>(
    root: &dyn Reflect,
    path: &[&str],
    visit: impl FnOnce(Slot<'_>) -> Result<R, AccessError>,
) -> Result<R, AccessError> {
    if path.is_empty() {
        return Err(AccessError::EmptyPath);
    }
    walk(root, None, path, 0, visit)
}

fn walk<R, F>(
    current: &dyn Reflect,
    address: Option<Address>,
    path: &[&str],
    depth: usize,
    visit: F,
) -> Result<R, AccessError>
where
    F: FnOnce(Slot<'_>) -> Result<R, AccessError>,
{
    let Some((&name, rest)) = path.split_first() else {
        return visit(Slot {
            value: current,
            address,
        });
    };

    match current.reflect_ref() {
        ReflectRef::Shared(reference) => {
            let cell = reference.cell().ok_or_else(|| AccessError::dangling(current))?;
            enter(cell, path, depth, visit)
        }
        ReflectRef::Dynamic(dynamic) => match dynamic.held() {
            Held::Shared(cell) => enter(cell, path, depth, visit),
            Held::Value(value) => walk(value, None, path, depth, visit),
        },
        ReflectRef::Struct(container) => {
            let Some(index) = container.index_of(name) else {
                return Err(missing(current, name, depth));
            };
            let Some(field) = container.field_at(index) else {
                return Err(missing(current, name, depth));
            };

            log::trace!(
                "resolved `{name}` on `{}` at depth {depth}",
                current.reflect_type_name()
            );

            let address = address.map(|address| address.child(index));
            walk(field, address, rest, depth + 1, visit)
        }
        ReflectRef::Opaque(_) => Err(missing(current, name, depth)),
    }
}

/// Dereferences a shared cell and continues the walk with the cell as anchor.
fn enter<R, F>(cell: Rc<dyn SharedCell>, path: &[&str], depth: usize, visit: F) -> Result<R, AccessError>
where
    F: FnOnce(Slot<'_>) -> Result<R, AccessError>,
{
    let guard = cell.try_borrow().map_err(|_| AccessError::BorrowConflict {
        type_name: cell.pointee_type_name(),
    })?;
    let address = Address::new(Rc::clone(&cell));
    walk(&*guard, Some(address), path, depth, visit)
}

#[cold]
fn missing(container: &dyn Reflect, name: &str, depth: usize) -> AccessError {
    AccessError::MissingField {
        container: container.reflect_type_name(),
        field: name.to_string(),
        depth,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::navigate;
    use crate::access::AccessError;
    use crate::derive::Reflect;
    use crate::ops::{Repr, Shared, shared};

    #[derive(Reflect)]
    struct Node {
        label: String,
        next: Option<u8>,
        child: Shared<Leaf>,
    }

    #[derive(Reflect)]
    struct Leaf {
        weight: u32,
    }

    fn node() -> Node {
        Node {
            label: String::from("root"),
            next: None,
            child: shared(Leaf { weight: 3 }),
        }
    }

    #[test]
    fn empty_path_is_rejected() {
        let root = node();
        let res = navigate(&root, &[], |_| Ok(()));
        assert_eq!(res, Err(AccessError::EmptyPath));
    }

    #[test]
    fn plain_root_is_readable_but_not_addressable() {
        let root = node();
        let res = navigate(&root, &["label"], |slot| {
            assert_eq!(slot.repr(), Repr::Concrete);
            assert!(slot.address().is_none());
            Ok(slot.value().downcast_ref::<String>().cloned())
        });
        assert_eq!(res, Ok(Some(String::from("root"))));
    }

    #[test]
    fn references_anchor_the_address() {
        let root = node();
        let res = navigate(&root, &["child", "weight"], |slot| {
            let address = slot.address().cloned();
            Ok((slot.value().downcast_ref::<u32>().copied(), address))
        });
        let (weight, address) = res.unwrap();
        assert_eq!(weight, Some(3));

        let address = address.unwrap();
        assert_eq!(address.steps(), &[0]);
        assert_eq!(address.anchor().as_ptr(), alloc::rc::Rc::as_ptr(&root.child).cast::<()>());
    }

    #[test]
    fn terminal_reference_is_not_dereferenced() {
        let root = node();
        let repr = navigate(&root, &["child"], |slot| Ok(slot.repr()));
        assert_eq!(repr, Ok(Repr::Reference));
    }

    #[test]
    fn opaque_values_have_no_members() {
        let root = node();
        let res = navigate(&root, &["next", "value"], |_| Ok(()));
        assert!(matches!(
            res,
            Err(AccessError::MissingField { depth: 1, ref field, .. }) if field == "value"
        ));
    }

    #[test]
    fn mutably_borrowed_cells_conflict() {
        let root = node();
        let guard = root.child.borrow_mut();
        let res = navigate(&root, &["child", "weight"], |_| Ok(()));
        assert!(matches!(res, Err(AccessError::BorrowConflict { .. })));
        drop(guard);
    }
}
