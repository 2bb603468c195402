use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;

use crate::access::{AccessError, Place, WriteHandle};
use crate::access::{get_field, prepare_write, try_get_field, try_prepare_write};
use crate::derive::Reflect;
use crate::ops::{Dyn, Shared, WeakShared, shared};

// -----------------------------------------------------------------------------
// Fixture

trait Named: crate::Reflect {
    fn name(&self) -> String;
    fn rename(&mut self, name: &str) -> String;
}

#[derive(Reflect, Clone, Debug, PartialEq)]
#[reflect(clone)]
struct Label {
    name: String,
}

impl Named for Label {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn rename(&mut self, name: &str) -> String {
        core::mem::replace(&mut self.name, String::from(name))
    }
}

#[derive(Reflect)]
struct Document {
    title: String,
    body: Section,
}

#[derive(Reflect, Clone)]
#[reflect(clone)]
struct Section {
    heading: String,
    label: Dyn<dyn Named>,
    owner: WeakShared<Document>,
}

struct Fixture {
    root: Shared<Document>,
    label: Shared<Label>,
}

/// A document whose section points back at the document itself.
fn fixture() -> Fixture {
    let label = shared(Label {
        name: String::from("label"),
    });
    let named: Shared<dyn Named> = label.clone();
    let root = Rc::new_cyclic(|owner: &Weak<RefCell<Document>>| {
        RefCell::new(Document {
            title: String::from("title"),
            body: Section {
                heading: String::from("heading"),
                label: Dyn::Shared(named),
                owner: Weak::clone(owner),
            },
        })
    });
    Fixture { root, label }
}

// -----------------------------------------------------------------------------
// Reads

#[test]
fn concrete_read_copies_and_place_aliases() {
    let Fixture { root, .. } = fixture();

    let title: String = get_field(&root, &["title"]);
    assert_eq!(title, "title");

    let place: Place<String> = get_field(&root, &["title"]);
    *place.borrow_mut() = String::from("title_changed");

    let title: String = get_field(&root, &["title"]);
    assert_eq!(title, "title_changed");
}

#[test]
fn composite_copy_is_shallow() {
    let Fixture { root, .. } = fixture();

    let mut body: Section = get_field(&root, &["body"]);
    assert_eq!(body.heading, "heading");
    body.heading = String::from("heading_changed");

    let again: Section = get_field(&root, &["body"]);
    assert_eq!(again.heading, "heading");
    // Only the wrapper was copied, the label behind it is the same.
    assert!(again.label.ptr_eq(&root.borrow().body.label));
}

#[test]
fn place_of_a_composite_aliases() {
    let Fixture { root, .. } = fixture();

    let body: Place<Section> = get_field(&root, &["body"]);
    assert_eq!(body.borrow().heading, "heading");
    body.borrow_mut().heading = String::from("heading_changed");

    let copy: Section = get_field(&root, &["body"]);
    assert_eq!(copy.heading, "heading_changed");
}

#[test]
fn dynamic_wrapper_unwraps_once() {
    let Fixture { root, label } = fixture();

    let named: Dyn<dyn Named> = get_field(&root, &["body", "label"]);
    assert_eq!(named.borrow().name(), "label");
    let concrete = named.downcast_shared::<Label>().unwrap().unwrap();
    assert!(Rc::ptr_eq(&concrete, &label));

    let copy: Label = get_field(&root, &["body", "label"]);
    assert_eq!(copy.name, "label");

    let alias: Shared<Label> = get_field(&root, &["body", "label"]);
    assert!(Rc::ptr_eq(&alias, &label));
    alias.borrow_mut().name = String::from("label_changed");

    // The earlier handle observes the change without a new read.
    assert_eq!(named.borrow().name(), "label_changed");
    assert_eq!(copy.name, "label");

    let named: Dyn<dyn Named> = get_field(&root, &["body", "label"]);
    assert_eq!(named.borrow().name(), "label_changed");
}

#[test]
fn members_behind_the_wrapper_are_reachable() {
    let Fixture { root, label } = fixture();

    let name: Place<String> = get_field(&root, &["body", "label", "name"]);
    // Anchored at the cell behind the wrapper, not at the document.
    assert_eq!(name.address().anchor().as_ptr(), Rc::as_ptr(&label).cast::<()>());
    assert_eq!(name.address().steps(), &[0]);
    *name.borrow_mut() = String::from("through_place");
    assert_eq!(label.borrow_mut().rename("renamed"), "through_place");
}

#[test]
fn round_nesting_preserves_identity() {
    let Fixture { root, .. } = fixture();

    let once: Shared<Document> = get_field(&root, &["body", "owner"]);
    assert!(Rc::ptr_eq(&once, &root));

    let twice: Shared<Document> = get_field(&root, &["body", "owner", "body", "owner"]);
    assert!(Rc::ptr_eq(&twice, &once));

    let weak: WeakShared<Document> = get_field(&root, &["body", "owner"]);
    assert!(Weak::ptr_eq(&weak, &Rc::downgrade(&root)));
}

#[test]
fn missing_field_leaves_the_graph_untouched() {
    let Fixture { root, .. } = fixture();

    let err = try_get_field::<String>(&root, &["doesNotExist"]).unwrap_err();
    assert_eq!(
        err,
        AccessError::MissingField {
            container: core::any::type_name::<Document>(),
            field: String::from("doesNotExist"),
            depth: 0,
        }
    );

    let err = try_prepare_write(&root, &["body", "doesNotExist"]).unwrap_err();
    assert!(matches!(err, AccessError::MissingField { depth: 1, .. }));

    assert_eq!(root.borrow().title, "title");
    assert_eq!(root.borrow().body.heading, "heading");
}

#[test]
#[should_panic(expected = "Missing field `doesNotExist`")]
fn get_field_panics_on_a_missing_field() {
    let Fixture { root, .. } = fixture();
    let _: String = get_field(&root, &["doesNotExist"]);
}

#[test]
#[should_panic(expected = "Missing field `doesNotExist`")]
fn prepare_write_panics_on_a_missing_field() {
    let Fixture { root, .. } = fixture();
    let _ = prepare_write(&root, &["body", "doesNotExist"]);
}

#[test]
fn dangling_back_reference_is_reported() {
    let Fixture { root, .. } = fixture();
    let body: Section = get_field(&root, &["body"]);
    drop(root);

    let Err(err) = try_get_field::<Shared<Document>>(&body, &["owner"]) else {
        panic!("a dropped owner should not upgrade");
    };
    assert!(matches!(err, AccessError::Dangling { .. }));

    let err = try_get_field::<String>(&body, &["owner", "title"]).unwrap_err();
    assert!(matches!(err, AccessError::Dangling { .. }));
}

// -----------------------------------------------------------------------------
// Writes

#[test]
fn write_handle_and_place_share_the_address() {
    let Fixture { root, .. } = fixture();

    let handle = prepare_write(&root, &["body", "heading"]);
    let place: Place<String> = get_field(&root, &["body", "heading"]);
    assert_eq!(handle.address(), place.address());

    // Through the cycle, the same storage is reached again.
    let looped = prepare_write(&root, &["body", "owner", "body", "heading"]);
    assert_eq!(looped.address(), handle.address());
}

#[test]
fn writes_are_visible_to_every_alias() {
    let Fixture { root, .. } = fixture();

    let place: Place<String> = get_field(&root, &["title"]);
    let handle: WriteHandle = prepare_write(&root, &["title"]);

    handle.apply(String::from("first"));
    assert_eq!(*place.borrow(), "first");
    assert_eq!(get_field::<String>(&root, &["title"]), "first");

    // A handle is reusable.
    handle.apply(String::from("second"));
    assert_eq!(*place.borrow(), "second");
    assert_eq!(root.borrow().title, "second");
}

#[test]
fn reset_restores_the_default() {
    let Fixture { root, .. } = fixture();

    prepare_write(&root, &["body", "heading"]).reset();
    assert_eq!(get_field::<String>(&root, &["body", "heading"]), "");

    let err = try_prepare_write(&root, &["body", "label"])
        .and_then(|handle| handle.try_reset())
        .unwrap_err();
    assert!(matches!(err, AccessError::NoDefault { .. }));
}

#[test]
fn weak_references_reset_to_null() {
    let Fixture { root, .. } = fixture();

    prepare_write(&root, &["body", "owner"]).reset();
    assert!(root.borrow().body.owner.upgrade().is_none());

    let err = try_get_field::<String>(&root, &["body", "owner", "title"]).unwrap_err();
    assert!(matches!(err, AccessError::Dangling { .. }));
}

#[test]
fn reference_slots_can_be_repointed() {
    let Fixture { root, label } = fixture();

    let other = shared(Label {
        name: String::from("other"),
    });
    let replacement: Shared<dyn Named> = other.clone();
    prepare_write(&root, &["body", "label"]).apply(Dyn::Shared(replacement));

    let current: Shared<Label> = get_field(&root, &["body", "label"]);
    assert!(Rc::ptr_eq(&current, &other));
    assert_eq!(label.borrow().name, "label");
}

#[test]
fn writes_through_a_plain_root_are_unaddressable() {
    let Fixture { root, .. } = fixture();
    let body: Section = get_field(&root, &["body"]);

    let err = try_prepare_write(&body, &["heading"]).unwrap_err();
    assert!(matches!(err, AccessError::Unaddressable { .. }));

    // Crossing a reference anchors the address again.
    let handle = try_prepare_write(&body, &["owner", "title"]).unwrap();
    handle.apply(String::from("via_copy"));
    assert_eq!(root.borrow().title, "via_copy");
}
