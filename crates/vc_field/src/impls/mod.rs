//! Reflection for leaf types.
//!
//! Every type here is `Opaque`: it has no members and can be read as a copy.
//!
//! - `bool`, `char`
//! - `i8` .. `i128`, `isize`, `u8` .. `u128`, `usize`
//! - `f32`, `f64`
//! - `String`
//! - `Vec<T>` and `Option<T>`, for `T: Clone`
//!
//! `Shared<T>`, `WeakShared<T>` and `Dyn<I>` live in [`ops`](crate::ops).

use crate::derive::impl_reflect_opaque;

impl_reflect_opaque!(bool(clone, default, debug));
impl_reflect_opaque!(char(clone, default, debug));

impl_reflect_opaque!(i8(clone, default, debug));
impl_reflect_opaque!(i16(clone, default, debug));
impl_reflect_opaque!(i32(clone, default, debug));
impl_reflect_opaque!(i64(clone, default, debug));
impl_reflect_opaque!(i128(clone, default, debug));
impl_reflect_opaque!(isize(clone, default, debug));

impl_reflect_opaque!(u8(clone, default, debug));
impl_reflect_opaque!(u16(clone, default, debug));
impl_reflect_opaque!(u32(clone, default, debug));
impl_reflect_opaque!(u64(clone, default, debug));
impl_reflect_opaque!(u128(clone, default, debug));
impl_reflect_opaque!(usize(clone, default, debug));

impl_reflect_opaque!(f32(clone, default, debug));
impl_reflect_opaque!(f64(clone, default, debug));

impl_reflect_opaque!(::alloc::string::String(clone, default, debug));

impl_reflect_opaque!(::alloc::vec::Vec<T: Clone>(clone, default));
impl_reflect_opaque!(::core::option::Option<T: Clone>(clone, default));

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::Reflect;
    use crate::access::FromSlot;
    use crate::ops::{ReflectKind, Repr};

    #[test]
    fn leaves_are_opaque() {
        assert_eq!(1_u8.reflect_kind(), ReflectKind::Opaque);
        assert_eq!(String::new().reflect_repr(), Repr::Concrete);
        assert_eq!(vec![1_u8].reflect_kind(), ReflectKind::Opaque);
        assert_eq!(<Option<u8> as FromSlot>::REPR, Repr::Concrete);
    }

    #[test]
    fn leaves_reset_to_default() {
        let value: &dyn Reflect = &7_i64;
        let default = value.reflect_default().unwrap();
        assert_eq!(default.take::<i64>().ok(), Some(0));

        let list: Vec<u8> = vec![1, 2];
        let default = list.reflect_default().unwrap();
        assert_eq!(default.take::<Vec<u8>>().ok(), Some(Vec::new()));
    }

    #[test]
    fn leaves_copy_out() {
        let text = String::from("copy");
        let copied = String::from_value(&text).unwrap();
        assert_eq!(copied, "copy");
        assert_eq!(u32::from_value(&text), None);
    }

    #[test]
    fn debug_uses_the_value() {
        let value: Box<dyn Reflect> = Box::new(42_u16);
        assert_eq!(format!("{value:?}"), "42");

        let list: Box<dyn Reflect> = Box::new(vec![1_u8]);
        assert!(format!("{list:?}").contains("Vec"));
    }
}
