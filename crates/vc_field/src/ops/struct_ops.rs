use crate::Reflect;

/// A composite with named members: the accessor table of a struct.
///
/// Generated by [`#[derive(Reflect)]`](crate::derive::Reflect). Member names
/// map to dense indices in declaration order, skipping fields marked
/// `#[reflect(ignore)]`. Indices are what a slot [`Address`](crate::access::Address)
/// records, so they must stay stable for the lifetime of the type.
///
/// # Example
///
/// ```
/// use vc_field::{derive::Reflect, ops::Struct};
///
/// #[derive(Reflect)]
/// struct Foo {
///     a: u32,
///     b: String,
/// }
///
/// let foo = Foo { a: 1, b: "x".into() };
///
/// assert_eq!(foo.index_of("b"), Some(1));
/// assert_eq!(foo.field("a").unwrap().downcast_ref::<u32>(), Some(&1));
/// assert!(foo.field("c").is_none());
/// ```
pub trait Struct: Reflect {
    /// Returns the index of the member named `name`.
    fn index_of(&self, name: &str) -> Option<usize>;

    /// Returns a reference to the member at `index`.
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the member at `index`.
    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Returns a reference to the member named `name`.
    #[inline]
    fn field(&self, name: &str) -> Option<&dyn Reflect> {
        self.field_at(self.index_of(name)?)
    }

    /// Returns a mutable reference to the member named `name`.
    #[inline]
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        let index = self.index_of(name)?;
        self.field_at_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::derive::Reflect;
    use crate::ops::Struct;

    #[derive(Reflect)]
    struct Sample {
        first: u8,
        #[reflect(ignore)]
        _cache: Option<fn()>,
        second: String,
    }

    #[test]
    fn ignored_fields_are_not_indexed() {
        let mut sample = Sample {
            first: 1,
            _cache: None,
            second: String::from("two"),
        };

        assert_eq!(sample.index_of("first"), Some(0));
        assert_eq!(sample.index_of("second"), Some(1));
        assert_eq!(sample.index_of("_cache"), None);
        assert!(sample.field_at(2).is_none());

        let second = sample.field_mut("second").unwrap();
        *second.downcast_mut::<String>().unwrap() = String::from("changed");
        assert_eq!(sample.second, "changed");
    }
}
