use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::ops::{ReflectKind, ReflectMut, ReflectRef, Repr};

// -----------------------------------------------------------------------------
// Reflect

/// The foundational trait for field access in [`vc_field`].
///
/// A `Reflect` value knows its own [representation](Repr) and, for structs,
/// exposes an accessor table that maps member names to its fields. This is
/// the opt-in that replaces runtime field introspection: the path walk only
/// reaches members a type has registered.
///
/// # Recommendations
///
/// Use [the derive macro](crate::derive::Reflect) for your own structs:
///
/// ```
/// use vc_field::derive::Reflect;
///
/// #[derive(Reflect, Clone)]
/// #[reflect(clone)]
/// struct Player {
///     name: String,
///     score: u32,
/// }
/// ```
///
/// Leaf types (numbers, `bool`, `char`, `String`, `Vec<T>`, `Option<T>`),
/// [`Shared<T>`](crate::Shared) and [`Dyn<I>`](crate::Dyn) are implemented by
/// this crate.
///
/// # Type Identification
///
/// [`Any::type_id`] on `Box<dyn Reflect>` returns the container's type ID,
/// not the inner value's. Use [`Reflect::ty_id`] instead:
///
/// ```rust
/// # use vc_field::Reflect;
/// # use core::any::{Any, TypeId};
/// let x: Box<dyn Reflect> = 32_i32.into_boxed_reflect();
///
/// assert!(x.type_id() != TypeId::of::<i32>());
/// assert!(x.ty_id() == TypeId::of::<i32>());
/// ```
///
/// # Dynamic wrappers
///
/// A trait used as a capability set behind [`Dyn`](crate::Dyn) must have
/// `Reflect` as a supertrait, so that the held value can be unwrapped:
///
/// ```
/// use vc_field::Reflect;
///
/// trait Named: Reflect {
///     fn name(&self) -> &str;
/// }
/// ```
///
/// [`vc_field`]: crate
pub trait Reflect: Any {
    /// Casts this value to a `&dyn Reflect`.
    ///
    /// Unlike an unsizing coercion, this also works when `Self` is itself a
    /// trait object with `Reflect` as supertrait.
    fn as_reflect(&self) -> &dyn Reflect;

    /// Casts this value to a `&mut dyn Reflect`.
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    /// Casts this type to a boxed, fully-reflected value.
    ///
    /// ```
    /// use vc_field::Reflect;
    ///
    /// let r = 32.into_boxed_reflect();
    /// assert!(r.is::<i32>());
    /// ```
    #[inline(always)]
    fn into_boxed_reflect(self) -> Box<dyn Reflect>
    where
        Self: Sized,
    {
        Box::new(self)
    }

    /// Return the [`TypeId`] of underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Return the name of the underlying type, for diagnostics.
    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Returns a pure enumeration of ["kinds"](ReflectKind) of type.
    fn reflect_kind(&self) -> ReflectKind;

    /// Returns the declared [representation](Repr) of a slot holding this value.
    #[inline]
    fn reflect_repr(&self) -> Repr {
        self.reflect_kind().repr()
    }

    /// Returns an immutable enumeration of ["kinds"](ReflectRef) of type.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Returns a mutable enumeration of ["kinds"](ReflectMut) of type.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Performs a type-checked assignment of a reflected value to this value.
    ///
    /// On a type mismatch, the rejected value is handed back.
    ///
    /// ```
    /// # use vc_field::Reflect;
    /// let mut text = String::from("old");
    ///
    /// assert!(text.set(String::from("new").into_boxed_reflect()).is_ok());
    /// assert_eq!(text, "new");
    ///
    /// assert!(text.set(1_u8.into_boxed_reflect()).is_err());
    /// ```
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Returns the default value of this type, if it has one.
    ///
    /// Used to reset a slot. `Shared<T>` and `Dyn<I>` have no null state, so
    /// they return `None`; `WeakShared<T>` returns the null weak handle.
    /// Derived structs return `Some` only with the `#[reflect(default)]` flag.
    #[inline]
    fn reflect_default(&self) -> Option<Box<dyn Reflect>> {
        None
    }

    /// Debug formatter for the value.
    ///
    /// Writes the type name by default. Derived structs marked with
    /// `#[reflect(debug)]` use their [`Debug`](fmt::Debug) implementation.
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reflect_type_name())
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    ///
    /// Checks [`Any::type_id`], which an implementor cannot override.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        <dyn Any>::is::<T>(self)
    }

    /// Downcasts the value to type `T` by reference.
    ///
    /// ```
    /// # use vc_field::Reflect;
    /// let x: Box<dyn Reflect> = 10.into_boxed_reflect();
    ///
    /// assert_eq!(x.downcast_ref::<i32>(), Some(&10));
    /// assert_eq!(x.downcast_ref::<u32>(), None);
    /// ```
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts the value to type `T`, consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn downcast<T: Any>(self: Box<dyn Reflect>) -> Result<Box<T>, Box<dyn Reflect>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let any: Box<dyn Any> = self;
        match any.downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => unreachable!("type is already checked"),
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// ```
    /// # use vc_field::Reflect;
    /// let x: Box<dyn Reflect> = 10.into_boxed_reflect();
    ///
    /// assert_eq!(x.take::<i32>().ok(), Some(10));
    /// ```
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        self.downcast::<T>().map(|value| *value)
    }
}

impl fmt::Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implement the casting methods shared by every `Reflect` impl in this crate.
macro_rules! impl_reflect_cast_fn {
    ($kind:ident) => {
        #[inline]
        fn as_reflect(&self) -> &dyn $crate::Reflect {
            self
        }

        #[inline]
        fn as_reflect_mut(&mut self) -> &mut dyn $crate::Reflect {
            self
        }

        fn set(
            &mut self,
            value: ::alloc::boxed::Box<dyn $crate::Reflect>,
        ) -> Result<(), ::alloc::boxed::Box<dyn $crate::Reflect>> {
            *self = value.take::<Self>()?;
            Ok(())
        }

        #[inline]
        fn reflect_kind(&self) -> $crate::ops::ReflectKind {
            $crate::ops::ReflectKind::$kind
        }

        #[inline]
        fn reflect_ref(&self) -> $crate::ops::ReflectRef<'_> {
            $crate::ops::ReflectRef::$kind(self)
        }

        #[inline]
        fn reflect_mut(&mut self) -> $crate::ops::ReflectMut<'_> {
            $crate::ops::ReflectMut::$kind(self)
        }
    };
}

pub(crate) use impl_reflect_cast_fn;
