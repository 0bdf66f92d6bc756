use core::any::Any;
use core::fmt;

use crate::Reflect;
use crate::info::{TypeInfo, Typed};

/// Borrows one field out of its erased owner.
///
/// Returns `None` when the owner is not of the expected type.
pub type FieldGetter = fn(&dyn Any) -> Option<&dyn Reflect>;

/// Mutable counterpart of [`FieldGetter`].
pub type FieldGetterMut = fn(&mut dyn Any) -> Option<&mut dyn Reflect>;

// -----------------------------------------------------------------------------
// FieldInfo

/// One persisted field of one struct level.
///
/// `key` is the name used in the value tree, `name` the Rust identifier.
#[derive(Clone)]
pub struct FieldInfo {
    name: &'static str,
    key: &'static str,
    // Resolved lazily, so recursive types do not build their infos eagerly.
    type_info: fn() -> &'static TypeInfo,
    get: FieldGetter,
    get_mut: FieldGetterMut,
}

impl FieldInfo {
    /// Creates the info of a field of type `T`.
    #[inline]
    pub const fn new<T: Typed>(
        name: &'static str,
        key: &'static str,
        get: FieldGetter,
        get_mut: FieldGetterMut,
    ) -> Self {
        Self {
            name,
            key,
            type_info: T::type_info,
            get,
            get_mut,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Reflect> {
        (self.get)(owner)
    }

    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Reflect> {
        (self.get_mut)(owner)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type", &self.type_info().type_name())
            .finish()
    }
}
