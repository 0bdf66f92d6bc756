use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::PersistObject;
use crate::info::FieldInfo;

// -----------------------------------------------------------------------------
// ParentInfo

/// Link from a struct to the base struct it embeds with `#[persist(parent)]`.
#[derive(Clone)]
pub struct ParentInfo {
    field: &'static str,
    level: fn() -> &'static LevelInfo,
    get: fn(&dyn Any) -> Option<&dyn Any>,
    get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
}

impl ParentInfo {
    /// Creates the link to a base of type `P` stored in the field `field`.
    #[inline]
    pub const fn new<P: PersistObject>(
        field: &'static str,
        get: fn(&dyn Any) -> Option<&dyn Any>,
        get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
    ) -> Self {
        Self {
            field,
            level: P::object_level,
            get,
            get_mut,
        }
    }

    /// Name of the embedding field.
    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The level of the base struct.
    #[inline]
    pub fn level(&self) -> &'static LevelInfo {
        (self.level)()
    }

    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(owner)
    }

    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.get_mut)(owner)
    }
}

impl fmt::Debug for ParentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentInfo")
            .field("field", &self.field)
            .field("level", &self.level().owner())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// LevelInfo

/// The persisted fields declared directly on one struct.
///
/// Fields of an embedded base struct are not listed here; they are
/// reached through [`parent`](Self::parent).
#[derive(Debug)]
pub struct LevelInfo {
    type_id: TypeId,
    type_name: &'static str,
    owner: &'static str,
    fields: Box<[FieldInfo]>,
    parent: Option<ParentInfo>,
}

impl LevelInfo {
    /// Creates the level of `T`; `owner` is the short name used in errors.
    pub fn new<T: Any>(owner: &'static str, fields: impl Into<Vec<FieldInfo>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            owner,
            fields: fields.into().into_boxed_slice(),
            parent: None,
        }
    }

    #[inline]
    pub fn with_parent(mut self, parent: ParentInfo) -> Self {
        self.parent = Some(parent);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn parent(&self) -> Option<&ParentInfo> {
        self.parent.as_ref()
    }
}
