use alloc::boxed::Box;
use core::any::{Any, TypeId};

use stow_os::sync::{OnceLock, RwLock};
use stow_utils::TypeIdMap;

use crate::info::{LevelInfo, TypeInfo};

// -----------------------------------------------------------------------------
// Typed

/// Static access to the [`TypeInfo`] of a type.
///
/// Implemented for every supported field type, and generated by
/// [`#[derive(Persist)]`](crate::derive::Persist) and
/// [`#[derive(PersistEnum)]`](crate::derive::PersistEnum).
///
/// Manual implementations store the info in a cell:
///
/// ```
/// use stow_persist::info::{NonGenericTypeInfoCell, TypeInfo, TypeKind, Typed};
///
/// struct Celsius(f64);
///
/// impl Typed for Celsius {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::new::<Self>(TypeKind::Opaque))
///     }
/// }
///
/// assert!(Celsius::type_info().is::<Celsius>());
/// ```
pub trait Typed: 'static {
    fn type_info() -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// Cells

mod sealed {
    pub trait CellValue: Send + Sync + 'static {}

    impl CellValue for super::TypeInfo {}
    impl CellValue for super::LevelInfo {}
}

/// Static storage for the info of a non-generic type.
pub struct NonGenericCell<T: sealed::CellValue>(OnceLock<T>);

pub type NonGenericTypeInfoCell = NonGenericCell<TypeInfo>;
pub type NonGenericLevelInfoCell = NonGenericCell<LevelInfo>;

impl<T: sealed::CellValue> NonGenericCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(f)
    }
}

/// Static storage for the info of a generic type.
///
/// A `static` inside a generic function is shared by every instantiation,
/// so entries are keyed by the `TypeId` of the instantiated type.
///
/// ```
/// use stow_persist::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
///
/// struct Tagged<T>(T);
///
/// impl<T: Typed> Typed for Tagged<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| {
///             TypeInfo::new::<Self>(TypeKind::Opaque).with_generics([T::type_info()])
///         })
///     }
/// }
///
/// assert!(<Tagged<u8>>::type_info().element().unwrap().is::<u8>());
/// assert!(<Tagged<i8>>::type_info().element().unwrap().is::<i8>());
/// ```
pub struct GenericCell<T: sealed::CellValue>(RwLock<TypeIdMap<&'static T>>);

pub type GenericTypeInfoCell = GenericCell<TypeInfo>;
pub type GenericLevelInfoCell = GenericCell<LevelInfo>;

impl<T: sealed::CellValue> GenericCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the entry of `G`, building it with `f` on first access.
    ///
    /// `f` runs without holding the cell's lock, so it may read other
    /// entries of the same cell.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &'static T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &'static T {
        let cached = self.0.read().get(&type_id).copied();
        match cached {
            Some(info) => info,
            None => {
                let value = f();
                *self
                    .0
                    .write()
                    .get_or_insert(type_id, || Box::leak(Box::new(value)))
            }
        }
    }
}
