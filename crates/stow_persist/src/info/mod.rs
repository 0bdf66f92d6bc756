//! Static type information.
//!
//! - [`TypeInfo`]: the kind and declared type arguments of any persisted type.
//! - [`LevelInfo`]: the persisted fields of one struct, linked to its base struct
//!   through [`ParentInfo`].
//! - [`Typed`] and the info cells used to implement it.

// -----------------------------------------------------------------------------
// Modules

mod field_info;
mod level_info;
mod type_info;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use field_info::{FieldGetter, FieldGetterMut, FieldInfo};
pub use level_info::{LevelInfo, ParentInfo};
pub use type_info::{TypeInfo, TypeKind};
pub use typed::{GenericCell, NonGenericCell, Typed};
pub use typed::{GenericLevelInfoCell, GenericTypeInfoCell};
pub use typed::{NonGenericLevelInfoCell, NonGenericTypeInfoCell};
