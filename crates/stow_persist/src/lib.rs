//! Annotation-driven persistence of object graphs.
//!
//! Structs marked with [`#[derive(Persist)]`](derive::Persist) are written
//! into a generic [`Value`](value::Value) tree and read back from it. The
//! tree holds mappings, sequences and scalars only, so any human-readable
//! format can carry it through the serde bridge in [`value`].
//!
//! - Nested structs become nested mappings.
//! - Collections become sequences, and `None` fields are left out.
//! - Enums are stored by variant name.
//! - `Box<dyn Persist>` fields carry a type tag under [`TYPE_TAG_KEY`], resolved
//!   through the [`TypeRegistry`](registry::TypeRegistry) when read back.
//! - Types without a natural representation use the scalar converters of the
//!   [`ConverterRegistry`](registry::ConverterRegistry).
//!
//! # Examples
//!
//! ```
//! use stow_persist::{Persist, PersistEnum, PersistContext};
//!
//! #[derive(PersistEnum, Default, Debug, PartialEq)]
//! enum Difficulty {
//!     #[default]
//!     Normal,
//!     Hard,
//! }
//!
//! #[derive(Persist, Default)]
//! #[persist(tag = "world")]
//! struct World {
//!     #[persist]
//!     seed: i64,
//!     #[persist]
//!     difficulty: Difficulty,
//!     #[persist(key = "spawn")]
//!     spawn_point: [i32; 3],
//! }
//!
//! let ctx = PersistContext::new();
//! let world = World { seed: 42, difficulty: Difficulty::Hard, spawn_point: [0, 64, 0] };
//!
//! let map = ctx.serialize(&world).unwrap();
//! let json = serde_json::to_string(&map).unwrap();
//! assert_eq!(json, r#"{"difficulty":"Hard","seed":42,"spawn":[0,64,0]}"#);
//!
//! let map = serde_json::from_str(&json).unwrap();
//! let back: World = ctx.deserializer().deserialize_new(map).unwrap();
//! assert_eq!(back.difficulty, Difficulty::Hard);
//! ```

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `stow_persist`, which must also resolve
// inside the crate itself.
extern crate self as stow_persist;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod error;
mod reflection;

pub mod de;
pub mod impls;
pub mod info;
pub mod registry;
pub mod schema;
pub mod ser;
pub mod value;

pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use context::{PersistConfig, PersistContext};
pub use error::{ConversionError, Operation, PersistError, SchemaError};
pub use impls::Wildcard;
pub use reflection::{FromValue, PersistValue, Reflect};
pub use reflection::{Persist, PersistEnum, PersistObject};

pub use stow_persist_derive as derive;
pub use stow_persist_derive::{Persist, PersistEnum};

/// The mapping key that holds the type tag of a polymorphic value.
pub const TYPE_TAG_KEY: &str = "==";

use core::any::Any;

use crate::value::{Mapping, Scalar};

/// Serializes `object` with the [global](PersistContext::global) context.
#[inline]
pub fn serialize(object: &dyn Persist) -> Result<Mapping, PersistError> {
    PersistContext::global().serialize(object)
}

/// Applies `mapping` to `target` with the [global](PersistContext::global) context.
#[inline]
pub fn deserialize_into(target: &mut dyn Persist, mapping: Mapping) -> Result<(), PersistError> {
    PersistContext::global().deserialize_into(target, mapping)
}

/// Registers a scalar converter in the [global](PersistContext::global) context.
#[inline]
pub fn register_converter<T: Any + Send + Sync>(
    to_scalar: impl Fn(&T) -> Scalar + Send + Sync + 'static,
    from_scalar: impl Fn(&Scalar) -> Result<T, ConversionError> + Send + Sync + 'static,
) -> Result<(), PersistError> {
    PersistContext::global().register_converter(to_scalar, from_scalar)
}

/// Registers `T` under its type tag in the [global](PersistContext::global) context.
#[inline]
pub fn register_type<T: PersistObject>() -> Result<(), PersistError> {
    PersistContext::global().register_type::<T>()
}
