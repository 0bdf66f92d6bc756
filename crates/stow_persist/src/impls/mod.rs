//! Persistence of built-in types, and helpers for implementing it.
//!
//! ## Implemented Menu
//!
//! - scalars: `bool`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`, `f32`, `f64`, `char`, `String`
//! - optional: `Option<T>`
//! - lists: `Vec<T>`, `VecDeque<T>`, `LinkedList<T>`
//! - sets: `BTreeSet<T>`, `std::collections::HashSet<T, S>`, `hashbrown::HashSet<T, S>`
//! - arrays: `[T; N]`, `Box<[T]>`
//! - dynamic: `Box<dyn Persist>`
//! - wildcard: [`Wildcard`], always rejected by schemas
//! - opaque: `uuid::Uuid` ("uuid" feature), and anything declared with
//!   [`impl_persist_opaque!`](crate::impl_persist_opaque)
//!
//! Every scalar and opaque type consults the
//! [`ConverterRegistry`](crate::registry::ConverterRegistry) first, so a
//! registered converter overrides the built-in representation.

// -----------------------------------------------------------------------------
// Modules

mod array;
mod dynamic;
mod list;
mod opaque;
mod option;
mod primitive;
mod set;
mod wildcard;

// -----------------------------------------------------------------------------
// Exports

pub use wildcard::Wildcard;

use core::any::Any;

use crate::de::{Deserializer, expect_scalar};
use crate::ser::Serializer;
use crate::value::{Scalar, Value};
use crate::{ConversionError, PersistError};

/// Converts a scalar-like value, trying its registered converter first.
pub fn scalar_to_value<T: Any>(
    value: &T,
    ser: &Serializer<'_>,
    fallback: impl FnOnce(&T) -> Result<Scalar, ConversionError>,
) -> Result<Option<Value>, PersistError> {
    let scalar = match ser.convert_scalar(value)? {
        Some(scalar) => scalar,
        None => fallback(value)?,
    };
    Ok(Some(Value::Scalar(scalar)))
}

/// Builds a scalar-like value, trying its registered converter first.
pub fn scalar_from_value<T: Any>(
    value: Value,
    de: &Deserializer<'_>,
    fallback: impl FnOnce(Scalar) -> Result<T, ConversionError>,
) -> Result<T, PersistError> {
    let scalar = expect_scalar(value)?;
    match de.convert_scalar::<T>(&scalar)? {
        Some(value) => Ok(value),
        None => Ok(fallback(scalar)?),
    }
}

/// Converts a type that only has a registered converter.
pub fn opaque_to_value<T: Any>(
    value: &T,
    ser: &Serializer<'_>,
) -> Result<Option<Value>, PersistError> {
    scalar_to_value(value, ser, |_| Err(no_converter::<T>()))
}

/// Builds a type that only has a registered converter.
pub fn opaque_from_value<T: Any>(value: Value, de: &Deserializer<'_>) -> Result<T, PersistError> {
    scalar_from_value(value, de, |_| Err(no_converter::<T>()))
}

#[inline]
fn no_converter<T: ?Sized>() -> ConversionError {
    ConversionError::NoConverter {
        type_name: core::any::type_name::<T>(),
    }
}

#[inline]
fn mismatch(expected: &'static str, found: &Scalar) -> ConversionError {
    ConversionError::Mismatch {
        expected,
        found: found.kind_name(),
    }
}
