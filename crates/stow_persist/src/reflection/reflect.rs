use core::any::Any;

use crate::PersistError;
use crate::de::Deserializer;
use crate::info::Typed;
use crate::ser::Serializer;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Reflect

/// A value that can be written to and read from the value tree.
///
/// This is the object-safe half of the persistence traits. Each
/// implementation decides how its type maps onto a [`Value`]: scalars pass
/// through, converter-backed types go through the
/// [`ConverterRegistry`](crate::registry::ConverterRegistry), collections
/// become sequences and persisted structs become nested mappings.
pub trait Reflect: Any + Send + Sync {
    /// The name of the concrete type, for diagnostics.
    fn reflect_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Converts the value into a tree node.
    ///
    /// `Ok(None)` means the value is absent and its key is skipped.
    fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError>;

    /// Overwrites the value from a tree node.
    ///
    /// Nested persisted structs are rebuilt from their default, so fields
    /// missing from the node are reset. Only the root passed to
    /// `deserialize_into` keeps the values of absent keys.
    fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError>;
}

// -----------------------------------------------------------------------------
// FromValue

/// Type-directed construction from a tree node.
pub trait FromValue: Sized {
    fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError>;
}

// -----------------------------------------------------------------------------
// PersistValue

/// Everything a field type needs. Implemented automatically.
pub trait PersistValue: Reflect + FromValue + Typed {}

impl<T: Reflect + FromValue + Typed> PersistValue for T {}

// -----------------------------------------------------------------------------
// Helpers

/// Generates the `Reflect` methods that only depend on `Self`.
#[doc(hidden)]
#[macro_export]
macro_rules! __impl_reflect_any {
    () => {
        #[inline]
        fn reflect_type_name(&self) -> &'static str {
            ::core::any::type_name::<Self>()
        }

        #[inline]
        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        #[inline]
        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }
    };
}
