//! Typed objects to value trees.

use alloc::vec::Vec;
use core::any::Any;

use crate::context::PersistContext;
use crate::error::Operation;
use crate::value::{Mapping, Scalar, Value};
use crate::{ConversionError, Persist, PersistEnum, PersistError, Reflect};
use crate::TYPE_TAG_KEY;

// -----------------------------------------------------------------------------
// Serializer

/// Writes objects into [`Mapping`]s.
///
/// A serializer borrows a [`PersistContext`] for its schemas and
/// converters. It holds no other state, so one instance can serialize any
/// number of objects.
///
/// # Examples
///
/// ```
/// use stow_persist::{Persist, PersistContext};
/// use stow_persist::value::Value;
///
/// #[derive(Persist, Default)]
/// struct Server {
///     #[persist]
///     host: String,
///     #[persist]
///     port: u16,
///     #[persist]
///     motd: Option<String>,
/// }
///
/// let ctx = PersistContext::new();
/// let server = Server { host: "localhost".into(), port: 25565, motd: None };
///
/// let map = ctx.serializer().serialize(&server).unwrap();
/// assert_eq!(map.get("host"), Some(&Value::from("localhost")));
/// assert_eq!(map.get("port"), Some(&Value::from(25565)));
/// assert!(!map.contains_key("motd"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'a> {
    ctx: &'a PersistContext,
}

impl<'a> Serializer<'a> {
    #[inline]
    pub fn new(ctx: &'a PersistContext) -> Self {
        Self { ctx }
    }

    #[inline]
    pub fn context(&self) -> &'a PersistContext {
        self.ctx
    }

    /// Writes every persisted field of `object` and its bases.
    ///
    /// Absent values (`None`) are skipped, so the mapping never holds a
    /// placeholder for them.
    pub fn serialize(&self, object: &dyn Persist) -> Result<Mapping, PersistError> {
        let schema = self.ctx.schemas().get_or_resolve(object.level_info())?;

        let mut mapping = Mapping::new();
        let mut current: Option<&dyn Any> = Some(object.as_any());

        for level in schema.levels() {
            let Some(owner) = current else { break };

            for field in level.fields() {
                let value = field
                    .get(owner)
                    .map_err(PersistError::from)
                    .and_then(|value| value.to_value(self))
                    .map_err(|e| {
                        e.in_field(Operation::Serialize, field.owner(), field.name(), field.key())
                    })?;

                // Keys of a resolved schema are unique.
                if let Some(value) = value {
                    mapping.insert(field.key(), value);
                }
            }

            current = level.parent_of(owner)?;
        }

        Ok(mapping)
    }

    /// Like [`serialize`](Self::serialize), adding the type tag of `object`.
    ///
    /// This is the form of values stored in `Box<dyn Persist>` fields.
    pub fn serialize_tagged(&self, object: &dyn Persist) -> Result<Mapping, PersistError> {
        let mut mapping = self.serialize(object)?;
        mapping.insert(TYPE_TAG_KEY, object.type_tag());
        Ok(mapping)
    }

    /// Converts any persisted value; `Ok(None)` if it is absent.
    #[inline]
    pub fn serialize_value(&self, value: &dyn Reflect) -> Result<Option<Value>, PersistError> {
        value.to_value(self)
    }

    /// Converts every element of a collection into a sequence.
    ///
    /// Elements cannot be absent.
    pub fn serialize_elements<'v, T: Reflect>(
        &self,
        elements: impl IntoIterator<Item = &'v T>,
    ) -> Result<Value, PersistError> {
        let mut sequence = Vec::new();
        for element in elements {
            match element.to_value(self)? {
                Some(value) => sequence.push(value),
                None => return Err(ConversionError::AbsentElement.into()),
            }
        }
        Ok(Value::Sequence(sequence))
    }

    /// Applies the registered converter of `value`'s concrete type, if any.
    #[inline]
    pub fn convert_scalar(&self, value: &dyn Any) -> Result<Option<Scalar>, PersistError> {
        self.ctx.converters().to_scalar(value)
    }

    /// Converts an enum by variant name, or by its own converter if registered.
    #[inline]
    pub fn convert_enum<E: PersistEnum>(&self, value: &E) -> Result<Value, PersistError> {
        self.ctx.converters().enum_to_scalar(value).map(Value::Scalar)
    }
}
