use alloc::boxed::Box;
use core::any::Any;

use crate::de::{Deserializer, expect_mapping};
use crate::info::{NonGenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{FromValue, Persist, PersistError, Reflect};

impl Typed for Box<dyn Persist> {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(TypeKind::Dynamic))
    }
}

/// Written with the type tag of the boxed value, read back through the
/// [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// The `Any` accessors reach through the box, so downcasting a
/// `Box<dyn Persist>` yields the concrete value.
impl Reflect for Box<dyn Persist> {
    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        (**self).reflect_type_name()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }

    fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
        let mapping = ser.serialize_tagged(&**self)?;
        Ok(Some(Value::Mapping(mapping)))
    }

    #[inline]
    fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
        *self = Self::from_value(value, de)?;
        Ok(())
    }
}

impl FromValue for Box<dyn Persist> {
    #[inline]
    fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
        de.deserialize_tagged(expect_mapping(value)?)
    }
}
