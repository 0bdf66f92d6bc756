use crate::de::Deserializer;
use crate::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{FromValue, PersistError, PersistValue, Reflect};

impl<T: PersistValue> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Optional).with_generics([T::type_info()])
        })
    }
}

impl<T: PersistValue> Reflect for Option<T> {
    crate::__impl_reflect_any!();

    /// `None` is absent: its key is left out of the mapping.
    fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
        match self {
            Some(value) => value.to_value(ser),
            None => Ok(None),
        }
    }

    fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
        *self = Some(T::from_value(value, de)?);
        Ok(())
    }
}

impl<T: PersistValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
        T::from_value(value, de).map(Some)
    }
}
