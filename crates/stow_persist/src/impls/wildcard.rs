use alloc::boxed::Box;
use core::any::Any;

use crate::de::Deserializer;
use crate::info::{NonGenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{ConversionError, FromValue, PersistError, Reflect};

/// A value of any type.
///
/// Nothing is known about a wildcard statically, so a persisted field whose
/// declared type contains one fails schema resolution with
/// [`SchemaError::Wildcard`](crate::SchemaError::Wildcard). Converting one
/// directly fails with [`ConversionError::NoConverter`].
pub type Wildcard = Box<dyn Any + Send + Sync>;

impl Typed for Wildcard {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(TypeKind::Wildcard))
    }
}

fn unsupported() -> PersistError {
    ConversionError::NoConverter {
        type_name: "Wildcard",
    }
    .into()
}

impl Reflect for Wildcard {
    crate::__impl_reflect_any!();

    #[inline]
    fn to_value(&self, _ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
        Err(unsupported())
    }

    #[inline]
    fn apply_value(&mut self, _value: Value, _de: &Deserializer<'_>) -> Result<(), PersistError> {
        Err(unsupported())
    }
}

impl FromValue for Wildcard {
    #[inline]
    fn from_value(_value: Value, _de: &Deserializer<'_>) -> Result<Self, PersistError> {
        Err(unsupported())
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::Wildcard;
    use crate::{ConversionError, PersistContext, PersistError};

    #[test]
    fn direct_use_fails() {
        let ctx = PersistContext::new();
        let any: Wildcard = Box::new(5_u8);
        let err = ctx.serializer().serialize_value(&any).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::NoConverter { .. })
        ));
    }
}
