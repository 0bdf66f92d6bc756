use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::de::{Deserializer, expect_sequence};
use crate::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{ConversionError, FromValue, PersistError, PersistValue, Reflect};

fn expect_len(sequence: &[Value], expected: usize) -> Result<(), ConversionError> {
    if sequence.len() == expected {
        Ok(())
    } else {
        Err(ConversionError::Length {
            expected,
            found: sequence.len(),
        })
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: PersistValue, const N: usize> Typed for [T; N] {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Array).with_generics([T::type_info()])
        })
    }
}

impl<T: PersistValue, const N: usize> Reflect for [T; N] {
    crate::__impl_reflect_any!();

    #[inline]
    fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
        ser.serialize_elements(self).map(Some)
    }

    /// Elements are overwritten one by one.
    fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
        let sequence = expect_sequence(value)?;
        expect_len(&sequence, N)?;
        for (slot, element) in self.iter_mut().zip(sequence) {
            slot.apply_value(element, de)?;
        }
        Ok(())
    }
}

impl<T: PersistValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
        let sequence = expect_sequence(value)?;
        expect_len(&sequence, N)?;
        let elements = sequence
            .into_iter()
            .map(|element| T::from_value(element, de))
            .collect::<Result<Vec<T>, _>>()?;
        <[T; N]>::try_from(elements).map_err(|rest| {
            ConversionError::Length {
                expected: N,
                found: rest.len(),
            }
            .into()
        })
    }
}

// -----------------------------------------------------------------------------
// Box<[T]>

impl<T: PersistValue> Typed for Box<[T]> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(TypeKind::Array).with_generics([T::type_info()])
        })
    }
}

impl<T: PersistValue> Reflect for Box<[T]> {
    crate::__impl_reflect_any!();

    #[inline]
    fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
        ser.serialize_elements(self.iter()).map(Some)
    }

    #[inline]
    fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
        *self = Self::from_value(value, de)?;
        Ok(())
    }
}

impl<T: PersistValue> FromValue for Box<[T]> {
    #[inline]
    fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
        de.deserialize_elements::<T, Vec<T>>(value)
            .map(Vec::into_boxed_slice)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use crate::info::{TypeKind, Typed};
    use crate::value::Value;
    use crate::{ConversionError, FromValue, PersistContext, PersistError, Reflect};

    #[test]
    fn fixed_arrays_check_length() {
        let ctx = PersistContext::new();
        let value = Value::Sequence(vec![1.into(), 2.into(), 3.into()]);

        let array = <[u8; 3]>::from_value(value.clone(), &ctx.deserializer()).unwrap();
        assert_eq!(array, [1, 2, 3]);

        let err = <[u8; 2]>::from_value(value.clone(), &ctx.deserializer()).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::Length {
                expected: 2,
                found: 3
            })
        ));

        let mut target = [0_u8; 4];
        assert!(target.apply_value(value, &ctx.deserializer()).is_err());
        assert_eq!(target, [0; 4]);
    }

    #[test]
    fn boxed_slices_take_any_length() {
        let ctx = PersistContext::new();
        let slice: Box<[f64]> = Box::new([0.5, 1.5]);

        let value = slice.to_value(&ctx.serializer()).unwrap().unwrap();
        assert_eq!(value, Value::Sequence(vec![0.5.into(), 1.5.into()]));

        let back = <Box<[f64]>>::from_value(value, &ctx.deserializer()).unwrap();
        assert_eq!(back, slice);
    }

    #[test]
    fn arrays_record_their_component() {
        let info = <[i32; 8]>::type_info();
        assert_eq!(info.kind(), TypeKind::Array);
        assert!(info.element().unwrap().is::<i32>());
        assert_eq!(<Box<[i32]>>::type_info().kind(), TypeKind::Array);
    }
}
