use alloc::string::{String, ToString};

use crate::de::Deserializer;
use crate::impls::{mismatch, scalar_from_value, scalar_to_value};
use crate::info::{NonGenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::{Scalar, Value};
use crate::{ConversionError, FromValue, PersistError, Reflect};

macro_rules! impl_scalar {
    ($ty:ty, to: $to:expr, from: $from:expr) => {
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::new::<Self>(TypeKind::Scalar))
            }
        }

        impl Reflect for $ty {
            crate::__impl_reflect_any!();

            #[inline]
            fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
                scalar_to_value(self, ser, $to)
            }

            #[inline]
            fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
                *self = <Self as FromValue>::from_value(value, de)?;
                Ok(())
            }
        }

        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
                scalar_from_value(value, de, $from)
            }
        }
    };
}

macro_rules! impl_integer {
    ($($ty:ident),*) => {$(
        impl_scalar!(
            $ty,
            to: |v: &$ty| {
                i64::try_from(*v)
                    .map(Scalar::Int)
                    .map_err(|_| out_of_range(stringify!($ty), v))
            },
            from: |s: Scalar| match s {
                Scalar::Int(v) => $ty::try_from(v).map_err(|_| out_of_range(stringify!($ty), &v)),
                other => Err(mismatch("integer", &other)),
            }
        );
    )*};
}

macro_rules! impl_float {
    ($($ty:ident => $narrow:path),*) => {$(
        impl_scalar!(
            $ty,
            to: |v: &$ty| Ok(Scalar::Float(f64::from(*v))),
            from: |s: Scalar| match s {
                Scalar::Float(v) => $narrow(v),
                Scalar::Int(v) => $narrow(v as f64),
                other => Err(mismatch("float", &other)),
            }
        );
    )*};
}

/// Finite values beyond the range of `f32` are rejected, infinities and NaN
/// carry over.
fn narrow_f32(v: f64) -> Result<f32, ConversionError> {
    if v.is_finite() && v.abs() > f64::from(f32::MAX) {
        return Err(out_of_range("f32", &v));
    }
    Ok(v as f32)
}

#[inline]
fn keep_f64(v: f64) -> Result<f64, ConversionError> {
    Ok(v)
}

fn out_of_range(type_name: &'static str, value: &impl ToString) -> ConversionError {
    ConversionError::OutOfRange {
        type_name,
        value: value.to_string().into(),
    }
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl_float!(f32 => narrow_f32, f64 => keep_f64);

impl_scalar!(
    bool,
    to: |v: &bool| Ok(Scalar::Bool(*v)),
    from: |s: Scalar| match s {
        Scalar::Bool(v) => Ok(v),
        other => Err(mismatch("bool", &other)),
    }
);

impl_scalar!(
    char,
    to: |v: &char| Ok(Scalar::Str(v.to_string())),
    from: |s: Scalar| match s {
        Scalar::Str(v) => {
            let mut chars = v.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(ConversionError::InvalidScalar {
                    type_name: "char",
                    reason: "expected exactly one character".into(),
                }),
            }
        }
        other => Err(mismatch("string", &other)),
    }
);

impl_scalar!(
    String,
    to: |v: &String| Ok(Scalar::Str(v.clone())),
    from: |s: Scalar| match s {
        Scalar::Str(v) => Ok(v),
        other => Err(mismatch("string", &other)),
    }
);

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::value::{Scalar, Value};
    use crate::{ConversionError, FromValue, PersistContext, PersistError, Reflect};

    fn read<T: FromValue>(ctx: &PersistContext, value: impl Into<Value>) -> Result<T, PersistError> {
        T::from_value(value.into(), &ctx.deserializer())
    }

    fn write(ctx: &PersistContext, value: &dyn Reflect) -> Value {
        ctx.serializer().serialize_value(value).unwrap().unwrap()
    }

    #[test]
    fn integers_check_their_range() {
        let ctx = PersistContext::new();
        assert_eq!(read::<u8>(&ctx, 255).unwrap(), 255);
        assert_eq!(read::<i16>(&ctx, -3).unwrap(), -3);

        let err = read::<u8>(&ctx, -1).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::OutOfRange { type_name: "u8", .. })
        ));

        let err = ctx.serializer().serialize_value(&u64::MAX).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::OutOfRange { type_name: "u64", .. })
        ));
    }

    #[test]
    fn floats_accept_integers() {
        let ctx = PersistContext::new();
        assert_eq!(read::<f64>(&ctx, 2).unwrap(), 2.0);
        assert_eq!(read::<f32>(&ctx, 0.5).unwrap(), 0.5);
        assert_eq!(write(&ctx, &1.5_f32), Value::Scalar(Scalar::Float(1.5)));
    }

    #[test]
    fn f32_rejects_finite_overflow() {
        let ctx = PersistContext::new();
        let err = read::<f32>(&ctx, 1.0e39).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::OutOfRange { type_name: "f32", .. })
        ));
        assert_eq!(read::<f32>(&ctx, f64::from(f32::MAX)).unwrap(), f32::MAX);
        assert!(read::<f32>(&ctx, f64::INFINITY).unwrap().is_infinite());
        assert_eq!(read::<f64>(&ctx, 1.0e39).unwrap(), 1.0e39);
    }

    #[test]
    fn kinds_must_match() {
        let ctx = PersistContext::new();
        let err = read::<bool>(&ctx, "yes").unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::Mismatch {
                expected: "bool",
                found: "string"
            })
        ));
        assert!(read::<String>(&ctx, Value::Sequence(Default::default())).is_err());
    }

    #[test]
    fn chars_are_single_character_strings() {
        let ctx = PersistContext::new();
        assert_eq!(write(&ctx, &'x'), Value::from("x"));
        assert_eq!(read::<char>(&ctx, "y").unwrap(), 'y');
        assert!(matches!(
            read::<char>(&ctx, "xy").unwrap_err(),
            PersistError::Conversion(ConversionError::InvalidScalar { .. })
        ));
    }

    #[test]
    fn converters_override_scalars() {
        let ctx = PersistContext::new();
        ctx.register_converter::<bool>(
            |b| Scalar::Str(if *b { "on" } else { "off" }.into()),
            |s| Ok(s.as_str() == Some("on")),
        )
        .unwrap();

        assert_eq!(write(&ctx, &true), Value::from("on"));
        assert!(read::<bool>(&ctx, "on").unwrap());
        assert!(!read::<bool>(&ctx, "off").unwrap());
    }
}
