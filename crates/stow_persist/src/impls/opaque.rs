/// Declares types that persist only through a registered scalar converter.
///
/// The generated impls look the converter up in the
/// [`ConverterRegistry`](crate::registry::ConverterRegistry) of the running
/// context and fail with [`ConversionError::NoConverter`](crate::ConversionError::NoConverter)
/// if there is none.
///
/// # Examples
///
/// ```
/// use stow_persist::value::Scalar;
/// use stow_persist::{ConversionError, PersistContext, impl_persist_opaque};
///
/// #[derive(Debug, PartialEq)]
/// struct Version(u32, u32);
///
/// impl_persist_opaque!(Version);
///
/// let ctx = PersistContext::new();
/// ctx.register_converter::<Version>(
///     |v| Scalar::Str(format!("{}.{}", v.0, v.1)),
///     |s| {
///         let (major, minor) = s.as_str().and_then(|s| s.split_once('.')).ok_or(
///             ConversionError::InvalidScalar { type_name: "Version", reason: "no dot".into() },
///         )?;
///         let parse = |p: &str| p.parse::<u32>().map_err(|e| ConversionError::InvalidScalar {
///             type_name: "Version",
///             reason: e.to_string().into(),
///         });
///         Ok(Version(parse(major)?, parse(minor)?))
///     },
/// )
/// .unwrap();
///
/// let value = ctx.serializer().serialize_value(&Version(1, 4)).unwrap().unwrap();
/// assert_eq!(value.as_str(), Some("1.4"));
/// assert_eq!(ctx.deserializer().deserialize_value::<Version>(value).unwrap(), Version(1, 4));
/// ```
#[macro_export]
macro_rules! impl_persist_opaque {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::info::Typed for $ty {
            fn type_info() -> &'static $crate::info::TypeInfo {
                static CELL: $crate::info::NonGenericTypeInfoCell =
                    $crate::info::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    $crate::info::TypeInfo::new::<Self>($crate::info::TypeKind::Opaque)
                })
            }
        }

        impl $crate::Reflect for $ty {
            $crate::__impl_reflect_any!();

            #[inline]
            fn to_value(
                &self,
                ser: &$crate::ser::Serializer<'_>,
            ) -> ::core::result::Result<
                ::core::option::Option<$crate::value::Value>,
                $crate::PersistError,
            > {
                $crate::impls::opaque_to_value(self, ser)
            }

            #[inline]
            fn apply_value(
                &mut self,
                value: $crate::value::Value,
                de: &$crate::de::Deserializer<'_>,
            ) -> ::core::result::Result<(), $crate::PersistError> {
                *self = $crate::impls::opaque_from_value(value, de)?;
                ::core::result::Result::Ok(())
            }
        }

        impl $crate::FromValue for $ty {
            #[inline]
            fn from_value(
                value: $crate::value::Value,
                de: &$crate::de::Deserializer<'_>,
            ) -> ::core::result::Result<Self, $crate::PersistError> {
                $crate::impls::opaque_from_value(value, de)
            }
        }
    )+};
}

#[cfg(feature = "uuid")]
crate::impl_persist_opaque!(uuid::Uuid);
