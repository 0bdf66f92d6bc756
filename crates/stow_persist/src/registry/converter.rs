use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;
use core::time::Duration;

use stow_os::sync::{Arc, DEFAULT_LOCK_TIMEOUT, TimedRwLock};
use stow_utils::TypeIdMap;

use crate::value::Scalar;
use crate::{ConversionError, PersistEnum, PersistError};

type ToScalarFn = dyn Fn(&dyn Any) -> Option<Scalar> + Send + Sync;
type FromScalarFn = dyn Fn(&Scalar) -> Result<Box<dyn Any>, ConversionError> + Send + Sync;

// -----------------------------------------------------------------------------
// ScalarConverter

#[derive(Clone)]
struct ScalarConverter {
    type_name: &'static str,
    to: Arc<ToScalarFn>,
    from: Arc<FromScalarFn>,
}

impl ScalarConverter {
    fn new<T: Any + Send + Sync>(
        to: impl Fn(&T) -> Scalar + Send + Sync + 'static,
        from: impl Fn(&Scalar) -> Result<T, ConversionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            to: Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().map(&to)),
            from: Arc::new(move |scalar: &Scalar| {
                from(scalar).map(|value| Box::new(value) as Box<dyn Any>)
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// Bidirectional conversions between scalar-like types and [`Scalar`]s.
///
/// Entries are keyed by exact type identity. Enums are covered
/// structurally by [`enum_to_scalar`](Self::enum_to_scalar) and
/// [`enum_from_scalar`](Self::enum_from_scalar), which map every
/// [`PersistEnum`] to its variant name unless a converter for that exact
/// enum is registered.
///
/// Entries are never removed. Registering a type again replaces its
/// converter.
///
/// # Examples
///
/// ```
/// use stow_persist::registry::ConverterRegistry;
/// use stow_persist::value::Scalar;
/// use stow_persist::ConversionError;
///
/// #[derive(Debug, PartialEq)]
/// struct Port(u16);
///
/// let registry = ConverterRegistry::new();
/// registry
///     .register::<Port>(
///         |p| Scalar::Int(p.0.into()),
///         |s| match s {
///             Scalar::Int(v) => u16::try_from(*v).map(Port).map_err(|_| {
///                 ConversionError::OutOfRange { type_name: "Port", value: v.to_string().into() }
///             }),
///             other => Err(ConversionError::Mismatch { expected: "integer", found: other.kind_name() }),
///         },
///     )
///     .unwrap();
///
/// assert_eq!(registry.to_scalar(&Port(8080)).unwrap(), Some(Scalar::Int(8080)));
/// assert_eq!(registry.from_scalar::<Port>(&Scalar::Int(22)).unwrap(), Some(Port(22)));
/// ```
pub struct ConverterRegistry {
    converters: TimedRwLock<TypeIdMap<ScalarConverter>>,
}

impl ConverterRegistry {
    /// Creates a registry holding the built-in converters.
    #[inline]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Like [`new`](Self::new), with a custom lock timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        #[cfg_attr(not(feature = "uuid"), expect(unused_mut, reason = "no built-ins"))]
        let mut converters = TypeIdMap::new();

        #[cfg(feature = "uuid")]
        converters.insert_type::<uuid::Uuid>(uuid_converter());

        Self {
            converters: TimedRwLock::new("converter registry", timeout, converters),
        }
    }

    /// Registers the converter pair of `T`, replacing any previous one.
    pub fn register<T: Any + Send + Sync>(
        &self,
        to_scalar: impl Fn(&T) -> Scalar + Send + Sync + 'static,
        from_scalar: impl Fn(&Scalar) -> Result<T, ConversionError> + Send + Sync + 'static,
    ) -> Result<(), PersistError> {
        let converter = ScalarConverter::new(to_scalar, from_scalar);
        let replaced = self
            .converters
            .with_write(|map| map.insert_type::<T>(converter))?;
        if let Some(old) = replaced {
            log::debug!("replaced the scalar converter of `{}`", old.type_name);
        }
        Ok(())
    }

    /// Returns whether a converter is registered for exactly `type_id`.
    #[inline]
    pub fn has(&self, type_id: TypeId) -> Result<bool, PersistError> {
        Ok(self.converters.with_read(|map| map.contains(&type_id))?)
    }

    #[inline]
    pub fn has_type<T: Any>(&self) -> Result<bool, PersistError> {
        self.has(TypeId::of::<T>())
    }

    /// Number of registered converters.
    #[inline]
    pub fn len(&self) -> Result<usize, PersistError> {
        Ok(self.converters.with_read(|map| map.len())?)
    }

    fn get(&self, type_id: TypeId) -> Result<Option<ScalarConverter>, PersistError> {
        // The entry is cloned so that no lock is held while user code runs.
        Ok(self
            .converters
            .with_read(|map| map.get(&type_id).cloned())?)
    }

    /// Converts `value` with the converter of its concrete type.
    ///
    /// Returns `Ok(None)` if that type has no converter.
    pub fn to_scalar(&self, value: &dyn Any) -> Result<Option<Scalar>, PersistError> {
        Ok(self
            .get(value.type_id())?
            .and_then(|converter| (converter.to)(value)))
    }

    /// Builds a `T` with its converter.
    ///
    /// Returns `Ok(None)` if `T` has no converter.
    pub fn from_scalar<T: Any>(&self, scalar: &Scalar) -> Result<Option<T>, PersistError> {
        let Some(converter) = self.get(TypeId::of::<T>())? else {
            return Ok(None);
        };
        match (converter.from)(scalar)?.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => Err(ConversionError::NoConverter {
                type_name: core::any::type_name::<T>(),
            }
            .into()),
        }
    }

    /// Converts an enum value, by variant name unless `E` has its own converter.
    pub fn enum_to_scalar<E: PersistEnum>(&self, value: &E) -> Result<Scalar, PersistError> {
        match self.to_scalar(value.as_any())? {
            Some(scalar) => Ok(scalar),
            None => Ok(Scalar::Str(value.variant_name().into())),
        }
    }

    /// Inverse of [`enum_to_scalar`](Self::enum_to_scalar).
    pub fn enum_from_scalar<E: PersistEnum>(&self, scalar: &Scalar) -> Result<E, PersistError> {
        if let Some(value) = self.from_scalar::<E>(scalar)? {
            return Ok(value);
        }
        let name = scalar.as_str().ok_or(ConversionError::Mismatch {
            expected: "string",
            found: scalar.kind_name(),
        })?;
        E::from_variant_name(name).ok_or_else(|| {
            ConversionError::UnknownVariant {
                enum_name: core::any::type_name::<E>(),
                name: name.into(),
            }
            .into()
        })
    }
}

impl Default for ConverterRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_set();
        if let Ok(map) = self.converters.read() {
            dbg.entries(map.values().map(|c| c.type_name));
        }
        dbg.finish()
    }
}

#[cfg(feature = "uuid")]
fn uuid_converter() -> ScalarConverter {
    use alloc::string::ToString;
    use uuid::Uuid;

    ScalarConverter::new::<Uuid>(
        |id| Scalar::Str(id.hyphenated().to_string()),
        |scalar| match scalar {
            Scalar::Str(s) => Uuid::parse_str(s).map_err(|e| ConversionError::InvalidScalar {
                type_name: "Uuid",
                reason: e.to_string().into(),
            }),
            other => Err(ConversionError::Mismatch {
                expected: "string",
                found: other.kind_name(),
            }),
        },
    )
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::ConverterRegistry;
    use crate::value::Scalar;
    use crate::{ConversionError, PersistEnum, PersistError};

    #[derive(Debug, PartialEq)]
    struct Meters(u32);

    fn meters_registry(suffix: &'static str) -> ConverterRegistry {
        let registry = ConverterRegistry::new();
        registry
            .register::<Meters>(
                move |m| Scalar::Str(alloc::format!("{}{suffix}", m.0)),
                |s| {
                    let text = s.as_str().unwrap_or_default();
                    text.trim_end_matches(char::is_alphabetic)
                        .parse()
                        .map(Meters)
                        .map_err(|_| ConversionError::InvalidScalar {
                            type_name: "Meters",
                            reason: "not a length".into(),
                        })
                },
            )
            .unwrap();
        registry
    }

    #[test]
    fn register_and_convert() {
        let registry = meters_registry("m");
        assert!(registry.has_type::<Meters>().unwrap());
        assert!(!registry.has_type::<String>().unwrap());

        let scalar = registry.to_scalar(&Meters(12)).unwrap().unwrap();
        assert_eq!(scalar, Scalar::Str("12m".into()));
        assert_eq!(
            registry.from_scalar::<Meters>(&scalar).unwrap(),
            Some(Meters(12))
        );

        // types without converters
        assert_eq!(registry.to_scalar(&7_u8).unwrap(), None);
        assert_eq!(registry.from_scalar::<u8>(&Scalar::Int(7)).unwrap(), None);
    }

    #[test]
    fn last_registration_wins() {
        let registry = meters_registry("m");
        let before = registry.len().unwrap();
        registry
            .register::<Meters>(|m| Scalar::Int(m.0.into()), |_| Ok(Meters(0)))
            .unwrap();

        assert_eq!(registry.len().unwrap(), before);
        assert_eq!(registry.to_scalar(&Meters(3)).unwrap(), Some(Scalar::Int(3)));
    }

    #[test]
    fn converter_errors_propagate() {
        let registry = meters_registry("m");
        let err = registry
            .from_scalar::<Meters>(&Scalar::Str("far".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            PersistError::Conversion(ConversionError::InvalidScalar { .. })
        ));
    }

    #[derive(PersistEnum, Debug, PartialEq)]
    enum Mode {
        Read,
        ReadWrite,
    }

    #[test]
    fn enums_are_structural() {
        let registry = ConverterRegistry::new();
        assert!(!registry.has_type::<Mode>().unwrap());

        let scalar = registry.enum_to_scalar(&Mode::ReadWrite).unwrap();
        assert_eq!(scalar, Scalar::Str("ReadWrite".into()));
        assert_eq!(registry.enum_from_scalar::<Mode>(&scalar).unwrap(), Mode::ReadWrite);

        let err = registry
            .enum_from_scalar::<Mode>(&Scalar::Str("Append".into()))
            .unwrap_err();
        assert!(err.to_string().contains("`Append`"));
        assert!(registry.enum_from_scalar::<Mode>(&Scalar::Int(0)).is_err());
    }

    #[test]
    fn exact_enum_converter_takes_precedence() {
        let registry = ConverterRegistry::new();
        registry
            .register::<Mode>(
                |m| Scalar::Str(m.variant_name().to_lowercase()),
                |s| match s.as_str() {
                    Some("read") => Ok(Mode::Read),
                    _ => Ok(Mode::ReadWrite),
                },
            )
            .unwrap();

        assert_eq!(
            registry.enum_to_scalar(&Mode::Read).unwrap(),
            Scalar::Str("read".to_string())
        );
        assert_eq!(
            registry
                .enum_from_scalar::<Mode>(&Scalar::Str("read".into()))
                .unwrap(),
            Mode::Read
        );
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn uuid_is_built_in() {
        let registry = ConverterRegistry::new();
        let id = uuid::Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8);

        let scalar = registry.to_scalar(&id).unwrap().unwrap();
        assert_eq!(
            scalar,
            Scalar::Str("67e55044-10b1-426f-9247-bb680e5fe0c8".into())
        );
        assert_eq!(registry.from_scalar::<uuid::Uuid>(&scalar).unwrap(), Some(id));
        assert!(
            registry
                .from_scalar::<uuid::Uuid>(&Scalar::Str("nope".into()))
                .is_err()
        );
    }
}
