use core::any::Any;
use core::time::Duration;

use stow_os::sync::{DEFAULT_LOCK_TIMEOUT, LazyLock};

use crate::de::Deserializer;
use crate::registry::{ConverterRegistry, TypeRegistry};
use crate::schema::SchemaCache;
use crate::ser::Serializer;
use crate::value::{Mapping, Scalar};
use crate::{ConversionError, Persist, PersistError, PersistObject};

// -----------------------------------------------------------------------------
// PersistConfig

/// Run-time settings of a [`PersistContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Wait bound of every registry and cache lock.
    pub lock_timeout: Duration,
}

impl PersistConfig {
    #[inline]
    pub const fn new() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[inline]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl Default for PersistConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// PersistContext

/// The shared state of serialization: converters, tagged types and schemas.
///
/// Contexts are independent of each other. Hosts that do not need isolation
/// use [`PersistContext::global`] through the crate-level functions.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
/// use stow_persist::{Persist, PersistConfig, PersistContext};
///
/// #[derive(Persist, Default)]
/// struct Window {
///     #[persist]
///     width: u32,
///     #[persist]
///     height: u32,
/// }
///
/// let config = PersistConfig::new().with_lock_timeout(Duration::from_secs(1));
/// let ctx = PersistContext::with_config(config);
///
/// let map = ctx.serialize(&Window { width: 640, height: 480 }).unwrap();
///
/// let mut window = Window::default();
/// ctx.deserialize_into(&mut window, map).unwrap();
/// assert_eq!((window.width, window.height), (640, 480));
/// ```
#[derive(Debug)]
pub struct PersistContext {
    config: PersistConfig,
    converters: ConverterRegistry,
    types: TypeRegistry,
    schemas: SchemaCache,
}

impl PersistContext {
    /// Creates a context with the default configuration.
    ///
    /// Types marked `auto_register` are not registered here; see
    /// [`TypeRegistry::auto_register`].
    #[inline]
    pub fn new() -> Self {
        Self::with_config(PersistConfig::new())
    }

    pub fn with_config(config: PersistConfig) -> Self {
        Self {
            config,
            converters: ConverterRegistry::with_timeout(config.lock_timeout),
            types: TypeRegistry::with_timeout(config.lock_timeout),
            schemas: SchemaCache::with_timeout(config.lock_timeout),
        }
    }

    /// The process-wide context, created on first use.
    ///
    /// Every type marked `#[persist(auto_register)]` is registered when it
    /// is created.
    pub fn global() -> &'static PersistContext {
        static GLOBAL: LazyLock<PersistContext> = LazyLock::new(|| {
            let ctx = PersistContext::new();
            match ctx.types.auto_register() {
                Ok(true) => log::debug!("auto-registered tagged types: {:?}", ctx.types),
                Ok(false) => {}
                Err(e) => log::warn!("automatic type registration failed: {e}"),
            }
            ctx
        });
        &GLOBAL
    }

    #[inline]
    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    #[inline]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    #[inline]
    pub fn serializer(&self) -> Serializer<'_> {
        Serializer::new(self)
    }

    #[inline]
    pub fn deserializer(&self) -> Deserializer<'_> {
        Deserializer::new(self)
    }

    /// See [`Serializer::serialize`].
    #[inline]
    pub fn serialize(&self, object: &dyn Persist) -> Result<Mapping, PersistError> {
        self.serializer().serialize(object)
    }

    /// See [`Deserializer::deserialize_into`].
    #[inline]
    pub fn deserialize_into(
        &self,
        target: &mut dyn Persist,
        mapping: Mapping,
    ) -> Result<(), PersistError> {
        self.deserializer().deserialize_into(target, mapping)
    }

    /// See [`ConverterRegistry::register`].
    #[inline]
    pub fn register_converter<T: Any + Send + Sync>(
        &self,
        to_scalar: impl Fn(&T) -> Scalar + Send + Sync + 'static,
        from_scalar: impl Fn(&Scalar) -> Result<T, ConversionError> + Send + Sync + 'static,
    ) -> Result<(), PersistError> {
        self.converters.register(to_scalar, from_scalar)
    }

    /// See [`TypeRegistry::register`].
    #[inline]
    pub fn register_type<T: PersistObject>(&self) -> Result<(), PersistError> {
        self.types.register::<T>()
    }
}

impl Default for PersistContext {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::time::Duration;
    use std::thread;

    use super::{PersistConfig, PersistContext};
    use crate::value::{Mapping, Scalar, Value};
    use crate::{ConversionError, Persist};

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Meters(f64);

    crate::impl_persist_opaque!(Meters);

    #[derive(Persist, Default)]
    struct Track {
        #[persist]
        name: String,
        #[persist]
        length: Meters,
        #[persist]
        laps: Vec<Meters>,
    }

    fn register_meters(ctx: &PersistContext) {
        ctx.register_converter::<Meters>(
            |m| Scalar::Str(alloc::format!("{}m", m.0)),
            |s| {
                s.as_str()
                    .and_then(|s| s.strip_suffix('m'))
                    .and_then(|s| s.parse().ok())
                    .map(Meters)
                    .ok_or(ConversionError::InvalidScalar {
                        type_name: "Meters",
                        reason: "expected `<number>m`".into(),
                    })
            },
        )
        .unwrap();
    }

    #[test]
    fn config_defaults() {
        let config = PersistConfig::default();
        assert_eq!(config.lock_timeout, Duration::from_secs(10));

        let config = config.with_lock_timeout(Duration::from_millis(5));
        let ctx = PersistContext::with_config(config);
        assert_eq!(ctx.config().lock_timeout, Duration::from_millis(5));
    }

    #[test]
    fn opaque_types_need_a_converter() {
        let ctx = PersistContext::new();
        let track = Track {
            name: "oval".into(),
            length: Meters(400.0),
            laps: Vec::new(),
        };

        let err = ctx.serialize(&track).unwrap_err();
        assert!(matches!(
            err.root(),
            crate::PersistError::Conversion(ConversionError::NoConverter { .. })
        ));

        register_meters(&ctx);
        let map = ctx.serialize(&track).unwrap();
        assert_eq!(map.get("length"), Some(&Value::from("400m")));

        let mut back = Track::default();
        ctx.deserialize_into(&mut back, map).unwrap();
        assert_eq!(back.length, Meters(400.0));
        assert_eq!(back.name, "oval");
    }

    #[test]
    fn contexts_are_isolated() {
        let first = PersistContext::new();
        let second = PersistContext::new();
        register_meters(&first);
        first.register_type::<Track>().unwrap();

        assert!(first.converters().has_type::<Meters>().unwrap());
        assert!(!second.converters().has_type::<Meters>().unwrap());
        assert!(first.types().contains("Track").unwrap());
        assert!(!second.types().contains("Track").unwrap());
    }

    #[test]
    fn concurrent_registration_and_serialization() {
        let ctx = PersistContext::new();
        register_meters(&ctx);

        thread::scope(|s| {
            for i in 0..4 {
                let ctx = &ctx;
                s.spawn(move || {
                    for n in 0..50 {
                        let track = Track {
                            name: alloc::format!("t{i}-{n}"),
                            length: Meters(f64::from(n)),
                            laps: alloc::vec![Meters(1.0); 3],
                        };
                        let map = ctx.serialize(&track).unwrap();
                        let laps = map.get("laps").and_then(Value::as_sequence).unwrap();
                        assert_eq!(laps.len(), 3);
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..50 {
                    register_meters(&ctx);
                }
            });
        });

        assert_eq!(ctx.schemas().len().unwrap(), 1);
    }

    struct Tick<const N: usize>;

    fn register_tick<const N: usize>(ctx: &PersistContext) {
        ctx.register_converter::<Tick<N>>(|_| Scalar::Int(N as i64), |_| Ok(Tick))
            .unwrap();
    }

    #[test]
    fn concurrent_registries_lose_nothing() {
        let ctx = PersistContext::new();
        register_meters(&ctx);
        let converters = ctx.converters().len().unwrap();
        let types = ctx.types().len().unwrap();

        let ticks: [fn(&PersistContext); 4] = [
            register_tick::<0>,
            register_tick::<1>,
            register_tick::<2>,
            register_tick::<3>,
        ];

        thread::scope(|s| {
            for (i, register) in ticks.into_iter().enumerate() {
                let ctx = &ctx;
                s.spawn(move || {
                    register(ctx);
                    let tag = alloc::format!("track-{i}");
                    ctx.types().register_as::<Track>(tag.clone()).unwrap();
                    assert!(ctx.types().resolve(&tag).is_ok());
                });
            }
            for i in 0..4 {
                let ctx = &ctx;
                s.spawn(move || {
                    for n in 0..25 {
                        let track = Track {
                            name: alloc::format!("r{i}-{n}"),
                            length: Meters(f64::from(n)),
                            laps: alloc::vec![Meters(2.0)],
                        };
                        let map = ctx.serialize(&track).unwrap();
                        let mut back = Track::default();
                        ctx.deserialize_into(&mut back, map).unwrap();
                        assert_eq!(back.name, track.name);
                        assert_eq!(back.laps, track.laps);
                    }
                });
            }
        });

        assert_eq!(ctx.converters().len().unwrap(), converters + 4);
        assert_eq!(ctx.types().len().unwrap(), types + 4);
        assert!(ctx.converters().has_type::<Tick<0>>().unwrap());
        assert!(ctx.converters().has_type::<Tick<1>>().unwrap());
        assert!(ctx.converters().has_type::<Tick<2>>().unwrap());
        assert!(ctx.converters().has_type::<Tick<3>>().unwrap());
        for i in 0..4 {
            assert!(ctx.types().contains(&alloc::format!("track-{i}")).unwrap());
        }
    }

    #[test]
    fn global_is_shared() {
        let a: *const PersistContext = PersistContext::global();
        let b: *const PersistContext = PersistContext::global();
        assert_eq!(a, b);

        let map: Mapping = [("name", "x")].into_iter().collect();
        let mut track = Track::default();
        crate::deserialize_into(&mut track, map).unwrap();
        assert_eq!(track.name, "x");
    }
}
