use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;
use core::time::Duration;

use stow_os::sync::{DEFAULT_LOCK_TIMEOUT, TimedRwLock};
use stow_utils::hash::HashMap;

use crate::{Persist, PersistError, PersistObject};

// -----------------------------------------------------------------------------
// TypeRegistration

/// A concrete type reachable through a type tag.
#[derive(Clone)]
pub struct TypeRegistration {
    tag: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
    factory: fn() -> Box<dyn Persist>,
}

impl TypeRegistration {
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Creates a fresh, default-initialized instance.
    #[inline]
    pub fn construct(&self) -> Box<dyn Persist> {
        (self.factory)()
    }
}

impl fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn construct_default<T: PersistObject>() -> Box<dyn Persist> {
    Box::new(T::default())
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// Maps type tags to constructible concrete types.
///
/// Consulted only when a mapping carries a type tag. Entries are never
/// removed; registering a tag again replaces its entry.
///
/// # Examples
///
/// ```
/// use stow_persist::registry::TypeRegistry;
/// use stow_persist::Persist;
///
/// #[derive(Persist, Default)]
/// #[persist(tag = "circle")]
/// struct Circle {
///     #[persist]
///     radius: f64,
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register::<Circle>().unwrap();
///
/// let registration = registry.resolve("circle").unwrap();
/// assert_eq!(registration.construct().type_tag(), "circle");
/// assert!(registry.resolve("square").unwrap_err().is_unknown_tag());
/// ```
pub struct TypeRegistry {
    types: TimedRwLock<HashMap<Cow<'static, str>, TypeRegistration>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Like [`new`](Self::new), with a custom lock timeout.
    #[inline]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            types: TimedRwLock::new("type registry", timeout, HashMap::default()),
        }
    }

    /// Registers `T` under [`T::TYPE_TAG`](PersistObject::TYPE_TAG).
    #[inline]
    pub fn register<T: PersistObject>(&self) -> Result<(), PersistError> {
        self.register_as::<T>(T::TYPE_TAG)
    }

    /// Registers `T` under `tag`.
    pub fn register_as<T: PersistObject>(
        &self,
        tag: impl Into<Cow<'static, str>>,
    ) -> Result<(), PersistError> {
        self.insert(TypeRegistration {
            tag: tag.into(),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            factory: construct_default::<T>,
        })
    }

    /// Registers a static factory under `tag`.
    ///
    /// The factory is called once here to learn the concrete type it builds.
    pub fn register_factory(
        &self,
        tag: impl Into<Cow<'static, str>>,
        factory: fn() -> Box<dyn Persist>,
    ) -> Result<(), PersistError> {
        let sample = factory();
        let sample: &dyn Persist = &*sample;
        self.insert(TypeRegistration {
            tag: tag.into(),
            type_id: sample.as_any().type_id(),
            type_name: sample.reflect_type_name(),
            factory,
        })
    }

    fn insert(&self, registration: TypeRegistration) -> Result<(), PersistError> {
        let tag = registration.tag.clone();
        let (type_id, type_name) = (registration.type_id, registration.type_name);

        let previous = self
            .types
            .with_write(|types| types.insert(tag.clone(), registration))?;

        if let Some(previous) = previous
            && previous.type_id != type_id
        {
            log::warn!(
                "type tag `{tag}` now resolves to `{type_name}` instead of `{}`",
                previous.type_name
            );
        }
        Ok(())
    }

    /// Looks up the type registered under `tag`.
    pub fn resolve(&self, tag: &str) -> Result<TypeRegistration, PersistError> {
        self.types
            .with_read(|types| types.get(tag).cloned())?
            .ok_or_else(|| PersistError::UnknownTag { tag: tag.into() })
    }

    #[inline]
    pub fn contains(&self, tag: &str) -> Result<bool, PersistError> {
        Ok(self.types.with_read(|types| types.contains_key(tag))?)
    }

    #[inline]
    pub fn len(&self) -> Result<usize, PersistError> {
        Ok(self.types.with_read(|types| types.len())?)
    }

    /// Registers every non-generic type derived with `#[persist(auto_register)]`.
    ///
    /// Returns `true` if static registration works on this platform. With the
    /// `auto_register` feature disabled this does nothing and returns `false`.
    ///
    /// ```no_run
    /// use stow_persist::registry::TypeRegistry;
    /// use stow_persist::Persist;
    ///
    /// #[derive(Persist, Default)]
    /// #[persist(tag = "disk", auto_register)]
    /// struct Disk {
    ///     #[persist]
    ///     size: u64,
    /// }
    ///
    /// let registry = TypeRegistry::new();
    /// assert!(registry.auto_register().unwrap());
    /// assert!(registry.contains("disk").unwrap());
    /// ```
    pub fn auto_register(&self) -> Result<bool, PersistError> {
        #[cfg(feature = "auto_register")]
        {
            crate::__macro_exports::auto_register::__register_types(self)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            Ok(false)
        }
    }
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_map();
        if let Ok(types) = self.types.read() {
            dbg.entries(types.iter().map(|(tag, reg)| (tag, reg.type_name)));
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use super::TypeRegistry;
    use crate::{Persist, PersistObject};

    #[derive(Persist, Default)]
    #[persist(tag = "square")]
    struct Square {
        #[persist]
        side: f64,
    }

    #[derive(Persist, Default)]
    struct Label {
        #[persist]
        text: String,
    }

    #[test]
    fn register_and_resolve() {
        let registry = TypeRegistry::new();
        registry.register::<Square>().unwrap();

        assert!(registry.contains("square").unwrap());
        assert!(!registry.contains("Square").unwrap());

        let registration = registry.resolve("square").unwrap();
        assert_eq!(registration.tag(), "square");
        assert!(registration.type_name().ends_with("Square"));

        let instance = registration.construct();
        assert!(instance.as_any().is::<Square>());
    }

    #[test]
    fn tag_defaults_to_ident() {
        assert_eq!(Label::TYPE_TAG, "Label");
    }

    #[test]
    fn unknown_tag() {
        let registry = TypeRegistry::new();
        let err = registry.resolve("ghost").unwrap_err();
        assert!(err.is_unknown_tag());
        assert!(err.to_string().contains("`ghost`"));
    }

    #[test]
    fn alias_and_factory() {
        let registry = TypeRegistry::new();
        registry.register_as::<Square>("quad").unwrap();
        registry
            .register_factory("note", || Box::new(Label { text: "hi".into() }))
            .unwrap();

        assert_eq!(registry.len().unwrap(), 2);
        assert!(registry.resolve("quad").unwrap().construct().as_any().is::<Square>());

        let note = registry.resolve("note").unwrap();
        assert!(note.type_name().ends_with("Label"));
        let built = note.construct();
        let label = built.as_any().downcast_ref::<Label>().unwrap();
        assert_eq!(label.text, "hi");
    }

    #[test]
    fn last_registration_wins() {
        let registry = TypeRegistry::new();
        registry.register_as::<Square>("shape").unwrap();
        registry.register_as::<Label>("shape").unwrap();

        assert_eq!(registry.len().unwrap(), 1);
        assert!(registry.resolve("shape").unwrap().construct().as_any().is::<Label>());
    }

    #[cfg(feature = "auto_register")]
    #[derive(Persist, Default)]
    #[persist(tag = "auto.disk", auto_register)]
    struct Disk {
        #[persist]
        size: u64,
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_register_collects_marked_types() {
        let registry = TypeRegistry::new();
        assert!(registry.auto_register().unwrap());
        assert!(!registry.contains("square").unwrap());

        let disk = registry.resolve("auto.disk").unwrap();
        assert!(disk.construct().as_any().is::<Disk>());

        let global = crate::PersistContext::global();
        assert!(global.types().contains("auto.disk").unwrap());
    }
}
