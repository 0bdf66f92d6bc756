use crate::info::{LevelInfo, Typed};
use crate::reflection::{FromValue, Reflect};

// -----------------------------------------------------------------------------
// Persist

/// A struct whose persisted fields are described by a [`LevelInfo`] chain.
///
/// This is the object-safe capability behind polymorphic fields: a
/// `Box<dyn Persist>` field is written with a type tag and read back
/// through the [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// Implemented by [`#[derive(Persist)]`](crate::derive::Persist).
pub trait Persist: Reflect {
    /// The stable name written under [`TYPE_TAG_KEY`](crate::TYPE_TAG_KEY).
    fn type_tag(&self) -> &'static str;

    /// The most-derived level of this type.
    fn level_info(&self) -> &'static LevelInfo;
}

// -----------------------------------------------------------------------------
// PersistObject

/// The static side of [`Persist`].
///
/// # Examples
///
/// ```
/// use stow_persist::{Persist, PersistObject};
///
/// #[derive(Persist, Default)]
/// #[persist(tag = "user")]
/// struct User {
///     #[persist]
///     name: String,
///     #[persist(key = "mail")]
///     email: Option<String>,
///     session: u64,
/// }
///
/// assert_eq!(User::TYPE_TAG, "user");
///
/// let level = User::object_level();
/// let keys: Vec<_> = level.fields().iter().map(|f| f.key()).collect();
/// assert_eq!(keys, ["name", "mail"]);
/// ```
pub trait PersistObject: Persist + FromValue + Typed + Default {
    const TYPE_TAG: &'static str;

    fn object_level() -> &'static LevelInfo;
}

// -----------------------------------------------------------------------------
// PersistEnum

/// A field-less enum stored by variant name.
///
/// Implemented by [`#[derive(PersistEnum)]`](crate::derive::PersistEnum).
///
/// ```
/// use stow_persist::PersistEnum;
///
/// #[derive(PersistEnum, Debug, PartialEq)]
/// enum Level {
///     Low,
///     HIGH,
/// }
///
/// assert_eq!(Level::HIGH.variant_name(), "HIGH");
/// assert_eq!(Level::from_variant_name("Low"), Some(Level::Low));
/// assert_eq!(Level::VARIANTS, ["Low", "HIGH"]);
/// ```
pub trait PersistEnum: Reflect + Sized {
    /// Variant names in declaration order.
    const VARIANTS: &'static [&'static str];

    fn variant_name(&self) -> &'static str;

    fn from_variant_name(name: &str) -> Option<Self>;
}
