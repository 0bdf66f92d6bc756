//! Process-wide tables consulted by the drivers.
//!
//! - [`ConverterRegistry`]: scalar converters keyed by exact type, plus the
//!   structural enum converter.
//! - [`TypeRegistry`]: type tags to constructible concrete types, used to
//!   read polymorphic values.
//!
//! Both are guarded by a [`TimedRwLock`](stow_os::sync::TimedRwLock), so a
//! lock that cannot be acquired in time fails with
//! [`PersistError::LockTimeout`](crate::PersistError::LockTimeout).

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use converter::ConverterRegistry;
pub use type_registry::{TypeRegistration, TypeRegistry};
