// -----------------------------------------------------------------------------
// Modules

mod persist;
mod reflect;

// -----------------------------------------------------------------------------
// Exports

pub use persist::{Persist, PersistEnum, PersistObject};
pub use reflect::{FromValue, PersistValue, Reflect};
