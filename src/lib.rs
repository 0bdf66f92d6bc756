//! Annotation-driven object-graph persistence.
//!
//! This facade re-exports the member crates of the workspace:
//!
//! - [`persist`]: the serialization engine (value tree, schemas, registries, drivers).
//! - [`os`]: synchronization primitives with bounded waits.
//! - [`utils`]: hash containers and [`TypeIdMap`](utils::TypeIdMap).

pub use stow_os as os;
pub use stow_persist as persist;
pub use stow_utils as utils;
