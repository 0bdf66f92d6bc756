//! Small containers shared by the `stow` crates.
//!
//! - [`hash`]: `hashbrown` maps and sets with `foldhash`-based fixed hashing.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId) that skips rehashing.
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
