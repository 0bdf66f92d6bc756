//! Parsed views of the deriving types.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod persist_enum;
mod persist_meta;
mod persist_struct;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};
pub(crate) use persist_enum::PersistEnum;
pub(crate) use persist_meta::PersistMeta;
pub(crate) use persist_struct::PersistStruct;
