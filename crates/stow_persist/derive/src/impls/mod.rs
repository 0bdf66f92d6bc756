//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod enum_impls;
mod struct_impls;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use auto_register::get_auto_register_impl;
pub(crate) use enum_impls::impl_enum;
pub(crate) use struct_impls::impl_struct;
