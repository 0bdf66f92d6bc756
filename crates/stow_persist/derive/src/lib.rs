//! Derive macros of `stow_persist`.
//!
//! - [`Persist`]
//! - [`PersistEnum`]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static PERSIST_ATTRIBUTE_NAME: &str = "persist";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Persisted structs
///
/// `#[derive(Persist)]` implements `Reflect`, `FromValue`, `Typed`, `Persist`
/// and `PersistObject` for a struct with named fields. The struct must
/// implement `Default`: it is the starting point of every read.
///
/// Only fields marked with `#[persist]` are written and read.
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// struct Player {
///     #[persist]
///     name: String,
///     #[persist(key = "hp")]
///     health: u32,
///     // not persisted
///     session: u64,
/// }
/// ```
///
/// ## Type tag
///
/// A value stored in a `Box<dyn Persist>` field is written with its type tag,
/// which defaults to the struct identifier. Set a stable tag with:
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// #[persist(tag = "game.player")]
/// struct Player { /* ... */ }
/// ```
///
/// Tags are resolved through the `TypeRegistry`, so the type must be
/// registered before such a value is read back.
///
/// ## auto_register
///
/// With the `auto_register` feature, `#[persist(auto_register)]` registers
/// the type in the global context when it is first used. Generic types are
/// never registered automatically, as their instantiations are unknown.
///
/// ## Inheritance
///
/// A struct extends another by embedding it in a field marked
/// `#[persist(parent)]`. The fields of the base are written into the same
/// mapping, after those of the derived struct. Keys must be unique across
/// the whole chain.
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// struct Entity {
///     #[persist]
///     id: u64,
/// }
///
/// #[derive(Persist, Default)]
/// struct Monster {
///     #[persist(parent)]
///     entity: Entity,
///     #[persist]
///     damage: f32,
/// }
/// ```
///
/// At most one field can be the parent, and it cannot have a `key`.
///
/// ## Generics
///
/// Every type parameter is bound by `PersistValue`. Lifetime parameters are
/// not supported.
#[proc_macro_derive(Persist, attributes(persist))]
pub fn derive_persist(input: TokenStream) -> TokenStream {
    use crate::derive_data::{PersistMeta, PersistStruct, TypeAttributes};

    let ast = parse_macro_input!(input as DeriveInput);

    let result = TypeAttributes::parse_attrs(&ast.attrs)
        .and_then(|attrs| PersistMeta::new(&ast, attrs))
        .and_then(|meta| PersistStruct::from_ast(&ast, meta));

    match result {
        Ok(info) => impls::impl_struct(&info).into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// # Persisted enums
///
/// `#[derive(PersistEnum)]` implements `Reflect`, `FromValue`, `Typed` and
/// `PersistEnum` for an enum whose variants carry no data. Values are written
/// as the variant name, exactly as declared.
///
/// ```rust, ignore
/// #[derive(PersistEnum)]
/// enum GameMode {
///     Survival,
///     Creative,
/// }
/// ```
#[proc_macro_derive(PersistEnum)]
pub fn derive_persist_enum(input: TokenStream) -> TokenStream {
    use crate::derive_data::{PersistEnum, PersistMeta};

    let ast = parse_macro_input!(input as DeriveInput);

    let result = PersistMeta::new(&ast, Default::default())
        .and_then(|meta| PersistEnum::from_ast(&ast, meta));

    match result {
        Ok(info) => impls::impl_enum(&info).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
