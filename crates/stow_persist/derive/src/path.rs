//! Paths of the `stow_persist` items named by generated code.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// The path of the `stow_persist` crate as seen by the invoking crate.
///
/// 1. Crates depending on `stow_persist` get `::stow_persist`.
/// 2. Crates depending on the `stow` facade get `::stow::persist`.
/// 3. Anything else gets `::stow_persist`, which may not resolve.
///
/// This reads the invoking `Cargo.toml`, so the result is computed once per
/// derive and passed around.
pub(crate) fn stow_persist() -> syn::Path {
    stow_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("stow_persist"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn reflect_(path: &syn::Path) -> TokenStream {
    quote! { #path::Reflect }
}

#[inline(always)]
pub(crate) fn from_value_(path: &syn::Path) -> TokenStream {
    quote! { #path::FromValue }
}

#[inline(always)]
pub(crate) fn persist_value_(path: &syn::Path) -> TokenStream {
    quote! { #path::PersistValue }
}

#[inline(always)]
pub(crate) fn persist_(path: &syn::Path) -> TokenStream {
    quote! { #path::Persist }
}

#[inline(always)]
pub(crate) fn persist_object_(path: &syn::Path) -> TokenStream {
    quote! { #path::PersistObject }
}

#[inline(always)]
pub(crate) fn persist_enum_(path: &syn::Path) -> TokenStream {
    quote! { #path::PersistEnum }
}

#[inline(always)]
pub(crate) fn persist_error_(path: &syn::Path) -> TokenStream {
    quote! { #path::PersistError }
}

#[inline(always)]
pub(crate) fn value_(path: &syn::Path) -> TokenStream {
    quote! { #path::value::Value }
}

#[inline(always)]
pub(crate) fn serializer_(path: &syn::Path) -> TokenStream {
    quote! { #path::ser::Serializer }
}

#[inline(always)]
pub(crate) fn deserializer_(path: &syn::Path) -> TokenStream {
    quote! { #path::de::Deserializer }
}

#[inline(always)]
pub(crate) fn info_(path: &syn::Path) -> TokenStream {
    quote! { #path::info }
}

#[inline(always)]
pub(crate) fn impl_reflect_any_(path: &syn::Path) -> TokenStream {
    quote! { #path::__impl_reflect_any }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(path: &syn::Path) -> TokenStream {
    quote! { #path::__macro_exports::auto_register }
}
