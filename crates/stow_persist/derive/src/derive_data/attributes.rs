//! Parsing of `#[persist(...)]` attributes.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Meta};

use crate::PERSIST_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// Container attributes.
///
/// - `#[persist(tag = "...")]`
/// - `#[persist(auto_register)]`
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub tag: Option<LitStr>,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(PERSIST_ATTRIBUTE_NAME) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    if this.tag.is_some() {
                        return Err(meta.error("duplicate `tag` attribute"));
                    }
                    let tag: LitStr = meta.value()?.parse()?;
                    if tag.value().is_empty() {
                        return Err(syn::Error::new(tag.span(), "type tags cannot be empty"));
                    }
                    this.tag = Some(tag);
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    if this.auto_register.is_some() {
                        return Err(meta.error("duplicate `auto_register` attribute"));
                    }
                    this.auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("unknown container attribute, expected `tag` or `auto_register`"))
                }
            })?;
        }

        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field attributes.
///
/// - `#[persist]`: persisted under the field name.
/// - `#[persist(key = "...")]`: persisted under another key.
/// - `#[persist(parent)]`: the embedded base struct.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub persist: bool,
    pub key: Option<LitStr>,
    pub parent: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(PERSIST_ATTRIBUTE_NAME) {
                continue;
            }
            this.persist = true;

            if let Meta::Path(_) = attr.meta {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    if this.key.is_some() {
                        return Err(meta.error("duplicate `key` attribute"));
                    }
                    let key: LitStr = meta.value()?.parse()?;
                    if key.value().is_empty() {
                        return Err(syn::Error::new(key.span(), "keys cannot be empty"));
                    }
                    this.key = Some(key);
                    Ok(())
                } else if meta.path.is_ident("parent") {
                    if this.parent.is_some() {
                        return Err(meta.error("duplicate `parent` attribute"));
                    }
                    this.parent = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("unknown field attribute, expected `key` or `parent`"))
                }
            })?;
        }

        if let (Some(span), Some(_)) = (this.parent, &this.key) {
            return Err(syn::Error::new(
                span,
                "a `parent` field has no key of its own, remove `key`",
            ));
        }

        Ok(this)
    }
}
