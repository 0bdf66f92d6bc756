use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr, Type};

use super::{FieldAttributes, PersistMeta};

// -----------------------------------------------------------------------------
// Define

/// A struct deriving `Persist`.
pub(crate) struct PersistStruct<'a> {
    pub meta: PersistMeta<'a>,
    /// Fields marked `#[persist]` or `#[persist(key = "...")]`, in declaration order.
    pub fields: Vec<StructField<'a>>,
    /// The field marked `#[persist(parent)]`.
    pub parent: Option<StructField<'a>>,
}

pub(crate) struct StructField<'a> {
    pub data: &'a Field,
    pub ident: &'a Ident,
    pub attrs: FieldAttributes,
}

// -----------------------------------------------------------------------------
// Parsing

impl<'a> PersistStruct<'a> {
    pub fn from_ast(ast: &'a DeriveInput, meta: PersistMeta<'a>) -> syn::Result<Self> {
        let Data::Struct(data) = &ast.data else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Persist` can only be derived for structs, use `PersistEnum` for enums",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new(
                data.fields.span(),
                "`Persist` requires a struct with named fields",
            ));
        };

        let mut fields = Vec::new();
        let mut parent: Option<StructField<'a>> = None;

        for field in &named.named {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            if !attrs.persist {
                continue;
            }
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let field = StructField {
                data: field,
                ident,
                attrs,
            };

            if let Some(span) = field.attrs.parent {
                if parent.is_some() {
                    return Err(syn::Error::new(span, "only one field can be the `parent`"));
                }
                parent = Some(field);
            } else {
                fields.push(field);
            }
        }

        Ok(Self {
            meta,
            fields,
            parent,
        })
    }
}

// -----------------------------------------------------------------------------
// StructField

impl StructField<'_> {
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.data.ty
    }

    /// The Rust name, without the `r#` prefix.
    pub fn name(&self) -> LitStr {
        LitStr::new(&self.ident.unraw().to_string(), self.ident.span())
    }

    /// The key in the value tree.
    pub fn key(&self) -> LitStr {
        match &self.attrs.key {
            Some(key) => key.clone(),
            None => self.name(),
        }
    }

    /// `FieldInfo::new::<T>(name, key, get, get_mut)`
    pub fn to_info_tokens(&self, path: &syn::Path) -> TokenStream {
        let info_ = crate::path::info_(path);
        let reflect_ = crate::path::reflect_(path);
        let ty = self.ty();
        let ident = self.ident;
        let name = self.name();
        let key = self.key();

        quote! {
            #info_::FieldInfo::new::<#ty>(
                #name,
                #key,
                |owner: &dyn ::core::any::Any| {
                    owner
                        .downcast_ref::<Self>()
                        .map(|this| &this.#ident as &dyn #reflect_)
                },
                |owner: &mut dyn ::core::any::Any| {
                    owner
                        .downcast_mut::<Self>()
                        .map(|this| &mut this.#ident as &mut dyn #reflect_)
                },
            )
        }
    }

    /// `ParentInfo::new::<P>(field, get, get_mut)`
    pub fn to_parent_tokens(&self, path: &syn::Path) -> TokenStream {
        let info_ = crate::path::info_(path);
        let ty = self.ty();
        let ident = self.ident;
        let name = self.name();

        quote! {
            #info_::ParentInfo::new::<#ty>(
                #name,
                |owner: &dyn ::core::any::Any| {
                    owner
                        .downcast_ref::<Self>()
                        .map(|this| &this.#ident as &dyn ::core::any::Any)
                },
                |owner: &mut dyn ::core::any::Any| {
                    owner
                        .downcast_mut::<Self>()
                        .map(|this| &mut this.#ident as &mut dyn ::core::any::Any)
                },
            )
        }
    }
}
