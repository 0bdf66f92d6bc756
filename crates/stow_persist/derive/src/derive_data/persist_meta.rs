use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericParam, Generics, Ident, LitStr, WhereClause, parse_quote};

use super::TypeAttributes;

/// What every generated impl needs to know about the deriving type.
pub(crate) struct PersistMeta<'a> {
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
    stow_persist_path: syn::Path,
}

impl<'a> PersistMeta<'a> {
    pub fn new(ast: &'a DeriveInput, attrs: TypeAttributes) -> syn::Result<Self> {
        if let Some(lifetime) = ast.generics.lifetimes().next() {
            return Err(syn::Error::new(
                lifetime.lifetime.span(),
                "persisted types cannot borrow, lifetime parameters are not supported",
            ));
        }

        Ok(Self {
            ident: &ast.ident,
            generics: &ast.generics,
            attrs,
            stow_persist_path: crate::path::stow_persist(),
        })
    }

    #[inline]
    pub fn ident(&self) -> &'a Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn stow_persist_path(&self) -> &syn::Path {
        &self.stow_persist_path
    }

    /// Whether the type has type or const parameters.
    #[inline]
    pub fn impl_with_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }

    /// The type tag: `#[persist(tag = "...")]`, or the type identifier.
    pub fn type_tag(&self) -> LitStr {
        match &self.attrs.tag {
            Some(tag) => tag.clone(),
            None => LitStr::new(&self.ident.to_string(), self.ident.span()),
        }
    }

    /// `impl<...> #trait_ for Ident<...> where ...`, with extra bounds.
    ///
    /// Every type parameter is bound by `PersistValue`.
    pub fn impl_header(&self, trait_: &TokenStream, extra: &[TokenStream]) -> TokenStream {
        let ident = self.ident;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut where_clause: WhereClause = match where_clause {
            Some(where_clause) => where_clause.clone(),
            None => parse_quote!(where),
        };

        let persist_value_ = crate::path::persist_value_(&self.stow_persist_path);
        for param in &self.generics.params {
            if let GenericParam::Type(param) = param {
                let param = &param.ident;
                where_clause
                    .predicates
                    .push(parse_quote!(#param: #persist_value_));
            }
        }
        for bound in extra {
            where_clause
                .predicates
                .push(parse_quote!(#ident #ty_generics: #bound));
        }

        quote! {
            impl #impl_generics #trait_ for #ident #ty_generics #where_clause
        }
    }
}
