use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Variant};

use super::PersistMeta;

/// A field-less enum deriving `PersistEnum`.
pub(crate) struct PersistEnum<'a> {
    pub meta: PersistMeta<'a>,
    pub variants: Vec<&'a Variant>,
}

impl<'a> PersistEnum<'a> {
    pub fn from_ast(ast: &'a DeriveInput, meta: PersistMeta<'a>) -> syn::Result<Self> {
        let Data::Enum(data) = &ast.data else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`PersistEnum` can only be derived for enums",
            ));
        };
        if meta.impl_with_generic() {
            return Err(syn::Error::new(
                ast.generics.span(),
                "`PersistEnum` does not support generic enums",
            ));
        }

        let mut variants = Vec::with_capacity(data.variants.len());
        for variant in &data.variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.fields.span(),
                    "`PersistEnum` variants cannot carry data",
                ));
            }
            variants.push(variant);
        }

        Ok(Self { meta, variants })
    }
}
