use proc_macro2::TokenStream;
use quote::quote;
use syn::LitStr;
use syn::ext::IdentExt;

use crate::derive_data::PersistEnum;

/// Generates `Reflect`, `FromValue`, `Typed` and `PersistEnum`.
pub(crate) fn impl_enum(info: &PersistEnum) -> TokenStream {
    let meta = &info.meta;
    let path = meta.stow_persist_path();
    let ident = meta.ident();

    let reflect_ = crate::path::reflect_(path);
    let from_value_ = crate::path::from_value_(path);
    let persist_enum_ = crate::path::persist_enum_(path);
    let persist_error_ = crate::path::persist_error_(path);
    let value_ = crate::path::value_(path);
    let serializer_ = crate::path::serializer_(path);
    let deserializer_ = crate::path::deserializer_(path);
    let impl_reflect_any_ = crate::path::impl_reflect_any_(path);
    let info_ = crate::path::info_(path);

    let variants = info.variants.iter().map(|variant| &variant.ident);
    let names: Vec<LitStr> = info
        .variants
        .iter()
        .map(|variant| LitStr::new(&variant.ident.unraw().to_string(), variant.ident.span()))
        .collect();

    let to_name = variants.clone().zip(&names).map(|(variant, name)| {
        quote!(Self::#variant => #name)
    });
    let from_name = variants.zip(&names).map(|(variant, name)| {
        quote!(#name => ::core::option::Option::Some(Self::#variant))
    });

    quote! {
        impl #reflect_ for #ident {
            #impl_reflect_any_!();

            #[inline]
            fn to_value(
                &self,
                ser: &#serializer_<'_>,
            ) -> ::core::result::Result<::core::option::Option<#value_>, #persist_error_> {
                ser.convert_enum(self).map(::core::option::Option::Some)
            }

            #[inline]
            fn apply_value(
                &mut self,
                value: #value_,
                de: &#deserializer_<'_>,
            ) -> ::core::result::Result<(), #persist_error_> {
                *self = de.convert_enum::<Self>(value)?;
                ::core::result::Result::Ok(())
            }
        }

        impl #from_value_ for #ident {
            #[inline]
            fn from_value(
                value: #value_,
                de: &#deserializer_<'_>,
            ) -> ::core::result::Result<Self, #persist_error_> {
                de.convert_enum::<Self>(value)
            }
        }

        impl #info_::Typed for #ident {
            fn type_info() -> &'static #info_::TypeInfo {
                static CELL: #info_::NonGenericTypeInfoCell = #info_::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| #info_::TypeInfo::new::<Self>(#info_::TypeKind::Enum))
            }
        }

        impl #persist_enum_ for #ident {
            const VARIANTS: &'static [&'static str] = &[#(#names),*];

            fn variant_name(&self) -> &'static str {
                match *self {
                    #(#to_name,)*
                }
            }

            fn from_variant_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#from_name,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
