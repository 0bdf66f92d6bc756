use proc_macro2::TokenStream;
use quote::quote;
use syn::LitStr;

use crate::derive_data::{PersistMeta, PersistStruct};

/// Generates `Reflect`, `FromValue`, `Typed`, `Persist` and `PersistObject`.
pub(crate) fn impl_struct(info: &PersistStruct) -> TokenStream {
    let meta = &info.meta;
    let path = meta.stow_persist_path();

    let reflect_ = crate::path::reflect_(path);
    let from_value_ = crate::path::from_value_(path);
    let persist_ = crate::path::persist_(path);
    let persist_object_ = crate::path::persist_object_(path);
    let persist_error_ = crate::path::persist_error_(path);
    let value_ = crate::path::value_(path);
    let serializer_ = crate::path::serializer_(path);
    let deserializer_ = crate::path::deserializer_(path);
    let impl_reflect_any_ = crate::path::impl_reflect_any_(path);
    let info_ = crate::path::info_(path);

    // Every impl requires `PersistObject`, which requires `Default`.
    let default_bound = [quote!(::core::default::Default)];
    let reflect_header = meta.impl_header(&reflect_, &default_bound);
    let from_value_header = meta.impl_header(&from_value_, &default_bound);
    let typed_header = meta.impl_header(&quote!(#info_::Typed), &[]);
    let persist_header = meta.impl_header(&persist_, &default_bound);
    let persist_object_header = meta.impl_header(&persist_object_, &default_bound);

    let type_info_body = type_info_body(meta);
    let object_level_body = object_level_body(info);
    let type_tag = meta.type_tag();
    let auto_register = super::get_auto_register_impl(meta);

    quote! {
        #reflect_header {
            #impl_reflect_any_!();

            #[inline]
            fn to_value(
                &self,
                ser: &#serializer_<'_>,
            ) -> ::core::result::Result<::core::option::Option<#value_>, #persist_error_> {
                ser.serialize(self)
                    .map(|mapping| ::core::option::Option::Some(#value_::Mapping(mapping)))
            }

            #[inline]
            fn apply_value(
                &mut self,
                value: #value_,
                de: &#deserializer_<'_>,
            ) -> ::core::result::Result<(), #persist_error_> {
                *self = de.object_from_value::<Self>(value)?;
                ::core::result::Result::Ok(())
            }
        }

        #from_value_header {
            #[inline]
            fn from_value(
                value: #value_,
                de: &#deserializer_<'_>,
            ) -> ::core::result::Result<Self, #persist_error_> {
                de.object_from_value::<Self>(value)
            }
        }

        #typed_header {
            fn type_info() -> &'static #info_::TypeInfo {
                #type_info_body
            }
        }

        #persist_header {
            #[inline]
            fn type_tag(&self) -> &'static str {
                <Self as #persist_object_>::TYPE_TAG
            }

            #[inline]
            fn level_info(&self) -> &'static #info_::LevelInfo {
                <Self as #persist_object_>::object_level()
            }
        }

        #persist_object_header {
            const TYPE_TAG: &'static str = #type_tag;

            fn object_level() -> &'static #info_::LevelInfo {
                #object_level_body
            }
        }

        #auto_register
    }
}

fn type_info_body(meta: &PersistMeta) -> TokenStream {
    let info_ = crate::path::info_(meta.stow_persist_path());
    let build = quote! {
        #info_::TypeInfo::new::<Self>(#info_::TypeKind::Object)
    };

    if meta.impl_with_generic() {
        quote! {
            static CELL: #info_::GenericTypeInfoCell = #info_::GenericTypeInfoCell::new();
            CELL.get_or_insert::<Self>(|| #build)
        }
    } else {
        quote! {
            static CELL: #info_::NonGenericTypeInfoCell = #info_::NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| #build)
        }
    }
}

fn object_level_body(info: &PersistStruct) -> TokenStream {
    let meta = &info.meta;
    let path = meta.stow_persist_path();
    let info_ = crate::path::info_(path);

    let owner = LitStr::new(&meta.ident().to_string(), meta.ident().span());
    let len = info.fields.len();
    let fields = info.fields.iter().map(|field| field.to_info_tokens(path));
    let with_parent = info.parent.as_ref().map(|parent| {
        let parent = parent.to_parent_tokens(path);
        quote!(.with_parent(#parent))
    });

    let build = quote! {{
        let fields: [#info_::FieldInfo; #len] = [#(#fields),*];
        #info_::LevelInfo::new::<Self>(#owner, fields)
            #with_parent
    }};

    if meta.impl_with_generic() {
        quote! {
            static CELL: #info_::GenericLevelInfoCell = #info_::GenericLevelInfoCell::new();
            CELL.get_or_insert::<Self>(|| #build)
        }
    } else {
        quote! {
            static CELL: #info_::NonGenericLevelInfoCell = #info_::NonGenericLevelInfoCell::new();
            CELL.get_or_init(|| #build)
        }
    }
}
