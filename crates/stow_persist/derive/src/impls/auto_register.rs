use proc_macro2::TokenStream;

use crate::derive_data::PersistMeta;

/// Submits the registration of a non-generic type to `inventory`.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &PersistMeta) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = meta.attrs().auto_register else {
        return TokenStream::new();
    };
    // The instantiations of a generic type are unknown here.
    if meta.impl_with_generic() {
        return TokenStream::new();
    }

    let auto_register_ = crate::path::auto_register_(meta.stow_persist_path());
    let ident = meta.ident();

    quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::__AutoRegisterFunc(
                #auto_register_::__register_type::<#ident>
            )
        }
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &PersistMeta) -> TokenStream {
    TokenStream::new()
}
