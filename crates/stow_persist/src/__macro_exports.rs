//! Items used by the code generated in `stow_persist_derive`.
//!
//! Not public API.

// -----------------------------------------------------------------------------
// auto_register

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub mod auto_register {
    pub use inventory;

    use crate::registry::TypeRegistry;
    use crate::{PersistError, PersistObject};

    /// A registration function submitted by `#[persist(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn(&TypeRegistry) -> Result<(), PersistError>);

    inventory::collect!(__AutoRegisterFunc);

    // Always submitted, so its absence means static registration is
    // unsupported on this platform.
    fn __available(_: &TypeRegistry) -> Result<(), PersistError> {
        Ok(())
    }

    inventory::submit! {
        __AutoRegisterFunc(__available)
    }

    #[inline]
    pub fn __register_type<T: PersistObject>(registry: &TypeRegistry) -> Result<(), PersistError> {
        registry.register::<T>()
    }

    pub(crate) fn __register_types(registry: &TypeRegistry) -> Result<bool, PersistError> {
        let mut available = false;
        for func in inventory::iter::<__AutoRegisterFunc> {
            available = true;
            (func.0)(registry)?;
        }
        Ok(available)
    }
}
