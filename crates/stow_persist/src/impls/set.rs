use alloc::collections::BTreeSet;
use core::hash::{BuildHasher, Hash};

use stow_utils::hash::hashbrown;

use crate::de::Deserializer;
use crate::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{FromValue, PersistError, PersistValue, Reflect};

macro_rules! impl_set {
    ($set:ty, <$($param:ident),*> where $($bounds:tt)*) => {
        impl<$($param),*> Typed for $set where $($bounds)* {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeInfo::new::<Self>(TypeKind::Set).with_generics([T::type_info()])
                })
            }
        }

        impl<$($param),*> Reflect for $set where $($bounds)* {
            crate::__impl_reflect_any!();

            #[inline]
            fn to_value(&self, ser: &Serializer<'_>) -> Result<Option<Value>, PersistError> {
                ser.serialize_elements(self).map(Some)
            }

            #[inline]
            fn apply_value(&mut self, value: Value, de: &Deserializer<'_>) -> Result<(), PersistError> {
                *self = Self::from_value(value, de)?;
                Ok(())
            }
        }

        impl<$($param),*> FromValue for $set where $($bounds)* {
            /// Duplicate elements collapse.
            #[inline]
            fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
                de.deserialize_elements::<T, Self>(value)
            }
        }
    };
}

impl_set!(BTreeSet<T>, <T> where T: PersistValue + Ord);

impl_set!(
    std::collections::HashSet<T, S>,
    <T, S> where T: PersistValue + Eq + Hash, S: BuildHasher + Default + Send + Sync + 'static
);

impl_set!(
    hashbrown::HashSet<T, S>,
    <T, S> where T: PersistValue + Eq + Hash, S: BuildHasher + Default + Send + Sync + 'static
);

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::vec;

    use stow_utils::hash::HashSet;

    use crate::info::{TypeKind, Typed};
    use crate::value::Value;
    use crate::{FromValue, PersistContext, Reflect};

    #[test]
    fn duplicates_collapse() {
        let ctx = PersistContext::new();
        let value = Value::Sequence(vec![2.into(), 1.into(), 2.into()]);

        let set = BTreeSet::<u8>::from_value(value.clone(), &ctx.deserializer()).unwrap();
        assert_eq!(set.into_iter().collect::<alloc::vec::Vec<_>>(), [1, 2]);

        let set = <HashSet<u8>>::from_value(value, &ctx.deserializer()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sets_write_sequences() {
        let ctx = PersistContext::new();
        let set: BTreeSet<i64> = [5, -5].into_iter().collect();
        let value = set.to_value(&ctx.serializer()).unwrap().unwrap();
        assert_eq!(value, Value::Sequence(vec![(-5).into(), 5.into()]));
        assert_eq!(<BTreeSet<i64>>::type_info().kind(), TypeKind::Set);
    }
}
