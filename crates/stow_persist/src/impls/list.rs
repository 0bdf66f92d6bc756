use alloc::collections::{LinkedList, VecDeque};
use alloc::vec::Vec;

use crate::de::Deserializer;
use crate::info::{GenericTypeInfoCell, TypeInfo, TypeKind, Typed};
use crate::ser::Serializer;
use crate::value::Value;
use crate::{FromValue, PersistError, PersistValue, Reflect};

// Lists are rebuilt from the sequence as a whole.
macro_rules! impl_list {
    ($($list:ident),*) => {$(
        impl<T: PersistValue> Typed for $list<T> {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeInfo::new::<Self>(TypeKind::List).with_generics([T::type_info()])
                })
            }
        }

        impl<T: PersistValue> Reflect for $list<T> {
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

        impl<T: PersistValue> FromValue for $list<T> {
            #[inline]
            fn from_value(value: Value, de: &Deserializer<'_>) -> Result<Self, PersistError> {
                de.deserialize_elements::<T, Self>(value)
            }
        }
    )*};
}

impl_list!(Vec, VecDeque, LinkedList);

#[cfg(test)]
mod tests {
    use alloc::collections::{LinkedList, VecDeque};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::info::{TypeKind, Typed};
    use crate::value::Value;
    use crate::{FromValue, PersistContext, Reflect};

    #[test]
    fn lists_keep_order() {
        let ctx = PersistContext::new();
        let queue: VecDeque<i32> = [3, 1, 2].into_iter().collect();

        let value = queue.to_value(&ctx.serializer()).unwrap().unwrap();
        assert_eq!(value, Value::Sequence(vec![3.into(), 1.into(), 2.into()]));

        let back = LinkedList::<i32>::from_value(value, &ctx.deserializer()).unwrap();
        assert_eq!(back.into_iter().collect::<Vec<_>>(), [3, 1, 2]);
    }

    #[test]
    fn apply_replaces_contents() {
        let ctx = PersistContext::new();
        let mut names: Vec<String> = vec!["a".into(), "b".into()];
        names
            .apply_value(Value::Sequence(vec!["c".into()]), &ctx.deserializer())
            .unwrap();
        assert_eq!(names, ["c"]);
    }

    #[test]
    fn element_types_are_recorded() {
        let info = <Vec<Option<String>>>::type_info();
        assert_eq!(info.kind(), TypeKind::List);
        let element = info.element().unwrap();
        assert_eq!(element.kind(), TypeKind::Optional);
        assert!(element.element().unwrap().is::<String>());
    }
}
