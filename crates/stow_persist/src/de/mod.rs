//! Value trees to typed objects.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::context::PersistContext;
use crate::error::Operation;
use crate::value::{Mapping, Scalar, Value};
use crate::{ConversionError, FromValue, PersistEnum, PersistError, TYPE_TAG_KEY};
use crate::{Persist, PersistObject};

// -----------------------------------------------------------------------------
// Deserializer

/// Reads [`Mapping`]s back into objects.
///
/// The root object is updated in place: a key missing from the mapping
/// leaves its field untouched, and unknown keys are ignored. Nested objects
/// are rebuilt from their default.
///
/// # Examples
///
/// ```
/// use stow_persist::{Persist, PersistContext};
/// use stow_persist::value::Mapping;
///
/// #[derive(Persist)]
/// struct Limits {
///     #[persist]
///     max_players: u32,
///     #[persist]
///     timeout: f64,
/// }
///
/// impl Default for Limits {
///     fn default() -> Self {
///         Self { max_players: 20, timeout: 30.0 }
///     }
/// }
///
/// let ctx = PersistContext::new();
/// let mut limits = Limits::default();
///
/// let source: Mapping = [("timeout", 2.5)].into_iter().collect();
/// ctx.deserializer().deserialize_into(&mut limits, source).unwrap();
///
/// assert_eq!(limits.max_players, 20);
/// assert_eq!(limits.timeout, 2.5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'a> {
    ctx: &'a PersistContext,
}

impl<'a> Deserializer<'a> {
    #[inline]
    pub fn new(ctx: &'a PersistContext) -> Self {
        Self { ctx }
    }

    #[inline]
    pub fn context(&self) -> &'a PersistContext {
        self.ctx
    }

    /// Applies `mapping` to `target` and its bases, most-derived level first.
    ///
    /// Each key is consumed by the first field that claims it. The walk stops
    /// as soon as every key is consumed; keys left over at the end are ignored.
    pub fn deserialize_into(
        &self,
        target: &mut dyn Persist,
        mut mapping: Mapping,
    ) -> Result<(), PersistError> {
        let schema = self.ctx.schemas().get_or_resolve(target.level_info())?;
        mapping.remove(TYPE_TAG_KEY);

        let mut current: Option<&mut dyn Any> = Some(target.as_any_mut());

        for level in schema.levels() {
            if mapping.is_empty() {
                break;
            }
            let Some(owner) = current else { break };

            for field in level.fields() {
                let Some(value) = mapping.remove(field.key()) else {
                    continue;
                };
                field
                    .get_mut(&mut *owner)
                    .map_err(PersistError::from)
                    .and_then(|slot| slot.apply_value(value, self))
                    .map_err(|e| {
                        e.in_field(Operation::Deserialize, field.owner(), field.name(), field.key())
                    })?;
            }

            current = level.parent_of_mut(owner)?;
        }

        if !mapping.is_empty() {
            log::trace!(
                "`{}` ignored unknown keys {:?}",
                schema.type_name(),
                mapping.keys().collect::<Vec<_>>()
            );
        }
        Ok(())
    }

    /// Builds a `T` from its default value and `mapping`.
    #[inline]
    pub fn deserialize_new<T: PersistObject>(&self, mapping: Mapping) -> Result<T, PersistError> {
        let mut object = T::default();
        self.deserialize_into(&mut object, mapping)?;
        Ok(object)
    }

    /// Builds any persisted value from a tree node.
    #[inline]
    pub fn deserialize_value<T: FromValue>(&self, value: Value) -> Result<T, PersistError> {
        T::from_value(value, self)
    }

    /// Builds the concrete type named by the mapping's type tag.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::MissingTag`] if the mapping has no tag.
    /// - [`PersistError::UnknownTag`] if no type is registered under the tag.
    pub fn deserialize_tagged(&self, mut mapping: Mapping) -> Result<Box<dyn Persist>, PersistError> {
        let tag = match mapping.remove(TYPE_TAG_KEY) {
            Some(Value::Scalar(Scalar::Str(tag))) => tag,
            Some(other) => {
                return Err(ConversionError::Mismatch {
                    expected: "a string type tag",
                    found: other.kind_name(),
                }
                .into());
            }
            None => return Err(ConversionError::MissingTag.into()),
        };

        let registration = self.ctx.types().resolve(&tag)?;
        let mut object = registration.construct();
        self.deserialize_into(&mut *object, mapping)?;
        Ok(object)
    }

    /// Builds a persisted struct from a nested mapping, starting from its
    /// default.
    pub fn object_from_value<T: PersistObject>(&self, value: Value) -> Result<T, PersistError> {
        let mut object = T::default();
        self.deserialize_into(&mut object, expect_mapping(value)?)?;
        Ok(object)
    }

    /// Builds a collection from a sequence, converting each element.
    pub fn deserialize_elements<T, C>(&self, value: Value) -> Result<C, PersistError>
    where
        T: FromValue,
        C: FromIterator<T>,
    {
        expect_sequence(value)?
            .into_iter()
            .map(|element| T::from_value(element, self))
            .collect()
    }

    /// Applies the registered converter of `T`, if any.
    #[inline]
    pub fn convert_scalar<T: Any>(&self, scalar: &Scalar) -> Result<Option<T>, PersistError> {
        self.ctx.converters().from_scalar::<T>(scalar)
    }

    /// Reads an enum by variant name, or by its own converter if registered.
    pub fn convert_enum<E: PersistEnum>(&self, value: Value) -> Result<E, PersistError> {
        let scalar = expect_scalar(value)?;
        self.ctx.converters().enum_from_scalar::<E>(&scalar)
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Unwraps a scalar node.
pub fn expect_scalar(value: Value) -> Result<Scalar, ConversionError> {
    match value {
        Value::Scalar(scalar) => Ok(scalar),
        other => Err(ConversionError::Mismatch {
            expected: "a scalar",
            found: other.kind_name(),
        }),
    }
}

/// Unwraps a sequence node.
pub fn expect_sequence(value: Value) -> Result<Vec<Value>, ConversionError> {
    match value {
        Value::Sequence(sequence) => Ok(sequence),
        other => Err(ConversionError::Mismatch {
            expected: "a sequence",
            found: other.kind_name(),
        }),
    }
}

/// Unwraps a mapping node.
pub fn expect_mapping(value: Value) -> Result<Mapping, ConversionError> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ConversionError::Mismatch {
            expected: "a mapping",
            found: other.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::{BTreeSet, HashSet};

    use crate::value::{Mapping, Value};
    use crate::{ConversionError, Persist, PersistContext, PersistEnum, PersistError};
    use crate::{PersistObject, TYPE_TAG_KEY};

    #[derive(PersistEnum, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Role {
        #[default]
        Guest,
        ADMIN,
    }

    #[derive(Persist, Debug, Default, PartialEq)]
    struct Account {
        #[persist]
        name: String,
        #[persist]
        roles: BTreeSet<Role>,
        #[persist]
        quota: Option<u32>,
    }

    #[derive(Persist, Debug, Default, PartialEq)]
    #[persist(tag = "premium")]
    struct Premium {
        #[persist(parent)]
        account: Account,
        #[persist]
        level: u8,
    }

    #[derive(Persist, Default)]
    struct Directory {
        #[persist]
        owner: Account,
        #[persist]
        members: Vec<Box<dyn Persist>>,
        #[persist]
        featured: Option<Box<dyn Persist>>,
        #[persist]
        limits: [u16; 3],
        #[persist]
        flags: HashSet<String>,
        #[persist(key = "ver")]
        version: i64,
    }

    fn alice() -> Account {
        Account {
            name: "alice".into(),
            roles: [Role::Guest, Role::ADMIN].into_iter().collect(),
            quota: Some(5),
        }
    }

    #[test]
    fn round_trip_with_inheritance() {
        let ctx = PersistContext::new();
        let premium = Premium {
            account: alice(),
            level: 3,
        };

        let map = ctx.serializer().serialize(&premium).unwrap();
        assert_eq!(map.get("level"), Some(&Value::from(3)));
        assert_eq!(map.get("name"), Some(&Value::from("alice")));
        assert_eq!(
            map.get("roles"),
            Some(&Value::Sequence(vec!["Guest".into(), "ADMIN".into()]))
        );

        let back: Premium = ctx.deserializer().deserialize_new(map).unwrap();
        assert_eq!(back, premium);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let ctx = PersistContext::new();
        let mut map = ctx.serializer().serialize(&alice()).unwrap();
        map.insert("retired", true);
        map.insert("nested", Mapping::new());

        let back: Account = ctx.deserializer().deserialize_new(map).unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn absent_keys_keep_current_values() {
        let ctx = PersistContext::new();
        let mut premium = Premium {
            account: alice(),
            level: 9,
        };

        let source: Mapping = [("name", "bob")].into_iter().collect();
        ctx.deserializer()
            .deserialize_into(&mut premium, source)
            .unwrap();

        assert_eq!(premium.account.name, "bob");
        assert_eq!(premium.account.quota, Some(5));
        assert_eq!(premium.level, 9);

        ctx.deserializer()
            .deserialize_into(&mut premium, Mapping::new())
            .unwrap();
        assert_eq!(premium.account.name, "bob");
    }

    #[derive(Persist, Debug, Default, PartialEq)]
    struct Team {
        #[persist]
        lead: Account,
        #[persist]
        backup: Option<Account>,
        #[persist]
        size: u8,
    }

    #[test]
    fn nested_objects_are_rebuilt_from_default() {
        let ctx = PersistContext::new();
        let mut team = Team {
            lead: alice(),
            backup: Some(alice()),
            size: 4,
        };

        let partial = || Value::Mapping([("quota", 7)].into_iter().collect());
        let source: Mapping = [("lead", partial()), ("backup", partial())]
            .into_iter()
            .collect();
        ctx.deserializer().deserialize_into(&mut team, source).unwrap();

        let expected = Account {
            quota: Some(7),
            ..Default::default()
        };
        assert_eq!(team.lead, expected);
        assert_eq!(team.backup, Some(expected));
        assert_eq!(team.size, 4);
    }

    #[test]
    fn polymorphic_round_trip_needs_registration() {
        let ctx = PersistContext::new();
        let directory = Directory {
            owner: alice(),
            members: vec![
                Box::new(Premium {
                    account: alice(),
                    level: 1,
                }) as Box<dyn Persist>,
                Box::new(alice()),
            ],
            featured: Some(Box::new(Premium::default())),
            limits: [1, 2, 3],
            flags: ["beta".into()].into_iter().collect(),
            version: -1,
        };
        let map = ctx.serializer().serialize(&directory).unwrap();

        let err = ctx
            .deserializer()
            .deserialize_new::<Directory>(map.clone())
            .err()
            .unwrap();
        assert!(err.is_unknown_tag());
        assert!(matches!(err, PersistError::Field { field: "members", .. }));

        ctx.types().register::<Premium>().unwrap();
        ctx.types().register::<Account>().unwrap();

        let back: Directory = ctx.deserializer().deserialize_new(map).unwrap();
        assert_eq!(back.owner, alice());
        assert_eq!(back.limits, [1, 2, 3]);
        assert!(back.flags.contains("beta"));
        assert_eq!(back.version, -1);

        let first = back.members[0].as_any().downcast_ref::<Premium>().unwrap();
        assert_eq!(first.level, 1);
        assert_eq!(first.account, alice());
        let second = back.members[1].as_any().downcast_ref::<Account>().unwrap();
        assert_eq!(second, &alice());

        let featured = back.featured.as_deref().unwrap();
        assert_eq!(featured.type_tag(), Premium::TYPE_TAG);
    }

    #[test]
    fn missing_tag_is_an_error() {
        let ctx = PersistContext::new();
        let member: Mapping = [("name", "carol")].into_iter().collect();
        let source: Mapping = [("featured", Value::Mapping(member))].into_iter().collect();

        let err = ctx
            .deserializer()
            .deserialize_new::<Directory>(source)
            .err()
            .unwrap();
        assert!(matches!(
            err.root(),
            PersistError::Conversion(ConversionError::MissingTag)
        ));
    }

    #[test]
    fn tagged_root_object() {
        let ctx = PersistContext::new();
        ctx.types().register::<Premium>().unwrap();

        let premium = Premium {
            account: alice(),
            level: 2,
        };
        let map = ctx.serializer().serialize_tagged(&premium).unwrap();
        assert_eq!(map.get(TYPE_TAG_KEY), Some(&Value::from("premium")));

        let object = ctx.deserializer().deserialize_tagged(map).unwrap();
        assert_eq!(object.as_any().downcast_ref::<Premium>(), Some(&premium));
    }

    #[test]
    fn array_length_must_match() {
        let ctx = PersistContext::new();
        let source: Mapping = [("limits", Value::Sequence(vec![1.into(), 2.into()]))]
            .into_iter()
            .collect();

        let err = ctx
            .deserializer()
            .deserialize_new::<Directory>(source)
            .err()
            .unwrap();
        assert!(matches!(
            err.root(),
            PersistError::Conversion(ConversionError::Length {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn field_errors_name_owner_and_key() {
        let ctx = PersistContext::new();
        let source: Mapping = [("ver", "latest")].into_iter().collect();

        let err = ctx
            .deserializer()
            .deserialize_new::<Directory>(source)
            .err()
            .unwrap();
        match err {
            PersistError::Field {
                owner, field, key, ..
            } => {
                assert_eq!((owner, field, key), ("Directory", "version", "ver"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_variant() {
        let ctx = PersistContext::new();
        let source: Mapping = [("roles", Value::Sequence(vec!["ROOT".into()]))]
            .into_iter()
            .collect();

        let err = ctx
            .deserializer()
            .deserialize_new::<Account>(source)
            .unwrap_err();
        assert!(matches!(
            err.root(),
            PersistError::Conversion(ConversionError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn out_of_range_integers() {
        let ctx = PersistContext::new();
        let source: Mapping = [("level", 300)].into_iter().collect();

        let err = ctx
            .deserializer()
            .deserialize_new::<Premium>(source)
            .unwrap_err();
        assert!(matches!(
            err.root(),
            PersistError::Conversion(ConversionError::OutOfRange { type_name: "u8", .. })
        ));
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn list_of_uuids_keeps_order() {
        use uuid::Uuid;

        #[derive(Persist, Default)]
        struct Team {
            #[persist]
            members: Vec<Uuid>,
        }

        let ids: Vec<Uuid> = (1..=3_u128).map(Uuid::from_u128).collect();
        let ctx = PersistContext::new();
        let team = Team {
            members: ids.clone(),
        };

        let map = ctx.serializer().serialize(&team).unwrap();
        let members = map.get("members").and_then(Value::as_sequence).unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(
            members[0],
            Value::from("00000000-0000-0000-0000-000000000001")
        );

        let back: Team = ctx.deserializer().deserialize_new(map).unwrap();
        assert_eq!(back.members, ids);
    }
}
