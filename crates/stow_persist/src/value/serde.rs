use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_core::ser::{Serialize, Serializer};

use super::{Mapping, Scalar, Value};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(v) => v.serialize(serializer),
            Self::Sequence(v) => serializer.collect_seq(v),
            Self::Mapping(v) => v.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.0)
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a bool, number, string, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        i64::try_from(v)
            .map(Value::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &"an integer within i64"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(256));
        while let Some(elem) = seq.next_element()? {
            vec.push(elem);
        }
        Ok(Value::Sequence(vec))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Value, A::Error> {
        MappingVisitor.visit_map(map).map(Value::Mapping)
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = Mapping;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Mapping, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            mapping.insert(key, value);
        }
        Ok(mapping)
    }
}

impl<'de> Deserialize<'de> for Value {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingVisitor)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Scalar(scalar) => Ok(scalar),
            other => Err(de::Error::invalid_type(
                de::Unexpected::Other(other.kind_name()),
                &"a scalar",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::value::{Mapping, Scalar, Value};

    #[test]
    fn json_round_trip() {
        let text = r#"{"id":"a-b","tags":["x","y"],"ratio":0.5,"on":true,"n":-3}"#;
        let map: Mapping = serde_json::from_str(text).unwrap();

        assert_eq!(map.get("n"), Some(&Value::from(-3_i64)));
        assert_eq!(map.get("ratio"), Some(&Value::from(0.5)));
        assert_eq!(
            map.get("tags"),
            Some(&Value::Sequence(vec!["x".into(), "y".into()]))
        );

        let back = serde_json::to_string(&map).unwrap();
        let again: Mapping = serde_json::from_str(&back).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn null_is_rejected() {
        assert!(serde_json::from_str::<Value>("null").is_err());
        assert!(serde_json::from_str::<Mapping>(r#"{"a":null}"#).is_err());
    }

    #[test]
    fn large_unsigned_is_rejected() {
        assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
        assert_eq!(
            serde_json::from_str::<Value>("9223372036854775807").unwrap(),
            Value::from(i64::MAX)
        );
    }

    #[test]
    fn scalar_requires_leaf() {
        assert_eq!(
            serde_json::from_str::<Scalar>(r#""s""#).unwrap(),
            Scalar::Str("s".into())
        );
        assert!(serde_json::from_str::<Scalar>("[1]").is_err());
    }

    #[test]
    fn ron_document() {
        let text = r#"{"name": "disk", "sizes": [1, 2, 3]}"#;
        let map: Mapping = ron::from_str(text).unwrap();
        assert_eq!(map.get("name").and_then(Value::as_str), Some("disk"));
        assert_eq!(map.get("sizes").and_then(Value::as_sequence).map(<[_]>::len), Some(3));
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Document {
        version: u32,
        objects: alloc::vec::Vec<Mapping>,
    }

    #[test]
    fn mappings_embed_in_host_documents() {
        let text = r#"{"version":2,"objects":[{"name":"a"},{"ids":[1,2]}]}"#;
        let doc: Document = serde_json::from_str(text).unwrap();

        assert_eq!(doc.version, 2);
        assert_eq!(doc.objects.len(), 2);
        assert_eq!(doc.objects[0].get("name").and_then(Value::as_str), Some("a"));

        let back: Document = serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
