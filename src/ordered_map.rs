//! Insertion-ordered JSON object (de)serialization.
//!
//! TRAPI query graphs and biolink `slot_usage` blocks are JSON objects whose
//! key order carries meaning (node insertion order, qualifier display order).
//! These helpers keep that order by reading objects into `Vec<(String, V)>`
//! instead of a hashed or sorted map.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Serialize `[(key, value)]` as a JSON object, preserving order.
pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Deserialize a JSON object into `[(key, value)]` in document order.
///
/// Duplicate keys keep the first occurrence; `null` reads as empty.
pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}

struct OrderedVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                continue;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}

/// Items stored in a keyed map whose key is also a field of the item.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

/// `#[serde(with = "keyed")]` for `Vec<T>` where `T: Keyed`: the JSON object
/// key becomes the item's id.
pub mod keyed {
    use super::*;

    pub fn serialize<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize + Keyed,
    {
        let mut map = serializer.serialize_map(Some(items.len()))?;
        for item in items {
            map.serialize_entry(item.key(), item)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Keyed,
    {
        let entries: Vec<(String, T)> = super::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(key, mut item)| {
                item.set_key(key);
                item
            })
            .collect())
    }
}
