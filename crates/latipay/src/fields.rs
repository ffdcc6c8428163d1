//! Signable request fields.
//!
//! A [`FieldSet`] keeps its keys sorted, so iteration order is already the
//! canonical order used for signing. Absent fields stay in the set (and are
//! serialized as `null` in JSON bodies) but never reach the signed message.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A scalar request value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

macro_rules! number_field {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(n: $t) -> Self {
                FieldValue::Number(serde_json::Number::from(n))
            }
        })*
    };
}

number_field!(i32, i64, u32, u64);

/// Ordered mapping from field name to value, with absent markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), Some(value.into()));
    }

    /// Record a field with no value. It is serialized as `null` and skipped when signing.
    pub fn insert_absent(&mut self, key: impl Into<String>) {
        self.fields.insert(key.into(), None);
    }

    pub fn insert_opt<V: Into<FieldValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.fields.insert(key.into(), value.map(Into::into));
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key).flatten()
    }

    /// The value of a present field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Present fields in key order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// `k1=v1&k2=v2...` over present fields, without the secret suffix.
    pub fn canonical(&self) -> String {
        self.present()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_sorts_keys() {
        let set: FieldSet = [("user_id", "U1"), ("amount", "0.01"), ("ip", "127.0.0.1")]
            .into_iter()
            .collect();
        assert_eq!(set.canonical(), "amount=0.01&ip=127.0.0.1&user_id=U1");
    }

    #[test]
    fn canonical_sorts_bytewise() {
        let set: FieldSet = [("b", "1"), ("B", "2"), ("a_b", "3"), ("ab", "4")]
            .into_iter()
            .collect();
        assert_eq!(set.canonical(), "B=2&a_b=3&ab=4&b=1");
    }

    #[test]
    fn canonical_skips_absent() {
        let mut set = FieldSet::new();
        set.insert("amount", "5");
        set.insert_absent("reference");
        set.insert_opt::<&str>("callback_url", None);
        assert_eq!(set.canonical(), "amount=5");
        assert_eq!(set.len(), 3);
        assert!(set.get("reference").is_none());
        assert!(set.contains_key("reference"));
    }

    #[test]
    fn numbers_render_as_json_text() {
        let mut set = FieldSet::new();
        set.insert("present_qr", 1);
        set.insert("amount", 250u64);
        assert_eq!(set.canonical(), "amount=250&present_qr=1");
    }

    #[test]
    fn json_keeps_absent_as_null() {
        let mut set = FieldSet::new();
        set.insert("amount", "1.00");
        set.insert("present_qr", 1);
        set.insert_absent("reference");
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": "1.00", "present_qr": 1, "reference": null})
        );
    }

    #[test]
    fn empty_value_is_still_present() {
        let mut set = FieldSet::new();
        set.insert("reference", "");
        set.insert("order_id", "O1");
        assert_eq!(set.canonical(), "order_id=O1&reference=");
    }
}
