//! List-valued columns.
//!
//! Some entity fields are ordered sequences (a volunteer's category list, for
//! example) that are stored in a single text column as a JSON array. The
//! conversion is explicit: the persistence layer calls [`JsonList::encode`]
//! when writing and [`JsonList::decode`] when reading, and a column that does
//! not hold a valid array for the element type is reported as a
//! [`FormatError`] instead of being silently replaced.

use std::ops::Deref;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::FormatError;

/// Element types that may be stored in a [`JsonList`].
///
/// Sealed: only types whose JSON encoding cannot fail are allowed, which is
/// what makes [`JsonList::encode`] infallible.
pub trait ListElement: Serialize + DeserializeOwned + private::Sealed {
    /// Human-readable element name used in decode errors.
    const NAME: &'static str;
}

impl ListElement for String {
    const NAME: &'static str = "string";
}

impl ListElement for u64 {
    const NAME: &'static str = "unsigned integer";
}

mod private {
    pub trait Sealed {}
    impl Sealed for String {}
    impl Sealed for u64 {}
}

/// An ordered sequence stored as one JSON text column.
///
/// On the wire it is a plain JSON array, so API payloads carry
/// `["cleanup", "tutoring"]` rather than a wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonList<T>(Vec<T>);

pub type StringList = JsonList<String>;
pub type UintList = JsonList<u64>;

impl<T> JsonList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: ListElement> JsonList<T> {
    /// Encode the sequence as JSON text for storage.
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).expect("string and integer sequences always serialize")
    }

    /// Decode a stored column back into the sequence.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        serde_json::from_slice::<Vec<T>>(bytes)
            .map(Self)
            .map_err(|source| FormatError {
                element: T::NAME,
                source,
            })
    }
}

impl<T> Default for JsonList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for JsonList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for JsonList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for JsonList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for JsonList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a JsonList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> StringList {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn string_list_roundtrip_keeps_order_and_duplicates() {
        let list = strings(&["tutoring", "cleanup", "tutoring", "Food & Drink", "日本語"]);

        let encoded = list.encode();
        let decoded = StringList::decode(encoded.as_bytes()).unwrap();

        assert_eq!(decoded, list);
        assert_eq!(decoded[0], "tutoring");
        assert_eq!(decoded[2], "tutoring");
    }

    #[test]
    fn uint_list_roundtrip() {
        let list = UintList::new(vec![3, 1, 3, 0, u64::MAX]);

        let decoded = UintList::decode(list.encode().as_bytes()).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn empty_list_roundtrip() {
        let list = StringList::default();
        assert_eq!(list.encode(), "[]");
        assert!(StringList::decode(b"[]").unwrap().is_empty());
    }

    #[test]
    fn encodes_as_plain_json_array() {
        assert_eq!(strings(&["a", "b"]).encode(), r#"["a","b"]"#);
        assert_eq!(UintList::new(vec![1, 2]).encode(), "[1,2]");
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = StringList::decode(b"not json").unwrap_err();
        assert_eq!(err.element, "string");
    }

    #[test]
    fn decode_rejects_wrong_element_type() {
        assert!(UintList::decode(br#"["a"]"#).is_err());
        assert!(UintList::decode(b"[-1]").is_err());
        assert!(UintList::decode(b"[1.5]").is_err());
        assert!(StringList::decode(b"[1, 2]").is_err());
    }

    #[test]
    fn decode_rejects_non_array() {
        assert!(StringList::decode(br#"{"a": 1}"#).is_err());
        assert!(StringList::decode(b"null").is_err());
        assert!(StringList::decode(b"").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let list: StringList = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(list, strings(&["x", "y"]));
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["x","y"]"#);
    }
}
