//! Query parameters that keep their insertion order.
//!
//! The Platform API distinguishes `?acl` from `?acl=` and some endpoints care
//! about repeated keys, so parameters are kept as an ordered list of byte
//! pairs instead of a map.

use std::fmt;

/// A single query parameter. `value` is `None` for bare flags such as `acl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

/// Ordered list of query parameters, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedValues {
    pairs: Vec<QueryPair>,
}

impl OrderedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value`.
    pub fn add(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> &mut Self {
        self.pairs.push(QueryPair {
            key: key.as_ref().to_vec(),
            value: Some(value.as_ref().to_vec()),
        });
        self
    }

    /// Append a bare `key` with no value.
    pub fn add_flag(&mut self, key: impl AsRef<[u8]>) -> &mut Self {
        self.pairs.push(QueryPair {
            key: key.as_ref().to_vec(),
            value: None,
        });
        self
    }

    /// Replace every value of `key` with `value`.
    ///
    /// The surviving entry stays where the first occurrence was; a missing key
    /// is appended.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> &mut Self {
        let key = key.as_ref();
        match self.pairs.iter().position(|p| p.key == key) {
            Some(first) => {
                self.pairs[first].value = Some(value.as_ref().to_vec());
                let mut idx = 0;
                self.pairs.retain(|p| {
                    let keep = idx <= first || p.key != key;
                    idx += 1;
                    keep
                });
            }
            None => {
                self.add(key, value);
            }
        }
        self
    }

    /// First value stored for `key`. A bare flag yields `Some(&[])`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        let key = key.as_ref();
        self.pairs
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_deref().unwrap_or_default())
    }

    /// Every value stored for `key`, in insertion order.
    pub fn get_all(&self, key: impl AsRef<[u8]>) -> Vec<&[u8]> {
        let key = key.as_ref();
        self.pairs
            .iter()
            .filter(|p| p.key == key)
            .map(|p| p.value.as_deref().unwrap_or_default())
            .collect()
    }

    /// Remove every entry for `key`.
    pub fn del(&mut self, key: impl AsRef<[u8]>) -> &mut Self {
        let key = key.as_ref();
        self.pairs.retain(|p| p.key != key);
        self
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        self.pairs.iter().any(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryPair> {
        self.pairs.iter()
    }

    /// Encode as `k=v&flag&k=v2`, percent-encoding keys and values.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        self.encode_to(&mut out);
        out
    }

    /// Append the encoded form to `out`.
    pub fn encode_to(&self, out: &mut String) {
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(&urlencoding::encode_binary(&pair.key));
            if let Some(value) = &pair.value {
                out.push('=');
                out.push_str(&urlencoding::encode_binary(value));
            }
        }
    }
}

impl fmt::Display for OrderedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedValues
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = OrderedValues::new();
        for (k, v) in iter {
            values.add(k, v);
        }
        values
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OrderedValues
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
