use std::collections::HashMap;

/// A case-insensitive HTTP header map.
///
/// Keys are lowercased on insertion; lookups and containment checks
/// lowercase the probe key first. Inserting a value of `None` removes the
/// key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` (case-insensitively). Stringifies
    /// non-`String` values via `Into<String>`, mirroring the source's
    /// "convert non-string values to strings" behavior.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into().to_lowercase(), value.into());
    }

    /// Remove `key`, if present.
    pub fn remove(&mut self, key: &str) {
        self.inner.remove(&key.to_lowercase());
    }

    /// Insert `value`, or remove the key when `value` is `None`.
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(v) => self.insert(key, v),
            None => self.remove(&key),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(&key.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `defaults` under `self`: an entry already present in `self`
    /// (i.e. the caller's explicit value) always wins.
    ///
    /// This is how `HttpConfig::headers` is applied to a per-request
    /// `Headers` value without ever overriding a caller-specified header.
    pub fn merged_over(&self, defaults: &Headers) -> Headers {
        let mut merged = defaults.clone();
        for (k, v) in self.iter() {
            merged.insert(k, v);
        }
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl std::ops::Index<&str> for Headers {
    type Output = str;
    fn index(&self, key: &str) -> &str {
        self.get(key)
            .unwrap_or_else(|| panic!("no header named {key}"))
    }
}
