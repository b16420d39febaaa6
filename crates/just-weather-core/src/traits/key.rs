//! Cache key construction

use std::fmt::{self, Display};

/// Normalize user input so equivalent queries share a cache key
///
/// Lowercases, trims, and collapses internal whitespace runs to one space:
/// `"  New   York "` becomes `"new york"`.
pub fn normalize_for_cache(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fingerprint of a cacheable request
///
/// Renders as `namespace:` followed by `name=value` parts joined with `:`,
/// e.g. `weather:city=stockholm:country=se:region=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    parts: Vec<(String, String)>,
}

impl CacheKey {
    /// Create a key for an endpoint namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            parts: Vec::new(),
        }
    }

    /// Add a part whose value is normalized
    pub fn param(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.parts
            .push((name.into(), normalize_for_cache(value.as_ref())));
        self
    }

    /// Add a part verbatim
    pub fn raw_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.parts.push((name.into(), value.to_string()));
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.namespace)?;
        for (i, (name, value)) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}
