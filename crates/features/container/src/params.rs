/// Query parameter naming the configuration on GET.
pub const PARAM_CONFIG: &str = "config";
/// Form field naming the configuration on POST.
pub const PARAM_CONFIG_ID: &str = "config_id";
pub const PARAM_COMMAND: &str = "command";
/// ADD payload fields.
pub const PARAM_KEY: &str = "key";
pub const PARAM_VALUE: &str = "value";

/// Ordered request parameters (query string or urlencoded form).
///
/// A repeated name keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or overwrites `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Every field except `config_id` and `command`.
    pub fn payload(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(name, _)| *name != PARAM_CONFIG_ID && *name != PARAM_COMMAND)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl From<Vec<(String, String)>> for RequestParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_keep_first_position_and_last_value() {
        let params = RequestParams::from_iter([("a", "1"), ("b", "2"), ("a", "3")]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn payload_skips_reserved_fields() {
        let params = RequestParams::from_iter([
            ("command", "DELETE"),
            ("x", "on"),
            ("config_id", "db"),
            ("key", "k"),
        ]);

        let payload: Vec<_> = params.payload().map(|(name, _)| name).collect();
        assert_eq!(payload, vec!["x", "key"]);
    }

    #[test]
    fn empty_params() {
        let params = RequestParams::new();
        assert!(params.is_empty());
        assert!(!params.contains(PARAM_CONFIG));
    }
}
