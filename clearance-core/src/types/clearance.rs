//! Clearance credentials.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Credential values obtained by one acquisition, plus the identity they are bound to.
///
/// The values are only honoured upstream when replayed together with the same
/// identity string, so the two always travel as a unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clearance {
    /// Credential name → value
    #[serde(alias = "cookies")]
    pub values: BTreeMap<String, String>,
    /// Client identity that must accompany the values (e.g. a User-Agent)
    #[serde(alias = "user_agent")]
    pub identity: String,
}

impl Clearance {
    /// Creates a clearance from name/value pairs and an identity.
    pub fn new<I, K, V>(values: I, identity: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            identity: identity.into(),
        }
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns true if a value named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of the stored values, in sorted order.
    pub fn value_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the values as a `Cookie` header: `a=1; b=2`.
    pub fn cookie_header(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// Values are secrets; only their names are printed.
impl fmt::Debug for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clearance")
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("identity", &self.identity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_sorted() {
        let clearance = Clearance::new([("z", "1"), ("cf_clearance", "abc")], "UA-1");
        assert_eq!(clearance.cookie_header(), "cf_clearance=abc; z=1");
        assert_eq!(clearance.value_names(), vec!["cf_clearance", "z"]);
        assert_eq!(clearance.get("cf_clearance"), Some("abc"));
        assert!(clearance.contains("z"));
        assert_eq!(clearance.len(), 2);
    }

    #[test]
    fn test_empty() {
        let clearance = Clearance::new(Vec::<(String, String)>::new(), "UA-1");
        assert!(clearance.is_empty());
        assert_eq!(clearance.cookie_header(), "");
    }

    #[test]
    fn test_debug_hides_values() {
        let clearance = Clearance::new([("cf_clearance", "super-secret")], "UA-1");
        let printed = format!("{:?}", clearance);
        assert!(printed.contains("cf_clearance"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_deserialize_helper_aliases() {
        let json = r#"{"cookies": {"cf_clearance": "abc"}, "user_agent": "UA-2"}"#;
        let clearance: Clearance = serde_json::from_str(json).unwrap();
        assert_eq!(clearance.get("cf_clearance"), Some("abc"));
        assert_eq!(clearance.identity, "UA-2");
    }
}
