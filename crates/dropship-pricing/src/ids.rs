//! Newtype IDs for type-safe identifiers.
//!
//! Keeps rule ids and variant ids from being swapped at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random ID.
            pub fn generate() -> Self {
                Self(generate_id($prefix))
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(RuleId, "rule");
define_id!(VariantId, "var");

/// Random URL-safe id with a short type prefix, e.g. `rule_Zk3...`.
fn generate_id(prefix: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 12] = rand::thread_rng().gen();
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = RuleId::new("rule-us");
        assert_eq!(id.as_str(), "rule-us");
    }

    #[test]
    fn test_id_generation() {
        let id1 = VariantId::generate();
        let id2 = VariantId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("var_"));
        // 12 bytes -> 16 base64 chars
        assert_eq!(id1.as_str().len(), "var_".len() + 16);
    }

    #[test]
    fn test_id_from_string() {
        let id: VariantId = "v-456".into();
        assert_eq!(id.as_str(), "v-456");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = RuleId::new("default");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""default""#);
    }
}
