//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are opaque strings. Catalog and account payloads sometimes carry
//! numeric IDs, so deserialization accepts either a JSON string or a JSON
//! integer and normalizes both to text.

use serde::Deserialize;

/// Wire representation accepted when deserializing an ID.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    /// Normalize to the textual form, rejecting blank IDs.
    ///
    /// # Errors
    ///
    /// Returns a message if the ID is empty or only whitespace.
    pub fn into_text(self) -> Result<String, &'static str> {
        match self {
            Self::Text(s) if s.trim().is_empty() => Err("id cannot be empty"),
            Self::Text(s) => Ok(s),
            Self::Number(n) => Ok(n.to_string()),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>`, `From<String>`, `From<i64>` and `Display`
///
/// # Example
///
/// ```rust
/// # use cartwheel_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("u-1");
/// let order_id = OrderId::new("u-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// assert_eq!(user_id.as_str(), order_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                raw.into_text()
                    .map(Self)
                    .map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string() {
        let id: ProductId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_deserialize_from_integer() {
        let id: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProductId::from(42_i64));
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        assert!(serde_json::from_str::<UserId>("\"  \"").is_err());
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }

    #[test]
    fn test_serialize_is_plain_string() {
        let json = serde_json::to_string(&UserId::new("u-7")).unwrap();
        assert_eq!(json, "\"u-7\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderId::new("ord-1").to_string(), "ord-1");
    }
}
