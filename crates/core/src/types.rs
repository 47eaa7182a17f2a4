//! Backend-assigned identifiers.
//!
//! Both ids are opaque strings (UUIDs on Supabase) and are never parsed
//! here. They serialize as bare JSON strings so rows round-trip unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// An empty id means the backend did not assign one.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

backend_id!(
    /// Primary key of a row in the `ndas` table.
    NdaId
);

backend_id!(
    /// Auth user id; stamped into `created_by` on insert.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_bare_strings_in_rows() {
        let id: NdaId = serde_json::from_str("\"6f1c\"").unwrap();
        assert_eq!(id.as_str(), "6f1c");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"6f1c\"");
    }

    #[test]
    fn empty_id_is_detectable() {
        assert!(NdaId::new("").is_empty());
        let user = UserId::from("user-1");
        assert!(!user.is_empty());
        assert_eq!(user.to_string(), "user-1");
    }
}
