//! Newtype wrappers for domain entity identifiers.
//!
//! Approvals and their audit events use human-prefixed opaque string
//! identifiers (`APR-421337`, `AEV-902114`) because the values are
//! caller-visible and appear verbatim in notification bodies. Using
//! distinct types prevents accidentally passing an `EventId` where an
//! `ApprovalId` is expected. When the `sqlx` feature is enabled, each ID
//! type also implements `sqlx::Type`, `sqlx::Encode`, and `sqlx::Decode`
//! for PostgreSQL `TEXT` columns.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Macro to define a prefixed opaque string identifier.
macro_rules! define_prefixed_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// The prefix carried by generated identifiers.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random identifier (`PREFIX-nnnnnn`).
            pub fn generate() -> Self {
                let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
                Self(format!("{}-{}", $prefix, n))
            }

            /// Wrap an existing identifier value.
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string value.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_prefixed_id!(
    /// Unique identifier for an approval request.
    ApprovalId,
    "APR"
);

define_prefixed_id!(
    /// Unique identifier for an approval audit event.
    EventId,
    "AEV"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_carries_prefix() {
        let id = ApprovalId::generate();
        assert!(id.as_str().starts_with("APR-"));
        let id = EventId::generate();
        assert!(id.as_str().starts_with("AEV-"));
    }

    #[test]
    fn test_generated_suffix_is_six_digits() {
        let id = ApprovalId::generate();
        let suffix = id.as_str().trim_start_matches("APR-");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ApprovalId::from_string("APR-123456");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"APR-123456\"");
        let parsed: ApprovalId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_display_roundtrip() {
        let id = EventId::from_string("AEV-777000");
        assert_eq!(id.to_string(), "AEV-777000");
    }
}
