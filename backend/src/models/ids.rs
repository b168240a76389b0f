use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an `i64`-backed row identifier that serializes as a bare number
/// and binds to SQLite as an INTEGER.
macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

typed_id!(UserId);
typed_id!(CampaignId);
typed_id!(
    /// Category identifier. Selections and board cells are matched on this
    /// type only, never on its string form.
    CategoryId
);
typed_id!(ItemId);
typed_id!(BoardId);
