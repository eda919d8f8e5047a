use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account record
///
/// `email` is stored trimmed and lower-cased; uniqueness (case-insensitive)
/// is enforced by the identity service at write time, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
