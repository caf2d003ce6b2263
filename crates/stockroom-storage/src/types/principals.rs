//! Principal records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::PrincipalId;
use super::roles::Role;

/// An authenticated identity (admin or worker).
///
/// `secret_hash` is a PHC-format digest; the plaintext secret is never
/// stored or compared directly. The role is immutable after creation.
#[derive(Clone, Debug, Serialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub username: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
