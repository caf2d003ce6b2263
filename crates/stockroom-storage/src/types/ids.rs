//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Principal (admin or worker) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

/// Product identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

/// Order identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);
