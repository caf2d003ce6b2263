//! Session state: principal snapshots keyed by opaque tokens.
//!
//! A [`Session`] is a cached snapshot of principal identity taken at login;
//! it is passed explicitly into every gated operation rather than re-derived
//! per request. Login is the only place a session is created, logout the only
//! place one is destroyed, aside from TTL expiry.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand_core::{OsRng, RngCore};
use serde::Serialize;

use stockroom_storage::{Principal, PrincipalId, Role};

/// Principal snapshot carried by an authenticated client.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub id: PrincipalId,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            role: principal.role,
        }
    }
}

struct Entry {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// In-process session store.
///
/// Tokens are 32 random bytes, hex encoded. Sessions only live in this
/// process; a restart logs every client out.
pub struct SessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Create a session for the principal and return its token.
    pub fn create(&self, session: Session) -> String {
        let mut raw = [0u8; 32];
        OsRng.fill_bytes(&mut raw);
        let token = hex::encode(raw);
        self.entries.insert(
            token.clone(),
            Entry {
                session,
                expires_at: Utc::now() + self.ttl,
            },
        );
        token
    }

    /// Look up the session for a token. Expired entries are dropped on read.
    pub fn get(&self, token: &str) -> Option<Session> {
        let expired = match self.entries.get(token) {
            None => return None,
            Some(entry) => {
                if entry.expires_at > Utc::now() {
                    return Some(entry.session.clone());
                }
                true
            }
        };
        if expired {
            self.entries.remove(token);
        }
        None
    }

    /// Destroy a session. Destroying an unknown token is a no-op.
    pub fn destroy(&self, token: &str) {
        self.entries.remove(token);
    }
}
