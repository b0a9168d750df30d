//! JWT claims carried by bearer tokens.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filevault_core::types::OwnerId;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the owner the token speaks for.
    pub sub: OwnerId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the owner id from the subject claim.
    pub fn owner_id(&self) -> OwnerId {
        self.sub
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
