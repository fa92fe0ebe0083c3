//! Claims carried by the `user_token` cookie.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserClaims {
    /// users.id
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}
