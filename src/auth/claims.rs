use serde::{Deserialize, Serialize};

/// JWT payload carried by bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64, // owner of the token
    pub iat: i64,     // issued at (unix timestamp)
    pub exp: i64,     // expires at (unix timestamp)
    pub iss: String,  // issuer
}

/// Result of checking a stored or presented token against the current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid(Claims),
    Expired,
    Malformed,
}

impl TokenStatus {
    /// Claims of a token that is still valid for `user_id`.
    pub fn valid_for(self, user_id: i64) -> Option<Claims> {
        match self {
            TokenStatus::Valid(claims) if claims.user_id == user_id => Some(claims),
            _ => None,
        }
    }
}
