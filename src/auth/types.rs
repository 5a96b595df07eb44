//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Response from the token and signup endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// The access token, when the backend established a session
    pub access_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// The expiry time in seconds
    pub expires_in: Option<i64>,

    /// The user data
    pub user: Option<User>,
}

impl AuthResponse {
    /// Build a session from the response, if one was established
    pub(crate) fn session(&self) -> Option<Session> {
        match (&self.access_token, &self.refresh_token, &self.user) {
            (Some(access), Some(refresh), Some(user)) => Some(Session::new(
                access.clone(),
                refresh.clone(),
                user.id.clone(),
                self.expires_in.unwrap_or(3600),
            )),
            _ => None,
        }
    }
}

/// User data as reported by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,

    /// The user metadata supplied at sign-up
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The user ID
    pub user_id: String,

    /// The token type
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(access_token: String, refresh_token: String, user_id: String, expires_in: i64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as i64;

        Self {
            access_token,
            refresh_token,
            user_id,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: Some(now + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs() as i64;

            now >= expires_at
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_built_only_when_tokens_present() {
        let confirmed: AuthResponse = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "u1", "email": "a@b.com"}
        }))
        .unwrap();
        let session = confirmed.session().unwrap();
        assert_eq!(session.user_id, "u1");
        assert!(!session.is_expired());

        let unconfirmed: AuthResponse =
            serde_json::from_value(serde_json::json!({"user": {"id": "u2"}})).unwrap();
        assert!(unconfirmed.session().is_none());
    }
}
