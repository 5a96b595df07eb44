//! Authentication API client

mod types;

use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// Client for the backend's authentication API
#[derive(Clone)]
pub struct AuthApi {
    /// The base URL for the backend
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session, shared with every clone of this client
    session: Arc<Mutex<Option<Session>>>,
}

impl AuthApi {
    /// Create a new AuthApi client
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Remote failures on auth endpoints surface as auth errors, with the
    /// backend's message verbatim.
    fn as_auth_error(err: Error) -> Error {
        match err {
            Error::RemoteWrite(details) => Error::Auth(
                details
                    .message
                    .unwrap_or_else(|| format!("request failed with status {}", details.status)),
            ),
            other => other,
        }
    }

    /// Sign up a new user with email, password, and profile metadata
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResponse, Error> {
        let url = self.auth_url("/signup");

        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        let result = Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await
            .map_err(Self::as_auth_error)?;

        if let Some(session) = result.session() {
            let mut current_session = self.session.lock().unwrap();
            *current_session = Some(session);
        }

        Ok(result)
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.auth_url("/token?grant_type=password");

        let body = json!({
            "email": email,
            "password": password,
        });

        let result = Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await
            .map_err(Self::as_auth_error)?;

        if let Some(session) = result.session() {
            let mut current_session = self.session.lock().unwrap();
            *current_session = Some(session);
        }

        Ok(result)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.auth_url("/logout");

        let token = {
            let current_session = self.session.lock().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not logged in")),
            }
        };

        Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(&token)
            .execute_no_content()
            .await
            .map_err(Self::as_auth_error)?;

        let mut current_session = self.session.lock().unwrap();
        *current_session = None;

        Ok(())
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<User, Error> {
        let url = self.auth_url("/user");

        let token = {
            let current_session = self.session.lock().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not logged in")),
            }
        };

        let user = Fetch::get(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(&token)
            .execute::<User>()
            .await
            .map_err(Self::as_auth_error)?;

        Ok(user)
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        let current_session = self.session.lock().unwrap();
        current_session.clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        let mut current_session = self.session.lock().unwrap();
        *current_session = Some(session);
    }

    /// Drop the local session without calling the backend
    pub(crate) fn clear_session(&self) {
        let mut current_session = self.session.lock().unwrap();
        *current_session = None;
    }
}
