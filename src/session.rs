//! Auth session: current user, profile, and the derived admin flag

use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::auth::{AuthApi, User};
use crate::error::Error;
use crate::models::Profile;
use crate::rows::TableClient;

/// Minimum password length enforced client-side before the backend is asked
const MIN_PASSWORD_LEN: usize = 6;

/// Point-in-time view of the session state
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// The signed-in user, if any
    pub user: Option<User>,

    /// The user's profile row, if any
    pub profile: Option<Profile>,

    /// True only while the initial session resolution is running
    pub loading: bool,
}

impl SessionSnapshot {
    /// Whether a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the signed-in user is an admin. Absent profile means false.
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().map(|p| p.is_admin).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Loading,
    Resolved,
}

struct Inner {
    phase: Phase,
    user: Option<User>,
    profile: Option<Profile>,
}

/// Tracks the current user and profile; the single source of truth for
/// "is a user logged in" and "is that user an admin".
pub struct AuthSession {
    auth: AuthApi,
    profiles: TableClient,
    inner: Arc<RwLock<Inner>>,
}

impl AuthSession {
    pub(crate) fn new(auth: AuthApi, profiles: TableClient) -> Self {
        Self {
            auth,
            profiles,
            inner: Arc::new(RwLock::new(Inner {
                phase: Phase::Uninitialized,
                user: None,
                profile: None,
            })),
        }
    }

    /// Current state as a snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().unwrap();
        SessionSnapshot {
            user: inner.user.clone(),
            profile: inner.profile.clone(),
            loading: inner.phase == Phase::Loading,
        }
    }

    /// Whether the signed-in user is an admin
    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    /// Resolve any persisted session at startup. `loading` is true only
    /// while this runs; afterwards the session is resolved to a user or to
    /// none and never becomes loading again.
    pub async fn initialize(&self) -> Result<SessionSnapshot, Error> {
        self.inner.write().unwrap().phase = Phase::Loading;

        let mut user = None;
        let mut profile = None;

        if let Some(session) = self.auth.get_session().filter(|s| !s.is_expired()) {
            match self.auth.get_user().await {
                Ok(current) => {
                    profile = self.load_profile(&current.id, &session.access_token).await;
                    user = Some(current);
                }
                Err(e) => {
                    warn!(error = %e, "stored session is no longer valid");
                    self.auth.clear_session();
                }
            }
        }

        let mut inner = self.inner.write().unwrap();
        inner.user = user;
        inner.profile = profile;
        inner.phase = Phase::Resolved;
        drop(inner);

        Ok(self.snapshot())
    }

    /// Sign in with email and password. Invalid credentials surface the
    /// backend's message verbatim as [`Error::Auth`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionSnapshot, Error> {
        let response = self.auth.sign_in(email, password).await?;

        let user = response
            .user
            .clone()
            .ok_or_else(|| Error::auth("Sign-in response did not include a user"))?;
        let session = response
            .session()
            .ok_or_else(|| Error::auth("Sign-in did not establish a session"))?;

        let profile = self.load_profile(&user.id, &session.access_token).await;
        self.resolve(Some(user), profile);

        Ok(self.snapshot())
    }

    /// Sign up with email, password, and full name. The identity and its
    /// profile row are created together; local state only advances once both
    /// exist.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SessionSnapshot, Error> {
        if full_name.trim().is_empty() {
            return Err(Error::validation("Please enter your full name"));
        }
        // Pre-check only; the backend's password policy is authoritative.
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::auth("Password must be at least 6 characters"));
        }

        let response = self.auth.sign_up(email, password, full_name).await?;

        let user = response
            .user
            .clone()
            .ok_or_else(|| Error::auth("Sign-up response did not include a user"))?;
        let session = response
            .session()
            .ok_or_else(|| Error::auth("Sign-up did not establish a session"))?;

        let profile = Profile {
            id: user.id.clone(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            is_admin: false,
        };

        let inserted = self
            .profiles
            .clone()
            .with_auth(&session.access_token)
            .insert(&profile)
            .execute::<Profile>()
            .await;

        match inserted {
            Ok(_) => {
                self.resolve(Some(user), Some(profile));
                Ok(self.snapshot())
            }
            Err(e) => {
                // Identity without a profile would leave the caller in a
                // half-created state; drop the local session instead.
                self.auth.clear_session();
                Err(e)
            }
        }
    }

    /// Sign out. Local state is cleared even if the backend call fails;
    /// subsequent `is_admin` reads are false and user/profile are absent.
    pub async fn sign_out(&self) -> SessionSnapshot {
        if self.auth.get_session().is_some() {
            if let Err(e) = self.auth.sign_out().await {
                warn!(error = %e, "remote sign-out failed, clearing local session anyway");
                self.auth.clear_session();
            }
        }

        self.resolve(None, None);
        self.snapshot()
    }

    async fn load_profile(&self, user_id: &str, token: &str) -> Option<Profile> {
        let result = self
            .profiles
            .clone()
            .with_auth(token)
            .select("*")
            .eq("id", user_id)
            .execute_one::<Profile>()
            .await;

        match result {
            Ok(profile) => profile,
            Err(e) => {
                // Absent profile just means no admin rights.
                warn!(error = %e, "profile load failed");
                None
            }
        }
    }

    fn resolve(&self, user: Option<User>, profile: Option<Profile>) {
        let mut inner = self.inner.write().unwrap();
        inner.user = user;
        inner.profile = profile;
        inner.phase = Phase::Resolved;
    }
}
