//! DevGeeks Job Board Client Library
//!
//! A headless Rust client for the DevGeeks job board: the job repository,
//! auth session, listing filter, modal stack, and application submission
//! flow, backed by a hosted data service (REST rows, auth, object storage,
//! and a realtime change feed).

pub mod apply;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod jobs;
pub mod modal;
pub mod models;
pub mod realtime;
pub mod rows;
pub mod session;
pub mod storage;

use reqwest::Client;

use crate::apply::ApplicationFlow;
use crate::auth::AuthApi;
use crate::config::ClientOptions;
use crate::jobs::JobRepository;
use crate::realtime::{RealtimeClient, RealtimeOptions};
use crate::rows::TableClient;
use crate::session::AuthSession;
use crate::storage::StorageClient;

/// The main entry point for the DevGeeks client
pub struct JobBoard {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key for the backend project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client holding the current session
    pub auth: AuthApi,
    /// Client options
    pub options: ClientOptions,
}

impl JobBoard {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use devgeeks_client::JobBoard;
    ///
    /// let board = JobBoard::new("https://your-project-url.example.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| Client::new());

        let auth = AuthApi::new(url, key, http_client.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Get a reference to the auth API client
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    /// Create a row client for a specific table
    pub fn table(&self, table: &str) -> TableClient {
        TableClient::new(&self.url, &self.key, table, self.http_client.clone())
    }

    /// Get a storage client for file operations
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(&self.url, &self.key, self.http_client.clone())
    }

    /// Get a realtime client for change subscriptions
    pub fn realtime(&self) -> RealtimeClient {
        let url = self.options.realtime_url.as_deref().unwrap_or(&self.url);
        RealtimeClient::new(
            url,
            &self.key,
            RealtimeOptions {
                heartbeat_interval: self.options.heartbeat_interval,
                reconnect_interval: self.options.reconnect_interval,
                auto_reconnect: self.options.auto_reconnect,
            },
        )
    }

    /// Create the job repository
    pub fn jobs(&self) -> JobRepository {
        JobRepository::new(self.table("jobs"), self.realtime(), &self.options.db_schema)
    }

    /// Create the auth session over this client's auth state
    pub fn session(&self) -> AuthSession {
        AuthSession::new(self.auth.clone(), self.table("profiles"))
    }

    /// Create an application submission flow
    pub fn apply_flow(&self) -> ApplicationFlow {
        ApplicationFlow::new(
            self.auth.clone(),
            self.storage(),
            self.table("applications"),
            &self.options.resume_bucket,
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::apply::{ApplicationFlow, ApplicationForm, ResumeFile};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::filter::{filter_jobs, TypeFilter};
    pub use crate::jobs::JobRepository;
    pub use crate::modal::{Modal, ModalStack};
    pub use crate::models::{Application, Job, JobPatch, JobType, NewJob, Profile};
    pub use crate::session::{AuthSession, SessionSnapshot};
    pub use crate::JobBoard;
}
