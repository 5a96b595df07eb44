//! Configuration options for the DevGeeks client

use std::time::Duration;

/// Configuration options for the DevGeeks client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// The storage bucket resumes are uploaded to
    pub resume_bucket: String,

    /// Base URL for the realtime service when it is not served from the
    /// project URL
    pub realtime_url: Option<String>,

    /// Interval between realtime heartbeats
    pub heartbeat_interval: Duration,

    /// Delay before a dropped realtime connection is re-established
    pub reconnect_interval: Duration,

    /// Whether a dropped realtime connection is re-established at all
    pub auto_reconnect: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            resume_bucket: "resumes".to_string(),
            realtime_url: None,
            heartbeat_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(1),
            auto_reconnect: true,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the resume bucket
    pub fn with_resume_bucket(mut self, value: &str) -> Self {
        self.resume_bucket = value.to_string();
        self
    }

    /// Set a dedicated base URL for the realtime service
    pub fn with_realtime_url(mut self, value: &str) -> Self {
        self.realtime_url = Some(value.to_string());
        self
    }

    /// Set the realtime heartbeat interval
    pub fn with_heartbeat_interval(mut self, value: Duration) -> Self {
        self.heartbeat_interval = value;
        self
    }

    /// Set the realtime reconnect delay
    pub fn with_reconnect_interval(mut self, value: Duration) -> Self {
        self.reconnect_interval = value;
        self
    }

    /// Set whether dropped realtime connections reconnect automatically
    pub fn with_auto_reconnect(mut self, value: bool) -> Self {
        self.auto_reconnect = value;
        self
    }
}
