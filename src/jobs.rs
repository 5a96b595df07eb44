//! Job repository: the reactive job list and its mutations
//!
//! The repository owns the in-memory job list. Every mutation and every
//! change notification from the realtime feed triggers a full reload rather
//! than an incremental patch; concurrent reloads are resolved by idempotent
//! full-list replacement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ApiErrorDetails, Error};
use crate::models::{Job, JobPatch, NewJob};
use crate::realtime::RealtimeClient;
use crate::rows::TableClient;

/// Repository over the `jobs` table
pub struct JobRepository {
    table: TableClient,
    realtime: RealtimeClient,
    schema: String,
    jobs: Arc<RwLock<Vec<Job>>>,
    loading: Arc<AtomicBool>,
}

impl JobRepository {
    pub(crate) fn new(table: TableClient, realtime: RealtimeClient, schema: &str) -> Self {
        Self {
            table,
            realtime,
            schema: schema.to_string(),
            jobs: Arc::new(RwLock::new(Vec::new())),
            loading: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Run mutations under the given access token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.table = self.table.with_auth(token);
        self
    }

    /// Snapshot of the current job list, newest first. Empty before the
    /// first successful reload.
    pub fn list(&self) -> Vec<Job> {
        self.jobs.read().unwrap().clone()
    }

    /// Whether the initial load has not completed yet
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Replace the list with a fresh fetch, ordered by posted date descending
    pub async fn reload(&self) -> Result<(), Error> {
        let result = fetch_all(&self.table).await;
        self.loading.store(false, Ordering::SeqCst);

        let rows = result?;
        *self.jobs.write().unwrap() = rows;
        Ok(())
    }

    /// Insert a new posting and reload the list.
    ///
    /// Field presence is the caller's responsibility; the backend's rejection
    /// of an invalid row surfaces as [`Error::RemoteWrite`].
    pub async fn create(&self, job: NewJob) -> Result<Job, Error> {
        let mut rows: Vec<Job> = self.table.insert(job).execute().await?;
        let created = rows.pop().ok_or_else(|| {
            Error::RemoteWrite(ApiErrorDetails::unparsed(200, "insert returned no rows"))
        })?;

        self.reload().await?;
        Ok(created)
    }

    /// Update an existing posting and reload the list
    pub async fn update(&self, id: &str, patch: JobPatch) -> Result<Job, Error> {
        let mut rows: Vec<Job> = self.table.update(patch).eq("id", id).execute().await?;
        let updated = rows
            .pop()
            .ok_or_else(|| Error::not_found(format!("job {} does not exist", id)))?;

        self.reload().await?;
        Ok(updated)
    }

    /// Delete a posting and reload the list. The caller is expected to have
    /// obtained user confirmation first.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let rows: Vec<serde_json::Value> = self.table.delete().eq("id", id).execute().await?;
        if rows.is_empty() {
            return Err(Error::not_found(format!("job {} does not exist", id)));
        }

        self.reload().await?;
        Ok(())
    }

    /// Subscribe to the jobs change feed and reload on every notification,
    /// regardless of which client caused the change. The subscription lives
    /// until the returned guard is dropped.
    pub fn watch(&self) -> RepositoryWatch {
        let mut subscription = self
            .realtime
            .channel("jobs-changes")
            .schema(&self.schema)
            .table("jobs")
            .subscribe();

        let table = self.table.clone();
        let jobs = self.jobs.clone();
        let loading = self.loading.clone();

        let handle = tokio::spawn(async move {
            while let Some(change) = subscription.recv().await {
                debug!(kind = ?change.kind, "jobs table changed, reloading");
                match fetch_all(&table).await {
                    Ok(rows) => {
                        loading.store(false, Ordering::SeqCst);
                        *jobs.write().unwrap() = rows;
                    }
                    // Stale-but-available beats hard failure for a
                    // background refresh.
                    Err(e) => warn!(error = %e, "background reload failed, keeping last list"),
                }
            }
        });

        RepositoryWatch { handle }
    }
}

async fn fetch_all(table: &TableClient) -> Result<Vec<Job>, Error> {
    table
        .select("*")
        .order("posted_date", false)
        .execute::<Job>()
        .await
}

/// Guard for an active change-feed watch; dropping it tears the
/// subscription down.
pub struct RepositoryWatch {
    handle: JoinHandle<()>,
}

impl Drop for RepositoryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
