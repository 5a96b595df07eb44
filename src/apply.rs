//! Application submission flow
//!
//! Validation, resume pre-checks, storage upload, and the application
//! insert, in that order; each step is a separate failure point and nothing
//! is retried automatically. The form value stays with the caller, so a
//! failed upload loses no data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AuthApi;
use crate::error::{ApiErrorDetails, Error};
use crate::models::{Application, Job, NewApplication};
use crate::rows::TableClient;
use crate::storage::StorageClient;

/// Largest accepted resume payload
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// The only accepted resume content type
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

/// An attached resume file
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Transient apply-form state; never persisted as-is
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,

    /// Link to an externally hosted resume
    pub resume_link: Option<String>,

    /// Attached resume file; takes precedence over the link
    pub resume_file: Option<ResumeFile>,

    pub cover_letter: String,
}

impl ApplicationForm {
    /// Required-field validation. Local only; no network call is made.
    pub fn validate(&self) -> Result<(), Error> {
        if self.full_name.trim().is_empty() {
            return Err(Error::validation("Full name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(Error::validation("Email address is required"));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::validation("Phone number is required"));
        }

        let has_link = self
            .resume_link
            .as_ref()
            .map(|l| !l.trim().is_empty())
            .unwrap_or(false);
        if self.resume_file.is_none() && !has_link {
            return Err(Error::validation("A resume file or link is required"));
        }

        Ok(())
    }

    /// Resume pre-checks; rejected files never reach the network.
    fn precheck_resume(&self) -> Result<(), Error> {
        if let Some(file) = &self.resume_file {
            if file.content_type != RESUME_CONTENT_TYPE {
                return Err(Error::validation("Resume must be a PDF"));
            }
            if file.data.len() > MAX_RESUME_BYTES {
                return Err(Error::validation("Resume must be 5 MB or smaller"));
            }
        }
        Ok(())
    }
}

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    /// The stored application row
    pub application: Application,

    /// Public URL of the resume the application references
    pub resume_url: String,
}

/// Orchestrates one application submit at a time
pub struct ApplicationFlow {
    auth: AuthApi,
    storage: StorageClient,
    applications: TableClient,
    bucket: String,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the submit future completes or is dropped.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ApplicationFlow {
    pub(crate) fn new(
        auth: AuthApi,
        storage: StorageClient,
        applications: TableClient,
        bucket: &str,
    ) -> Self {
        Self {
            auth,
            storage,
            applications,
            bucket: bucket.to_string(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a submission is currently outstanding; the UI disables its
    /// submit control while this is true.
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit an application for `job` using the current session's identity.
    ///
    /// A duplicate submission for the same (job, user) pair surfaces as
    /// [`Error::DuplicateApplication`]; a failed upload as
    /// [`Error::Upload`], after which the caller may resubmit the same form.
    /// A cancelled submit releases the in-flight flag.
    pub async fn submit(
        &self,
        job: &Job,
        form: &ApplicationForm,
    ) -> Result<SubmissionReceipt, Error> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(Error::validation("A submission is already in progress"));
        }

        let _in_flight = InFlightGuard(self.in_flight.clone());
        self.submit_inner(job, form).await
    }

    async fn submit_inner(
        &self,
        job: &Job,
        form: &ApplicationForm,
    ) -> Result<SubmissionReceipt, Error> {
        form.validate()?;
        form.precheck_resume()?;

        let session = self.auth.get_session();

        let resume_url = match &form.resume_file {
            Some(file) => {
                let namespace = session
                    .as_ref()
                    .map(|s| s.user_id.as_str())
                    .unwrap_or("anonymous");
                let key = object_key(namespace, Utc::now(), &file.file_name);

                let bucket = self.storage.from(&self.bucket);
                bucket
                    .upload(&key, &file.file_name, &file.content_type, file.data.clone())
                    .await?;
                bucket.public_url(&key)
            }
            // validate() guarantees a link when there is no file
            None => form.resume_link.clone().unwrap_or_default(),
        };

        let session = session.ok_or_else(|| Error::auth("You must be signed in to apply"))?;

        let insert = NewApplication {
            job_id: job.id.clone(),
            user_id: session.user_id.clone(),
        };

        let mut rows: Vec<Application> = self
            .applications
            .clone()
            .with_auth(&session.access_token)
            .insert(insert)
            .execute()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    Error::DuplicateApplication
                } else {
                    e
                }
            })?;

        let application = rows.pop().ok_or_else(|| {
            Error::RemoteWrite(ApiErrorDetails::unparsed(200, "insert returned no rows"))
        })?;

        Ok(SubmissionReceipt {
            application,
            resume_url,
        })
    }
}

/// Storage key for an uploaded resume: namespaced by user (or `anonymous`)
/// and timestamped to avoid collisions.
fn object_key(namespace: &str, at: DateTime<Utc>, file_name: &str) -> String {
    format!("{}/{}-{}", namespace, at.timestamp_millis(), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn filled_form() -> ApplicationForm {
        ApplicationForm {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
            resume_link: Some("https://example.com/resume.pdf".to_string()),
            resume_file: None,
            cover_letter: String::new(),
        }
    }

    #[test]
    fn validation_requires_contact_fields() {
        let mut form = filled_form();
        form.full_name = "  ".to_string();
        assert!(matches!(form.validate(), Err(Error::Validation(_))));

        let mut form = filled_form();
        form.email.clear();
        assert!(matches!(form.validate(), Err(Error::Validation(_))));

        let mut form = filled_form();
        form.phone.clear();
        assert!(matches!(form.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn validation_requires_a_resume_file_or_link() {
        let mut form = filled_form();
        form.resume_link = Some("   ".to_string());
        assert!(matches!(form.validate(), Err(Error::Validation(_))));

        form.resume_file = Some(ResumeFile {
            file_name: "resume.pdf".to_string(),
            content_type: RESUME_CONTENT_TYPE.to_string(),
            data: vec![0u8; 16],
        });
        assert!(form.validate().is_ok());
    }

    #[test]
    fn non_pdf_resume_is_rejected_locally() {
        let mut form = filled_form();
        form.resume_file = Some(ResumeFile {
            file_name: "resume.docx".to_string(),
            content_type: "application/msword".to_string(),
            data: vec![0u8; 16],
        });
        let err = form.precheck_resume().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "Resume must be a PDF");
    }

    #[test]
    fn oversize_resume_is_rejected_locally() {
        let mut form = filled_form();
        form.resume_file = Some(ResumeFile {
            file_name: "resume.pdf".to_string(),
            content_type: RESUME_CONTENT_TYPE.to_string(),
            data: vec![0u8; MAX_RESUME_BYTES + 1],
        });
        assert!(matches!(form.precheck_resume(), Err(Error::Validation(_))));

        form.resume_file.as_mut().unwrap().data.truncate(MAX_RESUME_BYTES);
        assert!(form.precheck_resume().is_ok());
    }

    #[tokio::test]
    async fn cancelled_submission_releases_the_in_flight_flag() {
        use crate::auth::Session;
        use futures_util::task::noop_waker;
        use std::future::Future;
        use std::task::Context;

        // Nothing listens here; the submit future stays pending at the
        // insert request until it is dropped.
        let url = "http://127.0.0.1:9";
        let client = reqwest::Client::new();
        let auth = AuthApi::new(url, "anon", client.clone());
        auth.set_session(Session::new(
            "tok".to_string(),
            "ref".to_string(),
            "u1".to_string(),
            3600,
        ));

        let flow = ApplicationFlow::new(
            auth,
            StorageClient::new(url, "anon", client.clone()),
            TableClient::new(url, "anon", "applications", client),
            "resumes",
        );

        let job = Job {
            id: "j1".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: crate::models::JobType::FullTime,
            salary: None,
            description: String::new(),
            requirements: Vec::new(),
            posted_date: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            featured: false,
        };
        let form = filled_form();

        {
            let mut fut = Box::pin(flow.submit(&job, &form));
            let waker = noop_waker();
            let mut cx = Context::from_waker(&waker);
            assert!(fut.as_mut().poll(&mut cx).is_pending());
            assert!(flow.in_flight());
        }

        assert!(!flow.in_flight());
    }

    #[test]
    fn object_keys_are_namespaced_and_timestamped() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(
            object_key("u1", at, "resume.pdf"),
            format!("u1/{}-resume.pdf", at.timestamp_millis())
        );
        assert_eq!(
            object_key("anonymous", at, "cv.pdf"),
            format!("anonymous/{}-cv.pdf", at.timestamp_millis())
        );
    }
}
