//! Modal stack: which overlay is visible and what it carries
//!
//! At most one modal is open at a time; opening a new one implicitly closes
//! whatever was showing. Actions that require authentication open the auth
//! modal instead, and the attempted action is deliberately not queued for
//! replay after login.

use crate::models::Job;
use crate::session::SessionSnapshot;

const ADMIN_WARNING: &str = "You need admin privileges to access this area.";
const APPLY_CONFIRMATION: &str = "Application submitted successfully!";

/// The currently visible overlay
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Sign-in / sign-up dialog
    Auth,

    /// Read-only details for the selected job
    JobDetails(Job),

    /// Application form for the selected job
    Apply(Job),

    /// Admin editor; `None` means a new posting
    AdminEdit(Option<Job>),
}

/// Coordinates the overlay state and one-shot user notices
#[derive(Debug, Default)]
pub struct ModalStack {
    current: Option<Modal>,
    notice: Option<String>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open modal, if any
    pub fn current(&self) -> Option<&Modal> {
        self.current.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.current.is_none()
    }

    /// Close whatever is open
    pub fn close(&mut self) {
        self.current = None;
    }

    /// Open the auth dialog
    pub fn open_auth(&mut self) {
        self.current = Some(Modal::Auth);
    }

    /// Open the details view for a job
    pub fn view_details(&mut self, job: Job) {
        self.current = Some(Modal::JobDetails(job));
    }

    /// Open the apply form for a job. Without a signed-in user this opens
    /// the auth dialog instead; the user must click apply again after
    /// signing in.
    pub fn request_apply(&mut self, job: Job, session: &SessionSnapshot) {
        if !session.is_signed_in() {
            self.current = Some(Modal::Auth);
            return;
        }
        self.current = Some(Modal::Apply(job));
    }

    /// Move from the details view to the apply form, carrying the same job
    /// forward. No-op when the details view is not showing.
    pub fn apply_from_details(&mut self, session: &SessionSnapshot) {
        match self.current.take() {
            Some(Modal::JobDetails(job)) => self.request_apply(job, session),
            other => self.current = other,
        }
    }

    /// Open the admin editor. Unauthenticated users get the auth dialog;
    /// authenticated non-admins get a one-shot warning and no transition.
    pub fn request_admin(&mut self, job: Option<Job>, session: &SessionSnapshot) {
        if !session.is_signed_in() {
            self.current = Some(Modal::Auth);
            return;
        }
        if !session.is_admin() {
            self.notice = Some(ADMIN_WARNING.to_string());
            return;
        }
        self.current = Some(Modal::AdminEdit(job));
    }

    /// Record a successful application submit: closes the apply form, queues
    /// the confirmation notice, and yields the applied job. Returns `None`
    /// unless the apply form was open, so the caller's follow-up side effect
    /// can only fire once per submit.
    pub fn complete_apply(&mut self) -> Option<Job> {
        match self.current.take() {
            Some(Modal::Apply(job)) => {
                self.notice = Some(APPLY_CONFIRMATION.to_string());
                Some(job)
            }
            other => {
                self.current = other;
                None
            }
        }
    }

    /// Take the pending one-shot notice, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
