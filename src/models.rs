//! Row types shared across the client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Employment type of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,

    #[serde(rename = "Part-time")]
    PartTime,

    #[serde(rename = "Internship")]
    Internship,

    #[serde(rename = "Contract")]
    Contract,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Internship => "Internship",
            JobType::Contract => "Contract",
        };
        write!(f, "{}", label)
    }
}

/// A posted position shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Row id
    pub id: String,

    pub title: String,

    pub company: String,

    pub location: String,

    #[serde(rename = "type")]
    pub job_type: JobType,

    #[serde(default)]
    pub salary: Option<String>,

    pub description: String,

    /// Ordered list of requirement bullet points
    #[serde(default)]
    pub requirements: Vec<String>,

    pub posted_date: DateTime<Utc>,

    #[serde(default)]
    pub featured: bool,
}

/// Insert payload for a new posting; id and posted_date are assigned server-side
#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,

    #[serde(rename = "type")]
    pub job_type: JobType,

    pub salary: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub featured: bool,
}

/// Partial update payload for an existing posting
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// Per-user metadata, keyed by the auth user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,

    #[serde(default)]
    pub is_admin: bool,
}

/// Review state of an application; transitions are a back-office concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

/// A user's submitted interest in a specific job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub user_id: String,

    #[serde(default)]
    pub status: ApplicationStatus,

    pub applied_at: DateTime<Utc>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Insert payload for an application; status and applied_at default server-side
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub job_id: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_type_uses_hyphenated_wire_names() {
        assert_eq!(
            serde_json::to_value(JobType::FullTime).unwrap(),
            json!("Full-time")
        );
        let parsed: JobType = serde_json::from_value(json!("Part-time")).unwrap();
        assert_eq!(parsed, JobType::PartTime);
    }

    #[test]
    fn job_row_defaults_requirements_and_featured() {
        let job: Job = serde_json::from_value(json!({
            "id": "j1",
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Remote",
            "type": "Full-time",
            "description": "Build services",
            "posted_date": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(job.requirements.is_empty());
        assert!(!job.featured);
        assert_eq!(job.salary, None);
    }

    #[test]
    fn job_patch_serializes_only_set_fields() {
        let patch = JobPatch {
            title: Some("Senior Backend Engineer".to_string()),
            salary: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            json!({"title": "Senior Backend Engineer", "salary": null})
        );
    }

    #[test]
    fn application_status_defaults_to_pending() {
        let app: Application = serde_json::from_value(json!({
            "id": "a1",
            "job_id": "j1",
            "user_id": "u1",
            "applied_at": "2024-05-02T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.notes, None);
    }
}
