//! Applications and the application status workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status of an application.
///
/// Pending is the initial state. There is no transition guard: any
/// authorized actor may move an application between any of the four states,
/// including back to Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    #[serde(rename = "Interview Scheduled")]
    InterviewScheduled,
}

/// Error for status strings outside the four-value domain.
#[derive(Debug, Error, PartialEq)]
#[error("invalid application status: {0}")]
pub struct StatusParseError(pub String);

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::InterviewScheduled => "Interview Scheduled",
        }
    }

    /// Parse the wire form. Anything outside the enum is rejected; callers
    /// must not mutate state on error.
    pub fn parse(s: &str) -> Result<Self, StatusParseError> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            "Interview Scheduled" => Ok(ApplicationStatus::InterviewScheduled),
            other => Err(StatusParseError(other.to_string())),
        }
    }

    /// The subset admins may set through the admin moderation path.
    /// Interview scheduling stays with the employer.
    pub fn admin_settable(&self) -> bool {
        !matches!(self, ApplicationStatus::InterviewScheduled)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Applicant-supplied data copied onto the application at submission time,
/// independent of the live user record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_list")]
    pub background: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_list")]
    pub experience: Vec<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub accommodations: Option<String>,
    #[serde(default)]
    pub special_need: bool,
    #[serde(default)]
    pub special_need_details: Option<String>,
}

/// A job application.
///
/// The document id is derived from (job_id, applicant_id) so the persistence
/// layer rejects a concurrent duplicate submission at create time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    #[serde(flatten)]
    pub snapshot: ApplicationSnapshot,
    #[serde(default)]
    pub resume_file: Option<String>,
    #[serde(default)]
    pub certificate_file: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    /// Deterministic document id for the (job, applicant) pair.
    pub fn doc_id(job_id: &str, applicant_id: &str) -> String {
        format!("{}_{}", job_id, applicant_id)
    }

    pub fn new(job_id: impl Into<String>, applicant_id: impl Into<String>, snapshot: ApplicationSnapshot) -> Self {
        let job_id = job_id.into();
        let applicant_id = applicant_id.into();
        Self {
            id: Self::doc_id(&job_id, &applicant_id),
            job_id,
            applicant_id,
            snapshot,
            resume_file: None,
            certificate_file: None,
            feedback: None,
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}

/// Normalize a historically loose field: older records stored background and
/// experience as a bare string, newer ones as a list, and some omit it.
pub fn normalize_string_or_list(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        Some(_) => Vec::new(),
    }
}

fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(normalize_string_or_list(Some(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_domain_is_closed() {
        for s in ["Pending", "Accepted", "Rejected", "Interview Scheduled"] {
            assert_eq!(ApplicationStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ApplicationStatus::parse("Hired").is_err());
        assert!(ApplicationStatus::parse("pending").is_err());
        assert!(ApplicationStatus::parse("").is_err());
    }

    #[test]
    fn admin_subset_excludes_interview() {
        assert!(ApplicationStatus::Pending.admin_settable());
        assert!(ApplicationStatus::Accepted.admin_settable());
        assert!(ApplicationStatus::Rejected.admin_settable());
        assert!(!ApplicationStatus::InterviewScheduled.admin_settable());
    }

    #[test]
    fn doc_id_is_deterministic_per_pair() {
        assert_eq!(Application::doc_id("j1", "u1"), "j1_u1");
        assert_eq!(
            Application::doc_id("j1", "u1"),
            Application::doc_id("j1", "u1")
        );
        assert_ne!(Application::doc_id("j1", "u2"), Application::doc_id("j1", "u1"));
    }

    #[test]
    fn normalization_handles_all_stored_shapes() {
        assert_eq!(normalize_string_or_list(None), Vec::<String>::new());
        assert_eq!(
            normalize_string_or_list(Some(&json!(null))),
            Vec::<String>::new()
        );
        assert_eq!(normalize_string_or_list(Some(&json!("a"))), vec!["a"]);
        assert_eq!(
            normalize_string_or_list(Some(&json!(["a", "b"]))),
            vec!["a", "b"]
        );
    }

    #[test]
    fn snapshot_deserializes_string_background() {
        let snap: ApplicationSnapshot = serde_json::from_value(json!({
            "name": "Sam",
            "email": "sam@test",
            "background": "self-taught",
            "experience": ["intern", "junior"]
        }))
        .unwrap();
        assert_eq!(snap.background, vec!["self-taught"]);
        assert_eq!(snap.experience, vec!["intern", "junior"]);
    }

    #[test]
    fn round_trip_preserves_list_order() {
        let mut snap = ApplicationSnapshot::default();
        snap.name = "Sam".to_string();
        snap.email = "sam@test".to_string();
        snap.background = vec!["a".to_string(), "b".to_string()];
        let app = Application::new("j1", "u1", snap);
        let json = serde_json::to_value(&app).unwrap();
        let back: Application = serde_json::from_value(json).unwrap();
        assert_eq!(back.snapshot.background, vec!["a", "b"]);
        assert_eq!(back.status, ApplicationStatus::Pending);
    }
}
