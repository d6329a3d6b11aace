//! Job postings and their moderation status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Remote,
    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Remote => "Remote",
            JobType::Internship => "Internship",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Full-time" => Some(JobType::FullTime),
            "Part-time" => Some(JobType::PartTime),
            "Contract" => Some(JobType::Contract),
            "Remote" => Some(JobType::Remote),
            "Internship" => Some(JobType::Internship),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Moderation/lifecycle status of a posting.
///
/// Pending/Approved/Rejected are toggled by admins; Active/Closed by the
/// posting employer. The public listing does not exclude any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Approved => "Approved",
            JobStatus::Rejected => "Rejected",
            JobStatus::Active => "Active",
            JobStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(JobStatus::Pending),
            "Approved" => Some(JobStatus::Approved),
            "Rejected" => Some(JobStatus::Rejected),
            "Active" => Some(JobStatus::Active),
            "Closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }

    /// Statuses the posting employer may set directly.
    pub fn owner_settable(&self) -> bool {
        matches!(self, JobStatus::Active | JobStatus::Closed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    pub job_type: JobType,
    #[serde(default)]
    pub disability_friendly: bool,
    /// Denormalized from the poster's company profile at creation time,
    /// unless an explicit override was supplied.
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub accessibility_features: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Owning employer's user id.
    pub posted_by: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// New posting with creation defaults: status Pending, no optional
    /// fields set.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        job_type: JobType,
        posted_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            location: None,
            salary: None,
            job_type,
            disability_friendly: false,
            company: None,
            accessibility_features: Vec::new(),
            requirements: Vec::new(),
            category: None,
            posted_by: posted_by.into(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// True if the given user id owns this posting.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.posted_by == user_id
    }

    /// Case-insensitive substring match over title, description and company.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .company
                .as_deref()
                .map(|c| c.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }

    /// Case-insensitive substring match over location.
    pub fn matches_location(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.location
            .as_deref()
            .map(|l| l.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job {
            id: "j1".to_string(),
            title: "Accessibility Engineer".to_string(),
            description: "Build inclusive tooling".to_string(),
            location: Some("Remote, Berlin".to_string()),
            salary: None,
            job_type: JobType::FullTime,
            disability_friendly: true,
            company: Some("AbleWorks".to_string()),
            accessibility_features: vec!["screen-reader support".to_string()],
            requirements: vec![],
            category: None,
            posted_by: "emp-1".to_string(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn job_type_round_trips_display_names() {
        for s in ["Full-time", "Part-time", "Contract", "Remote", "Internship"] {
            assert_eq!(JobType::parse(s).unwrap().as_str(), s);
        }
        assert!(JobType::parse("full-time").is_none());
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(JobStatus::parse("Approved"), Some(JobStatus::Approved));
        assert!(JobStatus::parse("approved").is_none());
        assert!(JobStatus::parse("Open").is_none());
    }

    #[test]
    fn owner_can_only_set_active_closed() {
        assert!(JobStatus::Active.owner_settable());
        assert!(JobStatus::Closed.owner_settable());
        assert!(!JobStatus::Approved.owner_settable());
        assert!(!JobStatus::Pending.owner_settable());
    }

    #[test]
    fn search_matches_title_description_company() {
        let job = sample_job();
        assert!(job.matches_search("ACCESSIBILITY"));
        assert!(job.matches_search("inclusive"));
        assert!(job.matches_search("ableworks"));
        assert!(!job.matches_search("finance"));
    }

    #[test]
    fn location_match_is_case_insensitive_substring() {
        let job = sample_job();
        assert!(job.matches_location("berlin"));
        assert!(!job.matches_location("paris"));
    }
}
