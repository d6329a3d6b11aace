//! User accounts, roles, and employer company profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Determines which operations a caller may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Applies to jobs, manages own applications.
    #[default]
    Jobseeker,
    /// Posts jobs, reviews applications to them.
    Employer,
    /// Back-office: moderation, user management, content.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jobseeker => "jobseeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    /// Parse from the stored string form. Unknown strings fall back to
    /// jobseeker, matching the registration default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "employer" => Role::Employer,
            "admin" => Role::Admin,
            _ => Role::Jobseeker,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named workplace accommodation an employer offers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accommodation {
    pub name: String,
    #[serde(default)]
    pub available: bool,
}

/// Employer company sub-profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub inclusion_statement: Option<String>,
    #[serde(default)]
    pub accommodations: Vec<Accommodation>,
}

/// A user record.
///
/// Email is globally unique; uniqueness is enforced at the persistence
/// boundary via the email index collection, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Employers register unapproved and are flipped by an admin.
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub company: Option<CompanyProfile>,
    /// Stored resume filename for jobseekers.
    #[serde(default)]
    pub resume_file: Option<String>,
    #[serde(default)]
    pub saved_jobs: Vec<String>,
    #[serde(default)]
    pub applied_jobs: Vec<String>,
    /// Single-use password reset token and its expiry window.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with registration defaults.
    ///
    /// Jobseekers and admins start approved; employers start unapproved and
    /// wait for admin review.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            approved: role != Role::Employer,
            suspended: false,
            company: None,
            resume_file: None,
            saved_jobs: Vec::new(),
            applied_jobs: Vec::new(),
            reset_token: None,
            reset_token_expires: None,
            created_at: Utc::now(),
        }
    }

    /// Company name for denormalization onto new job postings.
    pub fn company_name(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.name.as_deref())
    }

    /// True if a reset token is present and still inside its window.
    pub fn reset_token_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, &self.reset_token_expires) {
            (Some(stored), Some(expires)) => stored == token && *expires > now,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn employer_starts_unapproved() {
        let u = User::new("u1", "acme", "hr@acme.test", "hash", Role::Employer);
        assert!(!u.approved);
        let j = User::new("u2", "sam", "sam@test", "hash", Role::Jobseeker);
        assert!(j.approved);
    }

    #[test]
    fn role_parsing_defaults_to_jobseeker() {
        assert_eq!(Role::from_str_or_default("employer"), Role::Employer);
        assert_eq!(Role::from_str_or_default("admin"), Role::Admin);
        assert_eq!(Role::from_str_or_default("bogus"), Role::Jobseeker);
    }

    #[test]
    fn reset_token_expiry_window() {
        let mut u = User::new("u1", "sam", "sam@test", "hash", Role::Jobseeker);
        let now = Utc::now();
        u.reset_token = Some("tok".to_string());
        u.reset_token_expires = Some(now + Duration::hours(1));
        assert!(u.reset_token_valid("tok", now));
        assert!(!u.reset_token_valid("wrong", now));
        assert!(!u.reset_token_valid("tok", now + Duration::hours(2)));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let u = User::new("u1", "sam", "sam@test", "secret-hash", Role::Jobseeker);
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
