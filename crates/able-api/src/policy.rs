//! Authorization policy.
//!
//! One evaluation point for the role and ownership rules. Handlers fetch
//! the resources, then call [`ensure`]; nothing else in the codebase makes
//! an allow/deny decision.

use able_models::{Application, ApplicationStatus, Job, JobStatus, Role, User};

use crate::error::{ApiError, ApiResult};

/// What the caller wants to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    View,
    Edit,
    Delete,
    /// Move an application to a status.
    SetStatus(ApplicationStatus),
    /// Moderate or toggle a job's status.
    SetJobStatus(JobStatus),
}

/// What the action targets.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Job(&'a Job),
    /// An application together with its parent job, which carries the
    /// ownership information. The job is absent when the posting has been
    /// deleted since submission.
    Application {
        application: &'a Application,
        job: Option<&'a Job>,
    },
}

/// Evaluate the policy table.
pub fn authorize(caller: &User, resource: Resource<'_>, action: Action) -> bool {
    match resource {
        Resource::Job(job) => match action {
            Action::View => true,
            Action::Edit | Action::Delete => {
                caller.role == Role::Admin || job.is_owned_by(&caller.id)
            }
            Action::SetJobStatus(status) => match caller.role {
                Role::Admin => true,
                _ => job.is_owned_by(&caller.id) && status.owner_settable(),
            },
            Action::SetStatus(_) => false,
        },
        Resource::Application { application, job } => {
            let owns_job = job.map(|j| j.is_owned_by(&caller.id)).unwrap_or(false);
            match action {
                Action::View => {
                    caller.role == Role::Admin
                        || application.applicant_id == caller.id
                        || owns_job
                }
                // Feedback-only edits are an admin moderation tool.
                Action::Edit => caller.role == Role::Admin,
                Action::Delete => application.applicant_id == caller.id,
                Action::SetStatus(status) => {
                    if owns_job {
                        true
                    } else {
                        // Admins may not schedule interviews on the employer's
                        // behalf.
                        caller.role == Role::Admin && status.admin_settable()
                    }
                }
                Action::SetJobStatus(_) => false,
            }
        }
    }
}

/// [`authorize`], with denial rendered as the API's 403 message.
pub fn ensure(caller: &User, resource: Resource<'_>, action: Action) -> ApiResult<()> {
    if authorize(caller, resource, action) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not authorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use able_models::{ApplicationSnapshot, JobType};

    fn user(id: &str, role: Role) -> User {
        User::new(id, id, format!("{}@test", id), "hash", role)
    }

    fn job(id: &str, owner: &str) -> Job {
        Job::new(id, "Engineer", "desc", JobType::FullTime, owner)
    }

    fn application(job_id: &str, applicant: &str) -> Application {
        let mut snapshot = ApplicationSnapshot::default();
        snapshot.name = applicant.to_string();
        snapshot.email = format!("{}@test", applicant);
        Application::new(job_id, applicant, snapshot)
    }

    #[test]
    fn job_editing_is_owner_or_admin() {
        let owner = user("e1", Role::Employer);
        let other = user("e2", Role::Employer);
        let admin = user("a1", Role::Admin);
        let j = job("j1", "e1");

        assert!(authorize(&owner, Resource::Job(&j), Action::Edit));
        assert!(authorize(&admin, Resource::Job(&j), Action::Delete));
        assert!(!authorize(&other, Resource::Job(&j), Action::Edit));
        assert!(!authorize(&other, Resource::Job(&j), Action::Delete));
    }

    #[test]
    fn owner_toggles_active_closed_admin_moderates_all() {
        let owner = user("e1", Role::Employer);
        let admin = user("a1", Role::Admin);
        let j = job("j1", "e1");

        assert!(authorize(
            &owner,
            Resource::Job(&j),
            Action::SetJobStatus(JobStatus::Active)
        ));
        assert!(authorize(
            &owner,
            Resource::Job(&j),
            Action::SetJobStatus(JobStatus::Closed)
        ));
        assert!(!authorize(
            &owner,
            Resource::Job(&j),
            Action::SetJobStatus(JobStatus::Approved)
        ));
        assert!(authorize(
            &admin,
            Resource::Job(&j),
            Action::SetJobStatus(JobStatus::Approved)
        ));
    }

    #[test]
    fn application_view_is_applicant_owner_or_admin() {
        let applicant = user("s1", Role::Jobseeker);
        let owner = user("e1", Role::Employer);
        let stranger = user("s2", Role::Jobseeker);
        let other_employer = user("e2", Role::Employer);
        let admin = user("a1", Role::Admin);
        let j = job("j1", "e1");
        let a = application("j1", "s1");

        let resource = Resource::Application {
            application: &a,
            job: Some(&j),
        };
        assert!(authorize(&applicant, resource, Action::View));
        assert!(authorize(&owner, resource, Action::View));
        assert!(authorize(&admin, resource, Action::View));
        assert!(!authorize(&stranger, resource, Action::View));
        assert!(!authorize(&other_employer, resource, Action::View));
    }

    #[test]
    fn status_updates_owner_full_admin_subset_others_denied() {
        let owner = user("e1", Role::Employer);
        let other_employer = user("e2", Role::Employer);
        let admin = user("a1", Role::Admin);
        let j = job("j1", "e1");
        let a = application("j1", "s1");
        let resource = Resource::Application {
            application: &a,
            job: Some(&j),
        };

        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::InterviewScheduled,
        ] {
            assert!(authorize(&owner, resource, Action::SetStatus(status)));
            assert!(!authorize(
                &other_employer,
                resource,
                Action::SetStatus(status)
            ));
        }

        assert!(authorize(
            &admin,
            resource,
            Action::SetStatus(ApplicationStatus::Accepted)
        ));
        assert!(!authorize(
            &admin,
            resource,
            Action::SetStatus(ApplicationStatus::InterviewScheduled)
        ));
    }

    #[test]
    fn deletion_is_applicant_only() {
        let applicant = user("s1", Role::Jobseeker);
        let owner = user("e1", Role::Employer);
        let admin = user("a1", Role::Admin);
        let j = job("j1", "e1");
        let a = application("j1", "s1");
        let resource = Resource::Application {
            application: &a,
            job: Some(&j),
        };

        assert!(authorize(&applicant, resource, Action::Delete));
        assert!(!authorize(&owner, resource, Action::Delete));
        assert!(!authorize(&admin, resource, Action::Delete));
    }

    #[test]
    fn orphaned_application_still_reachable_by_applicant_and_admin() {
        let applicant = user("s1", Role::Jobseeker);
        let employer = user("e1", Role::Employer);
        let admin = user("a1", Role::Admin);
        let a = application("j-deleted", "s1");
        let resource = Resource::Application {
            application: &a,
            job: None,
        };

        assert!(authorize(&applicant, resource, Action::View));
        assert!(authorize(&applicant, resource, Action::Delete));
        assert!(authorize(&admin, resource, Action::View));
        // Ownership cannot be established without the job.
        assert!(!authorize(&employer, resource, Action::View));
        assert!(!authorize(
            &employer,
            resource,
            Action::SetStatus(ApplicationStatus::Accepted)
        ));
    }

    #[test]
    fn denial_message_is_stable() {
        let stranger = user("s2", Role::Jobseeker);
        let j = job("j1", "e1");
        let err = ensure(&stranger, Resource::Job(&j), Action::Edit).unwrap_err();
        assert_eq!(err.to_string(), "You are not authorized");
    }
}
