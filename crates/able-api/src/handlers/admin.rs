//! Admin back office: user management, moderation, content, stats.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use able_models::{
    ApplicationStatus, Content, ContentCategory, Job, JobStatus, Role,
};
use able_storage::UploadKind;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::policy::{ensure, Action, Resource};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct UserListQuery {
    pub role: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    let role = match query.role.as_deref() {
        None | Some("") => None,
        Some("jobseeker") => Some(Role::Jobseeker),
        Some("employer") => Some(Role::Employer),
        Some("admin") => Some(Role::Admin),
        Some(other) => {
            return Err(ApiError::validation(format!("Invalid role: {}", other)));
        }
    };

    let users = state.users.list(role).await?;
    Ok(Json(users))
}

/// Flip the approval flag, typically for an employer awaiting review.
pub async fn approve_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let mut user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.approved {
        return Err(ApiError::validation("User is already approved"));
    }

    state.users.set_approved(&user_id, true).await?;
    user.approved = true;
    info!(user_id = %user_id, admin_id = %admin.id, "user approved");

    Ok(Json(json!({ "message": "User approved", "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct SuspendRequest {
    pub suspended: bool,
}

pub async fn suspend_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    Json(req): Json<SuspendRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.id == admin.id {
        return Err(ApiError::validation("You cannot suspend your own account"));
    }

    state.users.set_suspended(&user_id, req.suspended).await?;
    user.suspended = req.suspended;
    info!(user_id = %user_id, suspended = req.suspended, "user suspension changed");

    let message = if req.suspended {
        "User suspended"
    } else {
        "User unsuspended"
    };
    Ok(Json(json!({ "message": message, "user": user })))
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<String>,
    pub approved: Option<bool>,
}

/// Admin edit of account fields. Email stays immutable because the
/// email-index document is keyed by it.
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<String>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(username) = req.username {
        if !username.trim().is_empty() {
            user.username = username.trim().to_string();
        }
    }
    if let Some(role) = req.role {
        user.role = Role::from_str_or_default(&role);
    }
    if let Some(approved) = req.approved {
        user.approved = approved;
    }

    state.users.update(&user).await?;
    Ok(Json(json!({ "message": "User updated", "user": user })))
}

/// Remove a user together with their email-index entry and, for
/// jobseekers, the stored resume.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.id == admin.id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    state.users.delete(&user).await?;
    if let Some(resume) = &user.resume_file {
        state.uploads.remove_best_effort(UploadKind::Resume, resume).await;
    }

    Ok(Json(json!({ "message": "User deleted" })))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let mut jobs = state.jobs.list_all().await?;
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub status: String,
}

pub async fn update_job_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(job_id): Path<String>,
    Json(req): Json<JobStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let status = JobStatus::parse(&req.status)
        .ok_or_else(|| ApiError::validation(format!("Invalid job status: {}", req.status)))?;

    ensure(&admin, Resource::Job(&job), Action::SetJobStatus(status))?;

    state.jobs.update_status(&job_id, status).await?;
    job.status = status;
    Ok(Json(json!({ "message": "Job status updated", "job": job })))
}

pub async fn delete_job(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if state.jobs.get(&job_id).await?.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }
    state.jobs.delete(&job_id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

pub async fn list_applications(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let mut applications = state.applications.list_all().await?;
    applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(Json(applications))
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: String,
}

/// Admin moderation path for application status. Interview scheduling is
/// not available here; it belongs to the employer workflow.
pub async fn update_application_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(application_id): Path<String>,
    Json(req): Json<ApplicationStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let status = ApplicationStatus::parse(&req.status)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let mut application = state
        .applications
        .get(&application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    let job = state.jobs.get(&application.job_id).await?;

    ensure(
        &admin,
        Resource::Application {
            application: &application,
            job: job.as_ref(),
        },
        Action::SetStatus(status),
    )?;

    state
        .applications
        .update_status(&application_id, status, None)
        .await?;
    application.status = status;

    crate::handlers::applications::notify_status_change(&state, &application, &job, None).await;

    Ok(Json(json!({
        "message": "Application status updated",
        "data": application,
    })))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

pub async fn set_application_feedback(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(application_id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut application = state
        .applications
        .get(&application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    state
        .applications
        .set_feedback(&application_id, &req.feedback)
        .await?;
    application.feedback = Some(req.feedback);

    Ok(Json(json!({
        "message": "Feedback saved",
        "data": application,
    })))
}

pub async fn list_content(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let mut items = state.content.list_all().await?;
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    #[serde(default)]
    pub published: bool,
}

pub async fn create_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreateContentRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        return Err(ApiError::validation("Title and body are required"));
    }

    let category = req
        .category
        .as_deref()
        .map(ContentCategory::from_str_or_default)
        .unwrap_or_default();

    let mut item = Content::new(
        Uuid::new_v4().to_string(),
        req.title.trim(),
        req.body.trim(),
        category,
        &admin.id,
    );
    item.published = req.published;

    state.content.create(&item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

pub async fn update_content(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(content_id): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut item = state
        .content
        .get(&content_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;

    if let Some(title) = req.title {
        if !title.trim().is_empty() {
            item.title = title.trim().to_string();
        }
    }
    if let Some(body) = req.body {
        item.body = body;
    }
    if let Some(category) = req.category {
        item.category = ContentCategory::from_str_or_default(&category);
    }
    if let Some(published) = req.published {
        item.published = published;
    }

    item.touch();
    state.content.update(&item).await?;
    Ok(Json(item))
}

pub async fn delete_content(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(content_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if state.content.get(&content_id).await?.is_none() {
        return Err(ApiError::not_found("Content not found"));
    }
    state.content.delete(&content_id).await?;
    Ok(Json(json!({ "message": "Content deleted" })))
}

/// Dashboard counters plus the employers with the most postings.
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<impl IntoResponse> {
    let users = state.users.list(None).await?;
    let jobs = state.jobs.list_all().await?;
    let applications = state.applications.list_all().await?;

    let jobseekers = users.iter().filter(|u| u.role == Role::Jobseeker).count();
    let employers = users.iter().filter(|u| u.role == Role::Employer).count();
    let pending_approvals = users
        .iter()
        .filter(|u| u.role == Role::Employer && !u.approved)
        .count();
    let active_jobs = jobs.iter().filter(|j| j.status == JobStatus::Active).count();
    let pending_applications = applications
        .iter()
        .filter(|a| a.status == ApplicationStatus::Pending)
        .count();

    Ok(Json(json!({
        "total_users": users.len(),
        "jobseekers": jobseekers,
        "employers": employers,
        "pending_approvals": pending_approvals,
        "total_jobs": jobs.len(),
        "active_jobs": active_jobs,
        "total_applications": applications.len(),
        "pending_applications": pending_applications,
        "top_employers": top_employers(&jobs, 5),
    })))
}

/// Employers ranked by posting count, ties broken by name for a stable
/// order.
fn top_employers(jobs: &[Job], limit: usize) -> Vec<serde_json::Value> {
    let mut counts: HashMap<&str, (Option<&str>, usize)> = HashMap::new();
    for job in jobs {
        let entry = counts.entry(job.posted_by.as_str()).or_insert((None, 0));
        entry.1 += 1;
        if entry.0.is_none() {
            entry.0 = job.company.as_deref();
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(employer_id, (company, count))| {
            json!({
                "employer_id": employer_id,
                "company": company,
                "job_count": count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use able_models::JobType;

    fn job(id: &str, employer: &str, company: Option<&str>) -> Job {
        let mut j = Job::new(id, "t", "d", JobType::FullTime, employer);
        j.company = company.map(|c| c.to_string());
        j
    }

    #[test]
    fn top_employers_ranks_by_count() {
        let jobs = vec![
            job("j1", "e1", Some("Acme")),
            job("j2", "e1", Some("Acme")),
            job("j3", "e2", Some("Globex")),
        ];
        let top = top_employers(&jobs, 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["employer_id"], "e1");
        assert_eq!(top[0]["job_count"], 2);
        assert_eq!(top[1]["employer_id"], "e2");
    }

    #[test]
    fn top_employers_honors_the_limit_and_breaks_ties_stably() {
        let jobs = vec![
            job("j1", "b", None),
            job("j2", "a", None),
            job("j3", "c", None),
        ];
        let top = top_employers(&jobs, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["employer_id"], "a");
        assert_eq!(top[1]["employer_id"], "b");
    }
}
