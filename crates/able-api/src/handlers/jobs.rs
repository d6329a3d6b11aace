//! Job posting endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use able_models::{Job, JobStatus, JobType, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::policy::{ensure, Action, Resource};
use crate::state::AppState;

/// Additive public listing filters. All postings are listed regardless of
/// status.
#[derive(Debug, Deserialize, Default)]
pub struct JobFilters {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub disability_friendly: Option<bool>,
    pub location: Option<String>,
}

pub fn apply_filters(jobs: Vec<Job>, filters: &JobFilters) -> Vec<Job> {
    jobs.into_iter()
        .filter(|job| {
            if let Some(search) = filters.search.as_deref() {
                if !search.is_empty() && !job.matches_search(search) {
                    return false;
                }
            }
            if let Some(job_type) = filters.job_type.as_deref() {
                if !job_type.is_empty() && job.job_type.as_str() != job_type {
                    return false;
                }
            }
            if let Some(df) = filters.disability_friendly {
                if job.disability_friendly != df {
                    return false;
                }
            }
            if let Some(location) = filters.location.as_deref() {
                if !location.is_empty() && !job.matches_location(location) {
                    return false;
                }
            }
            true
        })
        .collect()
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filters): Query<JobFilters>,
) -> ApiResult<impl IntoResponse> {
    let mut jobs = apply_filters(state.jobs.list_all().await?, &filters);
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    #[serde(default)]
    pub disability_friendly: bool,
    /// Explicit override; otherwise denormalized from the poster's profile.
    pub company: Option<String>,
    #[serde(default)]
    pub accessibility_features: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub category: Option<String>,
}

pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<impl IntoResponse> {
    if user.role != Role::Employer {
        return Err(ApiError::forbidden("You are not authorized"));
    }
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::validation("Title and description are required"));
    }

    let job_type = match req.job_type.as_deref() {
        None | Some("") => JobType::default(),
        Some(s) => JobType::parse(s)
            .ok_or_else(|| ApiError::validation(format!("Invalid job type: {}", s)))?,
    };

    let mut job = Job::new(
        Uuid::new_v4().to_string(),
        req.title.trim(),
        req.description.trim(),
        job_type,
        &user.id,
    );
    job.location = req.location;
    job.salary = req.salary;
    job.disability_friendly = req.disability_friendly;
    job.company = req
        .company
        .filter(|c| !c.trim().is_empty())
        .or_else(|| user.company_name().map(|c| c.to_string()));
    job.accessibility_features = req.accessibility_features;
    job.requirements = req.requirements;
    job.category = req.category;

    state.jobs.create(&job).await?;

    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub disability_friendly: Option<bool>,
    pub company: Option<String>,
    pub accessibility_features: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub category: Option<String>,
}

pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure(&user, Resource::Job(&job), Action::Edit)?;

    if let Some(title) = req.title {
        if !title.trim().is_empty() {
            job.title = title.trim().to_string();
        }
    }
    if let Some(description) = req.description {
        if !description.trim().is_empty() {
            job.description = description.trim().to_string();
        }
    }
    if let Some(job_type) = req.job_type {
        job.job_type = JobType::parse(&job_type)
            .ok_or_else(|| ApiError::validation(format!("Invalid job type: {}", job_type)))?;
    }
    if req.location.is_some() {
        job.location = req.location;
    }
    if req.salary.is_some() {
        job.salary = req.salary;
    }
    if let Some(df) = req.disability_friendly {
        job.disability_friendly = df;
    }
    if req.company.is_some() {
        job.company = req.company;
    }
    if let Some(features) = req.accessibility_features {
        job.accessibility_features = features;
    }
    if let Some(requirements) = req.requirements {
        job.requirements = requirements;
    }
    if req.category.is_some() {
        job.category = req.category;
    }

    state.jobs.update(&job).await?;
    Ok(Json(job))
}

pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    ensure(&user, Resource::Job(&job), Action::Delete)?;

    state.jobs.delete(&job_id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub status: String,
}

/// Owners toggle Active/Closed; admins may also moderate with
/// Pending/Approved/Rejected.
pub async fn update_job_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
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

    ensure(&user, Resource::Job(&job), Action::SetJobStatus(status))?;

    state.jobs.update_status(&job_id, status).await?;
    job.status = status;
    Ok(Json(job))
}

pub async fn save_job(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if user.role != Role::Jobseeker {
        return Err(ApiError::forbidden("You are not authorized"));
    }
    if state.jobs.get(&job_id).await?.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }

    if !user.saved_jobs.iter().any(|j| j == &job_id) {
        user.saved_jobs.push(job_id);
        state.users.set_saved_jobs(&user.id, &user.saved_jobs).await?;
    }

    Ok(Json(json!({
        "message": "Job saved",
        "saved_jobs": user.saved_jobs,
    })))
}

pub async fn unsave_job(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let before = user.saved_jobs.len();
    user.saved_jobs.retain(|j| j != &job_id);
    if user.saved_jobs.len() != before {
        state.users.set_saved_jobs(&user.id, &user.saved_jobs).await?;
    }

    Ok(Json(json!({
        "message": "Job removed from saved jobs",
        "saved_jobs": user.saved_jobs,
    })))
}

pub async fn list_saved_jobs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let jobs = state.jobs.get_many(&user.saved_jobs).await?;
    Ok(Json(jobs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jobs() -> Vec<Job> {
        let mut a = Job::new("j1", "Backend Engineer", "Rust services", JobType::FullTime, "e1");
        a.company = Some("AbleWorks".to_string());
        a.location = Some("Berlin".to_string());
        a.disability_friendly = true;

        let mut b = Job::new("j2", "Designer", "Accessible design", JobType::PartTime, "e2");
        b.location = Some("Lisbon".to_string());

        vec![a, b]
    }

    #[test]
    fn filters_are_additive() {
        let filters = JobFilters {
            search: Some("engineer".to_string()),
            job_type: Some("Full-time".to_string()),
            disability_friendly: Some(true),
            location: Some("ber".to_string()),
        };
        let out = apply_filters(sample_jobs(), &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "j1");
    }

    #[test]
    fn empty_filters_pass_everything() {
        let out = apply_filters(sample_jobs(), &JobFilters::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filters = JobFilters {
            search: Some("ACCESSIBLE".to_string()),
            ..Default::default()
        };
        let out = apply_filters(sample_jobs(), &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "j2");
    }

    #[test]
    fn type_filter_is_exact() {
        let filters = JobFilters {
            job_type: Some("Full-time".to_string()),
            ..Default::default()
        };
        let out = apply_filters(sample_jobs(), &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "j1");
    }
}
