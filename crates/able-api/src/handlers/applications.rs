//! Application submission and the status workflow.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use able_models::{normalize_string_or_list, Application, ApplicationSnapshot, ApplicationStatus, Job, Role};
use able_storage::UploadKind;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_email_attempt;
use crate::policy::{ensure, Action, Resource};
use crate::state::AppState;

/// Submit an application. Multipart form: a `job_id` field, applicant text
/// fields, and optional `resume` and `certificate` files.
///
/// Ordering matters here. Files are buffered but not persisted until the
/// job resolves and the duplicate pre-check passes, and the deterministic
/// document id turns a concurrent duplicate into a create conflict, after
/// which the just-saved files are removed.
pub async fn submit_application(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    if user.role != Role::Jobseeker {
        return Err(ApiError::forbidden("You are not authorized"));
    }

    let mut job_id = String::new();
    let mut snapshot = ApplicationSnapshot::default();
    let mut resume: Option<(String, Vec<u8>)> = None;
    let mut certificate: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" | "certificate" => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| ApiError::validation("Uploaded file is missing a filename"))?
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Upload failed: {}", e)))?
                    .to_vec();
                if name == "resume" {
                    resume = Some((filename, bytes));
                } else {
                    certificate = Some((filename, bytes));
                }
            }
            "job_id" => {
                job_id = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Malformed form data: {}", e)))?;
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Malformed form data: {}", e)))?;
                apply_text_field(&mut snapshot, &name, text);
            }
        }
    }

    if job_id.trim().is_empty() {
        return Err(ApiError::validation("job_id is required"));
    }
    if snapshot.name.trim().is_empty() || snapshot.email.trim().is_empty() {
        return Err(ApiError::validation("Name and email are required"));
    }

    let job = state
        .jobs
        .get(job_id.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let app_id = Application::doc_id(&job.id, &user.id);
    if state.applications.get(&app_id).await?.is_some() {
        return Err(ApiError::duplicate("Already applied."));
    }

    let mut application = Application::new(job.id.clone(), user.id.clone(), snapshot);

    if let Some((filename, bytes)) = resume {
        application.resume_file =
            Some(state.uploads.save(UploadKind::Resume, &filename, &bytes).await?);
    }
    if let Some((filename, bytes)) = certificate {
        application.certificate_file = Some(
            state
                .uploads
                .save(UploadKind::Certificate, &filename, &bytes)
                .await?,
        );
    }

    if let Err(e) = state.applications.create(&application).await {
        // A concurrent duplicate lost the race; undo the file writes.
        if let Some(name) = &application.resume_file {
            state.uploads.remove_best_effort(UploadKind::Resume, name).await;
        }
        if let Some(name) = &application.certificate_file {
            state
                .uploads
                .remove_best_effort(UploadKind::Certificate, name)
                .await;
        }
        if matches!(e, able_firestore::FirestoreError::AlreadyExists(_)) {
            return Err(ApiError::duplicate("Already applied."));
        }
        return Err(e.into());
    }

    state.users.add_applied_job(&user.id, &job.id).await?;
    info!(application_id = %application.id, job_id = %job.id, "application submitted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Application submitted successfully",
            "data": application,
        })),
    ))
}

fn apply_text_field(snapshot: &mut ApplicationSnapshot, name: &str, text: String) {
    match name {
        "name" => snapshot.name = text,
        "email" => snapshot.email = text,
        "phone" => snapshot.phone = non_empty(text),
        "bio" => snapshot.bio = non_empty(text),
        "background" => snapshot.background = parse_string_or_list(&text),
        "experience" => snapshot.experience = parse_string_or_list(&text),
        "cover_letter" => snapshot.cover_letter = non_empty(text),
        "accommodations" => snapshot.accommodations = non_empty(text),
        "special_need" => snapshot.special_need = matches!(text.as_str(), "true" | "1" | "yes"),
        "special_need_details" => snapshot.special_need_details = non_empty(text),
        _ => {}
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Multipart text fields carry either a bare string or a JSON array.
fn parse_string_or_list(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value @ serde_json::Value::Array(_)) => normalize_string_or_list(Some(&value)),
        _ => vec![text.to_string()],
    }
}

/// The caller's own applications, each enriched with its job when the job
/// still exists.
pub async fn my_applications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let applications = state.applications.list_by_applicant(&user.id).await?;

    let job_ids: Vec<String> = applications.iter().map(|a| a.job_id.clone()).collect();
    let jobs = state.jobs.get_many(&job_ids).await?;

    let enriched: Vec<serde_json::Value> = applications
        .into_iter()
        .map(|app| {
            let job = jobs.iter().find(|j| j.id == app.job_id);
            json!({ "application": app, "job": job })
        })
        .collect();

    Ok(Json(enriched))
}

/// Applications across all of the employer's jobs.
pub async fn employer_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    list_for_employer(state, user, None).await
}

/// One job's applications. The job must belong to the caller (admins see
/// any).
pub async fn employer_applications_for_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    list_for_employer(state, user, Some(job_id)).await
}

async fn list_for_employer(
    state: AppState,
    AuthUser(user): AuthUser,
    job_id: Option<String>,
) -> ApiResult<Json<Vec<Application>>> {
    if user.role != Role::Employer && user.role != Role::Admin {
        return Err(ApiError::forbidden("You are not authorized"));
    }

    let applications = match job_id {
        Some(job_id) => {
            let job = state
                .jobs
                .get(&job_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Job not found"))?;
            if user.role != Role::Admin && !job.is_owned_by(&user.id) {
                return Err(ApiError::forbidden("You are not authorized"));
            }
            state.applications.list_by_job(&job_id).await?
        }
        None => {
            let jobs = state.jobs.list_by_employer(&user.id).await?;
            let job_ids: Vec<String> = jobs.into_iter().map(|j| j.id).collect();
            state.applications.list_by_jobs(&job_ids).await?
        }
    };

    Ok(Json(applications))
}

pub async fn get_application(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let (application, job) = load_with_job(&state, &application_id).await?;
    ensure(
        &user,
        Resource::Application {
            application: &application,
            job: job.as_ref(),
        },
        Action::View,
    )?;
    Ok(Json(application))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    /// Free-form note: stored as the application's feedback and included
    /// in the notification email.
    pub notes: Option<String>,
}

/// Move an application through the workflow. An invalid status string
/// mutates nothing; non-empty notes overwrite the stored feedback in the
/// same write; a successful change notifies the applicant best-effort.
pub async fn update_application_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let status = ApplicationStatus::parse(&req.status)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let (mut application, job) = load_with_job(&state, &application_id).await?;
    ensure(
        &user,
        Resource::Application {
            application: &application,
            job: job.as_ref(),
        },
        Action::SetStatus(status),
    )?;

    let feedback = feedback_from_notes(req.notes.as_deref());
    state
        .applications
        .update_status(&application_id, status, feedback)
        .await?;
    application.status = status;
    if let Some(feedback) = feedback {
        application.feedback = Some(feedback.to_string());
    }

    notify_status_change(&state, &application, &job, req.notes.as_deref()).await;

    Ok(Json(json!({
        "message": "Application status updated",
        "data": application,
    })))
}

/// Notes become stored feedback only when they carry content; whitespace
/// leaves the existing feedback untouched.
fn feedback_from_notes(notes: Option<&str>) -> Option<&str> {
    notes.map(str::trim).filter(|n| !n.is_empty())
}

pub async fn delete_application(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let (application, job) = load_with_job(&state, &application_id).await?;
    ensure(
        &user,
        Resource::Application {
            application: &application,
            job: job.as_ref(),
        },
        Action::Delete,
    )?;

    state.applications.delete(&application_id).await?;

    if let Some(name) = &application.resume_file {
        state.uploads.remove_best_effort(UploadKind::Resume, name).await;
    }
    if let Some(name) = &application.certificate_file {
        state
            .uploads
            .remove_best_effort(UploadKind::Certificate, name)
            .await;
    }

    Ok(Json(json!({ "message": "Application withdrawn" })))
}

async fn load_with_job(
    state: &AppState,
    application_id: &str,
) -> Result<(Application, Option<Job>), ApiError> {
    let application = state
        .applications
        .get(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    let job = state.jobs.get(&application.job_id).await?;
    Ok((application, job))
}

/// Email the applicant about the new status. Exactly one attempt per
/// successful transition; failures are logged and never fail the request.
pub(crate) async fn notify_status_change(
    state: &AppState,
    application: &Application,
    job: &Option<Job>,
    notes: Option<&str>,
) {
    let (subject, body) = status_email(application, job.as_ref(), notes);

    record_email_attempt("status_update");
    state
        .mailer
        .send_best_effort(&application.snapshot.email, &subject, &body)
        .await;
}

fn status_email(
    application: &Application,
    job: Option<&Job>,
    notes: Option<&str>,
) -> (String, String) {
    let job_title = job.map(|j| j.title.as_str()).unwrap_or("the position");
    let mut body = format!(
        "<p>Hello {},</p>\
         <p>Your application for <strong>{}</strong> is now: <strong>{}</strong>.</p>",
        application.snapshot.name, job_title, application.status
    );
    if let Some(notes) = notes {
        if !notes.trim().is_empty() {
            body.push_str(&format!("<p>{}</p>", notes));
        }
    }

    (format!("Application Update: {}", job_title), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_map_onto_the_snapshot() {
        let mut snap = ApplicationSnapshot::default();
        apply_text_field(&mut snap, "name", "Sam".to_string());
        apply_text_field(&mut snap, "email", "sam@test".to_string());
        apply_text_field(&mut snap, "phone", "  ".to_string());
        apply_text_field(&mut snap, "special_need", "true".to_string());
        apply_text_field(&mut snap, "unknown_field", "ignored".to_string());

        assert_eq!(snap.name, "Sam");
        assert_eq!(snap.email, "sam@test");
        assert_eq!(snap.phone, None);
        assert!(snap.special_need);
    }

    #[test]
    fn list_fields_accept_string_or_json_array() {
        assert_eq!(parse_string_or_list("self-taught"), vec!["self-taught"]);
        assert_eq!(
            parse_string_or_list(r#"["intern", "junior"]"#),
            vec!["intern", "junior"]
        );
        assert_eq!(parse_string_or_list(""), Vec::<String>::new());
        // A bare JSON string is still one entry, not unwrapped.
        assert_eq!(parse_string_or_list("42"), vec!["42"]);
    }

    fn sample_application(status: ApplicationStatus) -> Application {
        let mut snapshot = ApplicationSnapshot::default();
        snapshot.name = "Sam".to_string();
        snapshot.email = "sam@test".to_string();
        let mut app = Application::new("j1", "u1", snapshot);
        app.status = status;
        app
    }

    #[test]
    fn notes_become_feedback_only_when_non_empty() {
        assert_eq!(feedback_from_notes(None), None);
        assert_eq!(feedback_from_notes(Some("")), None);
        assert_eq!(feedback_from_notes(Some("   ")), None);
        assert_eq!(
            feedback_from_notes(Some("  strong portfolio  ")),
            Some("strong portfolio")
        );
    }

    #[test]
    fn status_email_carries_status_and_notes() {
        use able_models::JobType;

        let app = sample_application(ApplicationStatus::Accepted);
        let job = Job::new("j1", "Backend Engineer", "desc", JobType::FullTime, "e1");

        let (subject, body) = status_email(&app, Some(&job), Some("See you Monday"));
        assert_eq!(subject, "Application Update: Backend Engineer");
        assert!(body.contains("Accepted"));
        assert!(body.contains("See you Monday"));
        assert!(body.contains("Hello Sam"));
    }

    #[test]
    fn status_email_falls_back_when_the_job_is_gone() {
        let app = sample_application(ApplicationStatus::Rejected);
        let (subject, body) = status_email(&app, None, Some("   "));
        assert_eq!(subject, "Application Update: the position");
        assert!(body.contains("Rejected"));
        // Blank notes never reach the email body.
        assert!(!body.contains("<p>   </p>"));
    }

    #[test]
    fn special_need_accepts_common_truthy_forms() {
        for (input, expected) in [("true", true), ("1", true), ("yes", true), ("false", false), ("", false)] {
            let mut snap = ApplicationSnapshot::default();
            apply_text_field(&mut snap, "special_need", input.to_string());
            assert_eq!(snap.special_need, expected, "{:?}", input);
        }
    }
}
