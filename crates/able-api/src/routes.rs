//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::admin::{
    approve_user, create_content, delete_content, delete_job as admin_delete_job,
    delete_user, list_applications as admin_list_applications,
    list_content as admin_list_content, list_jobs as admin_list_jobs, list_users,
    set_application_feedback, stats, suspend_user,
    update_application_status as admin_update_application_status, update_content,
    update_job_status as admin_update_job_status, update_user,
};
use crate::handlers::applications::{
    delete_application, employer_applications, employer_applications_for_job, get_application,
    my_applications, submit_application, update_application_status,
};
use crate::handlers::auth::{forgot_password, login, register, reset_password};
use crate::handlers::content::{get_content, list_content};
use crate::handlers::files::{download_certificate, download_resume};
use crate::handlers::health;
use crate::handlers::jobs::{
    create_job, delete_job, get_job, list_jobs, list_saved_jobs, save_job, unsave_job,
    update_job, update_job_status,
};
use crate::handlers::settings::{get_settings, put_settings};
use crate::handlers::users::{me, update_profile};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/:token", post(reset_password));

    let user_routes = Router::new()
        .route("/users/me", get(me))
        .route("/users/profile", put(update_profile))
        .route("/settings", get(get_settings))
        .route("/settings", put(put_settings));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        // Static segment must be registered alongside /jobs/:job_id
        .route("/jobs/saved", get(list_saved_jobs))
        .route("/jobs/:job_id", get(get_job))
        .route("/jobs/:job_id", put(update_job))
        .route("/jobs/:job_id", delete(delete_job))
        .route("/jobs/:job_id/status", put(update_job_status))
        .route("/jobs/:job_id/save", post(save_job))
        .route("/jobs/:job_id/unsave", post(unsave_job));

    let application_routes = Router::new()
        .route("/applications", post(submit_application))
        .route("/applications/jobseeker", get(my_applications))
        .route("/applications/employer", get(employer_applications))
        .route(
            "/applications/employer/:job_id",
            get(employer_applications_for_job),
        )
        .route("/applications/resume/:filename", get(download_resume))
        .route("/applications/certificate/:filename", get(download_certificate))
        .route("/applications/:application_id", get(get_application))
        .route("/applications/:application_id", delete(delete_application))
        .route(
            "/applications/:application_id/status",
            put(update_application_status),
        );

    let content_routes = Router::new()
        .route("/content", get(list_content))
        .route("/content/:content_id", get(get_content));

    // Role checks live in the AdminUser extractor on each handler.
    let admin_routes = Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:user_id", put(update_user))
        .route("/admin/users/:user_id", delete(delete_user))
        .route("/admin/users/:user_id/approve", put(approve_user))
        .route("/admin/users/:user_id/suspend", put(suspend_user))
        .route("/admin/jobs", get(admin_list_jobs))
        .route("/admin/jobs/:job_id", delete(admin_delete_job))
        .route("/admin/jobs/:job_id/status", put(admin_update_job_status))
        .route("/admin/applications", get(admin_list_applications))
        .route(
            "/admin/applications/:application_id/status",
            put(admin_update_application_status),
        )
        .route(
            "/admin/applications/:application_id/feedback",
            put(set_application_feedback),
        )
        .route("/admin/content", get(admin_list_content))
        .route("/admin/content", post(create_content))
        .route("/admin/content/:content_id", put(update_content))
        .route("/admin/content/:content_id", delete(delete_content))
        .route("/admin/stats", get(stats));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    // Stricter limit on credential endpoints to slow brute forcing.
    let auth_rate_limiter = std::sync::Arc::new(RateLimiterCache::new(5));

    let api_routes = Router::new()
        .merge(user_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(content_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .merge(auth_routes.layer(middleware::from_fn_with_state(
            auth_rate_limiter,
            rate_limit_middleware,
        )));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
