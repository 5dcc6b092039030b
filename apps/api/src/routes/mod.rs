pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::data::handlers as data;
use crate::identity::handlers as auth;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/auth/federated", post(auth::handle_federated_sign_in))
        .route("/api/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/auth/session", get(auth::handle_get_session))
        // AI assistants
        .route("/api/ai/job-matching", post(ai::handle_job_matching))
        .route("/api/ai/cv-optimizer", post(ai::handle_cv_optimizer))
        .route("/api/ai/interview-prep", post(ai::handle_interview_prep))
        .route("/api/ai/skill-gap", post(ai::handle_skill_gap))
        // Setup
        .route(
            "/api/setup/collections",
            post(data::handle_setup_collections),
        )
        // Owner-scoped records
        .route("/api/me", get(data::handle_get_me).put(data::handle_put_me))
        .route(
            "/api/profile",
            get(data::handle_get_profile).put(data::handle_put_profile),
        )
        .route("/api/cv", get(data::handle_get_cv).put(data::handle_put_cv))
        .route("/api/cv/pdf", post(data::handle_upload_cv_pdf))
        .route(
            "/api/applications",
            get(data::handle_list_applications).post(data::handle_add_application),
        )
        .route(
            "/api/applications/:id",
            get(data::handle_get_application).patch(data::handle_update_application),
        )
        .route(
            "/api/saved-jobs",
            get(data::handle_list_saved_jobs).post(data::handle_save_job),
        )
        .route(
            "/api/interview-sessions",
            get(data::handle_list_interview_sessions).post(data::handle_add_interview_session),
        )
        .route(
            "/api/skill-gap-analyses",
            get(data::handle_list_skill_gap_analyses).post(data::handle_add_skill_gap_analysis),
        )
        // Global job listings
        .route(
            "/api/jobs",
            get(data::handle_list_jobs).post(data::handle_add_job),
        )
        .route("/api/jobs/:id", get(data::handle_get_job))
        .with_state(state)
}
