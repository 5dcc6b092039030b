use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::data::{applications, coaching, cvs, jobs, users};
use crate::errors::{ApiJson, AppError};
use crate::identity::extract::AuthSession;
use crate::models::application::Application;
use crate::models::cv::CvData;
use crate::models::job::{Job, SavedJob};
use crate::models::session::{InterviewSession, SkillGapAnalysis};
use crate::models::user::{User, UserProfile};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TagQuery {
    pub tag: Option<String>,
}

/// GET /api/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<User>, AppError> {
    users::get_user(state.store.as_ref(), &session.owner())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User record not found".to_string()))
}

/// PUT /api/me
pub async fn handle_put_me(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<User>, AppError> {
    let user = users::upsert_user(state.store.as_ref(), &session.owner(), body).await?;
    Ok(Json(user))
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<UserProfile>, AppError> {
    users::get_profile(state.store.as_ref(), &session.owner())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// PUT /api/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = users::upsert_profile(state.store.as_ref(), &session.owner(), body).await?;
    Ok(Json(profile))
}

/// GET /api/cv
pub async fn handle_get_cv(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<CvData>, AppError> {
    cvs::get_cv(state.store.as_ref(), &session.owner())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("CV not found".to_string()))
}

/// PUT /api/cv
pub async fn handle_put_cv(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<CvData>, AppError> {
    let cv = cvs::upsert_cv(state.store.as_ref(), &session.owner(), body).await?;
    Ok(Json(cv))
}

/// POST /api/cv/pdf
/// Multipart form with a `file` field (the PDF) and an optional `version` field.
pub async fn handle_upload_cv_pdf(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    mut multipart: Multipart,
) -> Result<Json<CvData>, AppError> {
    let mut pdf = None;
    let mut version = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                pdf = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?,
                );
            }
            "version" => {
                version = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read version: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let pdf = pdf.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;
    let cv = cvs::import_pdf(state.store.as_ref(), &session.owner(), pdf, version).await?;
    Ok(Json(cv))
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Vec<Application>>, AppError> {
    let apps = applications::list_applications(state.store.as_ref(), &session.owner()).await?;
    Ok(Json(apps))
}

/// POST /api/applications
pub async fn handle_add_application(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let app = applications::add_application(state.store.as_ref(), &session.owner(), body).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError> {
    let app = applications::get_application(state.store.as_ref(), &session.owner(), &id).await?;
    Ok(Json(app))
}

/// PATCH /api/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Application>, AppError> {
    let app =
        applications::update_application(state.store.as_ref(), &session.owner(), &id, body)
            .await?;
    Ok(Json(app))
}

/// GET /api/jobs?tag=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<TagQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = jobs::list_jobs(state.store.as_ref(), params.tag.as_deref()).await?;
    Ok(Json(jobs))
}

/// POST /api/jobs
pub async fn handle_add_job(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = jobs::add_job(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    jobs::get_job(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// GET /api/saved-jobs
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Vec<SavedJob>>, AppError> {
    let saved = jobs::list_saved_jobs(state.store.as_ref(), &session.owner()).await?;
    Ok(Json(saved))
}

/// POST /api/saved-jobs
pub async fn handle_save_job(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<SavedJob>), AppError> {
    let saved = jobs::save_job(state.store.as_ref(), &session.owner(), body).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/interview-sessions
pub async fn handle_list_interview_sessions(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Vec<InterviewSession>>, AppError> {
    let sessions =
        coaching::list_interview_sessions(state.store.as_ref(), &session.owner()).await?;
    Ok(Json(sessions))
}

/// POST /api/interview-sessions
pub async fn handle_add_interview_session(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<InterviewSession>), AppError> {
    let recorded =
        coaching::add_interview_session(state.store.as_ref(), &session.owner(), body).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// GET /api/skill-gap-analyses
pub async fn handle_list_skill_gap_analyses(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Vec<SkillGapAnalysis>>, AppError> {
    let analyses =
        coaching::list_skill_gap_analyses(state.store.as_ref(), &session.owner()).await?;
    Ok(Json(analyses))
}

/// POST /api/skill-gap-analyses
pub async fn handle_add_skill_gap_analysis(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<SkillGapAnalysis>), AppError> {
    let analysis =
        coaching::add_skill_gap_analysis(state.store.as_ref(), &session.owner(), body).await?;
    Ok((StatusCode::CREATED, Json(analysis)))
}

/// POST /api/setup/collections
/// Creates the backing storage for every collection. Safe to call repeatedly.
pub async fn handle_setup_collections(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    state.store.ensure_collections().await?;
    Ok(Json(json!({ "ok": true })))
}
