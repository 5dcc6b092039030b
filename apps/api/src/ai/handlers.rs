use axum::{extract::State, Json};
use serde_json::Value;

use crate::errors::{ApiJson, AppError};
use crate::models::ai::{
    CvOptimizerRequest, CvOptimizerResponse, InterviewPrepRequest, InterviewPrepResponse,
    JobMatchingRequest, JobMatchingResponse, SkillGapRequest, SkillGapResponse,
};
use crate::schema;
use crate::state::AppState;

/// POST /api/ai/job-matching
pub async fn handle_job_matching(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<JobMatchingResponse>, AppError> {
    let req: JobMatchingRequest = schema::parse(body)?;
    let response = state
        .ai
        .match_jobs(&req)
        .await
        .map_err(|e| AppError::Llm(format!("Job matching failed: {e}")))?;
    Ok(Json(response))
}

/// POST /api/ai/cv-optimizer
pub async fn handle_cv_optimizer(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<CvOptimizerResponse>, AppError> {
    let req: CvOptimizerRequest = schema::parse(body)?;
    let response = state
        .ai
        .optimize_cv(&req)
        .await
        .map_err(|e| AppError::Llm(format!("CV optimization failed: {e}")))?;
    Ok(Json(response))
}

/// POST /api/ai/interview-prep
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<InterviewPrepResponse>, AppError> {
    let req: InterviewPrepRequest = schema::parse(body)?;
    let response = state
        .ai
        .interview_prep(&req)
        .await
        .map_err(|e| AppError::Llm(format!("Interview coaching failed: {e}")))?;
    Ok(Json(response))
}

/// POST /api/ai/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<SkillGapResponse>, AppError> {
    let req: SkillGapRequest = schema::parse(body)?;
    let response = state
        .ai
        .analyze_skill_gaps(&req)
        .await
        .map_err(|e| AppError::Llm(format!("Skill-gap analysis failed: {e}")))?;
    Ok(Json(response))
}
