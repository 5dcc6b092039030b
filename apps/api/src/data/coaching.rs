use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::{list_owned, owned_payload, to_fields};
use crate::errors::AppError;
use crate::identity::Owner;
use crate::models::session::{InterviewSession, SkillGapAnalysis};
use crate::schema;
use crate::store::{Collection, DocumentStore};

pub async fn add_interview_session(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<InterviewSession, AppError> {
    let mut session: InterviewSession = schema::parse(owned_payload(payload, owner)?)?;
    session.created_at.get_or_insert_with(Utc::now);

    let id = store
        .insert(Collection::InterviewSessions, to_fields(&session)?)
        .await?;
    info!(uid = %owner.uid(), id = %id, "Recorded interview session");

    session.id = Some(id);
    Ok(session)
}

pub async fn list_interview_sessions(
    store: &dyn DocumentStore,
    owner: &Owner,
) -> Result<Vec<InterviewSession>, AppError> {
    list_owned(store, Collection::InterviewSessions, owner).await
}

pub async fn add_skill_gap_analysis(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<SkillGapAnalysis, AppError> {
    let mut analysis: SkillGapAnalysis = schema::parse(owned_payload(payload, owner)?)?;
    analysis.created_at.get_or_insert_with(Utc::now);

    let id = store
        .insert(Collection::SkillGapAnalyses, to_fields(&analysis)?)
        .await?;
    info!(uid = %owner.uid(), id = %id, target_role = %analysis.target_role, "Recorded skill-gap analysis");

    analysis.id = Some(id);
    Ok(analysis)
}

pub async fn list_skill_gap_analyses(
    store: &dyn DocumentStore,
    owner: &Owner,
) -> Result<Vec<SkillGapAnalysis>, AppError> {
    list_owned(store, Collection::SkillGapAnalyses, owner).await
}
