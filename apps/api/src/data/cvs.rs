use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{get_keyed, owned_payload, upsert_keyed};
use crate::errors::AppError;
use crate::identity::Owner;
use crate::models::cv::CvData;
use crate::schema;
use crate::store::{Collection, DocumentStore};

/// Creates or merges the caller's CV, refreshing `updatedAt`.
pub async fn upsert_cv(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<CvData, AppError> {
    let cv: CvData = schema::parse(owned_payload(payload, owner)?)?;
    let cv = upsert_keyed(store, Collection::Cvs, owner, cv, |cv, _| {
        cv.updated_at.get_or_insert_with(Utc::now);
    })
    .await?;
    info!(uid = %owner.uid(), chars = cv.content.len(), "Upserted CV");
    Ok(cv)
}

pub async fn get_cv(store: &dyn DocumentStore, owner: &Owner) -> Result<Option<CvData>, AppError> {
    get_keyed(store, Collection::Cvs, owner).await
}

/// Extracts text from an uploaded PDF and stores it as the caller's CV.
pub async fn import_pdf(
    store: &dyn DocumentStore,
    owner: &Owner,
    pdf: Bytes,
    version: Option<String>,
) -> Result<CvData, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::BadRequest(format!("PDF extraction error: {e}")))?;

    upsert_cv(
        store,
        owner,
        json!({ "content": text.trim(), "version": version }),
    )
    .await
}
