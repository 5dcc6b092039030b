use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::{list_owned, owned_payload, to_fields};
use crate::errors::AppError;
use crate::identity::Owner;
use crate::models::job::{Job, SavedJob};
use crate::schema;
use crate::store::{Collection, DocumentStore, Filter};

/// Ingests a posting into the global catalogue. Postings are not edited afterwards.
pub async fn add_job(store: &dyn DocumentStore, payload: Value) -> Result<Job, AppError> {
    let mut payload = payload;
    if let Value::Object(fields) = &mut payload {
        fields.remove("id");
    }
    let mut job: Job = schema::parse(payload)?;
    job.posted_at.get_or_insert_with(Utc::now);

    let id = store.insert(Collection::Jobs, to_fields(&job)?).await?;
    info!(id = %id, company = %job.company, "Added job");

    job.id = Some(id);
    Ok(job)
}

pub async fn get_job(store: &dyn DocumentStore, id: &str) -> Result<Option<Job>, AppError> {
    store
        .get(Collection::Jobs, id)
        .await?
        .map(|doc| doc.into_record().map_err(AppError::from))
        .transpose()
}

/// All postings, or those tagged `tag`. A blank tag means no filter.
pub async fn list_jobs(store: &dyn DocumentStore, tag: Option<&str>) -> Result<Vec<Job>, AppError> {
    let filters: Vec<Filter> = tag
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Filter::Contains("tags", Value::String(t.to_string())))
        .into_iter()
        .collect();
    let docs = store.query(Collection::Jobs, &filters).await?;
    docs.into_iter()
        .map(|doc| doc.into_record().map_err(AppError::from))
        .collect()
}

/// Bookmarks an existing posting for the caller.
pub async fn save_job(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<SavedJob, AppError> {
    let mut saved: SavedJob = schema::parse(owned_payload(payload, owner)?)?;
    if get_job(store, &saved.job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("jobs {} not found", saved.job_id)));
    }
    saved.saved_at.get_or_insert_with(Utc::now);

    let id = store.insert(Collection::SavedJobs, to_fields(&saved)?).await?;
    info!(uid = %owner.uid(), id = %id, job_id = %saved.job_id, "Saved job");

    saved.id = Some(id);
    Ok(saved)
}

pub async fn list_saved_jobs(
    store: &dyn DocumentStore,
    owner: &Owner,
) -> Result<Vec<SavedJob>, AppError> {
    list_owned(store, Collection::SavedJobs, owner).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::owner;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_by_tag() {
        let store = MemoryStore::new();
        add_job(&store, json!({"title": "SRE", "company": "Acme", "tags": ["k8s", "go"]}))
            .await
            .unwrap();
        add_job(&store, json!({"title": "Data Engineer", "company": "Initech", "tags": ["sql"]}))
            .await
            .unwrap();
        add_job(&store, json!({"title": "Intern", "company": "Hooli"}))
            .await
            .unwrap();

        assert_eq!(list_jobs(&store, None).await.unwrap().len(), 3);
        let go = list_jobs(&store, Some("go")).await.unwrap();
        assert_eq!(go.len(), 1);
        assert_eq!(go[0].title, "SRE");
        assert!(go[0].posted_at.is_some());
        assert!(list_jobs(&store, Some("cobol")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_tag_lists_everything() {
        let store = MemoryStore::new();
        add_job(&store, json!({"title": "SRE", "company": "Acme", "tags": ["go"]}))
            .await
            .unwrap();
        add_job(&store, json!({"title": "Intern", "company": "Hooli"}))
            .await
            .unwrap();

        assert_eq!(list_jobs(&store, Some("")).await.unwrap().len(), 2);
        assert_eq!(list_jobs(&store, Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_job_validates_link() {
        let store = MemoryStore::new();
        let err = add_job(&store, json!({"title": "SRE", "company": "Acme", "link": "nope"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_job_by_id() {
        let store = MemoryStore::new();
        let job = add_job(&store, json!({"title": "SRE", "company": "Acme", "remote": true}))
            .await
            .unwrap();
        let fetched = get_job(&store, job.id.as_deref().unwrap()).await.unwrap().unwrap();
        assert_eq!(fetched, job);
        assert!(get_job(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_saved_jobs_scoped_to_owner() {
        let store = MemoryStore::new();
        let job = add_job(&store, json!({"title": "SRE", "company": "Acme"}))
            .await
            .unwrap();
        let job_id = job.id.unwrap();

        save_job(&store, &owner("ada"), json!({"jobId": job_id, "notes": "apply Monday"}))
            .await
            .unwrap();
        save_job(&store, &owner("bob"), json!({"jobId": job_id}))
            .await
            .unwrap();

        let adas = list_saved_jobs(&store, &owner("ada")).await.unwrap();
        assert_eq!(adas.len(), 1);
        assert_eq!(adas[0].notes.as_deref(), Some("apply Monday"));
        assert!(adas[0].saved_at.is_some());
    }

    #[tokio::test]
    async fn test_save_unknown_job_not_found() {
        let store = MemoryStore::new();
        let err = save_job(&store, &owner("ada"), json!({"jobId": "nope"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
