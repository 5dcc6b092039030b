use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::{get_owned, list_owned, owned_payload, to_fields};
use crate::errors::AppError;
use crate::identity::Owner;
use crate::models::application::{Application, ApplicationStatus};
use crate::schema::{self, EntityKind, ValidationError};
use crate::store::{Collection, Document, DocumentStore};

/// Records a new application for the caller and returns it with its id.
pub async fn add_application(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<Application, AppError> {
    let mut app: Application = schema::parse(owned_payload(payload, owner)?)?;
    app.created_at.get_or_insert_with(Utc::now);

    let id = store
        .insert(Collection::Applications, to_fields(&app)?)
        .await?;
    info!(uid = %owner.uid(), id = %id, "Added application");

    app.id = Some(id);
    Ok(app)
}

/// The caller's applications, oldest first.
pub async fn list_applications(
    store: &dyn DocumentStore,
    owner: &Owner,
) -> Result<Vec<Application>, AppError> {
    list_owned(store, Collection::Applications, owner).await
}

pub async fn get_application(
    store: &dyn DocumentStore,
    owner: &Owner,
    id: &str,
) -> Result<Application, AppError> {
    get_owned(store, Collection::Applications, owner, id).await
}

/// Applies a partial patch (e.g. a status change) to one of the caller's applications.
pub async fn update_application(
    store: &dyn DocumentStore,
    owner: &Owner,
    id: &str,
    patch: Value,
) -> Result<Application, AppError> {
    schema::validate_patch(EntityKind::Application, &patch)?;
    let Value::Object(patch) = patch else {
        return Err(ValidationError::single("$", "must be a JSON object").into());
    };

    let current = get_application(store, owner, id).await?;
    let mut merged = to_fields(&current)?;
    merged.extend(patch.clone());
    let updated: Application = Document {
        id: id.to_string(),
        data: merged,
    }
    .into_record()?;

    if !store.update(Collection::Applications, id, patch).await? {
        return Err(AppError::NotFound(format!("applications {id} not found")));
    }
    info!(
        uid = %owner.uid(),
        id = %id,
        status = updated.status.map(ApplicationStatus::as_str).unwrap_or("unset"),
        "Updated application"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::owner;
    use crate::store::memory::MemoryStore;
    use crate::store::StoreError;
    use serde_json::json;

    fn sample(title: &str) -> Value {
        json!({
            "title": title,
            "company": "Acme",
            "url": "https://acme.example/jobs/1",
            "status": "applied"
        })
    }

    #[tokio::test]
    async fn test_add_then_list_round_trips() {
        let store = MemoryStore::new();
        let ada = owner("ada");
        let added = add_application(&store, &ada, sample("SRE")).await.unwrap();
        let listed = list_applications(&store, &ada).await.unwrap();

        assert_eq!(listed.len(), 1);
        let id = listed[0].id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(added.id.as_deref(), Some(id.as_str()));
        assert_eq!(listed[0].title, "SRE");
        assert_eq!(listed[0].company, "Acme");
        assert_eq!(listed[0].status, Some(ApplicationStatus::Applied));
        assert_eq!(listed[0].uid, "ada");
        assert!(listed[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_list_never_leaks_other_owners() {
        let store = MemoryStore::new();
        let (ada, bob) = (owner("ada"), owner("bob"));
        add_application(&store, &ada, sample("SRE")).await.unwrap();
        add_application(&store, &bob, sample("DBA")).await.unwrap();
        add_application(&store, &ada, sample("SWE")).await.unwrap();

        let adas = list_applications(&store, &ada).await.unwrap();
        assert_eq!(adas.len(), 2);
        assert!(adas.iter().all(|a| a.uid == "ada"));
        let bobs = list_applications(&store, &bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].title, "DBA");
        assert!(list_applications(&store, &owner("eve")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_status_never_stored() {
        let store = MemoryStore::new();
        let ada = owner("ada");
        let err = add_application(
            &store,
            &ada,
            json!({"title": "SRE", "company": "Acme", "status": "ghosted"}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(list_applications(&store, &ada).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_uid_in_payload_forbidden() {
        let store = MemoryStore::new();
        let err = add_application(
            &store,
            &owner("ada"),
            json!({"uid": "bob", "title": "SRE", "company": "Acme"}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert!(list_applications(&store, &owner("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_patches_only_given_fields() {
        let store = MemoryStore::new();
        let ada = owner("ada");
        let added = add_application(&store, &ada, sample("SRE")).await.unwrap();
        let id = added.id.clone().unwrap();

        let updated = update_application(
            &store,
            &ada,
            &id,
            json!({"status": "interview", "stage": "onsite", "nextStepDate": "2025-06-01T10:00:00Z"}),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, Some(ApplicationStatus::Interview));
        assert_eq!(updated.title, "SRE");

        let stored = get_application(&store, &ada, &id).await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.stage.as_deref(), Some("onsite"));
        assert_eq!(stored.url, added.url);
    }

    #[tokio::test]
    async fn test_update_other_owner_is_not_found() {
        let store = MemoryStore::new();
        let added = add_application(&store, &owner("ada"), sample("SRE"))
            .await
            .unwrap();
        let id = added.id.unwrap();

        let err = update_application(&store, &owner("bob"), &id, json!({"status": "offer"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let unchanged = get_application(&store, &owner("ada"), &id).await.unwrap();
        assert_eq!(unchanged.status, Some(ApplicationStatus::Applied));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_patch() {
        let store = MemoryStore::new();
        let ada = owner("ada");
        let id = add_application(&store, &ada, sample("SRE"))
            .await
            .unwrap()
            .id
            .unwrap();
        let err = update_application(&store, &ada, &id, json!({"status": "lost"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = list_applications(&store, &owner("ada")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Unavailable(_))));
    }
}
