use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::{get_keyed, owned_payload, upsert_keyed};
use crate::errors::AppError;
use crate::identity::Owner;
use crate::models::user::{User, UserProfile};
use crate::schema;
use crate::store::{Collection, DocumentStore};

/// Creates or merges the caller's user record. `createdAt` is set on the
/// first write and never replaced afterwards, even by a client-supplied value.
pub async fn upsert_user(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<User, AppError> {
    let user: User = schema::parse(owned_payload(payload, owner)?)?;
    let user = upsert_keyed(store, Collection::Users, owner, user, |user, stored| {
        if stored.contains_key("createdAt") {
            user.created_at = None;
        } else if user.created_at.is_none() {
            user.created_at = Some(Utc::now());
        }
    })
    .await?;
    info!(uid = %owner.uid(), "Upserted user");
    Ok(user)
}

pub async fn get_user(store: &dyn DocumentStore, owner: &Owner) -> Result<Option<User>, AppError> {
    get_keyed(store, Collection::Users, owner).await
}

/// Creates or merges the caller's profile, refreshing `updatedAt`.
pub async fn upsert_profile(
    store: &dyn DocumentStore,
    owner: &Owner,
    payload: Value,
) -> Result<UserProfile, AppError> {
    let profile: UserProfile = schema::parse(owned_payload(payload, owner)?)?;
    let profile = upsert_keyed(store, Collection::Profiles, owner, profile, |profile, _| {
        profile.updated_at.get_or_insert_with(Utc::now);
    })
    .await?;
    info!(uid = %owner.uid(), "Upserted profile");
    Ok(profile)
}

pub async fn get_profile(
    store: &dyn DocumentStore,
    owner: &Owner,
) -> Result<Option<UserProfile>, AppError> {
    get_keyed(store, Collection::Profiles, owner).await
}
