//! Document store abstraction: schemaless JSON documents grouped into
//! named collections, addressed by string id.
//!
//! Production uses [`postgres::PgDocumentStore`]; tests use the in-memory store.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Profiles,
    Jobs,
    SavedJobs,
    Applications,
    InterviewSessions,
    Cvs,
    SkillGapAnalyses,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Users,
        Collection::Profiles,
        Collection::Jobs,
        Collection::SavedJobs,
        Collection::Applications,
        Collection::InterviewSessions,
        Collection::Cvs,
        Collection::SkillGapAnalyses,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Profiles => "profiles",
            Collection::Jobs => "jobs",
            Collection::SavedJobs => "saved_jobs",
            Collection::Applications => "applications",
            Collection::InterviewSessions => "interview_sessions",
            Collection::Cvs => "cvs",
            Collection::SkillGapAnalyses => "skill_gap_analyses",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// Deserializes the document body with its id injected as `"id"`.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

/// Top-level field predicates for [`DocumentStore::query`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value.
    Eq(&'static str, Value),
    /// Field is an array containing the value.
    Contains(&'static str, Value),
}

/// Folds filters into a single JSONB containment document.
pub fn containment(filters: &[Filter]) -> Value {
    let mut object = Map::new();
    for filter in filters {
        match filter {
            Filter::Eq(field, value) => {
                object.insert(field.to_string(), value.clone());
            }
            Filter::Contains(field, value) => {
                object.insert(field.to_string(), Value::Array(vec![value.clone()]));
            }
        }
    }
    Value::Object(object)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Unavailable(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates backing storage for every [`Collection`]. Idempotent.
    async fn ensure_collections(&self) -> Result<(), StoreError>;

    /// Inserts a document under a generated id and returns the id.
    async fn insert(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<String, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates the document, or merges `fields` into it key by key.
    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Merges `patch` into an existing document. Returns false if it does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError>;

    /// Documents matching every filter, oldest first.
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError>;
}
