//! Identity/session provider.
//!
//! [`IdentityProvider`] is the seam to the external authentication service;
//! [`firebase::FirebaseIdentity`] is the production implementation.
//! [`session::SessionManager`] tracks one client's session and fans out
//! state changes to subscribers.

pub mod extract;
pub mod firebase;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{EntityKind, Record};

/// An authenticated session as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds until `id_token` expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl Session {
    pub fn owner(&self) -> Owner {
        Owner(self.uid.clone())
    }
}

/// The uid of a verified caller. Only obtainable from a [`Session`], so
/// owner-scoped operations cannot run without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(String);

impl Owner {
    pub fn uid(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Record for Credentials {
    const KIND: EntityKind = EntityKind::Credentials;
}

/// A token obtained from a federated identity provider (e.g. `google.com`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredential {
    pub provider_id: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Record for FederatedCredential {
    const KIND: EntityKind = EntityKind::FederatedCredential;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailExists,

    #[error("Session token is invalid or expired")]
    InvalidToken,

    #[error("Rejected by identity provider: {0}")]
    Rejected(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, IdentityError>;

    async fn sign_out(&self, session: &Session) -> Result<(), IdentityError>;

    /// Resolves a bearer token to the session it belongs to.
    async fn verify(&self, id_token: &str) -> Result<Session, IdentityError>;
}
