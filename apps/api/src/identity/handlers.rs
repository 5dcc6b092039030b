use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Map, Value};
use tracing::info;

use super::extract::AuthSession;
use super::{Credentials, FederatedCredential, Session};
use crate::data::users;
use crate::errors::{ApiJson, AppError};
use crate::schema;
use crate::state::AppState;

/// Ensures a `users/{uid}` record exists for a freshly authenticated session.
async fn record_user(state: &AppState, session: &Session) -> Result<(), AppError> {
    let mut fields = Map::new();
    if let Some(email) = &session.email {
        fields.insert("email".to_string(), Value::String(email.clone()));
    }
    users::upsert_user(state.store.as_ref(), &session.owner(), Value::Object(fields)).await?;
    Ok(())
}

/// POST /api/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Session>, AppError> {
    let creds: Credentials = schema::parse(body)?;
    let session = state
        .identity
        .sign_in_with_password(&creds.email, &creds.password)
        .await?;
    info!(uid = %session.uid, "Signed in with password");
    Ok(Json(session))
}

/// POST /api/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let creds: Credentials = schema::parse(body)?;
    let session = state
        .identity
        .sign_up_with_password(&creds.email, &creds.password)
        .await?;
    record_user(&state, &session).await?;
    info!(uid = %session.uid, "Signed up");
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/auth/federated
pub async fn handle_federated_sign_in(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Session>, AppError> {
    let credential: FederatedCredential = schema::parse(body)?;
    let session = state.identity.sign_in_with_federated(&credential).await?;
    record_user(&state, &session).await?;
    info!(uid = %session.uid, provider = %credential.provider_id, "Signed in with federated provider");
    Ok(Json(session))
}

/// POST /api/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<StatusCode, AppError> {
    state.identity.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/session
pub async fn handle_get_session(AuthSession(session): AuthSession) -> Json<Value> {
    Json(json!({
        "uid": session.uid,
        "email": session.email,
    }))
}
