use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FederatedCredential, IdentityError, IdentityProvider, Session};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Email/password and federated sign-in through the Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    base_url: String,
    request_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Sent as a decimal string.
    #[serde(default)]
    expires_in: Option<String>,
}

impl From<AuthResponse> for Session {
    fn from(r: AuthResponse) -> Self {
        Session {
            uid: r.local_id,
            email: r.email,
            id_token: r.id_token,
            refresh_token: r.refresh_token,
            expires_in: r.expires_in.and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: String, request_uri: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            request_uri,
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Identity provider rejected accounts:{method} ({status})");
            return Err(map_provider_error(&message));
        }

        Ok(response.json().await?)
    }
}

/// Maps Identity Toolkit error codes, e.g. `WEAK_PASSWORD : Password should be ...`.
fn map_provider_error(message: &str) -> IdentityError {
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => IdentityError::InvalidToken,
        "WEAK_PASSWORD" | "INVALID_EMAIL" | "INVALID_IDP_RESPONSE" | "OPERATION_NOT_ALLOWED" => {
            IdentityError::Rejected(message.to_string())
        }
        _ => IdentityError::Provider(message.to_string()),
    }
}

/// Encodes the `postBody` form string for `accounts:signInWithIdp`.
fn idp_post_body(credential: &FederatedCredential) -> Result<String, IdentityError> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if let Some(token) = credential.id_token.as_deref() {
        pairs.push(("id_token", token));
    }
    if let Some(token) = credential.access_token.as_deref() {
        pairs.push(("access_token", token));
    }
    if pairs.is_empty() {
        return Err(IdentityError::Rejected(
            "federated sign-in needs an idToken or accessToken".to_string(),
        ));
    }
    pairs.push(("providerId", credential.provider_id.as_str()));

    let encoded = Url::parse_with_params("http://localhost/", &pairs)
        .map_err(|e| IdentityError::Provider(e.to_string()))?;
    Ok(encoded.query().unwrap_or_default().to_string())
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signInWithIdp",
                &IdpRequest {
                    post_body: idp_post_body(credential)?,
                    request_uri: &self.request_uri,
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), IdentityError> {
        // No client-key revocation endpoint; the id token lapses at expiry.
        debug!(uid = %session.uid, "Signed out");
        Ok(())
    }

    async fn verify(&self, id_token: &str) -> Result<Session, IdentityError> {
        let response: LookupResponse = self.post("lookup", &LookupRequest { id_token }).await?;
        let user = response
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::InvalidToken)?;
        Ok(Session {
            uid: user.local_id,
            email: user.email,
            id_token: id_token.to_string(),
            refresh_token: None,
            expires_in: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_provider_error_codes() {
        assert!(matches!(
            map_provider_error("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(map_provider_error("EMAIL_EXISTS"), IdentityError::EmailExists));
        assert!(matches!(
            map_provider_error("INVALID_ID_TOKEN"),
            IdentityError::InvalidToken
        ));
        match map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters") {
            IdentityError::Rejected(msg) => assert!(msg.starts_with("WEAK_PASSWORD")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            map_provider_error("QUOTA_EXCEEDED"),
            IdentityError::Provider(_)
        ));
    }

    #[test]
    fn test_idp_post_body_encodes_tokens() {
        let body = idp_post_body(&FederatedCredential {
            provider_id: "google.com".to_string(),
            id_token: Some("a+b/c=".to_string()),
            access_token: None,
        })
        .unwrap();
        assert_eq!(body, "id_token=a%2Bb%2Fc%3D&providerId=google.com");
    }

    #[test]
    fn test_idp_post_body_requires_token() {
        let err = idp_post_body(&FederatedCredential {
            provider_id: "google.com".to_string(),
            id_token: None,
            access_token: None,
        })
        .unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(_)));
    }

    #[test]
    fn test_auth_response_into_session() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"localId":"abc","email":"ada@example.com","idToken":"tok","refreshToken":"ref","expiresIn":"3600"}"#,
        )
        .unwrap();
        let session: Session = response.into();
        assert_eq!(session.uid, "abc");
        assert_eq!(session.expires_in, Some(3600));
    }
}
