use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{FederatedCredential, IdentityError, IdentityProvider, Session};

struct Account {
    uid: String,
    password: String,
}

/// In-process identity provider for tests.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, Session>>,
    offline: AtomicBool,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes token verification fail as if the provider were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Creates an account and returns a live session for it.
    pub fn register(&self, email: &str, password: &str) -> Session {
        let uid = Uuid::new_v4().to_string();
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        self.issue(&uid, Some(email))
    }

    fn issue(&self, uid: &str, email: Option<&str>) -> Session {
        let session = Session {
            uid: uid.to_string(),
            email: email.map(String::from),
            id_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_in: Some(3600),
        };
        self.tokens
            .lock()
            .unwrap()
            .insert(session.id_token.clone(), session.clone());
        session
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let uid = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.uid.clone(),
                _ => return Err(IdentityError::InvalidCredentials),
            }
        };
        Ok(self.issue(&uid, Some(email)))
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(IdentityError::EmailExists);
        }
        Ok(self.register(email, password))
    }

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, IdentityError> {
        let token = credential
            .id_token
            .as_deref()
            .or(credential.access_token.as_deref())
            .ok_or_else(|| IdentityError::Rejected("missing token".to_string()))?;
        Ok(self.issue(&format!("{}:{}", credential.provider_id, token), None))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), IdentityError> {
        self.tokens.lock().unwrap().remove(&session.id_token);
        Ok(())
    }

    async fn verify(&self, id_token: &str) -> Result<Session, IdentityError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("503 upstream timeout".to_string()));
        }
        self.tokens
            .lock()
            .unwrap()
            .get(id_token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
