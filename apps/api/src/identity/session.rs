use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::{FederatedCredential, IdentityError, IdentityProvider, Session};

/// What a client currently knows about its session.
///
/// `Unknown` means restoration has not finished yet; consumers should only
/// act (e.g. redirect) on `Absent` or `Present`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Absent,
    Present(Session),
}

impl SessionState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Present(session) => Some(session),
            _ => None,
        }
    }
}

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct Shared {
    state: SessionState,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client-side session tracker over an [`IdentityProvider`].
///
/// Every sign-in, sign-up, sign-out or restore publishes the resulting state
/// to all subscribers, even when it equals the previous one.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    shared: Arc<Mutex<Shared>>,
}

/// Handle returned by [`SessionManager::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    shared: Weak<Mutex<Shared>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl SessionManager {
    /// A manager with no stored session: subscribers first see `Absent`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_state(provider, SessionState::Absent)
    }

    /// A manager awaiting [`restore`](Self::restore): subscribers first see `Unknown`.
    pub fn pending(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_state(provider, SessionState::Unknown)
    }

    fn with_state(provider: Arc<dyn IdentityProvider>, state: SessionState) -> Self {
        Self {
            provider,
            shared: Arc::new(Mutex::new(Shared {
                state,
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub fn current(&self) -> SessionState {
        lock(&self.shared).state.clone()
    }

    /// Calls `callback` now with the current state, then on every change
    /// until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(callback);
        let (id, state) = {
            let mut shared = lock(&self.shared);
            let id = shared.next_id;
            shared.next_id += 1;
            shared.listeners.push((id, listener.clone()));
            (id, shared.state.clone())
        };
        listener(&state);
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn publish(&self, state: SessionState) {
        let listeners: Vec<Listener> = {
            let mut shared = lock(&self.shared);
            shared.state = state.clone();
            shared.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        debug!(settled = state.is_settled(), "Session state changed");
        for listener in listeners {
            listener(&state);
        }
    }

    /// Settles an `Unknown` state from a stored token, if any.
    ///
    /// Only a missing or rejected token settles to `Absent`. If the provider
    /// cannot be reached the state is left untouched and the error returned,
    /// so a later retry can still settle it.
    pub async fn restore(&self, id_token: Option<&str>) -> Result<SessionState, IdentityError> {
        let state = match id_token {
            Some(token) => match self.provider.verify(token).await {
                Ok(session) => SessionState::Present(session),
                Err(IdentityError::InvalidToken) => SessionState::Absent,
                Err(e) => {
                    warn!("Session restore failed, state left unsettled: {e}");
                    return Err(e);
                }
            },
            None => SessionState::Absent,
        };
        self.publish(state.clone());
        Ok(state)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.publish(SessionState::Present(session.clone()));
        Ok(session)
    }

    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let session = self.provider.sign_up_with_password(email, password).await?;
        self.publish(SessionState::Present(session.clone()));
        Ok(session)
    }

    pub async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, IdentityError> {
        let session = self.provider.sign_in_with_federated(credential).await?;
        self.publish(SessionState::Present(session.clone()));
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        if let SessionState::Present(session) = self.current() {
            self.provider.sign_out(&session).await?;
        }
        self.publish(SessionState::Absent);
        Ok(())
    }
}
