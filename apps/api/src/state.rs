use std::sync::Arc;

use crate::ai::AiGateway;
use crate::identity::IdentityProvider;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every provider handle is constructed in `main` and can be swapped for a test double.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub ai: AiGateway,
}
