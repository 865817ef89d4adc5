use std::sync::Arc;

use crate::auth::{Authenticator, JwtAuthenticator};
use crate::database::ItemStore;
use crate::services::ItemService;

/// Long-lived dependencies shared by every handler. Built once in `main` and
/// cloned per request; no process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub items: ItemService,
    /// Gate consulted by the protected routes
    pub authenticator: Arc<dyn Authenticator>,
    /// Token issuer for `/login`
    pub tokens: Arc<JwtAuthenticator>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, tokens: Arc<JwtAuthenticator>) -> Self {
        Self {
            items: ItemService::new(store),
            authenticator: tokens.clone(),
            tokens,
        }
    }

    /// Swaps the gate while keeping the issuer.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }
}
