use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::usecase::ports::api::{AuthSession, Credentials, GovernanceApi};
use crate::usecase::ports::store::{LocalStore, AUTH_TOKEN_KEY, DISPLAY_NAME_KEY};

/// Sign-in state: the bearer token lives in local storage and is handed to the
/// API client on startup and after every sign-in.
pub struct SessionService {
    api: Arc<dyn GovernanceApi>,
    store: Arc<dyn LocalStore>,
}

impl SessionService {
    pub fn new(api: Arc<dyn GovernanceApi>, store: Arc<dyn LocalStore>) -> Self {
        Self { api, store }
    }

    /// Loads a previously stored token. Returns the signed-in display name.
    pub fn restore(&self) -> Result<Option<String>> {
        self.store.init().map_err(|err| anyhow!(err.to_string()))?;
        let token = self
            .store
            .load_setting(AUTH_TOKEN_KEY)
            .map_err(|err| anyhow!(err.to_string()))?;
        let Some(token) = token else {
            return Ok(None);
        };
        self.api.set_token(Some(token));
        let name = self
            .store
            .load_setting(DISPLAY_NAME_KEY)
            .map_err(|err| anyhow!(err.to_string()))?;
        Ok(Some(name.unwrap_or_default()))
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            anyhow::bail!("email and password are required");
        }
        let session = self.api.login(credentials).await?;
        self.store
            .save_setting(AUTH_TOKEN_KEY, &session.token)
            .map_err(|err| anyhow!(err.to_string()))?;
        self.store
            .save_setting(DISPLAY_NAME_KEY, &session.display_name)
            .map_err(|err| anyhow!(err.to_string()))?;
        self.api.set_token(Some(session.token.clone()));
        tracing::info!(user = %session.display_name, "signed in");
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.api.set_token(None);
        self.store
            .delete_setting(AUTH_TOKEN_KEY)
            .and_then(|_| self.store.delete_setting(DISPLAY_NAME_KEY))
            .map_err(|err| anyhow!(err.to_string()))?;
        tracing::info!("signed out");
        Ok(())
    }
}
