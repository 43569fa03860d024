use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::login::{AuthBackendError, AuthStatus, InteractiveLoginOptions};

/// What the backend reports when an interactive login request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginAcceptance {
    /// Browser window opened; the user has not finished yet.
    Launched,
    /// The request blocked until the browser flow completed.
    Completed,
    /// The user dismissed the login window.
    Cancelled,
}

/// Auth REST client.
///
/// Implementations apply their own transport timeouts and report them as
/// `AuthBackendError::Timeout`.
#[async_trait]
pub trait AuthBackendPort: Send + Sync {
    /// Start an interactive login.
    async fn login(
        &self,
        options: &InteractiveLoginOptions,
    ) -> Result<LoginAcceptance, AuthBackendError>;

    /// Current session status.
    async fn get_status(&self) -> Result<AuthStatus, AuthBackendError>;

    /// Exchange a refresh token. Single request/response.
    async fn login_with_token(&self, token: &str) -> Result<(), AuthBackendError>;
}
