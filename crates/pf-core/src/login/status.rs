use serde::{Deserialize, Serialize};

/// Account summary returned alongside an authenticated status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Session status as reported by `AuthBackendPort::get_status`.
///
/// Older backends send `isAuthenticated` instead of `authenticated`; both are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default, alias = "isAuthenticated")]
    pub authenticated: bool,
    #[serde(default)]
    pub has_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
}

impl AuthStatus {
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            has_token: true,
            token_valid: Some(true),
            user: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Only an explicit `authenticated` flag counts. A stored token that has
    /// not been validated yet does not.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
