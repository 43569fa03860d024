use serde::{Deserialize, Serialize};

/// Proxy the backend should use when it drives the login browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// `http`, `https` or `socks5`.
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxySettings {
    /// `protocol://host:port`, without credentials.
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Options forwarded to `AuthBackendPort::login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveLoginOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySettings>,
}

impl InteractiveLoginOptions {
    pub fn with_proxy(proxy: ProxySettings) -> Self {
        Self { proxy: Some(proxy) }
    }

    /// Proxy to use, if one is configured and enabled.
    pub fn active_proxy(&self) -> Option<&ProxySettings> {
        self.proxy.as_ref().filter(|p| p.enabled)
    }
}
