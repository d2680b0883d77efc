//! Externally supplied transport configuration.
//!
//! Credentials, proxy settings, and the TLS trust policy are provided by the
//! application's preferences layer at transport construction time and live
//! for the duration of one transport instance.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{TransportError, TransportResult};

/// Username/password pair for HTTP basic authentication.
///
/// Absence of a `Credentials` value means no authentication is attempted;
/// a password is only ever carried together with a username.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair. An account with no password uses an
    /// empty string.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Manual Debug so passwords never end up in logs or error chains.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP proxy settings.
///
/// The password is stored base64-encoded at rest (as the preferences layer
/// keeps it) and decoded once, at client construction. The proxy is applied
/// only when [`enabled`](ProxyConfig::enabled) is set and the host is
/// non-empty.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Whether proxying was switched on in the application preferences.
    pub enabled: bool,
    /// Proxy host name or address.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Optional proxy account name.
    pub username: Option<String>,
    /// Optional base64-encoded proxy password.
    pub encoded_password: Option<String>,
}

impl ProxyConfig {
    /// Creates an enabled proxy configuration for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            enabled: true,
            host: host.into(),
            port,
            username: None,
            encoded_password: None,
        }
    }

    /// Attaches proxy credentials. The password must be base64-encoded,
    /// as stored by the preferences layer.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        encoded_password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.encoded_password = Some(encoded_password.into());
        self
    }

    /// Returns true when the proxy should actually be used: enabled and a
    /// non-empty host configured.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.host.trim().is_empty()
    }

    /// Decodes the stored proxy password to plaintext.
    pub fn decoded_password(&self) -> TransportResult<Option<String>> {
        let Some(encoded) = self.encoded_password.as_deref() else {
            return Ok(None);
        };
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| TransportError::ProxyPassword(e.to_string()))?;
        let plaintext =
            String::from_utf8(bytes).map_err(|e| TransportError::ProxyPassword(e.to_string()))?;
        Ok(Some(plaintext))
    }
}

/// Whether TLS certificate validation accepts certificates that would
/// otherwise fail standard validation (self-signed, expired, wrong host).
///
/// Applied per client at construction, so differing policies on separate
/// transport instances cannot interfere with each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Standard certificate validation.
    #[default]
    Strict,
    /// Accept self-signed and otherwise invalid certificates.
    AcceptInvalidCerts,
}

impl TrustPolicy {
    /// Returns true when invalid certificates are to be accepted.
    pub fn accepts_invalid_certs(&self) -> bool {
        matches!(self, Self::AcceptInvalidCerts)
    }
}

/// Everything a backend needs at construction time.
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    /// Proxy configuration, if the application has one.
    pub proxy: Option<ProxyConfig>,
    /// TLS trust policy for HTTPS traffic.
    pub trust: TrustPolicy,
}

impl TransportSettings {
    /// Creates settings with no proxy and strict certificate validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the proxy configuration.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the TLS trust policy.
    pub fn with_trust(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_password_is_used_verbatim() {
        // base64("secret") == "c2VjcmV0"
        let proxy = ProxyConfig::new("proxy.example.com", 8080).with_credentials("user", "c2VjcmV0");
        assert_eq!(proxy.decoded_password().unwrap().as_deref(), Some("secret"));
    }

    #[test]
    fn decoded_password_rejects_invalid_base64() {
        let proxy =
            ProxyConfig::new("proxy.example.com", 8080).with_credentials("user", "not base64!!!");
        assert!(proxy.decoded_password().is_err());
    }

    #[test]
    fn missing_password_decodes_to_none() {
        let proxy = ProxyConfig::new("proxy.example.com", 8080);
        assert_eq!(proxy.decoded_password().unwrap(), None);
    }

    #[test]
    fn proxy_inactive_without_host() {
        let proxy = ProxyConfig::new("  ", 8080);
        assert!(!proxy.is_active());

        let mut proxy = ProxyConfig::new("proxy.example.com", 8080);
        assert!(proxy.is_active());
        proxy.enabled = false;
        assert!(!proxy.is_active());
    }

    #[test]
    fn trust_policy_defaults_to_strict() {
        assert!(!TrustPolicy::default().accepts_invalid_certs());
        assert!(TrustPolicy::AcceptInvalidCerts.accepts_invalid_certs());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn settings_builder() {
        let settings = TransportSettings::new()
            .with_proxy(ProxyConfig::new("proxy.example.com", 3128))
            .with_trust(TrustPolicy::AcceptInvalidCerts);
        assert!(settings.proxy.as_ref().unwrap().is_active());
        assert!(settings.trust.accepts_invalid_certs());
    }
}
