//! Client configuration and its builder
//!
//! A [`ClientConfig`] pairs the target host with one authentication
//! strategy and an optional proxy route. Configurations are validated at
//! build time and immutable afterwards; a bound transport never observes a
//! half-configured client.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{AuthenticationConfig, KeystoreConfig, OAuthServerConfig};
use crate::error::Result;
use crate::validate::{ensure_not_blank, ensure_valid_host};

/// Proxy route applied to all traffic of a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
}

impl ProxyConfig {
    /// HTTP proxy at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: "http".to_string(),
        }
    }

    /// Override the proxy scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Proxy URI in `scheme://host:port` form.
    pub fn uri(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.host, "proxy host")
    }
}

/// Immutable client configuration: target host, authentication strategy,
/// optional proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    host: String,
    authentication: AuthenticationConfig,
    proxy: Option<ProxyConfig>,
}

impl ClientConfig {
    /// Start building a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Target host, e.g. `https://api.example.com`.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn authentication(&self) -> &AuthenticationConfig {
        &self.authentication
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    /// Absolute URI for `path` on the configured host.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Re-check all invariants. Builders call this, so an instance obtained
    /// through [`ClientConfig::builder`] is always valid.
    pub fn validate(&self) -> Result<()> {
        ensure_valid_host(&self.host)?;
        self.authentication.validate()?;
        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    host: Option<String>,
    authentication: Option<AuthenticationConfig>,
    proxy: Option<ProxyConfig>,
}

impl ClientConfigBuilder {
    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the target host from a parsed URL, keeping scheme, host and any
    /// explicit port.
    pub fn host_url(mut self, url: &Url) -> Self {
        let host = match url.port() {
            Some(port) => format!(
                "{}://{}:{}",
                url.scheme(),
                url.host_str().unwrap_or(""),
                port
            ),
            None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("")),
        };
        self.host = Some(host);
        self
    }

    /// Set the authentication strategy.
    pub fn authentication(mut self, authentication: AuthenticationConfig) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Shorthand for [`AuthenticationConfig::NoAuth`].
    pub fn no_authentication(self) -> Self {
        self.authentication(AuthenticationConfig::NoAuth)
    }

    /// Shorthand for basic credentials.
    pub fn basic_authentication(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.authentication(AuthenticationConfig::basic(username, password))
    }

    /// Shorthand for a TLS client certificate.
    pub fn client_cert_authentication(self, keystore: KeystoreConfig) -> Self {
        self.authentication(AuthenticationConfig::ClientCert { keystore })
    }

    /// Shorthand for OAuth client credentials.
    pub fn oauth_authentication(self, server: OAuthServerConfig) -> Self {
        self.authentication(AuthenticationConfig::OAuth { server })
    }

    /// Route all traffic through `proxy`.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Validate and build. A missing authentication defaults to
    /// [`AuthenticationConfig::NoAuth`]; a missing host is an error.
    pub fn build(self) -> Result<ClientConfig> {
        let config = ClientConfig {
            host: self.host.unwrap_or_default(),
            authentication: self.authentication.unwrap_or(AuthenticationConfig::NoAuth),
            proxy: self.proxy,
        };
        config.validate()?;
        Ok(config)
    }
}
