//! Authentication strategies for bound transports
//!
//! A client authenticates in exactly one of four ways: not at all, with
//! preemptive basic credentials, with a TLS client certificate, or with
//! OAuth client-credentials bearer tokens fetched per request. The variant
//! is chosen at configuration time and fixed for the client's lifetime.
//!
//! Debug output masks every secret field, so configurations are safe to log.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validate::{ensure_not_blank, ensure_valid_host};
use crate::MASKED_VALUE;

/// Default token endpoint path on the OAuth server.
pub const DEFAULT_OAUTH_API_PATH: &str = "/oauth/token";

/// Default request header carrying the bearer token.
pub const DEFAULT_OAUTH_HEADER_KEY: &str = "Authorization";

/// Closed set of authentication strategies.
///
/// Adding a variant here is the only way to add a strategy; transports are
/// bound by matching on this enum.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthenticationConfig {
    /// No credential injection.
    NoAuth,
    /// Basic credentials attached preemptively to every outgoing request.
    ///
    /// The username must not be blank; an empty password is allowed.
    Basic { username: String, password: String },
    /// Mutual TLS with a client identity from PEM key material.
    ClientCert { keystore: KeystoreConfig },
    /// Client-credentials bearer tokens fetched from an OAuth server.
    OAuth { server: OAuthServerConfig },
}

impl AuthenticationConfig {
    /// Basic credentials variant.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthenticationConfig::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The discriminant of this configuration, used in error messages and
    /// logs.
    pub fn kind(&self) -> AuthenticationKind {
        match self {
            AuthenticationConfig::NoAuth => AuthenticationKind::NoAuth,
            AuthenticationConfig::Basic { .. } => AuthenticationKind::Basic,
            AuthenticationConfig::ClientCert { .. } => AuthenticationKind::ClientCert,
            AuthenticationConfig::OAuth { .. } => AuthenticationKind::OAuth,
        }
    }

    /// Validate the variant's required fields.
    pub fn validate(&self) -> Result<()> {
        match self {
            AuthenticationConfig::NoAuth => Ok(()),
            AuthenticationConfig::Basic { username, .. } => ensure_not_blank(username, "username"),
            AuthenticationConfig::ClientCert { keystore } => keystore.validate(),
            AuthenticationConfig::OAuth { server } => server.validate(),
        }
    }
}

impl fmt::Debug for AuthenticationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticationConfig::NoAuth => write!(f, "NoAuth"),
            AuthenticationConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &MASKED_VALUE)
                .finish(),
            AuthenticationConfig::ClientCert { keystore } => f
                .debug_struct("ClientCert")
                .field("keystore", keystore)
                .finish(),
            AuthenticationConfig::OAuth { server } => {
                f.debug_struct("OAuth").field("server", server).finish()
            }
        }
    }
}

/// Discriminant names of [`AuthenticationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationKind {
    NoAuth,
    Basic,
    ClientCert,
    OAuth,
}

impl fmt::Display for AuthenticationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthenticationKind::NoAuth => "NoAuth",
            AuthenticationKind::Basic => "Basic",
            AuthenticationKind::ClientCert => "ClientCert",
            AuthenticationKind::OAuth => "OAuth",
        };
        write!(f, "{}", name)
    }
}

/// OAuth server coordinates for the client-credentials grant.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthServerConfig {
    /// Token server host, e.g. `https://auth.example.com`.
    pub host: String,
    /// Path of the token endpoint on the host.
    pub api_path: String,
    /// Client identifier presented as the basic username on token fetches.
    pub client_id: String,
    /// Client secret presented as the basic password. May be empty.
    pub client_secret: String,
    /// Request header that receives the `Bearer` token.
    pub header_key: String,
}

impl OAuthServerConfig {
    /// Server config with the default token path and header key.
    pub fn new(
        host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            api_path: DEFAULT_OAUTH_API_PATH.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            header_key: DEFAULT_OAUTH_HEADER_KEY.to_string(),
        }
    }

    /// Override the token endpoint path.
    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Override the header that carries the bearer token.
    pub fn with_header_key(mut self, header_key: impl Into<String>) -> Self {
        self.header_key = header_key.into();
        self
    }

    /// Absolute token endpoint URI.
    pub fn token_uri(&self) -> String {
        format!("{}{}", self.host, self.api_path)
    }

    /// Validate host, client id and header key. The secret and path may be
    /// empty.
    pub fn validate(&self) -> Result<()> {
        ensure_valid_host(&self.host)?;
        ensure_not_blank(&self.client_id, "client_id")?;
        ensure_not_blank(&self.header_key, "header_key")?;
        Ok(())
    }
}

impl fmt::Debug for OAuthServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthServerConfig")
            .field("host", &self.host)
            .field("api_path", &self.api_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &MASKED_VALUE)
            .field("header_key", &self.header_key)
            .finish()
    }
}

/// Client identity material for mutual TLS, held as PEM text.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystoreConfig {
    /// Client certificate chain in PEM form.
    pub certificate_pem: String,
    /// Private key in PEM form.
    pub private_key_pem: String,
    /// Name identifying the key in logs and transport errors.
    pub key_alias: String,
}

impl KeystoreConfig {
    pub fn new(
        certificate_pem: impl Into<String>,
        private_key_pem: impl Into<String>,
        key_alias: impl Into<String>,
    ) -> Self {
        Self {
            certificate_pem: certificate_pem.into(),
            private_key_pem: private_key_pem.into(),
            key_alias: key_alias.into(),
        }
    }

    /// Load certificate and key from PEM files on disk.
    pub fn from_pem_files(
        certificate: &Path,
        private_key: &Path,
        key_alias: impl Into<String>,
    ) -> Result<Self> {
        let certificate_pem = std::fs::read_to_string(certificate)?;
        let private_key_pem = std::fs::read_to_string(private_key)?;
        Ok(Self::new(certificate_pem, private_key_pem, key_alias))
    }

    /// Combined PEM blob (key first, then certificate) in the form the
    /// transport layer consumes.
    pub(crate) fn identity_pem(&self) -> Vec<u8> {
        let mut pem = Vec::with_capacity(self.private_key_pem.len() + self.certificate_pem.len() + 1);
        pem.extend_from_slice(self.private_key_pem.as_bytes());
        if !self.private_key_pem.ends_with('\n') {
            pem.push(b'\n');
        }
        pem.extend_from_slice(self.certificate_pem.as_bytes());
        pem
    }

    /// All three fields are required.
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.certificate_pem, "certificate_pem")?;
        ensure_not_blank(&self.private_key_pem, "private_key_pem")?;
        ensure_not_blank(&self.key_alias, "key_alias")?;
        Ok(())
    }
}

impl fmt::Debug for KeystoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreConfig")
            .field(
                "certificate_pem",
                &format_args!("[{} bytes]", self.certificate_pem.len()),
            )
            .field("private_key_pem", &MASKED_VALUE)
            .field("key_alias", &self.key_alias)
            .finish()
    }
}
