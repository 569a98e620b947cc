//! Transport binding: from authentication configuration to a sending client
//!
//! [`TransportFactory::bind`] turns a validated [`ClientConfig`] into an
//! [`HttpTransport`] whose credential behavior matches the configured
//! variant. Binding acquires network resources once; the bound transport is
//! reused for every request of a pipeline.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use url::Url;

use crate::auth::AuthenticationConfig;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::{Body, Request};
use crate::token::{AccessTokenProvider, ClientCredentialsTokenProvider};

/// Fixed connect and read timeout applied to client-certificate transports.
pub const DEFAULT_KEYSTORE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Raw transport outcome before decoding.
pub struct RawResponse {
    pub status: reqwest::StatusCode,
    /// Response headers in wire order.
    pub headers: Vec<(String, String)>,
    /// Body text, or the read failure. Read failures are classified by the
    /// pipeline as decode-stage errors, not connection errors.
    pub body: std::result::Result<String, anyhow::Error>,
}

/// A bound network client: sends one wire-complete request snapshot and
/// returns the raw response.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request<String>) -> Result<RawResponse>;
}

/// reqwest-backed transport produced by [`TransportFactory::bind`].
pub struct HttpTransport {
    client: Client,
    basic: Option<BasicCredentials>,
    bearer: Option<BearerInjection>,
}

#[derive(Clone)]
struct BasicCredentials {
    username: String,
    password: String,
}

struct BearerInjection {
    provider: Box<dyn AccessTokenProvider>,
    header_key: String,
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request<String>) -> Result<RawResponse> {
        let url = Url::parse(request.uri())
            .map_err(|e| Error::connection(request.to_display_string(), e.into()))?;

        let mut builder = self.client.request(request.method().clone(), url);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(basic) = &self.basic {
            builder = builder.basic_auth(&basic.username, Some(&basic.password));
        }
        if let Some(bearer) = &self.bearer {
            // Token fetch failures propagate unwrapped so callers see the
            // nested exchange's own classification.
            let token = bearer.provider.retrieve_access_token()?;
            builder = builder.header(bearer.header_key.as_str(), format!("Bearer {}", token));
        }
        builder = match request.body() {
            None => builder,
            Some(Body::Text(text)) => builder.body(text.clone()),
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Multipart(parts)) => {
                let mut form = multipart::Form::new();
                for part in parts {
                    form = form.text(part.name.clone(), part.content.clone());
                }
                builder.multipart(form)
            }
        };

        log::debug!("sending {} {}", request.method(), request.uri());
        let response = builder
            .send()
            .map_err(|e| Error::connection(request.to_display_string(), e.into()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().map_err(anyhow::Error::from);
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("basic", &self.basic.is_some())
            .field("bearer", &self.bearer.is_some())
            .finish()
    }
}

/// Builds transports for each authentication variant.
#[derive(Debug, Clone)]
pub struct TransportFactory {
    keystore_timeout: Duration,
}

impl TransportFactory {
    pub fn new() -> Self {
        Self {
            keystore_timeout: DEFAULT_KEYSTORE_TIMEOUT,
        }
    }

    /// Override the fixed client-certificate timeout.
    pub fn with_keystore_timeout(mut self, timeout: Duration) -> Self {
        self.keystore_timeout = timeout;
        self
    }

    /// Bind `config` to a concrete transport.
    ///
    /// The configuration is re-validated first; TLS material and proxy
    /// settings are checked here, so an unusable identity fails the bind
    /// rather than the first request.
    pub fn bind(&self, config: &ClientConfig) -> Result<HttpTransport> {
        config.validate()?;
        match config.authentication() {
            AuthenticationConfig::NoAuth => Ok(HttpTransport {
                client: self.base_client(config)?,
                basic: None,
                bearer: None,
            }),
            AuthenticationConfig::Basic { username, password } => Ok(HttpTransport {
                client: self.base_client(config)?,
                basic: Some(BasicCredentials {
                    username: username.clone(),
                    password: password.clone(),
                }),
                bearer: None,
            }),
            AuthenticationConfig::ClientCert { keystore } => {
                let identity = reqwest::Identity::from_pem(&keystore.identity_pem()).map_err(
                    |e| Error::TransportCreation {
                        message: format!("Could not load TLS identity [{}].", keystore.key_alias),
                        source: Some(e.into()),
                    },
                )?;
                let client = self
                    .client_builder(config)?
                    .use_rustls_tls()
                    .identity(identity)
                    .connect_timeout(self.keystore_timeout)
                    .timeout(self.keystore_timeout)
                    .build()
                    .map_err(|e| Error::TransportCreation {
                        message: "Could not create TLS transport.".to_string(),
                        source: Some(e.into()),
                    })?;
                Ok(HttpTransport {
                    client,
                    basic: None,
                    bearer: None,
                })
            }
            AuthenticationConfig::OAuth { server } => {
                let provider = ClientCredentialsTokenProvider::from_config(config)?;
                Ok(HttpTransport {
                    client: self.base_client(config)?,
                    basic: None,
                    bearer: Some(BearerInjection {
                        provider: Box::new(provider),
                        header_key: server.header_key.clone(),
                    }),
                })
            }
        }
    }

    fn client_builder(&self, config: &ClientConfig) -> Result<reqwest::blocking::ClientBuilder> {
        let mut builder = Client::builder();
        if let Some(proxy) = config.proxy() {
            let uri = proxy.uri();
            let proxy = reqwest::Proxy::all(&uri).map_err(|e| Error::TransportCreation {
                message: format!("Could not configure proxy [{}].", uri),
                source: Some(e.into()),
            })?;
            builder = builder.proxy(proxy);
        }
        Ok(builder)
    }

    fn base_client(&self, config: &ClientConfig) -> Result<Client> {
        self.client_builder(config)?
            .build()
            .map_err(|e| Error::TransportCreation {
                message: "Could not create HTTP transport.".to_string(),
                source: Some(e.into()),
            })
    }
}

impl Default for TransportFactory {
    fn default() -> Self {
        Self::new()
    }
}
