//! OAuth client-credentials token retrieval
//!
//! An OAuth-bound transport asks its [`AccessTokenProvider`] for a bearer
//! token before every request. The built-in provider runs each fetch as a
//! full exchange through a nested [`ExecutionPipeline`] bound to a derived
//! basic-auth configuration, so the nesting is exactly one level deep and
//! can never recurse.

use serde::{Deserialize, Serialize};

use crate::auth::AuthenticationConfig;
use crate::config::ClientConfig;
use crate::decode::JsonDecoder;
use crate::error::{Error, Result};
use crate::pipeline::ExecutionPipeline;
use crate::request::RequestBuilder;

/// Supplies a bearer token for each outgoing request.
///
/// Providers are stateless from the caller's point of view: one call, one
/// fresh token. Failures propagate unwrapped so callers see the nested
/// exchange's own classification.
pub trait AccessTokenProvider: Send + Sync {
    fn retrieve_access_token(&self) -> Result<String>;
}

/// Token endpoint reply. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
}

/// Client-credentials provider backed by the configured OAuth server.
///
/// The nested pipeline authenticates with basic credentials derived from
/// the server's client id and secret, and inherits the outer proxy.
pub struct ClientCredentialsTokenProvider {
    pipeline: ExecutionPipeline,
    token_uri: String,
}

impl ClientCredentialsTokenProvider {
    /// Build from an OAuth-authenticated configuration. Any other
    /// authentication variant is rejected, naming the variant found.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let server = match config.authentication() {
            AuthenticationConfig::OAuth { server } => server,
            other => {
                return Err(Error::configuration(format!(
                    "The provided configuration is required to have OAuth authentication and it has [{}] authentication type instead.",
                    other.kind()
                )))
            }
        };

        let mut derived = ClientConfig::builder()
            .host(server.host.as_str())
            .basic_authentication(server.client_id.as_str(), server.client_secret.as_str());
        if let Some(proxy) = config.proxy() {
            derived = derived.proxy(proxy.clone());
        }
        let derived = derived.build()?;

        Ok(Self {
            pipeline: ExecutionPipeline::new(&derived)?,
            token_uri: server.token_uri(),
        })
    }
}

impl AccessTokenProvider for ClientCredentialsTokenProvider {
    fn retrieve_access_token(&self) -> Result<String> {
        let request = RequestBuilder::post()
            .uri(self.token_uri.as_str())
            .parameter("grant_type", "client_credentials")
            .parameter("response_type", "token")
            .build()?;
        log::debug!("retrieving access token from {}", self.token_uri);
        let response = self
            .pipeline
            .execute_with(&request, &JsonDecoder::<AccessTokenResponse>::new())?;
        Ok(response.into_entity().access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::OAuthServerConfig;

    #[test]
    fn test_from_config_requires_oauth() {
        let config = ClientConfig::builder()
            .host("https://api.example.com")
            .basic_authentication("user", "secret")
            .build()
            .unwrap();
        let err = ClientCredentialsTokenProvider::from_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: The provided configuration is required to have OAuth \
             authentication and it has [Basic] authentication type instead."
        );
    }

    #[test]
    fn test_from_config_accepts_oauth() {
        let server = OAuthServerConfig::new("https://auth.example.com", "client", "secret")
            .with_api_path("/token/v2");
        let config = ClientConfig::builder()
            .host("https://api.example.com")
            .oauth_authentication(server)
            .build()
            .unwrap();
        let provider = ClientCredentialsTokenProvider::from_config(&config).unwrap();
        assert_eq!(provider.token_uri, "https://auth.example.com/token/v2");
    }

    #[test]
    fn test_token_response_ignores_unknown_fields() {
        let parsed: AccessTokenResponse =
            serde_json::from_str("{\"access_token\":\"tok123\",\"expires_in\":3600}").unwrap();
        assert_eq!(parsed.access_token, "tok123");
    }
}
