//! Portico Core - authenticated REST client pipeline
//!
//! This library executes REST calls against a configured host under
//! interchangeable authentication strategies, and converts transport-level
//! and application-level failures into a typed error taxonomy that carries
//! the full request/response context with credentials masked.
//!
//! # Main Components
//!
//! - **Authentication**: a closed set of strategies (none, basic, TLS
//!   client certificate, OAuth client credentials) bound to concrete
//!   transports by [`TransportFactory`]
//! - **Execution pipeline**: [`ExecutionPipeline`] runs one exchange per
//!   call: send, decode, dispatch, with no retries
//! - **Status dispatch**: [`StatusDispatcher`] maps status codes to
//!   handlers, with a built-in 401 handler
//! - **Error handling**: comprehensive error types using `thiserror` and
//!   `anyhow`
//!
//! # Example
//!
//! ```no_run
//! use portico_core::{ClientConfig, ExecutionPipeline, RequestBuilder, Result};
//!
//! fn fetch_status() -> Result<String> {
//!     let config = ClientConfig::builder()
//!         .host("https://api.example.com")
//!         .basic_authentication("user", "secret")
//!         .build()?;
//!     let pipeline = ExecutionPipeline::new(&config)?;
//!
//!     let request = RequestBuilder::get()
//!         .uri(config.endpoint("/v1/status"))
//!         .build()?;
//!     let response = pipeline.execute(&request)?;
//!     Ok(response.into_entity())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod token;
pub mod transport;

mod validate;

// Re-export main types for convenience
pub use auth::{
    AuthenticationConfig, AuthenticationKind, KeystoreConfig, OAuthServerConfig,
    DEFAULT_OAUTH_API_PATH, DEFAULT_OAUTH_HEADER_KEY,
};
pub use config::{ClientConfig, ClientConfigBuilder, ProxyConfig};
pub use context::ExchangeContext;
pub use decode::{JsonDecoder, PropertiesDecoder, ResponseDecoder, StringDecoder};
pub use dispatch::{ContextHandler, StatusDispatcher};
pub use error::{Error, Result};
pub use pipeline::ExecutionPipeline;
pub use request::{Body, EntityPart, Request, RequestBuilder};
pub use response::Response;
pub use token::{AccessTokenProvider, ClientCredentialsTokenProvider};
pub use transport::{
    HttpTransport, RawResponse, Transport, TransportFactory, DEFAULT_KEYSTORE_TIMEOUT,
};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};

/// Placeholder shown instead of secret values in display and debug forms.
pub const MASKED_VALUE: &str = "********";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_masked_value() {
        assert_eq!(MASKED_VALUE, "********");
    }
}
