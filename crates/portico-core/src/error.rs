//! Error types for the Portico core library
//!
//! This module defines the error taxonomy for the exchange pipeline, using
//! thiserror for ergonomic error definitions and anyhow for wrapped causes.
//! Every failure that carries exchange data embeds the sanitized display
//! forms, so secrets never leak through error messages.

use thiserror::Error;

use crate::context::ExchangeContext;

/// Main error type for Portico operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid construction-time input: blank required fields, malformed
    /// host URLs, or the wrong authentication variant handed to a factory
    /// that requires a specific one.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A transport could not be built from otherwise well-formed
    /// configuration, e.g. unusable TLS key material or a bad proxy URI.
    #[error("Transport creation failed: {message}")]
    TransportCreation {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Request assembly failed: unset or unparsable URI, or an entity that
    /// could not be serialized.
    #[error("Request build failed: {message}")]
    RequestBuild {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Network I/O failed while executing a request. Carries the sanitized
    /// request display for diagnostics.
    #[error("{message}")]
    Connection {
        message: String,
        request: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The response could not be decoded, or its status code was classified
    /// as an error by the dispatcher. Carries the full exchange context.
    #[error("{message}")]
    Response {
        message: String,
        context: Box<ExchangeContext>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Dispatched for 401 responses by the built-in handler.
    #[error("{message}")]
    Unauthorized {
        message: String,
        context: Box<ExchangeContext>,
    },

    /// IO errors from file-based configuration helpers
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construction-time failure with a ready-made message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Network I/O failure carrying the sanitized request display.
    pub fn connection(request: String, source: anyhow::Error) -> Self {
        Error::Connection {
            message: format!(
                "I/O error occurred while executing request. Request: [{}].",
                request
            ),
            request,
            source: Some(source),
        }
    }

    /// Decode-stage failure: the body could not be read or decoded.
    pub fn decode(context: ExchangeContext, source: anyhow::Error) -> Self {
        Error::Response {
            message: format!(
                "Failed to decode response. Context: [{}].",
                context.to_display_string()
            ),
            context: Box::new(context),
            source: Some(source),
        }
    }

    /// Escalation for an error status code with no registered handler.
    pub fn error_status(context: ExchangeContext) -> Self {
        Error::Response {
            message: format!(
                "An error HTTP response code was received from server. Context: [{}].",
                context.to_display_string()
            ),
            context: Box::new(context),
            source: None,
        }
    }

    /// Raised by the built-in 401 handler.
    pub fn unauthorized(context: ExchangeContext) -> Self {
        Error::Unauthorized {
            message: format!(
                "The user is not authorized for the current operation. Context: [{}]",
                context.to_display_string()
            ),
            context: Box::new(context),
        }
    }

    /// The exchange context attached to response-classified failures,
    /// `None` for every other variant.
    pub fn exchange_context(&self) -> Option<&ExchangeContext> {
        match self {
            Error::Response { context, .. } | Error::Unauthorized { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// The sanitized request display attached to connection failures.
    pub fn sanitized_request(&self) -> Option<&str> {
        match self {
            Error::Connection { request, .. } => Some(request),
            _ => None,
        }
    }
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use crate::response::Response;
    use reqwest::StatusCode;

    fn sample_context() -> ExchangeContext {
        let request = RequestBuilder::get()
            .uri("https://example.com/api/thing")
            .build()
            .unwrap()
            .snapshot();
        let response = Response::new(StatusCode::NOT_FOUND, Vec::new(), "missing".to_string());
        ExchangeContext::new(request, response)
    }

    #[test]
    fn test_configuration_display() {
        let err = Error::configuration("host cannot be blank.");
        assert_eq!(err.to_string(), "Configuration error: host cannot be blank.");
    }

    #[test]
    fn test_connection_carries_request() {
        let err = Error::connection(
            "{\"method\":\"GET\"}".to_string(),
            anyhow::anyhow!("connection refused"),
        );
        assert_eq!(err.sanitized_request(), Some("{\"method\":\"GET\"}"));
        assert!(err.to_string().contains("I/O error occurred while executing request"));
    }

    #[test]
    fn test_exchange_context_accessor() {
        let err = Error::error_status(sample_context());
        let context = err.exchange_context().expect("response errors carry context");
        assert_eq!(context.response().status(), StatusCode::NOT_FOUND);

        let err = Error::unauthorized(sample_context());
        assert!(err.exchange_context().is_some());

        let err = Error::configuration("nope");
        assert!(err.exchange_context().is_none());
    }

    #[test]
    fn test_unauthorized_display() {
        let err = Error::unauthorized(sample_context());
        assert!(err
            .to_string()
            .starts_with("The user is not authorized for the current operation."));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("missing file"));
    }
}
