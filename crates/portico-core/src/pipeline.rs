//! The exchange pipeline: send, decode, dispatch
//!
//! [`ExecutionPipeline`] is the single entry point for running requests.
//! Every execution is one network round trip (plus one nested token fetch
//! when the transport is OAuth-bound): there are no retries and no partial
//! results. Failures are classified by stage: connection errors while
//! sending, decode errors while reading the body, and dispatch verdicts for
//! the status code.

use crate::config::ClientConfig;
use crate::context::ExchangeContext;
use crate::decode::{ResponseDecoder, StringDecoder};
use crate::dispatch::StatusDispatcher;
use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{RawResponse, Transport, TransportFactory};

/// Executes requests through a bound transport and classifies failures.
pub struct ExecutionPipeline {
    transport: Box<dyn Transport>,
}

impl ExecutionPipeline {
    /// Bind `config` with the default transport factory.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Box::new(TransportFactory::new().bind(config)?),
        })
    }

    /// Run on an already-built transport. Mainly useful for tests and for
    /// sharing a transport bound with a customized factory.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute with the default string decoder and a fresh default
    /// dispatcher.
    pub fn execute<T>(&self, request: &Request<T>) -> Result<Response<String>> {
        self.execute_with(request, &StringDecoder)
    }

    /// Execute with `decoder` and a fresh default dispatcher.
    pub fn execute_with<T, R, D>(&self, request: &Request<T>, decoder: &D) -> Result<Response<R>>
    where
        D: ResponseDecoder<R>,
    {
        self.execute_dispatched(request, decoder, &StatusDispatcher::new())
    }

    /// Full form: send, decode with `decoder`, then dispatch the status
    /// code through `dispatcher`.
    pub fn execute_dispatched<T, R, D>(
        &self,
        request: &Request<T>,
        decoder: &D,
        dispatcher: &StatusDispatcher,
    ) -> Result<Response<R>>
    where
        D: ResponseDecoder<R>,
    {
        let wire = request.snapshot();
        let raw = self.transport.send(&wire)?;

        let RawResponse {
            status,
            headers,
            body,
        } = raw;
        let body = match body {
            Ok(body) => body,
            Err(source) => {
                log::warn!("failed to read response body: {}", source);
                let context =
                    ExchangeContext::new(wire, Response::new(status, headers, String::new()));
                return Err(Error::decode(context, source));
            }
        };
        let entity = match decoder.decode(&body) {
            Ok(entity) => entity,
            Err(source) => {
                let context =
                    ExchangeContext::new(wire, Response::new(status, headers, String::new()));
                return Err(Error::decode(context, source));
            }
        };

        let context = ExchangeContext::new(
            wire,
            Response::new(status, headers.clone(), decoder.display(&entity)),
        );
        dispatcher.dispatch(status, &context)?;
        Ok(Response::new(status, headers, entity))
    }
}

impl std::fmt::Debug for ExecutionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPipeline").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::JsonDecoder;
    use crate::request::RequestBuilder;
    use reqwest::StatusCode;
    use serde::{Deserialize, Serialize};

    struct StubTransport {
        status: StatusCode,
        body: std::result::Result<String, String>,
    }

    impl StubTransport {
        fn ok(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                body: Ok(body.to_string()),
            }
        }

        fn broken_body(status: StatusCode, message: &str) -> Self {
            Self {
                status,
                body: Err(message.to_string()),
            }
        }
    }

    impl Transport for StubTransport {
        fn send(&self, _request: &Request<String>) -> Result<RawResponse> {
            Ok(RawResponse {
                status: self.status,
                headers: vec![("content-type".to_string(), "text/plain".to_string())],
                body: self
                    .body
                    .clone()
                    .map_err(|message| anyhow::anyhow!(message)),
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&self, request: &Request<String>) -> Result<RawResponse> {
            Err(Error::connection(
                request.to_display_string(),
                anyhow::anyhow!("connection refused"),
            ))
        }
    }

    fn sample_request() -> Request<String> {
        RequestBuilder::get()
            .uri("https://api.example.com/items")
            .build()
            .unwrap()
    }

    #[test]
    fn test_successful_exchange() {
        let pipeline =
            ExecutionPipeline::with_transport(Box::new(StubTransport::ok(StatusCode::CREATED, "ok")));
        let response = pipeline.execute(&sample_request()).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.entity(), "ok");
    }

    #[test]
    fn test_error_status_carries_context() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(StubTransport::ok(
            StatusCode::NOT_FOUND,
            "missing",
        )));
        let err = pipeline.execute(&sample_request()).unwrap_err();
        let context = err.exchange_context().expect("context attached");
        assert_eq!(context.response().status(), StatusCode::NOT_FOUND);
        assert_eq!(context.response().entity(), "missing");
        assert_eq!(context.request().uri(), "https://api.example.com/items");
    }

    #[test]
    fn test_unauthorized_status_classified() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(StubTransport::ok(
            StatusCode::UNAUTHORIZED,
            "denied",
        )));
        let err = pipeline.execute(&sample_request()).unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
    }

    #[test]
    fn test_custom_dispatcher_overrides_verdict() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(StubTransport::ok(
            StatusCode::NOT_FOUND,
            "missing",
        )));
        let mut dispatcher = StatusDispatcher::new();
        dispatcher.register(StatusCode::NOT_FOUND, |_context| Ok(()));
        let response = pipeline
            .execute_dispatched(&sample_request(), &StringDecoder, &dispatcher)
            .unwrap();
        assert_eq!(response.entity(), "missing");
    }

    #[test]
    fn test_body_read_failure_classified_as_decode() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(StubTransport::broken_body(
            StatusCode::OK,
            "stream interrupted",
        )));
        let err = pipeline.execute(&sample_request()).unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
        assert!(err.to_string().contains("Failed to decode response."));
        // The context keeps status and headers; the entity is empty.
        let context = err.exchange_context().unwrap();
        assert_eq!(context.response().status(), StatusCode::OK);
        assert_eq!(context.response().entity(), "");
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_decode_failure_carries_context() {
        let pipeline =
            ExecutionPipeline::with_transport(Box::new(StubTransport::ok(StatusCode::OK, "not json")));
        let err = pipeline
            .execute_with(&sample_request(), &JsonDecoder::<Item>::new())
            .unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
        assert!(err.exchange_context().is_some());
    }

    #[test]
    fn test_typed_decoding() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(StubTransport::ok(
            StatusCode::OK,
            "{\"name\":\"widget\"}",
        )));
        let response = pipeline
            .execute_with(&sample_request(), &JsonDecoder::<Item>::new())
            .unwrap();
        assert_eq!(response.entity().name, "widget");
    }

    #[test]
    fn test_connection_failure_propagates() {
        let pipeline = ExecutionPipeline::with_transport(Box::new(FailingTransport));
        let err = pipeline.execute(&sample_request()).unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
        assert!(err
            .sanitized_request()
            .unwrap()
            .contains("https://api.example.com/items"));
    }
}
