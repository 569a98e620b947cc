//! Paired request/response snapshot for diagnostics and dispatch

use serde_json::json;

use crate::request::Request;
use crate::response::Response;

/// Immutable snapshot pairing a request with the response it produced.
///
/// Contexts are built fresh for every exchange and handed to status
/// handlers and response-classified errors. The display form masks
/// credential headers on both sides; raw values remain reachable through
/// the embedded snapshots.
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    request: Request<String>,
    response: Response<String>,
}

impl ExchangeContext {
    pub fn new(request: Request<String>, response: Response<String>) -> Self {
        Self { request, response }
    }

    pub fn request(&self) -> &Request<String> {
        &self.request
    }

    pub fn response(&self) -> &Response<String> {
        &self.response
    }

    /// Sanitized JSON rendering of both sides of the exchange.
    pub fn to_display_string(&self) -> String {
        json!({
            "request": self.request.display_value(),
            "response": self.response.display_value(),
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use crate::MASKED_VALUE;
    use reqwest::StatusCode;

    #[test]
    fn test_display_covers_both_sides() {
        let request = RequestBuilder::get()
            .uri("https://api.example.com/items")
            .header("Authorization", "Bearer s3cr3t")
            .build()
            .unwrap()
            .snapshot();
        let response = Response::new(
            StatusCode::NOT_FOUND,
            vec![("content-type".to_string(), "text/plain".to_string())],
            "missing".to_string(),
        );
        let context = ExchangeContext::new(request, response);

        let shown = context.to_display_string();
        assert!(shown.contains("\"request\""));
        assert!(shown.contains("\"response\""));
        assert!(shown.contains("https://api.example.com/items"));
        assert!(shown.contains("missing"));
        assert!(shown.contains(MASKED_VALUE));
        assert!(!shown.contains("s3cr3t"));
        assert_eq!(context.response().status(), StatusCode::NOT_FOUND);
    }
}
