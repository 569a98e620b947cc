//! Decoded response snapshot

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::request::sanitized_headers_value;

/// Outcome of one exchange: transport status, response headers, and the
/// decoder's entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    status: StatusCode,
    headers: Vec<(String, String)>,
    entity: T,
}

impl<T> Response<T> {
    pub fn new(status: StatusCode, headers: Vec<(String, String)>, entity: T) -> Self {
        Self {
            status,
            headers,
            entity,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers in wire order. Duplicate names are preserved.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn entity(&self) -> &T {
        &self.entity
    }

    pub fn into_entity(self) -> T {
        self.entity
    }
}

impl Response<String> {
    /// Sanitized JSON rendering with credential headers masked.
    pub fn to_display_string(&self) -> String {
        self.display_value().to_string()
    }

    pub(crate) fn display_value(&self) -> Value {
        json!({
            "status": self.status.as_u16(),
            "headers": sanitized_headers_value(&self.headers),
            "entity": self.entity,
        })
    }
}
