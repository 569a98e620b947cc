//! Request model, fluent builder, and sanitized display forms
//!
//! A [`Request`] is an immutable description of one HTTP call: method, URI,
//! ordered headers, and an optional body. Requests are assembled through
//! [`RequestBuilder`], which defers every recoverable failure to
//! [`RequestBuilder::build`] so call chains stay fluent.
//!
//! Display forms returned by [`Request::to_display_string`] mask the values
//! of credential-bearing headers; the raw values stay accessible through the
//! normal accessors.

use percent_encoding::percent_decode_str;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::MASKED_VALUE;

/// Header names whose values are masked in every display form. Matching is
/// ASCII case-insensitive.
pub(crate) const SANITIZED_HEADERS: [&str; 3] =
    ["authorization", "proxy-authenticate", "proxy-authorization"];

/// Wire body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Raw text sent verbatim.
    Text(String),
    /// JSON value serialized onto the wire with a JSON content type.
    Json(Value),
    /// Multipart form of named text parts.
    Multipart(Vec<EntityPart>),
}

/// One named part of a multipart body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPart {
    pub name: String,
    pub content: String,
}

/// An executable request. `T` is the caller's entity type; the wire form of
/// the entity lives in [`Body`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request<T> {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    entity: Option<T>,
}

impl<T> Request<T> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Headers in insertion order. Duplicate names are preserved.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn entity(&self) -> Option<&T> {
        self.entity.as_ref()
    }

    /// Type-erased copy for transports and exchange contexts. The snapshot
    /// carries the body's display text as its entity.
    pub fn snapshot(&self) -> Request<String> {
        Request {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            entity: body_display(self.body.as_ref()),
        }
    }

    /// Sanitized JSON rendering with credential headers masked.
    pub fn to_display_string(&self) -> String {
        self.display_value().to_string()
    }

    pub(crate) fn display_value(&self) -> Value {
        let entity = match body_display(self.body.as_ref()) {
            Some(text) => Value::String(text),
            None => Value::Null,
        };
        json!({
            "method": self.method.as_str(),
            "uri": self.uri,
            "headers": sanitized_headers_value(&self.headers),
            "entity": entity,
        })
    }
}

fn body_display(body: Option<&Body>) -> Option<String> {
    match body {
        None => None,
        Some(Body::Text(text)) => Some(text.clone()),
        Some(Body::Json(value)) => Some(value.to_string()),
        Some(Body::Multipart(parts)) => serde_json::to_string(parts).ok(),
    }
}

pub(crate) fn is_sanitized_header(name: &str) -> bool {
    SANITIZED_HEADERS
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate))
}

pub(crate) fn sanitized_headers_value(headers: &[(String, String)]) -> Value {
    Value::Array(
        headers
            .iter()
            .map(|(name, value)| {
                let shown = if is_sanitized_header(name) {
                    MASKED_VALUE
                } else {
                    value.as_str()
                };
                json!({ "name": name, "value": shown })
            })
            .collect(),
    )
}

/// Fluent builder for [`Request`].
///
/// Failures inside the chain (bad URI, unserializable entity) are recorded
/// and surfaced by [`RequestBuilder::build`]; the first failure wins.
#[derive(Debug)]
pub struct RequestBuilder<T> {
    method: Method,
    uri: Option<String>,
    headers: Vec<(String, String)>,
    parameters: Vec<(String, String)>,
    body: Option<Body>,
    entity: Option<T>,
    parts: Vec<EntityPart>,
    error: Option<Error>,
}

impl RequestBuilder<String> {
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }
}

impl<T> RequestBuilder<T> {
    /// Builder for `method` with the entity type chosen by the caller.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            uri: None,
            headers: Vec::new(),
            parameters: Vec::new(),
            body: None,
            entity: None,
            parts: Vec::new(),
            error: None,
        }
    }

    /// Set the request URI. The URI must parse as an absolute URL.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        match Url::parse(&uri) {
            Ok(_) => self.uri = Some(uri),
            Err(e) => self.fail(Error::RequestBuild {
                message: format!("Failed to set URI [{}].", uri),
                source: Some(e.into()),
            }),
        }
        self
    }

    /// Append one header. Repeated names accumulate.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append several headers at once.
    pub fn headers<N, V>(mut self, headers: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.push((name.into(), value.into()));
        }
        self
    }

    /// Append one query parameter.
    ///
    /// When at least one parameter is present, the final URI is assembled by
    /// merging the parameters into the query string and then URL-decoding
    /// the whole URI, so reserved characters in parameter values appear
    /// decoded in [`Request::uri`]. A builder with no parameters keeps the
    /// URI exactly as set.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// Append several query parameters at once.
    pub fn parameters<N, V>(mut self, parameters: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        for (name, value) in parameters {
            self.parameters.push((name.into(), value.into()));
        }
        self
    }

    /// Set a raw text body, sent verbatim.
    pub fn text_entity(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Append a multipart part whose content is the JSON serialization of
    /// `entity`.
    pub fn part<P: Serialize>(mut self, name: impl Into<String>, entity: &P) -> Self {
        match serde_json::to_string(entity) {
            Ok(content) => self.parts.push(EntityPart {
                name: name.into(),
                content,
            }),
            Err(e) => self.fail(Error::RequestBuild {
                message: "Failed to serialize multipart entity to JSON.".to_string(),
                source: Some(e.into()),
            }),
        }
        self
    }

    /// Append a multipart part with raw text content.
    pub fn part_text(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.parts.push(EntityPart {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Finish the request, surfacing the first deferred failure if any.
    pub fn build(mut self) -> Result<Request<T>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        let uri = match self.uri {
            Some(uri) => uri,
            None => {
                return Err(Error::RequestBuild {
                    message: "A request URI is not set.".to_string(),
                    source: None,
                })
            }
        };
        let uri = if self.parameters.is_empty() {
            uri
        } else {
            merge_parameters(&uri, &self.parameters)?
        };
        let body = if self.parts.is_empty() {
            self.body
        } else {
            if self.body.is_some() {
                return Err(Error::RequestBuild {
                    message: "Cannot combine an entity body with multipart parts.".to_string(),
                    source: None,
                });
            }
            Some(Body::Multipart(self.parts))
        };
        Ok(Request {
            method: self.method,
            uri,
            headers: self.headers,
            body,
            entity: self.entity,
        })
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

impl<T: Serialize> RequestBuilder<T> {
    /// Set a typed entity, serialized to a JSON body. The entity itself
    /// stays accessible through [`Request::entity`].
    pub fn entity(mut self, entity: T) -> Self {
        match serde_json::to_value(&entity) {
            Ok(value) => {
                self.body = Some(Body::Json(value));
                self.entity = Some(entity);
            }
            Err(e) => self.fail(Error::RequestBuild {
                message: "Failed to serialize entity to JSON.".to_string(),
                source: Some(e.into()),
            }),
        }
        self
    }
}

/// Merge query parameters into the URI, then URL-decode the assembled
/// string. Parameter values containing reserved characters therefore appear
/// decoded in the final URI; callers inspect and match on this form.
fn merge_parameters(uri: &str, parameters: &[(String, String)]) -> Result<String> {
    let mut url = Url::parse(uri).map_err(|e| Error::RequestBuild {
        message: format!("Failed to set URI [{}].", uri),
        source: Some(e.into()),
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in parameters {
            pairs.append_pair(name, value);
        }
    }
    Ok(url_decode(url.as_str()))
}

/// URL-decode with form semantics: `+` to space, then percent sequences.
fn url_decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
