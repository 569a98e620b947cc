//! Response body decoders
//!
//! A decoder turns raw body text into the caller's entity type and renders
//! the entity back to a string for exchange contexts. Decode failures are
//! reported as plain `anyhow` errors; the pipeline attaches the exchange
//! context and classifies them.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Converts raw body text into `R` and renders `R` for sanitized displays.
pub trait ResponseDecoder<R> {
    /// Decode the body text.
    fn decode(&self, body: &str) -> std::result::Result<R, anyhow::Error>;

    /// String form of a decoded entity, used in exchange context displays.
    fn display(&self, entity: &R) -> String;
}

/// Default decoder: the body text itself, untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDecoder;

impl ResponseDecoder<String> for StringDecoder {
    fn decode(&self, body: &str) -> std::result::Result<String, anyhow::Error> {
        Ok(body.to_string())
    }

    fn display(&self, entity: &String) -> String {
        entity.clone()
    }
}

/// JSON decoder for typed bodies. Unknown fields are ignored; an empty body
/// is a decode failure.
pub struct JsonDecoder<R> {
    _entity: PhantomData<fn() -> R>,
}

impl<R> JsonDecoder<R> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<R> Default for JsonDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: DeserializeOwned + Serialize> ResponseDecoder<R> for JsonDecoder<R> {
    fn decode(&self, body: &str) -> std::result::Result<R, anyhow::Error> {
        if body.trim().is_empty() {
            anyhow::bail!("response body is empty");
        }
        serde_json::from_str(body).map_err(anyhow::Error::from)
    }

    fn display(&self, entity: &R) -> String {
        serde_json::to_string(entity).unwrap_or_default()
    }
}

/// Decoder for properties-style bodies: one `key=value` (or `key:value`)
/// pair per line, `#` and `!` comment lines skipped, keys and values
/// trimmed. The collected pairs are deserialized into `R`.
pub struct PropertiesDecoder<R> {
    _entity: PhantomData<fn() -> R>,
}

impl<R> PropertiesDecoder<R> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<R> Default for PropertiesDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: DeserializeOwned + Serialize> ResponseDecoder<R> for PropertiesDecoder<R> {
    fn decode(&self, body: &str) -> std::result::Result<R, anyhow::Error> {
        let mut map = serde_json::Map::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .or_else(|| line.split_once(':'))
                .unwrap_or((line, ""));
            map.insert(
                key.trim().to_string(),
                Value::String(value.trim().to_string()),
            );
        }
        serde_json::from_value(Value::Object(map)).map_err(anyhow::Error::from)
    }

    fn display(&self, entity: &R) -> String {
        serde_json::to_string(entity).unwrap_or_default()
    }
}
