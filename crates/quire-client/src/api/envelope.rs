use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

const MESSAGE_KEYS: [&str; 2] = ["Message", "message"];

/// A decoded response body that came back with a success status
#[derive(Debug)]
pub(crate) struct Envelope {
    body: Value,
}

impl Envelope {
    /// Decode a body and map failure statuses onto the error taxonomy
    pub(crate) fn parse(status: StatusCode, bytes: &[u8]) -> ApiResult<Self> {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice(bytes) {
                Ok(body) => body,
                // Error pages are often HTML; the status is what matters then
                Err(_) if !status.is_success() => Value::Null,
                Err(err) => return Err(err.into()),
            }
        };

        if !status.is_success() {
            return Err(failure(status, message_of(&body)));
        }
        if let Some(message) = message_of(&body).filter(|m| mentions_token(m)) {
            return Err(ApiError::Unauthorized(message.to_string()));
        }
        Ok(Self { body })
    }

    pub(crate) fn message(&self) -> Option<&str> {
        message_of(&self.body)
    }

    /// Accept a response that carries no payload. The backend also answers
    /// some failures with a success status, so the message is logged.
    pub(crate) fn acknowledge(self, action: &str) {
        match self.message() {
            Some(message) => tracing::debug!(action, message, "Acknowledged by backend"),
            None => tracing::debug!(action, "Acknowledged by backend without a message"),
        }
    }

    /// Take the first present payload field
    pub(crate) fn field<T: DeserializeOwned>(self, keys: &[&str]) -> ApiResult<T> {
        let message = self.message().map(str::to_string);
        match self.optional_field(keys)? {
            Some(value) => Ok(value),
            None => Err(missing(keys, message)),
        }
    }

    /// Like `field`, but an absent payload is not an error
    pub(crate) fn optional_field<T: DeserializeOwned>(
        mut self,
        keys: &[&str],
    ) -> ApiResult<Option<T>> {
        let Some(object) = self.body.as_object_mut() else {
            return Ok(None);
        };
        for key in keys {
            if let Some(value) = object.remove(*key) {
                if !value.is_null() {
                    return Ok(Some(serde_json::from_value(value)?));
                }
            }
        }
        Ok(None)
    }

    /// A list payload: either a bare array or an array under one of `keys`
    pub(crate) fn list<T: DeserializeOwned>(mut self, keys: &[&str]) -> ApiResult<Vec<T>> {
        if self.body.is_array() {
            return Ok(serde_json::from_value(self.body.take())?);
        }
        let message = self.message().map(str::to_string);
        if let Some(object) = self.body.as_object_mut() {
            for key in keys {
                if let Some(value) = object.remove(*key) {
                    if value.is_array() {
                        return Ok(serde_json::from_value(value)?);
                    }
                }
            }
        }
        Err(missing(keys, message))
    }
}

fn message_of(body: &Value) -> Option<&str> {
    MESSAGE_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}

fn mentions_token(message: &str) -> bool {
    message.to_ascii_lowercase().contains("token")
}

fn failure(status: StatusCode, message: Option<&str>) -> ApiError {
    let message = message
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    if status == StatusCode::UNAUTHORIZED || mentions_token(&message) {
        ApiError::Unauthorized(message)
    } else if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(message)
    } else {
        ApiError::Rejected(message)
    }
}

fn missing(keys: &[&str], message: Option<String>) -> ApiError {
    match message {
        Some(message) if mentions_token(&message) => ApiError::Unauthorized(message),
        Some(message) => ApiError::NotFound(message),
        None => ApiError::NotFound(format!(
            "response is missing {}",
            keys.first().copied().unwrap_or("its payload")
        )),
    }
}
