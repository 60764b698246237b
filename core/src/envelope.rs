//! The `{status, data, message}` wrapper the backend puts around every
//! response body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

pub const STATUS_SUCCESS: &str = "success";

const INVALID_RESPONSE: &str = "invalid server response";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success(data: Value, message: Option<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data: Some(data),
            message,
        }
    }

    /// Keep the envelope only if it reports success; `data` may be absent.
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        if self.status == STATUS_SUCCESS {
            return Ok(self);
        }
        Err(ApiError::InvalidResponse(
            self.message.unwrap_or_else(|| INVALID_RESPONSE.to_string()),
        ))
    }

    /// Unwrap `data` if the envelope reports success and carries a payload.
    pub fn into_data(self) -> Result<Value, ApiError> {
        match self.data {
            Some(data) if self.status == STATUS_SUCCESS && !data.is_null() => Ok(data),
            _ => Err(ApiError::InvalidResponse(
                self.message.unwrap_or_else(|| INVALID_RESPONSE.to_string()),
            )),
        }
    }
}

/// Decode a response body as an envelope.
pub fn parse_envelope(body: &str) -> Result<Envelope, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Decode an envelope and deserialize its `data` into `T`.
pub fn normalize<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let data = parse_envelope(body)?.into_data()?;
    serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))
}
