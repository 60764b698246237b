//! Maps HTTP failures to an error category and a user-facing message.
//!
//! # Design
//! The mapping is a lookup table from status code to a rule function, so
//! every code the backend is known to use has exactly one entry and can be
//! tested on its own. Statuses without an entry fall back to the payload's
//! `message`. Classification only applies to responses that were actually
//! received; transport failures never reach this module.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationFailed,
    RateLimited,
    ServerError,
    Unknown,
}

/// The category plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub message: String,
}

impl Classification {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

type Rule = fn(&Value) -> Classification;

const RULES: &[(u16, Rule)] = &[
    (400, invalid_input),
    (401, unauthorized),
    (403, forbidden),
    (404, not_found),
    (409, conflict),
    (422, validation_failed),
    (429, rate_limited),
    (500, server_error),
];

/// Classify a failure with the given status and (possibly empty) payload.
pub fn classify(status: u16, payload: &Value) -> Classification {
    RULES
        .iter()
        .find(|(code, _)| *code == status)
        .map_or_else(|| unmapped(status, payload), |(_, rule)| rule(payload))
}

/// Classify a non-2xx response into an `ApiError::Http`.
///
/// A body that is not JSON is treated as an empty payload.
pub fn classify_response(response: &HttpResponse) -> ApiError {
    let payload = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let classification = classify(response.status, &payload);
    tracing::debug!(
        status = response.status,
        kind = ?classification.kind,
        "classified failed response"
    );
    ApiError::from_classification(response.status, classification)
}

fn payload_message(payload: &Value) -> Option<&str> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

fn invalid_input(payload: &Value) -> Classification {
    let message = match payload_message(payload) {
        Some(detail) => format!("invalid input: {detail}"),
        None => "invalid input".to_string(),
    };
    Classification::new(ErrorKind::InvalidInput, message)
}

fn unauthorized(_: &Value) -> Classification {
    Classification::new(ErrorKind::Unauthorized, "unauthorized.")
}

fn forbidden(_: &Value) -> Classification {
    Classification::new(ErrorKind::Forbidden, "forbidden.")
}

fn not_found(_: &Value) -> Classification {
    Classification::new(ErrorKind::NotFound, "not found.")
}

fn conflict(_: &Value) -> Classification {
    Classification::new(ErrorKind::Conflict, "conflict: resource already exists.")
}

fn rate_limited(_: &Value) -> Classification {
    Classification::new(ErrorKind::RateLimited, "rate limited, retry later.")
}

fn server_error(_: &Value) -> Classification {
    Classification::new(ErrorKind::ServerError, "internal server error.")
}

fn validation_failed(payload: &Value) -> Classification {
    let message = field_errors(payload)
        .or_else(|| detail_errors(payload))
        .or_else(|| payload_message(payload).map(str::to_string))
        .unwrap_or_else(|| "validation failed.".to_string());
    Classification::new(ErrorKind::ValidationFailed, message)
}

/// `{errors: [{field, message}]}` joined as `field: message`.
fn field_errors(payload: &Value) -> Option<String> {
    let errors = payload.get("errors")?.as_array()?;
    let parts: Vec<String> = errors
        .iter()
        .map(|entry| {
            format!(
                "{}: {}",
                text(entry.get("field")),
                text(entry.get("message"))
            )
        })
        .collect();
    Some(parts.join(", "))
}

/// `{detail: [{loc, msg | message}]}` joined as `loc.path: msg`.
fn detail_errors(payload: &Value) -> Option<String> {
    let detail = payload.get("detail")?.as_array()?;
    let parts: Vec<String> = detail
        .iter()
        .map(|entry| {
            let loc = match entry.get("loc") {
                Some(Value::Array(segments)) => segments
                    .iter()
                    .map(|segment| text(Some(segment)))
                    .collect::<Vec<_>>()
                    .join("."),
                other => text(other),
            };
            let msg = entry.get("msg").or_else(|| entry.get("message"));
            format!("{loc}: {}", text(msg))
        })
        .collect();
    Some(parts.join(", "))
}

/// Render a JSON scalar without quotes; missing values render empty.
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn unmapped(status: u16, payload: &Value) -> Classification {
    let kind = if (500..600).contains(&status) {
        ErrorKind::ServerError
    } else {
        ErrorKind::Unknown
    };
    let message = payload_message(payload).unwrap_or("unknown error.");
    Classification::new(kind, message)
}
