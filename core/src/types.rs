//! Domain DTOs for the docente admin API.
//!
//! # Design
//! A docente travels as an open JSON object: the backend adds fields over
//! time and the client only interprets the few it validates. Locally
//! created stand-ins are a separate typed `LocalRecord` so they can never
//! be confused with backend-confirmed records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ApiError;

/// One administrative record: field name to value.
pub type Record = Map<String, Value>;

/// Prefix of ids assigned to records created while the backend was down.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// A record stored client-side because the backend could not confirm it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub id: String,
    pub created_at: String,
    #[serde(rename = "_local")]
    pub local: bool,
    #[serde(flatten)]
    pub fields: Record,
}

impl LocalRecord {
    /// Merge `fields` into a new local record stamped with `now`.
    ///
    /// Any `id`, `created_at` or `_local` in the input is replaced.
    pub fn new(mut fields: Record, now: OffsetDateTime) -> Result<Self, ApiError> {
        fields.remove("id");
        fields.remove("created_at");
        fields.remove("_local");
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        let created_at = now
            .format(&Rfc3339)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self {
            id: format!("{LOCAL_ID_PREFIX}{millis}"),
            created_at,
            local: true,
            fields,
        })
    }

    /// The nested `usuario.identificacion`, if the record carries one.
    pub fn identification(&self) -> Option<String> {
        match self.fields.get("usuario")?.get("identificacion")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// True if `key` is this record's local id or its identification number.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.identification().as_deref() == Some(key)
    }

    /// Flatten back into a plain record, marker fields included.
    pub fn into_record(self) -> Record {
        let mut record = self.fields;
        record.insert("id".to_string(), Value::String(self.id));
        record.insert("created_at".to_string(), Value::String(self.created_at));
        record.insert("_local".to_string(), Value::Bool(self.local));
        record
    }
}

/// A docente as returned by the service: confirmed by the backend or only
/// held in the local mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum Docente {
    Remote(Record),
    Local(LocalRecord),
}

impl Docente {
    pub fn id(&self) -> Option<&str> {
        match self {
            Docente::Remote(record) => record.get("id").and_then(Value::as_str),
            Docente::Local(local) => Some(&local.id),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Docente::Local(_))
    }

    pub fn into_record(self) -> Record {
        match self {
            Docente::Remote(record) => record,
            Docente::Local(local) => local.into_record(),
        }
    }
}

/// Caller-supplied changes for an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocenteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria_docente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_programa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

/// The body actually sent on update, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub categoria_docente: String,
    pub codigo_programa: String,
    pub activo: bool,
}

/// Body of the deactivate action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateRequest {
    pub razon: String,
}

/// Pagination and filter for listing docentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub activo: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            activo: None,
        }
    }
}

impl ListQuery {
    pub fn to_query_string(&self) -> String {
        let mut query = format!("page={}&limit={}", self.page, self.limit);
        if let Some(activo) = self.activo {
            query.push_str(&format!("&activo={activo}"));
        }
        query
    }
}

/// One page of docentes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Record>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// The list payload is either a page object or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListData {
    Paged(Page),
    Plain(Vec<Record>),
}

impl From<ListData> for Page {
    fn from(data: ListData) -> Self {
        match data {
            ListData::Paged(page) => page,
            ListData::Plain(items) => Page {
                total: Some(items.len() as u64),
                items,
                page: None,
                limit: None,
            },
        }
    }
}
