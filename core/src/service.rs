//! Docente operations with local fallback.
//!
//! # Design
//! `DocenteService` pairs the stateless `DocenteClient` with a `Transport`
//! to run each request and a `MirrorStore` for records the backend could
//! not take. Only two paths touch the mirror:
//!
//! - `create` writes a `LocalRecord` when no response came back or the
//!   backend answered 5xx.
//! - `get` reads it back when the id is a local one or the backend
//!   answered 404.
//!
//! Everything else surfaces the classified error. Input is validated before
//! any request is built. There are no retries and no background re-sync;
//! `pending_local` exposes what is waiting so a caller can do that itself.

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::client::DocenteClient;
use crate::config::{ClientConfig, DEFAULT_MIRROR_KEY};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};
use crate::mirror::{ConfiguredMirror, MirrorStore};
use crate::types::{
    Docente, DocenteUpdate, ListQuery, LocalRecord, Page, Record, UpdatePayload, LOCAL_ID_PREFIX,
};

const CREATE_FALLBACK_FAILED: &str = "could not create record (backend and fallback both failed)";

pub struct DocenteService<T, M> {
    client: DocenteClient,
    transport: T,
    mirror: M,
    mirror_key: String,
}

impl DocenteService<UreqTransport, ConfiguredMirror> {
    /// Build a service talking HTTP through `ureq`, mirroring to the
    /// configured store.
    pub fn connect(config: &ClientConfig) -> Self {
        Self::from_config(
            config,
            UreqTransport::new(config.timeout()),
            ConfiguredMirror::from_config(config),
        )
    }
}

impl<T: Transport, M: MirrorStore> DocenteService<T, M> {
    pub fn new(client: DocenteClient, transport: T, mirror: M) -> Self {
        Self {
            client,
            transport,
            mirror,
            mirror_key: DEFAULT_MIRROR_KEY.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T, mirror: M) -> Self {
        let client = DocenteClient::new(&config.base_url).with_read_path(config.read_path);
        Self::new(client, transport, mirror).with_mirror_key(&config.mirror_key)
    }

    pub fn with_mirror_key(mut self, key: &str) -> Self {
        self.mirror_key = key.to_string();
        self
    }

    pub fn client(&self) -> &DocenteClient {
        &self.client
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Create a docente, falling back to the local mirror when the backend
    /// is unreachable or failing.
    pub fn create(&self, record: Record) -> Result<Docente, ApiError> {
        let request = self.client.build_create(&record)?;
        debug!(path = %request.path, "creating docente");

        match self.transport.execute(request) {
            Ok(response) if response.is_server_error() => {
                warn!(status = response.status, "backend failed, storing docente locally");
                self.store_locally(record)
            }
            Ok(response) => self.client.parse_record(response).map(Docente::Remote),
            Err(err) => {
                warn!(%err, "backend unreachable, storing docente locally");
                self.store_locally(record)
            }
        }
    }

    fn store_locally(&self, record: Record) -> Result<Docente, ApiError> {
        let local = LocalRecord::new(record, OffsetDateTime::now_utc())?;
        self.mirror
            .append(&self.mirror_key, local.clone())
            .map_err(|source| {
                warn!(%source, key = %self.mirror_key, "mirror write failed");
                ApiError::Fallback {
                    context: CREATE_FALLBACK_FAILED,
                    source,
                }
            })?;
        info!(id = %local.id, "docente stored locally pending backend confirmation");
        Ok(Docente::Local(local))
    }

    pub fn list(&self, query: &ListQuery) -> Result<Page, ApiError> {
        let request = self.client.build_list(query);
        debug!(path = %request.path, "listing docentes");
        let response = self.transport.execute(request)?;
        self.client.parse_list(response)
    }

    /// Fetch one docente, answering from the local mirror when the backend
    /// does not know the id.
    pub fn get(&self, id: &str) -> Result<Docente, ApiError> {
        require_id(id)?;
        let request = self.client.build_get(id)?;
        debug!(path = %request.path, "fetching docente");

        let err = match self.transport.execute(request) {
            Ok(response) => match self.client.parse_record(response) {
                Ok(record) => return Ok(Docente::Remote(record)),
                Err(err) => err,
            },
            Err(err) => ApiError::from(err),
        };

        if id.starts_with(LOCAL_ID_PREFIX) || err.status() == Some(404) {
            if let Some(local) = self.find_local(id) {
                debug!(id, "serving docente from local mirror");
                return Ok(Docente::Local(local));
            }
        }
        Err(err)
    }

    /// Find a mirrored record by local id or identification number.
    pub fn find_local(&self, id: &str) -> Option<LocalRecord> {
        self.mirror.find(&self.mirror_key, |record| record.matches(id))
    }

    /// Records created while the backend was unavailable, oldest first.
    pub fn pending_local(&self) -> Vec<LocalRecord> {
        self.mirror.get(&self.mirror_key, Vec::new())
    }

    pub fn update(&self, id: &str, patch: &DocenteUpdate) -> Result<Record, ApiError> {
        require_id(id)?;
        let payload = UpdatePayload {
            categoria_docente: require_field(
                patch.categoria_docente.as_deref(),
                "category required",
            )?,
            codigo_programa: require_field(
                patch.codigo_programa.as_deref(),
                "program code required",
            )?,
            activo: patch.activo.unwrap_or(true),
        };
        let request = self.client.build_update(id, &payload)?;
        debug!(path = %request.path, "updating docente");
        self.client.parse_record(self.transport.execute(request)?)
    }

    pub fn deactivate(&self, id: &str, reason: &str) -> Result<Record, ApiError> {
        require_id(id)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiError::validation("reason required"));
        }
        let request = self.client.build_deactivate(id, reason)?;
        debug!(path = %request.path, "deactivating docente");
        self.client.parse_record(self.transport.execute(request)?)
    }

    pub fn reactivate(&self, id: &str) -> Result<Record, ApiError> {
        require_id(id)?;
        let request = self.client.build_reactivate(id)?;
        debug!(path = %request.path, "reactivating docente");
        self.client.parse_record(self.transport.execute(request)?)
    }

    pub fn delete(&self, id: &str) -> Result<Envelope, ApiError> {
        require_id(id)?;
        let request = self.client.build_delete(id)?;
        debug!(path = %request.path, "deleting docente");
        self.client.parse_delete(id, self.transport.execute(request)?)
    }
}

fn require_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::validation("id required"));
    }
    Ok(())
}

fn require_field(value: Option<&str>, message: &str) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ApiError::validation(message)),
    }
}
