//! Admin API client for Exposoftware docente records.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! `/admin/docentes` endpoints, classifies failed responses into
//! user-facing messages, and keeps records that could not reach the
//! backend in a local mirror.
//!
//! # Design
//! - `DocenteClient` is stateless and does no I/O: each operation is a
//!   `build_*` / `parse_*` pair, as in the host-does-IO pattern.
//! - `DocenteService` runs those pairs through a `Transport` and owns the
//!   fallback rules: create falls back to the mirror on transport errors
//!   and 5xx, get reads the mirror back on local ids and 404s.
//! - Storage and transport are ports (`MirrorStore`, `Transport`) so tests
//!   swap in in-memory fakes.

pub mod classify;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod mirror;
pub mod service;
pub mod types;

pub use classify::{classify, Classification, ErrorKind};
pub use client::{DocenteClient, ResourcePath};
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use mirror::{ConfiguredMirror, FileMirror, MemoryMirror, MirrorStore, StorageError};
pub use service::DocenteService;
pub use types::{Docente, DocenteUpdate, ListQuery, LocalRecord, Page, Record, LOCAL_ID_PREFIX};
