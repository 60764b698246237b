//! In-memory stand-in for the Exposoftware admin backend.
//!
//! Serves `/admin/docentes` (and the read-only `/admin/profesores` alias)
//! with the same envelope, validation payloads and status codes the client
//! expects from the real service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Record = Map<String, Value>;

/// Docentes in insertion order.
pub type Db = Arc<RwLock<Vec<Record>>>;

const REQUIRED_FIELDS: [&str; 2] = ["categoria_docente", "codigo_programa"];

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub activo: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateInput {
    #[serde(default)]
    pub razon: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/admin/docentes", get(list_docentes).post(create_docente))
        .route(
            "/admin/docentes/{id}",
            get(get_docente).put(update_docente).delete(delete_docente),
        )
        .route("/admin/docentes/{id}/desactivar", post(deactivate_docente))
        .route("/admin/docentes/{id}/reactivar", post(reactivate_docente))
        .route("/admin/profesores", get(list_docentes))
        .route("/admin/profesores/{id}", get(get_docente))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(status: StatusCode, data: Value, message: &str) -> Response {
    let body = json!({"status": "success", "data": data, "message": message});
    (status, Json(body)).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "Docente no encontrado")
}

fn missing_fields(input: &Record) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| {
            input
                .get(*field)
                .and_then(Value::as_str)
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect()
}

fn identification(record: &Record) -> Option<&Value> {
    record.get("usuario")?.get("identificacion")
}

fn position(docentes: &[Record], id: &str) -> Option<usize> {
    docentes
        .iter()
        .position(|d| d.get("id").and_then(Value::as_str) == Some(id))
}

async fn list_docentes(State(db): State<Db>, Query(params): Query<ListParams>) -> Response {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let docentes = db.read().await;
    let matching: Vec<&Record> = docentes
        .iter()
        .filter(|d| match params.activo {
            Some(activo) => d.get("activo").and_then(Value::as_bool) == Some(activo),
            None => true,
        })
        .collect();
    let items: Vec<&Record> = matching
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .copied()
        .collect();
    let data = json!({
        "items": items,
        "total": matching.len(),
        "page": page,
        "limit": limit,
    });
    success(StatusCode::OK, data, "Docentes obtenidos")
}

async fn create_docente(State(db): State<Db>, Json(mut input): Json<Record>) -> Response {
    let missing = missing_fields(&input);
    if !missing.is_empty() {
        let errors: Vec<Value> = missing
            .into_iter()
            .map(|field| json!({"field": field, "message": "required"}))
            .collect();
        let body = json!({"status": "error", "message": "Datos inválidos", "errors": errors});
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let mut docentes = db.write().await;
    if let Some(ident) = identification(&input) {
        if docentes.iter().any(|d| identification(d) == Some(ident)) {
            return failure(StatusCode::CONFLICT, "El docente ya existe");
        }
    }

    input.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    input.entry("activo").or_insert(Value::Bool(true));
    docentes.push(input.clone());
    tracing::debug!(id = ?input.get("id"), "docente created");
    success(StatusCode::CREATED, Value::Object(input), "Docente creado")
}

async fn get_docente(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let docentes = db.read().await;
    match position(&docentes, &id) {
        Some(index) => success(
            StatusCode::OK,
            Value::Object(docentes[index].clone()),
            "Docente obtenido",
        ),
        None => not_found(),
    }
}

async fn update_docente(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Record>,
) -> Response {
    let missing = missing_fields(&input);
    if !missing.is_empty() {
        let detail: Vec<Value> = missing
            .into_iter()
            .map(|field| json!({"loc": ["body", field], "msg": "field required"}))
            .collect();
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": detail}))).into_response();
    }

    let mut docentes = db.write().await;
    let Some(index) = position(&docentes, &id) else {
        return not_found();
    };
    let docente = &mut docentes[index];
    for field in REQUIRED_FIELDS.into_iter().chain(["activo"]) {
        if let Some(value) = input.get(field) {
            docente.insert(field.to_string(), value.clone());
        }
    }
    success(StatusCode::OK, Value::Object(docente.clone()), "Docente actualizado")
}

async fn deactivate_docente(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<DeactivateInput>,
) -> Response {
    if input.razon.trim().is_empty() {
        let body = json!({"errors": [{"field": "razon", "message": "required"}]});
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let mut docentes = db.write().await;
    let Some(index) = position(&docentes, &id) else {
        return not_found();
    };
    let docente = &mut docentes[index];
    docente.insert("activo".to_string(), Value::Bool(false));
    docente.insert("razon_desactivacion".to_string(), Value::String(input.razon));
    success(StatusCode::OK, Value::Object(docente.clone()), "Docente desactivado")
}

async fn reactivate_docente(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut docentes = db.write().await;
    let Some(index) = position(&docentes, &id) else {
        return not_found();
    };
    let docente = &mut docentes[index];
    docente.insert("activo".to_string(), Value::Bool(true));
    docente.remove("razon_desactivacion");
    success(StatusCode::OK, Value::Object(docente.clone()), "Docente reactivado")
}

async fn delete_docente(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut docentes = db.write().await;
    let Some(index) = position(&docentes, &id) else {
        return not_found();
    };
    if docentes[index].get("tiene_proyectos").and_then(Value::as_bool) == Some(true) {
        return failure(StatusCode::CONFLICT, "El docente tiene proyectos asociados");
    }
    docentes.remove(index);
    StatusCode::NO_CONTENT.into_response()
}
