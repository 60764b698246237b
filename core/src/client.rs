//! Stateless HTTP request builder and response parser for the docente API.
//!
//! # Design
//! `DocenteClient` holds only a base URL and the path used for reads, and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Non-2xx responses are classified here;
//! deciding what to do about them (local fallback, reconciliation) is left
//! to `DocenteService`.

use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::classify::{classify_response, ErrorKind};
use crate::envelope::{normalize, parse_envelope, Envelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeactivateRequest, ListData, ListQuery, Page, Record, UpdatePayload};

const DOCENTES: &str = "/admin/docentes";

/// Which collection path list and get requests go to. Writes always use
/// `/admin/docentes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePath {
    #[default]
    Docentes,
    Profesores,
}

impl ResourcePath {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourcePath::Docentes => DOCENTES,
            ResourcePath::Profesores => "/admin/profesores",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocenteClient {
    base_url: String,
    read_path: ResourcePath,
}

impl DocenteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            read_path: ResourcePath::default(),
        }
    }

    /// Send list and get requests to `path` instead of `/admin/docentes`.
    pub fn with_read_path(mut self, path: ResourcePath) -> Self {
        self.read_path = path;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `{base}{collection}/{id}[/{action}]` with `id` percent-encoded as a
    /// single path segment.
    fn item_url(
        &self,
        collection: &str,
        id: &str,
        action: Option<&str>,
    ) -> Result<String, ApiError> {
        if matches!(id, "." | "..") {
            return Err(ApiError::validation("invalid id"));
        }
        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| ApiError::Validation(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::validation("invalid base url"))?
            .push(id)
            .extend(action);
        Ok(url.into())
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            path: url,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list(&self, query: &ListQuery) -> HttpRequest {
        let path = format!("{}?{}", self.read_path.as_str(), query.to_query_string());
        self.request(HttpMethod::Get, self.url(&path))
    }

    pub fn build_get(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.item_url(self.read_path.as_str(), id, None)?;
        Ok(self.request(HttpMethod::Get, url))
    }

    pub fn build_create(&self, record: &Record) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, self.url(DOCENTES), record)
    }

    pub fn build_update(&self, id: &str, payload: &UpdatePayload) -> Result<HttpRequest, ApiError> {
        let url = self.item_url(DOCENTES, id, None)?;
        self.json_request(HttpMethod::Put, url, payload)
    }

    pub fn build_deactivate(&self, id: &str, reason: &str) -> Result<HttpRequest, ApiError> {
        let body = DeactivateRequest {
            razon: reason.to_string(),
        };
        let url = self.item_url(DOCENTES, id, Some("desactivar"))?;
        self.json_request(HttpMethod::Post, url, &body)
    }

    pub fn build_reactivate(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.item_url(DOCENTES, id, Some("reactivar"))?;
        Ok(self.request(HttpMethod::Post, url))
    }

    pub fn build_delete(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.item_url(DOCENTES, id, None)?;
        Ok(self.request(HttpMethod::Delete, url))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Page, ApiError> {
        check_status(&response)?;
        normalize::<ListData>(&response.body).map(Page::from)
    }

    /// Parse any response whose payload is a single docente: get, create,
    /// update, deactivate and reactivate.
    pub fn parse_record(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response)?;
        normalize(&response.body)
    }

    /// Parse a delete response. An empty success body yields a synthesized
    /// success envelope; any other body must be a success envelope.
    pub fn parse_delete(&self, id: &str, response: HttpResponse) -> Result<Envelope, ApiError> {
        match response.status {
            404 => {
                return Err(ApiError::Http {
                    status: 404,
                    kind: ErrorKind::NotFound,
                    message: "record does not exist".to_string(),
                })
            }
            409 => {
                return Err(ApiError::Http {
                    status: 409,
                    kind: ErrorKind::Conflict,
                    message: "cannot delete: record has associated dependencies".to_string(),
                })
            }
            _ => check_status(&response)?,
        }
        if response.body.trim().is_empty() {
            return Ok(Envelope::success(
                json!({ "id": id }),
                Some("deleted".to_string()),
            ));
        }
        parse_envelope(&response.body)?.ensure_success()
    }
}

/// Map non-2xx statuses to a classified `ApiError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(classify_response(response))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn client() -> DocenteClient {
        DocenteClient::new("http://localhost:8000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_encodes_query() {
        let query = ListQuery {
            page: 3,
            limit: 20,
            activo: Some(true),
        };
        let req = client().build_list(&query);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.path,
            "http://localhost:8000/admin/docentes?page=3&limit=20&activo=true"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn reads_follow_alias_path_but_writes_do_not() {
        let client = client().with_read_path(ResourcePath::Profesores);
        assert_eq!(
            client.build_get("d-1").unwrap().path,
            "http://localhost:8000/admin/profesores/d-1"
        );
        assert!(client
            .build_list(&ListQuery::default())
            .path
            .starts_with("http://localhost:8000/admin/profesores?"));
        assert_eq!(
            client.build_delete("d-1").unwrap().path,
            "http://localhost:8000/admin/docentes/d-1"
        );
    }

    #[test]
    fn build_create_sends_record_as_json() {
        let record: Record = serde_json::from_str(
            r#"{"categoria_docente":"Catedra","codigo_programa":"ING-SIS"}"#,
        )
        .unwrap();
        let req = client().build_create(&record).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/admin/docentes");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["codigo_programa"], "ING-SIS");
    }

    #[test]
    fn build_update_uses_put_on_item() {
        let payload = UpdatePayload {
            categoria_docente: "Planta".to_string(),
            codigo_programa: "ING-SIS".to_string(),
            activo: true,
        };
        let req = client().build_update("d-1", &payload).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8000/admin/docentes/d-1");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["activo"], true);
    }

    #[test]
    fn build_deactivate_sends_reason() {
        let req = client().build_deactivate("d-1", "licencia").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.path,
            "http://localhost:8000/admin/docentes/d-1/desactivar"
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"razon": "licencia"}));
    }

    #[test]
    fn build_reactivate_has_no_body() {
        let req = client().build_reactivate("d-1").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/admin/docentes/d-1/reactivar");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_reads_page() {
        let body = r#"{"status":"success","data":{"items":[{"id":"d-1"}],"total":1,"page":1,"limit":10}}"#;
        let page = client().parse_list(response(200, body)).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(1));
    }

    #[test]
    fn parse_record_classifies_failures() {
        let err = client()
            .parse_record(response(401, r#"{"status":"error"}"#))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(err.to_string(), "unauthorized.");
    }

    #[test]
    fn parse_record_rejects_unsuccessful_envelope() {
        let err = client()
            .parse_record(response(200, r#"{"status":"fail","data":null}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn parse_delete_synthesizes_envelope_for_empty_body() {
        let envelope = client().parse_delete("d-1", response(204, "")).unwrap();
        assert_eq!(envelope.status, "success");
        assert_eq!(envelope.data, Some(serde_json::json!({"id": "d-1"})));
    }

    #[test]
    fn parse_delete_keeps_server_envelope() {
        let body = r#"{"status":"success","data":{"id":"d-1"},"message":"Docente eliminado"}"#;
        let envelope = client().parse_delete("d-1", response(200, body)).unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Docente eliminado"));
    }

    #[test]
    fn parse_delete_rejects_unsuccessful_envelope() {
        let body = r#"{"status":"error","data":null,"message":"no se pudo eliminar"}"#;
        let err = client().parse_delete("d-1", response(200, body)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(ref m) if m == "no se pudo eliminar"));
    }

    #[test]
    fn item_ids_are_encoded_as_one_segment() {
        let client = client();
        assert_eq!(
            client.build_get("80 012").unwrap().path,
            "http://localhost:8000/admin/docentes/80%20012"
        );
        assert_eq!(
            client.build_delete("a/b?c#d").unwrap().path,
            "http://localhost:8000/admin/docentes/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            client.build_deactivate("a/b", "licencia").unwrap().path,
            "http://localhost:8000/admin/docentes/a%2Fb/desactivar"
        );
    }

    #[test]
    fn dot_segments_are_rejected() {
        let err = client().build_get("..").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(client().build_reactivate(".").is_err());
    }

    #[test]
    fn parse_delete_specific_messages() {
        let err = client().parse_delete("d-1", response(404, "")).unwrap_err();
        assert_eq!(err.to_string(), "record does not exist");

        let err = client().parse_delete("d-1", response(409, "")).unwrap_err();
        assert!(err.to_string().contains("has associated dependencies"));
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }

    #[test]
    fn parse_delete_other_failures_are_classified() {
        let err = client().parse_delete("d-1", response(403, "")).unwrap_err();
        assert_eq!(err.to_string(), "forbidden.");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = DocenteClient::new("http://localhost:8000/");
        assert_eq!(
            client.build_reactivate("x").unwrap().path,
            "http://localhost:8000/admin/docentes/x/reactivar"
        );
    }
}
