use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn call(
    app: &mut axum::routing::RouterIntoService<String>,
    req: Request<String>,
) -> axum::response::Response {
    use tower::Service;
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

const DOCENTE: &str =
    r#"{"categoria_docente":"Planta","codigo_programa":"ING-SIS","usuario":{"identificacion":"80012345"}}"#;

// --- list ---

#[tokio::test]
async fn list_empty_returns_page_envelope() {
    let resp = app()
        .oneshot(empty_request("GET", "/admin/docentes"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["items"], serde_json::json!([]));
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["page"], 1);
}

#[tokio::test]
async fn list_page_far_past_the_end_is_empty() {
    let mut app = app().into_service();
    call(&mut app, json_request("POST", "/admin/docentes", DOCENTE)).await;

    let uri = format!("/admin/docentes?page={}&limit=10", usize::MAX);
    let resp = call(&mut app, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["items"], serde_json::json!([]));
    assert_eq!(body["data"]["total"], 1);
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_id() {
    let resp = app()
        .oneshot(json_request("POST", "/admin/docentes", DOCENTE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert!(body["data"]["id"].as_str().is_some());
    assert_eq!(body["data"]["activo"], true);
    assert_eq!(body["data"]["codigo_programa"], "ING-SIS");
}

#[tokio::test]
async fn create_missing_fields_returns_422_errors() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/admin/docentes",
            r#"{"categoria_docente":"Planta"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "codigo_programa");
    assert_eq!(body["errors"][0]["message"], "required");
}

#[tokio::test]
async fn create_duplicate_identification_returns_409() {
    let mut app = app().into_service();
    let resp = call(&mut app, json_request("POST", "/admin/docentes", DOCENTE)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(&mut app, json_request("POST", "/admin/docentes", DOCENTE)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// --- get ---

#[tokio::test]
async fn get_unknown_returns_404_envelope() {
    let resp = app()
        .oneshot(empty_request("GET", "/admin/docentes/nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
}

// --- update ---

#[tokio::test]
async fn update_missing_fields_returns_422_detail() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/admin/docentes/any",
            r#"{"codigo_programa":"ING-SIS"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(
        body["detail"][0]["loc"],
        serde_json::json!(["body", "categoria_docente"])
    );
}

#[tokio::test]
async fn update_unknown_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/admin/docentes/nope",
            r#"{"categoria_docente":"Planta","codigo_programa":"ING-SIS"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- deactivate ---

#[tokio::test]
async fn deactivate_blank_reason_returns_422() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/admin/docentes/any/desactivar",
            r#"{"razon":"  "}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_returns_404() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/admin/docentes/nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_with_projects_returns_409() {
    let mut app = app().into_service();
    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/admin/docentes",
            r#"{"categoria_docente":"Planta","codigo_programa":"ING-SIS","tiene_proyectos":true}"#,
        ),
    )
    .await;
    let id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    let resp = call(&mut app, empty_request("DELETE", &format!("/admin/docentes/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// --- full lifecycle ---

#[tokio::test]
async fn docente_lifecycle() {
    let mut app = app().into_service();

    // create
    let resp = call(&mut app, json_request("POST", "/admin/docentes", DOCENTE)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // get through the alias path
    let resp = call(&mut app, empty_request("GET", &format!("/admin/profesores/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["id"], id.as_str());

    // update
    let resp = call(
        &mut app,
        json_request(
            "PUT",
            &format!("/admin/docentes/{id}"),
            r#"{"categoria_docente":"Catedra","codigo_programa":"ING-IND","activo":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["data"]["categoria_docente"], "Catedra");
    assert_eq!(updated["data"]["usuario"]["identificacion"], "80012345");

    // deactivate
    let resp = call(
        &mut app,
        json_request(
            "POST",
            &format!("/admin/docentes/{id}/desactivar"),
            r#"{"razon":"licencia"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deactivated = body_json(resp).await;
    assert_eq!(deactivated["data"]["activo"], false);
    assert_eq!(deactivated["data"]["razon_desactivacion"], "licencia");

    // list filters on activo
    let resp = call(&mut app, empty_request("GET", "/admin/docentes?activo=true")).await;
    assert_eq!(body_json(resp).await["data"]["total"], 0);
    let resp = call(&mut app, empty_request("GET", "/admin/profesores?activo=false&page=1&limit=5")).await;
    let page = body_json(resp).await;
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["limit"], 5);

    // reactivate
    let resp = call(&mut app, empty_request("POST", &format!("/admin/docentes/{id}/reactivar"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reactivated = body_json(resp).await;
    assert_eq!(reactivated["data"]["activo"], true);
    assert!(reactivated["data"].get("razon_desactivacion").is_none());

    // delete
    let resp = call(&mut app, empty_request("DELETE", &format!("/admin/docentes/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = call(&mut app, empty_request("GET", &format!("/admin/docentes/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
