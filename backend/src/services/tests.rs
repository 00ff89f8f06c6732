use super::configure;
use crate::db::sqlite::SqliteStore;
use crate::db::ShipmentStore;
use crate::services::import::pipeline::ImportOptions;
use crate::views::TemplateSet;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::model::summary::{ImportSource, ImportSummary};
use common::schema::SHIPMENT_COLUMNS;
use std::sync::Arc;

const BOUNDARY: &str = "shipment-import-test-boundary";

const ROW_1001: &str = "1001,AWB1,2024-01-01 10:00,,,GTW,Ship,Sig,PC,5,,,,,true,,false,,false,,,";

struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    body: &'a [u8],
}

fn file<'a>(filename: &'a str, body: &'a [u8]) -> Part<'a> {
    Part {
        name: "datafile",
        filename: Some(filename),
        body,
    }
}

fn text(body: &str) -> Part<'_> {
    Part {
        name: "data",
        filename: None,
        body: body.as_bytes(),
    }
}

fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                part.name, filename
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                part.name
            ),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(part.body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

fn csv(rows: &[&str]) -> String {
    let header = SHIPMENT_COLUMNS
        .iter()
        .map(|c| c.header)
        .collect::<Vec<_>>()
        .join(",");
    let mut doc = header;
    for row in rows {
        doc.push('\n');
        doc.push_str(row);
    }
    doc.push('\n');
    doc
}

async fn store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.ensure_schema().await.unwrap();
    store
}

fn app(
    store: &SqliteStore,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let shared: Arc<dyn ShipmentStore> = Arc::new(store.clone());
    App::new()
        .app_data(web::Data::new(TemplateSet::embedded().unwrap()))
        .app_data(web::Data::from(shared))
        .app_data(web::Data::new(ImportOptions::default()))
        .configure(configure)
}

fn post(uri: &str, parts: &[Part<'_>]) -> test::TestRequest {
    let (content_type, body) = multipart(parts);
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

async fn body_text(resp: ServiceResponse<impl MessageBody>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
async fn pages_render() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;

    for (uri, needle) in [
        ("/", "Export shipments"),
        ("/import", "name=\"datafile\""),
        ("/export", "not available"),
        ("/help", "SpedNr, AWB, RegDate"),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        let body = body_text(resp).await;
        assert!(body.contains(needle), "{} lacks {:?}", uri, needle);
    }
}

#[actix_web::test]
async fn static_assets_and_unknown_paths() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/static/styles.css").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/nowhere").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("/nowhere"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/static/missing.js").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unsupported_method_is_rejected() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let resp = test::call_service(&app, test::TestRequest::put().uri("/import").to_request()).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn file_and_text_together_are_rejected() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let doc = csv(&[ROW_1001]);

    let req = post("/import", &[file("shipments.csv", doc.as_bytes()), text(&doc)]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp)
        .await
        .contains("please provide either an uploaded file OR pasted data, not both"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn missing_source_is_rejected() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;

    let req = post("/import", &[file("", b""), text("")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp)
        .await
        .contains("please provide either an uploaded file or pasted data"));
}

#[actix_web::test]
async fn repeated_field_is_rejected() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let doc = csv(&[ROW_1001]);

    let req = post("/import", &[text(&doc), text(&doc)]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("field &#39;data&#39; was sent more than once"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn bad_files_are_rejected_before_parsing() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;

    let resp = test::call_service(&app, post("/import", &[file("shipments.txt", b"x")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("invalid extension: expected .csv, got .txt"));

    let resp = test::call_service(&app, post("/import", &[file("shipments.csv", b"")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("uploaded file is empty"));
}

#[actix_web::test]
async fn uploaded_file_is_imported() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let doc = csv(&[ROW_1001]);

    let resp = test::call_service(&app, post("/import", &[file("shipments.csv", doc.as_bytes())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Data Imported Successfully!"));
    assert!(body.contains("file &#39;shipments.csv&#39;"));

    let stored = store.fetch(1001).await.unwrap().unwrap();
    assert_eq!(stored.line_item_count, Some(5));
    assert!(stored.control_check);
    assert!(!stored.bpo_check);
    assert!(!stored.error_check);
    assert_eq!(stored.created_date, None);
    assert_eq!(stored.image_date, None);
    assert_eq!(stored.hold_code, None);
}

#[actix_web::test]
async fn reimport_replaces_previous_values() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;

    let first = csv(&[ROW_1001]);
    let resp = test::call_service(&app, post("/import", &[text(&first)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let second = csv(&["1001,AWB2,,,,,,,,,,,,,TRUE,,True,,,,,"]);
    let resp = test::call_service(&app, post("/import", &[text(&second)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(store.count().await.unwrap(), 1);
    let stored = store.fetch(1001).await.unwrap().unwrap();
    assert_eq!(stored.air_waybill.as_deref(), Some("AWB2"));
    assert_eq!(stored.registration_date, None);
    assert_eq!(stored.gateway_code, None);
    assert_eq!(stored.line_item_count, None);
    assert!(stored.control_check);
    assert!(stored.bpo_check);
    assert!(!stored.error_check);
}

#[actix_web::test]
async fn malformed_row_aborts_the_whole_batch() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let bad = ROW_1001.replacen("1001", "10x2", 1);
    let doc = csv(&[ROW_1001, &bad]);

    let resp = test::call_service(&app, post("/import", &[file("shipments.csv", doc.as_bytes())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("row 2, column SpedNr"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn api_import_returns_summary_json() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let doc = csv(&[ROW_1001, &ROW_1001.replacen("1001", "1002", 1)]);

    let resp = test::call_service(&app, post("/api/import", &[text(&doc)]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: ImportSummary = test::read_body_json(resp).await;
    assert_eq!(summary.source, ImportSource::Pasted);
    assert_eq!(summary.rows_upserted, 2);
    assert_eq!(summary.rows_stored, Some(2));
    assert_eq!(summary.md5, format!("{:x}", md5::compute(doc.as_bytes())));

    let resp = test::call_service(&app, post("/api/import", &[text("  ")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        error["error"],
        "please provide either an uploaded file or pasted data"
    );
}

#[actix_web::test]
async fn shipment_lookup() {
    let store = store().await;
    let app = test::init_service(app(&store)).await;
    let doc = csv(&[ROW_1001]);
    test::call_service(&app, post("/api/import", &[text(&doc)]).to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/shipments/1001").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(record["shipment_number"], 1001);
    assert_eq!(record["air_waybill"], "AWB1");
    assert_eq!(record["control_check"], true);
    assert!(record["image"].is_null());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/shipments/2002").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/shipments/abc").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
