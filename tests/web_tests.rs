//! HTTP tests of the upload routes, driven through the router in-process.

mod common;

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use common::{deliveries_xlsx, read_result, transactions_xlsx};
use fuel_recon::export::XLSX_CONTENT_TYPE;
use fuel_recon::parsing::normalize::InputSettings;
use fuel_recon::parsing::table::SheetSelector;
use fuel_recon::web::server::{create_router, AppState};

const BOUNDARY: &str = "fuel-recon-test-boundary";

enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        bytes: Vec<u8>,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { name, filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}").as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn with_peer(mut request: Request<Body>) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    request
}

async fn post_process(parts: Vec<Part<'_>>) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let app = create_router(AppState::default()).unwrap();
    app.oneshot(with_peer(request)).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn error_type(response: Response) -> String {
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["details"].is_null());
    json["error_type"].as_str().unwrap().to_string()
}

fn transaction_part<'a>() -> Part<'a> {
    Part::File {
        name: "transaction_file",
        filename: "fuel.xlsx",
        bytes: transactions_xlsx(&[("05/01/2024", "AB-123"), ("05/01/2024", "ZZ-999")]),
    }
}

fn delivery_part<'a>() -> Part<'a> {
    Part::File {
        name: "delivery_file",
        filename: "trips.xlsx",
        bytes: deliveries_xlsx(&[
            ("05/01/2024", "AB-123", "Acme", "T1"),
            ("04/01/2024", "AB-123", "Acme", "T0"),
        ]),
    }
}

#[tokio::test]
async fn test_index_serves_upload_form_with_security_headers() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let app = create_router(AppState::default()).unwrap();
    let response = app.oneshot(with_peer(request)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("name=\"transaction_file\""));
    assert!(html.contains("name=\"delivery_file\""));
}

#[tokio::test]
async fn test_process_returns_result_workbook() {
    let response = post_process(vec![transaction_part(), delivery_part()]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"result.xlsx\""
    );

    let rows = read_result(body_bytes(response).await);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["TranDate", "ทะเบียน", "พจส", "LDT", "Medthod"]);
    assert_eq!(
        rows[1],
        vec!["05/01/2024", "AB-123", "Acme", "T1", "นับวันย้อนหลัง"]
    );
    assert_eq!(rows[2], vec!["05/01/2024", "ZZ-999", "", "", ""]);
}

#[tokio::test]
async fn test_process_honours_form_options() {
    let response = post_process(vec![
        transaction_part(),
        delivery_part(),
        Part::Text {
            name: "match_policy",
            value: "first-match",
        },
        Part::Text {
            name: "label_style",
            value: "english",
        },
    ])
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let rows = read_result(body_bytes(response).await);
    assert_eq!(rows[1][4], "same-day");
}

#[tokio::test]
async fn test_process_rejects_unknown_option() {
    let response = post_process(vec![
        transaction_part(),
        delivery_part(),
        Part::Text {
            name: "match_policy",
            value: "best-match",
        },
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "invalid_option");
}

#[tokio::test]
async fn test_process_requires_both_files() {
    let response = post_process(vec![transaction_part()]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "missing_input");
}

#[tokio::test]
async fn test_process_rejects_text_posing_as_workbook() {
    let response = post_process(vec![
        transaction_part(),
        Part::File {
            name: "delivery_file",
            filename: "trips.xlsx",
            bytes: b"this is not a spreadsheet".to_vec(),
        },
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "format_mismatch");
}

#[tokio::test]
async fn test_process_rejects_corrupt_workbook() {
    let response = post_process(vec![
        transaction_part(),
        Part::File {
            name: "delivery_file",
            filename: "trips.xlsx",
            bytes: b"PK\x03\x04 truncated zip archive".to_vec(),
        },
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(response).await, "parse_failed");
}

#[tokio::test]
async fn test_process_rejects_missing_column() {
    let response = post_process(vec![
        Part::File {
            name: "transaction_file",
            filename: "fuel.csv",
            bytes: b"TranDate,Plate\n05/01/2024,AB-123\n".to_vec(),
        },
        delivery_part(),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error_type"], "parse_failed");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("transaction"));
    assert!(message.contains("missing required column 'ทะเบียน'"));
    assert!(json["details"].is_null());
}

#[tokio::test]
async fn test_process_names_missing_sheet() {
    let state = AppState {
        settings: InputSettings {
            delivery_sheet: SheetSelector::Named("April".to_string()),
            ..InputSettings::default()
        },
        ..AppState::default()
    };
    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(vec![transaction_part(), delivery_part()])))
        .unwrap();

    let app = create_router(state).unwrap();
    let response = app.oneshot(with_peer(request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error_type"], "parse_failed");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Sheet 'April' not found (available: Sheet1)"));
}
