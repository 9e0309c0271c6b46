//! HTTP Server & Routing Integration Tests
//!
//! Drives `build_router` with `oneshot`; the classifier is scripted so no
//! model files are needed.

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;
use wdsp_cl::api::DisposalResponse;
use wdsp_cl::build_router;

use helpers::*;

const BOTTLE_SCRIPT: &[(&str, f32)] = &[("water_bottle", 0.81), ("cup", 0.10), ("vase", 0.05)];
const UNMAPPED_SCRIPT: &[(&str, f32)] = &[("vase", 0.5), ("bowl", 0.3), ("rock", 0.1)];
const LIMIT: usize = 10 * 1024 * 1024;

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wdsp-cl");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(Request::builder().uri("/api/buildinfo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_classify_bottle() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));
    let image = jpeg_rgb(320, 240, [30, 90, 200]);

    let response = app
        .oneshot(classify_request(&[file_part("bottle.jpg", &image)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Plastic Bottle");
    assert_eq!(body["category"], "Recycle ♻️");
    assert_eq!(body["className"], "recycle");
    assert!(body["instructions"].as_str().unwrap().contains("rinse"));
    assert!(body["tip"].is_string());
}

#[tokio::test]
async fn test_classify_unmapped_returns_unidentified() {
    let app = build_router(scripted_state(UNMAPPED_SCRIPT, LIMIT));
    let image = png_rgb(50, 50, [128, 64, 32]);

    let response = app
        .oneshot(classify_request(&[file_part("vase.png", &image)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let parsed: DisposalResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.name, "Unidentified Item");
    assert_eq!(parsed.category, "Check Locally ⚠️");
    assert_eq!(parsed.class_name, "special");
}

#[tokio::test]
async fn test_extra_fields_are_ignored() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));
    let image = png_rgb(20, 20, [0, 0, 0]);

    let response = app
        .oneshot(classify_request(&[
            text_part("lat", "45.52"),
            file_part("photo.png", &image),
            text_part("lon", "-122.68"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["className"], "recycle");
}

#[tokio::test]
async fn test_missing_file_part() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(classify_request(&[text_part("lat", "45.52")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No file part");
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_file_field_without_filename_is_missing_file() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(classify_request(&[text_part("file", "not an upload")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_non_multipart_body_is_missing_file() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/classify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "bottle.png"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
async fn test_empty_filename() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(classify_request(&[file_part("", b"")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No selected file");
    assert_eq!(body["code"], "EMPTY_FILENAME");
}

#[tokio::test]
async fn test_unreadable_image_is_client_error() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(classify_request(&[file_part("notes.txt", b"shopping list: milk, eggs")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "UNREADABLE_IMAGE");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Could not read the uploaded image"));
}

#[tokio::test]
async fn test_malformed_multipart_is_bad_request() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));
    let image = png_rgb(20, 20, [0, 0, 0]);

    // Drop the closing boundary so the file part never terminates
    let mut body = multipart_body(&[file_part("photo.png", &image)]);
    let closing = format!("--{}--\r\n", BOUNDARY);
    body.truncate(body.len() - closing.len());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/classify")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, 1024));
    let payload = vec![0u8; 8 * 1024];

    let response = app
        .oneshot(classify_request(&[file_part("big.png", &payload)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_classify_requires_post() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let response = app
        .oneshot(Request::builder().uri("/classify").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let app = build_router(scripted_state(BOTTLE_SCRIPT, LIMIT));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/classify")
        .header(header::ORIGIN, "http://127.0.0.1:5500")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
