//! Integration tests for the assembled VisionVani backend.
//!
//! Requests are driven in-process through the router; no socket is bound.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use visionvani_backend::app::assemble;
use visionvani_backend::config::Settings;
use visionvani_backend::cors::{allowed_origins, DEV_ORIGINS};
use visionvani_backend::routes::default_collections;
use visionvani_backend::{Application, ConfigError};

fn app_with(vars: &[(&str, &str)]) -> Application {
    let settings = Settings::from_vars(vars.iter().copied()).unwrap();
    assemble(&settings, &default_collections())
}

async fn get_json(app: &Application, uri: &str) -> (StatusCode, Value) {
    let response = app
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Health answers the same way whatever the configuration.
#[tokio::test]
async fn test_health_is_independent_of_configuration() {
    let configs: [&[(&str, &str)]; 3] = [
        &[],
        &[("FRONTEND_ORIGIN", "https://app.visionvani.io")],
        &[("API_TITLE", "Other"), ("ENVIRONMENT", "production")],
    ];

    for vars in configs {
        let app = app_with(vars);
        let (status, body) = get_json(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
}

#[tokio::test]
async fn test_status_reports_ready_with_fixed_name() {
    let app = app_with(&[("API_TITLE", "Renamed")]);
    let (status, body) = get_json(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], json!(true));
    assert_eq!(body["service"], json!("visionvani-backend"));
}

#[test]
fn test_malformed_origin_produces_no_application() {
    let result: Result<Application, ConfigError> =
        Settings::from_vars([("FRONTEND_ORIGIN", "not-a-url")])
            .map(|settings| assemble(&settings, &default_collections()));

    let err = result.unwrap_err();
    assert_eq!(err.field(), Some("frontend_origin"));
}

#[test]
fn test_origin_selection() {
    let dev = app_with(&[]);
    assert_eq!(dev.cors().allowed_origins, DEV_ORIGINS.to_vec());

    let empty = app_with(&[("FRONTEND_ORIGIN", "")]);
    assert_eq!(empty.cors().allowed_origins, DEV_ORIGINS.to_vec());

    let prod = app_with(&[("frontend_origin", "https://app.visionvani.io")]);
    assert_eq!(prod.cors().allowed_origins, vec!["https://app.visionvani.io"]);

    let settings = Settings::from_vars([("FRONTEND_ORIGIN", "http://localhost:4200")]).unwrap();
    assert_eq!(allowed_origins(&settings), vec!["http://localhost:4200"]);
}

#[tokio::test]
async fn test_cors_headers_on_mounted_routes() {
    let app = app_with(&[("FRONTEND_ORIGIN", "https://app.visionvani.io")]);

    for uri in ["/api/health", "/api/status"] {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ORIGIN, "https://app.visionvani.io")
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.visionvani.io"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}

#[test]
fn test_independent_assemblies_match() {
    let settings = Settings::from_vars([("API_VERSION", "1.2.3")]).unwrap();
    let a = assemble(&settings, &default_collections());
    let b = assemble(&settings, &default_collections());

    assert_eq!(a.routes(), b.routes());
    assert_eq!(a.cors(), b.cors());
    assert_eq!(a.version(), "1.2.3");
    assert_eq!(b.version(), "1.2.3");
}

#[tokio::test]
async fn test_openapi_carries_display_metadata() {
    let app = app_with(&[("API_TITLE", "VisionVani Staging"), ("API_VERSION", "0.2.0")]);
    let (status, doc) = get_json(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], json!("VisionVani Staging"));
    assert_eq!(doc["info"]["version"], json!("0.2.0"));
}

/// The `openapi` subcommand writes a parseable document to stdout, with
/// logging kept on stderr.
#[test]
fn test_openapi_command_prints_only_json() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_visionvani-backend"))
        .arg("openapi")
        .current_dir(std::env::temp_dir())
        .env_clear()
        .env("RUST_LOG", "debug")
        .env("API_TITLE", "VisionVani CLI")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["info"]["title"], json!("VisionVani CLI"));
    assert!(doc["paths"].get("/api/health").is_some());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Settings loaded"));
}
