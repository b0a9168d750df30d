//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use bytes::Bytes;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use filevault_api::{AppState, build_app};
use filevault_auth::JwtEncoder;
use filevault_core::config::{AppConfig, DatabaseProvider};
use filevault_core::types::OwnerId;
use filevault_database::MemoryFileRepository;
use filevault_storage::LocalStorageProvider;

/// Host the test requests claim to be addressed to.
pub const HOST: &str = "files.test";

const BOUNDARY: &str = "----filevault-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
    _upload_dir: TempDir,
}

/// A collected response.
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Bytes,
    /// Body parsed as JSON, `Null` when it is not JSON
    pub body: Value,
}

impl TestResponse {
    /// `data` of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application over an in-memory store and a
    /// temporary upload directory.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`] with a config tweak applied first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.storage.upload_dir = upload_dir.path().to_string_lossy().into_owned();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        tweak(&mut config);
        config.validate().expect("Invalid test config");

        let provider = Arc::new(
            LocalStorageProvider::new(upload_dir.path())
                .await
                .expect("Failed to init storage"),
        );
        let repo = Arc::new(MemoryFileRepository::new());
        let encoder = JwtEncoder::new(&config.auth);

        let state = AppState::new(config.clone(), repo, provider);

        Self {
            router: build_app(state),
            config,
            encoder,
            _upload_dir: upload_dir,
        }
    }

    /// A bearer token for a fresh owner.
    pub fn new_owner(&self) -> (OwnerId, String) {
        let owner = OwnerId::new();
        (owner, self.token_for(owner))
    }

    /// A bearer token for `owner`.
    pub fn token_for(&self, owner: OwnerId) -> String {
        self.encoder.issue(owner).expect("Failed to issue token").token
    }

    /// Path of a stored file on disk.
    pub fn stored_path(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.upload_dir).join(name)
    }

    /// Send a request, optionally with a JSON body and bearer token.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, HOST);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// `GET` a path while advertising gzip support.
    pub async fn get_accepting_gzip(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::HOST, HOST)
            .header(header::ACCEPT_ENCODING, "gzip");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = builder.body(Body::empty()).expect("Failed to build request");
        self.send(request).await
    }

    /// Upload `data` as the multipart `file` field.
    pub async fn upload(
        &self,
        token: Option<&str>,
        file_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> TestResponse {
        self.upload_field(token, "file", file_name, mime_type, data)
            .await
    }

    /// Upload `data` under an arbitrary multipart field name.
    pub async fn upload_field(
        &self,
        token: Option<&str>,
        field: &str,
        file_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(header::HOST, HOST)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = builder
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Upload a small video and return its id.
    pub async fn upload_video(&self, token: &str, file_name: &str) -> String {
        let response = self
            .upload(Some(token), file_name, "video/mp4", VIDEO_BYTES)
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"]
            .as_str()
            .expect("id missing")
            .to_string()
    }

    /// Names of the caller's files in listing order.
    pub async fn listed_names(&self, token: &str) -> Vec<(String, i64)> {
        let response = self.request("GET", "/api/files", None, Some(token)).await;
        assert_eq!(response.status, StatusCode::OK);
        response
            .data()
            .as_array()
            .expect("list is not an array")
            .iter()
            .map(|f| {
                (
                    f["name"].as_str().unwrap_or_default().to_string(),
                    f["position"].as_i64().unwrap_or_default(),
                )
            })
            .collect()
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Bytes standing in for a video file.
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom";

/// A solid-colour PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([40, 120, 200]),
    ));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .expect("Failed to encode png");
    cursor.into_inner()
}
