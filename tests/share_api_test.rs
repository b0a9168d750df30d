//! Integration tests for public access: shared fetch, views, downloads, and
//! share links.

mod helpers;

use axum::http::{StatusCode, header};

use helpers::{HOST, TestApp, VIDEO_BYTES};

#[tokio::test]
async fn test_shared_fetch_needs_no_auth() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let id = app.upload_video(&token, "clip.mp4").await;

    let response = app
        .request("GET", &format!("/api/files/shared/{id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], id.as_str());
    assert_eq!(response.data()["name"], "clip.mp4");
}

#[tokio::test]
async fn test_shared_fetch_missing() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "GET",
            "/api/files/shared/00000000-0000-0000-0000-999999999999",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_views_and_downloads_are_counted() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let id = app.upload_video(&token, "clip.mp4").await;

    for _ in 0..3 {
        let response = app
            .request("POST", &format!("/api/files/{id}/view"), None, None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request("GET", &format!("/api/files/{id}/download"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes.as_ref(), VIDEO_BYTES);
    assert_eq!(response.headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"clip.mp4\""
    );

    let response = app
        .request("GET", &format!("/api/files/{id}/stats"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let stats = response.data();
    assert_eq!(stats["view_count"], 3);
    assert_eq!(stats["download_count"], 1);
    assert_eq!(stats["share_count"], 0);
    assert!(!stats["last_viewed_at"].is_null());
}

#[tokio::test]
async fn test_view_of_missing_file() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/files/00000000-0000-0000-0000-999999999999/view",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "GET",
            "/api/files/00000000-0000-0000-0000-999999999999/download",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_link() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let id = app.upload_video(&token, "clip.mp4").await;

    let response = app
        .request("POST", &format!("/api/files/{id}/share"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("POST", &format!("/api/files/{id}/share"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["file_id"], id.as_str());
    assert_eq!(
        response.data()["url"],
        format!("http://{HOST}/api/files/shared/{id}")
    );

    let response = app
        .request("GET", &format!("/api/files/{id}/stats"), None, Some(&token))
        .await;
    assert_eq!(response.data()["share_count"], 1);
}

#[tokio::test]
async fn test_download_after_delete() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let id = app.upload_video(&token, "clip.mp4").await;

    app.request("DELETE", &format!("/api/files/{id}"), None, Some(&token))
        .await;

    let response = app
        .request("GET", &format!("/api/files/{id}/download"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_json_responses_are_compressed() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let payload = VIDEO_BYTES.repeat(256);
    let response = app
        .upload(Some(&token), "long.mp4", "video/mp4", &payload)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.data()["id"].as_str().unwrap().to_string();
    let public_path = response.data()["url"]
        .as_str()
        .unwrap()
        .trim_start_matches(&format!("http://{HOST}"))
        .to_string();

    let download = app
        .get_accepting_gzip(&format!("/api/files/{id}/download"), None)
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert!(download.headers.get(header::CONTENT_ENCODING).is_none());
    assert_eq!(download.bytes.as_ref(), payload.as_slice());

    let served = app.get_accepting_gzip(&public_path, None).await;
    assert_eq!(served.status, StatusCode::OK);
    assert!(served.headers.get(header::CONTENT_ENCODING).is_none());
    assert_eq!(served.bytes.as_ref(), payload.as_slice());

    let listed = app.get_accepting_gzip("/api/files", Some(&token)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(
        listed.headers.get(header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );
}
