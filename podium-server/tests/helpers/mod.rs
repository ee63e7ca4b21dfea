//! Shared helpers for router-level tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

use podium_server::analysis::{AudioAnalysis, MediaAnalyzer, MediaRef, VideoAnalysis};
use podium_server::grading::Grade;
use podium_server::uploads::MediaStore;
use podium_server::{build_router, AppState};

pub const TEST_SECRET: &str = "test-secret";
const BOUNDARY: &str = "podium-test-boundary";

/// Deterministic analyzer: video 80/70/90 with two questions, answers 60
pub struct StubAnalyzer;

pub const STUB_QUESTIONS: [&str; 2] = [
    "Why did you choose this topic?",
    "What would you change next time?",
];

#[async_trait]
impl MediaAnalyzer for StubAnalyzer {
    async fn analyze_presentation(&self, _media: &MediaRef) -> VideoAnalysis {
        VideoAnalysis {
            expression: 80.0,
            intonation: 70.0,
            posture: 90.0,
            overall_rating: Grade::A,
            suggestion: "Slow down during the introduction.".to_string(),
            questions: STUB_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            is_fallback: false,
        }
    }

    async fn analyze_answer(&self, _media: &MediaRef, _question: &str) -> AudioAnalysis {
        AudioAnalysis {
            score: 60.0,
            suggestion: "Answer the question directly.".to_string(),
            is_relevant: true,
            is_fallback: false,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: sqlx::SqlitePool,
    pub uploads: TempDir,
}

/// Router over an in-memory database and a temporary uploads folder
pub async fn create_test_app_with(analyzer: Arc<dyn MediaAnalyzer>) -> TestApp {
    let pool = podium_common::db::init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    let uploads = tempfile::tempdir().expect("Failed to create temp dir");

    let state = AppState::new(
        pool.clone(),
        TEST_SECRET,
        MediaStore::new(uploads.path().to_path_buf()),
        analyzer,
        "stub",
    );

    TestApp {
        router: build_router(state),
        pool,
        uploads,
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(Arc::new(StubAnalyzer)).await
}

/// One multipart part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    /// name, file name, content type, bytes
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, json) = self.send_with_headers(request).await;
        (status, json)
    }

    pub async fn send_with_headers(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, headers, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let (status, _, json) = self.get_with_headers(uri, token).await;
        (status, json)
    }

    pub async fn get_with_headers(&self, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send_with_headers(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        parts: &[Part<'_>],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }

    /// Register a user and return its token
    pub async fn register(&self, username: &str, email: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/register",
                None,
                json!({ "username": username, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Upload a presentation and return its id
    pub async fn upload_presentation(&self, token: &str, title: &str) -> i64 {
        let (status, body) = self
            .multipart(
                "POST",
                "/api/presentations",
                Some(token),
                &[
                    Part::Text("title", title),
                    Part::File("video", "talk.mp4", "video/mp4", b"fake mp4 bytes"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
        body["data"]["presentation"]["id"].as_i64().unwrap()
    }

    /// Poll the analysis endpoint until the background job leaves ONGOING
    pub async fn wait_for_analysis(&self, token: &str, id: i64) -> Value {
        let uri = format!("/api/presentations/{}/analysis", id);
        for _ in 0..100 {
            let (status, body) = self.get(&uri, Some(token)).await;
            assert_eq!(status, StatusCode::OK);
            if body["data"]["status"] != "ONGOING" {
                return body["data"].clone();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("analysis of presentation {} never finished", id);
    }

    /// Number of files in the uploads folder
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
