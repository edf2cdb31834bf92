//! Loopback HTTP server that answers every request with a canned response
//! and records what it was sent.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    Router,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub struct TestServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        let app = Router::new().fallback(move |request: Request| {
            let log = log.clone();
            async move {
                let (parts, payload) = request.into_parts();
                let bytes = axum::body::to_bytes(payload, usize::MAX)
                    .await
                    .unwrap_or_default();
                let header_text = |name: header::HeaderName| {
                    parts
                        .headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v.to_string())
                };

                log.lock().unwrap().push(Recorded {
                    method: parts.method.to_string(),
                    path: parts.uri.path().to_string(),
                    query: parts.uri.query().map(|q| q.to_string()),
                    authorization: header_text(header::AUTHORIZATION),
                    content_type: header_text(header::CONTENT_TYPE),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });

                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
