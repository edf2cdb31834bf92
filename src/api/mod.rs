pub mod auth;
pub mod health;
pub mod middleware;
pub mod stats;

pub use auth::auth_routes;
pub use stats::stats_routes;

use crate::frontend;
use crate::services::{ReportExporter, StatsRelay, StreamingApi};
use axum::{routing::get, Router};
use std::sync::Arc;

pub struct AppState {
    pub spotify: Arc<dyn StreamingApi>,
    pub relay: Arc<dyn StatsRelay>,
    pub exporter: Arc<ReportExporter>,
}

/// All routes; the session layer is added by the caller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(stats_routes())
        .route("/health", get(health::health))
        .route("/static/*path", get(frontend::serve_static))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::spotify::{AlbumName, ArtistRef, PlayedTrack};
    use crate::models::{
        Artist, PlayHistory, RecentlyPlayed, RelayPayload, TimeRange, TokenResponse, Track,
    };
    use crate::services::export::fakes::MemoryObjectStore;
    use crate::services::stats::fixtures::{artist, track};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;
    use crate::services::session_layer;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::SessionStore;
    use tower_sessions_moka_store::MokaStore;

    /// Spotify double: canned payloads, every bearer token it was handed
    #[derive(Default)]
    struct FakeSpotify {
        token: Option<TokenResponse>,
        tracks: Vec<Track>,
        artists: Vec<Artist>,
        recent: Option<RecentlyPlayed>,
        calls: Mutex<Vec<String>>,
        bearers: Mutex<Vec<String>>,
        ranges: Mutex<Vec<(String, u32)>>,
    }

    impl FakeSpotify {
        fn record(&self, call: &str, token: &str) {
            self.calls.lock().unwrap().push(call.to_string());
            self.bearers.lock().unwrap().push(token.to_string());
        }
    }

    #[async_trait]
    impl StreamingApi for FakeSpotify {
        fn authorize_url(&self) -> Result<String> {
            Ok("https://accounts.example/authorize?client_id=abc".to_string())
        }

        async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
            self.calls.lock().unwrap().push(format!("exchange:{}", code));
            Ok(self.token.clone().unwrap_or_default())
        }

        async fn top_tracks(&self, token: &str, time_range: &TimeRange, limit: u32) -> Result<Vec<Track>> {
            self.record("top_tracks", token);
            self.ranges
                .lock()
                .unwrap()
                .push((time_range.to_string(), limit));
            Ok(self.tracks.clone())
        }

        async fn top_artists(
            &self,
            token: &str,
            time_range: &TimeRange,
            limit: u32,
        ) -> Result<Vec<Artist>> {
            self.record("top_artists", token);
            self.ranges
                .lock()
                .unwrap()
                .push((time_range.to_string(), limit));
            Ok(self.artists.clone())
        }

        async fn recently_played(&self, token: &str, _limit: u32) -> Result<RecentlyPlayed> {
            self.record("recently_played", token);
            self.recent
                .clone()
                .ok_or_else(|| AppError::Upstream("no fixture".to_string()))
        }
    }

    #[derive(Default)]
    struct FakeRelay {
        payloads: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl StatsRelay for FakeRelay {
        async fn forward(&self, payload: &RelayPayload) -> Result<Value> {
            self.payloads
                .lock()
                .unwrap()
                .push(serde_json::to_value(payload).unwrap());
            Ok(json!({"top_artist": "Main", "plays": payload.tracks.len()}))
        }
    }

    struct Harness {
        app: Router,
        spotify: Arc<FakeSpotify>,
        relay: Arc<FakeRelay>,
        store: Arc<MemoryObjectStore>,
        sessions: MokaStore,
    }

    impl Harness {
        fn new(spotify: FakeSpotify) -> Self {
            let spotify = Arc::new(spotify);
            let relay = Arc::new(FakeRelay::default());
            let store = Arc::new(MemoryObjectStore::default());
            let state = Arc::new(AppState {
                spotify: spotify.clone(),
                relay: relay.clone(),
                exporter: Arc::new(ReportExporter::new(
                    store.clone(),
                    "reports".to_string(),
                    "spotify_report".to_string(),
                )),
            });
            let (sessions, layer) = session_layer(100, false);

            Self {
                app: router(state).layer(layer),
                spotify,
                relay,
                store,
                sessions,
            }
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
            let mut request = Request::builder().uri(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            self.app
                .clone()
                .oneshot(request.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }

        /// Runs the callback and returns the session cookie it set
        async fn login(&self) -> String {
            let response = self.get("/callback?code=abc", None).await;
            assert!(response.status().is_redirection());
            session_cookie(&response).expect("callback sets a session cookie")
        }

        /// Server-side record behind a `name=value` session cookie
        async fn stored_record(&self, cookie: &str) -> Option<Record> {
            let id: Id = cookie.split_once('=')?.1.parse().ok()?;
            self.sessions.load(&id).await.unwrap()
        }
    }

    fn authenticated() -> FakeSpotify {
        FakeSpotify {
            token: Some(TokenResponse {
                access_token: Some("T".to_string()),
                refresh_token: Some("R".to_string()),
            }),
            ..Default::default()
        }
    }

    fn session_cookie(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.to_string())
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_redirect_anonymous_users() {
        let harness = Harness::new(authenticated());

        for uri in ["/stats", "/recently_played", "/export", "/stats?time_range=long_term"] {
            let response = harness.get(uri, None).await;
            assert!(response.status().is_redirection(), "{}", uri);
            assert_eq!(location(&response), "/login", "{}", uri);
        }

        assert!(harness.spotify.calls.lock().unwrap().is_empty());
        assert!(harness.relay.payloads.lock().unwrap().is_empty());
        assert!(harness.store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_callback_without_code_is_rejected() {
        let harness = Harness::new(authenticated());

        let response = harness.get("/callback", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Authorization failed.");
        assert!(harness.spotify.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_redirects_to_authorize_url() {
        let harness = Harness::new(FakeSpotify::default());

        let response = harness.get("/login", None).await;

        assert!(response.status().is_redirection());
        assert_eq!(
            location(&response),
            "https://accounts.example/authorize?client_id=abc"
        );
    }

    #[tokio::test]
    async fn test_session_token_is_used_as_bearer() {
        let harness = Harness::new(FakeSpotify {
            tracks: vec![track("Song", &["A"], "al", 10)],
            artists: vec![artist("A", 20)],
            ..authenticated()
        });

        let cookie = harness.login().await;
        let response = harness.get("/stats", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Song"));
        assert!(html.contains("Album al"));

        let bearers = harness.spotify.bearers.lock().unwrap();
        assert_eq!(*bearers, vec!["T".to_string(), "T".to_string()]);
        assert_eq!(
            harness.spotify.calls.lock().unwrap()[0],
            "exchange:abc".to_string()
        );
    }

    #[tokio::test]
    async fn test_callback_redirects_to_stats() {
        let harness = Harness::new(authenticated());

        let response = harness.get("/callback?code=abc", None).await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/stats");
    }

    #[tokio::test]
    async fn test_failed_exchange_leads_back_to_login() {
        let harness = Harness::new(FakeSpotify::default());

        let response = harness.get("/callback?code=bad", None).await;
        assert_eq!(location(&response), "/stats");
        let cookie = session_cookie(&response).unwrap_or_default();
        assert!(harness.stored_record(&cookie).await.is_none());

        let response = harness.get("/stats", Some(&cookie)).await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_login_stores_record_until_logout() {
        let harness = Harness::new(authenticated());
        let cookie = harness.login().await;

        let record = harness.stored_record(&cookie).await.expect("session record");
        assert!(record.data.contains_key("spotify_tokens"));

        harness.get("/logout", Some(&cookie)).await;
        assert!(harness.stored_record(&cookie).await.is_none());
    }

    #[tokio::test]
    async fn test_stats_defaults_to_medium_term() {
        let harness = Harness::new(authenticated());
        let cookie = harness.login().await;

        harness.get("/stats", Some(&cookie)).await;
        harness
            .get("/stats?time_range=short_term", Some(&cookie))
            .await;
        harness.get("/stats?time_range=decade", Some(&cookie)).await;

        let ranges = harness.spotify.ranges.lock().unwrap();
        let seen: Vec<&str> = ranges.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            seen,
            vec![
                "medium_term",
                "medium_term",
                "short_term",
                "short_term",
                "decade",
                "decade"
            ]
        );
        assert!(ranges.iter().all(|(_, limit)| *limit == 10));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let harness = Harness::new(authenticated());
        let cookie = harness.login().await;

        let response = harness.get("/logout", Some(&cookie)).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");

        let response = harness.get("/stats", Some(&cookie)).await;
        assert_eq!(location(&response), "/login");
        assert!(harness.spotify.bearers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_report_and_redirects_to_link() {
        let harness = Harness::new(FakeSpotify {
            tracks: vec![track("A", &["x"], "1", 50), track("B", &["y"], "2", 60)],
            artists: vec![artist("C", 70)],
            ..authenticated()
        });
        let cookie = harness.login().await;

        let response = harness
            .get("/export?time_range=long_term", Some(&cookie))
            .await;

        assert!(response.status().is_redirection());
        let objects = harness.store.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        assert!(objects[0].key.starts_with("spotify_report_long_term_"));
        assert!(objects[0].key.ends_with(".csv"));
        let content = String::from_utf8(objects[0].body.clone()).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            vec!["Type,Name,Popularity", "Track,A,50", "Track,B,60", "Artist,C,70"]
        );
        assert!(location(&response).contains(&objects[0].key));

        let ranges = harness.spotify.ranges.lock().unwrap();
        assert!(ranges.iter().all(|(r, limit)| r == "long_term" && *limit == 20));
    }

    #[tokio::test]
    async fn test_recently_played_forwards_to_relay() {
        let plays = vec![PlayHistory {
            track: PlayedTrack {
                artists: vec![
                    ArtistRef { name: "Main".to_string() },
                    ArtistRef { name: "Guest".to_string() },
                ],
                album: AlbumName { name: "Record".to_string() },
            },
            played_at: "2024-05-01T12:00:00Z".to_string(),
        }];
        let harness = Harness::new(FakeSpotify {
            recent: Some(RecentlyPlayed::Items(plays)),
            ..authenticated()
        });
        let cookie = harness.login().await;

        let response = harness.get("/recently_played", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<dt>top_artist</dt><dd>Main</dd>"));

        let payloads = harness.relay.payloads.lock().unwrap();
        assert_eq!(
            payloads[0],
            json!({
                "user_id": "demo",
                "tracks": [{"artist": "Main", "album": "Record", "played_at": "2024-05-01T12:00:00Z"}]
            })
        );
    }

    #[tokio::test]
    async fn test_recently_played_upstream_error_is_plain_200() {
        let harness = Harness::new(FakeSpotify {
            recent: Some(RecentlyPlayed::UpstreamError(
                r#"{"error":{"status":401}}"#.to_string(),
            )),
            ..authenticated()
        });
        let cookie = harness.login().await;

        let response = harness.get("/recently_played", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            r#"Error fetching Spotify data: {"error":{"status":401}}"#
        );
        assert!(harness.relay.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let harness = Harness::new(FakeSpotify::default());

        let response = harness.get("/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"href="/login""#));

        let response = harness.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status"], "ok");
    }
}
