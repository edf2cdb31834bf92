use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Artist, PlayHistory, RecentlyPlayed, TimeRange, TokenResponse, TopItems, Track};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Scopes requested on every login
pub const SCOPE: &str = "user-read-recently-played user-top-read";

/// Spotify Web API as seen by the route handlers.
#[async_trait]
pub trait StreamingApi: Send + Sync {
    /// Authorization URL the browser is sent to on `/login`
    fn authorize_url(&self) -> Result<String>;

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse>;

    async fn top_tracks(&self, token: &str, time_range: &TimeRange, limit: u32) -> Result<Vec<Track>>;

    async fn top_artists(&self, token: &str, time_range: &TimeRange, limit: u32)
        -> Result<Vec<Artist>>;

    async fn recently_played(&self, token: &str, limit: u32) -> Result<RecentlyPlayed>;
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    api_base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayedPage {
    #[serde(default)]
    items: Vec<PlayHistory>,
}

impl SpotifyClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.spotify_auth_url.clone(),
            token_url: config.spotify_token_url.clone(),
            api_base_url: config.spotify_api_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get_top<T: DeserializeOwned>(
        &self,
        kind: &str,
        token: &str,
        time_range: &TimeRange,
        limit: u32,
    ) -> Result<Vec<T>> {
        let url = format!("{}/me/top/{}", self.api_base_url, kind);
        let limit = limit.to_string();

        tracing::debug!("Fetching top {} ({}, limit {})", kind, time_range, limit);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.as_str()), ("time_range", time_range.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify API error on top {}: {} - {}", kind, status, body);
            return Err(AppError::Upstream(format!(
                "API returned status: {} - {}",
                status, body
            )));
        }

        let page: TopItems<T> = parse_body(response).await?;
        Ok(page.items)
    }
}

#[async_trait]
impl StreamingApi for SpotifyClient {
    fn authorize_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPE),
                // Force the consent dialog so users can switch accounts
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid authorize URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token request failed: {}", e)))?;

        // The status is not checked; an error body simply yields no tokens.
        if !response.status().is_success() {
            tracing::warn!("Token exchange returned status {}", response.status());
        }

        parse_body(response).await
    }

    async fn top_tracks(&self, token: &str, time_range: &TimeRange, limit: u32) -> Result<Vec<Track>> {
        self.get_top("tracks", token, time_range, limit).await
    }

    async fn top_artists(
        &self,
        token: &str,
        time_range: &TimeRange,
        limit: u32,
    ) -> Result<Vec<Artist>> {
        self.get_top("artists", token, time_range, limit).await
    }

    async fn recently_played(&self, token: &str, limit: u32) -> Result<RecentlyPlayed> {
        let url = format!("{}/me/player/recently-played", self.api_base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify recently-played error: {} - {}", status, body);
            return Ok(RecentlyPlayed::UpstreamError(body));
        }

        let page: RecentlyPlayedPage = parse_body(response).await?;
        Ok(RecentlyPlayed::Items(page.items))
    }
}

/// Reads the body as text and decodes it, so a missing field surfaces as
/// `MalformedResponse` with a snippet of what was received.
async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to read response: {}", e)))?;

    decode(&text)
}

pub(crate) fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        AppError::MalformedResponse(format!(
            "{} - Response: {}",
            e,
            truncate(text, 200)
        ))
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
