use crate::error::{AppError, Result};
use crate::models::{PlayHistory, RelayPayload, RelayTrack};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Placeholder user id sent with every relay payload
pub const RELAY_USER_ID: &str = "demo";

/// External endpoint that aggregates recently-played history.
#[async_trait]
pub trait StatsRelay: Send + Sync {
    async fn forward(&self, payload: &RelayPayload) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
    client: Client,
}

impl RelayClient {
    pub fn new(url: String, client: Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl StatsRelay for RelayClient {
    async fn forward(&self, payload: &RelayPayload) -> Result<Value> {
        tracing::debug!(
            "Forwarding {} plays to aggregation endpoint {}",
            payload.tracks.len(),
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Relay(format!("Request failed: {}", e)))?;

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Relay(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            AppError::Relay(format!("Aggregation endpoint returned invalid JSON: {}", e))
        })
    }
}

/// Flattens play history into the relay payload. Each play keeps only its
/// primary artist, album and timestamp.
pub fn build_payload(items: &[PlayHistory]) -> Result<RelayPayload> {
    let tracks = items
        .iter()
        .map(|item| {
            let artist = item
                .track
                .artists
                .first()
                .ok_or_else(|| {
                    AppError::MalformedResponse(format!(
                        "played track at {} has no artists",
                        item.played_at
                    ))
                })?
                .name
                .clone();

            Ok(RelayTrack {
                artist,
                album: item.track.album.name.clone(),
                played_at: item.played_at.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RelayPayload {
        user_id: RELAY_USER_ID.to_string(),
        tracks,
    })
}
