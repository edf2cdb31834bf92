use serde::{Deserialize, Serialize};

/// Page of `/me/top/tracks` or `/me/top/artists`
#[derive(Debug, Clone, Deserialize)]
pub struct TopItems<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: Album,
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
    pub images: Vec<Image>,
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumName {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayedTrack {
    pub artists: Vec<ArtistRef>,
    pub album: AlbumName,
}

/// One entry of `/me/player/recently-played`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistory {
    pub track: PlayedTrack,
    pub played_at: String,
}

/// Outcome of the recently-played fetch. A non-200 status is kept as raw
/// text instead of an error; the route shows it to the user verbatim.
#[derive(Debug, Clone)]
pub enum RecentlyPlayed {
    Items(Vec<PlayHistory>),
    UpstreamError(String),
}

/// Token endpoint response. Both fields stay optional: a failed exchange
/// is stored as-is and caught later by the session guard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayTrack {
    pub artist: String,
    pub album: String,
    pub played_at: String,
}

/// Body posted to the aggregation endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RelayPayload {
    pub user_id: String,
    pub tracks: Vec<RelayTrack>,
}

impl Image {
    pub fn first_url(images: &[Image]) -> Option<String> {
        images.first().map(|image| image.url.clone())
    }
}
