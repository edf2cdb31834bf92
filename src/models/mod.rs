pub mod session;
pub mod spotify;
pub mod stats;

pub use session::SessionTokens;
pub use spotify::{
    Artist, PlayHistory, RecentlyPlayed, RelayPayload, RelayTrack, TokenResponse, TopItems, Track,
};
pub use stats::{AlbumSummary, ArtistSummary, StatsView, TimeRange, TimeRangeQuery, TrackSummary};
