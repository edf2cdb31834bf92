pub mod export;
pub mod relay;
pub mod spotify;
pub mod stats;
pub mod storage;
#[cfg(test)]
pub(crate) mod test_server;
pub mod token_store;

pub use export::ReportExporter;
pub use relay::{RelayClient, StatsRelay};
pub use spotify::{SpotifyClient, StreamingApi};
pub use storage::{ObjectStore, S3ObjectStore};
pub use token_store::{session_layer, AuthGuard, TokenStore};
