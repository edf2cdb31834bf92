use std::env;

pub const DEFAULT_S3_BUCKET: &str = "spotify-stats-reports-123";
pub const DEFAULT_AGGREGATION_URL: &str =
    "https://uvdf0v98lb.execute-api.us-west-2.amazonaws.com/userstats";
pub const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub spotify_auth_url: String,
    pub spotify_token_url: String,
    pub spotify_api_base_url: String,
    /// Serverless endpoint that aggregates recently-played history
    pub aggregation_url: String,
    pub s3_bucket: String,
    /// Object key prefix for exported reports
    pub report_prefix: String,
    pub server_host: String,
    pub server_port: u16,
    /// Mark the session cookie `Secure` (enable behind HTTPS)
    pub session_secure_cookie: bool,
    /// Upper bound on live sessions held in memory
    pub session_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        // OAuth credentials are not validated locally; Spotify rejects the
        // authorization request when they are missing.
        let client_id = optional_var("CLIENT_ID");
        let client_secret = optional_var("CLIENT_SECRET");
        let redirect_uri = optional_var("REDIRECT_URI");

        let server_port = match env::var("SERVER_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("SERVER_PORT must be a valid port: {}", e))?,
            Err(_) => 8000,
        };

        let session_capacity = match env::var("SESSION_CAPACITY") {
            Ok(capacity) => capacity
                .parse()
                .map_err(|e| anyhow::anyhow!("SESSION_CAPACITY must be a positive integer: {}", e))?,
            Err(_) => DEFAULT_SESSION_CAPACITY,
        };

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            spotify_auth_url: env::var("SPOTIFY_AUTH_URL")
                .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string()),
            spotify_token_url: env::var("SPOTIFY_TOKEN_URL")
                .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string()),
            spotify_api_base_url: env::var("SPOTIFY_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.spotify.com/v1".to_string()),
            aggregation_url: env::var("AGGREGATION_URL")
                .unwrap_or_else(|_| DEFAULT_AGGREGATION_URL.to_string()),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_S3_BUCKET.to_string()),
            report_prefix: env::var("REPORT_PREFIX")
                .unwrap_or_else(|_| "spotify_report".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            session_secure_cookie: env::var("SESSION_SECURE_COOKIE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            session_capacity,
        })
    }
}

fn optional_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{} is not set; the login flow will be rejected upstream", name);
        String::new()
    })
}
