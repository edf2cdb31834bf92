use crate::error::{AppError, Result};
use crate::models::{Artist, TimeRange, Track};
use crate::services::storage::ObjectStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Number of items requested per list for a report
pub const EXPORT_LIMIT: u32 = 20;
/// Lifetime of the presigned download link
pub const LINK_EXPIRY: Duration = Duration::from_secs(3600);

/// Stores CSV reports of a user's top tracks and artists.
pub struct ReportExporter {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
}

impl ReportExporter {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String, prefix: String) -> Self {
        Self {
            store,
            bucket,
            prefix,
        }
    }

    /// `<prefix>_<time_range>_<YYYYMMDDHHMMSS>.csv`, timestamp in UTC
    pub fn report_key(&self, time_range: &TimeRange, now: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}.csv",
            self.prefix,
            time_range,
            now.format("%Y%m%d%H%M%S")
        )
    }

    /// Writes the report and returns a time-limited link to it
    pub async fn export(
        &self,
        tracks: &[Track],
        artists: &[Artist],
        time_range: &TimeRange,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let content = build_csv(tracks, artists)?;
        let key = self.report_key(time_range, now);

        self.store
            .put(&self.bucket, &key, content, "text/csv")
            .await?;

        self.store
            .presigned_get(&self.bucket, &key, LINK_EXPIRY)
            .await
    }
}

/// Header row, then one row per track, then one per artist.
pub fn build_csv(tracks: &[Track], artists: &[Artist]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(["Type", "Name", "Popularity"]).map_err(csv_error)?;

    for track in tracks {
        let popularity = track.popularity.ok_or_else(|| {
            AppError::MalformedResponse(format!("track '{}' has no popularity", track.name))
        })?;
        writer
            .write_record(["Track", track.name.as_str(), popularity.to_string().as_str()])
            .map_err(csv_error)?;
    }

    for artist in artists {
        let popularity = artist.popularity.ok_or_else(|| {
            AppError::MalformedResponse(format!("artist '{}' has no popularity", artist.name))
        })?;
        writer
            .write_record(["Artist", artist.name.as_str(), popularity.to_string().as_str()])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV flush failed: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("CSV write failed: {}", e))
}
