use crate::models::spotify::Image;
use crate::models::{AlbumSummary, Artist, ArtistSummary, StatsView, TimeRange, Track, TrackSummary};
use std::collections::HashMap;

/// Number of items requested per list on the stats page
pub const TOP_LIMIT: u32 = 10;
/// Maximum number of derived albums shown
pub const ALBUM_LIMIT: usize = 10;

pub fn summarize_tracks(tracks: &[Track]) -> Vec<TrackSummary> {
    tracks
        .iter()
        .map(|track| TrackSummary {
            name: track.name.clone(),
            artist: track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            image: Image::first_url(&track.album.images),
        })
        .collect()
}

pub fn summarize_artists(artists: &[Artist]) -> Vec<ArtistSummary> {
    artists
        .iter()
        .map(|artist| ArtistSummary {
            name: artist.name.clone(),
            image: Image::first_url(&artist.images),
        })
        .collect()
}

/// Derives the top albums from the top tracks: one entry per album id with
/// the number of tracks it contributed, most frequent first.
///
/// Name and image come from the first track seen for each album. Albums
/// with equal counts keep their first-seen order.
pub fn top_albums(tracks: &[Track], limit: usize) -> Vec<AlbumSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut albums: Vec<AlbumSummary> = Vec::new();

    for track in tracks {
        let album = &track.album;
        match index.get(album.id.as_str()) {
            Some(&pos) => albums[pos].count += 1,
            None => {
                index.insert(album.id.as_str(), albums.len());
                albums.push(AlbumSummary {
                    name: album.name.clone(),
                    image: Image::first_url(&album.images),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    albums.sort_by(|a, b| b.count.cmp(&a.count));
    albums.truncate(limit);
    albums
}

pub fn build_view(tracks: &[Track], artists: &[Artist], time_range: TimeRange) -> StatsView {
    StatsView {
        tracks: summarize_tracks(tracks),
        artists: summarize_artists(artists),
        albums: top_albums(tracks, ALBUM_LIMIT),
        time_range,
    }
}
