#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sputils::clients::{
    LibraryApi, SearchKind,
    errors::{Error, Result},
    payloads::{RawPage, RawPlaylist, RawSavedAlbum, RawSearch},
};

pub fn api_track(name: &str, disc: u32, number: u32) -> Value {
    json!({
        "artists": [{"name": "artist1", "uri": "artist_uri"}, {"name": "artist2", "uri": "uri2"}],
        "disc_number": disc,
        "track_number": number,
        "name": name,
        "uri": "uri"
    })
}

pub fn api_album_by(name: &str, artist: &str, artist_uri: &str, tracks: Vec<Value>) -> Value {
    json!({
        "artists": [{"name": artist, "uri": artist_uri}],
        "images": [{"url": "art_url"}],
        "name": name,
        "uri": format!("uri:{name}"),
        "release_date": "2018-03-01",
        "tracks": {"items": tracks}
    })
}

/// The album every library fixture starts from.
pub fn api_album() -> Value {
    json!({
        "artists": [{"name": "artist1", "uri": "artist_uri"}, {"name": "artist2", "uri": "uri2"}],
        "images": [{"url": "art_url"}, {"url": "small_art_url"}],
        "name": "album",
        "uri": "uri",
        "release_date": "2018-03-01",
        "tracks": {"items": [api_track("track", 1, 1)]}
    })
}

pub fn api_saved(added_at: &str, album: Value) -> Value {
    json!({"added_at": added_at, "album": album})
}

pub fn api_playlist(name: &str, total: u32) -> Value {
    json!({
        "name": name,
        "uri": format!("uri:{name}"),
        "images": [{"url": format!("art:{name}")}],
        "tracks": {"total": total}
    })
}

/// In-memory catalog serving windows of fixture items.
#[derive(Default)]
pub struct FakeLibrary {
    pub albums: Vec<Value>,
    pub playlists: Vec<Value>,
    pub search_response: Value,
    /// Page requests at these offsets fail.
    pub fail_offsets: Vec<u32>,
    /// Page requests at these offsets wait 50ms before answering.
    pub slow_offsets: Vec<u32>,
    /// Page envelopes come back without `items`.
    pub omit_items: bool,
    /// Upper bound of the random delay added to every request.
    pub max_latency_ms: u64,
    pub requests: AtomicUsize,
}

impl FakeLibrary {
    pub fn with_albums(albums: Vec<Value>) -> Self {
        FakeLibrary {
            albums,
            ..Default::default()
        }
    }

    pub fn with_playlists(playlists: Vec<Value>) -> Self {
        FakeLibrary {
            playlists,
            ..Default::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn delay(&self, offset: u32) {
        if self.slow_offsets.contains(&offset) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        } else if self.max_latency_ms > 0 {
            let millis = rand::rng().random_range(0..=self.max_latency_ms);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    async fn page<T: DeserializeOwned>(
        &self,
        items: &[Value],
        limit: u32,
        offset: u32,
    ) -> Result<RawPage<T>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.delay(offset).await;
        if self.fail_offsets.contains(&offset) {
            return Err(Error::UpstreamError(format!("injected failure at offset {offset}")));
        }
        let window: Vec<Value> = items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        let envelope = if self.omit_items {
            json!({"total": items.len()})
        } else {
            json!({"items": window, "total": items.len(), "limit": limit, "offset": offset})
        };
        serde_json::from_value(envelope).map_err(|e| Error::UpstreamError(e.to_string()))
    }
}

#[async_trait]
impl LibraryApi for FakeLibrary {
    async fn saved_albums(&self, limit: u32, offset: u32) -> Result<RawPage<RawSavedAlbum>> {
        self.page(&self.albums, limit, offset).await
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<RawPage<RawPlaylist>> {
        self.page(&self.playlists, limit, offset).await
    }

    async fn search(&self, _query: &str, _kind: SearchKind, _limit: u32) -> Result<RawSearch> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(self.search_response.clone())
            .map_err(|e| Error::UpstreamError(e.to_string()))
    }
}
