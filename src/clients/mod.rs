use async_trait::async_trait;

use crate::clients::{
    errors::Result,
    payloads::{RawPage, RawPlaylist, RawSavedAlbum, RawSearch},
};

/// Normalized records handed to callers
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Raw response shapes of the catalog API
pub mod payloads;
/// Spotify API client
pub mod spotify;

pub use spotify::SpotifyClient;

/// Result types a search request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Album,
    Track,
}

/// Requests the collector issues against the catalog.
///
/// Implementations are shared read-only across concurrent page requests.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// One page of the current user's saved albums.
    async fn saved_albums(&self, limit: u32, offset: u32) -> Result<RawPage<RawSavedAlbum>>;

    /// One page of the current user's playlists.
    async fn playlists(&self, limit: u32, offset: u32) -> Result<RawPage<RawPlaylist>>;

    /// A single page of keyword search results of one kind.
    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<RawSearch>;
}
