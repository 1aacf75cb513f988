//! Wire shapes returned by the catalog API.
//!
//! Every field the normalizer depends on is optional here, so an absent value
//! surfaces as [`Error::MalformedRecord`](crate::clients::errors::Error) naming
//! the field instead of a generic deserialization failure.

use serde::Deserialize;

use crate::clients::errors::{Error, Result};

/// One page of a paginated endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct RawPage<T> {
    pub items: Option<Vec<T>>,
    pub total: Option<u32>,
}

impl<T> RawPage<T> {
    pub fn new(items: Vec<T>, total: u32) -> Self {
        RawPage {
            items: Some(items),
            total: Some(total),
        }
    }

    pub fn total(&self) -> Result<u32> {
        self.total
            .ok_or_else(|| Error::UpstreamError("page envelope is missing `total`".into()))
    }

    pub fn into_items(self) -> Result<Vec<T>> {
        self.items
            .ok_or_else(|| Error::UpstreamError("page envelope is missing `items`".into()))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawArtist {
    pub name: Option<String>,
    pub uri: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawImage {
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawTrack {
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub disc_number: Option<u32>,
    pub track_number: Option<u32>,
    pub name: Option<String>,
    pub uri: Option<String>,
}

/// Nested track listing of an album. Only `items` is read.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawTrackListing {
    pub items: Option<Vec<RawTrack>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawAlbum {
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    pub name: Option<String>,
    pub uri: Option<String>,
    pub release_date: Option<String>,
    pub tracks: Option<RawTrackListing>,
}

/// A library entry: the album plus the moment it was saved.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawSavedAlbum {
    pub added_at: Option<String>,
    pub album: Option<RawAlbum>,
}

/// A track as returned by search, carrying its album.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawSearchedTrack {
    #[serde(flatten)]
    pub track: RawTrack,
    pub album: Option<RawAlbum>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawPlaylistTracks {
    pub total: Option<u32>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawPlaylist {
    pub name: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    pub tracks: Option<RawPlaylistTracks>,
}

/// Search response keyed by result type, as the API nests it.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawSearch {
    pub albums: Option<RawPage<RawAlbum>>,
    pub tracks: Option<RawPage<RawSearchedTrack>>,
}
