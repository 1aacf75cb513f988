use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::clients::{
    LibraryApi, SearchKind,
    entities::{Album, ArtistGroup, CollectedAlbum, LibraryTrack, Playlist, SearchedTrack},
    errors::{Error, Result},
};
use crate::collector::Collector;

/// Results per search request.
pub const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Artists,
    Albums,
    Tracks,
    Playlists,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Artists => "artists",
            Resource::Albums => "albums",
            Resource::Tracks => "tracks",
            Resource::Playlists => "playlists",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "artists" => Ok(Resource::Artists),
            "albums" => Ok(Resource::Albums),
            "tracks" => Ok(Resource::Tracks),
            "playlists" => Ok(Resource::Playlists),
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }
}

/// An ordered list of flat records of a single kind.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Records {
    Albums(Vec<CollectedAlbum>),
    Tracks(Vec<LibraryTrack>),
    Playlists(Vec<Playlist>),
    Artists(Vec<ArtistGroup>),
    SearchedAlbums(Vec<Album>),
    SearchedTracks(Vec<SearchedTrack>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Albums(r) => r.len(),
            Records::Tracks(r) => r.len(),
            Records::Playlists(r) => r.len(),
            Records::Artists(r) => r.len(),
            Records::SearchedAlbums(r) => r.len(),
            Records::SearchedTracks(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collect a whole resource from the user's library using default collector settings.
pub async fn collect(client: &dyn LibraryApi, resource: Resource) -> Result<Records> {
    collect_with(&Collector::new(client), resource).await
}

pub async fn collect_with(collector: &Collector<'_>, resource: Resource) -> Result<Records> {
    info!("Collecting {resource} ...");
    let records = match resource {
        Resource::Albums => Records::Albums(collector.albums().await?),
        Resource::Tracks => Records::Tracks(collector.tracks().await?),
        Resource::Playlists => Records::Playlists(collector.playlists().await?),
        Resource::Artists => Records::Artists(collector.artists().await?),
    };
    Ok(records)
}

/// Search the catalog. Only albums and tracks can be searched.
pub async fn search(client: &dyn LibraryApi, query: &str, resource: Resource) -> Result<Records> {
    info!("Searching {resource} for {query:?} ...");
    match resource {
        Resource::Albums => {
            let response = client.search(query, SearchKind::Album, SEARCH_LIMIT).await?;
            let page = response
                .albums
                .ok_or_else(|| Error::UpstreamError("search response is missing `albums`".into()))?;
            let albums = page
                .into_items()?
                .into_iter()
                .map(Album::try_from)
                .collect::<Result<Vec<_>>>()?;
            Ok(Records::SearchedAlbums(albums))
        }
        Resource::Tracks => {
            let response = client.search(query, SearchKind::Track, SEARCH_LIMIT).await?;
            let page = response
                .tracks
                .ok_or_else(|| Error::UpstreamError("search response is missing `tracks`".into()))?;
            let tracks = page
                .into_items()?
                .into_iter()
                .map(SearchedTrack::try_from)
                .collect::<Result<Vec<_>>>()?;
            Ok(Records::SearchedTracks(tracks))
        }
        Resource::Artists | Resource::Playlists => Err(Error::UnknownResource(format!(
            "{resource} cannot be searched"
        ))),
    }
}
