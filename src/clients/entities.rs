use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub artist: String,
    /// `disc.track`, track number zero-padded to two digits (disc 1 track 1 is `1.01`).
    /// Track numbers above 99 collide with lower ones on the same disc.
    pub track: f64,
    pub name: String,
    pub uri: String,
}

/// Fields shared by library and search albums.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Album {
    pub artist: String,
    pub name: String,
    pub uri: String,
    pub art_url: String,
    pub artist_uri: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CollectedAlbum {
    #[serde(flatten)]
    pub album: Album,
    pub added: String,
    pub tracks: Vec<Track>,
}

/// A track flattened out of a saved album, stamped with its parent's details.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LibraryTrack {
    #[serde(flatten)]
    pub track: Track,
    pub albumartist: String,
    pub album: String,
    pub added: String,
    pub art_url: String,
}

impl LibraryTrack {
    pub fn from_album(track: Track, parent: &CollectedAlbum) -> Self {
        LibraryTrack {
            track,
            albumartist: parent.album.artist.clone(),
            album: parent.album.name.clone(),
            added: parent.added.clone(),
            art_url: parent.album.art_url.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrackAlbum {
    pub name: String,
    pub uri: String,
    pub release_date: String,
    pub art_url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchedTrack {
    #[serde(flatten)]
    pub track: Track,
    pub album: TrackAlbum,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Playlist {
    pub name: String,
    pub uri: String,
    pub art_url: String,
    pub length: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ArtistGroup {
    pub name: String,
    pub uri: String,
    pub albums: Vec<CollectedAlbum>,
}
