//! Conversions from raw API payloads into flat records.
//!
//! Conversions are pure. A missing required field is always an error, never a
//! default value.

use crate::clients::{
    entities::{Album, CollectedAlbum, Playlist, SearchedTrack, Track, TrackAlbum},
    errors::{Error, Result},
    payloads::{
        RawAlbum, RawArtist, RawImage, RawPlaylist, RawSavedAlbum, RawSearchedTrack, RawTrack,
    },
};

fn required<T>(value: Option<T>, record: &'static str, field: &'static str) -> Result<T> {
    value.ok_or(Error::MalformedRecord { record, field })
}

/// Comma-joined artist names, in source order.
fn joined_artists(artists: &[RawArtist], record: &'static str) -> Result<String> {
    if artists.is_empty() {
        return Err(Error::MalformedRecord {
            record,
            field: "artists",
        });
    }
    let names = artists
        .iter()
        .map(|a| a.name.as_deref().ok_or(Error::MalformedRecord { record, field: "artists.name" }))
        .collect::<Result<Vec<_>>>()?;
    Ok(names.join(", "))
}

fn first_image(images: Vec<RawImage>, record: &'static str) -> Result<String> {
    let image = required(images.into_iter().next(), record, "images")?;
    required(image.url, record, "images.url")
}

fn track_position(disc: u32, number: u32) -> Result<f64> {
    format!("{disc}.{number:02}")
        .parse()
        .map_err(|_| Error::MalformedRecord {
            record: "track",
            field: "track_number",
        })
}

impl TryFrom<RawTrack> for Track {
    type Error = Error;

    fn try_from(raw: RawTrack) -> Result<Self> {
        let artist = joined_artists(&raw.artists, "track")?;
        let disc = required(raw.disc_number, "track", "disc_number")?;
        let number = required(raw.track_number, "track", "track_number")?;
        Ok(Track {
            artist,
            track: track_position(disc, number)?,
            name: required(raw.name, "track", "name")?,
            uri: required(raw.uri, "track", "uri")?,
        })
    }
}

// Search results and library results share this shape.
impl TryFrom<RawAlbum> for Album {
    type Error = Error;

    fn try_from(raw: RawAlbum) -> Result<Self> {
        let artist = joined_artists(&raw.artists, "album")?;
        let artist_uri = required(
            raw.artists.first().and_then(|a| a.uri.clone()),
            "album",
            "artists.uri",
        )?;
        Ok(Album {
            artist,
            name: required(raw.name, "album", "name")?,
            uri: required(raw.uri, "album", "uri")?,
            art_url: first_image(raw.images, "album")?,
            artist_uri,
        })
    }
}

impl TryFrom<RawSavedAlbum> for CollectedAlbum {
    type Error = Error;

    fn try_from(raw: RawSavedAlbum) -> Result<Self> {
        let added = required(raw.added_at, "saved album", "added_at")?;
        let mut album = required(raw.album, "saved album", "album")?;
        let listing = required(album.tracks.take(), "album", "tracks")?;
        let tracks = required(listing.items, "album", "tracks.items")?
            .into_iter()
            .map(Track::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(CollectedAlbum {
            album: Album::try_from(album)?,
            added,
            tracks,
        })
    }
}

impl TryFrom<RawSearchedTrack> for SearchedTrack {
    type Error = Error;

    fn try_from(raw: RawSearchedTrack) -> Result<Self> {
        let album = required(raw.album, "track", "album")?;
        Ok(SearchedTrack {
            track: Track::try_from(raw.track)?,
            album: TrackAlbum {
                name: required(album.name, "track album", "name")?,
                uri: required(album.uri, "track album", "uri")?,
                release_date: required(album.release_date, "track album", "release_date")?,
                art_url: first_image(album.images, "track album")?,
            },
        })
    }
}

impl TryFrom<RawPlaylist> for Playlist {
    type Error = Error;

    fn try_from(raw: RawPlaylist) -> Result<Self> {
        let tracks = required(raw.tracks, "playlist", "tracks")?;
        Ok(Playlist {
            name: required(raw.name, "playlist", "name")?,
            uri: required(raw.uri, "playlist", "uri")?,
            art_url: first_image(raw.images, "playlist")?,
            length: required(tracks.total, "playlist", "tracks.total")?,
        })
    }
}
