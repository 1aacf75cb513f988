use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, warn};
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    model::{
        FullAlbum, FullTrack, Image, Page, SavedAlbum, SearchResult, SearchType, SimplifiedAlbum,
        SimplifiedArtist, SimplifiedPlaylist, SimplifiedTrack,
    },
    prelude::*,
    scopes,
};
use serde::de::DeserializeOwned;

use crate::clients::{
    LibraryApi, SearchKind,
    errors::{Error, Result},
    payloads::{
        RawAlbum, RawArtist, RawImage, RawPage, RawPlaylist, RawPlaylistTracks, RawSavedAlbum,
        RawSearch, RawSearchedTrack, RawTrack, RawTrackListing,
    },
};
use crate::config::Settings;

const REDIRECT_URI: &str = "http://localhost";

impl From<SimplifiedArtist> for RawArtist {
    fn from(a: SimplifiedArtist) -> RawArtist {
        RawArtist {
            uri: a.id.map(|id| id.uri()),
            name: Some(a.name),
        }
    }
}

impl From<Image> for RawImage {
    fn from(i: Image) -> RawImage {
        RawImage { url: Some(i.url) }
    }
}

impl From<SimplifiedTrack> for RawTrack {
    fn from(t: SimplifiedTrack) -> RawTrack {
        RawTrack {
            artists: t.artists.into_iter().map(RawArtist::from).collect(),
            disc_number: u32::try_from(t.disc_number).ok(),
            track_number: Some(t.track_number),
            name: Some(t.name),
            uri: t.id.map(|id| id.uri()),
        }
    }
}

impl From<FullAlbum> for RawAlbum {
    fn from(a: FullAlbum) -> RawAlbum {
        RawAlbum {
            artists: a.artists.into_iter().map(RawArtist::from).collect(),
            images: a.images.into_iter().map(RawImage::from).collect(),
            name: Some(a.name),
            uri: Some(a.id.uri()),
            release_date: Some(a.release_date),
            tracks: Some(RawTrackListing {
                items: Some(a.tracks.items.into_iter().map(RawTrack::from).collect()),
            }),
        }
    }
}

impl From<SimplifiedAlbum> for RawAlbum {
    fn from(a: SimplifiedAlbum) -> RawAlbum {
        RawAlbum {
            artists: a.artists.into_iter().map(RawArtist::from).collect(),
            images: a.images.into_iter().map(RawImage::from).collect(),
            name: Some(a.name),
            uri: a.id.map(|id| id.uri()),
            release_date: a.release_date,
            tracks: None,
        }
    }
}

impl From<SavedAlbum> for RawSavedAlbum {
    fn from(s: SavedAlbum) -> RawSavedAlbum {
        RawSavedAlbum {
            added_at: Some(s.added_at.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            album: Some(RawAlbum::from(s.album)),
        }
    }
}

impl From<FullTrack> for RawSearchedTrack {
    fn from(t: FullTrack) -> RawSearchedTrack {
        RawSearchedTrack {
            track: RawTrack {
                artists: t.artists.into_iter().map(RawArtist::from).collect(),
                disc_number: u32::try_from(t.disc_number).ok(),
                track_number: Some(t.track_number),
                name: Some(t.name),
                uri: t.id.map(|id| id.uri()),
            },
            album: Some(RawAlbum::from(t.album)),
        }
    }
}

impl From<SimplifiedPlaylist> for RawPlaylist {
    fn from(p: SimplifiedPlaylist) -> RawPlaylist {
        RawPlaylist {
            name: Some(p.name),
            uri: Some(p.id.uri()),
            images: p.images.into_iter().map(RawImage::from).collect(),
            tracks: Some(RawPlaylistTracks {
                total: Some(p.tracks.total),
            }),
        }
    }
}

fn raw_page<T: DeserializeOwned, R: From<T>>(page: Page<T>) -> RawPage<R> {
    RawPage::new(page.items.into_iter().map(R::from).collect(), page.total)
}

/// Location of the cached OAuth token.
pub fn token_cache_path() -> PathBuf {
    // Fall back to /tmp if the cache directory can't be determined
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("sputils")
        .join("user_cache")
}

pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
    user: String,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify, user: String) -> Self {
        SpotifyClient { spotify, user }
    }

    // Build a client with a cached token location; no network calls are made here
    pub fn try_new(settings: &Settings) -> Result<Self> {
        let creds = Credentials::new(&settings.client_id, &settings.client_secret);
        let oauth = OAuth {
            redirect_uri: REDIRECT_URI.to_string(),
            scopes: scopes!("user-library-read"),
            ..Default::default()
        };

        let cache_path = token_cache_path();
        if let Some(dir) = cache_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                cache_path,
                ..Default::default()
            },
        );

        Ok(Self::new(spotify, settings.user.clone()))
    }

    // Load the cached token or authorize via CLI prompt and OAuth flow
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self
            .spotify
            .get_authorize_url(false)
            .map_err(|e| Error::AuthFailure(e.to_string()))?;
        // This function requires the `cli` feature enabled.
        self.spotify
            .prompt_for_token(&url)
            .await
            .map_err(|e| Error::AuthFailure(e.to_string()))?;

        let has_token = self
            .spotify
            .token
            .lock()
            .await
            .map_err(|_| Error::AuthFailure("token store is unavailable".into()))?
            .is_some();
        if !has_token {
            return Err(Error::AuthFailure(
                "Unable to retrieve authentication token".into(),
            ));
        }

        let me = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", me.display_name);
        if me.id.id() != self.user {
            warn!(
                "Cached token belongs to '{}', not the configured user '{}'",
                me.id.id(),
                self.user
            );
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryApi for SpotifyClient {
    async fn saved_albums(&self, limit: u32, offset: u32) -> Result<RawPage<RawSavedAlbum>> {
        debug!("Requesting saved albums limit={limit} offset={offset}");
        let page = self
            .spotify
            .current_user_saved_albums_manual(None, Some(limit), Some(offset))
            .await?;
        Ok(raw_page(page))
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<RawPage<RawPlaylist>> {
        debug!("Requesting playlists limit={limit} offset={offset}");
        let page = self
            .spotify
            .current_user_playlists_manual(Some(limit), Some(offset))
            .await?;
        Ok(raw_page(page))
    }

    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<RawSearch> {
        let search_type = match kind {
            SearchKind::Album => SearchType::Album,
            SearchKind::Track => SearchType::Track,
        };
        debug!("Searching {search_type:?} for {query:?}");
        let result = self
            .spotify
            .search(query, search_type, None, None, Some(limit), None)
            .await?;

        match result {
            SearchResult::Albums(page) => Ok(RawSearch {
                albums: Some(raw_page(page)),
                ..Default::default()
            }),
            SearchResult::Tracks(page) => Ok(RawSearch {
                tracks: Some(raw_page(page)),
                ..Default::default()
            }),
            _ => Err(Error::UpstreamError(format!(
                "search for {search_type:?} returned another result type"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const ALBUM_ID: &str = "4aawyAB9vmqN3uQ7FjRGTy";
    const ARTIST_ID: &str = "0TnOYISbd1XYRBk9myaseg";
    const TRACK_ID: &str = "11dFghVXANMlKmJXsNCbNl";
    const PLAYLIST_ID: &str = "37i9dQZF1DXcBWIGoYBM5M";

    fn artist() -> Value {
        json!({
            "external_urls": {"spotify": format!("https://open.spotify.com/artist/{ARTIST_ID}")},
            "href": format!("https://api.spotify.com/v1/artists/{ARTIST_ID}"),
            "id": ARTIST_ID,
            "name": "Pitbull",
            "type": "artist",
            "uri": format!("spotify:artist:{ARTIST_ID}")
        })
    }

    fn image() -> Value {
        json!({"url": "https://i.scdn.co/image/large", "height": 640, "width": 640})
    }

    fn simplified_track(id: Value, disc_number: i32, track_number: u32) -> Value {
        json!({
            "artists": [artist()],
            "available_markets": ["GB"],
            "disc_number": disc_number,
            "duration_ms": 206_120,
            "explicit": false,
            "external_urls": {"spotify": "https://open.spotify.com/track/x"},
            "href": "https://api.spotify.com/v1/tracks/x",
            "id": id,
            "is_local": false,
            "name": "Global Warming",
            "preview_url": null,
            "track_number": track_number,
            "type": "track",
            "uri": "spotify:track:x"
        })
    }

    fn saved_album(added_at: &str, tracks: Vec<Value>) -> Value {
        json!({
            "added_at": added_at,
            "album": {
                "album_type": "album",
                "total_tracks": tracks.len(),
                "available_markets": ["GB"],
                "external_urls": {"spotify": format!("https://open.spotify.com/album/{ALBUM_ID}")},
                "href": format!("https://api.spotify.com/v1/albums/{ALBUM_ID}"),
                "id": ALBUM_ID,
                "images": [image()],
                "name": "Global Warming",
                "release_date": "2012-11-16",
                "release_date_precision": "day",
                "type": "album",
                "uri": format!("spotify:album:{ALBUM_ID}"),
                "artists": [artist()],
                "tracks": {
                    "href": format!("https://api.spotify.com/v1/albums/{ALBUM_ID}/tracks"),
                    "limit": 50,
                    "next": null,
                    "offset": 0,
                    "previous": null,
                    "total": tracks.len(),
                    "items": tracks
                },
                "copyrights": [{"text": "(P) 2012 RCA Records", "type": "P"}],
                "external_ids": {"upc": "886443671584"},
                "genres": [],
                "label": "RCA Records",
                "popularity": 60
            }
        })
    }

    fn convert_saved(value: Value) -> RawSavedAlbum {
        let saved: SavedAlbum = serde_json::from_value(value).unwrap();
        RawSavedAlbum::from(saved)
    }

    #[test]
    fn saved_album_keeps_wire_fields() {
        let raw = convert_saved(saved_album(
            "2020-05-01T10:00:00Z",
            vec![simplified_track(json!(TRACK_ID), 2, 7)],
        ));

        assert_eq!(raw.added_at.as_deref(), Some("2020-05-01T10:00:00Z"));
        let album = raw.album.unwrap();
        assert_eq!(album.uri, Some(format!("spotify:album:{ALBUM_ID}")));
        assert_eq!(album.name.as_deref(), Some("Global Warming"));
        assert_eq!(album.release_date.as_deref(), Some("2012-11-16"));
        assert_eq!(album.images[0].url.as_deref(), Some("https://i.scdn.co/image/large"));
        assert_eq!(album.artists[0].name.as_deref(), Some("Pitbull"));
        assert_eq!(album.artists[0].uri, Some(format!("spotify:artist:{ARTIST_ID}")));

        let tracks = album.tracks.unwrap().items.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].disc_number, Some(2));
        assert_eq!(tracks[0].track_number, Some(7));
        assert_eq!(tracks[0].uri, Some(format!("spotify:track:{TRACK_ID}")));
    }

    #[test]
    fn added_at_strings_sort_chronologically() {
        let earlier = convert_saved(saved_album("2019-12-31T23:59:59Z", vec![]));
        let later = convert_saved(saved_album("2020-01-01T00:00:00Z", vec![]));
        let much_later = convert_saved(saved_album("2021-03-04T05:06:07Z", vec![]));

        assert!(later.added_at > earlier.added_at);
        assert!(much_later.added_at > later.added_at);
    }

    #[test]
    fn local_track_without_id_has_no_uri() {
        let raw = convert_saved(saved_album(
            "2020-05-01T10:00:00Z",
            vec![simplified_track(Value::Null, 1, 1)],
        ));
        let track = &raw.album.unwrap().tracks.unwrap().items.unwrap()[0];
        assert_eq!(track.uri, None);
        assert_eq!(track.name.as_deref(), Some("Global Warming"));
    }

    #[test]
    fn negative_disc_number_is_dropped() {
        let track: SimplifiedTrack =
            serde_json::from_value(simplified_track(json!(TRACK_ID), -1, 3)).unwrap();
        let raw = RawTrack::from(track);
        assert_eq!(raw.disc_number, None);
        assert_eq!(raw.track_number, Some(3));

        let err = crate::clients::entities::Track::try_from(raw).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRecord {
                field: "disc_number",
                ..
            }
        ));
    }

    #[test]
    fn full_track_carries_simplified_album() {
        let mut value = simplified_track(json!(TRACK_ID), 1, 4);
        value["album"] = json!({
            "album_type": "album",
            "artists": [artist()],
            "available_markets": ["GB"],
            "external_urls": {"spotify": format!("https://open.spotify.com/album/{ALBUM_ID}")},
            "href": format!("https://api.spotify.com/v1/albums/{ALBUM_ID}"),
            "id": ALBUM_ID,
            "images": [image()],
            "name": "Global Warming",
            "release_date": "2012-11-16",
            "release_date_precision": "day",
            "total_tracks": 14,
            "type": "album",
            "uri": format!("spotify:album:{ALBUM_ID}")
        });
        value["external_ids"] = json!({"isrc": "USRC11200786"});
        value["popularity"] = json!(55);
        let track: FullTrack = serde_json::from_value(value).unwrap();

        let raw = RawSearchedTrack::from(track);

        assert_eq!(raw.track.uri, Some(format!("spotify:track:{TRACK_ID}")));
        assert_eq!(raw.track.disc_number, Some(1));
        assert_eq!(raw.track.track_number, Some(4));
        let album = raw.album.unwrap();
        assert_eq!(album.uri, Some(format!("spotify:album:{ALBUM_ID}")));
        assert_eq!(album.release_date.as_deref(), Some("2012-11-16"));
        assert!(album.tracks.is_none());
    }

    #[test]
    fn playlist_reads_track_total() {
        let value = json!({
            "collaborative": false,
            "description": "",
            "external_urls": {
                "spotify": format!("https://open.spotify.com/playlist/{PLAYLIST_ID}")
            },
            "href": format!("https://api.spotify.com/v1/playlists/{PLAYLIST_ID}"),
            "id": PLAYLIST_ID,
            "images": [image()],
            "name": "Today's Top Hits",
            "owner": {
                "display_name": "Spotify",
                "external_urls": {"spotify": "https://open.spotify.com/user/spotify"},
                "href": "https://api.spotify.com/v1/users/spotify",
                "id": "spotify",
                "images": [],
                "type": "user",
                "uri": "spotify:user:spotify"
            },
            "public": true,
            "snapshot_id": "MTY4OTk2NDQwMCwwMDAwMDAwMA==",
            "tracks": {
                "href": format!("https://api.spotify.com/v1/playlists/{PLAYLIST_ID}/tracks"),
                "total": 50
            },
            "type": "playlist",
            "uri": format!("spotify:playlist:{PLAYLIST_ID}")
        });
        let playlist: SimplifiedPlaylist = serde_json::from_value(value).unwrap();

        let raw = RawPlaylist::from(playlist);

        assert_eq!(raw.name.as_deref(), Some("Today's Top Hits"));
        assert_eq!(raw.uri, Some(format!("spotify:playlist:{PLAYLIST_ID}")));
        assert_eq!(raw.images.len(), 1);
        assert_eq!(raw.tracks.unwrap().total, Some(50));
    }

    #[test]
    fn page_conversion_keeps_order_and_total() {
        let value = json!({
            "href": "https://api.spotify.com/v1/me/albums",
            "items": [
                saved_album("2020-01-01T00:00:00Z", vec![]),
                saved_album("2021-01-01T00:00:00Z", vec![])
            ],
            "limit": 2,
            "next": null,
            "offset": 4,
            "previous": null,
            "total": 9
        });
        let page: Page<SavedAlbum> = serde_json::from_value(value).unwrap();

        let raw: RawPage<RawSavedAlbum> = raw_page(page);

        assert_eq!(raw.total().unwrap(), 9);
        let added: Vec<_> = raw
            .into_items()
            .unwrap()
            .into_iter()
            .map(|a| a.added_at.unwrap())
            .collect();
        assert_eq!(added, ["2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z"]);
    }
}
