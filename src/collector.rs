use futures::future::BoxFuture;
use futures::stream::{StreamExt, TryStreamExt, iter};
use log::{debug, info};

use crate::clients::{
    LibraryApi,
    entities::{ArtistGroup, CollectedAlbum, LibraryTrack, Playlist},
    errors::{Error, Result},
    payloads::{RawPage, RawPlaylist, RawSavedAlbum},
};
use crate::pager::{Page, make_pages};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_WORKERS: usize = 50;

/// A paginated library endpoint and the record each of its items becomes.
pub trait PagedResource {
    type Raw;
    type Record;

    const NAME: &'static str;

    fn request(
        client: &dyn LibraryApi,
        limit: u32,
        offset: u32,
    ) -> BoxFuture<'_, Result<RawPage<Self::Raw>>>;

    fn normalize(raw: Self::Raw) -> Result<Self::Record>;
}

/// The current user's saved albums.
pub struct SavedAlbums;

impl PagedResource for SavedAlbums {
    type Raw = RawSavedAlbum;
    type Record = CollectedAlbum;

    const NAME: &'static str = "albums";

    fn request(
        client: &dyn LibraryApi,
        limit: u32,
        offset: u32,
    ) -> BoxFuture<'_, Result<RawPage<RawSavedAlbum>>> {
        client.saved_albums(limit, offset)
    }

    fn normalize(raw: RawSavedAlbum) -> Result<CollectedAlbum> {
        CollectedAlbum::try_from(raw)
    }
}

/// The current user's playlists.
pub struct Playlists;

impl PagedResource for Playlists {
    type Raw = RawPlaylist;
    type Record = Playlist;

    const NAME: &'static str = "playlists";

    fn request(
        client: &dyn LibraryApi,
        limit: u32,
        offset: u32,
    ) -> BoxFuture<'_, Result<RawPage<RawPlaylist>>> {
        client.playlists(limit, offset)
    }

    fn normalize(raw: RawPlaylist) -> Result<Playlist> {
        Playlist::try_from(raw)
    }
}

/// Fetch one page window and normalize every item on it.
pub async fn fetch_page<R: PagedResource>(
    client: &dyn LibraryApi,
    page: Page,
) -> Result<Vec<R::Record>> {
    debug!("Fetching {} limit={} offset={}", R::NAME, page.limit, page.offset);
    let raw = R::request(client, page.limit, page.offset).await?;
    raw.into_items()?.into_iter().map(R::normalize).collect()
}

pub struct CollectorBuilder {
    page_size: Option<u32>,
    workers: Option<usize>,
}

impl Default for CollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorBuilder {
    pub fn new() -> Self {
        Self {
            page_size: None,
            workers: None,
        }
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self, client: &dyn LibraryApi) -> Result<Collector<'_>> {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let workers = self.workers.unwrap_or(DEFAULT_WORKERS);
        if page_size == 0 {
            return Err(Error::ConfigurationError("page size must be at least 1".into()));
        }
        if workers == 0 {
            return Err(Error::ConfigurationError("worker count must be at least 1".into()));
        }
        Ok(Collector {
            client,
            page_size,
            workers,
        })
    }
}

/// Collects whole library resources with a bounded number of page requests in flight.
pub struct Collector<'a> {
    client: &'a dyn LibraryApi,
    page_size: u32,
    workers: usize,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a dyn LibraryApi) -> Self {
        Collector {
            client,
            page_size: DEFAULT_PAGE_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Every record of `R`, in offset order.
    ///
    /// A one-item request discovers the total, then all pages are requested
    /// concurrently. Results are reassembled in page order, so completion order
    /// never leaks into the output.
    ///
    /// Any failing page fails the collection. Errors are reported in page order
    /// too: a failure is returned once every earlier page has settled, so the
    /// same error wins whichever request finishes first. Pages still in flight
    /// are dropped with the stream.
    pub async fn collect_all<R: PagedResource>(&self) -> Result<Vec<R::Record>> {
        let total = R::request(self.client, 1, 0).await?.total()?;
        let pages = make_pages(total, 0, self.page_size);
        if pages.is_empty() {
            info!("No {} found", R::NAME);
            return Ok(Vec::new());
        }

        let width = self.workers.min(pages.len());
        debug!(
            "Collecting {total} {} over {} pages, {width} at a time",
            R::NAME,
            pages.len()
        );

        let client = self.client;
        let chunks: Vec<Vec<R::Record>> = iter(pages)
            .map(|page| fetch_page::<R>(client, page))
            .buffered(width)
            .try_collect()
            .await?;

        let records: Vec<_> = chunks.into_iter().flatten().collect();
        info!("Collected {} {}", records.len(), R::NAME);
        Ok(records)
    }

    /// Saved albums, most recently saved first.
    pub async fn albums(&self) -> Result<Vec<CollectedAlbum>> {
        let mut albums = self.collect_all::<SavedAlbums>().await?;
        albums.sort_by(|a, b| b.added.cmp(&a.added));
        Ok(albums)
    }

    /// Tracks of every saved album, in album order.
    pub async fn tracks(&self) -> Result<Vec<LibraryTrack>> {
        Ok(flatten_tracks(self.albums().await?))
    }

    /// Playlists in the order the API lists them.
    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        self.collect_all::<Playlists>().await
    }

    /// Saved albums grouped by album artist.
    pub async fn artists(&self) -> Result<Vec<ArtistGroup>> {
        Ok(group_by_artist(self.albums().await?))
    }
}

pub fn flatten_tracks(albums: Vec<CollectedAlbum>) -> Vec<LibraryTrack> {
    albums
        .into_iter()
        .flat_map(|mut album| {
            let tracks = std::mem::take(&mut album.tracks);
            tracks
                .into_iter()
                .map(move |t| LibraryTrack::from_album(t, &album))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Sort by artist name, then group neighbours sharing artist name and uri.
pub fn group_by_artist(mut albums: Vec<CollectedAlbum>) -> Vec<ArtistGroup> {
    albums.sort_by(|a, b| a.album.artist.cmp(&b.album.artist));

    let mut groups: Vec<ArtistGroup> = Vec::new();
    for album in albums {
        if let Some(group) = groups
            .last_mut()
            .filter(|g| g.name == album.album.artist && g.uri == album.album.artist_uri)
        {
            group.albums.push(album);
            continue;
        }
        groups.push(ArtistGroup {
            name: album.album.artist.clone(),
            uri: album.album.artist_uri.clone(),
            albums: vec![album],
        });
    }
    groups
}
