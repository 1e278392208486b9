mod memory_store;
mod models;
mod sqlite_store;

pub use memory_store::MemoryMediaStore;
pub use models::{FilmPatch, FilmRecord, MediaItem, MediaKind, SourceKind, StreamingSource};
pub use sqlite_store::SqliteMediaStore;

use anyhow::Result;

/// Persistence boundary for the media library.
///
/// Items are stored as JSON documents keyed by id; films additionally get a
/// typed read view so the sync jobs do not have to poke at raw JSON. Film
/// mutations go through [FilmPatch] so a job can update the fields it owns
/// without clobbering the rest of the document.
pub trait MediaStore: Send + Sync {
    fn list_items(&self) -> Result<Vec<MediaItem>>;
    fn get_item(&self, id: &str) -> Result<Option<MediaItem>>;
    fn upsert_item(&self, item: &MediaItem) -> Result<()>;
    /// Returns false when no item with that id existed.
    fn delete_item(&self, id: &str) -> Result<bool>;

    /// All film records, parsed from their documents.
    fn list_films(&self) -> Result<Vec<FilmRecord>>;
    /// Films with a provider id, never-synced ones first, then oldest sync
    /// first, capped at `limit`.
    fn films_needing_source_refresh(&self, limit: usize) -> Result<Vec<FilmRecord>>;
    /// Films with a provider id but no IMDb id yet, capped at `limit`.
    fn films_missing_imdb_id(&self, limit: usize) -> Result<Vec<FilmRecord>>;
    /// Applies the patch to the film's document. Fails if the id does not
    /// refer to an existing film.
    fn update_film(&self, id: &str, patch: &FilmPatch) -> Result<()>;
}
