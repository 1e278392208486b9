mod firecrawl;
mod omdb;
mod tmdb;
mod watchmode;

pub use firecrawl::FirecrawlScraper;
pub use omdb::OmdbClient;
pub use tmdb::TmdbClient;
pub use watchmode::WatchmodeClient;

use crate::store::StreamingSource;
use crate::sync::SyncError;

/// Renders the streaming catalog page to markdown.
pub trait CatalogSource: Send + Sync {
    fn fetch_markdown(&self) -> Result<String, SyncError>;
}

/// Reports where a film can currently be streamed.
pub trait StreamingSourceProvider: Send + Sync {
    /// Current sources for a film, keyed by the provider's title id, already
    /// filtered down to the kinds worth persisting. Returns
    /// [SyncError::RateLimited] when the provider pushes back, so the caller
    /// can stop the batch instead of burning through its quota.
    fn streaming_sources(&self, external_id: &str) -> Result<Vec<StreamingSource>, SyncError>;
}

/// Resolves a film's IMDb id from its title and year.
pub trait ImdbResolver: Send + Sync {
    fn provider_name(&self) -> &'static str;
    /// Ok(None) means the provider answered but had no match; the caller
    /// falls through to the next resolver.
    fn resolve_imdb_id(&self, title: &str, year: Option<i32>)
        -> Result<Option<String>, SyncError>;
}
