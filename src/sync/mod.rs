mod catalog;
mod error;
mod matcher;
mod normalize;
mod report;
mod sources;

pub use catalog::{parse_catalog_rows, CatalogEntry};
pub use error::SyncError;
pub use matcher::{match_films, FilmMatch, MatchOutcome};
pub use normalize::normalize_title;
pub use report::{RunError, RunReport};
pub use sources::{
    add_manual_source, has_source, provider_sources_changed, remove_manual_source,
};
