use thiserror::Error;

/// Failures that can occur while talking to upstream services or applying
/// their responses to the library.
///
/// The jobs treat these differently depending on where they surface: an error
/// while fetching or parsing the catalog aborts the whole run, while an error
/// while updating a single record is recorded in the run report and the job
/// moves on to the next record.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("{service} returned status {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error("scrape returned no content")]
    EmptyContent,

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
