/// Convenient result alias for update-lookup operations.
pub type Result<T> = std::result::Result<T, UpdatesError>;

/// Errors that can occur while looking up update manifests.
///
/// Expected outcomes (no manifest published, transport failure on one mirror)
/// are not errors; they are carried by [`crate::FetchOutcome`] and surface to
/// callers as an empty record list.
#[derive(thiserror::Error, Debug)]
pub enum UpdatesError {
    /// The raw identifier normalized to an empty token.
    #[error("invalid title identifier: {0:?}")]
    InvalidTitleId(String),
    /// The manifest body could not be parsed as XML.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),
    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}
