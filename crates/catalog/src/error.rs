/// Convenient result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while scraping, persisting, or exporting the
/// catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Network request to the listing site failed.
    #[error("listing fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    /// The listing page did not contain the expected table.
    #[error("listing page {page} has no usable title table")]
    MissingTable {
        /// Page number that failed to parse.
        page: u32,
    },
    /// Failed to perform an I/O operation.
    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
    /// CSV encoding or decoding failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
