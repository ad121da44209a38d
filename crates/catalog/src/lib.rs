//! PS Vita title catalog handling.
//!
//! Everything around the core update lookup lives here: pulling the title
//! list from the Renascene listing pages, keeping scrape progress on disk so
//! long runs can resume, and exporting per-title results as JSON or flat CSV
//! rows.

mod entry;
mod error;
mod export;
mod listing;
mod progress;

pub use entry::TitleEntry;
pub use error::{CatalogError, Result};
pub use export::{
    load_reports_json, load_titles_csv, load_update_rows_csv, save_reports_json, save_titles_csv,
    save_update_rows_csv, LookupStatus, TitleReport, UpdateRow,
};
pub use listing::{parse_listing, ListingClient, ListingConfig};
pub use progress::Progress;
