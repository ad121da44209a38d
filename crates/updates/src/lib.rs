//! Signed update-manifest lookup for PS Vita title identifiers.
//!
//! Sony's legacy patch-distribution servers publish one XML manifest per
//! title, reachable only through a URL whose path embeds an HMAC-SHA256
//! signature over the title identifier. This crate derives that signed URL,
//! walks an ordered list of mirror hosts until one yields a usable manifest,
//! and extracts the package entries into normalized [`UpdateRecord`] values.
//!
//! ```ignore
//! use updates::UpdateClient;
//!
//! # async fn demo() -> updates::Result<()> {
//! let client = UpdateClient::builder().build()?;
//! let records = client.lookup("PCSE00491").await?;
//! for record in &records {
//!     println!("{} {} ({} bytes)", record.version, record.url, record.size);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A manifest legitimately does not exist for most titles; `lookup` returns
//! an empty list for that case and reserves errors for programmer misuse
//! (such as an identifier that normalizes to nothing).

mod client;
mod error;
mod locator;
mod manifest;
mod signing;
mod title_id;

pub use client::{UpdateClient, UpdateClientBuilder};
pub use error::{Result, UpdatesError};
pub use locator::{
    candidate_urls, locate_manifest, FetchOutcome, HttpManifestFetcher, ManifestFetcher, Mirror,
};
pub use manifest::{extract_updates, SourceKind, UpdateRecord};
pub use signing::sign;
pub use title_id::TitleId;
