use serde::{Deserialize, Serialize};

/// One title row from the listing site.
///
/// Field names mirror the CSV headers the tooling has always used, so old
/// title dumps keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    /// Listing-site row identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Human-readable title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Region code (`JP`, `US`, `EU`, or `Unknown`).
    #[serde(rename = "Region")]
    pub region: String,
    /// Catalog code used by the update servers (e.g. `PCSE00491`).
    #[serde(rename = "Media_ID")]
    pub media_id: String,
    /// Physical box identifier.
    #[serde(rename = "Box_ID")]
    pub box_id: String,
    /// Genre label.
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Release date as printed by the listing site.
    #[serde(rename = "Released")]
    pub released: String,
}
