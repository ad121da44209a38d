use crate::entry::TitleEntry;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use updates::{SourceKind, UpdateRecord};

/// Outcome bucket for one title lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    /// At least one update record was found.
    Success,
    /// No manifest published, or the manifest carried no actionable entries.
    NoUpdates,
    /// The title could not be processed (e.g. unusable identifier).
    Error,
}

/// Per-title result of an update-lookup batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleReport {
    /// Normalized catalog code.
    pub media_id: String,
    /// Human-readable title.
    pub title: String,
    /// Region code from the catalog.
    pub region: String,
    /// Genre label from the catalog.
    pub genre: String,
    /// Outcome bucket.
    pub status: LookupStatus,
    /// Update records, empty unless `status` is `Success`.
    #[serde(default)]
    pub updates: Vec<UpdateRecord>,
    /// Failure detail when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TitleReport {
    fn base(entry: &TitleEntry, status: LookupStatus) -> Self {
        Self {
            media_id: entry.media_id.clone(),
            title: entry.title.clone(),
            region: entry.region.clone(),
            genre: entry.genre.clone(),
            status,
            updates: Vec::new(),
            error: None,
        }
    }

    /// Report for a title with updates.
    pub fn success(entry: &TitleEntry, updates: Vec<UpdateRecord>) -> Self {
        let mut report = Self::base(entry, LookupStatus::Success);
        report.updates = updates;
        report
    }

    /// Report for a title with no published updates.
    pub fn no_updates(entry: &TitleEntry) -> Self {
        Self::base(entry, LookupStatus::NoUpdates)
    }

    /// Report for a title that could not be processed.
    pub fn failed(entry: &TitleEntry, message: impl Into<String>) -> Self {
        let mut report = Self::base(entry, LookupStatus::Error);
        report.error = Some(message.into());
        report
    }

    /// Sum of announced package sizes.
    pub fn total_size(&self) -> u64 {
        self.updates.iter().map(|update| update.size).sum()
    }
}

/// One flat export row: title columns joined with one update record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRow {
    /// Normalized catalog code.
    pub media_id: String,
    /// Human-readable title.
    pub title: String,
    /// Package version string.
    pub version: String,
    /// Direct download URL.
    pub url: String,
    /// SHA-1 checksum when announced.
    pub sha1: Option<String>,
    /// Payload size in bytes.
    pub size: u64,
    /// File name derived from the URL.
    pub filename: String,
    /// Link provenance.
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

impl UpdateRow {
    fn from_report(report: &TitleReport, update: &UpdateRecord) -> Self {
        Self {
            media_id: report.media_id.clone(),
            title: report.title.clone(),
            version: update.version.clone(),
            url: update.url.clone(),
            sha1: update.sha1.clone(),
            size: update.size,
            filename: update.filename.clone(),
            kind: update.kind,
        }
    }
}

/// Save catalog titles as CSV.
pub fn save_titles_csv(path: &Path, titles: &[TitleEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for title in titles {
        writer.serialize(title)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load catalog titles from CSV.
pub fn load_titles_csv(path: &Path) -> Result<Vec<TitleEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut titles = Vec::new();
    for record in reader.deserialize() {
        titles.push(record?);
    }
    Ok(titles)
}

/// Save batch reports as a JSON array.
pub fn save_reports_json(path: &Path, reports: &[TitleReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load batch reports back from JSON.
pub fn load_reports_json(path: &Path) -> Result<Vec<TitleReport>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save one CSV row per update record across all reports.
///
/// Titles without updates contribute no rows; the JSON export is the place
/// to look for those.
pub fn save_update_rows_csv(path: &Path, reports: &[TitleReport]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for report in reports {
        for update in &report.updates {
            writer.serialize(UpdateRow::from_report(report, update))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Load flat update rows back from CSV.
pub fn load_update_rows_csv(path: &Path) -> Result<Vec<UpdateRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
