use crate::entry::TitleEntry;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Checkpoint of a listing crawl, written as JSON so an interrupted run can
/// resume from the last saved page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Last page that was fully processed.
    pub current_page: u32,
    /// Number of titles collected so far.
    pub total_titles: usize,
    /// Unix timestamp (seconds) of the save.
    pub last_updated: u64,
    /// Titles collected so far.
    pub titles: Vec<TitleEntry>,
}

impl Progress {
    /// Snapshot the crawl state at `current_page`.
    pub fn new(current_page: u32, titles: Vec<TitleEntry>) -> Self {
        Self {
            current_page,
            total_titles: titles.len(),
            last_updated: unix_now(),
            titles,
        }
    }

    /// Write the checkpoint to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a checkpoint back from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> TitleEntry {
        TitleEntry {
            id: "1".into(),
            title: "Gravity Rush".into(),
            region: "JP".into(),
            media_id: "PCSG00053".into(),
            box_id: "BOX-2".into(),
            genre: "Adventure".into(),
            released: "2012-02-09".into(),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let progress = Progress::new(12, vec![sample_entry()]);
        progress.save(&path).unwrap();

        let loaded = Progress::load(&path).unwrap();
        assert_eq!(loaded.current_page, 12);
        assert_eq!(loaded.total_titles, 1);
        assert_eq!(loaded.titles, vec![sample_entry()]);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Progress::load(&dir.path().join("absent.json")).is_err());
    }
}
