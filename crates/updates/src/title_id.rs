use crate::error::{Result, UpdatesError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized PS Vita title identifier (e.g. `PCSE00491`).
///
/// The vendor's servers key everything off the catalog code exactly as it
/// appears in package paths: uppercase, no hyphens. Listing sites print the
/// same code with decorative separators (`PCSE-00491`), so every identifier
/// passes through [`TitleId::normalize`] before it reaches the signing step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(String);

impl TitleId {
    /// Canonicalize a raw identifier: trim, uppercase, strip hyphens.
    ///
    /// Idempotent. Fails only when nothing is left after normalization.
    pub fn normalize(raw: &str) -> Result<Self> {
        let token: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if token.is_empty() {
            return Err(UpdatesError::InvalidTitleId(raw.to_string()));
        }
        Ok(TitleId(token))
    }

    /// The normalized token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TitleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
