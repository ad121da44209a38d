use crate::error::{Result, UpdatesError};
use serde::{Deserialize, Serialize};

/// How an update link was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Read straight out of the signed version manifest.
    #[serde(rename = "XML Direct Link")]
    DirectManifestLink,
    /// Found by probing package directories directly (best-effort tooling
    /// outside this crate; kept in the model so exports stay uniform).
    #[serde(rename = "Direct Discovery")]
    DiscoveredLink,
}

/// One downloadable patch package announced by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Package version string, `"Unknown"` when the manifest omits it.
    pub version: String,
    /// Direct download URL for the `.pkg` payload. Always non-empty.
    pub url: String,
    /// SHA-1 checksum when announced.
    pub sha1: Option<String>,
    /// Payload size in bytes; 0 when missing or unparseable.
    pub size: u64,
    /// File name derived from the URL path.
    pub filename: String,
    /// Where the link came from.
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

/// Extract all actionable package entries from a manifest body.
///
/// Fails with [`UpdatesError::MalformedManifest`] when the bytes are not
/// well-formed XML; no partial records are salvaged in that case. Entries
/// without a download URL are skipped — an announcement with no link is not
/// actionable. Document order is preserved.
pub fn extract_updates(body: &[u8]) -> Result<Vec<UpdateRecord>> {
    let text = std::str::from_utf8(body)
        .map_err(|err| UpdatesError::MalformedManifest(err.to_string()))?;
    let document = roxmltree::Document::parse(text)
        .map_err(|err| UpdatesError::MalformedManifest(err.to_string()))?;

    let mut records = Vec::new();
    for node in document
        .descendants()
        .filter(|node| node.has_tag_name("package"))
    {
        let url = match node.attribute("url") {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => continue,
        };

        let version = node
            .attribute("version")
            .filter(|version| !version.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        let sha1 = node
            .attribute("sha1sum")
            .filter(|sum| !sum.is_empty())
            .map(str::to_string);
        // Sizes come over the wire as decimal strings; anything garbled
        // degrades to 0 rather than failing the whole manifest.
        let size = node
            .attribute("size")
            .and_then(|size| size.parse::<u64>().ok())
            .unwrap_or(0);
        let filename = filename_from_url(&url);

        records.push(UpdateRecord {
            version,
            url,
            sha1,
            size,
            filename,
            kind: SourceKind::DirectManifestLink,
        });
    }

    Ok(records)
}

/// Best-effort `.pkg` file name from a download URL.
pub fn filename_from_url(url: &str) -> String {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split_once('/').map(|(_, path)| path))
        .unwrap_or("");
    let path = path.split(['?', '#']).next().unwrap_or("");

    if let Some(last) = path.rsplit('/').next() {
        if last.ends_with(".pkg") {
            return last.to_string();
        }
    }
    // Fall back to the deepest .pkg component anywhere in the path.
    for part in path.rsplit('/') {
        if part.ends_with(".pkg") {
            return part.to_string();
        }
    }
    "unknown_file.pkg".to_string()
}
