use crate::error::Result;
use crate::locator::{
    candidate_urls, locate_manifest, FetchOutcome, HttpManifestFetcher, ManifestFetcher, Mirror,
};
use crate::manifest::{extract_updates, UpdateRecord};
use crate::title_id::TitleId;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`UpdateClient`].
pub struct UpdateClientBuilder {
    mirrors: Vec<Mirror>,
    timeout: Duration,
}

impl Default for UpdateClientBuilder {
    fn default() -> Self {
        Self {
            mirrors: Mirror::defaults(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl UpdateClientBuilder {
    /// Replace the ordered mirror list.
    pub fn mirrors(mut self, mirrors: Vec<Mirror>) -> Self {
        self.mirrors = mirrors;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a client backed by the real HTTP fetcher.
    pub fn build(self) -> Result<UpdateClient> {
        let fetcher = HttpManifestFetcher::new(self.timeout)?;
        Ok(UpdateClient {
            fetcher,
            mirrors: self.mirrors,
        })
    }

    /// Build a client around a custom fetcher (tests inject mocks here).
    pub fn build_with_fetcher<F>(self, fetcher: F) -> UpdateClient<F>
    where
        F: ManifestFetcher,
    {
        UpdateClient {
            fetcher,
            mirrors: self.mirrors,
        }
    }
}

/// Facade over the whole lookup pipeline: normalize, sign, locate, extract.
///
/// Holds no cross-call state beyond the HTTP connection pool; concurrent
/// lookups for distinct titles are safe.
pub struct UpdateClient<F = HttpManifestFetcher> {
    fetcher: F,
    mirrors: Vec<Mirror>,
}

impl UpdateClient {
    /// Start building a client.
    pub fn builder() -> UpdateClientBuilder {
        UpdateClientBuilder::default()
    }
}

impl<F> UpdateClient<F>
where
    F: ManifestFetcher,
{
    /// Look up update records for a raw identifier string.
    ///
    /// An empty result means no updates are published — the normal case for
    /// most titles. Errors are reserved for identifiers that normalize to
    /// nothing and for client construction problems.
    pub async fn lookup(&self, raw_id: &str) -> Result<Vec<UpdateRecord>> {
        let id = TitleId::normalize(raw_id)?;
        self.lookup_id(&id).await
    }

    /// Look up update records for an already-normalized identifier.
    pub async fn lookup_id(&self, id: &TitleId) -> Result<Vec<UpdateRecord>> {
        let candidates = candidate_urls(&self.mirrors, id);

        let body = match locate_manifest(&self.fetcher, &candidates).await {
            FetchOutcome::Found(body) => body,
            FetchOutcome::NotFound | FetchOutcome::TransportError(_) => {
                debug!(%id, "no manifest published");
                return Ok(Vec::new());
            }
        };

        match extract_updates(&body) {
            Ok(records) => Ok(records),
            // A garbled manifest is diagnostically different from a missing
            // one but means the same thing to callers.
            Err(err) => {
                debug!(%id, %err, "manifest unusable");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct ScriptedFetcher {
        responses: HashMap<String, FetchOutcome>,
    }

    #[async_trait]
    impl ManifestFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            self.responses
                .get(url)
                .cloned()
                .unwrap_or(FetchOutcome::NotFound)
        }
    }

    fn client_with(responses: HashMap<String, FetchOutcome>) -> UpdateClient<ScriptedFetcher> {
        UpdateClient::builder().build_with_fetcher(ScriptedFetcher { responses })
    }

    fn first_candidate(raw: &str) -> String {
        let id = TitleId::normalize(raw).unwrap();
        candidate_urls(&Mirror::defaults(), &id).remove(0)
    }

    #[tokio::test]
    async fn lookup_extracts_records_from_found_manifest() {
        let body = br#"<titlepatch>
            <package version="01.05" url="http://h/patch.pkg" sha1sum="ff" size="77"/>
        </titlepatch>"#
            .to_vec();

        let mut responses = HashMap::new();
        responses.insert(first_candidate("pcse-00491"), FetchOutcome::Found(body));
        let client = client_with(responses);

        let records = client.lookup("pcse-00491").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, "01.05");
        assert_eq!(records[0].size, 77);
    }

    #[tokio::test]
    async fn lookup_treats_not_found_as_empty() {
        let client = client_with(HashMap::new());
        let records = client.lookup("PCSE00491").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn lookup_treats_malformed_manifest_as_empty() {
        let mut responses = HashMap::new();
        responses.insert(
            first_candidate("PCSE00491"),
            FetchOutcome::Found(b"<titlepatch><package".to_vec()),
        );
        let client = client_with(responses);

        let records = client.lookup("PCSE00491").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn lookup_rejects_empty_identifier() {
        let client = client_with(HashMap::new());
        assert!(client.lookup("  - ").await.is_err());
    }
}
