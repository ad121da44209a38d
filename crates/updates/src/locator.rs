use crate::error::Result;
use crate::signing::sign;
use crate::title_id::TitleId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Bodies at or below this length are directory stubs or error pages, not
/// manifests.
const MIN_MANIFEST_BYTES: usize = 10;

/// One mirror of the patch-distribution service.
///
/// The candidates differ only by scheme and host; keeping them as data lets a
/// new mirror be appended without touching the fallback loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    /// `https` or `http`.
    pub scheme: String,
    /// Host name, e.g. `gs-sec.ww.np.dl.playstation.net`.
    pub host: String,
}

impl Mirror {
    /// Construct a mirror entry.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// The ordered default mirror list. The `gs-sec` host is tried over both
    /// schemes before falling back to the plain `gs` host.
    pub fn defaults() -> Vec<Mirror> {
        vec![
            Mirror::new("https", "gs-sec.ww.np.dl.playstation.net"),
            Mirror::new("http", "gs-sec.ww.np.dl.playstation.net"),
            Mirror::new("https", "gs.ww.np.dl.playstation.net"),
        ]
    }

    /// The signed manifest URL for `id` on this mirror.
    pub fn manifest_url(&self, id: &TitleId, signature: &str) -> String {
        format!(
            "{}://{}/pl/np/{id}/{signature}/{id}-ver.xml",
            self.scheme, self.host
        )
    }
}

/// Build the ordered candidate URL list for one identifier.
pub fn candidate_urls(mirrors: &[Mirror], id: &TitleId) -> Vec<String> {
    let signature = sign(id);
    mirrors
        .iter()
        .map(|mirror| mirror.manifest_url(id, &signature))
        .collect()
}

/// Outcome of one manifest fetch attempt.
///
/// Produced once per candidate URL and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200 with a plausibly sized body.
    Found(Vec<u8>),
    /// The server answered but published nothing usable here.
    NotFound,
    /// DNS failure, connection reset, timeout, TLS handshake error.
    TransportError(String),
}

/// Abstraction over fetching one candidate manifest URL.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetch the body behind `url`, folding all failure modes into
    /// [`FetchOutcome`].
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// HTTP fetcher for the vendor's legacy endpoints.
#[derive(Clone)]
pub struct HttpManifestFetcher {
    client: Client,
}

impl HttpManifestFetcher {
    /// Build a fetcher with the given per-request timeout.
    ///
    /// Certificate verification is deliberately disabled: the vendor serves
    /// these hosts with a non-standard chain that no system trust store
    /// accepts. Accepted risk for this endpoint, not a bug to fix.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return FetchOutcome::TransportError(err.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%url, %status, "candidate rejected");
            return FetchOutcome::NotFound;
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::TransportError(err.to_string()),
        };

        if body.len() <= MIN_MANIFEST_BYTES {
            debug!(%url, len = body.len(), "candidate body too short");
            return FetchOutcome::NotFound;
        }

        FetchOutcome::Found(body.to_vec())
    }
}

/// Try each candidate URL in order, returning the first usable body.
///
/// Transport failures on one candidate never abort the loop; they only
/// advance it. No retries happen here — politeness between titles is the
/// batch driver's job, and a second attempt against the same URL is not this
/// component's.
pub async fn locate_manifest<F>(fetcher: &F, candidates: &[String]) -> FetchOutcome
where
    F: ManifestFetcher,
{
    for url in candidates {
        match fetcher.fetch(url).await {
            FetchOutcome::Found(body) => {
                debug!(%url, len = body.len(), "manifest found");
                return FetchOutcome::Found(body);
            }
            FetchOutcome::NotFound => continue,
            FetchOutcome::TransportError(reason) => {
                debug!(%url, %reason, "candidate transport failure");
                continue;
            }
        }
    }
    FetchOutcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct ScriptedFetcher {
        responses: HashMap<String, FetchOutcome>,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn insert(&mut self, url: &str, outcome: FetchOutcome) {
            self.responses.insert(url.to_string(), outcome);
        }
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

    fn candidates() -> Vec<String> {
        let id = TitleId::normalize("PCSE00491").unwrap();
        candidate_urls(&Mirror::defaults(), &id)
    }

    #[test]
    fn candidate_urls_embed_signature_and_follow_mirror_order() {
        let urls = candidates();
        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls[0],
            "https://gs-sec.ww.np.dl.playstation.net/pl/np/PCSE00491\
             /12ddefb0aef257a2ef8e6792f8936f27b67c2c110461825262bbb72102f99f37\
             /PCSE00491-ver.xml"
        );
        assert!(urls[1].starts_with("http://gs-sec."));
        assert!(urls[2].starts_with("https://gs.ww."));
    }

    #[tokio::test]
    async fn falls_back_to_second_candidate() {
        let urls = candidates();
        let body = b"<titlepatch><tag><package/></tag></titlepatch>".to_vec();

        let mut fetcher = ScriptedFetcher::new();
        fetcher.insert(&urls[0], FetchOutcome::NotFound);
        fetcher.insert(&urls[1], FetchOutcome::Found(body.clone()));

        assert_eq!(
            locate_manifest(&fetcher, &urls).await,
            FetchOutcome::Found(body)
        );
    }

    #[tokio::test]
    async fn short_circuits_on_first_success() {
        let urls = candidates();
        let first = b"<titlepatch>first</titlepatch>".to_vec();
        let second = b"<titlepatch>second</titlepatch>".to_vec();

        let mut fetcher = ScriptedFetcher::new();
        fetcher.insert(&urls[0], FetchOutcome::Found(first.clone()));
        fetcher.insert(&urls[1], FetchOutcome::Found(second));

        assert_eq!(
            locate_manifest(&fetcher, &urls).await,
            FetchOutcome::Found(first)
        );
    }

    #[tokio::test]
    async fn all_transport_failures_yield_not_found() {
        let urls = candidates();
        let mut fetcher = ScriptedFetcher::new();
        for url in &urls {
            fetcher.insert(url, FetchOutcome::TransportError("connection reset".into()));
        }

        assert_eq!(locate_manifest(&fetcher, &urls).await, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn transport_failure_then_success_recovers() {
        let urls = candidates();
        let body = b"<titlepatch><tag/></titlepatch>".to_vec();

        let mut fetcher = ScriptedFetcher::new();
        fetcher.insert(&urls[0], FetchOutcome::TransportError("dns error".into()));
        fetcher.insert(&urls[1], FetchOutcome::TransportError("timeout".into()));
        fetcher.insert(&urls[2], FetchOutcome::Found(body.clone()));

        assert_eq!(
            locate_manifest(&fetcher, &urls).await,
            FetchOutcome::Found(body)
        );
    }
}
