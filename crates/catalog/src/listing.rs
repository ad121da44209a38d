use crate::entry::TitleEntry;
use crate::error::{CatalogError, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::progress::Progress;

/// Configuration for the listing scraper.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// Listing site base URL.
    pub base_url: String,
    /// Last page to visit.
    pub max_pages: u32,
    /// Fetch attempts per page before giving up on it.
    pub max_retries: u32,
    /// Stop after this many consecutive empty pages.
    pub stop_after_empty: u32,
    /// Pause between page fetches.
    pub page_delay: Duration,
    /// Pause before retrying a failed page.
    pub retry_delay: Duration,
    /// Save progress every N pages when a progress path is given.
    pub save_every: u32,
    /// User agent presented to the listing site.
    pub user_agent: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://renascene.com/psv/".to_string(),
            max_pages: 39,
            max_retries: 3,
            stop_after_empty: 3,
            page_delay: Duration::from_secs(2),
            retry_delay: Duration::from_secs(5),
            save_every: 5,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Client for the Renascene PS Vita listing pages.
pub struct ListingClient {
    client: reqwest::Client,
    config: ListingConfig,
}

impl ListingClient {
    /// Build a client for the given configuration.
    pub fn new(config: ListingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}?target=list&sort=ID&ord=&gr=&page={page}",
            self.config.base_url
        )
    }

    /// Fetch and parse one listing page, retrying transient failures.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<TitleEntry>> {
        let url = self.page_url(page);

        for attempt in 1..=self.config.max_retries {
            let last_attempt = attempt == self.config.max_retries;

            let html = match self.client.get(&url).send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(response) => response.text().await,
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };

            match html {
                Ok(html) => match parse_listing(&html) {
                    Some(entries) => {
                        debug!(page, count = entries.len(), "listing page parsed");
                        return Ok(entries);
                    }
                    None if last_attempt => return Err(CatalogError::MissingTable { page }),
                    None => warn!(page, attempt, "title table missing, retrying"),
                },
                Err(err) if last_attempt => return Err(CatalogError::Fetch(err)),
                Err(err) => warn!(page, attempt, %err, "page fetch failed, retrying"),
            }

            sleep(self.config.retry_delay).await;
        }

        // Unreachable: the last attempt always returns above.
        Err(CatalogError::MissingTable { page })
    }

    /// Crawl listing pages from `start_page`, optionally checkpointing to
    /// `progress_path` so an interrupted run can resume.
    ///
    /// Pages that stay broken after retries count as empty rather than
    /// aborting the crawl; the crawl stops early after
    /// `stop_after_empty` consecutive empty pages.
    pub async fn scrape_all(
        &self,
        start_page: u32,
        progress_path: Option<&Path>,
    ) -> Result<Vec<TitleEntry>> {
        let mut titles = match (start_page > 1, progress_path) {
            (true, Some(path)) if path.exists() => {
                let progress = Progress::load(path)?;
                info!(count = progress.titles.len(), "resuming from saved progress");
                progress.titles
            }
            _ => Vec::new(),
        };

        let mut consecutive_empty = 0u32;

        for page in start_page..=self.config.max_pages {
            let entries = match self.fetch_page(page).await {
                Ok(entries) => entries,
                Err(CatalogError::Fetch(err)) => {
                    warn!(page, %err, "page unreachable, treating as empty");
                    Vec::new()
                }
                Err(CatalogError::MissingTable { page }) => {
                    warn!(page, "page has no title table, treating as empty");
                    Vec::new()
                }
                Err(err) => return Err(err),
            };

            if entries.is_empty() {
                consecutive_empty += 1;
                if consecutive_empty >= self.config.stop_after_empty {
                    info!(page, "stopping after consecutive empty pages");
                    break;
                }
            } else {
                consecutive_empty = 0;
                titles.extend(entries);
                info!(page, total = titles.len(), "listing page scraped");
            }

            if let Some(path) = progress_path {
                if page % self.config.save_every == 0 {
                    Progress::new(page, titles.clone()).save(path)?;
                    debug!(page, "progress saved");
                }
            }

            if page < self.config.max_pages {
                sleep(self.config.page_delay).await;
            }
        }

        Ok(titles)
    }
}

/// Parse a listing page into title entries.
///
/// Returns `None` when the page carries no `table#tabloid` at all (layout
/// change or error page); rows that do not fit the known column scheme are
/// skipped individually.
pub fn parse_listing(html: &str) -> Option<Vec<TitleEntry>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table#tabloid").expect("valid selector");
    let row_selector = Selector::parse("tr").expect("valid selector");
    let cell_selector = Selector::parse("td").expect("valid selector");
    let link_selector = Selector::parse("a").expect("valid selector");
    let img_selector = Selector::parse("img").expect("valid selector");

    let table = document.select(&table_selector).next()?;
    let mut entries = Vec::new();

    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        // Column scheme: status icon, ID, title, region flag, media id,
        // box id, genre, release date.
        if cells.len() < 8 {
            continue;
        }

        // Prefer the anchor text; the cell itself may carry extra markup.
        let title = cells[2]
            .select(&link_selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| element_text(cells[2]));
        let media_id = element_text(cells[4]);

        if title.is_empty() || media_id.is_empty() {
            continue;
        }

        let region = cells[3]
            .select(&img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(region_from_flag)
            .unwrap_or("Unknown");

        entries.push(TitleEntry {
            id: element_text(cells[1]),
            title,
            region: region.to_string(),
            media_id,
            box_id: element_text(cells[5]),
            genre: element_text(cells[6]),
            released: element_text(cells[7]),
        });
    }

    Some(entries)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn region_from_flag(src: &str) -> &'static str {
    if src.contains("jp.gif") {
        "JP"
    } else if src.contains("us.gif") {
        "US"
    } else if src.contains("eu.gif") {
        "EU"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="tabloid">
          <tr><th>i</th><th>ID</th><th>TITLE</th><th>REGION</th><th>Media ID</th>
              <th>Box ID</th><th>GENRE</th><th>RELEASED</th></tr>
          <tr>
            <td><img src="ok.gif"/></td>
            <td>1</td>
            <td><a href="/psv/?id=1">Uncharted: Golden Abyss</a></td>
            <td><img src="/img/us.gif"/></td>
            <td>PCSA-00029</td>
            <td>BOX-1</td>
            <td>Action</td>
            <td>2012-02-15</td>
          </tr>
          <tr>
            <td><img src="ok.gif"/></td>
            <td>2</td>
            <td>Gravity Rush</td>
            <td><img src="/img/jp.gif"/></td>
            <td>PCSG-00053</td>
            <td>BOX-2</td>
            <td>Adventure</td>
            <td>2012-02-09</td>
          </tr>
          <tr><td>short row</td></tr>
          <tr>
            <td></td><td>3</td><td></td><td></td><td>PCSB-00000</td>
            <td></td><td></td><td></td>
          </tr>
        </table>
        </body></html>"#;

    #[test]
    fn parses_rows_from_the_known_table_layout() {
        let entries = parse_listing(PAGE).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Uncharted: Golden Abyss");
        assert_eq!(entries[0].region, "US");
        assert_eq!(entries[0].media_id, "PCSA-00029");
        assert_eq!(entries[0].released, "2012-02-15");

        assert_eq!(entries[1].title, "Gravity Rush");
        assert_eq!(entries[1].region, "JP");
    }

    #[test]
    fn missing_table_is_distinguished_from_empty_rows() {
        assert!(parse_listing("<html><body>maintenance</body></html>").is_none());
        let empty = parse_listing(r#"<table id="tabloid"><tr><th>h</th></tr></table>"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn unknown_flag_maps_to_unknown_region() {
        assert_eq!(region_from_flag("/img/kr.gif"), "Unknown");
        assert_eq!(region_from_flag("/img/eu.gif"), "EU");
    }

    #[test]
    fn page_url_carries_the_listing_parameters() {
        let client = ListingClient::new(ListingConfig::default()).unwrap();
        assert_eq!(
            client.page_url(7),
            "https://renascene.com/psv/?target=list&sort=ID&ord=&gr=&page=7"
        );
    }
}
