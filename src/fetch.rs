use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions};
use tracing::debug;

use crate::parser::{CrawlContext, PageKind};

pub const BASE_URL: &str = "https://footystats.org";

/// Endpoint answering the season/match-list form submissions.
pub const AJAX_LEAGUE_ENDPOINT: &str = "ajax_league.php";

/// Placeholder href on the matches nav link meaning "fetch via AJAX form".
pub const SENTINEL_HREF: &str = "#";

/// Marker element that appears once a match page has finished populating.
pub const MATCH_READY_SELECTOR: &str = "p[data-time]";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FETCH_TIMEOUT_SECS: u64 = 30;

pub fn make_url(path: &str) -> String {
    format!("{}/{}", BASE_URL, path.trim_start_matches('/'))
}

/// Resolves an href scraped from a page into an absolute URL.
pub fn resolve_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        make_url(href)
    }
}

/// How the page should be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain GET link-follow.
    Link,
    /// POST with urlencoded form fields.
    Form(Vec<(String, String)>),
    /// Fetch through a headless browser so client-side script runs first.
    Rendered(WaitStrategy),
}

/// When a rendered fetch may capture the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Wait until the given CSS selector matches an element.
    UntilSelector(String),
    /// Sleep a fixed number of seconds after navigation.
    FixedDelay(u64),
}

/// One edge of the crawl DAG: where to fetch, how, which parser handles
/// the response, and the context carried forward to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub mode: FetchMode,
    pub next: PageKind,
    pub ctx: CrawlContext,
}

/// Transport layer behind the crawl engine. Plain and form fetches go
/// through one shared reqwest client; rendered fetches launch a headless
/// Chrome tab on the blocking pool.
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, req: &FetchRequest) -> Result<String> {
        debug!("Fetching {:?} page: {}", req.next, req.url);
        match &req.mode {
            FetchMode::Link => self.fetch_page(&req.url).await,
            FetchMode::Form(fields) => self.fetch_form(&req.url, fields).await,
            FetchMode::Rendered(wait) => fetch_rendered(&req.url, wait.clone()).await,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }
        Ok(resp.text().await?)
    }

    async fn fetch_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        let resp = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .with_context(|| format!("Form request failed for {}", url))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for form request to {}", status, url);
        }
        Ok(resp.text().await?)
    }
}

/// Navigate a headless Chrome tab, apply the wait strategy and return the
/// final markup.
async fn fetch_rendered(url: &str, wait: WaitStrategy) -> Result<String> {
    let url = url.to_string();
    tokio::task::spawn_blocking(move || -> Result<String> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .build()
            .context("Failed to build Chrome launch options")?;
        let browser = Browser::new(options).context("Failed to launch Chrome")?;
        let tab = browser.new_tab().context("Failed to create browser tab")?;

        tab.navigate_to(&url)
            .with_context(|| format!("Chrome navigation failed for {}", url))?;
        match wait {
            WaitStrategy::UntilSelector(css) => {
                tab.wait_for_element(&css)
                    .with_context(|| format!("Timed out waiting for '{}' on {}", css, url))?;
            }
            WaitStrategy::FixedDelay(secs) => {
                std::thread::sleep(Duration::from_secs(secs));
            }
        }
        tab.get_content().context("Failed to read rendered markup")
    })
    .await?
}
