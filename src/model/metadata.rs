use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Preview details scraped from a web page, used to pre-fill a new option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
}

/// A request for the metadata of a page.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataRequest {
    pub url: String,
}

impl MetadataRequest {
    /// Only plain web links are fetched.
    pub fn is_web_url(&self) -> bool {
        let url = self.url.trim();
        url.starts_with("http://") || url.starts_with("https://")
    }
}

fn title_regex() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn description_regex() -> &'static Regex {
    static DESCRIPTION: OnceLock<Regex> = OnceLock::new();
    DESCRIPTION.get_or_init(|| {
        Regex::new(r#"(?is)<meta\s+name=["']description["']\s+content=["'](.*?)["']"#).unwrap()
    })
}

fn image_regex() -> &'static Regex {
    static IMAGE: OnceLock<Regex> = OnceLock::new();
    IMAGE.get_or_init(|| {
        Regex::new(r#"(?is)<meta\s+property=["']og:image["']\s+content=["'](.*?)["']"#).unwrap()
    })
}

fn first_capture(regex: &Regex, html: &str) -> String {
    regex
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

impl PageMetadata {
    /// Pull the title, description and preview image out of an HTML document.
    /// Anything missing is left empty.
    pub fn extract(url: &str, html: &str) -> Self {
        Self {
            title: first_capture(title_regex(), html),
            description: first_capture(description_regex(), html),
            image: first_capture(image_regex(), html),
            url: url.to_string(),
        }
    }
}

/// Fetches pages to preview links pasted into new options.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, request: &MetadataRequest) -> Result<PageMetadata> {
        if !request.is_web_url() {
            return Err(Error::bad_request(format!(
                "only http(s) links can be previewed, got {:?}",
                request.url
            )));
        }
        let url = request.url.trim();
        debug!("Fetching metadata for {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(PageMetadata::extract(url, &html))
    }
}
