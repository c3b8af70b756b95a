//! Remote organisation collector (GitHub REST API)
//!
//! Lists the public repositories of one organisation and fetches the raw
//! document from each repository's contents endpoint. Repository name is the
//! source id. Requests are issued one at a time.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;

use super::{CollectError, Exclusions, RawDocument, SourceCollector};

const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("wyrd-ag/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct RepoListing {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Collector over an organisation's repositories
pub struct GitHubCollector {
    http_client: reqwest::Client,
    api_base: String,
    org: String,
    token: Option<String>,
    document: String,
    exclusions: Exclusions,
}

impl GitHubCollector {
    pub fn new(
        org: impl Into<String>,
        token: Option<String>,
        document: impl Into<String>,
        exclusions: Exclusions,
    ) -> Result<Self, CollectError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CollectError::ListingFailed(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: GITHUB_API_BASE_URL.to_string(),
            org: org.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            document: document.into(),
            exclusions,
        })
    }

    /// Point at a different API host (GitHub Enterprise, test servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list_page(&self, page: usize) -> Result<Vec<RepoListing>, CollectError> {
        let url = format!(
            "{}/orgs/{}/repos?type=public&per_page={}&page={}",
            self.api_base, self.org, PER_PAGE, page
        );
        tracing::debug!(url = %url, "Listing repositories");

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| CollectError::ListingFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollectError::ListingFailed(format!(
                "HTTP {} listing {}: {}",
                status.as_u16(),
                self.org,
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CollectError::ListingFailed(format!("decode listing: {}", e)))
    }
}

/// Decode the base64 `content` field of a contents response
fn decode_content(source_id: &str, response: &ContentResponse) -> Result<Vec<u8>, CollectError> {
    if let Some(encoding) = &response.encoding {
        if encoding != "base64" {
            return Err(CollectError::malformed(
                source_id,
                format!("unsupported content encoding: {}", encoding),
            ));
        }
    }

    // Contents API wraps base64 at 60 columns
    let compact: String = response
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CollectError::malformed(source_id, format!("base64: {}", e)))
}

#[async_trait]
impl SourceCollector for GitHubCollector {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn list_sources(&self) -> Result<Vec<String>, CollectError> {
        let mut names = Vec::new();
        let mut page = 1;

        loop {
            let repos = self.list_page(page).await?;
            let page_len = repos.len();

            names.extend(
                repos
                    .into_iter()
                    .map(|r| r.name)
                    .filter(|name| !self.exclusions.excludes(name)),
            );

            if page_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    async fn fetch(&self, source_id: &str) -> Result<RawDocument, CollectError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.org, source_id, self.document
        );

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| CollectError::unavailable(source_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::unavailable(
                source_id,
                format!("HTTP {} for {}", status.as_u16(), self.document),
            ));
        }

        let content: ContentResponse = response
            .json()
            .await
            .map_err(|e| CollectError::malformed(source_id, format!("contents response: {}", e)))?;

        let bytes = decode_content(source_id, &content)?;
        serde_json::from_slice(&bytes).map_err(|e| CollectError::malformed(source_id, e))
    }
}
