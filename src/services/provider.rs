use std::collections::HashMap;
use std::future::Future;

use log::debug;
use serde::Deserialize;

use crate::models::GameError;

/// Title used when the provider returns an image without a description.
pub const FALLBACK_TITLE: &str = "Beautiful Stock Photo";

/// Contributor name used when the provider omits one.
pub const FALLBACK_CONTRIBUTOR: &str = "Unknown";

/// Asset sizes in descending preference order; the first one present wins.
const ASSET_PREFERENCE: [&str; 5] = ["huge", "large", "medium", "small", "preview"];

/// One image record from the search API. Every field the game does not
/// strictly need is optional; the accessors apply the fallbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contributor: Option<Contributor>,
    #[serde(default)]
    pub assets: HashMap<String, Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ImageRecord>,
}

impl ImageRecord {
    /// The round's title text, falling back to a fixed placeholder when the
    /// description is absent or empty.
    pub fn title(&self) -> &str {
        self.description
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(FALLBACK_TITLE)
    }

    pub fn contributor_name(&self) -> &str {
        self.contributor
            .as_ref()
            .and_then(|c| c.display_name.as_deref())
            .unwrap_or(FALLBACK_CONTRIBUTOR)
    }

    /// Best available asset URL, largest size first.
    pub fn best_asset_url(&self) -> Option<&str> {
        ASSET_PREFERENCE
            .iter()
            .find_map(|size| self.assets.get(*size).and_then(|asset| asset.url.as_deref()))
    }
}

/// The image-search boundary the orchestrator depends on. One free-text
/// query in, at most one image record out.
pub trait ImageSource: Clone + Send + Sync + 'static {
    fn search(&self, query: &str) -> impl Future<Output = Result<ImageRecord, GameError>> + Send;
}

/// Live client for the stock-photo search API.
#[derive(Clone)]
pub struct StockSearchClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl StockSearchClient {
    pub fn new(base_url: String, token: String) -> StockSearchClient {
        StockSearchClient {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }
}

impl ImageSource for StockSearchClient {
    async fn search(&self, query: &str) -> Result<ImageRecord, GameError> {
        let url = format!("{}/images/search", self.base_url);
        debug!("searching for '{}' at {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("sort", "random"),
                ("per_page", "1"),
                ("view", "full"),
            ])
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .ok_or_else(|| GameError::EmptyResult(query.to_string()))
    }
}
