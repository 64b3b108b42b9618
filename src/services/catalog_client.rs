// Deckodecko catalog client
// Read-only lookups of catalog records by id, used to decorate bookmarks for display.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::types::catalog::CatalogEntry;
use crate::types::errors::CatalogError;
use crate::types::settings::CatalogSettings;

/// A source of catalog records.
pub trait CatalogSource {
    /// Records whose id is in `ids`. Unknown ids are simply absent from the result.
    fn fetch_by_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<CatalogEntry>, CatalogError>> + Send;
}

/// PostgREST-style HTTP client for the hosted catalog table.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    table: String,
}

impl HttpCatalogClient {
    /// Builds a client from settings. A missing or blank `base_url` is
    /// [`CatalogError::NotConfigured`].
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let base_url = settings
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(CatalogError::NotConfigured)?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            table: settings.table.clone(),
        })
    }

    /// `{base}/rest/v1/{table}?select=*&id=in.(1,2,3)`, ids sorted and deduplicated.
    pub fn request_url(&self, ids: &[i64]) -> String {
        let ids: BTreeSet<i64> = ids.iter().copied().collect();
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/rest/v1/{}?select=*&id=in.({})",
            self.base_url, self.table, list
        )
    }
}

impl CatalogSource for HttpCatalogClient {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<CatalogEntry>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.request_url(ids);
        debug!("Querying catalog: {url}");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let body = request
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| CatalogError::Network(e.to_string()))?
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Fixed in-memory records.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

impl CatalogSource for StaticCatalog {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| ids.contains(&entry.id))
            .cloned()
            .collect())
    }
}

/// The catalog an application instance was configured with.
#[derive(Debug, Clone)]
pub enum Catalog {
    Remote(HttpCatalogClient),
    Fixed(StaticCatalog),
    Disabled,
}

impl Catalog {
    /// Remote when `base_url` is set, otherwise disabled.
    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        match HttpCatalogClient::new(settings) {
            Ok(client) => Ok(Catalog::Remote(client)),
            Err(CatalogError::NotConfigured) => Ok(Catalog::Disabled),
            Err(e) => Err(e),
        }
    }
}

impl CatalogSource for Catalog {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<CatalogEntry>, CatalogError> {
        match self {
            Catalog::Remote(client) => client.fetch_by_ids(ids).await,
            Catalog::Fixed(fixed) => fixed.fetch_by_ids(ids).await,
            Catalog::Disabled => Err(CatalogError::NotConfigured),
        }
    }
}
