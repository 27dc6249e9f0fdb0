//! Remote character catalog client
//!
//! Fetches the third-party character database and parses it into
//! [`ExternalCatalogEntry`] values.
//!
//! # API Reference
//! - Endpoint: `<catalog_url>` (default: StarRailStaticAPI `db/en/characters.json`)
//! - Response: JSON object keyed by character id, values are entries
//! - Asset paths in entries are relative to the asset base URL
//!
//! Any failure here is fatal for the run. A partial catalog must never reach
//! reconciliation, since the merge cannot tell a removed character from one
//! lost in transport.

use crate::error::{FetchError, IngestError};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// User-Agent header sent with every request
pub const USER_AGENT: &str = concat!("tierdex-ingest/", env!("CARGO_PKG_VERSION"));

/// One character as listed by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalCatalogEntry {
    /// Remote character id (numeric ids are accepted and kept as text)
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub rarity: u8,
    /// Internal role code, e.g. "Warrior"
    pub path: String,
    pub element: String,
    /// Icon path relative to the asset base URL
    #[serde(default)]
    pub icon: String,
    /// Portrait path relative to the asset base URL
    #[serde(default)]
    pub portrait: String,
}

/// Anything that can produce the full remote catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<ExternalCatalogEntry>, FetchError>;
}

/// Build the shared HTTP client (timeout + User-Agent)
pub fn build_http_client(timeout: Duration) -> Result<Client, IngestError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| IngestError::Client(e.to_string()))
}

/// HTTP client for the remote catalog endpoint
pub struct RemoteClient {
    http_client: Client,
    catalog_url: String,
    retry: RetryPolicy,
}

impl RemoteClient {
    pub fn new(http_client: Client, catalog_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http_client,
            catalog_url: catalog_url.into(),
            retry,
        }
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    /// Single GET of the catalog, no retry
    async fn fetch_once(&self) -> Result<Vec<ExternalCatalogEntry>, FetchError> {
        debug!(url = %self.catalog_url, "Requesting remote catalog");

        let response = self
            .http_client
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: self.catalog_url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.catalog_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            url: self.catalog_url.clone(),
            message: e.to_string(),
        })?;

        parse_catalog(&body)
    }
}

#[async_trait]
impl CatalogSource for RemoteClient {
    async fn fetch_catalog(&self) -> Result<Vec<ExternalCatalogEntry>, FetchError> {
        let entries = self
            .retry
            .run_when("fetch_catalog", is_transient, || self.fetch_once())
            .await?;

        info!(count = entries.len(), url = %self.catalog_url, "Fetched remote catalog");
        Ok(entries)
    }
}

/// Network errors and 5xx / 429 responses are worth another attempt
fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Network { .. } => true,
        FetchError::Status { status, .. } => *status >= 500 || *status == 429,
        FetchError::Parse(_) => false,
    }
}

/// Parse a catalog body: a JSON object whose values are entries, kept in
/// document order.
pub fn parse_catalog(body: &str) -> Result<Vec<ExternalCatalogEntry>, FetchError> {
    serde_json::from_str::<CatalogDocument>(body)
        .map(|doc| doc.0)
        .map_err(|e| FetchError::Parse(e.to_string()))
}

/// Values of the top-level object in the order they appear
struct CatalogDocument(Vec<ExternalCatalogEntry>);

impl<'de> Deserialize<'de> for CatalogDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = CatalogDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping keys to character entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_key, entry)) = map.next_entry::<de::IgnoredAny, ExternalCatalogEntry>()? {
                    entries.push(entry);
                }
                Ok(CatalogDocument(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "1308": {"id": "1308", "name": "Acheron", "tag": "acheron", "rarity": 5,
                 "path": "Warlock", "element": "Thunder",
                 "icon": "icon/character/1308.png", "portrait": "image/character_portrait/1308.png"},
        "1001": {"id": "1001", "name": "March 7th", "rarity": 4, "path": "Knight",
                 "element": "Ice", "icon": "icon/character/1001.png",
                 "portrait": "image/character_portrait/1001.png"},
        "1213": {"id": 1213, "name": "Dan Heng • Imbibitor Lunae", "rarity": 5,
                 "path": "Warrior", "element": "Imaginary"}
    }"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let entries = parse_catalog(SAMPLE).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1308", "1001", "1213"]);
    }

    #[test]
    fn test_parse_fields_and_numeric_id() {
        let entries = parse_catalog(SAMPLE).unwrap();
        assert_eq!(entries[0].name, "Acheron");
        assert_eq!(entries[0].path, "Warlock");
        assert_eq!(entries[0].icon, "icon/character/1308.png");
        assert_eq!(entries[2].id, "1213");
        assert!(entries[2].portrait.is_empty());
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse_catalog("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(matches!(parse_catalog("[]"), Err(FetchError::Parse(_))));
        assert!(matches!(parse_catalog("not json"), Err(FetchError::Parse(_))));
        assert!(matches!(
            parse_catalog(r#"{"1": {"id": "1", "name": "NoRarity"}}"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_transient_classification() {
        let url = "http://x".to_string();
        assert!(is_transient(&FetchError::Status { url: url.clone(), status: 503 }));
        assert!(is_transient(&FetchError::Status { url: url.clone(), status: 429 }));
        assert!(!is_transient(&FetchError::Status { url, status: 404 }));
        assert!(!is_transient(&FetchError::Parse("bad".to_string())));
    }

    #[test]
    fn test_client_builds() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
