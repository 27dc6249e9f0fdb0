//! Read contract over the persisted catalog
//!
//! This is everything a consumer (page renderer, sitemap, exporter) needs:
//! full listing, lookup by slug, and the tier projections.

use crate::error::{Error, Result};
use crate::model::CharacterRecord;
use crate::projection::{self, TierGroups};
use std::path::Path;

/// The persisted character catalog, in stored order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CharacterRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CharacterRecord>) -> Self {
        Self { records }
    }

    /// Load the catalog file; a missing file is an empty catalog
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Catalog file not found, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let records = serde_json::from_str(&content).map_err(|source| Error::MalformedCatalog {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&CharacterRecord> {
        self.records.iter().find(|r| r.slug == slug)
    }

    /// Like [`Catalog::by_slug`], but a missing slug is an error
    pub fn require(&self, slug: &str) -> Result<&CharacterRecord> {
        self.by_slug(slug)
            .ok_or_else(|| Error::NotFound(format!("character '{}'", slug)))
    }

    pub fn by_game_id(&self, game_id: &str) -> Option<&CharacterRecord> {
        self.records
            .iter()
            .find(|r| r.game_id.as_deref() == Some(game_id))
    }

    pub fn group_by_tier(&self, mode: &str) -> TierGroups<'_> {
        projection::group_by_tier(&self.records, mode)
    }

    pub fn rank_by_tier(&self, mode: &str) -> Vec<&CharacterRecord> {
        projection::rank_by_tier(&self.records, mode)
    }

    pub fn into_records(self) -> Vec<CharacterRecord> {
        self.records
    }
}
