//! Curated content seeding
//!
//! A seed file is a JSON object keyed by slug. Each value carries any subset
//! of the curated fields (`tiers`, `oneLiner`, `why`, `bestTeams`,
//! `alternatives`). Fields present in the seed replace the stored value
//! wholesale; absent fields are left alone. Identity fields are never
//! touched, and slugs with no stored record are reported back.

use crate::error::{IngestError, IngestResult};
use crate::store::CatalogStore;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tierdex_common::model::{BestTeam, CharacterRecord, CuratedContent};
use tracing::{info, warn};

/// Partial curated content for one character
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedPatch {
    pub tiers: Option<BTreeMap<String, String>>,
    pub one_liner: Option<String>,
    pub why: Option<BTreeMap<String, String>>,
    pub best_teams: Option<Vec<BestTeam>>,
    pub alternatives: Option<Vec<String>>,
}

impl CuratedPatch {
    /// Overwrite the fields this patch carries, then restore mirrored keys
    pub fn apply_to(self, curated: &mut CuratedContent) {
        if let Some(tiers) = self.tiers {
            curated.tiers = tiers;
        }
        if let Some(one_liner) = self.one_liner {
            curated.one_liner = one_liner;
        }
        if let Some(why) = self.why {
            curated.why = why;
        }
        if let Some(best_teams) = self.best_teams {
            curated.best_teams = best_teams;
        }
        if let Some(alternatives) = self.alternatives {
            curated.alternatives = alternatives;
        }
        curated.normalize();
    }
}

/// Outcome of applying a seed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Slugs whose curated content actually changed
    pub applied: Vec<String>,
    /// Slugs present in the seed and the catalog, but already up to date
    pub unchanged: Vec<String>,
    /// Slugs in the seed with no stored record
    pub unknown: Vec<String>,
}

/// Parse a seed document
pub fn parse_seed(body: &str) -> Result<BTreeMap<String, CuratedPatch>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Apply `patches` to matching records in place
pub fn apply_seed(
    records: &mut [CharacterRecord],
    mut patches: BTreeMap<String, CuratedPatch>,
) -> SeedReport {
    let mut report = SeedReport::default();

    for record in records.iter_mut() {
        let Some(patch) = patches.remove(&record.slug) else {
            continue;
        };

        let before = record.curated.clone();
        patch.apply_to(&mut record.curated);

        if record.curated == before {
            report.unchanged.push(record.slug.clone());
        } else {
            info!(slug = %record.slug, name = %record.name, "Seeded curated content");
            report.applied.push(record.slug.clone());
        }
    }

    for slug in patches.into_keys() {
        warn!(slug = %slug, "Seed entry has no matching character");
        report.unknown.push(slug);
    }

    report
}

/// Read `seed_path`, apply it to the catalog in `store`, and persist.
///
/// The store is only rewritten when some record changed.
pub fn seed_catalog(store: &CatalogStore, seed_path: &Path) -> IngestResult<SeedReport> {
    let seed_err = |message: String| IngestError::Seed {
        path: seed_path.to_path_buf(),
        message,
    };

    let body = std::fs::read_to_string(seed_path).map_err(|e| seed_err(e.to_string()))?;
    let patches = parse_seed(&body).map_err(|e| seed_err(e.to_string()))?;

    let mut records = store.load()?;
    let report = apply_seed(&mut records, patches);

    if !report.applied.is_empty() {
        store.write(&records)?;
    }

    info!(
        applied = report.applied.len(),
        unchanged = report.unchanged.len(),
        unknown = report.unknown.len(),
        "Seed complete"
    );
    Ok(report)
}
