//! Merge of the remote catalog into the stored catalog
//!
//! Pure function, no I/O. Identity fields always come from the incoming
//! entry; curated fields always come from the matching stored record, or
//! from defaults when there is none. Matching is by remote id first, then
//! by slug for stored records that never had a remote id.
//!
//! The output holds exactly one record per incoming entry, sorted by rarity
//! (highest first, stable). Stored records nobody matched come back in
//! [`Reconciliation::vanished`] so the caller can apply its retention policy.

use crate::error::ReconcileError;
use crate::path_map::PathMapper;
use crate::remote_client::ExternalCatalogEntry;
use crate::slug::slugify;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tierdex_common::model::{CharacterRecord, CuratedContent};

/// Knobs for one reconciliation
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Date stamped on created and changed records
    pub today: NaiveDate,
    /// Stamp `today` on unchanged records too
    pub stamp_unchanged: bool,
}

impl ReconcileOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            stamp_unchanged: false,
        }
    }
}

/// How one incoming entry relates to the stored catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    /// No stored record matched; curated defaults applied
    Created,
    /// Matched and some identity field (or a normalized curated key) changed
    Updated,
    /// Matched and nothing changed
    Unchanged,
}

/// Counts per [`RecordChange`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileStats {
    fn record(&mut self, change: RecordChange) {
        match change {
            RecordChange::Created => self.created += 1,
            RecordChange::Updated => self.updated += 1,
            RecordChange::Unchanged => self.unchanged += 1,
        }
    }
}

/// Result of [`reconcile`]
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// New catalog: one record per incoming entry, rarity descending
    pub records: Vec<CharacterRecord>,
    /// Stored records with no incoming counterpart, in stored order
    pub vanished: Vec<CharacterRecord>,
    pub stats: ReconcileStats,
}

/// Merge `incoming` identity data with curated data from `existing`
pub fn reconcile(
    existing: Vec<CharacterRecord>,
    incoming: &[ExternalCatalogEntry],
    mapper: &PathMapper,
    options: &ReconcileOptions,
) -> Result<Reconciliation, ReconcileError> {
    let slugs = derive_slugs(incoming)?;

    // Index stored records; a taken slot cannot be matched twice
    let mut pool: Vec<Option<CharacterRecord>> = existing.into_iter().map(Some).collect();
    let mut by_game_id: HashMap<String, usize> = HashMap::new();
    let mut by_slug: HashMap<String, usize> = HashMap::new();
    for (idx, record) in pool.iter().enumerate() {
        let Some(record) = record else { continue };
        match &record.game_id {
            Some(game_id) => {
                by_game_id.entry(game_id.clone()).or_insert(idx);
            }
            None => {
                by_slug.entry(record.slug.clone()).or_insert(idx);
            }
        }
    }

    let mut records = Vec::with_capacity(incoming.len());
    let mut stats = ReconcileStats::default();

    for (entry, slug) in incoming.iter().zip(slugs) {
        let previous = by_game_id
            .get(&entry.id)
            .or_else(|| by_slug.get(&slug))
            .and_then(|&idx| pool[idx].take());

        let (record, change) = merge_entry(entry, slug, previous, mapper, options);
        stats.record(change);
        records.push(record);
    }

    // Stable: equal rarity keeps incoming order
    records.sort_by(|a, b| b.rarity.cmp(&a.rarity));

    Ok(Reconciliation {
        records,
        vanished: pool.into_iter().flatten().collect(),
        stats,
    })
}

/// Build the merged record for one entry
fn merge_entry(
    entry: &ExternalCatalogEntry,
    slug: String,
    previous: Option<CharacterRecord>,
    mapper: &PathMapper,
    options: &ReconcileOptions,
) -> (CharacterRecord, RecordChange) {
    let curated = previous
        .as_ref()
        .map(|p| p.curated.clone())
        .unwrap_or_else(CuratedContent::pending);

    let mut record = CharacterRecord {
        id: slug.clone(),
        game_id: Some(entry.id.clone()),
        name: entry.name.clone(),
        slug,
        rarity: entry.rarity,
        path: mapper.display_name(&entry.path).to_string(),
        internal_path_id: Some(entry.path.clone()),
        element: entry.element.clone(),
        curated,
        last_updated: None,
    };
    record.curated.normalize();

    // A record that was never stamped gains a date, which is a change
    let change = match &previous {
        None => RecordChange::Created,
        Some(prev) if prev.same_content(&record) && prev.last_updated.is_some() => {
            RecordChange::Unchanged
        }
        Some(_) => RecordChange::Updated,
    };

    record.last_updated = match (&previous, change) {
        (Some(prev), RecordChange::Unchanged) if !options.stamp_unchanged => prev.last_updated,
        _ => Some(options.today),
    };

    (record, change)
}

/// Slug per incoming entry; rejects duplicate ids, empty slugs and collisions
fn derive_slugs(incoming: &[ExternalCatalogEntry]) -> Result<Vec<String>, ReconcileError> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_slugs: HashMap<String, &ExternalCatalogEntry> = HashMap::new();
    let mut slugs = Vec::with_capacity(incoming.len());

    for entry in incoming {
        if !seen_ids.insert(entry.id.as_str()) {
            return Err(ReconcileError::DuplicateExternalId(entry.id.clone()));
        }

        let slug = slugify(&entry.name);
        if slug.is_empty() {
            return Err(ReconcileError::EmptySlug {
                id: entry.id.clone(),
                name: entry.name.clone(),
            });
        }

        if let Some(first) = seen_slugs.get(&slug) {
            return Err(ReconcileError::SlugCollision {
                slug,
                first_id: first.id.clone(),
                first_name: first.name.clone(),
                second_id: entry.id.clone(),
                second_name: entry.name.clone(),
            });
        }

        seen_slugs.insert(slug.clone(), entry);
        slugs.push(slug);
    }

    Ok(slugs)
}
