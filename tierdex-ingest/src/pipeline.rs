//! Sync pipeline orchestrator
//!
//! One run is a short sequential batch:
//! 1. Fetch the remote catalog (fatal on failure)
//! 2. Cache icon and portrait per character, one character at a time, in
//!    catalog order (failures are logged and counted, never fatal)
//! 3. Reconcile the fetched entries against the stored catalog (fatal on
//!    collision)
//! 4. Archive vanished records (under the archive policy), then write the
//!    new catalog
//!
//! The store is only touched in step 4, after the whole incoming catalog has
//! been reconciled in memory. Vanished records reach the archive before the
//! live store drops them, so a failed archive write leaves the store as it
//! was. A dry run touches neither the stores nor the asset cache.

use crate::asset_cache::{AssetFetcher, AssetKind, AssetLayout, CacheOutcome};
use crate::error::{IngestError, IngestResult};
use crate::path_map::PathMapper;
use crate::reconcile::{reconcile, ReconcileOptions, ReconcileStats};
use crate::remote_client::{CatalogSource, ExternalCatalogEntry};
use crate::store::CatalogStore;
use chrono::NaiveDate;
use std::fmt;
use tierdex_common::config::VanishedPolicy;
use tracing::{debug, info, warn};

/// Pipeline behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Reconcile and report, but write nothing to the store
    pub dry_run: bool,
    /// Do not touch the asset cache
    pub skip_assets: bool,
    /// What happens to stored records the remote no longer lists
    pub vanished: VanishedPolicy,
    /// Stamp the run date on unchanged records too
    pub stamp_unchanged: bool,
    /// Accept an empty remote catalog even when the store holds records
    pub allow_empty: bool,
}

/// Asset cache counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetStats {
    pub downloaded: usize,
    pub cached: usize,
    pub failed: usize,
    /// Entries with no remote path for a kind
    pub skipped: usize,
}

/// Summary of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub records: ReconcileStats,
    /// Slugs of stored records the remote no longer lists
    pub vanished: Vec<String>,
    pub assets: AssetStats,
    /// False for dry runs
    pub written: bool,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fetched:    {}", self.fetched)?;
        writeln!(f, "created:    {}", self.records.created)?;
        writeln!(f, "updated:    {}", self.records.updated)?;
        writeln!(f, "unchanged:  {}", self.records.unchanged)?;
        writeln!(f, "vanished:   {}", self.vanished.len())?;
        writeln!(
            f,
            "assets:     {} downloaded, {} cached, {} failed, {} skipped",
            self.assets.downloaded, self.assets.cached, self.assets.failed, self.assets.skipped
        )?;
        write!(f, "written:    {}", if self.written { "yes" } else { "no (dry run)" })
    }
}

/// Wires a catalog source, an asset fetcher and the stores together
pub struct SyncPipeline {
    source: Box<dyn CatalogSource>,
    fetcher: Box<dyn AssetFetcher>,
    layout: AssetLayout,
    store: CatalogStore,
    archive: CatalogStore,
    mapper: PathMapper,
    config: PipelineConfig,
}

impl SyncPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn CatalogSource>,
        fetcher: Box<dyn AssetFetcher>,
        layout: AssetLayout,
        store: CatalogStore,
        archive: CatalogStore,
        mapper: PathMapper,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            fetcher,
            layout,
            store,
            archive,
            mapper,
            config,
        }
    }

    /// Execute one full run, stamping `today` on changed records
    pub async fn run(&self, today: NaiveDate) -> IngestResult<SyncReport> {
        info!(
            dry_run = self.config.dry_run,
            skip_assets = self.config.skip_assets,
            store = %self.store.path().display(),
            "Starting sync"
        );

        // Step 1: fetch
        let entries = self.source.fetch_catalog().await?;
        let existing = self.store.load()?;

        if entries.is_empty() && !existing.is_empty() {
            if !self.config.allow_empty {
                return Err(IngestError::EmptyCatalog {
                    stored: existing.len(),
                });
            }
            warn!(stored = existing.len(), "Remote catalog is empty, every stored record will vanish");
        }

        // Step 2: assets
        let assets = if self.config.skip_assets || self.config.dry_run {
            debug!(dry_run = self.config.dry_run, "Asset cache pass skipped");
            AssetStats::default()
        } else {
            self.cache_assets(&entries).await
        };

        // Step 3: reconcile
        let options = ReconcileOptions {
            today,
            stamp_unchanged: self.config.stamp_unchanged,
        };
        let merged = reconcile(existing, &entries, &self.mapper, &options)?;

        let mut report = SyncReport {
            fetched: entries.len(),
            records: merged.stats,
            vanished: merged.vanished.iter().map(|r| r.slug.clone()).collect(),
            assets,
            written: false,
        };

        if self.config.dry_run {
            info!(vanished = report.vanished.len(), "Dry run, store not written");
            return Ok(report);
        }

        // Step 4: persist, archive first
        if !merged.vanished.is_empty() && self.config.vanished == VanishedPolicy::Archive {
            let total = self.archive.merge_by_slug(merged.vanished)?;
            info!(
                archived = report.vanished.len(),
                total,
                archive = %self.archive.path().display(),
                "Archived vanished records"
            );
        }

        self.store.write(&merged.records)?;
        report.written = true;

        if self.config.vanished == VanishedPolicy::Prune {
            for slug in &report.vanished {
                warn!(slug = %slug, "Pruned record no longer in remote catalog");
            }
        }

        info!(
            fetched = report.fetched,
            created = report.records.created,
            updated = report.records.updated,
            unchanged = report.records.unchanged,
            vanished = report.vanished.len(),
            "Sync complete"
        );
        Ok(report)
    }

    /// Ensure both images for every entry, sequentially
    async fn cache_assets(&self, entries: &[ExternalCatalogEntry]) -> AssetStats {
        let mut stats = AssetStats::default();

        for entry in entries {
            for kind in AssetKind::ALL {
                let relative = match kind {
                    AssetKind::Icon => entry.icon.as_str(),
                    AssetKind::Portrait => entry.portrait.as_str(),
                };
                if relative.is_empty() {
                    debug!(id = %entry.id, kind = kind.as_str(), "No remote asset path");
                    stats.skipped += 1;
                    continue;
                }

                let url = self.layout.remote_url(relative);
                let local = self.layout.local_path(&entry.id, kind);

                match self.fetcher.ensure_cached(&url, &local).await {
                    Ok(CacheOutcome::AlreadyCached) => stats.cached += 1,
                    Ok(CacheOutcome::Downloaded { .. }) => stats.downloaded += 1,
                    Err(e) => {
                        warn!(
                            id = %entry.id,
                            name = %entry.name,
                            kind = kind.as_str(),
                            error = %e,
                            "Asset download failed, continuing"
                        );
                        stats.failed += 1;
                    }
                }
            }
        }

        info!(
            downloaded = stats.downloaded,
            cached = stats.cached,
            failed = stats.failed,
            "Asset cache pass complete"
        );
        stats
    }
}
