//! Runtime settings for the ingest binary
//!
//! Combines CLI arguments, environment and the TOML file into one resolved
//! value, then builds the pipeline pieces from it.

use crate::asset_cache::{AssetCache, AssetLayout};
use crate::error::IngestResult;
use crate::path_map::PathMapper;
use crate::pipeline::{PipelineConfig, SyncPipeline};
use crate::remote_client::{build_http_client, RemoteClient};
use crate::retry::RetryPolicy;
use crate::store::CatalogStore;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tierdex_common::config::{resolve_config_path, resolve_root_folder, StoragePaths, TomlConfig};
use tracing::info;

/// Fully resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub root_folder: PathBuf,
    /// File the TOML values came from, if any
    pub config_path: Option<PathBuf>,
    pub toml: TomlConfig,
    pub paths: StoragePaths,
}

impl IngestSettings {
    /// Resolve settings from optional CLI overrides.
    ///
    /// The config file is located relative to the CLI/env root first, so a
    /// `root_folder` inside the file can still move the root afterwards.
    pub fn resolve(cli_root: Option<&Path>, cli_config: Option<&Path>) -> tierdex_common::Result<Self> {
        let root_hint = resolve_root_folder(cli_root, None);
        let config_path = resolve_config_path(cli_config, &root_hint);
        let toml = TomlConfig::load_or_default(config_path.as_deref())?;

        let root_folder = resolve_root_folder(cli_root, Some(&toml));
        let paths = toml.storage.resolve(&root_folder);

        Ok(Self {
            root_folder,
            config_path,
            toml,
            paths,
        })
    }

    /// Where the TOML values came from, for the startup log
    pub fn config_source(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "compiled defaults".to_string(),
        }
    }

    pub fn catalog_store(&self) -> CatalogStore {
        CatalogStore::new(&self.paths.catalog)
    }

    pub fn archive_store(&self) -> CatalogStore {
        CatalogStore::new(&self.paths.archive)
    }

    pub fn path_mapper(&self) -> PathMapper {
        match &self.toml.path_mapping {
            Some(table) => PathMapper::new(table.clone()),
            None => PathMapper::default(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.toml.retry.clone().into()
    }

    /// CLI flags layered over the `[sync]` table
    pub fn pipeline_config(&self, dry_run: bool, skip_assets: bool) -> PipelineConfig {
        PipelineConfig {
            dry_run,
            skip_assets,
            vanished: self.toml.sync.vanished,
            stamp_unchanged: self.toml.sync.stamp_unchanged,
            allow_empty: false,
        }
    }

    /// HTTP-backed pipeline over the configured remote and stores
    pub fn build_pipeline(&self, config: PipelineConfig) -> IngestResult<SyncPipeline> {
        let remote = &self.toml.remote;
        let http_client = build_http_client(Duration::from_secs(remote.timeout_secs))?;
        let retry = self.retry_policy();

        info!(
            catalog_url = %remote.catalog_url,
            asset_base_url = %remote.asset_base_url,
            root = %self.root_folder.display(),
            "Building sync pipeline"
        );

        Ok(SyncPipeline::new(
            Box::new(RemoteClient::new(http_client.clone(), remote.catalog_url.clone(), retry)),
            Box::new(AssetCache::new(http_client, retry)),
            AssetLayout::new(remote.asset_base_url.clone(), self.paths.assets_dir.clone()),
            self.catalog_store(),
            self.archive_store(),
            self.path_mapper(),
            config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tierdex_common::config::VanishedPolicy;

    #[test]
    fn test_explicit_config_file_drives_paths() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(
            &config_path,
            r#"
[storage]
catalog_path = "out/chars.json"

[sync]
vanished = "prune"

[path_mapping]
Warrior = "Destruction"
"#,
        )
        .unwrap();

        let settings = IngestSettings::resolve(Some(dir.path()), Some(&config_path)).unwrap();
        assert_eq!(settings.config_source(), config_path.display().to_string());
        assert_eq!(settings.paths.catalog, dir.path().join("out/chars.json"));
        assert_eq!(settings.pipeline_config(false, false).vanished, VanishedPolicy::Prune);

        let mapper = settings.path_mapper();
        assert!(mapper.is_mapped("Warrior"));
        assert!(!mapper.is_mapped("Knight"));
    }

    #[test]
    fn test_config_source_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = IngestSettings {
            root_folder: dir.path().to_path_buf(),
            config_path: None,
            toml: TomlConfig::default(),
            paths: TomlConfig::default().storage.resolve(dir.path()),
        };
        assert_eq!(settings.config_source(), "compiled defaults");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = IngestSettings::resolve(Some(dir.path()), Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }
}
