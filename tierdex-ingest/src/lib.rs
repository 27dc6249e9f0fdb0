//! tierdex-ingest library
//!
//! Batch job that refreshes the character catalog from the remote source:
//! - [`remote_client`]: remote catalog fetch
//! - [`slug`] and [`path_map`]: derived identity fields
//! - [`asset_cache`]: idempotent icon / portrait cache
//! - [`reconcile`]: merge of remote identity with stored curated content
//! - [`store`]: atomic catalog persistence
//! - [`seed`]: bulk curated-content import
//! - [`pipeline`]: one sync run end to end

pub mod asset_cache;
pub mod config;
pub mod error;
pub mod path_map;
pub mod pipeline;
pub mod reconcile;
pub mod remote_client;
pub mod retry;
pub mod seed;
pub mod slug;
pub mod store;

pub use asset_cache::{AssetCache, AssetFetcher, AssetKind, AssetLayout, CacheOutcome};
pub use config::IngestSettings;
pub use error::{IngestError, IngestResult};
pub use path_map::PathMapper;
pub use pipeline::{PipelineConfig, SyncPipeline, SyncReport};
pub use reconcile::{reconcile, ReconcileOptions, Reconciliation};
pub use remote_client::{CatalogSource, ExternalCatalogEntry, RemoteClient};
pub use retry::RetryPolicy;
pub use slug::slugify;
pub use store::CatalogStore;
