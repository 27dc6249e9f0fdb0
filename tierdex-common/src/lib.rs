//! # tierdex common library
//!
//! Shared code for the tierdex tools and for anything that reads the catalog:
//! - Character record model and curated-field defaults
//! - Read contract over the persisted catalog
//! - Tier projections (grouping and ranked views)
//! - Configuration loading and root folder resolution
//! - Time helpers

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod projection;
pub mod time;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use model::{BestTeam, CharacterRecord};
pub use projection::Tier;
