//! Character record model
//!
//! A [`CharacterRecord`] splits into two halves with opposite ownership:
//! - identity fields (name, rarity, path, element) belong to the remote catalog
//!   and are overwritten on every sync
//! - [`CuratedContent`] (tiers, rationale, teams, alternatives) is written by
//!   humans and is never replaced by a sync
//!
//! The JSON layout uses camelCase keys and flattens the curated half into the
//! record, so the stored file reads as one flat object per character.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mode key every record carries in both `tiers` and `why`
pub const OVERALL: &str = "overall";

/// Slug of the site's main tier list page, which reads the `overall` key
pub const MAIN_MODE_SLUG: &str = "tier-list";

/// Tier value of a character nobody has rated yet
pub const UNRATED_TIER: &str = "N/A";

/// One-liner of a character nobody has analyzed yet
pub const PENDING_ONE_LINER: &str = "Pending analysis.";

/// Rationale text of a character nobody has analyzed yet
pub const PENDING_RATIONALE: &str = "No analysis available yet.";

/// Resolve a mode slug to the key used inside `tiers` / `why`
pub fn mode_key(mode: &str) -> &str {
    if mode == MAIN_MODE_SLUG {
        OVERALL
    } else {
        mode
    }
}

/// Recommended team built around a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestTeam {
    pub name: String,
    /// Member display names, in slot order
    #[serde(default)]
    pub core: Vec<String>,
    #[serde(default)]
    pub note: String,
}

/// Human-authored analysis of a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedContent {
    /// Mode key → tier letter
    #[serde(default = "pending_tiers")]
    pub tiers: BTreeMap<String, String>,
    #[serde(default = "pending_one_liner")]
    pub one_liner: String,
    /// Mode key → rationale text, same key set as `tiers`
    #[serde(default = "pending_why")]
    pub why: BTreeMap<String, String>,
    #[serde(default)]
    pub best_teams: Vec<BestTeam>,
    /// Slugs of characters that fill a similar role
    #[serde(default)]
    pub alternatives: Vec<String>,
}

fn pending_tiers() -> BTreeMap<String, String> {
    BTreeMap::from([(OVERALL.to_string(), UNRATED_TIER.to_string())])
}

fn pending_one_liner() -> String {
    PENDING_ONE_LINER.to_string()
}

fn pending_why() -> BTreeMap<String, String> {
    BTreeMap::from([(OVERALL.to_string(), PENDING_RATIONALE.to_string())])
}

impl CuratedContent {
    /// Defaults applied to a character seen for the first time
    pub fn pending() -> Self {
        Self {
            tiers: pending_tiers(),
            one_liner: pending_one_liner(),
            why: pending_why(),
            best_teams: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Make `tiers` and `why` share one key set that includes `overall`.
    ///
    /// Only fills gaps: a tier without rationale gets the pending rationale,
    /// a rationale without tier gets the unrated tier. Existing values are
    /// never touched. Returns true if anything was added.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if !self.tiers.contains_key(OVERALL) {
            self.tiers.insert(OVERALL.to_string(), UNRATED_TIER.to_string());
            changed = true;
        }
        if !self.why.contains_key(OVERALL) {
            self.why.insert(OVERALL.to_string(), PENDING_RATIONALE.to_string());
            changed = true;
        }

        let tier_only: Vec<String> = self
            .tiers
            .keys()
            .filter(|k| !self.why.contains_key(*k))
            .cloned()
            .collect();
        for key in tier_only {
            self.why.insert(key, PENDING_RATIONALE.to_string());
            changed = true;
        }

        let why_only: Vec<String> = self
            .why
            .keys()
            .filter(|k| !self.tiers.contains_key(*k))
            .cloned()
            .collect();
        for key in why_only {
            self.tiers.insert(key, UNRATED_TIER.to_string());
            changed = true;
        }

        changed
    }

    /// True when `tiers` and `why` have identical key sets containing `overall`
    pub fn is_mirrored(&self) -> bool {
        self.tiers.contains_key(OVERALL) && self.tiers.keys().eq(self.why.keys())
    }
}

impl Default for CuratedContent {
    fn default() -> Self {
        Self::pending()
    }
}

/// One character in the persisted catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    /// Storage key, always equal to `slug`
    pub id: String,
    /// Identifier in the remote catalog, absent only before the first sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub rarity: u8,
    /// Public display path (e.g. "Destruction")
    pub path: String,
    /// Internal role code the display path was mapped from (e.g. "Warrior")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_path_id: Option<String>,
    pub element: String,
    #[serde(flatten)]
    pub curated: CuratedContent,
    /// Date of the last sync that changed this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

impl CharacterRecord {
    /// Tier letter for a mode slug (`tier-list` reads `overall`)
    pub fn tier_for(&self, mode: &str) -> Option<&str> {
        self.curated.tiers.get(mode_key(mode)).map(String::as_str)
    }

    /// Rationale text for a mode slug (`tier-list` reads `overall`)
    pub fn rationale_for(&self, mode: &str) -> Option<&str> {
        self.curated.why.get(mode_key(mode)).map(String::as_str)
    }

    /// Overall tier, falling back to the unrated marker
    pub fn overall_tier(&self) -> &str {
        self.tier_for(OVERALL).unwrap_or(UNRATED_TIER)
    }

    /// Compare everything except `last_updated`
    pub fn same_content(&self, other: &CharacterRecord) -> bool {
        self.id == other.id
            && self.game_id == other.game_id
            && self.name == other.name
            && self.slug == other.slug
            && self.rarity == other.rarity
            && self.path == other.path
            && self.internal_path_id == other.internal_path_id
            && self.element == other.element
            && self.curated == other.curated
    }
}
