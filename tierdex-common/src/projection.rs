//! Tier projections over the catalog
//!
//! Two independent read-only views used by the presentation layer:
//! - [`group_by_tier`]: one bucket per tier, canonical order, empty tiers omitted
//! - [`rank_by_tier`]: a flat list ordered by tier weight, for top-N exports
//!
//! Both compute the tier of a record the same way ([`tier_of`]), so they
//! always agree on relative tier order.

use crate::model::{mode_key, CharacterRecord};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of entries the site's ranked export shows
pub const DEFAULT_TOP_N: usize = 20;

/// Weight given to tier values outside S..D (e.g. "N/A", "S+")
pub const UNKNOWN_TIER_WEIGHT: u8 = 5;

/// Letter grade for a mode, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// Canonical display order
    pub const ALL: [Tier; 5] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    /// Sort weight: S=0 .. D=4
    pub fn weight(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Tier::S),
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            "D" => Ok(Tier::D),
            _ => Err(()),
        }
    }
}

/// Raw tier value for a mode; a missing key or an empty value counts as the
/// lowest tier
pub fn tier_value<'a>(record: &'a CharacterRecord, mode: &str) -> &'a str {
    record
        .curated
        .tiers
        .get(mode_key(mode))
        .map(String::as_str)
        .filter(|tier| !tier.is_empty())
        .unwrap_or("D")
}

/// Parsed tier for a mode, `None` when the value is not one of S..D
pub fn tier_of(record: &CharacterRecord, mode: &str) -> Option<Tier> {
    tier_value(record, mode).parse().ok()
}

/// Sort weight for a mode, unknown values sort after D
pub fn tier_weight(record: &CharacterRecord, mode: &str) -> u8 {
    tier_of(record, mode).map_or(UNKNOWN_TIER_WEIGHT, Tier::weight)
}

/// Records sharing one tier, in catalog order
#[derive(Debug, Serialize)]
pub struct TierGroup<'a> {
    pub tier: Tier,
    pub members: Vec<&'a CharacterRecord>,
}

/// Result of [`group_by_tier`]
#[derive(Debug, Serialize)]
pub struct TierGroups<'a> {
    /// Non-empty tiers in S, A, B, C, D order
    pub groups: Vec<TierGroup<'a>>,
    /// Records whose tier value is not a letter grade (e.g. "N/A")
    pub unranked: Vec<&'a CharacterRecord>,
}

impl<'a> TierGroups<'a> {
    pub fn get(&self, tier: Tier) -> Option<&TierGroup<'a>> {
        self.groups.iter().find(|g| g.tier == tier)
    }

    /// Ranked members in display order (groups flattened)
    pub fn flatten(&self) -> impl Iterator<Item = &'a CharacterRecord> + '_ {
        self.groups.iter().flat_map(|g| g.members.iter().copied())
    }
}

/// Group records by their tier for `mode`
pub fn group_by_tier<'a>(records: &'a [CharacterRecord], mode: &str) -> TierGroups<'a> {
    let mut buckets: [Vec<&CharacterRecord>; 5] = Default::default();
    let mut unranked = Vec::new();

    for record in records {
        match tier_of(record, mode) {
            Some(tier) => buckets[tier.weight() as usize].push(record),
            None => unranked.push(record),
        }
    }

    let groups = Tier::ALL
        .iter()
        .zip(buckets)
        .filter(|(_, members)| !members.is_empty())
        .map(|(tier, members)| TierGroup {
            tier: *tier,
            members,
        })
        .collect();

    TierGroups { groups, unranked }
}

/// All records sorted by tier weight for `mode`; ties keep catalog order
pub fn rank_by_tier<'a>(records: &'a [CharacterRecord], mode: &str) -> Vec<&'a CharacterRecord> {
    let mut ranked: Vec<&CharacterRecord> = records.iter().collect();
    ranked.sort_by_key(|r| tier_weight(r, mode));
    ranked
}

/// First `n` entries of [`rank_by_tier`]
pub fn top_n<'a>(records: &'a [CharacterRecord], mode: &str, n: usize) -> Vec<&'a CharacterRecord> {
    let mut ranked = rank_by_tier(records, mode);
    ranked.truncate(n);
    ranked
}
