//! Internal role code → public path name
//!
//! The remote catalog uses the game's internal class codes ("Warrior",
//! "Rogue", ...). The site shows the in-game path names. Unknown codes pass
//! through unchanged so a new role never blocks ingestion; fixing the display
//! name is then a table change.

use std::collections::BTreeMap;

/// Built-in mapping for the current game taxonomy
pub const DEFAULT_PATH_MAPPING: [(&str, &str); 8] = [
    ("Warrior", "Destruction"),
    ("Rogue", "The Hunt"),
    ("Mage", "Erudition"),
    ("Shaman", "Harmony"),
    ("Warlock", "Nihility"),
    ("Knight", "Preservation"),
    ("Priest", "Abundance"),
    ("Memory", "Remembrance"),
];

/// Immutable role-code lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    table: BTreeMap<String, String>,
}

impl PathMapper {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    /// Display name for `code`, or `code` itself when unmapped
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.table.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn is_mapped(&self, code: &str) -> bool {
        self.table.contains_key(code)
    }
}

impl Default for PathMapper {
    fn default() -> Self {
        Self::new(
            DEFAULT_PATH_MAPPING
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let mapper = PathMapper::default();
        assert_eq!(mapper.display_name("Warrior"), "Destruction");
        assert_eq!(mapper.display_name("Rogue"), "The Hunt");
        assert_eq!(mapper.display_name("Memory"), "Remembrance");
    }

    #[test]
    fn test_unmapped_code_passes_through() {
        let mapper = PathMapper::default();
        assert_eq!(mapper.display_name("Elation"), "Elation");
        assert!(!mapper.is_mapped("Elation"));
    }

    #[test]
    fn test_alternate_taxonomy() {
        let mapper = PathMapper::new(BTreeMap::from([(
            "Warrior".to_string(),
            "Fighter".to_string(),
        )]));
        assert_eq!(mapper.display_name("Warrior"), "Fighter");
        assert_eq!(mapper.display_name("Mage"), "Mage");
    }
}
