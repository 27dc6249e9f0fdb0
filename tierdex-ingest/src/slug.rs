//! Display name → URL-safe identifier
//!
//! The slug is both the storage key and the public URL segment, so it must
//! be a pure function of the name. Uniqueness is not guaranteed here; the
//! reconciler checks for collisions.

/// Lowercase, keep `[a-z0-9]`, collapse every other run into one `-`, trim `-`.
///
/// Lowercasing is ASCII-only, so accented or non-Latin letters count as
/// separators.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(slug: &str) {
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-'), "{} starts with -", slug);
        assert!(!slug.ends_with('-'), "{} ends with -", slug);
        assert!(!slug.contains("--"), "{} contains --", slug);
    }

    #[test]
    fn test_known_names() {
        assert_eq!(slugify("Dan Heng • Imbibitor Lunae"), "dan-heng-imbibitor-lunae");
        assert_eq!(slugify("March 7th"), "march-7th");
        assert_eq!(slugify("Acheron"), "acheron");
        assert_eq!(slugify("Dr. Ratio"), "dr-ratio");
        assert_eq!(slugify("Topaz & Numby"), "topaz-numby");
    }

    #[test]
    fn test_edges_are_trimmed() {
        assert_eq!(slugify("  --Kafka!!  "), "kafka");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        assert_eq!(slugify("Trailblazer (Ünity)"), "trailblazer-nity");
        assert_eq!(slugify("Fu Xuán"), "fu-xu-n");
    }

    #[test]
    fn test_output_is_well_formed() {
        let names = [
            "Dan Heng • Imbibitor Lunae",
            "  Ruan  Mei ",
            "Trailblazer -- Harmony",
            "1000 Cuts",
            "Silver Wolf.",
            "-•-",
            "Topaz & Numby",
        ];
        for name in names {
            assert_well_formed(&slugify(name));
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(slugify("Black Swan"), slugify("Black Swan"));
    }
}
