use std::collections::HashSet;

use super::normalize::NormalizedName;

/// Insertion-ordered set of candidate slugs.
#[derive(Debug, Default)]
struct CandidateSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl CandidateSet {
    fn push(&mut self, slug: String) {
        if slug.is_empty() || self.seen.contains(&slug) {
            return;
        }
        self.seen.insert(slug.clone());
        self.ordered.push(slug);
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Expands a normalized name into candidate slugs, highest-confidence first:
///
/// 1. base (cleaned name, `.`/`-` kept)
/// 2. all tokens collapsed
/// 3. first token
/// 4. first two tokens collapsed
/// 5. all tokens hyphenated
/// 6. every slug above ending in `ai` (but not `.ai`) with that suffix dropped
///
/// Later rules never re-add a slug an earlier rule produced.
pub fn generate_variants(name: &NormalizedName) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }
    let tokens = &name.tokens;

    let mut set = CandidateSet::default();
    set.push(name.base.clone());
    set.push(tokens.concat());
    set.push(tokens[0].clone());

    if tokens.len() >= 2 {
        set.push(tokens[..2].concat());
        set.push(tokens.join("-"));
    }

    let generated = set.ordered.clone();
    for slug in &generated {
        if let Some(stripped) = strip_ai_suffix(slug) {
            set.push(stripped);
        }
    }

    set.into_vec()
}

fn strip_ai_suffix(slug: &str) -> Option<String> {
    if slug.len() <= 3 || !slug.ends_with("ai") || slug.ends_with(".ai") {
        return None;
    }
    let stripped = slug[..slug.len() - 2].trim_end_matches(['.', '-']);
    Some(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::{candidates_for, normalize};

    fn position(list: &[String], slug: &str) -> usize {
        list.iter()
            .position(|s| s == slug)
            .unwrap_or_else(|| panic!("{slug} missing from {list:?}"))
    }

    #[test]
    fn test_public_cloud_group_priority_order() {
        let variants = candidates_for("Public Cloud Group");
        assert_eq!(
            variants,
            vec!["publiccloudgroup", "public", "publiccloud", "public-cloud-group"]
        );
    }

    #[test]
    fn test_character_ai() {
        let variants = candidates_for("Character.AI");
        assert_eq!(variants[0], "character.ai");
        assert!(variants.contains(&"characterai".to_string()));
        assert!(variants.contains(&"character".to_string()));
        // base ends in ".ai" and is never stripped
        assert!(!variants.contains(&"character.".to_string()));
    }

    #[test]
    fn test_ai_suffix_stripped_from_collapsed_form() {
        let variants = candidates_for("Scale AI");
        assert_eq!(variants, vec!["scaleai", "scale", "scale-ai"]);

        let single = candidates_for("Hebbia.ai Labs");
        assert!(single.contains(&"hebbia".to_string()));
    }

    #[test]
    fn test_ai_strip_comes_after_structural_rules() {
        let variants = candidates_for("Openai");
        assert_eq!(variants, vec!["openai", "open"]);
    }

    #[test]
    fn test_short_ai_slugs_not_stripped() {
        assert_eq!(strip_ai_suffix("gai"), None);
        assert_eq!(strip_ai_suffix("ai"), None);
        assert_eq!(strip_ai_suffix("mosaic"), None);
        assert_eq!(strip_ai_suffix("acme-ai").as_deref(), Some("acme"));
    }

    #[test]
    fn test_single_token_name() {
        assert_eq!(candidates_for("Acme Inc"), vec!["acme"]);
    }

    #[test]
    fn test_empty_names_yield_no_candidates() {
        assert!(candidates_for("").is_empty());
        assert!(candidates_for("LLC").is_empty());
        assert!(generate_variants(&normalize("?!")).is_empty());
    }

    #[test]
    fn test_no_duplicates_and_valid_charset() {
        let names = [
            "Public Cloud Group",
            "Character.AI",
            "Scale AI",
            "Foo-Bar.ai",
            "A.I. Robotics Inc",
            "Mistral AI Ltd.",
            "X",
            "Two Sigma",
            "hello-world-ai",
            "ai ai ai",
        ];

        for name in names {
            let variants = candidates_for(name);
            let unique: HashSet<_> = variants.iter().collect();
            assert_eq!(unique.len(), variants.len(), "duplicates for {name}: {variants:?}");
            for slug in &variants {
                assert!(!slug.is_empty());
                assert!(
                    slug.chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'),
                    "bad slug {slug} for {name}"
                );
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(candidates_for("Two Sigma"), candidates_for("Two Sigma"));
        let variants = candidates_for("Two Sigma");
        assert!(position(&variants, "twosigma") < position(&variants, "two"));
        assert!(position(&variants, "two") < position(&variants, "two-sigma"));
    }
}
