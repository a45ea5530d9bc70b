use std::sync::LazyLock;

use regex::Regex;

/// Legal-entity words, matched as whole words with an optional trailing period.
static LEGAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:inc|llc|ltd|corp|company|co)\b\.?").expect("legal suffix pattern is valid")
});

/// A cleaned company name.
///
/// `base` is the cleaned string with its `.`/`-` separators intact (whitespace
/// and other punctuation removed); `tokens` is the same text split on
/// separators and whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedName {
    pub base: String,
    pub tokens: Vec<String>,
}

impl NormalizedName {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'
}

fn is_separator(c: char) -> bool {
    c == '.' || c == '-' || c == ' '
}

/// Lowercases, drops legal suffixes and anything outside `[a-z0-9.-]`, and
/// splits what is left into tokens. Never fails: a name with nothing usable
/// comes back empty.
pub fn normalize(name: &str) -> NormalizedName {
    let lowered = name.trim().to_lowercase();
    let stripped = LEGAL_SUFFIX.replace_all(&lowered, "");

    let base: String = stripped.chars().filter(|c| is_slug_char(*c)).collect();
    let base = base.trim_matches(|c| c == '.' || c == '-').to_string();

    // Whitespace separates words just like `.` and `-`, it just never
    // survives into the base form.
    let spaced: String = stripped
        .chars()
        .filter_map(|c| {
            if is_slug_char(c) {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    let tokens = spaced
        .split(is_separator)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    NormalizedName { base, tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(name: &str) -> Vec<String> {
        normalize(name).tokens
    }

    #[test]
    fn test_lowercases_and_splits_on_whitespace() {
        let n = normalize("Public Cloud Group");
        assert_eq!(n.base, "publiccloudgroup");
        assert_eq!(tokens("Public Cloud Group"), vec!["public", "cloud", "group"]);
    }

    #[test]
    fn test_keeps_dot_and_hyphen_in_base() {
        let n = normalize("Character.AI");
        assert_eq!(n.base, "character.ai");
        assert_eq!(n.tokens, vec!["character", "ai"]);
    }

    #[test]
    fn test_strips_legal_suffixes() {
        assert_eq!(normalize("Acme Inc").base, "acme");
        assert_eq!(normalize("Acme, Inc.").base, "acme");
        assert_eq!(normalize("Widgets LLC").base, "widgets");
        assert_eq!(normalize("Foo Bar Company").tokens, vec!["foo", "bar"]);
        assert_eq!(normalize("Baz Corp.").base, "baz");
    }

    #[test]
    fn test_legal_suffix_only_matches_whole_words() {
        assert_eq!(normalize("Incognito").base, "incognito");
        assert_eq!(normalize("Cohere").base, "cohere");
        assert_eq!(normalize("Costco Co").base, "costco");
    }

    #[test]
    fn test_drops_punctuation() {
        let n = normalize("AT&T (US)");
        assert_eq!(n.base, "attus");
        assert_eq!(n.tokens, vec!["att", "us"]);
    }

    #[test]
    fn test_trims_leading_and_trailing_separators() {
        let n = normalize("--acme--labs..");
        assert_eq!(n.base, "acme--labs");
        assert_eq!(n.tokens, vec!["acme", "labs"]);
    }

    #[test]
    fn test_empty_and_unusable_names() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(normalize("Inc.").is_empty());
        assert!(normalize("—&—").is_empty());
        assert_eq!(normalize("...").base, "");
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        assert_eq!(normalize("Café Müller").tokens, vec!["caf", "mller"]);
    }
}
