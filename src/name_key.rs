use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const SUFFIX_TOKENS: [&str; 6] = ["jr", "sr", "ii", "iii", "iv", "v"];

/// NFD-decompose and drop combining marks, so "Dončić" compares as "Doncic".
pub fn strip_accents(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Primary comparison key for a display name.
///
/// Lower-cased, accents stripped, `.`/`'` removed, hyphens widened to spaces,
/// whitespace collapsed, one trailing generational suffix dropped. Distinct
/// display names can collide on the same key; the index keeps the first.
pub fn normalize(name: &str) -> String {
    let lower = strip_accents(name).to_lowercase();
    let mut cleaned = String::with_capacity(lower.len());
    for ch in lower.chars() {
        match ch {
            '.' | '\'' | '\u{2019}' | '\u{2018}' => {}
            '-' => cleaned.push(' '),
            c => cleaned.push(c),
        }
    }

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() >= 2 {
        let last = tokens[tokens.len() - 1];
        if SUFFIX_TOKENS.contains(&last) {
            tokens.pop();
        }
    }
    tokens.join(" ")
}

/// Secondary `first last` shorthand key, skipping any middle tokens.
/// Single-token names have no shorthand and rely on the primary key alone.
pub fn short_key(name: &str) -> Option<String> {
    let stripped = strip_accents(name).to_lowercase();
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(format!("{} {}", tokens[0], tokens[tokens.len() - 1]))
}

/// First whitespace token, accent-stripped and lowered. Used by the fallback
/// matching tier.
pub fn first_token(name: &str) -> Option<String> {
    let stripped = strip_accents(name).to_lowercase();
    stripped.split_whitespace().next().map(|t| t.to_string())
}

/// Last whitespace token, accent-stripped and lowered.
pub fn last_token(name: &str) -> Option<String> {
    let stripped = strip_accents(name).to_lowercase();
    stripped.split_whitespace().last().map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize("Luka Dončić"), "luka doncic");
        assert_eq!(normalize("Nikola Jokić"), "nikola jokic");
        assert_eq!(normalize("Kristaps Porziņģis"), "kristaps porzingis");
    }

    #[test]
    fn strips_punctuation_and_hyphens() {
        assert_eq!(normalize("P.J. Tucker"), "pj tucker");
        assert_eq!(normalize("De'Aaron Fox"), "deaaron fox");
        assert_eq!(normalize("Jalen Hood-Schifino"), "jalen hood schifino");
        assert_eq!(normalize("De\u{2019}Andre Hunter"), "deandre hunter");
    }

    #[test]
    fn drops_trailing_generational_suffix() {
        assert_eq!(normalize("Larry Nance Jr"), "larry nance");
        assert_eq!(normalize("Larry Nance Jr."), "larry nance");
        assert_eq!(normalize("Gary Payton II"), "gary payton");
        assert_eq!(normalize("Robert Williams III"), "robert williams");
        assert_eq!(normalize("Ricky Council IV"), "ricky council");
        assert_eq!(normalize("Marcus Morris Sr"), "marcus morris");
    }

    #[test]
    fn suffix_only_dropped_when_trailing_and_not_alone() {
        // A bare suffix token is somebody's whole name as far as we know.
        assert_eq!(normalize("V"), "v");
        assert_eq!(normalize("Jr Smith"), "jr smith");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in ["P.J. Tucker", "Luka Dončić", "Larry Nance Jr.", "Bol Bol"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn short_key_skips_middle_tokens() {
        assert_eq!(
            short_key("Shai Gilgeous Alexander").as_deref(),
            Some("shai alexander")
        );
        assert_eq!(short_key("Nic Claxton").as_deref(), Some("nic claxton"));
        assert_eq!(short_key("Nene"), None);
        assert_eq!(short_key(""), None);
    }

    #[test]
    fn token_helpers_strip_accents() {
        assert_eq!(first_token("Dario Šarić").as_deref(), Some("dario"));
        assert_eq!(last_token("Dario Šarić").as_deref(), Some("saric"));
        assert_eq!(last_token("   "), None);
    }
}
