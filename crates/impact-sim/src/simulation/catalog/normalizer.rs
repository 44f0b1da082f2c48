pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Lowercase alphanumeric words, with `&` and punctuation treated as separators.
pub(crate) fn name_tokens(value: &str) -> Vec<String> {
    let mut tokens: Vec<String> = normalize_name(value)
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty() && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

const STOP_WORDS: &[&str] = &["the", "of", "and", "region", "republic"];

/// Jaccard overlap between two token sets, 0.0 when either is empty.
pub(crate) fn token_similarity(left: &[String], right: &[String]) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.iter().filter(|token| right.contains(token)).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}
