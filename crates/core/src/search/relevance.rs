//! Relevance scoring for text searches.
//!
//! A score depends only on the query and the record's name, never on the rest
//! of the catalog, so it is stable across ingestion and can serve as a keyset
//! pagination key. Lower is better: the score is the negated share of the
//! name's words that match a query term, in `[-1.0, 0.0]`.

/// Lowercased alphanumeric words of `text`.
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Relevance of `name` for `query`.
///
/// Names without words score `0.0`. Terms matched only through stemming do not
/// count towards coverage.
pub fn relevance_score(query: &str, name: &str) -> f64 {
    let terms = words(query);
    let name_words = words(name);
    if name_words.is_empty() {
        return 0.0;
    }
    let covered = name_words.iter().filter(|w| terms.contains(w)).count();
    if covered == 0 {
        return 0.0;
    }
    -(covered as f64) / name_words.len() as f64
}
