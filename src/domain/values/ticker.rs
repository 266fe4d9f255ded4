//! Cashtag detection used to decide whether a post is worth classifying.
//!
//! A cashtag is a `$` immediately followed by one or more ASCII uppercase
//! letters (`$AAPL`, `$F`). Only posts carrying at least one cashtag are sent
//! to the classifier.

/// True iff `text` contains at least one cashtag.
pub fn is_relevant(text: &str) -> bool {
    cashtags(text).next().is_some()
}

/// All ticker symbols mentioned as cashtags, in order of appearance, without
/// the leading `$`. Duplicates are kept.
pub fn extract_tickers(text: &str) -> Vec<String> {
    cashtags(text).map(str::to_string).collect()
}

fn cashtags(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    text.match_indices('$').filter_map(move |(i, _)| {
        let start = i + 1;
        let len = bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        // `$` and ASCII uppercase are single-byte, so these are char boundaries.
        (len > 0).then(|| &text[start..start + len])
    })
}
