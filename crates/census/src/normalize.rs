//! Tag tokenization.
//!
//! Handheld readers export tag lists as free text: one tag per line, or
//! comma/space separated, with stray padding. Everything here preserves the
//! order tags were read in.

use std::collections::HashSet;

use crate::config::TagCase;

/// Split raw reader output on whitespace and commas, dropping empty tokens.
/// Duplicates are kept; the reconciler de-duplicates logically.
pub fn split_raw_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim already-split tokens and drop the ones left empty.
pub fn clean_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop repeated tags, keeping the first occurrence of each.
pub fn dedup_preserving_order<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Clean, case-fold and de-duplicate a scan, ready for comparison.
pub fn normalize_scan<S: AsRef<str>>(tags: &[S], case: TagCase) -> Vec<String> {
    dedup_preserving_order(clean_tags(tags).into_iter().map(|t| case.apply(&t)))
}
