// src/utils/text_match.rs
//! Structural text matching over extracted certificate text.
//!
//! The tamper verifier's content cross-check (Layer 4) needs to confirm
//! that credential fields still appear in their expected positions in the
//! rendered document. Extracted text is noisy: renderers wrap lines and
//! normalize whitespace, so the checks here come in three strengths:
//!
//! - label anchors: a short value must appear immediately after its known
//!   section label, case-insensitively, whitespace-tolerantly
//! - fuzzy word presence: long free-text fields are checked by sampling
//!   their leading significant words
//! - bounded sections: a value must appear inside a region delimited by
//!   known headings (used for the digital signature block)

/// Finds `needle` in `haystack` starting at `from`, ignoring ASCII case.
///
/// Returns the byte offset of the match. Works on byte windows so the
/// offsets are always valid slice boundaries for ASCII needles.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let ned = needle.as_bytes();
    if ned.is_empty() || from + ned.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - ned.len()).find(|&i| {
        hay[i..i + ned.len()]
            .iter()
            .zip(ned)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Checks that `value` appears immediately after an occurrence of
/// `label`, separated only by an optional colon and whitespace.
///
/// Matching is case-insensitive and tolerant of the renderer collapsing
/// or wrapping whitespace inside the value. Every occurrence of the
/// label is tried; one anchored match suffices.
pub fn value_follows_label(text: &str, label: &str, value: &str) -> bool {
    let value_tokens: Vec<&str> = value.split_whitespace().collect();
    if value_tokens.is_empty() {
        return true;
    }
    let mut from = 0;
    while let Some(pos) = find_ascii_ci(text, label, from) {
        let after = &text[pos + label.len()..];
        let after = after.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        let mut words = after.split_whitespace();
        if value_tokens
            .iter()
            .all(|t| words.next().is_some_and(|w| w.eq_ignore_ascii_case(t)))
        {
            return true;
        }
        from = pos + label.len();
    }
    false
}

/// Fuzzy presence check for long free-text fields.
///
/// Takes the first five words of `original` longer than three characters
/// and requires at least `min(3, count)` of them to appear anywhere in
/// `text`, case-insensitively. Tolerant of line wrapping while still
/// catching a rewritten paragraph.
pub fn fuzzy_text_present(text: &str, original: &str) -> bool {
    let words: Vec<&str> = original
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .take(5)
        .collect();
    if words.is_empty() {
        return true;
    }
    let required = words.len().min(3);
    let found = words
        .iter()
        .filter(|w| find_ascii_ci(text, w, 0).is_some())
        .count();
    found >= required
}

/// Returns the slice of `text` between `start_label` and the first of
/// `end_labels` that follows it (or the end of the text).
///
/// The returned section starts after the label's optional colon and
/// whitespace. `None` when the start label is absent.
pub fn bounded_section<'a>(text: &'a str, start_label: &str, end_labels: &[&str]) -> Option<&'a str> {
    let start = find_ascii_ci(text, start_label, 0)?;
    let body_start = start + start_label.len();
    let trimmed = text[body_start..]
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let body_start = text.len() - trimmed.len();
    let body_end = end_labels
        .iter()
        .filter_map(|end| find_ascii_ci(text, end, body_start))
        .min()
        .unwrap_or(text.len());
    Some(&text[body_start..body_end])
}

/// Extracts what the document actually contains for a labeled field:
/// the rest of the line following the first occurrence of `label`.
///
/// Used to report "you entered X, the document contains Y" diffs.
pub fn value_after_label(text: &str, label: &str) -> Option<String> {
    let pos = find_ascii_ci(text, label, 0)?;
    let after = &text[pos + label.len()..];
    let after = after.trim_start_matches(|c: char| c == ':' || c == ' ' || c == '\t');
    let line = after.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
