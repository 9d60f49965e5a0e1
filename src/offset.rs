//! ## Window-offset derivation
//! Deterministic rules mapping events and query filters to the counter
//! they feed and the key window that counter reads.
//!
//! Counting "distinct contributors to X" only merges across relays when
//! every implementation folds the same slice of each key into X's
//! counter. The window is pinned by X's own reference id: the hex digit
//! at index 32 (the first nibble of the 17th byte), plus 8, giving an
//! offset in `[8, 23]` that always leaves a whole 8-byte window inside
//! a 32-byte key. Deriving the offset from the reference also spreads
//! unrelated counters across different key windows, so one pathological
//! key region cannot skew every count at once.
//!
//! Inputs arrive from the network, so nothing here fails or panics:
//! malformed or ineligible shapes yield `None` or an empty contribution
//! list and the caller falls back to exact counting.

use crate::event::{Event, KIND_COMMENT, KIND_FOLLOW_LIST, KIND_REACTION};
use crate::filter::Filter;

/// One counter update implied by an event: which counter (`reference`)
/// and which key window (`offset`) the event's author is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution<'a> {
    /// Reference id of the counter, a 64-character hex key.
    pub reference: &'a str,
    /// Window offset every implementation derives for that reference.
    pub offset: u8,
}

/// Returns true iff `s` is exactly 64 hex digits of either case, the
/// textual form of a 32-byte event id or public key.
pub fn is_valid_hex_key(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Window offset encoded in a reference id: the value of the hex digit
/// at index 32, plus 8.
///
/// Returns `None` unless `reference` is a valid 64-character hex key;
/// every derived offset lies in `[8, 23]`, well inside the valid
/// `0..=24` window range.
pub fn reference_offset(reference: &str) -> Option<u8> {
    if !is_valid_hex_key(reference) {
        return None;
    }
    let nibble = char::from(reference.as_bytes()[32]).to_digit(16)?;
    Some(nibble as u8 + 8)
}

/// Counters a single event contributes to, in tag order.
///
/// Follow lists fan out to every `p` tag carrying a valid reference;
/// reactions credit only the last `e` tag (by convention the reacted-to
/// note); comments credit only the first `E` tag (the thread root). A
/// missing or malformed reference in the one considered tag yields no
/// contribution at all, never a fallback to another tag. Events of any
/// other kind contribute nothing.
pub fn event_contributions(event: &Event) -> Vec<Contribution<'_>> {
    match event.kind {
        KIND_FOLLOW_LIST => event
            .tags
            .iter()
            .filter(|tag| tag.len() >= 2 && tag[0] == "p")
            .filter_map(|tag| contribution(&tag[1]))
            .collect(),
        KIND_REACTION => event
            .tags
            .iter()
            .rev()
            .find(|tag| tag.first().is_some_and(|name| name == "e"))
            .and_then(|tag| tag.get(1))
            .and_then(|value| contribution(value))
            .into_iter()
            .collect(),
        KIND_COMMENT => event
            .tags
            .iter()
            .find(|tag| tag.first().is_some_and(|name| name == "E"))
            .and_then(|tag| tag.get(1))
            .and_then(|value| contribution(value))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether a filter is eligible for an approximate count, and through
/// which key window.
///
/// Eligible filters ask exactly one narrow question: a single kind, a
/// single `#` tag selector carrying a single valid reference, and
/// nothing else, no ids, no authors, no time bounds, no search. The
/// selector and kind must form one of the supported counter families:
/// `#p` with kind 3 (followers), `#e` with kind 7 (reactions), `#E`
/// with kind 1111 (comments). Anything else returns `None` and the
/// caller answers with an exact count instead.
pub fn filter_offset(filter: &Filter) -> Option<u8> {
    if !filter.ids.is_empty() {
        return None;
    }
    if !filter.authors.is_empty() {
        return None;
    }
    if filter.since.unwrap_or(0) != 0 {
        return None;
    }
    if filter.until.unwrap_or(0) != 0 {
        return None;
    }
    if !filter.search.as_deref().unwrap_or("").is_empty() {
        return None;
    }
    if filter.kinds.len() != 1 {
        return None;
    }
    let mut selectors = filter.tags.iter().filter(|(key, _)| key.starts_with('#'));
    let (selector, values) = selectors.next()?;
    if selectors.next().is_some() {
        return None;
    }
    if values.len() != 1 {
        return None;
    }
    let reference = &values[0];
    if !is_valid_hex_key(reference) {
        return None;
    }
    match (selector.as_str(), filter.kinds[0]) {
        ("#p", KIND_FOLLOW_LIST) | ("#e", KIND_REACTION) | ("#E", KIND_COMMENT) => {
            reference_offset(reference)
        }
        _ => None,
    }
}

fn contribution(reference: &str) -> Option<Contribution<'_>> {
    reference_offset(reference).map(|offset| Contribution { reference, offset })
}
