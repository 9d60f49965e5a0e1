//! Minimal query-filter shape consumed by the offset deriver.

use std::collections::BTreeMap;

/// Already-parsed subscription filter, reduced to the fields the
/// count-eligibility decision reads.
///
/// List fields model "absent" as empty. `since` and `until` treat
/// `None` and `Some(0)` alike, both meaning "no bound", matching
/// transports where zero and missing are indistinguishable. Tag
/// selectors keep their leading `#` (`"#p"`, `"#e"`, `"#E"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Event id list.
    pub ids: Vec<String>,
    /// Author pubkey list.
    pub authors: Vec<String>,
    /// Kind list.
    pub kinds: Vec<u16>,
    /// Inclusive lower creation-time bound.
    pub since: Option<u64>,
    /// Inclusive upper creation-time bound.
    pub until: Option<u64>,
    /// Full-text search term.
    pub search: Option<String>,
    /// Result count limit. Counting ignores it: a limit caps returned
    /// events, not the cardinality being estimated.
    pub limit: Option<u32>,
    /// Tag-selector lists keyed by `#`-prefixed selector.
    pub tags: BTreeMap<String, Vec<String>>,
}
