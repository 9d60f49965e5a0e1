//! Minimal event shape consumed by the offset deriver.
//!
//! Wire parsing, id computation, and signature checks live upstream;
//! deriving counter contributions only needs the kind, the ordered tag
//! list, and the author key that ends up feeding
//! [`update`](crate::HyperLogLog::update).

use crate::hyperloglog::KEY_LEN;

/// Follow lists: each followed pubkey gains this event's author as a
/// distinct follower.
pub const KIND_FOLLOW_LIST: u16 = 3;
/// Reactions: the reacted-to event gains a distinct reacting pubkey.
pub const KIND_REACTION: u16 = 7;
/// Comments: the thread root gains a distinct commenting pubkey.
pub const KIND_COMMENT: u16 = 1111;

/// Already-parsed event, reduced to the fields counting reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event kind.
    pub kind: u16,
    /// Author public key, the subject counted by the estimator.
    pub pubkey: [u8; KEY_LEN],
    /// Ordered tag list; each tag is an ordered list of strings.
    pub tags: Vec<Vec<String>>,
}
