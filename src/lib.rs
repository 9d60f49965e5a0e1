//! `nostr-hll` estimates how many distinct 32-byte identifiers (public keys or event ids) appear in an event stream, in fixed memory.
//!
//! The crate has two independent halves composed by the caller's storage layer: [`HyperLogLog`] holds one counter's 256 registers in a
//! wire-compatible layout, and [`offset`] holds the deterministic rules deciding which counter an event feeds and which 8-byte key window
//! that counter reads, so independent relays produce mergeable registers for the same approximate COUNT query.
mod error;
pub mod event;
pub mod filter;
mod hyperloglog;
pub mod offset;
mod registers;
#[cfg(feature = "with_serde")]
mod serde;

pub use crate::error::Error;
pub use crate::event::Event;
pub use crate::filter::Filter;
pub use crate::hyperloglog::{HyperLogLog, KEY_LEN, MAX_OFFSET, WINDOW_LEN};
pub use crate::registers::{Registers, REGISTER_COUNT};
