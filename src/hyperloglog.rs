//! ## HyperLogLog counter
//! Fixed-memory distinct counter for 32-byte identifiers, interoperable
//! across implementations at the register level.
//!
//! The counter is a plain HyperLogLog with `m = 256` single-byte
//! registers and no hashing stage: the identifiers being counted (event
//! ids and x-only public keys) are already uniformly distributed, so an
//! 8-byte window of the key itself supplies both the bucket index and
//! the rank. The first window byte selects one of 256 buckets and the
//! remaining 56 bits are scanned for leading zeros, giving ranks in
//! `1..=57` that always fit a byte.
//!
//! ## Window offsets
//! Each counter reads its keys through one fixed window, chosen at
//! creation and constant for the counter's lifetime. Offsets derived
//! from a counter's reference id (see [`crate::offset`]) keep
//! independent relays byte-compatible: the same key always lands in the
//! same bucket with the same rank, so register files merge losslessly
//! across implementations, while different counters sample different
//! slices of the keyspace.
//!
//! ## Wire compatibility
//! Register files and estimates are exchanged between implementations,
//! so the estimation constants and the branch structure of
//! [`estimate`](HyperLogLog::estimate) are frozen. With `m = 256` the
//! standard error is about `1.04 / sqrt(256)`, roughly 6.5% in the
//! bias-corrected regime, while linear counting keeps small counts
//! essentially exact.

use std::fmt::{self, Debug, Formatter};

use crate::error::Error;
use crate::registers::{Registers, REGISTER_COUNT};

/// Length of every counted identifier, in bytes.
pub const KEY_LEN: usize = 32;
/// Length of the key window folded into the counter, in bytes.
pub const WINDOW_LEN: usize = 8;
/// Largest valid window offset (`KEY_LEN - WINDOW_LEN`).
pub const MAX_OFFSET: u8 = (KEY_LEN - WINDOW_LEN) as u8;

/// Register count as a float (`m`).
const M: f64 = REGISTER_COUNT as f64;
/// Bias-correction constant for `m = 256`.
const ALPHA: f64 = 0.7213 / (1.0 + 1.079 / M);
/// Linear-counting estimates above this ceiling are not trusted on the
/// first branch of the estimate.
const LINEAR_COUNT_CEIL: f64 = 220.0;
/// Raw estimates at or below this ceiling (`3 * m`) fall back to linear
/// counting when any register is still zero.
const RAW_ESTIMATE_CEIL: f64 = 768.0;
/// Low 56 bits of the window, the part scanned for the rank.
const RANK_MASK: u64 = (1u64 << 56) - 1;

/// 256-register HyperLogLog counter reading one fixed 8-byte window of
/// every key it observes.
///
/// ```
/// use nostr_hll::HyperLogLog;
///
/// let mut counter = HyperLogLog::new(8)?;
/// counter.update(&[0x17; 32]);
/// counter.update(&[0x2a; 32]);
/// counter.update(&[0x17; 32]);
/// assert_eq!(counter.estimate(), 2);
/// # Ok::<(), nostr_hll::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct HyperLogLog {
    registers: Registers,
    offset: u8,
}

impl HyperLogLog {
    /// Creates an empty counter reading the key window at `offset`.
    ///
    /// Fails with [`Error::InvalidOffset`] when `offset > MAX_OFFSET`,
    /// since the window would run past the end of a 32-byte key.
    #[inline]
    pub fn new(offset: u8) -> Result<Self, Error> {
        if offset > MAX_OFFSET {
            return Err(Error::InvalidOffset(offset));
        }
        Ok(Self {
            registers: Registers::new(),
            offset,
        })
    }

    /// Reconstructs a counter from a raw register buffer, copying it.
    ///
    /// The buffer length is checked first ([`Error::InvalidRegisterCount`]
    /// unless it holds exactly [`REGISTER_COUNT`] bytes), then the offset
    /// ([`Error::InvalidOffset`]). Register values are trusted as-is:
    /// any byte pattern is a valid register file.
    #[inline]
    pub fn from_registers(buffer: &[u8], offset: u8) -> Result<Self, Error> {
        let registers = Registers::try_from(buffer)?;
        if offset > MAX_OFFSET {
            return Err(Error::InvalidOffset(offset));
        }
        Ok(Self { registers, offset })
    }

    /// Window offset this counter reads keys through.
    #[inline]
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Read access to the register file, e.g. for persistence or for
    /// shipping to a peer.
    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Replaces the register file wholesale.
    ///
    /// [`Registers`] is length-correct by construction, so this cannot
    /// fail; untrusted buffers go through [`Registers::try_from`] or
    /// [`HyperLogLog::from_registers`] instead.
    pub fn set_registers(&mut self, registers: Registers) {
        self.registers = registers;
    }

    /// Folds one key observation into the counter.
    ///
    /// The 8-byte window at the counter's offset is folded big-endian
    /// into a 64-bit word: the top byte selects the bucket and the rank
    /// is one more than the number of leading zeros among the low 56
    /// bits (57 when they are all zero). The bucket keeps the maximum
    /// rank it has seen, so applying the same key again is a no-op.
    #[inline]
    pub fn update(&mut self, key: &[u8; KEY_LEN]) {
        let start = usize::from(self.offset);
        let mut window = 0u64;
        for &byte in &key[start..start + WINDOW_LEN] {
            window = (window << 8) | u64::from(byte);
        }
        let bucket = (window >> 56) as usize;
        let rank = ((window & RANK_MASK).leading_zeros() - 7) as u8;
        let register = &mut self.registers.0[bucket];
        *register = (*register).max(rank);
    }

    /// Merges another counter's registers into this one, element-wise
    /// maximum.
    ///
    /// Commutative, associative, and idempotent: replaying or reordering
    /// merges never inflates the estimate. Offsets are not reconciled
    /// here; registers only combine meaningfully when both counters read
    /// the same window, and the caller's storage keys (reference id plus
    /// offset) maintain that pairing.
    #[inline]
    pub fn merge(&mut self, other: &HyperLogLog) {
        self.registers.merge_max(&other.registers);
    }

    /// Merges a raw register buffer received from a peer.
    ///
    /// Fails with [`Error::InvalidRegisterCount`] for any length other
    /// than [`REGISTER_COUNT`], leaving this counter untouched.
    pub fn merge_registers(&mut self, buffer: &[u8]) -> Result<(), Error> {
        let other = Registers::try_from(buffer)?;
        self.registers.merge_max(&other);
        Ok(())
    }

    /// Resets the counter to empty, keeping its offset.
    pub fn clear(&mut self) {
        self.registers.clear();
    }

    /// Returns the cardinality estimate, rounded down.
    ///
    /// Small cardinalities use linear counting over the zero registers;
    /// large ones use the bias-corrected harmonic mean. The exact branch
    /// structure, including the second linear-counting return taken when
    /// the raw estimate is at most `3m` while the linear count already
    /// exceeded its ceiling, is shared bit-for-bit with the other
    /// implementations this counter exchanges registers with. Changing
    /// it would make relays disagree on the same register file, so it
    /// stays, quirks and all.
    #[inline]
    pub fn estimate(&self) -> u64 {
        let zeros = self.registers.zero_count();
        if zeros != 0 {
            let linear = linear_count(zeros);
            if linear <= LINEAR_COUNT_CEIL {
                return linear as u64;
            }
        }
        let raw = self.raw_estimate();
        if raw <= RAW_ESTIMATE_CEIL && zeros != 0 {
            return linear_count(zeros) as u64;
        }
        raw as u64
    }

    /// Bias-corrected harmonic-mean estimate over all registers:
    /// `alpha * m^2 / sum(2^-rank)`.
    fn raw_estimate(&self) -> f64 {
        let mut sum = 0.0;
        for &rank in self.registers.0.iter() {
            // exp2 instead of a shift: register files from peers may
            // carry any byte value, and ranks >= 64 must still fold in
            // as vanishingly small terms rather than overflow.
            sum += (-f64::from(rank)).exp2();
        }
        ALPHA * M * M / sum
    }
}

/// Linear-counting estimate from the number of zero registers:
/// `m * ln(m / V)`.
fn linear_count(zeros: usize) -> f64 {
    M * (M / zeros as f64).ln()
}

impl Debug for HyperLogLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ offset: {}, zero_registers: {}, estimate: {} }}",
            self.offset,
            self.registers.zero_count(),
            self.estimate()
        )
    }
}
