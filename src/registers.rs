//! ## Register file
//! Owned, fixed-size register storage shared by every counter.
//!
//! The wire contract between implementations pins a counter to exactly
//! 256 single-byte registers with no length prefix or framing, rendered
//! as 512 lowercase hex characters wherever registers travel inside a
//! text protocol. The register file is therefore its own value type:
//! length is checked once at the construction boundary and never again,
//! and every mutation either grows a register or resets the whole file.

use std::fmt::{self, Debug, Formatter};

use crate::error::Error;

/// Number of registers held by a counter (`m`). Two register files can
/// only be combined when both hold exactly this many registers, so the
/// constant is part of the wire contract and never changes.
pub const REGISTER_COUNT: usize = 256;

/// Fixed-length register file of a 256-bucket counter.
///
/// Register values only grow, either through an observation or through
/// an element-wise max merge, until an explicit [`clear`](Self::clear).
#[derive(Clone, PartialEq, Eq)]
pub struct Registers(pub(crate) [u8; REGISTER_COUNT]);

impl Registers {
    /// Creates an all-zero register file.
    pub const fn new() -> Self {
        Self([0; REGISTER_COUNT])
    }

    /// Returns the raw register bytes in wire order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; REGISTER_COUNT] {
        &self.0
    }

    /// Renders the registers in the text-transport form: 512 lowercase
    /// hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of registers still at zero (`V` in the estimate).
    #[inline]
    pub fn zero_count(&self) -> usize {
        self.0.iter().filter(|&&rank| rank == 0).count()
    }

    /// Element-wise maximum merge with another register file.
    pub fn merge_max(&mut self, other: &Registers) {
        for (lhs, rhs) in self.0.iter_mut().zip(other.0.iter()) {
            *lhs = (*lhs).max(*rhs);
        }
    }

    /// Resets every register to zero.
    pub fn clear(&mut self) {
        self.0.fill(0);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[u8; REGISTER_COUNT]> for Registers {
    fn from(registers: [u8; REGISTER_COUNT]) -> Self {
        Self(registers)
    }
}

impl TryFrom<&[u8]> for Registers {
    type Error = Error;

    /// Copies a raw register buffer, rejecting any length other than
    /// [`REGISTER_COUNT`].
    fn try_from(buffer: &[u8]) -> Result<Self, Error> {
        let registers: [u8; REGISTER_COUNT] = buffer
            .try_into()
            .map_err(|_| Error::InvalidRegisterCount(buffer.len()))?;
        Ok(Self(registers))
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Registers({})", self.to_hex())
    }
}
