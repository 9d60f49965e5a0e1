//! Errors reported by the counter constructors.

use std::error::Error as StdError;
use std::fmt;

use crate::hyperloglog::MAX_OFFSET;
use crate::registers::REGISTER_COUNT;

/// Failures possible when constructing a counter or adopting register
/// data received from another implementation. No other operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Window offset larger than [`MAX_OFFSET`]: the 8-byte window would
    /// run past the end of a 32-byte key.
    InvalidOffset(u8),
    /// Register buffer whose length is not exactly [`REGISTER_COUNT`].
    InvalidRegisterCount(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOffset(offset) => {
                write!(f, "invalid window offset {}, expected 0..={}", offset, MAX_OFFSET)
            }
            Error::InvalidRegisterCount(len) => {
                write!(f, "invalid register count {}, expected {}", len, REGISTER_COUNT)
            }
        }
    }
}

impl StdError for Error {}
