//! # Serde support for counters
//!
//! A counter serializes as the two-element tuple `(offset, registers)`,
//! with the registers rendered in the 512-character lowercase-hex
//! transport form used wherever register files travel inside text
//! protocols.
//!
//! Deserialization rebuilds the counter through
//! [`HyperLogLog::from_registers`], so foreign data cannot smuggle an
//! out-of-range offset or a register file of the wrong length past the
//! construction checks.
//!
//! Refer to the serde documentation for more details on custom
//! serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::hyperloglog::HyperLogLog;

impl Serialize for HyperLogLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.offset())?;
        tup.serialize_element(&self.registers().to_hex())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for HyperLogLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (offset, registers): (u8, String) = Deserialize::deserialize(deserializer)?;
        let buffer = hex::decode(&registers).map_err(Error::custom)?;
        HyperLogLog::from_registers(&buffer, offset).map_err(Error::custom)
    }
}
