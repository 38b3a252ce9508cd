//! Wear-Leveled Record Storage
//!
//! Redundant, CRC-checked persistence of small payloads across rotating
//! storage slots (EEPROM, flash pages). Tolerates torn writes,
//! sequence-number wrap-around and, in the versioned format, forward
//! version skew.
//!
//! Two wire formats are provided: [`compact`] (4-byte header, u8 type tag)
//! and [`versioned`] (7-byte header, u16 type tag plus a u16 version that
//! readers refuse to exceed).

mod crc;
mod error;
mod seq;
mod storage;

pub mod compact;
pub mod versioned;

pub use compact::{Record, RecordConfig};
pub use crc::{crc16_ccitt, crc16_ccitt_update, CRC16_INIT};
pub use error::RecordError;
pub use storage::{MemSlots, SlotStorage};
pub use versioned::{VersionedRecord, VersionedRecordConfig};
