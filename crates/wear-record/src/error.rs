//! Record Error Types

use thiserror::Error;

/// Errors from reading or writing a wear-leveled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The storage back-end failed to read a slot; a broken bus is fatal
    /// to the whole sweep, unlike per-slot validation failure
    #[error("storage read failed at slot {slot}")]
    ReadFailed { slot: u8 },

    /// The storage back-end rejected the slot write
    #[error("storage write failed at slot {slot}")]
    WriteFailed { slot: u8 },

    /// Every slot failed validation (CRC, type, version or sequence window)
    #[error("no valid record found across {redundancy} slots")]
    NoValidSlot { redundancy: u8 },
}
