//! Versioned Record Format
//!
//! Extended slot layout for records whose payload schema may evolve,
//! 7-byte header:
//!
//! ```text
//! byte 0..2  CRC-16-CCITT (little-endian) over bytes 2..size
//! byte 2..4  type tag (u16, little-endian)
//! byte 4..6  version (u16, little-endian)
//! byte 6     sequence number
//! byte 7..   payload
//! ```
//!
//! Readers accept any slot whose version is at or below the configured
//! one; newer versions are rejected so old firmware never misparses a
//! payload written by a later release.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::crc::crc16_ccitt;
use crate::error::RecordError;
use crate::seq;
use crate::storage::SlotStorage;

/// Header size in bytes: CRC16, type tag, version, sequence number.
pub const HEADER_SIZE: usize = 7;

/// Format of a versioned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecordConfig {
    /// Size of one slot, in bytes (header plus payload)
    pub size: u16,
    /// Number of rotating slots holding copies of the record
    pub redundancy: u8,
    /// Magic number identifying the record type
    pub type_tag: u16,
    /// Highest payload version this reader understands
    pub version: u16,
}

impl VersionedRecordConfig {
    pub const fn new(size: u16, redundancy: u8, type_tag: u16, version: u16) -> Self {
        Self {
            size,
            redundancy,
            type_tag,
            version,
        }
    }

    /// Size of the payload carried by each slot, in bytes.
    pub const fn payload_size(&self) -> usize {
        self.size as usize - HEADER_SIZE
    }

    /// Total storage taken by the record with all its slots, in bytes.
    pub const fn total_size(&self) -> usize {
        self.size as usize * self.redundancy as usize
    }

    /// A [`VersionedRecord`] positioned at the initial slot and sequence
    /// number.
    pub const fn record(&self) -> VersionedRecord {
        self.record_at(0, 0)
    }

    /// A [`VersionedRecord`] positioned at the given slot and sequence
    /// number.
    pub const fn record_at(&self, index: u8, sequence_number: u8) -> VersionedRecord {
        VersionedRecord {
            config: *self,
            index,
            sequence_number,
        }
    }
}

/// A position within a versioned record storage area.
#[derive(Debug, Clone, Copy)]
pub struct VersionedRecord {
    config: VersionedRecordConfig,
    index: u8,
    sequence_number: u8,
}

impl VersionedRecord {
    /// The format this record was configured with.
    pub const fn config(&self) -> &VersionedRecordConfig {
        &self.config
    }

    /// Index of the current slot in the storage area.
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Sequence number of the current slot.
    pub const fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    /// Advance to the next slot in the rotation.
    pub fn advance(&mut self) {
        self.sequence_number = seq::advance(self.sequence_number);
        self.index = (self.index + 1) % self.config.redundancy;
    }

    /// Encode `payload` into `out` as a full slot image at the current
    /// position, stamped with the configured version.
    pub fn encode_slot(&self, payload: &[u8], out: &mut [u8]) {
        let size = self.config.size as usize;
        LittleEndian::write_u16(&mut out[2..4], self.config.type_tag);
        LittleEndian::write_u16(&mut out[4..6], self.config.version);
        out[6] = self.sequence_number;
        out[HEADER_SIZE..size].copy_from_slice(payload);
        let crc = crc16_ccitt(&out[2..size]);
        LittleEndian::write_u16(&mut out[0..2], crc);
    }

    /// Validate the slot image `raw` read from slot `index`; on success
    /// adopt its position and copy its payload into `out`.
    pub fn decode_slot(&mut self, index: u8, raw: &[u8], out: &mut [u8]) -> bool {
        let size = self.config.size as usize;

        let crc_read = LittleEndian::read_u16(&raw[0..2]);
        if crc_read != crc16_ccitt(&raw[2..size]) {
            trace!(slot = index, "slot rejected: CRC mismatch");
            return false;
        }
        if LittleEndian::read_u16(&raw[2..4]) != self.config.type_tag {
            trace!(slot = index, "slot rejected: type mismatch");
            return false;
        }
        let version_read = LittleEndian::read_u16(&raw[4..6]);
        if version_read > self.config.version {
            trace!(
                slot = index,
                version = version_read,
                "slot rejected: version too new"
            );
            return false;
        }

        let seq_read = raw[6];
        if index > 0 {
            let distance = seq::distance(seq_read, self.sequence_number);
            if distance >= self.config.redundancy {
                trace!(slot = index, distance, "slot rejected: outside sequence window");
                return false;
            }
        }

        self.sequence_number = seq_read;
        self.index = index;
        out.copy_from_slice(&raw[HEADER_SIZE..size]);
        true
    }

    /// Sweep every slot and recover the freshest valid payload into `out`.
    ///
    /// Same contract as the compact format: a storage read failure aborts
    /// the sweep, per-slot validation failures are skipped, ties on the
    /// sequence number go to the later-scanned slot.
    pub fn read<S: SlotStorage>(
        &mut self,
        out: &mut [u8],
        scratch: &mut [u8],
        storage: &mut S,
    ) -> Result<(), RecordError> {
        let scratch = &mut scratch[..self.config.size as usize];
        let mut found = false;
        for i in 0..self.config.redundancy {
            if !storage.read_slot(i, scratch) {
                debug!(slot = i, "slot read failed, aborting sweep");
                return Err(RecordError::ReadFailed { slot: i });
            }
            if self.decode_slot(i, scratch, out) {
                found = true;
            }
        }

        if found {
            debug!(
                slot = self.index,
                seq = self.sequence_number,
                "record recovered"
            );
            Ok(())
        } else {
            Err(RecordError::NoValidSlot {
                redundancy: self.config.redundancy,
            })
        }
    }

    /// Advance the rotation and persist `payload` into the next slot.
    pub fn write_next<S: SlotStorage>(
        &mut self,
        payload: &[u8],
        scratch: &mut [u8],
        storage: &mut S,
    ) -> Result<(), RecordError> {
        self.advance();
        let scratch = &mut scratch[..self.config.size as usize];
        self.encode_slot(payload, scratch);
        if storage.write_slot(self.index, scratch) {
            Ok(())
        } else {
            Err(RecordError::WriteFailed { slot: self.index })
        }
    }
}
