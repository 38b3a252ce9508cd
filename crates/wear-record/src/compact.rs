//! Compact Record Format
//!
//! Slot layout, 4-byte header:
//!
//! ```text
//! byte 0..2  CRC-16-CCITT (little-endian) over bytes 2..size
//! byte 2     type tag
//! byte 3     sequence number
//! byte 4..   payload
//! ```

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::crc::crc16_ccitt;
use crate::error::RecordError;
use crate::seq;
use crate::storage::SlotStorage;

/// Header size in bytes: CRC16, type tag, sequence number.
pub const HEADER_SIZE: usize = 4;

/// Format of a compact record: slot size, slot count and type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Size of one slot, in bytes (header plus payload)
    pub size: u16,
    /// Number of rotating slots holding copies of the record
    pub redundancy: u8,
    /// Magic number identifying the record type
    pub type_tag: u8,
}

impl RecordConfig {
    pub const fn new(size: u16, redundancy: u8, type_tag: u8) -> Self {
        Self {
            size,
            redundancy,
            type_tag,
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

    /// A [`Record`] positioned at the initial slot and sequence number.
    pub const fn record(&self) -> Record {
        self.record_at(0, 0)
    }

    /// A [`Record`] positioned at the given slot and sequence number.
    pub const fn record_at(&self, index: u8, sequence_number: u8) -> Record {
        Record {
            config: *self,
            index,
            sequence_number,
        }
    }
}

/// A position within a record storage area: the slot index and sequence
/// number of the most recently adopted copy.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    config: RecordConfig,
    index: u8,
    sequence_number: u8,
}

impl Record {
    /// The format this record was configured with.
    pub const fn config(&self) -> &RecordConfig {
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
    /// position.
    ///
    /// `payload` must be `payload_size()` bytes, `out` at least `size`
    /// bytes.
    pub fn encode_slot(&self, payload: &[u8], out: &mut [u8]) {
        let size = self.config.size as usize;
        out[2] = self.config.type_tag;
        out[3] = self.sequence_number;
        out[HEADER_SIZE..size].copy_from_slice(payload);
        let crc = crc16_ccitt(&out[2..size]);
        LittleEndian::write_u16(&mut out[0..2], crc);
    }

    /// Validate the slot image `raw` read from slot `index`; on success
    /// adopt its position and copy its payload into `out`.
    ///
    /// Slots whose sequence number jumped `redundancy` or more steps ahead
    /// of the current one are rejected: the rotation cannot explain them.
    pub fn decode_slot(&mut self, index: u8, raw: &[u8], out: &mut [u8]) -> bool {
        let size = self.config.size as usize;

        let crc_read = LittleEndian::read_u16(&raw[0..2]);
        if crc_read != crc16_ccitt(&raw[2..size]) {
            trace!(slot = index, "slot rejected: CRC mismatch");
            return false;
        }
        if raw[2] != self.config.type_tag {
            trace!(slot = index, "slot rejected: type mismatch");
            return false;
        }

        let seq_read = raw[3];
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
    /// `scratch` is a working buffer of at least `size` bytes for raw slot
    /// images. A storage read failure aborts the sweep; if no slot
    /// validates the sweep fails with [`RecordError::NoValidSlot`]. When
    /// two slots carry the same sequence number, the later-scanned one
    /// wins.
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
    ///
    /// `scratch` is a working buffer of at least `size` bytes for the slot
    /// image handed to the storage back-end.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemSlots;

    const CONFIG: RecordConfig = RecordConfig::new(24, 4, 0x5A);

    fn pattern_payload(config: &RecordConfig, marker: u8, seq: u8) -> Vec<u8> {
        let mut payload: Vec<u8> = (0..config.payload_size() as u8).collect();
        payload[0] = marker;
        payload[1] = seq;
        payload
    }

    /// Write a well-formed slot image directly into storage.
    fn setup_slot(mem: &mut MemSlots, config: &RecordConfig, index: u8, seq: u8) {
        let payload = pattern_payload(config, index, seq);
        let record = config.record_at(index, seq);
        let mut slot = vec![0u8; config.size as usize];
        record.encode_slot(&payload, &mut slot);
        mem.slot_mut(index).copy_from_slice(&slot);
    }

    fn read_all(config: &RecordConfig, mem: &mut MemSlots) -> Result<Vec<u8>, RecordError> {
        let mut record = config.record();
        let mut out = vec![0u8; config.payload_size()];
        let mut scratch = vec![0u8; config.size as usize];
        record.read(&mut out, &mut scratch, mem)?;
        Ok(out)
    }

    #[test]
    fn test_sizes() {
        assert_eq!(CONFIG.payload_size(), 20);
        assert_eq!(CONFIG.total_size(), 96);
    }

    #[test]
    fn test_round_trip() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        let mut writer = CONFIG.record();
        let mut scratch = vec![0u8; CONFIG.size as usize];

        let payload = pattern_payload(&CONFIG, 0xAA, 0x01);
        writer.write_next(&payload, &mut scratch, &mut mem).unwrap();

        assert_eq!(read_all(&CONFIG, &mut mem).unwrap(), payload);
    }

    #[test]
    fn test_repeated_writes_keep_latest() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        let mut writer = CONFIG.record();
        let mut scratch = vec![0u8; CONFIG.size as usize];

        for i in 0..10u8 {
            let payload = pattern_payload(&CONFIG, i, i);
            writer.write_next(&payload, &mut scratch, &mut mem).unwrap();
        }

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 9);
    }

    #[test]
    fn test_corrupt_crc_rejected() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        mem.slot_mut(0)[10] ^= 0xFF;

        assert_eq!(
            read_all(&CONFIG, &mut mem),
            Err(RecordError::NoValidSlot { redundancy: 4 })
        );
    }

    #[test]
    fn test_picks_newest_sequential_slot() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        setup_slot(&mut mem, &CONFIG, 1, 1);
        setup_slot(&mut mem, &CONFIG, 2, 2);

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 2);
        assert_eq!(out[1], 2);
    }

    #[test]
    fn test_tolerates_sequence_wraparound() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 252);
        setup_slot(&mut mem, &CONFIG, 1, 253);
        setup_slot(&mut mem, &CONFIG, 2, 254);
        setup_slot(&mut mem, &CONFIG, 3, 0);

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 3);
        assert_eq!(out[1], 0);
    }

    #[test]
    fn test_rejects_slot_jumping_past_window() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        setup_slot(&mut mem, &CONFIG, 1, 4); // distance == redundancy
        setup_slot(&mut mem, &CONFIG, 2, 1);

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 2);
        assert_eq!(out[1], 1);
    }

    #[test]
    fn test_window_boundary() {
        // distance == redundancy - 1 is still plausible
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        setup_slot(&mut mem, &CONFIG, 1, 3);
        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[1], 3);

        // distance == redundancy is not
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        setup_slot(&mut mem, &CONFIG, 1, 4);
        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[1], 0);
    }

    #[test]
    fn test_corrupt_slots_skipped_best_survivor_wins() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 5);
        setup_slot(&mut mem, &CONFIG, 1, 6);
        setup_slot(&mut mem, &CONFIG, 2, 7);
        setup_slot(&mut mem, &CONFIG, 3, 8);

        // Break slot 1's CRC outright, and flip slot 3's type tag while
        // recomputing its CRC so only the type check can reject it.
        mem.slot_mut(1)[0] ^= 0xFF;
        let slot3 = mem.slot_mut(3);
        slot3[2] ^= 0xFF;
        let crc = crc16_ccitt(&slot3[2..]);
        LittleEndian::write_u16(&mut slot3[0..2], crc);

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 2);
        assert_eq!(out[1], 7);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let other = RecordConfig::new(CONFIG.size, CONFIG.redundancy, 0x77);
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &other, 0, 0);

        assert_eq!(
            read_all(&CONFIG, &mut mem),
            Err(RecordError::NoValidSlot { redundancy: 4 })
        );
    }

    #[test]
    fn test_read_failure_aborts_sweep() {
        struct FailingAt(MemSlots, u8);
        impl SlotStorage for FailingAt {
            fn read_slot(&mut self, index: u8, out: &mut [u8]) -> bool {
                index != self.1 && self.0.read_slot(index, out)
            }
            fn write_slot(&mut self, index: u8, data: &[u8]) -> bool {
                self.0.write_slot(index, data)
            }
        }

        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 0);
        let mut storage = FailingAt(mem, 1);

        let mut record = CONFIG.record();
        let mut out = vec![0u8; CONFIG.payload_size()];
        let mut scratch = vec![0u8; CONFIG.size as usize];
        assert_eq!(
            record.read(&mut out, &mut scratch, &mut storage),
            Err(RecordError::ReadFailed { slot: 1 })
        );
    }

    #[test]
    fn test_write_failure_propagates() {
        struct ReadOnly;
        impl SlotStorage for ReadOnly {
            fn read_slot(&mut self, _index: u8, _out: &mut [u8]) -> bool {
                true
            }
            fn write_slot(&mut self, _index: u8, _data: &[u8]) -> bool {
                false
            }
        }

        let mut writer = CONFIG.record();
        let payload = pattern_payload(&CONFIG, 0x11, 0x22);
        let mut scratch = vec![0u8; CONFIG.size as usize];
        assert_eq!(
            writer.write_next(&payload, &mut scratch, &mut ReadOnly),
            Err(RecordError::WriteFailed { slot: 1 })
        );
    }

    #[test]
    fn test_duplicate_sequence_last_wins() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 5);
        // Same sequence number in slot 1, different payload marker.
        let payload = pattern_payload(&CONFIG, 0xAB, 5);
        let record = CONFIG.record_at(1, 5);
        let mut slot = vec![0u8; CONFIG.size as usize];
        record.encode_slot(&payload, &mut slot);
        mem.slot_mut(1).copy_from_slice(&slot);

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 0xAB);
    }

    #[test]
    fn test_older_slot_after_newest_ignored() {
        let mut mem = MemSlots::new(CONFIG.redundancy, CONFIG.size as usize);
        setup_slot(&mut mem, &CONFIG, 0, 10);
        setup_slot(&mut mem, &CONFIG, 1, 11);
        setup_slot(&mut mem, &CONFIG, 2, 9); // scanned last but older

        let out = read_all(&CONFIG, &mut mem).unwrap();
        assert_eq!(out[0], 1);
        assert_eq!(out[1], 11);
    }

    #[test]
    fn test_write_next_rotation_and_wrap() {
        let config = RecordConfig::new(16, 3, 0xC4);
        let mut mem = MemSlots::new(config.redundancy, config.size as usize);
        let mut writer = config.record_at(0, 250);
        let mut scratch = vec![0u8; config.size as usize];

        for i in 0..10u8 {
            let payload = pattern_payload(&config, i, writer.sequence_number());
            writer.write_next(&payload, &mut scratch, &mut mem).unwrap();
        }

        // Ten writes from (0, 250): the sequence wraps through 255 (which
        // is skipped) and the freshest copy lands in slot 1.
        assert_eq!(writer.index(), 1);
        let out = read_all(&config, &mut mem).unwrap();
        assert_eq!(out[0], 9);
    }
}
