//! Slot Storage Back-End

/// Storage back-end holding the rotating slots of one record.
///
/// Implementations wrap whatever medium holds the slots: EEPROM pages,
/// flash sectors, a file on a host. Both operations report success with
/// `true`. A `false` from `read_slot` is treated as a fatal bus error by
/// the read sweep; a `false` from `write_slot` is propagated unchanged by
/// `write_next`.
pub trait SlotStorage {
    /// Read the full slot image at `index` into `out`.
    fn read_slot(&mut self, index: u8, out: &mut [u8]) -> bool;

    /// Write `data`, one full slot image, to the slot at `index`.
    fn write_slot(&mut self, index: u8, data: &[u8]) -> bool;
}

/// In-memory slot storage for tests and host-side tooling.
pub struct MemSlots {
    slots: Vec<Vec<u8>>,
}

impl MemSlots {
    /// Allocate `redundancy` zero-filled slots of `size` bytes each.
    pub fn new(redundancy: u8, size: usize) -> Self {
        Self {
            slots: vec![vec![0; size]; redundancy as usize],
        }
    }

    /// Borrow a raw slot image.
    pub fn slot(&self, index: u8) -> &[u8] {
        &self.slots[index as usize]
    }

    /// Mutably borrow a raw slot image (used by tests to corrupt bytes).
    pub fn slot_mut(&mut self, index: u8) -> &mut [u8] {
        &mut self.slots[index as usize]
    }
}

impl SlotStorage for MemSlots {
    fn read_slot(&mut self, index: u8, out: &mut [u8]) -> bool {
        match self.slots.get(index as usize) {
            Some(slot) => {
                out.copy_from_slice(slot);
                true
            }
            None => false,
        }
    }

    fn write_slot(&mut self, index: u8, data: &[u8]) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot) => {
                slot.copy_from_slice(data);
                true
            }
            None => false,
        }
    }
}
