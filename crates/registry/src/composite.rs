//! Array and List Fields

use std::marker::PhantomData;

use byteorder::{ByteOrder, LittleEndian};

use crate::meta::{FieldMeta, StoreItem};
use crate::proxy::Proxy;

/// Integer type used as a list's length prefix.
pub trait LenPrefix {
    const SIZE: usize;

    fn read_len(bytes: &[u8]) -> usize;

    fn write_len(len: usize, bytes: &mut [u8]);
}

impl LenPrefix for u8 {
    const SIZE: usize = 1;

    fn read_len(bytes: &[u8]) -> usize {
        bytes[0] as usize
    }

    fn write_len(len: usize, bytes: &mut [u8]) {
        bytes[0] = len as u8;
    }
}

impl LenPrefix for u16 {
    const SIZE: usize = 2;

    fn read_len(bytes: &[u8]) -> usize {
        LittleEndian::read_u16(bytes) as usize
    }

    fn write_len(len: usize, bytes: &mut [u8]) {
        LittleEndian::write_u16(bytes, len as u16);
    }
}

/// A fixed-size array of `K` homogeneous items.
#[derive(Debug, Clone, Copy)]
pub struct ArrayMeta<M, const K: usize> {
    pub item: M,
}

impl<M, const K: usize> ArrayMeta<M, K> {
    pub const fn new(item: M) -> Self {
        Self { item }
    }
}

impl<M: FieldMeta, const K: usize> FieldMeta for ArrayMeta<M, K> {
    const SIZE: usize = M::SIZE * K;

    fn reset(&self, bytes: &mut [u8]) {
        for chunk in bytes[..Self::SIZE].chunks_exact_mut(M::SIZE) {
            self.item.reset(chunk);
        }
    }
}

impl<'a, M: FieldMeta, const K: usize> Proxy<'a, ArrayMeta<M, K>> {
    /// Number of items in the array.
    pub const fn len(&self) -> usize {
        K
    }

    pub const fn is_empty(&self) -> bool {
        K == 0
    }

    /// Proxy for the item at `index`.
    pub fn at(&mut self, index: usize) -> Proxy<'_, M> {
        assert!(index < K, "array index out of range");
        Proxy::new(&self.meta.item, &mut self.bytes[index * M::SIZE..])
    }

    /// Store the first `min(items.len(), K)` items; the rest of the array
    /// is left untouched.
    pub fn set<'v>(&mut self, items: &[M::Item<'v>])
    where
        M: StoreItem,
    {
        for (i, &item) in items.iter().take(K).enumerate() {
            self.meta
                .item
                .store(item, &mut self.bytes[i * M::SIZE..(i + 1) * M::SIZE]);
        }
    }
}

/// A variable-size list: a length prefix of type `S` followed by up to `C`
/// items.
#[derive(Debug, Clone, Copy)]
pub struct ListMeta<M, const C: usize, S = u8> {
    pub item: M,
    _len: PhantomData<S>,
}

impl<M, const C: usize, S> ListMeta<M, C, S> {
    pub const fn new(item: M) -> Self {
        Self {
            item,
            _len: PhantomData,
        }
    }
}

impl<M: FieldMeta, const C: usize, S: LenPrefix> FieldMeta for ListMeta<M, C, S> {
    const SIZE: usize = S::SIZE + M::SIZE * C;

    // Items stay in the backing storage but become unreachable.
    fn reset(&self, bytes: &mut [u8]) {
        S::write_len(0, bytes);
    }
}

impl<'a, M: FieldMeta, const C: usize, S: LenPrefix> Proxy<'a, ListMeta<M, C, S>> {
    /// Current number of items.
    pub fn len(&self) -> usize {
        S::read_len(self.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of items.
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Proxy for the item slot at `index` (`index < C`; slots at or past
    /// `len()` hold stale bytes).
    pub fn at(&mut self, index: usize) -> Proxy<'_, M> {
        assert!(index < C, "list index out of range");
        Proxy::new(
            &self.meta.item,
            &mut self.bytes[S::SIZE + index * M::SIZE..],
        )
    }

    /// Append `item` through the item meta's constraint.
    ///
    /// Returns `false`, leaving the list unchanged, when `len() == C`.
    pub fn push_back<'v>(&mut self, item: M::Item<'v>) -> bool
    where
        M: StoreItem,
    {
        let len = self.len();
        if len >= C {
            return false;
        }

        let offset = S::SIZE + len * M::SIZE;
        self.meta
            .item
            .store(item, &mut self.bytes[offset..offset + M::SIZE]);
        S::write_len(len + 1, self.bytes);
        true
    }
}
