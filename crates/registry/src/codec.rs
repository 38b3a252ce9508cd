//! Struct Field Serialization

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::meta::{FieldMeta, StoreItem};
use crate::proxy::Proxy;

/// Serializer for a struct field.
///
/// Custom implementations control the wire layout, including endianness
/// when a schema buffer crosses device families.
pub trait Codec {
    /// The in-memory value this codec serializes.
    type Value: Copy;

    /// Serialized footprint, in bytes.
    const SIZE: usize;

    fn encode(v: Self::Value, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Self::Value;
}

/// Default byte-for-byte serializer for plain-old-data values.
pub struct PodCodec<T>(PhantomData<T>);

impl<T: Pod> Codec for PodCodec<T> {
    type Value = T;
    const SIZE: usize = std::mem::size_of::<T>();

    fn encode(v: T, out: &mut [u8]) {
        out.copy_from_slice(bytemuck::bytes_of(&v));
    }

    fn decode(bytes: &[u8]) -> T {
        bytemuck::pod_read_unaligned(bytes)
    }
}

/// A user struct serialized through `C`; byte-for-byte copy by default.
#[derive(Debug, Clone, Copy)]
pub struct StructMeta<T, C = PodCodec<T>> {
    pub default: T,
    _codec: PhantomData<C>,
}

impl<T, C> StructMeta<T, C> {
    pub const fn new(default: T) -> Self {
        Self {
            default,
            _codec: PhantomData,
        }
    }
}

impl<T: Copy, C: Codec<Value = T>> FieldMeta for StructMeta<T, C> {
    const SIZE: usize = C::SIZE;

    fn reset(&self, bytes: &mut [u8]) {
        C::encode(self.default, bytes);
    }
}

impl<T: Copy, C: Codec<Value = T>> StoreItem for StructMeta<T, C> {
    type Item<'v> = T;

    fn store(&self, item: T, bytes: &mut [u8]) {
        C::encode(item, bytes);
    }
}

impl<'a, T: Copy, C: Codec<Value = T>> Proxy<'a, StructMeta<T, C>> {
    pub fn get(&self) -> T {
        C::decode(self.bytes)
    }

    pub fn set(&mut self, v: T) {
        self.meta.store(v, self.bytes);
    }
}
