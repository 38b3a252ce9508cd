//! Field Proxies
//!
//! A proxy is a short-lived borrow of one field's byte range plus a
//! reference to its meta descriptor. Access methods (`get`, `set`, `at`,
//! `push_back`, ...) are provided per meta kind next to the meta's own
//! definition.

use crate::meta::FieldMeta;

/// Short-lived view of a single field within a schema's byte buffer.
pub struct Proxy<'a, M: FieldMeta> {
    pub(crate) meta: &'a M,
    pub(crate) bytes: &'a mut [u8],
}

impl<'a, M: FieldMeta> Proxy<'a, M> {
    /// Build a proxy over the field at the start of `bytes`.
    ///
    /// `bytes` must be at least `M::SIZE` long; the proxy narrows its
    /// borrow to exactly the field's footprint.
    pub fn new(meta: &'a M, bytes: &'a mut [u8]) -> Self {
        Self {
            meta,
            bytes: &mut bytes[..M::SIZE],
        }
    }

    /// The field's meta descriptor.
    pub fn meta(&self) -> &M {
        self.meta
    }

    /// Restore the field to its declared default.
    pub fn reset(&mut self) {
        self.meta.reset(self.bytes);
    }
}
