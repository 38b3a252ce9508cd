//! Nested Schemas

use std::marker::PhantomData;

use crate::meta::FieldMeta;
use crate::proxy::Proxy;

/// A schema declared with the `schema!` macro, usable as a nested field.
///
/// Implemented by the `Schema` marker type each declaration generates.
pub trait SchemaType {
    /// Sum of the schema's field sizes.
    const SIZE: usize;

    /// Declared storage footprint; `SIZE <= CAPACITY`, and the bytes in
    /// `[SIZE, CAPACITY)` are reserved.
    const CAPACITY: usize;

    /// The generated view type.
    type View<'a>;

    fn view<'a>(bytes: &'a mut [u8]) -> Self::View<'a>;

    fn reset(bytes: &mut [u8]);
}

/// A field embedding another schema's buffer region.
///
/// The footprint is the inner schema's full `CAPACITY`, so an embedded
/// schema keeps its reserved bytes.
#[derive(Debug, Clone, Copy)]
pub struct NestedMeta<S> {
    _schema: PhantomData<S>,
}

impl<S> NestedMeta<S> {
    pub const fn new() -> Self {
        Self {
            _schema: PhantomData,
        }
    }
}

impl<S> Default for NestedMeta<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SchemaType> FieldMeta for NestedMeta<S> {
    const SIZE: usize = S::CAPACITY;

    fn reset(&self, bytes: &mut [u8]) {
        S::reset(bytes);
    }
}

impl<'a, S: SchemaType> Proxy<'a, NestedMeta<S>> {
    /// View of the embedded schema over this field's bytes.
    pub fn view(&mut self) -> S::View<'_> {
        S::view(self.bytes)
    }
}
