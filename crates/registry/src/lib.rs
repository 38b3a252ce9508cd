//! Typed Byte-Buffer Registry
//!
//! Compile-time-declared schemas layering a structured, value-constrained
//! view over raw byte buffers. A schema is declared once with the
//! [`schema!`] macro; each field carries a meta descriptor that enforces
//! range clamping, enum bounds, list capacity or fixed-size string
//! termination on every write. Reads return the raw stored value.
//!
//! Field offsets are the prefix sum of the declared field sizes, so two
//! views over the same buffer are perfectly aliased and the wire layout is
//! stable as long as the declaration order is.

mod codec;
mod composite;
mod meta;
mod nested;
mod proxy;
mod text;

#[macro_use]
mod macros;

pub use codec::{Codec, PodCodec, StructMeta};
pub use composite::{ArrayMeta, LenPrefix, ListMeta};
pub use meta::{BoolMeta, Enum8, Enum8Meta, FieldMeta, I8Meta, StoreItem, U8Meta};
pub use nested::{NestedMeta, SchemaType};
pub use proxy::Proxy;
pub use text::StringMeta;
