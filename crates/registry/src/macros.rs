//! Schema Declaration Macro

/// Declare a schema as a module.
///
/// The declaration lists named fields with their meta values in wire
/// order and supplies a storage `capacity`. It expands to a module
/// containing:
///
/// - `SIZE`, `CAPACITY`, `FIELD_COUNT`, `FIELD_SIZES`, and the `Field`
///   index enum, plus `field_size(index)` and `offset(index)` lookups;
/// - `View<'a>`, a structured view with one accessor method per field and
///   a cascading `reset`, built over a caller-supplied buffer with
///   `view(bytes)`;
/// - `Buffer`, owned storage of `CAPACITY` bytes initialized by `reset`;
/// - `Schema`, a marker type implementing [`SchemaType`](crate::SchemaType)
///   so the schema can be embedded elsewhere through
///   [`NestedMeta`](crate::NestedMeta).
///
/// Declaring a schema whose field sizes sum past `capacity` fails to
/// compile. The names `reset`, `view` and `as_bytes` are taken by
/// generated members and cannot be used as field names.
///
/// ```
/// registry::schema! {
///     /// Persistent device settings.
///     pub settings(capacity = 30) {
///         brightness: registry::U8Meta = registry::U8Meta::new(0, 100, 80),
///         title: registry::StringMeta<16> = registry::StringMeta::new("untitled"),
///     }
/// }
///
/// let mut buf = settings::Buffer::new();
/// let mut view = buf.view();
/// view.brightness().set(120);
/// assert_eq!(view.brightness().get(), 100); // clamped to the range
/// assert_eq!(view.title().get(), "untitled");
/// ```
#[macro_export]
macro_rules! schema {
    (
        $(#[$attr:meta])*
        $vis:vis $name:ident(capacity = $capacity:expr) {
            $($field:ident : $meta_ty:ty = $meta:expr),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis mod $name {
            #![allow(unused_imports)]
            use super::*;

            /// Marker type for embedding this schema as a nested field.
            pub struct Schema;

            /// The declared meta descriptors, one member per field.
            pub struct Fields {
                $(pub $field: $meta_ty,)+
            }

            pub static FIELDS: Fields = Fields {
                $($field: $meta,)+
            };

            /// Field indices in declaration order.
            #[allow(non_camel_case_types)]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            #[repr(usize)]
            pub enum Field {
                $($field,)+
            }

            pub const FIELD_COUNT: usize = [$($crate::__field_unit!($field)),+].len();

            /// Byte footprint of each field in declaration order.
            pub const FIELD_SIZES: [usize; FIELD_COUNT] = [
                $(<$meta_ty as $crate::FieldMeta>::SIZE,)+
            ];

            /// Sum of all field sizes.
            pub const SIZE: usize = {
                let mut total = 0;
                let mut i = 0;
                while i < FIELD_COUNT {
                    total += FIELD_SIZES[i];
                    i += 1;
                }
                total
            };

            /// Declared storage footprint. Bytes in `[SIZE, CAPACITY)` are
            /// reserved and never touched by field access or `reset`.
            pub const CAPACITY: usize = $capacity;

            const _: () = assert!(SIZE <= CAPACITY, "schema size exceeds declared capacity");

            /// Byte footprint of the field at `index`.
            pub const fn field_size(index: usize) -> usize {
                FIELD_SIZES[index]
            }

            /// Byte offset of the field at `index` (prefix sum of sizes).
            pub const fn offset(index: usize) -> usize {
                let mut off = 0;
                let mut i = 0;
                while i < index {
                    off += FIELD_SIZES[i];
                    i += 1;
                }
                off
            }

            /// Structured view over a caller-supplied byte buffer.
            pub struct View<'a> {
                bytes: &'a mut [u8],
            }

            impl<'a> View<'a> {
                $(
                    pub fn $field(&mut self) -> $crate::Proxy<'_, $meta_ty> {
                        let off = offset(Field::$field as usize);
                        $crate::Proxy::new(&FIELDS.$field, &mut self.bytes[off..])
                    }
                )+

                /// Reset every field to its declared default, in
                /// declaration order.
                pub fn reset(&mut self) {
                    $(self.$field().reset();)+
                }

                /// The viewed bytes; the first `SIZE` hold the fields.
                pub fn as_bytes(&self) -> &[u8] {
                    self.bytes
                }
            }

            /// Create a view over `bytes` (at least `SIZE` long).
            pub fn view(bytes: &mut [u8]) -> View<'_> {
                assert!(bytes.len() >= SIZE, "buffer smaller than schema size");
                View { bytes }
            }

            impl $crate::SchemaType for Schema {
                const SIZE: usize = SIZE;
                const CAPACITY: usize = CAPACITY;
                type View<'a> = View<'a>;

                fn view<'a>(bytes: &'a mut [u8]) -> View<'a> {
                    view(bytes)
                }

                fn reset(bytes: &mut [u8]) {
                    view(bytes).reset();
                }
            }

            /// Owned backing storage of `CAPACITY` bytes.
            pub struct Buffer {
                bytes: [u8; CAPACITY],
            }

            impl Buffer {
                /// Zeroed storage with every field reset to its default.
                pub fn new() -> Self {
                    let mut buffer = Self {
                        bytes: [0; CAPACITY],
                    };
                    buffer.view().reset();
                    buffer
                }

                pub fn view(&mut self) -> View<'_> {
                    view(&mut self.bytes)
                }

                pub fn as_bytes(&self) -> &[u8] {
                    &self.bytes
                }

                pub fn as_mut_bytes(&mut self) -> &mut [u8] {
                    &mut self.bytes
                }
            }

            impl Default for Buffer {
                fn default() -> Self {
                    Self::new()
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_unit {
    ($x:ident) => {
        ()
    };
}
