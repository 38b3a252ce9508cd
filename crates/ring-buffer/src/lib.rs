//! Lock-Free Ring Buffer
//!
//! Provides a single-producer, single-consumer ring buffer over a fixed
//! power-of-two slot array, with element-wise, bulk, overwrite and
//! zero-copy access.

mod buffer;

pub use buffer::SpscRing;
