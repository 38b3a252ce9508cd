//! Signal Smoothing Filters
//!
//! Provides adaptive low-pass smoothing for de-jittering interactive and
//! sensor input signals.

mod one_euro;

pub use one_euro::{low_pass, OneEuroConfig, OneEuroFilter};
