//! Core value types shared by the host and engine sides.
//!
//! Time is engine microseconds (i64); formats are the host's enumerations
//! together with the engine codec tags they translate to.

pub mod format;
pub mod time;

pub use format::{AudioFormat, FourCC, ImageFormat, Negotiated};
pub use time::{Micros, PtsClock};
