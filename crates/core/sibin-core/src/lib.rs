//! Shared services for the sibin crates.
//!
//! - [`log`]: leveled logging facade with a pluggable sink.
//! - [`cursor`]: bounds-checked little-endian byte cursor.

#![cfg_attr(not(test), no_std)]

pub mod cursor;
pub mod log;

pub use cursor::ByteReader;
pub use log::{LogFn, LogLevel};
