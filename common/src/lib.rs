//! Shared definitions for the XBee port layer.
//!
//! - [`errno`]: result codes surfaced to the portable core
//! - [`time`]: tick and wall-clock unit conversions

#![no_std]

pub mod errno;
pub mod time;

pub use errno::{PortError, PortResult};
