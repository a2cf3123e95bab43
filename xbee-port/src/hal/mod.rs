//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! These traits describe the native driver services the XBee port
//! layer translates onto. Platform and peripheral drivers implement
//! them; the adapters in [`crate::serial`] and [`crate::timer`] only
//! ever talk to these traits.
//!
//! # Available Interfaces
//!
//! - [`serial`]: UART driver control and byte transfer
//! - [`timer`]: Free-running tick counters

pub mod serial;
pub mod timer;
