//! XBee Platform Port Layer
//!
//! Binds the portable XBee driver core to a board's timer and UART
//! services. The core (framing, AT commands, retries) lives elsewhere;
//! this crate gives it elapsed-time readings and a byte-stream
//! transport over one UART, through a C ABI.
//!
//! # Module Organization
//!
//! - [`hal`]: Traits for the native UART and tick services
//! - [`peripheral`]: Reusable UART drivers (PL011, loopback)
//! - [`platform`]: Board bindings, selected by cargo feature
//! - [`timer`]: Seconds/milliseconds timer adapter
//! - [`serial`]: Serial handle and serial adapter
//! - [`config`]: Port configuration
//! - [`ffi`]: `xbee_*` C functions
//!
//! # Usage Example
//!
//! ```no_run
//! use xbee_port::platform::{CurrentPlatform, Platform};
//! use xbee_port::serial::{SerialAdapter, SerialHandle};
//!
//! let (uart, clock) = unsafe {
//!     CurrentPlatform::early_init();
//!     (CurrentPlatform::uart(), CurrentPlatform::clock())
//! };
//! let mut port = SerialAdapter::new(uart, clock, CurrentPlatform::default_port_config());
//! let mut handle = SerialHandle::new();
//! port.open(&mut handle, 9600)?;
//! port.write(&handle, b"+++")?;
//! # Ok::<(), xbee_port::PortError>(())
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(all(feature = "host", not(test)))]
extern crate std;

pub mod config;
pub mod ffi;
pub mod hal;
pub mod peripheral;
pub mod platform;
pub mod serial;
pub mod timer;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use common::errno::{PortError, PortResult};
pub use config::PortConfig;
pub use hal::serial::{Capabilities, Channel, SerialConfig, UartController};
pub use hal::timer::TickSource;
pub use serial::{Reading, SerialAdapter, SerialHandle};
pub use timer::{Timestamp, TimerAdapter};
