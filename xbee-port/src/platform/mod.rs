//! Platform Abstraction Layer
//!
//! Each supported board implements [`Platform`], handing the port layer
//! its tick source, its UART controller and the default binding of the
//! XBee to a UART. The board is picked by cargo feature.
//!
//! # Usage
//!
//! ```no_run
//! use xbee_port::platform::{CurrentPlatform, Platform};
//!
//! unsafe { CurrentPlatform::early_init() };
//! let clock = unsafe { CurrentPlatform::clock() };
//! let uart = unsafe { CurrentPlatform::uart() };
//! ```

use crate::config::PortConfig;
use crate::hal::serial::UartController;
use crate::hal::timer::TickSource;

/// Platform trait - implemented by each supported platform
pub trait Platform {
    /// UART controller owning every UART of the board.
    type Uart: UartController + Send;

    /// Free-running tick counter.
    type Clock: TickSource + Clone + Send + Sync;

    /// Platform name for debugging
    fn name() -> &'static str;

    /// Early platform initialization
    ///
    /// # Safety
    /// Must only be called once, before any clock or UART is created.
    unsafe fn early_init();

    /// Create the tick source.
    ///
    /// # Safety
    /// Must only be called after `early_init()`.
    unsafe fn clock() -> Self::Clock;

    /// Create the UART controller.
    ///
    /// # Safety
    /// Must only be called after `early_init()`, and at most once.
    unsafe fn uart() -> Self::Uart;

    /// Where the XBee is wired on this board.
    fn default_port_config() -> PortConfig;
}

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "bcm2835")] {
        pub mod bcm2835;
        pub use bcm2835::Bcm2835Platform as CurrentPlatform;
    } else if #[cfg(feature = "host")] {
        pub mod host;
        pub use host::HostPlatform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features bcm2835\n\
            Or:  cargo build --no-default-features --features host,ffi"
        );
    }
}

// Ensure only one platform is selected
#[cfg(all(feature = "bcm2835", feature = "host"))]
compile_error!("Multiple platforms selected! Choose only one: bcm2835 OR host");
