//! Peripheral Drivers
//!
//! Drivers for UART peripherals that can be found across different
//! platforms.
//!
//! # Available Peripherals
//!
//! - [`pl011`]: ARM PrimeCell PL011 UART
//! - [`loopback`]: Software UART with TX wired to RX

pub mod loopback;
pub mod pl011;
