//! Port configuration.
//!
//! Everything the adapter needs to bring one UART up besides the baud
//! rate: which channel, which pins, how large the driver buffers are
//! and the character framing.

use crate::hal::serial::{BufferSizes, Framing, PinAssignment, SerialConfig};

/// Resolution of the millisecond timer, in milliseconds.
pub const MS_TIMER_RESOLUTION: u32 = 1;

/// Offset between the platform epoch and the ZCL epoch (2000-01-01), in seconds.
pub const ZCL_TIME_EPOCH_DELTA: u32 = 0;

/// Default bounded wait for reads and writes, in milliseconds.
pub const DEFAULT_IO_TIMEOUT_MS: u32 = 10;

/// Default driver buffer size, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Static description of one UART binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Zero-based UART index.
    pub channel: u8,
    /// GPIO routing.
    pub pins: PinAssignment,
    /// Driver buffer sizes.
    pub buffers: BufferSizes,
    /// Character framing; XBee radios use 8N1.
    pub framing: Framing,
}

impl PortConfig {
    /// 8N1 on `channel` with the given pins and default buffers.
    pub const fn new(channel: u8, pins: PinAssignment) -> Self {
        Self {
            channel,
            pins,
            buffers: BufferSizes::new(DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE),
            framing: Framing::EIGHT_N_ONE,
        }
    }

    pub const fn with_buffers(self, rx: usize, tx: usize) -> Self {
        Self {
            buffers: BufferSizes::new(rx, tx),
            ..self
        }
    }

    pub const fn with_framing(self, framing: Framing) -> Self {
        Self { framing, ..self }
    }

    /// Line parameters for the driver at `baud_rate`.
    pub const fn serial_config(&self, baud_rate: u32) -> SerialConfig {
        SerialConfig {
            baud_rate,
            framing: self.framing,
        }
    }
}
