//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! This module defines the driver surface a platform must provide for
//! the serial adapter: line parameters, pin routing, driver
//! install/release, baud changes and non-blocking byte transfer, plus
//! optional status and control-line functions advertised through
//! [`Capabilities`].

use core::ffi::CStr;
use core::fmt;
use core::num::NonZeroU8;

use bitflags::bitflags;

/// Physical UART instance.
///
/// Stored as `index + 1` so that an all-zero byte means "no channel".
/// This keeps `Option<Channel>` one byte wide with `None == 0`.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Channel(NonZeroU8);

impl Channel {
    /// Highest representable channel index.
    pub const MAX_INDEX: u8 = u8::MAX - 1;

    /// Channel for a zero-based UART index.
    pub const fn new(index: u8) -> Option<Self> {
        match NonZeroU8::new(index.wrapping_add(1)) {
            Some(slot) => Some(Self(slot)),
            None => None,
        }
    }

    /// Zero-based UART index.
    pub const fn index(self) -> u8 {
        self.0.get() - 1
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UART{}", self.index())
    }
}

/// Serial line parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Character framing.
    pub framing: Framing,
}

impl SerialConfig {
    /// 8N1 at the given baud rate.
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            framing: Framing::EIGHT_N_ONE,
        }
    }
}

impl Default for SerialConfig {
    /// XBee factory default: 9600 baud, 8N1.
    fn default() -> Self {
        Self::new_8n1(9600)
    }
}

/// Character framing: data bits, parity and stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Framing {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Framing {
    /// 8 data bits, no parity, 1 stop bit.
    pub const EIGHT_N_ONE: Self = Self {
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for Framing {
    fn default() -> Self {
        Self::EIGHT_N_ONE
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit.
    One,
    /// Two stop bits.
    Two,
}

/// GPIO routing for one UART.
///
/// Pins are platform GPIO numbers. `rts`/`cts` stay unrouted when `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinAssignment {
    pub tx: u8,
    pub rx: u8,
    pub rts: Option<u8>,
    pub cts: Option<u8>,
}

impl PinAssignment {
    /// TX/RX only, no hardware flow-control lines.
    pub const fn tx_rx(tx: u8, rx: u8) -> Self {
        Self {
            tx,
            rx,
            rts: None,
            cts: None,
        }
    }

    /// Route RTS and CTS as well.
    pub const fn with_flow_control(self, rts: u8, cts: u8) -> Self {
        Self {
            rts: Some(rts),
            cts: Some(cts),
            ..self
        }
    }
}

/// Driver buffer sizes in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferSizes {
    pub rx: usize,
    pub tx: usize,
}

impl BufferSizes {
    pub const fn new(rx: usize, tx: usize) -> Self {
        Self { rx, tx }
    }
}

bitflags! {
    /// Status queries and control functions a channel really implements.
    ///
    /// Anything not listed is answered with a fixed stand-in value by
    /// the serial adapter.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Transmit queue occupancy is measured.
        const TX_LEVEL = 1 << 0;
        /// Receive queue occupancy is measured.
        const RX_LEVEL = 1 << 1;
        /// Pending transmit data can be discarded.
        const TX_FLUSH = 1 << 2;
        /// Pending receive data can be discarded.
        const RX_FLUSH = 1 << 3;
        /// A break condition can be driven on TX.
        const BREAK = 1 << 4;
        /// Hardware RTS/CTS flow control can be toggled.
        const FLOW_CONTROL = 1 << 5;
        /// RTS can be driven manually.
        const RTS = 1 << 6;
        /// CTS can be sampled.
        const CTS = 1 << 7;
    }
}

/// UART driver errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartError {
    /// A parameter was rejected (baud rate, framing, pins, buffer sizes).
    InvalidArgument,
    /// The channel does not exist on this controller.
    InvalidChannel,
    /// The driver is not installed on the channel.
    NotInstalled,
    /// The driver is already installed on the channel.
    AlreadyInstalled,
    /// The function is not available on this channel.
    Unsupported,
    /// The peripheral reported a fault.
    Hardware,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            UartError::InvalidArgument => "invalid argument",
            UartError::InvalidChannel => "no such channel",
            UartError::NotInstalled => "driver not installed",
            UartError::AlreadyInstalled => "driver already installed",
            UartError::Unsupported => "not supported",
            UartError::Hardware => "hardware fault",
        };
        f.write_str(msg)
    }
}

/// UART controller trait.
///
/// One controller owns every UART instance of a platform. Methods that
/// move data never block: they transfer what fits right now and report
/// the count. Waiting is the caller's business.
pub trait UartController {
    /// Number of channels; valid indices are `0..channel_count()`.
    fn channel_count(&self) -> u8;

    /// Human-readable label for a channel.
    fn port_name(&self, channel: Channel) -> Option<&'static CStr>;

    /// Program line parameters. Called before [`install`](Self::install).
    fn configure(&mut self, channel: Channel, config: SerialConfig) -> Result<(), UartError>;

    /// Route the channel to GPIO pins.
    fn set_pins(&mut self, channel: Channel, pins: PinAssignment) -> Result<(), UartError>;

    /// Install the buffered driver and enable the channel.
    fn install(&mut self, channel: Channel, buffers: BufferSizes) -> Result<(), UartError>;

    /// Disable the channel and release its driver.
    fn uninstall(&mut self, channel: Channel) -> Result<(), UartError>;

    /// Whether the driver is currently installed on `channel`.
    fn is_installed(&self, channel: Channel) -> bool;

    /// Change the line speed of an installed channel.
    fn set_baud_rate(&mut self, channel: Channel, baud_rate: u32) -> Result<(), UartError>;

    /// Queue as many bytes as fit; returns how many were accepted.
    fn try_write(&mut self, channel: Channel, bytes: &[u8]) -> Result<usize, UartError>;

    /// Take as many received bytes as are ready; returns how many were copied.
    fn try_read(&mut self, channel: Channel, buffer: &mut [u8]) -> Result<usize, UartError>;

    /// Functions this channel really implements.
    fn capabilities(&self, _channel: Channel) -> Capabilities {
        Capabilities::empty()
    }

    /// Bytes waiting in the transmit queue.
    fn tx_used(&self, _channel: Channel) -> Option<usize> {
        None
    }

    /// Room left in the transmit queue.
    fn tx_free(&self, _channel: Channel) -> Option<usize> {
        None
    }

    /// Bytes waiting in the receive queue.
    fn rx_used(&self, _channel: Channel) -> Option<usize> {
        None
    }

    /// Room left in the receive queue.
    fn rx_free(&self, _channel: Channel) -> Option<usize> {
        None
    }

    /// Discard pending transmit data.
    fn flush_tx(&mut self, _channel: Channel) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Discard pending receive data.
    fn flush_rx(&mut self, _channel: Channel) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Drive (or release) a break condition on TX.
    fn set_break(&mut self, _channel: Channel, _enabled: bool) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Enable or disable hardware RTS/CTS flow control.
    fn set_flow_control(&mut self, _channel: Channel, _enabled: bool) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Assert or deassert RTS.
    fn set_rts(&mut self, _channel: Channel, _asserted: bool) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Sample CTS; `None` when the line is not wired.
    fn cts(&self, _channel: Channel) -> Option<bool> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_round_trips_index() {
        assert_eq!(Channel::new(0).map(Channel::index), Some(0));
        assert_eq!(Channel::new(2).map(Channel::index), Some(2));
        assert_eq!(Channel::new(Channel::MAX_INDEX).map(Channel::index), Some(254));
        assert_eq!(Channel::new(u8::MAX), None);
    }

    #[test]
    fn absent_channel_is_a_zero_byte() {
        assert_eq!(core::mem::size_of::<Option<Channel>>(), 1);
        let none: Option<Channel> = None;
        // SAFETY: Option<Channel> is a transparent NonZeroU8 niche.
        let raw: u8 = unsafe { core::mem::transmute(none) };
        assert_eq!(raw, 0);
    }

    #[test]
    fn default_config_is_xbee_factory_setting() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.framing, Framing::EIGHT_N_ONE);
    }
}
