//! Serial adapter.
//!
//! Translates the byte-stream transport the portable core expects onto
//! a [`UartController`]: open/close/baud lifecycle on a caller-owned
//! [`SerialHandle`], bounded-wait reads and writes, and status and
//! control-line queries that say whether their answer was measured or
//! assumed.
//!
//! Nothing here retries or locks. A failed call leaves the handle as it
//! was and reports a [`PortError`].

use core::ffi::CStr;

use common::errno::{PortError, PortResult};
use log::{debug, warn};

use crate::config::{DEFAULT_IO_TIMEOUT_MS, PortConfig};
use crate::hal::serial::{Capabilities, Channel, UartController, UartError};
use crate::hal::timer::{Deadline, TickSource};

/// Label reported for a handle that is not bound to an open channel.
pub const INVALID_PORT_NAME: &CStr = c"(invalid)";

/// Queue room reported when the driver cannot measure it.
pub const ASSUMED_FREE: usize = 100;

/// Queue occupancy reported when the driver cannot measure it.
pub const ASSUMED_USED: usize = 0;

/// One UART binding, owned by the caller.
///
/// Zero-initialized (`Default`) means closed. The layout is shared with
/// C as `xbee_serial_t`: one byte holding `channel index + 1` (0 while
/// closed) followed by the baud rate.
///
/// Validity is judged by whether the handle's channel is installed, so
/// a copy taken before [`SerialAdapter::close`] turns valid again once
/// any handle reopens that channel. Keep one handle per channel.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SerialHandle {
    channel: Option<Channel>,
    baud_rate: u32,
}

impl SerialHandle {
    /// A closed handle.
    pub const fn new() -> Self {
        Self {
            channel: None,
            baud_rate: 0,
        }
    }

    /// Channel this handle was opened on.
    pub const fn channel(&self) -> Option<Channel> {
        self.channel
    }

    /// Baud rate last applied to the hardware.
    pub const fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

/// A status answer, tagged with where it came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reading<T> {
    /// Read back from the driver.
    Measured(T),
    /// Fixed stand-in; the channel cannot report this.
    Assumed(T),
}

impl<T: Copy> Reading<T> {
    pub fn value(&self) -> T {
        match *self {
            Reading::Measured(v) | Reading::Assumed(v) => v,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Reading::Measured(_))
    }

    fn from_driver(measured: Option<T>, assumed: T) -> Self {
        measured.map_or(Reading::Assumed(assumed), Reading::Measured)
    }
}

fn io_failure(channel: Channel, step: &str, err: UartError) -> PortError {
    warn!("{channel}: {step} failed: {err}");
    PortError::Io
}

/// Serial adapter over a UART controller and a tick source.
pub struct SerialAdapter<U, T> {
    uart: U,
    clock: T,
    defaults: PortConfig,
    io_timeout_ms: u32,
}

impl<U: UartController, T: TickSource> SerialAdapter<U, T> {
    /// Adapter whose [`open`](Self::open) binds according to `defaults`.
    pub fn new(uart: U, clock: T, defaults: PortConfig) -> Self {
        Self {
            uart,
            clock,
            defaults,
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
        }
    }

    /// Set the bounded wait used by reads and writes.
    pub fn with_io_timeout(mut self, timeout_ms: u32) -> Self {
        self.io_timeout_ms = timeout_ms;
        self
    }

    pub fn io_timeout_ms(&self) -> u32 {
        self.io_timeout_ms
    }

    pub fn default_config(&self) -> &PortConfig {
        &self.defaults
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    /// Channel of an open handle.
    fn bound(&self, handle: &SerialHandle) -> PortResult<Channel> {
        match handle.channel {
            Some(ch) if ch.index() < self.uart.channel_count() && self.uart.is_installed(ch) => {
                Ok(ch)
            }
            _ => Err(PortError::InvalidArgument),
        }
    }

    /// True unless `handle` refers to an open channel.
    pub fn is_invalid(&self, handle: &SerialHandle) -> bool {
        self.bound(handle).is_err()
    }

    /// Open `handle` on the default binding at `baud_rate`.
    pub fn open(&mut self, handle: &mut SerialHandle, baud_rate: u32) -> PortResult<()> {
        let config = self.defaults;
        self.open_with(handle, &config, baud_rate)
    }

    /// Open `handle` on the binding described by `config`.
    ///
    /// Applies line parameters, pin routing and driver install in that
    /// order. The handle is only touched once all three succeed.
    pub fn open_with(
        &mut self,
        handle: &mut SerialHandle,
        config: &PortConfig,
        baud_rate: u32,
    ) -> PortResult<()> {
        if !self.is_invalid(handle) {
            return Err(PortError::InvalidArgument);
        }
        let channel = Channel::new(config.channel)
            .filter(|ch| ch.index() < self.uart.channel_count())
            .ok_or(PortError::InvalidArgument)?;

        if self.uart.is_installed(channel) {
            warn!("{channel}: already in use");
            return Err(PortError::Io);
        }

        self.uart
            .configure(channel, config.serial_config(baud_rate))
            .map_err(|e| io_failure(channel, "configure", e))?;
        self.uart
            .set_pins(channel, config.pins)
            .map_err(|e| io_failure(channel, "pin assignment", e))?;
        self.uart
            .install(channel, config.buffers)
            .map_err(|e| io_failure(channel, "driver install", e))?;

        handle.channel = Some(channel);
        handle.baud_rate = baud_rate;
        debug!(
            "{channel}: open at {baud_rate} baud, tx={} rx={}",
            config.pins.tx, config.pins.rx
        );
        Ok(())
    }

    /// Release the driver and mark `handle` closed.
    pub fn close(&mut self, handle: &mut SerialHandle) -> PortResult<()> {
        let channel = self.bound(handle)?;
        match self.uart.uninstall(channel) {
            Ok(()) => {
                handle.channel = None;
                debug!("{channel}: closed");
                Ok(())
            }
            Err(UartError::InvalidArgument | UartError::InvalidChannel | UartError::NotInstalled) => {
                Err(PortError::InvalidArgument)
            }
            Err(e) => Err(io_failure(channel, "driver release", e)),
        }
    }

    /// Change the line speed of an open handle.
    ///
    /// The stored baud rate only changes if the hardware accepted it.
    pub fn set_baud_rate(&mut self, handle: &mut SerialHandle, baud_rate: u32) -> PortResult<()> {
        let channel = self.bound(handle)?;
        match self.uart.set_baud_rate(channel, baud_rate) {
            Ok(()) => {
                handle.baud_rate = baud_rate;
                debug!("{channel}: baud rate now {baud_rate}");
                Ok(())
            }
            Err(UartError::InvalidArgument) => Err(PortError::InvalidArgument),
            Err(e) => Err(io_failure(channel, "baud change", e)),
        }
    }

    /// Queue `bytes` for transmission, waiting up to the I/O timeout for
    /// room. Returns how many were accepted; the caller retries the rest.
    pub fn write(&mut self, handle: &SerialHandle, bytes: &[u8]) -> PortResult<usize> {
        let channel = self.bound(handle)?;
        if bytes.is_empty() {
            return Ok(0);
        }

        let deadline = Deadline::after(&self.clock, self.io_timeout_ms);
        let mut sent = 0;
        loop {
            sent += self
                .uart
                .try_write(channel, &bytes[sent..])
                .map_err(|e| io_failure(channel, "write", e))?;
            if sent == bytes.len() || deadline.expired(&self.clock) {
                return Ok(sent);
            }
            core::hint::spin_loop();
        }
    }

    /// Queue exactly one byte, without waiting.
    pub fn put_char(&mut self, handle: &SerialHandle, byte: u8) -> PortResult<()> {
        let channel = self.bound(handle)?;
        match self.uart.try_write(channel, &[byte]) {
            Ok(1) => Ok(()),
            _ => Err(PortError::NoSpace),
        }
    }

    /// Copy received bytes into `buffer`.
    ///
    /// Waits up to the I/O timeout for the first byte, then takes
    /// whatever else is already there. Returns 0 if nothing arrived.
    pub fn read(&mut self, handle: &SerialHandle, buffer: &mut [u8]) -> PortResult<usize> {
        let channel = self.bound(handle)?;
        if buffer.is_empty() {
            return Ok(0);
        }

        let deadline = Deadline::after(&self.clock, self.io_timeout_ms);
        let mut received = 0;
        loop {
            let got = self
                .uart
                .try_read(channel, &mut buffer[received..])
                .map_err(|e| io_failure(channel, "read", e))?;
            received += got;
            if received == buffer.len()
                || (received > 0 && got == 0)
                || deadline.expired(&self.clock)
            {
                return Ok(received);
            }
            core::hint::spin_loop();
        }
    }

    /// Next received byte, waiting up to the I/O timeout.
    pub fn get_char(&mut self, handle: &SerialHandle) -> PortResult<u8> {
        let mut byte = [0u8; 1];
        match self.read(handle, &mut byte) {
            Ok(1) => Ok(byte[0]),
            Err(PortError::InvalidArgument) => Err(PortError::InvalidArgument),
            _ => Err(PortError::NoData),
        }
    }

    /// Which status queries and controls are real on this handle.
    pub fn capabilities(&self, handle: &SerialHandle) -> Capabilities {
        self.bound(handle)
            .map_or(Capabilities::empty(), |ch| self.uart.capabilities(ch))
    }

    fn level(
        &self,
        handle: &SerialHandle,
        query: impl FnOnce(&U, Channel) -> Option<usize>,
        assumed: usize,
    ) -> Reading<usize> {
        let measured = self.bound(handle).ok().and_then(|ch| query(&self.uart, ch));
        Reading::from_driver(measured, assumed)
    }

    pub fn tx_free(&self, handle: &SerialHandle) -> Reading<usize> {
        self.level(handle, U::tx_free, ASSUMED_FREE)
    }

    pub fn tx_used(&self, handle: &SerialHandle) -> Reading<usize> {
        self.level(handle, U::tx_used, ASSUMED_USED)
    }

    pub fn rx_free(&self, handle: &SerialHandle) -> Reading<usize> {
        self.level(handle, U::rx_free, ASSUMED_FREE)
    }

    pub fn rx_used(&self, handle: &SerialHandle) -> Reading<usize> {
        self.level(handle, U::rx_used, ASSUMED_USED)
    }

    /// Run a control request; returns whether the hardware applied it.
    fn control(
        &mut self,
        handle: &SerialHandle,
        what: &str,
        request: impl FnOnce(&mut U, Channel) -> Result<(), UartError>,
    ) -> bool {
        let Ok(channel) = self.bound(handle) else {
            return false;
        };
        match request(&mut self.uart, channel) {
            Ok(()) => true,
            Err(UartError::Unsupported) => {
                debug!("{channel}: {what} not supported, ignored");
                false
            }
            Err(e) => {
                warn!("{channel}: {what} failed: {e}");
                false
            }
        }
    }

    /// Discard queued transmit data.
    pub fn flush_tx(&mut self, handle: &SerialHandle) -> bool {
        self.control(handle, "tx flush", |uart, ch| uart.flush_tx(ch))
    }

    /// Discard received data.
    pub fn flush_rx(&mut self, handle: &SerialHandle) -> bool {
        self.control(handle, "rx flush", |uart, ch| uart.flush_rx(ch))
    }

    pub fn set_break(&mut self, handle: &SerialHandle, enabled: bool) -> bool {
        self.control(handle, "break", |uart, ch| uart.set_break(ch, enabled))
    }

    pub fn set_flow_control(&mut self, handle: &SerialHandle, enabled: bool) -> bool {
        self.control(handle, "flow control", |uart, ch| {
            uart.set_flow_control(ch, enabled)
        })
    }

    pub fn set_rts(&mut self, handle: &SerialHandle, asserted: bool) -> bool {
        self.control(handle, "rts", |uart, ch| uart.set_rts(ch, asserted))
    }

    /// Clear-to-send; assumed asserted where CTS is not wired.
    pub fn cts(&self, handle: &SerialHandle) -> Reading<bool> {
        let sampled = self.bound(handle).ok().and_then(|ch| self.uart.cts(ch));
        Reading::from_driver(sampled, true)
    }

    /// Label of the bound channel, or [`INVALID_PORT_NAME`].
    pub fn port_name_cstr(&self, handle: &SerialHandle) -> &'static CStr {
        self.bound(handle)
            .ok()
            .and_then(|ch| self.uart.port_name(ch))
            .unwrap_or(INVALID_PORT_NAME)
    }

    pub fn port_name(&self, handle: &SerialHandle) -> &'static str {
        self.port_name_cstr(handle).to_str().unwrap_or("(invalid)")
    }
}
