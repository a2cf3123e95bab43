//! BCM2835 UART controller.
//!
//! Exposes the PL011 (UART0) as channel 0. The mini UART is not
//! supported: its baud rate follows the VPU core clock.

use core::ffi::CStr;

use super::gpio::{self, Function, Pull};
use crate::hal::serial::{
    BufferSizes, Capabilities, Channel, PinAssignment, SerialConfig, UartController, UartError,
};
use crate::peripheral::pl011::Pl011;

/// PL011 base address.
pub const UART0_BASE: usize = super::PERIPHERAL_BASE + 0x20_1000;

const NAMES: [&CStr; 1] = [c"UART0"];

/// TX/RX pin pairs that can carry UART0, with their mux setting.
const DATA_ROUTES: [(u8, u8, Function); 3] = [
    (14, 15, Function::Alt0),
    (32, 33, Function::Alt3),
    (36, 37, Function::Alt2),
];

/// RTS/CTS pin pairs that can carry UART0 flow control.
const FLOW_ROUTES: [(u8, u8, Function); 2] = [(17, 16, Function::Alt3), (31, 30, Function::Alt3)];

fn data_route(pins: &PinAssignment) -> Option<Function> {
    DATA_ROUTES
        .iter()
        .find(|(tx, rx, _)| *tx == pins.tx && *rx == pins.rx)
        .map(|&(_, _, func)| func)
}

fn flow_route(rts: u8, cts: u8) -> Option<Function> {
    FLOW_ROUTES
        .iter()
        .find(|(r, c, _)| *r == rts && *c == cts)
        .map(|&(_, _, func)| func)
}

/// UART controller for the BCM2835.
pub struct Bcm2835Uart {
    uart0: Pl011,
    config: Option<SerialConfig>,
    pins: Option<PinAssignment>,
    installed: bool,
}

impl Bcm2835Uart {
    /// # Safety
    ///
    /// UART and GPIO registers must be properly mapped, and only one
    /// controller may exist.
    pub const unsafe fn new() -> Self {
        Self {
            uart0: unsafe { Pl011::new(UART0_BASE) },
            config: None,
            pins: None,
            installed: false,
        }
    }

    fn check(&self, channel: Channel) -> Result<(), UartError> {
        if channel.index() == 0 {
            Ok(())
        } else {
            Err(UartError::InvalidChannel)
        }
    }

    fn check_installed(&self, channel: Channel) -> Result<(), UartError> {
        self.check(channel)?;
        if self.installed {
            Ok(())
        } else {
            Err(UartError::NotInstalled)
        }
    }

    fn has_flow_lines(&self) -> bool {
        self.pins.is_some_and(|p| p.rts.is_some() && p.cts.is_some())
    }
}

impl UartController for Bcm2835Uart {
    fn channel_count(&self) -> u8 {
        NAMES.len() as u8
    }

    fn port_name(&self, channel: Channel) -> Option<&'static CStr> {
        NAMES.get(usize::from(channel.index())).copied()
    }

    fn configure(&mut self, channel: Channel, config: SerialConfig) -> Result<(), UartError> {
        self.check(channel)?;
        if self.installed {
            return Err(UartError::AlreadyInstalled);
        }
        self.uart0.configure(config)?;
        self.config = Some(config);
        Ok(())
    }

    fn set_pins(&mut self, channel: Channel, pins: PinAssignment) -> Result<(), UartError> {
        self.check(channel)?;
        let data = data_route(&pins).ok_or(UartError::InvalidArgument)?;
        let flow = match (pins.rts, pins.cts) {
            (Some(rts), Some(cts)) => {
                Some((rts, cts, flow_route(rts, cts).ok_or(UartError::InvalidArgument)?))
            }
            (None, None) => None,
            _ => return Err(UartError::InvalidArgument),
        };

        let hw = |_| UartError::Hardware;
        gpio::set_function(pins.tx, data).map_err(hw)?;
        gpio::set_pull(pins.tx, Pull::Off).map_err(hw)?;
        gpio::set_function(pins.rx, data).map_err(hw)?;
        gpio::set_pull(pins.rx, Pull::Up).map_err(hw)?;
        if let Some((rts, cts, func)) = flow {
            gpio::set_function(rts, func).map_err(hw)?;
            gpio::set_pull(rts, Pull::Off).map_err(hw)?;
            gpio::set_function(cts, func).map_err(hw)?;
            gpio::set_pull(cts, Pull::Up).map_err(hw)?;
        }

        self.pins = Some(pins);
        Ok(())
    }

    fn install(&mut self, channel: Channel, buffers: BufferSizes) -> Result<(), UartError> {
        self.check(channel)?;
        if self.installed {
            return Err(UartError::AlreadyInstalled);
        }
        if self.config.is_none() || buffers.rx == 0 || buffers.tx == 0 {
            return Err(UartError::InvalidArgument);
        }
        self.uart0.flush_rx();
        self.uart0.set_rts(true);
        self.uart0.enable();
        self.installed = true;
        Ok(())
    }

    fn uninstall(&mut self, channel: Channel) -> Result<(), UartError> {
        self.check_installed(channel)?;
        self.uart0.set_hw_flow_control(false);
        self.uart0.set_break(false);
        self.uart0.disable();
        self.installed = false;
        self.config = None;
        self.pins = None;
        Ok(())
    }

    fn is_installed(&self, channel: Channel) -> bool {
        self.check_installed(channel).is_ok()
    }

    fn set_baud_rate(&mut self, channel: Channel, baud_rate: u32) -> Result<(), UartError> {
        self.check_installed(channel)?;
        self.uart0.set_baud_rate(baud_rate)?;
        if let Some(config) = self.config.as_mut() {
            config.baud_rate = baud_rate;
        }
        Ok(())
    }

    fn try_write(&mut self, channel: Channel, bytes: &[u8]) -> Result<usize, UartError> {
        self.check_installed(channel)?;
        Ok(bytes
            .iter()
            .take_while(|&&byte| self.uart0.try_write_byte(byte))
            .count())
    }

    fn try_read(&mut self, channel: Channel, buffer: &mut [u8]) -> Result<usize, UartError> {
        self.check_installed(channel)?;
        let mut n = 0;
        for slot in buffer.iter_mut() {
            match self.uart0.try_read_byte() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn capabilities(&self, channel: Channel) -> Capabilities {
        if !self.is_installed(channel) {
            return Capabilities::empty();
        }
        let mut caps = Capabilities::RX_FLUSH | Capabilities::BREAK | Capabilities::RTS;
        if self.has_flow_lines() {
            caps |= Capabilities::FLOW_CONTROL | Capabilities::CTS;
        }
        caps
    }

    fn flush_rx(&mut self, channel: Channel) -> Result<(), UartError> {
        self.check_installed(channel)?;
        self.uart0.flush_rx();
        Ok(())
    }

    fn set_break(&mut self, channel: Channel, enabled: bool) -> Result<(), UartError> {
        self.check_installed(channel)?;
        self.uart0.set_break(enabled);
        Ok(())
    }

    fn set_flow_control(&mut self, channel: Channel, enabled: bool) -> Result<(), UartError> {
        self.check_installed(channel)?;
        if !self.has_flow_lines() {
            return Err(UartError::Unsupported);
        }
        self.uart0.set_hw_flow_control(enabled);
        Ok(())
    }

    fn set_rts(&mut self, channel: Channel, asserted: bool) -> Result<(), UartError> {
        self.check_installed(channel)?;
        self.uart0.set_rts(asserted);
        Ok(())
    }

    fn cts(&self, channel: Channel) -> Option<bool> {
        if self.is_installed(channel) && self.has_flow_lines() {
            Some(self.uart0.cts())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_documented_routes_only() {
        assert_eq!(data_route(&PinAssignment::tx_rx(14, 15)), Some(Function::Alt0));
        assert_eq!(data_route(&PinAssignment::tx_rx(32, 33)), Some(Function::Alt3));
        assert_eq!(data_route(&PinAssignment::tx_rx(15, 14)), None);
        assert_eq!(flow_route(17, 16), Some(Function::Alt3));
        assert_eq!(flow_route(16, 17), None);
    }
}
