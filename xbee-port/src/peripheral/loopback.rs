//! Software loopback UART.
//!
//! Every channel's TX line is wired to its own RX line and RTS is wired
//! to CTS, as with a jumper on a header. Bytes queued for transmit move
//! to the receive queue as soon as the receiver has room, the line is
//! not held in break and, with hardware flow control on, RTS is
//! asserted.
//!
//! Faults can be injected per driver step to exercise error paths.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ffi::CStr;

use crate::hal::serial::{
    BufferSizes, Capabilities, Channel, PinAssignment, SerialConfig, UartController, UartError,
};

/// Lowest accepted baud rate.
pub const MIN_BAUD: u32 = 110;
/// Highest accepted baud rate.
pub const MAX_BAUD: u32 = 3_000_000;

/// Driver step that fails once when armed with [`LoopbackUart::inject_fault`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultPoint {
    Configure,
    SetPins,
    Install,
    Uninstall,
    SetBaudRate,
    Write,
    Read,
}

#[derive(Debug, Default)]
struct Slot {
    config: Option<SerialConfig>,
    pins: Option<PinAssignment>,
    driver: Option<Driver>,
}

#[derive(Debug)]
struct Driver {
    buffers: BufferSizes,
    tx: VecDeque<u8>,
    rx: VecDeque<u8>,
    rts: bool,
    flow_control: bool,
    break_on: bool,
}

impl Driver {
    fn new(buffers: BufferSizes) -> Self {
        Self {
            buffers,
            tx: VecDeque::with_capacity(buffers.tx),
            rx: VecDeque::with_capacity(buffers.rx),
            rts: true,
            flow_control: false,
            break_on: false,
        }
    }

    /// Move bytes across the jumper.
    fn pump(&mut self) {
        if self.break_on || (self.flow_control && !self.rts) {
            return;
        }
        while self.rx.len() < self.buffers.rx {
            match self.tx.pop_front() {
                Some(byte) => self.rx.push_back(byte),
                None => break,
            }
        }
    }
}

/// Loopback UART controller with one slot per name.
#[derive(Debug)]
pub struct LoopbackUart {
    names: &'static [&'static CStr],
    slots: Vec<Slot>,
    fault: Option<FaultPoint>,
}

impl LoopbackUart {
    /// Controller with `names.len()` channels, labelled by `names`.
    pub fn new(names: &'static [&'static CStr]) -> Self {
        let count = names.len().min(usize::from(Channel::MAX_INDEX) + 1);
        let mut slots = Vec::with_capacity(count);
        slots.resize_with(count, Slot::default);
        Self {
            names,
            slots,
            fault: None,
        }
    }

    /// Make the next call of `point` fail with [`UartError::Hardware`].
    pub fn inject_fault(&mut self, point: FaultPoint) {
        self.fault = Some(point);
    }

    /// Deliver bytes to a channel's receive queue as if sent by the far end.
    ///
    /// Returns how many fit.
    pub fn inject_rx(&mut self, channel: Channel, bytes: &[u8]) -> usize {
        let Some(driver) = self.driver_mut(channel).ok() else {
            return 0;
        };
        let room = driver.buffers.rx.saturating_sub(driver.rx.len());
        let n = room.min(bytes.len());
        driver.rx.extend(&bytes[..n]);
        n
    }

    /// Baud rate last programmed on `channel`.
    pub fn baud_rate(&self, channel: Channel) -> Option<u32> {
        self.slot(channel).ok()?.config.map(|c| c.baud_rate)
    }

    /// Pins last routed to `channel`.
    pub fn pins(&self, channel: Channel) -> Option<PinAssignment> {
        self.slot(channel).ok()?.pins
    }

    /// Whether `channel` is holding a break.
    pub fn break_enabled(&self, channel: Channel) -> bool {
        self.driver(channel).is_ok_and(|d| d.break_on)
    }

    /// Whether hardware flow control is on for `channel`.
    pub fn flow_control_enabled(&self, channel: Channel) -> bool {
        self.driver(channel).is_ok_and(|d| d.flow_control)
    }

    fn take_fault(&mut self, point: FaultPoint) -> Result<(), UartError> {
        if self.fault == Some(point) {
            self.fault = None;
            return Err(UartError::Hardware);
        }
        Ok(())
    }

    fn slot(&self, channel: Channel) -> Result<&Slot, UartError> {
        self.slots
            .get(usize::from(channel.index()))
            .ok_or(UartError::InvalidChannel)
    }

    fn slot_mut(&mut self, channel: Channel) -> Result<&mut Slot, UartError> {
        self.slots
            .get_mut(usize::from(channel.index()))
            .ok_or(UartError::InvalidChannel)
    }

    fn driver(&self, channel: Channel) -> Result<&Driver, UartError> {
        self.slot(channel)?
            .driver
            .as_ref()
            .ok_or(UartError::NotInstalled)
    }

    fn driver_mut(&mut self, channel: Channel) -> Result<&mut Driver, UartError> {
        self.slot_mut(channel)?
            .driver
            .as_mut()
            .ok_or(UartError::NotInstalled)
    }
}

fn check_baud(baud_rate: u32) -> Result<(), UartError> {
    if (MIN_BAUD..=MAX_BAUD).contains(&baud_rate) {
        Ok(())
    } else {
        Err(UartError::InvalidArgument)
    }
}

fn check_pins(pins: &PinAssignment) -> Result<(), UartError> {
    let lines = [Some(pins.tx), Some(pins.rx), pins.rts, pins.cts];
    for (i, a) in lines.iter().enumerate() {
        for b in &lines[i + 1..] {
            if a.is_some() && a == b {
                return Err(UartError::InvalidArgument);
            }
        }
    }
    Ok(())
}

impl UartController for LoopbackUart {
    fn channel_count(&self) -> u8 {
        self.slots.len() as u8
    }

    fn port_name(&self, channel: Channel) -> Option<&'static CStr> {
        self.names.get(usize::from(channel.index())).copied()
    }

    fn configure(&mut self, channel: Channel, config: SerialConfig) -> Result<(), UartError> {
        self.take_fault(FaultPoint::Configure)?;
        check_baud(config.baud_rate)?;
        self.slot_mut(channel)?.config = Some(config);
        Ok(())
    }

    fn set_pins(&mut self, channel: Channel, pins: PinAssignment) -> Result<(), UartError> {
        self.take_fault(FaultPoint::SetPins)?;
        check_pins(&pins)?;
        self.slot_mut(channel)?.pins = Some(pins);
        Ok(())
    }

    fn install(&mut self, channel: Channel, buffers: BufferSizes) -> Result<(), UartError> {
        self.take_fault(FaultPoint::Install)?;
        if buffers.rx == 0 || buffers.tx == 0 {
            return Err(UartError::InvalidArgument);
        }
        let slot = self.slot_mut(channel)?;
        if slot.driver.is_some() {
            return Err(UartError::AlreadyInstalled);
        }
        if slot.config.is_none() {
            return Err(UartError::InvalidArgument);
        }
        slot.driver = Some(Driver::new(buffers));
        Ok(())
    }

    fn uninstall(&mut self, channel: Channel) -> Result<(), UartError> {
        self.take_fault(FaultPoint::Uninstall)?;
        let slot = self.slot_mut(channel)?;
        if slot.driver.take().is_none() {
            return Err(UartError::NotInstalled);
        }
        *slot = Slot::default();
        Ok(())
    }

    fn is_installed(&self, channel: Channel) -> bool {
        self.driver(channel).is_ok()
    }

    fn set_baud_rate(&mut self, channel: Channel, baud_rate: u32) -> Result<(), UartError> {
        self.take_fault(FaultPoint::SetBaudRate)?;
        check_baud(baud_rate)?;
        self.driver(channel)?;
        if let Some(config) = self.slot_mut(channel)?.config.as_mut() {
            config.baud_rate = baud_rate;
        }
        Ok(())
    }

    fn try_write(&mut self, channel: Channel, bytes: &[u8]) -> Result<usize, UartError> {
        self.take_fault(FaultPoint::Write)?;
        let driver = self.driver_mut(channel)?;
        let room = driver.buffers.tx.saturating_sub(driver.tx.len());
        let n = room.min(bytes.len());
        driver.tx.extend(&bytes[..n]);
        driver.pump();
        Ok(n)
    }

    fn try_read(&mut self, channel: Channel, buffer: &mut [u8]) -> Result<usize, UartError> {
        self.take_fault(FaultPoint::Read)?;
        let driver = self.driver_mut(channel)?;
        let mut n = 0;
        for slot in buffer.iter_mut() {
            match driver.rx.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }
        driver.pump();
        Ok(n)
    }

    fn capabilities(&self, channel: Channel) -> Capabilities {
        if self.is_installed(channel) {
            Capabilities::all()
        } else {
            Capabilities::empty()
        }
    }

    fn tx_used(&self, channel: Channel) -> Option<usize> {
        self.driver(channel).ok().map(|d| d.tx.len())
    }

    fn tx_free(&self, channel: Channel) -> Option<usize> {
        self.driver(channel)
            .ok()
            .map(|d| d.buffers.tx.saturating_sub(d.tx.len()))
    }

    fn rx_used(&self, channel: Channel) -> Option<usize> {
        self.driver(channel).ok().map(|d| d.rx.len())
    }

    fn rx_free(&self, channel: Channel) -> Option<usize> {
        self.driver(channel)
            .ok()
            .map(|d| d.buffers.rx.saturating_sub(d.rx.len()))
    }

    fn flush_tx(&mut self, channel: Channel) -> Result<(), UartError> {
        self.driver_mut(channel)?.tx.clear();
        Ok(())
    }

    fn flush_rx(&mut self, channel: Channel) -> Result<(), UartError> {
        let driver = self.driver_mut(channel)?;
        driver.rx.clear();
        driver.pump();
        Ok(())
    }

    fn set_break(&mut self, channel: Channel, enabled: bool) -> Result<(), UartError> {
        let driver = self.driver_mut(channel)?;
        driver.break_on = enabled;
        driver.pump();
        Ok(())
    }

    fn set_flow_control(&mut self, channel: Channel, enabled: bool) -> Result<(), UartError> {
        let driver = self.driver_mut(channel)?;
        driver.flow_control = enabled;
        driver.pump();
        Ok(())
    }

    fn set_rts(&mut self, channel: Channel, asserted: bool) -> Result<(), UartError> {
        let driver = self.driver_mut(channel)?;
        driver.rts = asserted;
        driver.pump();
        Ok(())
    }

    fn cts(&self, channel: Channel) -> Option<bool> {
        self.driver(channel).ok().map(|d| d.rts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static NAMES: [&CStr; 2] = [c"LOOP0", c"LOOP1"];

    fn ch(index: u8) -> Channel {
        Channel::new(index).unwrap()
    }

    fn installed(buffers: BufferSizes) -> LoopbackUart {
        let mut uart = LoopbackUart::new(&NAMES);
        uart.configure(ch(0), SerialConfig::new_8n1(9600)).unwrap();
        uart.set_pins(ch(0), PinAssignment::tx_rx(1, 3)).unwrap();
        uart.install(ch(0), buffers).unwrap();
        uart
    }

    #[test]
    fn written_bytes_come_back_in_order() {
        let mut uart = installed(BufferSizes::new(16, 16));
        assert_eq!(uart.try_write(ch(0), b"hello").unwrap(), 5);

        let mut buf = [0u8; 8];
        assert_eq!(uart.try_read(ch(0), &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(uart.try_read(ch(0), &mut buf).unwrap(), 0);
    }

    #[test]
    fn full_receiver_backs_up_transmit_queue() {
        let mut uart = installed(BufferSizes::new(2, 3));
        assert_eq!(uart.try_write(ch(0), b"abcdef").unwrap(), 3);
        assert_eq!(uart.rx_used(ch(0)), Some(2));
        assert_eq!(uart.tx_used(ch(0)), Some(1));
        assert_eq!(uart.tx_free(ch(0)), Some(2));

        let mut buf = [0u8; 1];
        assert_eq!(uart.try_read(ch(0), &mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'a');
        assert_eq!(uart.tx_used(ch(0)), Some(0));
        assert_eq!(uart.rx_used(ch(0)), Some(2));
    }

    #[test]
    fn break_and_deasserted_rts_hold_the_line() {
        let mut uart = installed(BufferSizes::new(8, 8));
        uart.set_break(ch(0), true).unwrap();
        uart.try_write(ch(0), b"x").unwrap();
        assert_eq!(uart.rx_used(ch(0)), Some(0));
        uart.set_break(ch(0), false).unwrap();
        assert_eq!(uart.rx_used(ch(0)), Some(1));

        uart.set_flow_control(ch(0), true).unwrap();
        uart.set_rts(ch(0), false).unwrap();
        assert_eq!(uart.cts(ch(0)), Some(false));
        uart.try_write(ch(0), b"y").unwrap();
        assert_eq!(uart.tx_used(ch(0)), Some(1));
        uart.set_rts(ch(0), true).unwrap();
        assert_eq!(uart.tx_used(ch(0)), Some(0));
        assert_eq!(uart.rx_used(ch(0)), Some(2));
    }

    #[test]
    fn install_twice_is_rejected() {
        let mut uart = installed(BufferSizes::new(8, 8));
        assert_eq!(
            uart.install(ch(0), BufferSizes::new(8, 8)),
            Err(UartError::AlreadyInstalled)
        );
    }

    #[test]
    fn uninstall_resets_the_slot() {
        let mut uart = installed(BufferSizes::new(8, 8));
        uart.uninstall(ch(0)).unwrap();
        assert!(!uart.is_installed(ch(0)));
        assert_eq!(uart.baud_rate(ch(0)), None);
        assert_eq!(uart.uninstall(ch(0)), Err(UartError::NotInstalled));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut uart = LoopbackUart::new(&NAMES);
        assert_eq!(
            uart.configure(ch(0), SerialConfig::new_8n1(0)),
            Err(UartError::InvalidArgument)
        );
        assert_eq!(
            uart.set_pins(ch(0), PinAssignment::tx_rx(4, 4)),
            Err(UartError::InvalidArgument)
        );
        assert_eq!(
            uart.configure(ch(5), SerialConfig::new_8n1(9600)),
            Err(UartError::InvalidChannel)
        );
        assert_eq!(
            uart.install(ch(1), BufferSizes::new(8, 8)),
            Err(UartError::InvalidArgument)
        );
    }

    #[test]
    fn injected_fault_fires_once() {
        let mut uart = installed(BufferSizes::new(8, 8));
        uart.inject_fault(FaultPoint::Write);
        assert_eq!(uart.try_write(ch(0), b"a"), Err(UartError::Hardware));
        assert_eq!(uart.try_write(ch(0), b"a"), Ok(1));
    }
}
