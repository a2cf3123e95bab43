//! ARM PrimeCell PL011 UART Driver
//!
//! Register-level access to a PL011 UART. The driver works straight
//! from the 16-entry hardware FIFOs; nothing here waits except for
//! reprogramming, which must let the transmitter go idle first.
//!
//! # Example
//!
//! ```no_run
//! use xbee_port::hal::serial::SerialConfig;
//! use xbee_port::peripheral::pl011::Pl011;
//!
//! let mut uart = unsafe { Pl011::new(0x2020_1000) };
//! uart.configure(SerialConfig::new_8n1(9600)).unwrap();
//! uart.enable();
//! uart.try_write_byte(b'+');
//! ```

use crate::hal::serial::{DataBits, Framing, Parity, SerialConfig, StopBits, UartError};
use core::ptr::{read_volatile, write_volatile};

/// PL011 reference clock frequency
pub const PL011_CLOCK_HZ: u32 = 48_000_000;

/// Hardware FIFO depth, both directions.
pub const FIFO_DEPTH: usize = 16;

// Register offsets
const DR_OFFSET: usize = 0x00;
const RSR_ECR_OFFSET: usize = 0x04;
const FR_OFFSET: usize = 0x18;
const IBRD_OFFSET: usize = 0x24;
const FBRD_OFFSET: usize = 0x28;
const LCRH_OFFSET: usize = 0x2C;
const CR_OFFSET: usize = 0x30;
const IMSC_OFFSET: usize = 0x38;
const ICR_OFFSET: usize = 0x44;

// Data Register (DR) error bits: framing, parity, break, overrun
const DR_ERROR_MASK: u32 = 0xF << 8;

// Flag Register (FR) bits
const FR_CTS: u32 = 1 << 0;
const FR_BUSY: u32 = 1 << 3;
const FR_RXFE: u32 = 1 << 4;
const FR_TXFF: u32 = 1 << 5;

// Control Register (CR) bits
const CR_UARTEN: u32 = 1 << 0;
const CR_TXE: u32 = 1 << 8;
const CR_RXE: u32 = 1 << 9;
const CR_RTS: u32 = 1 << 11;
const CR_RTSEN: u32 = 1 << 14;
const CR_CTSEN: u32 = 1 << 15;

// Line Control Register (LCRH) bits
const LCRH_BRK: u32 = 1 << 0;
const LCRH_PEN: u32 = 1 << 1;
const LCRH_EPS: u32 = 1 << 2;
const LCRH_STP2: u32 = 1 << 3;
const LCRH_FEN: u32 = 1 << 4;
const LCRH_WLEN_SHIFT: u32 = 5;

/// PL011 UART driver.
pub struct Pl011 {
    base: usize,
}

impl Pl011 {
    /// Create a new PL011 UART instance.
    ///
    /// # Safety
    ///
    /// - `base` must point to a valid PL011 peripheral
    /// - Only one instance should exist per UART hardware
    /// - Memory must be properly mapped as device memory
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }

    #[inline]
    fn modify_reg(&mut self, offset: usize, set: u32, clear: u32) {
        let value = (self.read_reg(offset) & !clear) | set;
        self.write_reg(offset, value);
    }

    /// Wait for the UART to finish transmitting.
    ///
    /// Gives up once the transmitter is stalled by a deasserted CTS
    /// under hardware flow control; it would never drain.
    fn wait_idle(&self) {
        while self.is_busy() && !self.tx_held() {
            core::hint::spin_loop();
        }
    }

    /// Whether CTS flow control is holding the transmitter.
    fn tx_held(&self) -> bool {
        self.read_reg(CR_OFFSET) & CR_CTSEN != 0 && !self.cts()
    }

    /// Program line parameters. Leaves the UART disabled.
    pub fn configure(&mut self, config: SerialConfig) -> Result<(), UartError> {
        let (ibrd, fbrd) = calculate_divisors(config.baud_rate)?;

        self.disable();

        self.write_reg(IBRD_OFFSET, ibrd);
        self.write_reg(FBRD_OFFSET, fbrd);
        // The LCRH write latches the divisors.
        self.write_reg(LCRH_OFFSET, line_control(config.framing) | LCRH_FEN);

        // Clear all pending interrupts and mask them; the port is polled.
        self.write_reg(ICR_OFFSET, 0x07FF);
        self.write_reg(IMSC_OFFSET, 0);

        Ok(())
    }

    /// Change the baud rate, keeping framing and the enable state.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), UartError> {
        let (ibrd, fbrd) = calculate_divisors(baud_rate)?;
        let cr = self.read_reg(CR_OFFSET);

        self.disable();
        self.write_reg(IBRD_OFFSET, ibrd);
        self.write_reg(FBRD_OFFSET, fbrd);
        let lcrh = self.read_reg(LCRH_OFFSET);
        self.write_reg(LCRH_OFFSET, lcrh);
        self.write_reg(CR_OFFSET, cr);

        Ok(())
    }

    /// Enable UART, transmitter, and receiver.
    pub fn enable(&mut self) {
        self.modify_reg(CR_OFFSET, CR_UARTEN | CR_TXE | CR_RXE, 0);
    }

    /// Disable the UART once the transmitter is idle.
    pub fn disable(&mut self) {
        self.modify_reg(CR_OFFSET, 0, CR_UARTEN);
        self.wait_idle();
    }

    /// Whether the UART is enabled.
    pub fn is_enabled(&self) -> bool {
        self.read_reg(CR_OFFSET) & CR_UARTEN != 0
    }

    /// Check if the UART is busy transmitting.
    pub fn is_busy(&self) -> bool {
        self.read_reg(FR_OFFSET) & FR_BUSY != 0
    }

    /// Queue one byte if the TX FIFO has room.
    pub fn try_write_byte(&mut self, byte: u8) -> bool {
        if self.read_reg(FR_OFFSET) & FR_TXFF != 0 {
            return false;
        }
        self.write_reg(DR_OFFSET, byte as u32);
        true
    }

    /// Take one received byte if the RX FIFO has any.
    ///
    /// Characters received with a framing, parity, break or overrun
    /// error are dropped.
    pub fn try_read_byte(&mut self) -> Option<u8> {
        while self.read_reg(FR_OFFSET) & FR_RXFE == 0 {
            let dr = self.read_reg(DR_OFFSET);
            if dr & DR_ERROR_MASK == 0 {
                return Some((dr & 0xFF) as u8);
            }
            self.write_reg(RSR_ECR_OFFSET, 0);
        }
        None
    }

    /// Drain the RX FIFO.
    pub fn flush_rx(&mut self) {
        while self.read_reg(FR_OFFSET) & FR_RXFE == 0 {
            let _ = self.read_reg(DR_OFFSET);
        }
        self.write_reg(RSR_ECR_OFFSET, 0);
    }

    /// Hold TX low (break) or release it.
    pub fn set_break(&mut self, enabled: bool) {
        if enabled {
            self.modify_reg(LCRH_OFFSET, LCRH_BRK, 0);
        } else {
            self.modify_reg(LCRH_OFFSET, 0, LCRH_BRK);
        }
    }

    /// Drive nUARTRTS. Ignored by the hardware while RTS flow control is on.
    pub fn set_rts(&mut self, asserted: bool) {
        if asserted {
            self.modify_reg(CR_OFFSET, CR_RTS, 0);
        } else {
            self.modify_reg(CR_OFFSET, 0, CR_RTS);
        }
    }

    /// Enable or disable hardware RTS/CTS flow control.
    pub fn set_hw_flow_control(&mut self, enabled: bool) {
        if enabled {
            self.modify_reg(CR_OFFSET, CR_RTSEN | CR_CTSEN, 0);
        } else {
            self.modify_reg(CR_OFFSET, 0, CR_RTSEN | CR_CTSEN);
        }
    }

    /// Whether nUARTCTS is asserted.
    pub fn cts(&self) -> bool {
        self.read_reg(FR_OFFSET) & FR_CTS != 0
    }
}

/// Calculate baud rate divisors.
///
/// Returns the 16-bit integer part and the 6-bit fractional part.
pub fn calculate_divisors(baud_rate: u32) -> Result<(u32, u32), UartError> {
    if baud_rate == 0 {
        return Err(UartError::InvalidArgument);
    }

    // BAUDDIV = FUARTCLK / (16 * baud), kept with 6 fractional bits, rounded
    let scaled = ((PL011_CLOCK_HZ as u64) << 7) / (16 * baud_rate as u64);
    let divisor = (scaled + 1) >> 1;

    let integer = (divisor >> 6) as u32;
    let fractional = (divisor & 0x3F) as u32;

    if integer == 0 || integer > 0xFFFF {
        return Err(UartError::InvalidArgument);
    }

    Ok((integer, fractional))
}

/// LCRH bits for a framing, without FIFO enable.
fn line_control(framing: Framing) -> u32 {
    let wlen = match framing.data_bits {
        DataBits::Five => 0b00,
        DataBits::Six => 0b01,
        DataBits::Seven => 0b10,
        DataBits::Eight => 0b11,
    };
    let parity = match framing.parity {
        Parity::None => 0,
        Parity::Odd => LCRH_PEN,
        Parity::Even => LCRH_PEN | LCRH_EPS,
    };
    let stop = match framing.stop_bits {
        StopBits::One => 0,
        StopBits::Two => LCRH_STP2,
    };
    (wlen << LCRH_WLEN_SHIFT) | parity | stop
}

// SAFETY: Pl011 wraps memory-mapped hardware that can be safely
// accessed from any thread when protected by synchronization.
unsafe impl Send for Pl011 {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Register block in RAM, large enough for every offset the driver uses.
    fn fake_registers() -> [u32; ICR_OFFSET / 4 + 1] {
        [0; ICR_OFFSET / 4 + 1]
    }

    #[test]
    fn baud_change_with_transmitter_held_by_cts() {
        let mut regs = fake_registers();
        regs[CR_OFFSET / 4] = CR_UARTEN | CR_TXE | CR_RXE | CR_RTSEN | CR_CTSEN;
        // Busy with CTS deasserted: the FIFO can never drain.
        regs[FR_OFFSET / 4] = FR_BUSY;
        let mut uart = unsafe { Pl011::new(regs.as_mut_ptr() as usize) };

        assert!(uart.is_busy());
        assert_eq!(uart.set_baud_rate(115_200), Ok(()));
        assert!(uart.is_enabled());

        assert_eq!(regs[IBRD_OFFSET / 4], 26);
        assert_eq!(regs[FBRD_OFFSET / 4], 3);
        assert_eq!(
            regs[CR_OFFSET / 4],
            CR_UARTEN | CR_TXE | CR_RXE | CR_RTSEN | CR_CTSEN
        );
    }

    #[test]
    fn configure_leaves_uart_disabled() {
        let mut regs = fake_registers();
        regs[CR_OFFSET / 4] = CR_UARTEN | CR_TXE | CR_RXE;
        let mut uart = unsafe { Pl011::new(regs.as_mut_ptr() as usize) };

        assert_eq!(uart.configure(SerialConfig::new_8n1(9600)), Ok(()));
        assert!(!uart.is_enabled());
        uart.enable();
        assert!(uart.is_enabled());

        assert_eq!(regs[IBRD_OFFSET / 4], 312);
        assert_eq!(regs[LCRH_OFFSET / 4], (0b11 << 5) | LCRH_FEN);
    }

    #[test]
    fn divisors_for_xbee_rates() {
        // 48 MHz / (16 * 9600) = 312.5
        assert_eq!(calculate_divisors(9600), Ok((312, 32)));
        // 48 MHz / (16 * 115200) = 26.041666
        assert_eq!(calculate_divisors(115_200), Ok((26, 3)));
    }

    #[test]
    fn divisors_reject_out_of_range_rates() {
        assert_eq!(calculate_divisors(0), Err(UartError::InvalidArgument));
        assert_eq!(calculate_divisors(4_000_000), Err(UartError::InvalidArgument));
        assert_eq!(calculate_divisors(20), Err(UartError::InvalidArgument));
    }

    #[test]
    fn line_control_encodes_framing() {
        assert_eq!(line_control(Framing::EIGHT_N_ONE), 0b11 << 5);
        let framing = Framing {
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
        };
        assert_eq!(
            line_control(framing),
            (0b10 << 5) | LCRH_PEN | LCRH_EPS | LCRH_STP2
        );
    }
}
