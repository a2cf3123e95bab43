//! BCM2835 GPIO pin multiplexing.
//!
//! Only what UART routing needs: alternate-function selection and the
//! pull resistor sequence.

use core::ptr::{read_volatile, write_volatile};

/// GPIO base address.
pub const GPIO_BASE: usize = super::PERIPHERAL_BASE + 0x20_0000;

/// Highest GPIO number.
pub const MAX_PIN: u8 = 53;

/// GPIO function selection.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

/// Internal pull resistor configuration.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pull {
    Off = 0b00,
    Down = 0b01,
    Up = 0b10,
}

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    InvalidPin,
}

/// Memory-mapped register layout, up to the pull-up/down block.
#[repr(C)]
struct Registers {
    gpfsel: [u32; 6],
    _reserved: [u32; 31],
    gppud: u32,
    gppudclk: [u32; 2],
}

#[inline(always)]
fn regs() -> *mut Registers {
    GPIO_BASE as *mut Registers
}

fn check_pin(pin: u8) -> Result<(), GpioError> {
    if pin <= MAX_PIN {
        Ok(())
    } else {
        Err(GpioError::InvalidPin)
    }
}

/// Field position of `pin` in the GPFSEL bank: (register, shift).
fn fsel_position(pin: u8) -> (usize, u32) {
    ((pin / 10) as usize, (pin % 10) as u32 * 3)
}

fn delay_cycles(count: u32) {
    for _ in 0..count {
        core::hint::spin_loop();
    }
}

/// Set the function of a GPIO pin.
pub fn set_function(pin: u8, func: Function) -> Result<(), GpioError> {
    check_pin(pin)?;
    let (reg, shift) = fsel_position(pin);
    let mask = 0b111 << shift;

    unsafe {
        let fsel = &raw mut (*regs()).gpfsel[reg];
        let val = read_volatile(fsel);
        write_volatile(fsel, (val & !mask) | ((func as u32) << shift));
    }

    Ok(())
}

/// Configure the internal pull resistor.
pub fn set_pull(pin: u8, pull: Pull) -> Result<(), GpioError> {
    check_pin(pin)?;
    let reg = (pin / 32) as usize;
    let bit = 1u32 << (pin % 32);

    unsafe {
        let gppud = &raw mut (*regs()).gppud;
        let clk = &raw mut (*regs()).gppudclk[reg];

        write_volatile(gppud, pull as u32);
        delay_cycles(150);

        write_volatile(clk, bit);
        delay_cycles(150);

        write_volatile(gppud, 0);
        write_volatile(clk, 0);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_layout_matches_datasheet() {
        assert_eq!(core::mem::offset_of!(Registers, gppud), 0x94);
        assert_eq!(core::mem::offset_of!(Registers, gppudclk), 0x98);
    }

    #[test]
    fn fsel_fields_are_three_bits_wide() {
        assert_eq!(fsel_position(14), (1, 12));
        assert_eq!(fsel_position(15), (1, 15));
        assert_eq!(fsel_position(32), (3, 6));
    }

    #[test]
    fn rejects_pins_past_the_bank() {
        assert_eq!(check_pin(53), Ok(()));
        assert_eq!(check_pin(54), Err(GpioError::InvalidPin));
    }
}
