//! C ABI for the portable XBee core.
//!
//! The core calls `xbee_ser_*`, `xbee_*_timer` and `xbee_platform_init`
//! and reads results with the errno convention: non-negative is success
//! (usually a byte count), negative is `-EINVAL`, `-EIO`, `-ENOSPC` or
//! `-ENODATA`.
//!
//! The functions in this module carry the pointer checks and the result
//! encoding for any [`SerialAdapter`]; the exported symbols in
//! `exports` bind them to the board selected at build time.

#![allow(non_camel_case_types)]

use core::ffi::{c_char, c_int, c_void};

use common::errno::{PortError, to_status};

use crate::hal::serial::UartController;
use crate::hal::timer::TickSource;
use crate::serial::SerialAdapter;
pub use crate::serial::SerialHandle as xbee_serial_t;
use crate::serial::SerialHandle;

/// C boolean.
pub type bool_t = u8;

fn flag(value: bool) -> bool_t {
    value as bool_t
}

/// Copy of the pointed-to handle, or a closed one for null.
///
/// # Safety
/// `serial` must be null or valid for reads.
unsafe fn handle_or_closed(serial: *const SerialHandle) -> SerialHandle {
    unsafe { serial.as_ref() }.copied().unwrap_or_default()
}

/// # Safety
/// `serial` must be null or valid for reads and writes.
pub unsafe fn ser_open<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *mut SerialHandle,
    baudrate: u32,
) -> c_int {
    match unsafe { serial.as_mut() } {
        Some(handle) => to_status(port.open(handle, baudrate).map(|()| 0)),
        None => PortError::InvalidArgument.errno(),
    }
}

/// # Safety
/// `serial` must be null or valid for reads and writes.
pub unsafe fn ser_baudrate<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *mut SerialHandle,
    baudrate: u32,
) -> c_int {
    match unsafe { serial.as_mut() } {
        Some(handle) => to_status(port.set_baud_rate(handle, baudrate).map(|()| 0)),
        None => PortError::InvalidArgument.errno(),
    }
}

/// # Safety
/// `serial` must be null or valid for reads and writes.
pub unsafe fn ser_close<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *mut SerialHandle,
) -> c_int {
    match unsafe { serial.as_mut() } {
        Some(handle) => to_status(port.close(handle).map(|()| 0)),
        None => PortError::InvalidArgument.errno(),
    }
}

/// # Safety
/// `serial` must be null or valid for reads; `buffer` must be null or
/// valid for `length` bytes of reads.
pub unsafe fn ser_write<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    buffer: *const c_void,
    length: c_int,
) -> c_int {
    let Some(handle) = (unsafe { serial.as_ref() }) else {
        return PortError::InvalidArgument.errno();
    };
    let Ok(length) = usize::try_from(length) else {
        return PortError::InvalidArgument.errno();
    };
    if buffer.is_null() {
        return PortError::InvalidArgument.errno();
    }
    let bytes = unsafe { core::slice::from_raw_parts(buffer.cast::<u8>(), length) };
    to_status(port.write(handle, bytes))
}

/// # Safety
/// `serial` must be null or valid for reads; `buffer` must be null or
/// valid for `bufsize` bytes of writes.
pub unsafe fn ser_read<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    buffer: *mut c_void,
    bufsize: c_int,
) -> c_int {
    let Some(handle) = (unsafe { serial.as_ref() }) else {
        return PortError::InvalidArgument.errno();
    };
    let Ok(bufsize) = usize::try_from(bufsize) else {
        return PortError::InvalidArgument.errno();
    };
    if buffer.is_null() {
        return PortError::InvalidArgument.errno();
    }
    let bytes = unsafe { core::slice::from_raw_parts_mut(buffer.cast::<u8>(), bufsize) };
    to_status(port.read(handle, bytes))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_putchar<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    ch: u8,
) -> c_int {
    match unsafe { serial.as_ref() } {
        Some(handle) => to_status(port.put_char(handle, ch).map(|()| 0)),
        None => PortError::InvalidArgument.errno(),
    }
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_getchar<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    match unsafe { serial.as_ref() } {
        Some(handle) => to_status(port.get_char(handle).map(usize::from)),
        None => PortError::InvalidArgument.errno(),
    }
}

/// Which of the stubbed functions are real: the `Capabilities` bits.
///
/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_capabilities<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> u32 {
    port.capabilities(&unsafe { handle_or_closed(serial) }).bits()
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_tx_free<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    to_status(Ok(port.tx_free(&unsafe { handle_or_closed(serial) }).value()))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_tx_used<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    to_status(Ok(port.tx_used(&unsafe { handle_or_closed(serial) }).value()))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_rx_free<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    to_status(Ok(port.rx_free(&unsafe { handle_or_closed(serial) }).value()))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_rx_used<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    to_status(Ok(port.rx_used(&unsafe { handle_or_closed(serial) }).value()))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_tx_flush<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    port.flush_tx(&unsafe { handle_or_closed(serial) });
    0
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_rx_flush<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    port.flush_rx(&unsafe { handle_or_closed(serial) });
    0
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_break<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    enabled: bool_t,
) -> c_int {
    port.set_break(&unsafe { handle_or_closed(serial) }, enabled != 0);
    0
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_flowcontrol<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    enabled: bool_t,
) -> c_int {
    port.set_flow_control(&unsafe { handle_or_closed(serial) }, enabled != 0);
    0
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_set_rts<U: UartController, T: TickSource>(
    port: &mut SerialAdapter<U, T>,
    serial: *const SerialHandle,
    asserted: bool_t,
) -> c_int {
    port.set_rts(&unsafe { handle_or_closed(serial) }, asserted != 0);
    0
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_get_cts<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> c_int {
    c_int::from(port.cts(&unsafe { handle_or_closed(serial) }).value())
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_invalid<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> bool_t {
    flag(port.is_invalid(&unsafe { handle_or_closed(serial) }))
}

/// # Safety
/// `serial` must be null or valid for reads.
pub unsafe fn ser_portname<U: UartController, T: TickSource>(
    port: &SerialAdapter<U, T>,
    serial: *const SerialHandle,
) -> *const c_char {
    port.port_name_cstr(&unsafe { handle_or_closed(serial) }).as_ptr()
}

#[cfg(feature = "ffi")]
mod exports {
    //! Exported symbols, bound to the board's process-wide port.

    use core::ffi::{c_char, c_int, c_void};

    use common::errno::PortError;
    use log::info;
    use spin::{Mutex, Once};

    use super::{SerialHandle, bool_t};
    use crate::platform::{CurrentPlatform, Platform};
    use crate::serial::{INVALID_PORT_NAME, SerialAdapter};
    use crate::timer::TimerAdapter;

    type Clock = <CurrentPlatform as Platform>::Clock;
    type Uart = <CurrentPlatform as Platform>::Uart;

    struct Runtime {
        timer: TimerAdapter<Clock>,
        port: Mutex<SerialAdapter<Uart, Clock>>,
    }

    static RUNTIME: Once<Runtime> = Once::new();

    fn with_port<R>(uninit: R, f: impl FnOnce(&mut SerialAdapter<Uart, Clock>) -> R) -> R {
        match RUNTIME.get() {
            Some(rt) => f(&mut *rt.port.lock()),
            None => uninit,
        }
    }

    /// Bring up the board's timer and UART controller. Idempotent.
    #[unsafe(no_mangle)]
    pub extern "C" fn xbee_platform_init() -> c_int {
        RUNTIME.call_once(|| {
            // SAFETY: `Once` runs this exactly once per process.
            let (clock, uart) = unsafe {
                CurrentPlatform::early_init();
                (CurrentPlatform::clock(), CurrentPlatform::uart())
            };
            info!("xbee platform init: {}", CurrentPlatform::name());
            Runtime {
                timer: TimerAdapter::new(clock.clone()),
                port: Mutex::new(SerialAdapter::new(
                    uart,
                    clock,
                    CurrentPlatform::default_port_config(),
                )),
            }
        });
        0
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn xbee_seconds_timer() -> u32 {
        RUNTIME.get().map_or(0, |rt| rt.timer.seconds())
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn xbee_millisecond_timer() -> u32 {
        RUNTIME.get().map_or(0, |rt| rt.timer.milliseconds())
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_open(serial: *mut SerialHandle, baudrate: u32) -> c_int {
        with_port(PortError::Io.errno(), |port| unsafe {
            super::ser_open(port, serial, baudrate)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_baudrate(serial: *mut SerialHandle, baudrate: u32) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_baudrate(port, serial, baudrate)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_close(serial: *mut SerialHandle) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_close(port, serial)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`; `buffer` must be
    /// null or readable for `length` bytes.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_write(
        serial: *mut SerialHandle,
        buffer: *const c_void,
        length: c_int,
    ) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_write(port, serial, buffer, length)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`; `buffer` must be
    /// null or writable for `bufsize` bytes.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_read(
        serial: *mut SerialHandle,
        buffer: *mut c_void,
        bufsize: c_int,
    ) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_read(port, serial, buffer, bufsize)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_putchar(serial: *mut SerialHandle, ch: u8) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_putchar(port, serial, ch)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_getchar(serial: *mut SerialHandle) -> c_int {
        with_port(PortError::InvalidArgument.errno(), |port| unsafe {
            super::ser_getchar(port, serial)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_capabilities(serial: *mut SerialHandle) -> u32 {
        with_port(0, |port| unsafe { super::ser_capabilities(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_tx_free(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_tx_free(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_tx_used(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_tx_used(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_tx_flush(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_tx_flush(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_rx_free(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_rx_free(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_rx_used(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_rx_used(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_rx_flush(serial: *mut SerialHandle) -> c_int {
        with_port(0, |port| unsafe { super::ser_rx_flush(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_break(serial: *mut SerialHandle, enabled: bool_t) -> c_int {
        with_port(0, |port| unsafe { super::ser_break(port, serial, enabled) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_flowcontrol(
        serial: *mut SerialHandle,
        enabled: bool_t,
    ) -> c_int {
        with_port(0, |port| unsafe {
            super::ser_flowcontrol(port, serial, enabled)
        })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_set_rts(serial: *mut SerialHandle, asserted: bool_t) -> c_int {
        with_port(0, |port| unsafe { super::ser_set_rts(port, serial, asserted) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_get_cts(serial: *mut SerialHandle) -> c_int {
        with_port(1, |port| unsafe { super::ser_get_cts(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_invalid(serial: *mut SerialHandle) -> bool_t {
        with_port(1, |port| unsafe { super::ser_invalid(port, serial) })
    }

    /// # Safety
    /// `serial` must be null or a valid `xbee_serial_t`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn xbee_ser_portname(serial: *mut SerialHandle) -> *const c_char {
        with_port(INVALID_PORT_NAME.as_ptr(), |port| unsafe {
            super::ser_portname(port, serial)
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::Capabilities;
    use crate::serial::ASSUMED_FREE;
    use crate::testing::loopback_adapter;
    use common::errno::{EINVAL, EIO, ENODATA, ENOSPC};
    use core::ffi::CStr;
    use core::ptr;

    #[test]
    fn null_handle_is_invalid_argument() {
        let mut port = loopback_adapter();
        let mut buf = [0u8; 4];
        unsafe {
            assert_eq!(ser_open(&mut port, ptr::null_mut(), 9600), -EINVAL);
            assert_eq!(ser_close(&mut port, ptr::null_mut()), -EINVAL);
            assert_eq!(ser_baudrate(&mut port, ptr::null_mut(), 9600), -EINVAL);
            assert_eq!(
                ser_write(&mut port, ptr::null(), b"AT".as_ptr().cast(), 2),
                -EINVAL
            );
            assert_eq!(
                ser_read(&mut port, ptr::null(), buf.as_mut_ptr().cast(), 4),
                -EINVAL
            );
            assert_eq!(ser_putchar(&mut port, ptr::null(), b'A'), -EINVAL);
            assert_eq!(ser_getchar(&mut port, ptr::null()), -EINVAL);
            assert_eq!(ser_invalid(&port, ptr::null()), 1);
        }
    }

    #[test]
    fn null_or_negative_buffer_is_invalid_argument() {
        let mut port = loopback_adapter();
        let mut serial = xbee_serial_t::default();
        unsafe {
            assert_eq!(ser_open(&mut port, &mut serial, 9600), 0);
            assert_eq!(ser_write(&mut port, &serial, ptr::null(), 3), -EINVAL);
            assert_eq!(ser_read(&mut port, &serial, ptr::null_mut(), 3), -EINVAL);
            assert_eq!(
                ser_write(&mut port, &serial, b"AT".as_ptr().cast(), -1),
                -EINVAL
            );
            assert_eq!(ser_write(&mut port, &serial, b"".as_ptr().cast(), 0), 0);
        }
    }

    #[test]
    fn zeroed_c_handle_is_closed() {
        let port = loopback_adapter();
        // A C caller zero-fills the struct.
        let serial: xbee_serial_t = unsafe { core::mem::zeroed() };
        unsafe {
            assert_eq!(ser_invalid(&port, &serial), 1);
            let name = CStr::from_ptr(ser_portname(&port, &serial));
            assert_eq!(name.to_str(), Ok("(invalid)"));
        }
    }

    #[test]
    fn scenario_through_the_c_surface() {
        let mut port = loopback_adapter();
        let mut serial = xbee_serial_t::default();
        unsafe {
            assert_eq!(ser_open(&mut port, &mut serial, 9600), 0);
            assert_eq!(serial.baud_rate(), 9600);
            assert_eq!(ser_invalid(&port, &serial), 0);

            assert_eq!(ser_baudrate(&mut port, &mut serial, 115_200), 0);
            assert_eq!(serial.baud_rate(), 115_200);

            assert_eq!(ser_write(&mut port, &serial, b"AT\r".as_ptr().cast(), 3), 3);

            let mut buf = [0u8; 10];
            assert_eq!(ser_read(&mut port, &serial, buf.as_mut_ptr().cast(), 10), 3);
            assert_eq!(&buf[..3], b"AT\r");
            assert_eq!(ser_read(&mut port, &serial, buf.as_mut_ptr().cast(), 10), 0);

            let name = CStr::from_ptr(ser_portname(&port, &serial));
            assert_eq!(name.to_str(), Ok("UART2"));

            assert_eq!(ser_close(&mut port, &mut serial), 0);
            assert_eq!(ser_invalid(&port, &serial), 1);
            assert_eq!(ser_close(&mut port, &mut serial), -EINVAL);
        }
    }

    #[test]
    fn getchar_returns_the_byte_or_enodata() {
        let mut port = loopback_adapter();
        let mut serial = xbee_serial_t::default();
        unsafe {
            assert_eq!(ser_getchar(&mut port, &serial), -EINVAL);
            ser_open(&mut port, &mut serial, 9600);
            assert_eq!(ser_putchar(&mut port, &serial, 0xFE), 0);
            assert_eq!(ser_getchar(&mut port, &serial), 0xFE);
            assert_eq!(ser_getchar(&mut port, &serial), -ENODATA);
        }
    }

    #[test]
    fn putchar_full_is_enospc() {
        let mut port = loopback_adapter();
        let mut serial = SerialHandle::default();
        let config = crate::testing::port_config().with_buffers(1, 1);
        port.open_with(&mut serial, &config, 9600).unwrap();
        unsafe {
            assert_eq!(ser_putchar(&mut port, &serial, 1), 0);
            assert_eq!(ser_putchar(&mut port, &serial, 2), 0);
            assert_eq!(ser_putchar(&mut port, &serial, 3), -ENOSPC);
        }
    }

    #[test]
    fn busy_channel_open_is_eio() {
        let mut port = loopback_adapter();
        let mut first = SerialHandle::default();
        let mut second = SerialHandle::default();
        unsafe {
            assert_eq!(ser_open(&mut port, &mut first, 9600), 0);
            assert_eq!(ser_open(&mut port, &mut second, 9600), -EIO);
        }
    }

    #[test]
    fn status_calls_never_fail() {
        let mut port = loopback_adapter();
        let mut serial = SerialHandle::default();
        unsafe {
            assert_eq!(ser_tx_free(&port, ptr::null()), ASSUMED_FREE as c_int);
            assert_eq!(ser_rx_used(&port, ptr::null()), 0);
            assert_eq!(ser_get_cts(&port, ptr::null()), 1);
            assert_eq!(ser_capabilities(&port, ptr::null()), 0);
            assert_eq!(ser_break(&mut port, ptr::null(), 1), 0);
            assert_eq!(ser_tx_flush(&mut port, ptr::null()), 0);

            ser_open(&mut port, &mut serial, 9600);
            assert_eq!(ser_capabilities(&port, &serial), Capabilities::all().bits());
            assert_eq!(ser_write(&mut port, &serial, b"abc".as_ptr().cast(), 3), 3);
            assert_eq!(ser_rx_used(&port, &serial), 3);
            assert_eq!(ser_rx_flush(&mut port, &serial), 0);
            assert_eq!(ser_rx_used(&port, &serial), 0);
            assert_eq!(ser_tx_used(&port, &serial), 0);
            assert_eq!(ser_rx_free(&port, &serial), 256);

            assert_eq!(ser_flowcontrol(&mut port, &serial, 1), 0);
            assert_eq!(ser_set_rts(&mut port, &serial, 0), 0);
            assert_eq!(ser_get_cts(&port, &serial), 0);
        }
    }
}
