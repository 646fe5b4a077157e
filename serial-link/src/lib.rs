//! Private serial link layer for sound board communication
//!
//! This crate defines the two hardware capabilities the sound board driver
//! consumes: a line-oriented [`Transport`] and an optional [`ResetLine`].
//! Platform-specific UART and GPIO handles are adapted to these traits by the
//! host application; [`IoTransport`] covers anything that already speaks
//! `std::io::Read + Write` (a serial-port handle, a pty, a TCP serial bridge).

mod error;
mod io;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::LinkError;
pub use io::IoTransport;

use std::time::Duration;

/// Baud rate used by every sound board model
pub const BAUD_RATE: u32 = 9600;

/// Line-oriented serial channel with a bounded read timeout
pub trait Transport {
    /// Write raw bytes to the device. Callers append the trailing newline.
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Read one line, without its terminating newline
    ///
    /// Returns [`LinkError::Timeout`] when no complete line arrives within
    /// `timeout`.
    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, LinkError>;

    /// Return whatever input is already buffered, without waiting
    ///
    /// `Ok(None)` means the receive buffer is empty.
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write(bytes)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, LinkError> {
        (**self).read_line(timeout)
    }

    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        (**self).read_available()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write(bytes)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, LinkError> {
        (**self).read_line(timeout)
    }

    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        (**self).read_available()
    }
}

/// Digital output wired to the sound board's `RST` pin
///
/// The idle state is deasserted (pin high). Asserting drives the pin low and
/// holds the board in reset until [`ResetLine::deassert_reset`] is called.
pub trait ResetLine {
    /// Drive the reset pin low
    fn assert_reset(&mut self) -> Result<(), LinkError>;

    /// Release the reset pin back to its idle level
    fn deassert_reset(&mut self) -> Result<(), LinkError>;
}

impl<R: ResetLine + ?Sized> ResetLine for &mut R {
    fn assert_reset(&mut self) -> Result<(), LinkError> {
        (**self).assert_reset()
    }

    fn deassert_reset(&mut self) -> Result<(), LinkError> {
        (**self).deassert_reset()
    }
}

/// Marker for boards whose reset pin is not wired
///
/// This type has no values, so a driver parameterised with it can only ever
/// hold `None` for its reset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResetLine {}

impl ResetLine for NoResetLine {
    fn assert_reset(&mut self) -> Result<(), LinkError> {
        match *self {}
    }

    fn deassert_reset(&mut self) -> Result<(), LinkError> {
        match *self {}
    }
}
