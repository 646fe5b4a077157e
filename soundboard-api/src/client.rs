use std::thread;
use std::time::Duration;

use serial_link::Transport;

use crate::protocol::BootBanner;
use crate::{Command, Outcome, ResponseMatch, Result};

/// Default bound on a single line read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(30);
/// Pause after writing a command before reading the reply
pub const DEFAULT_COMMAND_SETTLE: Duration = Duration::from_millis(10);

/// A client for exchanging single commands with a sound board
///
/// This client owns the framing rules of the line protocol: draining stale
/// input before each command, appending the newline, swallowing the echo of
/// multi-character commands, and trimming the reply. It makes exactly one
/// attempt per call; recovery policy belongs to the caller.
#[derive(Debug)]
pub struct SoundboardClient<T> {
    transport: T,
    read_timeout: Duration,
    command_settle: Duration,
}

impl<T: Transport> SoundboardClient<T> {
    /// Create a client with the default timing
    pub fn new(transport: T) -> Self {
        Self::with_timing(transport, DEFAULT_READ_TIMEOUT, DEFAULT_COMMAND_SETTLE)
    }

    /// Create a client with explicit read timeout and settle delay
    pub fn with_timing(transport: T, read_timeout: Duration, command_settle: Duration) -> Self {
        Self {
            transport,
            read_timeout,
            command_settle,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Discard everything waiting in the receive buffer
    ///
    /// Leftovers from a previous exchange that timed out would otherwise be
    /// read as the reply to the next command. Returns the number of chunks
    /// discarded.
    pub fn flush_input(&mut self) -> usize {
        let mut discarded = 0;
        while let Ok(Some(stale)) = self.transport.read_available() {
            tracing::trace!(bytes = stale.len(), "discarding stale input");
            discarded += 1;
        }
        discarded
    }

    /// Drain stale input, then write the framed command and let it settle
    pub fn write_command(&mut self, command: &Command) -> Result<()> {
        self.flush_input();
        self.transport.write(&command.to_frame())?;
        if !self.command_settle.is_zero() {
            thread::sleep(self.command_settle);
        }
        Ok(())
    }

    /// Read one reply line with surrounding whitespace removed
    pub fn read_response(&mut self) -> Result<Vec<u8>> {
        let line = self.transport.read_line(self.read_timeout)?;
        Ok(line.trim_ascii().to_vec())
    }

    /// Send a command and return its reply line
    pub fn exchange(&mut self, command: &Command) -> Result<Vec<u8>> {
        self.write_command(command)?;
        if command.echoes() {
            // The echo carries nothing; a missing echo shows up as a missing reply
            let _ = self.transport.read_line(self.read_timeout);
        }
        self.read_response()
    }

    /// Send a command once and interpret the reply
    pub fn execute(&mut self, command: &Command, matcher: &ResponseMatch) -> Result<Outcome> {
        let line = self.exchange(command)?;
        Ok(matcher.interpret(command, line))
    }

    /// Read the four banner lines printed after a reset
    ///
    /// The identity line is checked as soon as it arrives; the remaining
    /// lines are only read for a genuine sound board.
    pub fn read_boot_banner(&mut self) -> Result<BootBanner> {
        let date = self.read_response()?;
        let identity = self.read_response()?;
        BootBanner::check_identity(&identity)?;
        let filesystem = self.read_response()?;
        let count = self.read_response()?;
        BootBanner::from_lines(&date, &identity, &filesystem, &count)
    }
}
