//! Soundboard - the driver handle for one physical board

use std::thread;
use std::time::Duration;

use serial_link::{NoResetLine, ResetLine, Transport};
use soundboard_api::{BootBanner, SoundboardClient};

use crate::catalog::TrackCatalog;
use crate::logging::DebugLog;
use crate::SoundboardConfig;

/// Mutable bookkeeping for the conversation with the board
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    /// Last level the board reported; `None` until a step has been echoed
    pub(crate) current_volume: Option<u8>,
    /// Index of the track last started successfully
    pub(crate) current_track: Option<usize>,
    /// Set once the current public call has spent its reset
    pub(crate) reset_attempted: bool,
    /// Set while a public call is running; nested calls share its reset budget
    pub(crate) in_operation: bool,
}

/// Driver for one Adafruit Audio FX sound board
///
/// A `Soundboard` owns the serial transport, the optional reset line, and all
/// session state (cached volume, current track, track catalog). Every
/// operation is a blocking exchange over the link; a command that goes
/// unanswered is retried once after pulsing the reset line, if one is wired.
///
/// Expected operational failures never panic and never surface as errors:
/// commands report `bool`, `Option`, or sentinel readings instead.
///
/// # Example
///
/// ```rust,ignore
/// use serial_link::IoTransport;
/// use soundboard_sdk::{Soundboard, SoundboardConfig};
///
/// let port = std::net::TcpStream::connect("192.168.1.40:4000")?;
/// port.set_read_timeout(Some(std::time::Duration::from_millis(5)))?;
///
/// let mut board = Soundboard::without_reset(IoTransport::new(port), SoundboardConfig::default());
///
/// for (index, name) in board.files().iter().enumerate() {
///     println!("{index}: {}", String::from_utf8_lossy(name));
/// }
/// board.set_volume(0.5);
/// board.play_now(0);
/// ```
pub struct Soundboard<T: Transport, R: ResetLine = NoResetLine> {
    pub(crate) client: SoundboardClient<T>,
    pub(crate) reset_line: Option<R>,
    pub(crate) config: SoundboardConfig,
    pub(crate) session: SessionState,
    pub(crate) catalog: TrackCatalog,
    pub(crate) log: DebugLog,
    pub(crate) banner: Option<BootBanner>,
}

impl<T: Transport> Soundboard<T, NoResetLine> {
    /// Create a driver for a board whose reset pin is not connected
    ///
    /// Unanswered commands fail immediately instead of being retried.
    pub fn without_reset(transport: T, config: SoundboardConfig) -> Self {
        Self::new(transport, None, config)
    }
}

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// Create a driver over `transport`, with an optional reset line
    ///
    /// When the configuration names an initial volume the board is stepped
    /// to it before this returns.
    pub fn new(transport: T, reset_line: Option<R>, config: SoundboardConfig) -> Self {
        let client =
            SoundboardClient::with_timing(transport, config.read_timeout(), config.command_settle());

        let mut board = Self {
            client,
            reset_line,
            session: SessionState::default(),
            catalog: TrackCatalog::new(config.strategy()),
            log: DebugLog::new(config.debug()),
            banner: None,
            config,
        };

        if let Some(volume) = board.config.initial_volume() {
            tracing::debug!(?volume, "applying initial volume");
            board.set_volume(volume);
        }

        board
    }

    pub fn config(&self) -> &SoundboardConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.client.transport_mut()
    }

    /// Banner read during the last successful reset
    pub fn boot_banner(&self) -> Option<&BootBanner> {
        self.banner.as_ref()
    }

    /// Index of the track most recently started with [`Soundboard::play`]
    pub fn current_track(&self) -> Option<usize> {
        self.session.current_track
    }

    pub fn has_reset_line(&self) -> bool {
        self.reset_line.is_some()
    }

    pub fn debug_enabled(&self) -> bool {
        self.log.enabled_flag()
    }

    /// Turn per-command debug output on or off for this board only
    pub fn set_debug(&mut self, enabled: bool) {
        self.log.set_enabled(enabled);
    }

    /// Flip per-command debug output, returning the new state
    pub fn toggle_debug(&mut self) -> bool {
        let enabled = !self.log.enabled_flag();
        self.log.set_enabled(enabled);
        enabled
    }

    /// Give back the transport and reset line
    pub fn into_parts(self) -> (T, Option<R>) {
        (self.client.into_transport(), self.reset_line)
    }
}

impl<T: Transport, R: ResetLine> std::fmt::Debug for Soundboard<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Soundboard")
            .field("has_reset_line", &self.reset_line.is_some())
            .field("session", &self.session)
            .field("strategy", &self.catalog.strategy())
            .field("debug", &self.log.enabled_flag())
            .finish_non_exhaustive()
    }
}

/// Block for a hardware delay; zero returns immediately
pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_link::mock::ScriptedTransport;

    #[test]
    fn test_new_board_has_no_session_state() {
        let board = Soundboard::without_reset(ScriptedTransport::new(), SoundboardConfig::immediate());

        assert_eq!(board.current_track(), None);
        assert!(board.boot_banner().is_none());
        assert!(!board.has_reset_line());
        assert!(board.transport().written().is_empty());
    }

    #[test]
    fn test_initial_volume_is_applied() {
        let transport = ScriptedTransport::with_lines(["100", "102", "104"]);
        let config = SoundboardConfig::builder().immediate().initial_volume(104).build();

        let board = Soundboard::without_reset(transport, config);

        // Seed step down, then up until the board reports the target
        assert_eq!(board.transport().written_commands(), vec!["-", "+", "+"]);
    }

    #[test]
    fn test_toggle_debug() {
        let mut board = Soundboard::without_reset(ScriptedTransport::new(), SoundboardConfig::immediate());

        assert!(!board.debug_enabled());
        assert!(board.toggle_debug());
        assert!(board.debug_enabled());
        board.set_debug(false);
        assert!(!board.debug_enabled());
    }
}
