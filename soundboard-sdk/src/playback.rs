//! Playback control and track readouts

use serial_link::{ResetLine, Transport};
use soundboard_api::protocol::{parse_position, parse_size, PLAY_REPLY};
use soundboard_api::{ApiError, Command, Position, ResponseMatch, SizeReading};

use crate::Soundboard;

/// A track given by index or by its 8.3 name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRef {
    Index(usize),
    Name(Vec<u8>),
}

impl From<usize> for TrackRef {
    fn from(index: usize) -> Self {
        TrackRef::Index(index)
    }
}

impl From<Vec<u8>> for TrackRef {
    fn from(name: Vec<u8>) -> Self {
        TrackRef::Name(name)
    }
}

impl From<&[u8]> for TrackRef {
    fn from(name: &[u8]) -> Self {
        TrackRef::Name(name.to_vec())
    }
}

impl From<&str> for TrackRef {
    fn from(name: &str) -> Self {
        TrackRef::Name(name.as_bytes().to_vec())
    }
}

impl From<String> for TrackRef {
    fn from(name: String) -> Self {
        TrackRef::Name(name.into_bytes())
    }
}

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// Start a track
    ///
    /// Returns `true` if the board acknowledged with `play`. A track given by
    /// name is matched against the cached catalog to record the current
    /// index; playing by name never enumerates the catalog.
    pub fn play(&mut self, track: impl Into<TrackRef>) -> bool {
        let (command, index) = match track.into() {
            TrackRef::Index(index) => (Command::PlayIndex(index), Some(index)),
            TrackRef::Name(name) => {
                let index = self.catalog.cached().and_then(|c| c.track_num(&name));
                (Command::PlayName(name), index)
            }
        };

        let started = self.send(&command, ResponseMatch::literal(PLAY_REPLY)).is_success();
        if started {
            self.session.current_track = index;
        }
        board_debug!(self.log, command = %command, started, "play");
        started
    }

    /// Stop whatever is playing, then start `track`
    pub fn play_now(&mut self, track: impl Into<TrackRef>) -> bool {
        let track = track.into();
        self.operation(|board| {
            board.stop();
            board.play(track)
        })
    }

    /// Stop playback
    pub fn stop(&mut self) -> bool {
        let stopped = self.send(&Command::Stop, ResponseMatch::CommandPrefix).is_success();
        if stopped {
            // The board follows `q` with a `done` line once playback has ended
            if let Ok(ack) = self.client.read_response() {
                board_debug!(self.log, ack = %String::from_utf8_lossy(&ack), "stop acknowledged");
            }
        }
        stopped
    }

    pub fn pause(&mut self) -> bool {
        self.send(&Command::Pause, ResponseMatch::CommandPrefix).is_success()
    }

    pub fn unpause(&mut self) -> bool {
        self.send(&Command::Unpause, ResponseMatch::CommandPrefix).is_success()
    }

    /// Elapsed and total seconds of the current track
    ///
    /// Gives [`Position::UNKNOWN`] when the board says nothing, and
    /// [`ApiError::ProtocolMismatch`] when it answers in the wrong format.
    pub fn track_time(&mut self) -> Result<Position, ApiError> {
        match self.send(&Command::TrackTime, ResponseMatch::Raw).into_line() {
            Some(line) if !line.is_empty() => parse_position(&line),
            _ => Ok(Position::UNKNOWN),
        }
    }

    /// Remaining and total bytes of the current track
    ///
    /// Gives [`SizeReading::UNKNOWN`] when the board says nothing, and
    /// [`ApiError::ProtocolMismatch`] when it answers in the wrong format.
    pub fn track_size(&mut self) -> Result<SizeReading, ApiError> {
        match self.send(&Command::TrackSize, ResponseMatch::Raw).into_line() {
            Some(line) if !line.is_empty() => parse_size(&line),
            _ => Ok(SizeReading::UNKNOWN),
        }
    }
}
