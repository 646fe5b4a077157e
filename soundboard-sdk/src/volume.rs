//! Relative volume control
//!
//! The board has no "set volume" command. It only steps up or down by
//! [`VOLUME_STEP`] and prints the resulting level, so the driver tracks the
//! last reported level and walks toward a target one step at a time.

use serial_link::{ResetLine, Transport};
use soundboard_api::protocol::{parse_volume, MAX_VOLUME, MIN_VOLUME, VOLUME_STEP};
use soundboard_api::{Command, ResponseMatch};

use crate::Soundboard;

/// Upper bound on steps for one [`Soundboard::set_volume`] call
const MAX_VOLUME_STEPS: usize = 2 * (MAX_VOLUME / VOLUME_STEP) as usize + 2;

/// A requested volume, either as a level or as a fraction of the maximum
///
/// Integers are levels in `0..=204`; floats are fractions of 204. Anything
/// out of range is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeTarget {
    Level(i32),
    Fraction(f64),
}

impl VolumeTarget {
    /// The clamped device level this target asks for
    pub fn level(self) -> u8 {
        let raw = match self {
            VolumeTarget::Level(level) => level,
            VolumeTarget::Fraction(fraction) => (fraction * f64::from(MAX_VOLUME)) as i32,
        };
        raw.clamp(i32::from(MIN_VOLUME), i32::from(MAX_VOLUME)) as u8
    }
}

impl From<i32> for VolumeTarget {
    fn from(level: i32) -> Self {
        VolumeTarget::Level(level)
    }
}

impl From<u8> for VolumeTarget {
    fn from(level: u8) -> Self {
        VolumeTarget::Level(i32::from(level))
    }
}

impl From<f64> for VolumeTarget {
    fn from(fraction: f64) -> Self {
        VolumeTarget::Fraction(fraction)
    }
}

impl From<f32> for VolumeTarget {
    fn from(fraction: f32) -> Self {
        VolumeTarget::Fraction(f64::from(fraction))
    }
}

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// Current volume level
    ///
    /// The first call on a fresh session has nothing cached, so it steps the
    /// volume down once to learn the level. Returns `None` if the board
    /// doesn't answer.
    pub fn volume(&mut self) -> Option<u8> {
        if self.session.current_volume.is_none() {
            self.volume_down();
        }
        self.session.current_volume
    }

    /// Step the volume up once and return the reported level
    pub fn volume_up(&mut self) -> Option<u8> {
        self.step_volume(&Command::VolumeUp)
    }

    /// Step the volume down once and return the reported level
    pub fn volume_down(&mut self) -> Option<u8> {
        self.step_volume(&Command::VolumeDown)
    }

    /// Walk the volume to `target`
    ///
    /// Stepping stops once the level the board reports reaches or passes the
    /// target, so the result is within one step of it. Returns the final
    /// reported level, or `None` if a step went unanswered (the level is then
    /// unknown until the next successful step).
    pub fn set_volume(&mut self, target: impl Into<VolumeTarget>) -> Option<u8> {
        let target = target.into().level();
        let reached = self.operation(|board| {
            let start = board.volume()?;
            let previous = board.log.suppress();
            let reached = board.step_toward(start, target);
            board.log.restore(previous);
            reached
        });

        board_debug!(self.log, target_level = target, ?reached, "volume set");
        reached
    }

    fn step_toward(&mut self, start: u8, target: u8) -> Option<u8> {
        let up = target > start;
        let command = if up { Command::VolumeUp } else { Command::VolumeDown };

        let mut level = start;
        for _ in 0..MAX_VOLUME_STEPS {
            let reached = if up { level >= target } else { level <= target };
            if reached {
                return Some(level);
            }
            level = self.step_volume(&command)?;
        }

        tracing::warn!(target_level = target, level, "volume did not converge");
        Some(level)
    }

    fn step_volume(&mut self, command: &Command) -> Option<u8> {
        let line = self.send(command, ResponseMatch::Raw).into_line();
        let level = line.and_then(|line| match parse_volume(&line) {
            Ok(level) => Some(level),
            Err(error) => {
                tracing::warn!(%error, "unreadable volume reply");
                None
            }
        });

        self.session.current_volume = level;
        board_debug!(self.log, command = %command, ?level, "volume step");
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SoundboardConfig;
    use rstest::rstest;
    use serial_link::mock::ScriptedTransport;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[rstest]
    #[case(VolumeTarget::from(100), 100)]
    #[case(VolumeTarget::from(1000), 204)]
    #[case(VolumeTarget::from(-5), 0)]
    #[case(VolumeTarget::from(204u8), 204)]
    #[case(VolumeTarget::from(0.5), 102)]
    #[case(VolumeTarget::from(1.0f32), 204)]
    #[case(VolumeTarget::from(2.5), 204)]
    #[case(VolumeTarget::from(-0.1), 0)]
    fn test_target_level(#[case] target: VolumeTarget, #[case] expected: u8) {
        assert_eq!(target.level(), expected);
    }

    #[test]
    fn test_step_bound() {
        assert_eq!(MAX_VOLUME_STEPS, 206);
    }

    #[test]
    fn test_volume_seeds_with_one_step_down() {
        let mut board =
            Soundboard::without_reset(ScriptedTransport::with_lines(["98"]), SoundboardConfig::immediate());

        assert_eq!(board.volume(), Some(98));
        assert_eq!(board.volume(), Some(98));
        assert_eq!(board.transport().written_commands(), vec!["-"]);
    }

    #[test]
    fn test_set_volume_down() {
        let transport = ScriptedTransport::with_lines(["100", "98", "96", "94"]);
        let mut board = Soundboard::without_reset(transport, SoundboardConfig::immediate());

        assert_eq!(board.set_volume(95), Some(94));
        assert_eq!(board.transport().written_commands(), vec!["-", "-", "-", "-"]);
    }

    #[test]
    fn test_set_volume_already_there() {
        let transport = ScriptedTransport::with_lines(["60"]);
        let mut board = Soundboard::without_reset(transport, SoundboardConfig::immediate());

        assert_eq!(board.set_volume(60), Some(60));
        assert_eq!(board.transport().written_commands(), vec!["-"]);
    }

    #[test]
    fn test_set_volume_mutes_debug_output_while_stepping() {
        let transport = ScriptedTransport::with_lines(["100", "98", "96", "94"]);
        let mut board = Soundboard::without_reset(transport, SoundboardConfig::immediate());
        board.set_debug(true);

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(captured.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(board.set_volume(94), Some(94));
        });

        // Only the seed step is traced; the three steps toward the target are muted
        let output = captured.text();
        assert_eq!(output.matches("sending").count(), 1);
        assert_eq!(output.matches("volume step").count(), 1);
        assert!(output.contains("volume set"));
        assert!(board.debug_enabled());
        assert!(board.log.is_enabled());
    }

    #[test]
    fn test_garbled_step_aborts() {
        let transport = ScriptedTransport::with_lines(["100", "102", "loud"]);
        let mut board = Soundboard::without_reset(transport, SoundboardConfig::immediate());

        assert_eq!(board.set_volume(200), None);
        assert_eq!(board.session.current_volume, None);
        assert_eq!(board.transport().written_commands(), vec!["-", "+", "+"]);
    }

    #[test]
    fn test_stuck_firmware_is_bounded() {
        let replies = std::iter::repeat("50").take(MAX_VOLUME_STEPS + 1);
        let mut board =
            Soundboard::without_reset(ScriptedTransport::with_lines(replies), SoundboardConfig::immediate());

        assert_eq!(board.set_volume(204), Some(50));
        assert_eq!(board.transport().written().len(), MAX_VOLUME_STEPS + 1);
    }
}
