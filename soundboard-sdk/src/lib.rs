//! # Sound Board SDK - driver for Adafruit Audio FX sound boards
//!
//! Controls an Adafruit Audio FX Sound Board wired in UART mode: playback,
//! stepped volume, track discovery, and hardware reset when the board stops
//! answering.
//!
//! ```rust,ignore
//! use soundboard_sdk::{EnumerationStrategy, Soundboard, SoundboardConfig};
//!
//! let config = SoundboardConfig::builder()
//!     .strategy(EnumerationStrategy::Direct)
//!     .initial_volume(0.6)
//!     .build();
//! let mut board = Soundboard::new(uart, Some(reset_pin), config);
//!
//! println!("{} tracks", board.files().len());
//! if board.play_now("T01     OGG") {
//!     let position = board.track_time()?;
//!     println!("{}s of {}s", position.current, position.total);
//! }
//! ```
//!
//! ## Recovery
//!
//! Every command is a single line followed by a bounded wait for the reply.
//! When that wait comes up empty the board is reset through its `RST` pin,
//! the previous volume is stepped back into place, and the command is sent
//! one more time. There is never a second reset for the same call.
//!
//! ## Architecture
//!
//! ```text
//! soundboard-sdk (Soundboard: recovery, volume, catalog, playback)
//!     ↓
//! soundboard-api (Command, ResponseMatch, reply parsers, SoundboardClient)
//!     ↓
//! serial-link (Transport, ResetLine, IoTransport)
//! ```

#[macro_use]
mod logging;

mod board;
mod catalog;
mod channel;
mod config;
mod playback;
mod reset;
mod volume;

pub use board::Soundboard;
pub use catalog::{Catalog, EnumerationStrategy, Track};
pub use config::{SoundboardConfig, SoundboardConfigBuilder};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use playback::TrackRef;
pub use volume::VolumeTarget;

pub use serial_link::{IoTransport, LinkError, NoResetLine, ResetLine, Transport};
pub use soundboard_api::{ApiError, BootBanner, Position, SizeReading};

/// Constants for configuring a [`Soundboard`]
pub mod defaults {
    pub use crate::config::{
        DEFAULT_BOOT_DELAY, DEFAULT_PROBE_SETTLE, DEFAULT_RESET_PULSE, MAX_READ_TIMEOUT,
        MIN_READ_TIMEOUT,
    };
    pub use serial_link::BAUD_RATE;
    pub use soundboard_api::client::{DEFAULT_COMMAND_SETTLE, DEFAULT_READ_TIMEOUT};
}

/// Test doubles for code built on this crate
#[cfg(feature = "test-support")]
pub mod test_support {
    pub use serial_link::mock::{RecordingResetLine, Reply, ResetEdge, ScriptedTransport};
}
