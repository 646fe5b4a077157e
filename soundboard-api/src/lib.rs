//! Wire protocol for Adafruit Audio FX sound boards in UART mode
//!
//! This crate provides the typed command set, reply parsers, and a
//! single-exchange [`SoundboardClient`] for the board's ASCII line protocol.
//! It uses the private `serial-link` crate for the transport itself.
//!
//! ```rust,ignore
//! use soundboard_api::{Command, ResponseMatch, SoundboardClient};
//!
//! let mut client = SoundboardClient::new(transport);
//! let outcome = client.execute(&Command::PlayIndex(0), &ResponseMatch::literal(*b"play"))?;
//! if outcome.is_success() {
//!     println!("playing track 0");
//! }
//! ```
//!
//! The protocol has no absolute volume command, no framing beyond newlines,
//! and no error replies other than `NoFile`; the stateful policy built on
//! top of it (recovery, volume stepping, catalog enumeration) lives in
//! `soundboard-sdk`.

pub mod client;
pub mod command;
pub mod error;
pub mod protocol;
pub mod response;

pub use client::SoundboardClient;
pub use command::Command;
pub use error::{ApiError, Result};
pub use protocol::{BootBanner, ListEntry, PlayReply, Position, SizeReading};
pub use response::{Outcome, ResponseMatch};
