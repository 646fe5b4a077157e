//! Reply formats of the sound board line protocol

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Minimum volume level
pub const MIN_VOLUME: u8 = 0;
/// Maximum volume level
pub const MAX_VOLUME: u8 = 204;
/// Change in level produced by one `+` or `-`
pub const VOLUME_STEP: u8 = 2;

/// Prefix of a successful play reply
pub const PLAY_REPLY: &[u8] = b"play";
/// Prefix of the reply to a play request for a missing track
pub const NO_FILE_REPLY: &[u8] = b"NoFile";
/// Required prefix of the identity line in the boot banner
pub const IDENTITY_PREFIX: &[u8] = b"Adafruit FX Sound Board";

/// Exact width of a `t` reply (`current:total`)
pub const TIME_REPLY_LEN: usize = 11;
/// Exact width of an `s` reply (`remaining/total`)
pub const SIZE_REPLY_LEN: usize = 21;

/// One `name\tsize` line of the `L` listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: Vec<u8>,
    pub size: u64,
}

/// Parse one line of the file listing
pub fn parse_list_line(line: &[u8]) -> Result<ListEntry> {
    let mut fields = line.split(|b| *b == b'\t');
    let (Some(name), Some(size), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ApiError::mismatch("list line without exactly one tab", line));
    };
    if name.is_empty() {
        return Err(ApiError::mismatch("list line without a file name", line));
    }
    Ok(ListEntry {
        name: name.to_vec(),
        size: parse_number(size, "list size", line)?,
    })
}

/// Reply to `#<n>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayReply {
    /// `play\t<n>\t<name>`
    Playing { index: usize, name: Vec<u8> },
    /// `NoFile...`: there is no track at that index
    NoFile,
}

/// Parse the reply to a play-by-index command
pub fn parse_play_reply(line: &[u8]) -> Result<PlayReply> {
    if line.starts_with(NO_FILE_REPLY) {
        return Ok(PlayReply::NoFile);
    }
    let mut fields = line.splitn(3, |b| *b == b'\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(PLAY_REPLY), Some(index), Some(name)) => Ok(PlayReply::Playing {
            index: parse_number(index, "play index", line)?,
            name: name.to_vec(),
        }),
        _ => Err(ApiError::mismatch("play reply", line)),
    }
}

/// Parse the bare integer the board prints after a volume step
pub fn parse_volume(line: &[u8]) -> Result<u8> {
    let level: u8 = parse_number(line, "volume level", line)?;
    if level > MAX_VOLUME {
        return Err(ApiError::mismatch("volume level above maximum", line));
    }
    Ok(level)
}

/// Playback position reported by `t`, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub current: i64,
    pub total: i64,
}

impl Position {
    /// Reported when the board sent nothing back
    pub const UNKNOWN: Position = Position {
        current: -1,
        total: -1,
    };
}

impl From<Position> for (i64, i64) {
    fn from(p: Position) -> Self {
        (p.current, p.total)
    }
}

/// Parse a `t` reply, which must be exactly [`TIME_REPLY_LEN`] bytes
pub fn parse_position(line: &[u8]) -> Result<Position> {
    let (current, total) = split_fixed(line, TIME_REPLY_LEN, b':', "time reply")?;
    Ok(Position { current, total })
}

/// Track size reported by `s`, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReading {
    pub remaining: i64,
    pub total: i64,
}

impl SizeReading {
    /// Reported when the board sent nothing back
    pub const UNKNOWN: SizeReading = SizeReading {
        remaining: -1,
        total: -1,
    };
}

impl From<SizeReading> for (i64, i64) {
    fn from(s: SizeReading) -> Self {
        (s.remaining, s.total)
    }
}

/// Parse an `s` reply, which must be exactly [`SIZE_REPLY_LEN`] bytes
pub fn parse_size(line: &[u8]) -> Result<SizeReading> {
    let (remaining, total) = split_fixed(line, SIZE_REPLY_LEN, b'/', "size reply")?;
    Ok(SizeReading { remaining, total })
}

/// Lines printed by the board after it comes out of reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootBanner {
    /// First line; blank on most firmware, a build date on some
    pub date_line: String,
    /// `Adafruit FX Sound Board ...`
    pub identity: String,
    /// Filesystem type, e.g. `FAT16`
    pub filesystem: String,
    /// Number of files, when the count line contains one
    pub file_count: Option<u32>,
}

impl BootBanner {
    /// Reject a banner whose identity line is not a sound board
    pub fn check_identity(line: &[u8]) -> Result<()> {
        if line.starts_with(IDENTITY_PREFIX) {
            Ok(())
        } else {
            Err(ApiError::DeviceRejected(format!(
                "unexpected identity line {:?}",
                String::from_utf8_lossy(line)
            )))
        }
    }

    /// Build a banner from its four lines, in the order the board prints them
    pub fn from_lines(date: &[u8], identity: &[u8], filesystem: &[u8], count: &[u8]) -> Result<Self> {
        Self::check_identity(identity)?;
        Ok(Self {
            date_line: String::from_utf8_lossy(date).into_owned(),
            identity: String::from_utf8_lossy(identity).into_owned(),
            filesystem: String::from_utf8_lossy(filesystem).into_owned(),
            file_count: first_number(count),
        })
    }
}

fn split_fixed(line: &[u8], width: usize, delimiter: u8, what: &str) -> Result<(i64, i64)> {
    if line.len() != width {
        return Err(ApiError::mismatch(&format!("{} not {} bytes", what, width), line));
    }
    let at = line
        .iter()
        .position(|b| *b == delimiter)
        .ok_or_else(|| ApiError::mismatch(&format!("{} without delimiter", what), line))?;
    let first = parse_number(&line[..at], what, line)?;
    let second = parse_number(&line[at + 1..], what, line)?;
    Ok((first, second))
}

fn parse_number<T: FromStr>(field: &[u8], what: &str, line: &[u8]) -> Result<T> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ApiError::mismatch(what, line))
}

fn first_number(line: &[u8]) -> Option<u32> {
    let start = line.iter().position(u8::is_ascii_digit)?;
    let digits: Vec<u8> = line[start..]
        .iter()
        .copied()
        .take_while(u8::is_ascii_digit)
        .collect();
    std::str::from_utf8(&digits).ok()?.parse().ok()
}
