//! Commands understood by the sound board in UART mode

use std::fmt;

/// A single command on the wire
///
/// Every command is an ASCII token terminated by a newline. Commands longer
/// than one character are echoed back by the board before its real reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// `L`: list files with their sizes
    ListFiles,
    /// `#<n>`: play the track at index `n`
    PlayIndex(usize),
    /// `P<name>`: play the track with this file name
    PlayName(Vec<u8>),
    /// `+`: raise the volume one step
    VolumeUp,
    /// `-`: lower the volume one step
    VolumeDown,
    /// `=`: pause playback
    Pause,
    /// `>`: resume playback
    Unpause,
    /// `q`: stop playback
    Stop,
    /// `t`: current position and total time of the playing track
    TrackTime,
    /// `s`: remaining and total size of the playing track
    TrackSize,
}

impl Command {
    /// The command token without its trailing newline
    ///
    /// Line breaks inside a file name are dropped so one command can never
    /// frame as two.
    pub fn to_wire(&self) -> Vec<u8> {
        match self {
            Command::ListFiles => b"L".to_vec(),
            Command::PlayIndex(n) => format!("#{}", n).into_bytes(),
            Command::PlayName(name) => {
                let mut wire = Vec::with_capacity(name.len() + 1);
                wire.push(b'P');
                wire.extend(name.iter().copied().filter(|b| *b != b'\n' && *b != b'\r'));
                wire
            }
            Command::VolumeUp => b"+".to_vec(),
            Command::VolumeDown => b"-".to_vec(),
            Command::Pause => b"=".to_vec(),
            Command::Unpause => b">".to_vec(),
            Command::Stop => b"q".to_vec(),
            Command::TrackTime => b"t".to_vec(),
            Command::TrackSize => b"s".to_vec(),
        }
    }

    /// The command token followed by the newline terminator
    pub fn to_frame(&self) -> Vec<u8> {
        let mut frame = self.to_wire();
        frame.push(b'\n');
        frame
    }

    /// First byte of the token, which single-character replies echo
    pub fn first_byte(&self) -> u8 {
        match self {
            Command::ListFiles => b'L',
            Command::PlayIndex(_) => b'#',
            Command::PlayName(_) => b'P',
            Command::VolumeUp => b'+',
            Command::VolumeDown => b'-',
            Command::Pause => b'=',
            Command::Unpause => b'>',
            Command::Stop => b'q',
            Command::TrackTime => b't',
            Command::TrackSize => b's',
        }
    }

    /// Whether the board echoes this command before replying
    pub fn echoes(&self) -> bool {
        match self {
            Command::PlayIndex(_) | Command::PlayName(_) => self.to_wire().len() > 1,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ListFiles => "list",
            Command::PlayIndex(_) => "play-index",
            Command::PlayName(_) => "play-name",
            Command::VolumeUp => "volume-up",
            Command::VolumeDown => "volume-down",
            Command::Pause => "pause",
            Command::Unpause => "unpause",
            Command::Stop => "stop",
            Command::TrackTime => "time",
            Command::TrackSize => "size",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_wire()))
    }
}
