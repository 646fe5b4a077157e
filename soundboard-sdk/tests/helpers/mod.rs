//! Simulated sound board for integration tests
//!
//! The simulation speaks the UART protocol closely enough to exercise the
//! driver end to end: echoes for multi-character commands, stepped volume
//! clamped to 0..=204, `NoFile` past the last track, a `done` line after
//! `q`, and a boot banner after a reset pulse.

#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use soundboard_sdk::{LinkError, ResetLine, Soundboard, SoundboardConfig, SoundboardConfigBuilder, Transport};

pub const IDENTITY: &str = "Adafruit FX Sound Board 9/26/14";
pub const POWER_ON_VOLUME: u8 = 100;

/// A file stored on the simulated board
#[derive(Debug, Clone)]
pub struct SimFile {
    pub name: String,
    pub size: u64,
    pub seconds: u64,
}

impl SimFile {
    pub fn new(name: &str, size: u64, seconds: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            seconds,
        }
    }
}

/// Everything the simulated board knows, shared by its transport and reset pin
#[derive(Debug)]
pub struct BoardState {
    pub files: Vec<SimFile>,
    /// Replaces the generated `L` output when set
    pub listing: Option<Vec<String>>,
    /// Replaces the generated `t` reply when set
    pub time_reply: Option<String>,
    pub volume: u8,
    pub playing: Option<usize>,
    /// When false the board ignores every command (as in GPIO trigger mode)
    pub responsive: bool,
    /// Commands to ignore before answering again; survives a reset
    pub drop_next: usize,
    /// When false a reset pulse leaves the board dead
    pub reset_works: bool,
    pub identity: String,
    pub in_reset: bool,
    pub resets: usize,
    pub commands: Vec<String>,
    outbox: VecDeque<Vec<u8>>,
}

impl BoardState {
    fn new(files: Vec<SimFile>) -> Self {
        Self {
            files,
            listing: None,
            time_reply: None,
            volume: POWER_ON_VOLUME,
            playing: None,
            responsive: true,
            drop_next: 0,
            reset_works: true,
            identity: IDENTITY.to_string(),
            in_reset: false,
            resets: 0,
            commands: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    fn say(&mut self, line: impl Into<String>) {
        let mut bytes = line.into().into_bytes();
        bytes.extend_from_slice(b"\r");
        self.outbox.push_back(bytes);
    }

    fn start(&mut self, index: usize) {
        self.playing = Some(index);
        let name = self.files[index].name.clone();
        self.say(format!("play\t{}\t{}", index, name));
    }

    fn handle(&mut self, command: &str) {
        self.commands.push(command.to_string());

        if self.in_reset || !self.responsive {
            return;
        }
        if self.drop_next > 0 {
            self.drop_next -= 1;
            return;
        }

        if command.len() > 1 {
            self.say(command);
        }

        match command.as_bytes().first() {
            Some(b'L') => {
                let lines = match &self.listing {
                    Some(lines) => lines.clone(),
                    None => self
                        .files
                        .iter()
                        .map(|f| format!("{}\t{}", f.name, f.size))
                        .collect(),
                };
                for line in lines {
                    self.say(line);
                }
            }
            Some(b'#') => match command[1..].parse::<usize>() {
                Ok(index) if index < self.files.len() => self.start(index),
                _ => self.say("NoFile"),
            },
            Some(b'P') => match self.files.iter().position(|f| f.name == command[1..]) {
                Some(index) => self.start(index),
                None => self.say("NoFile"),
            },
            Some(b'+') => {
                self.volume = (self.volume + 2).min(204);
                self.say(self.volume.to_string());
            }
            Some(b'-') => {
                self.volume = self.volume.saturating_sub(2);
                self.say(self.volume.to_string());
            }
            Some(b'=') => self.say("="),
            Some(b'>') => self.say(">"),
            Some(b'q') => {
                self.playing = None;
                self.say("q");
                self.say("done\r");
            }
            Some(b't') => {
                let reply = match (&self.time_reply, self.playing) {
                    (Some(reply), _) => reply.clone(),
                    (None, Some(index)) => format!("{:05}:{:05}", 1, self.files[index].seconds),
                    (None, None) => format!("{:05}:{:05}", 0, 0),
                };
                self.say(reply);
            }
            Some(b's') => {
                let size = self.playing.map(|i| self.files[i].size).unwrap_or(0);
                self.say(format!("{:010}/{:010}", size, size));
            }
            _ => {}
        }
    }
}

/// Handle on a simulated board
#[derive(Debug, Clone)]
pub struct SimulatedBoard {
    state: Rc<RefCell<BoardState>>,
}

impl SimulatedBoard {
    /// A board holding three tracks
    pub fn new() -> Self {
        Self::with_files(vec![
            SimFile::new("T00     OGG", 48_213, 4),
            SimFile::new("T01     WAV", 352_844, 2),
            SimFile::new("BOOM    WAV", 88_200, 1),
        ])
    }

    pub fn with_files(files: Vec<SimFile>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BoardState::new(files))),
        }
    }

    /// A board holding `count` uniquely named tracks
    pub fn with_track_count(count: usize) -> Self {
        Self::with_files(
            (0..count)
                .map(|i| SimFile::new(&format!("T{:02}     OGG", i), 1000 + i as u64, i as u64 % 7))
                .collect(),
        )
    }

    pub fn transport(&self) -> SimTransport {
        SimTransport {
            state: Rc::clone(&self.state),
        }
    }

    pub fn reset_line(&self) -> SimResetLine {
        SimResetLine {
            state: Rc::clone(&self.state),
        }
    }

    /// Driver with a reset line and no hardware delays
    pub fn soundboard(&self) -> Soundboard<SimTransport, SimResetLine> {
        self.soundboard_with(SoundboardConfig::builder())
    }

    pub fn soundboard_with(&self, builder: SoundboardConfigBuilder) -> Soundboard<SimTransport, SimResetLine> {
        Soundboard::new(self.transport(), Some(self.reset_line()), builder.immediate().build())
    }

    /// Driver with no reset line and no hardware delays
    pub fn soundboard_without_reset(&self) -> Soundboard<SimTransport> {
        Soundboard::without_reset(self.transport(), SoundboardConfig::immediate())
    }

    pub fn state(&self) -> Ref<'_, BoardState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, BoardState> {
        self.state.borrow_mut()
    }

    pub fn volume(&self) -> u8 {
        self.state().volume
    }

    pub fn resets(&self) -> usize {
        self.state().resets
    }

    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state_mut().commands.clear();
    }

    /// Commands matching `prefix` in the order they were sent
    pub fn commands_starting_with(&self, prefix: &str) -> Vec<String> {
        self.commands().into_iter().filter(|c| c.starts_with(prefix)).collect()
    }

    pub fn drop_next(&self, count: usize) {
        self.state_mut().drop_next = count;
    }

    /// Stop answering, and make resets unable to revive the board
    pub fn go_dead(&self) {
        let mut state = self.state_mut();
        state.responsive = false;
        state.reset_works = false;
    }

    pub fn set_listing(&self, lines: &[&str]) {
        self.state_mut().listing = Some(lines.iter().map(|l| l.to_string()).collect());
    }

    pub fn set_time_reply(&self, reply: &str) {
        self.state_mut().time_reply = Some(reply.to_string());
    }

    pub fn set_identity(&self, identity: &str) {
        self.state_mut().identity = identity.to_string();
    }
}

#[derive(Debug)]
pub struct SimTransport {
    state: Rc<RefCell<BoardState>>,
}

impl Transport for SimTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let text = String::from_utf8_lossy(bytes);
        self.state.borrow_mut().handle(text.trim_end_matches('\n'));
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<Vec<u8>, LinkError> {
        self.state.borrow_mut().outbox.pop_front().ok_or(LinkError::Timeout)
    }

    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        let mut state = self.state.borrow_mut();
        if state.outbox.is_empty() {
            return Ok(None);
        }
        let mut stale = Vec::new();
        for mut line in state.outbox.drain(..) {
            line.push(b'\n');
            stale.extend(line);
        }
        Ok(Some(stale))
    }
}

#[derive(Debug)]
pub struct SimResetLine {
    state: Rc<RefCell<BoardState>>,
}

impl ResetLine for SimResetLine {
    fn assert_reset(&mut self) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.in_reset = true;
        state.outbox.clear();
        Ok(())
    }

    fn deassert_reset(&mut self) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.in_reset = false;
        state.resets += 1;
        if !state.reset_works {
            return Ok(());
        }

        state.responsive = true;
        state.volume = POWER_ON_VOLUME;
        state.playing = None;
        let identity = state.identity.clone();
        let count = format!("Files: {}", state.files.len());
        state.say("");
        state.say(identity);
        state.say("FAT16");
        state.say(count);
        Ok(())
    }
}
