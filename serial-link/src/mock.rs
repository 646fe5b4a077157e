//! Scripted transport and reset line for tests
//!
//! [`ScriptedTransport`] plays back a fixed queue of replies regardless of
//! what was written, and records every write so tests can assert on the exact
//! wire traffic. For a stateful device model build a dedicated [`Transport`]
//! in the test suite instead.

use std::collections::VecDeque;
use std::time::Duration;

use crate::{LinkError, ResetLine, Transport};

/// One scripted reaction to a `read_line` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Hand back this line
    Line(Vec<u8>),
    /// Time out
    Silence,
    /// Fail with the given error
    Fail(LinkError),
}

/// Transport that replays scripted replies in order
///
/// Once the script runs out every read times out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    stale: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    reads: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a script of plain lines
    pub fn with_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut transport = Self::new();
        for line in lines {
            transport.push_line(line);
        }
        transport
    }

    pub fn push_line(&mut self, line: impl AsRef<[u8]>) -> &mut Self {
        self.replies.push_back(Reply::Line(line.as_ref().to_vec()));
        self
    }

    pub fn push_silence(&mut self) -> &mut Self {
        self.replies.push_back(Reply::Silence);
        self
    }

    pub fn push_error(&mut self, error: LinkError) -> &mut Self {
        self.replies.push_back(Reply::Fail(error));
        self
    }

    /// Queue bytes that only `read_available` will see
    pub fn push_stale(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.stale.push_back(bytes.as_ref().to_vec());
        self
    }

    /// Raw writes in order, newline included
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Writes rendered as strings with the trailing newline removed
    pub fn written_commands(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|w| String::from_utf8_lossy(w).trim_end_matches('\n').to_string())
            .collect()
    }

    /// Number of `read_line` calls served so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    pub fn stale_remaining(&self) -> usize {
        self.stale.len()
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<Vec<u8>, LinkError> {
        self.reads += 1;
        match self.replies.pop_front() {
            Some(Reply::Line(line)) => Ok(line),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Silence) | None => Err(LinkError::Timeout),
        }
    }

    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        Ok(self.stale.pop_front())
    }
}

/// Edge recorded by [`RecordingResetLine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetEdge {
    Asserted,
    Deasserted,
}

/// Reset line that records every edge
#[derive(Debug, Default, Clone)]
pub struct RecordingResetLine {
    edges: Vec<ResetEdge>,
    broken: bool,
}

impl RecordingResetLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line whose driver reports an error on every call
    pub fn broken() -> Self {
        Self {
            edges: Vec::new(),
            broken: true,
        }
    }

    pub fn edges(&self) -> &[ResetEdge] {
        &self.edges
    }

    /// Completed assert/deassert pairs
    pub fn pulses(&self) -> usize {
        self.edges
            .iter()
            .filter(|e| **e == ResetEdge::Deasserted)
            .count()
    }

    fn record(&mut self, edge: ResetEdge) -> Result<(), LinkError> {
        if self.broken {
            return Err(LinkError::Io("reset pin unavailable".to_string()));
        }
        self.edges.push(edge);
        Ok(())
    }
}

impl ResetLine for RecordingResetLine {
    fn assert_reset(&mut self) -> Result<(), LinkError> {
        self.record(ResetEdge::Asserted)
    }

    fn deassert_reset(&mut self) -> Result<(), LinkError> {
        self.record(ResetEdge::Deasserted)
    }
}
