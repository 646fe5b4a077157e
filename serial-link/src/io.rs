//! [`Transport`] adapter over blocking `std::io` streams

use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::{LinkError, Transport};

const READ_CHUNK: usize = 256;

/// Back-off between empty reads while waiting for a line
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Line framing on top of any `Read + Write` stream
///
/// The stream is expected to carry its own short read timeout (as serial
/// port handles do). `TimedOut` and `WouldBlock` from the stream count as
/// "no data yet"; [`Transport::read_line`] keeps polling until a newline
/// arrives or its own deadline passes, sleeping briefly after each empty
/// read, so non-blocking streams work too. Bytes received past a newline
/// are kept for the next call.
#[derive(Debug)]
pub struct IoTransport<S> {
    stream: S,
    pending: Vec<u8>,
}

impl<S: Read + Write> IoTransport<S> {
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the stream, discarding any partially received line
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    /// Pull one chunk from the stream. `Ok(0)` means nothing was waiting.
    fn fill(&mut self) -> Result<usize, LinkError> {
        let mut chunk = [0u8; READ_CHUNK];
        match self.stream.read(&mut chunk) {
            Ok(0) => Err(LinkError::Closed),
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(e) => match e.kind() {
                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => Ok(0),
                _ => Err(e.into()),
            },
        }
    }
}

impl<S: Read + Write> Transport for IoTransport<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        tracing::trace!(len = bytes.len(), "serial write");
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, LinkError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            if self.fill()? == 0 {
                let now = Instant::now();
                if now >= deadline {
                    return Err(LinkError::Timeout);
                }
                // Non-blocking streams return at once; don't spin on them
                thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
        }
    }

    fn read_available(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        match self.fill() {
            Ok(_) | Err(LinkError::Closed) => {}
            Err(e) => return Err(e),
        }
        if self.pending.is_empty() {
            return Ok(None);
        }
        tracing::trace!(len = self.pending.len(), "serial input drained");
        Ok(Some(std::mem::take(&mut self.pending)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Stream that hands out one pre-cut chunk per read and times out once
    /// the chunks run dry
    #[derive(Default)]
    struct ChunkedStream {
        chunks: VecDeque<Vec<u8>>,
        written: Vec<u8>,
        closed: bool,
        reads: usize,
    }

    impl ChunkedStream {
        fn with_chunks(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                ..Default::default()
            }
        }
    }

    impl Read for ChunkedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None if self.closed => Ok(0),
                None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
            }
        }
    }

    impl Write for ChunkedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_split_across_chunks() {
        let stream = ChunkedStream::with_chunks(&[b"pl", b"ay\t0\tBOOM", b"    OGG\r\n"]);
        let mut transport = IoTransport::new(stream);

        let line = transport.read_line(Duration::from_millis(5)).unwrap();
        assert_eq!(line, b"play\t0\tBOOM    OGG\r");
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let stream = ChunkedStream::with_chunks(&[b"q\ndone\r\r\n"]);
        let mut transport = IoTransport::new(stream);

        assert_eq!(transport.read_line(Duration::ZERO).unwrap(), b"q");
        assert_eq!(transport.read_line(Duration::ZERO).unwrap(), b"done\r\r");
    }

    #[test]
    fn test_read_line_times_out_without_newline() {
        let stream = ChunkedStream::with_chunks(&[b"00012"]);
        let mut transport = IoTransport::new(stream);

        let result = transport.read_line(Duration::from_millis(2));
        assert_eq!(result, Err(LinkError::Timeout));

        // The partial line is kept for the next read
        transport.get_mut().chunks.push_back(b":00034\n".to_vec());
        assert_eq!(transport.read_line(Duration::ZERO).unwrap(), b"00012:00034");
    }

    #[test]
    fn test_read_line_backs_off_between_empty_reads() {
        let mut transport = IoTransport::new(ChunkedStream::default());

        let result = transport.read_line(Duration::from_millis(20));

        assert_eq!(result, Err(LinkError::Timeout));
        assert!(transport.get_mut().reads < 50, "{} reads", transport.get_mut().reads);
    }

    #[test]
    fn test_read_line_on_closed_stream() {
        let mut stream = ChunkedStream::default();
        stream.closed = true;
        let mut transport = IoTransport::new(stream);

        assert_eq!(transport.read_line(Duration::ZERO), Err(LinkError::Closed));
    }

    #[test]
    fn test_read_available_drains_buffer() {
        let stream = ChunkedStream::with_chunks(&[b"stale\nlines"]);
        let mut transport = IoTransport::new(stream);

        let drained = transport.read_available().unwrap();
        assert_eq!(drained.as_deref(), Some(&b"stale\nlines"[..]));
        assert_eq!(transport.read_available().unwrap(), None);
    }

    #[test]
    fn test_write_passes_bytes_through() {
        let mut transport = IoTransport::new(ChunkedStream::default());
        transport.write(b"#3\n").unwrap();

        assert_eq!(transport.into_inner().written, b"#3\n");
    }
}
