//! Growable in-memory stream
//!
//! [`StreamBuffer`] adapts push-style and pull-style I/O to request and
//! response payloads. Its logical size and its cursor move independently:
//! a seek may put the cursor past the end, reads there return nothing and
//! writes land at the current end, never leaving a gap.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};

/// Size of the intermediate chunk used by [`StreamBuffer::load`] and [`pipe`]
pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read/write position
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Write `bytes` at `min(cursor, len)`, overwriting then extending
    ///
    /// Returns the number of bytes written: all of them, or 0 when the
    /// storage could not grow (nothing is committed in that case).
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let offset = self.cursor.min(self.data.len());
        let end = offset + bytes.len();

        if end > self.data.len() && self.data.try_reserve(end - self.data.len()).is_err() {
            return 0;
        }

        let overlap = (self.data.len() - offset).min(bytes.len());
        self.data[offset..offset + overlap].copy_from_slice(&bytes[..overlap]);
        self.data.extend_from_slice(&bytes[overlap..]);
        self.cursor = end;

        bytes.len()
    }

    /// Copy up to `buf.len()` bytes from the cursor, advancing it
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        if self.cursor >= self.data.len() {
            return 0;
        }

        let count = buf.len().min(self.data.len() - self.cursor);
        buf[..count].copy_from_slice(&self.data[self.cursor..self.cursor + count]);
        self.cursor += count;
        count
    }

    /// Append everything `source` yields, growing storage by doubling
    ///
    /// Storage is shrunk to the exact size once the source is exhausted.
    /// Returns the number of bytes loaded.
    pub fn load<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<usize> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let start = self.data.len();

        loop {
            let count = match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            let needed = self.data.len() + count;
            if needed > self.data.capacity() {
                let target = needed * 2;
                tracing::trace!(from = self.data.capacity(), to = target, "Growing stream buffer");
                self.data
                    .try_reserve_exact(target - self.data.len())
                    .map_err(|_| Error::Alloc)?;
            }
            self.data.extend_from_slice(&chunk[..count]);
        }

        self.data.shrink_to_fit();
        Ok(self.data.len() - start)
    }
}

/// Copy `source` into `sink` through a fixed-size chunk
///
/// Each pulled chunk must be fully pushed before the next pull. Returns
/// `false` when the sink stops accepting data before a chunk is drained, or
/// when either side reports an error.
pub fn pipe<R, W>(source: &mut R, sink: &mut W) -> bool
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let pulled = match source.read(&mut chunk) {
            Ok(0) => return true,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Pipe source failed");
                return false;
            }
        };

        let mut pending = &chunk[..pulled];
        while !pending.is_empty() {
            match sink.write(pending) {
                Ok(0) => break,
                Ok(n) => pending = &pending[n.min(pending.len())..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Pipe sink failed");
                    break;
                }
            }
        }

        if !pending.is_empty() {
            return false;
        }
    }
}

impl Read for StreamBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf))
    }
}

impl Write for StreamBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() && self.write_bytes(buf) == 0 {
            return Err(io::ErrorKind::OutOfMemory.into());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for StreamBuffer {
    /// Any non-negative resulting position is accepted, including positions
    /// past the end; negative or overflowing positions are rejected and leave
    /// the cursor unchanged.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => (0i128, i128::from(n)),
            SeekFrom::Current(n) => (self.cursor as i128, i128::from(n)),
            SeekFrom::End(n) => (self.data.len() as i128, i128::from(n)),
        };

        let target = usize::try_from(base + offset).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to an invalid position")
        })?;

        self.cursor = target;
        Ok(target as u64)
    }
}

impl From<Vec<u8>> for StreamBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data, cursor: 0 }
    }
}

impl From<&[u8]> for StreamBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that accepts a fixed number of bytes, then reports no capacity
    struct LimitedSink {
        capacity: usize,
        received: Vec<u8>,
    }

    impl Write for LimitedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let count = buf.len().min(self.capacity);
            self.capacity -= count;
            self.received.extend_from_slice(&buf[..count]);
            Ok(count)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Source that yields its chunks one read at a time
    struct ChunkedSource(Vec<Vec<u8>>);

    impl Read for ChunkedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let chunk = self.0.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_write_then_read_back() {
        for n in [0usize, 1, 10, CHUNK_SIZE, 3 * CHUNK_SIZE + 7] {
            let input: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
            let mut stream = StreamBuffer::new();
            assert_eq!(stream.write_bytes(&input), n);

            stream.rewind().unwrap();
            let mut output = vec![0u8; n];
            assert_eq!(stream.read_bytes(&mut output), n);
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_write_overwrites_at_cursor() {
        let mut stream = StreamBuffer::from(b"hello world".as_slice());
        stream.seek(SeekFrom::Start(6)).unwrap();
        stream.write_bytes(b"there!");
        assert_eq!(stream.as_bytes(), b"hello there!");
        assert_eq!(stream.position(), 12);
        assert_eq!(stream.len(), 12);
    }

    #[test]
    fn test_write_past_end_clamps_to_size() {
        let mut stream = StreamBuffer::from(b"abc".as_slice());
        stream.seek(SeekFrom::Start(10)).unwrap();
        stream.write_bytes(b"de");
        assert_eq!(stream.as_bytes(), b"abcde");
        assert_eq!(stream.position(), 5);
    }

    #[test]
    fn test_read_is_bounded_by_size() {
        let mut stream = StreamBuffer::from(b"abcdef".as_slice());
        let mut buf = [0u8; 4];
        assert_eq!(stream.read_bytes(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(stream.read_bytes(&mut buf), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(stream.read_bytes(&mut buf), 0);

        stream.seek(SeekFrom::End(5)).unwrap();
        assert_eq!(stream.read_bytes(&mut buf), 0);
    }

    #[test]
    fn test_seek_rejects_negative_position() {
        let mut stream = StreamBuffer::from(b"abcdef".as_slice());
        stream.seek(SeekFrom::Start(4)).unwrap();
        assert!(stream.seek(SeekFrom::Current(-5)).is_err());
        assert_eq!(stream.position(), 4);
        assert_eq!(stream.seek(SeekFrom::End(-6)).unwrap(), 0);
        assert_eq!(stream.seek(SeekFrom::Current(2)).unwrap(), 2);
    }

    #[test]
    fn test_load_collects_all_chunks() {
        let payload: Vec<u8> = (0..5000).map(|i| (i % 256) as u8).collect();
        let mut stream = StreamBuffer::new();
        let loaded = stream.load(&mut payload.as_slice()).unwrap();
        assert_eq!(loaded, payload.len());
        assert_eq!(stream.as_bytes(), payload.as_slice());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_load_empty_source() {
        let mut stream = StreamBuffer::new();
        assert_eq!(stream.load(&mut io::empty()).unwrap(), 0);
        assert!(stream.is_empty());
    }

    #[test]
    fn test_pipe_single_chunk() {
        let mut source = ChunkedSource(vec![b"0123456789".to_vec()]);
        let mut sink = LimitedSink {
            capacity: 10,
            received: Vec::new(),
        };
        assert!(pipe(&mut source, &mut sink));
        assert_eq!(sink.received, b"0123456789");
    }

    #[test]
    fn test_pipe_fails_when_sink_fills_up() {
        let mut source = ChunkedSource(vec![b"0123456789".to_vec()]);
        let mut sink = LimitedSink {
            capacity: 4,
            received: Vec::new(),
        };
        assert!(!pipe(&mut source, &mut sink));
        assert_eq!(sink.received, b"0123");
    }

    #[test]
    fn test_pipe_into_stream_buffer() {
        let mut source = ChunkedSource(vec![b"abc".to_vec(), b"def".to_vec()]);
        let mut stream = StreamBuffer::new();
        assert!(pipe(&mut source, &mut stream));
        assert_eq!(stream.as_bytes(), b"abcdef");
    }
}
