//! Message store: the single in-kernel text buffer.
//!
//! * One instance lives for the whole time the module is loaded.
//! * `write` overwrites the buffer with `data ++ "(<n> letters)"`.
//! * `read` hands the valid bytes to the caller and then drains the
//!   buffer (length back to 0). There is no cursor.
//!
//! Every access goes through one `spin::Mutex`, so reads and writes from
//! different sessions are mutually exclusive.

use alloc::vec::Vec;
use core::fmt::{self, Write};

use shared::{Errno, constants::MESSAGE_CAPACITY};
use spin::Mutex;
use thiserror::Error;

use crate::helpers::{CopyFault, UserReader, UserWriter};

/// Per-call I/O failure surfaced to the file interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("copy fault: {0}")]
    CopyFault(#[from] CopyFault),

    #[error("message needs {needed} bytes, buffer holds {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },
}

impl IoError {
    pub fn errno(&self) -> Errno {
        match self {
            IoError::CopyFault(_) => Errno::EFAULT,
            IoError::BufferOverflow { .. } => Errno::ENOSPC,
        }
    }
}

struct Buffer {
    contents: [u8; MESSAGE_CAPACITY],
    length: usize,
}

pub struct MessageStore {
    inner: Mutex<Buffer>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Buffer {
                contents: [0; MESSAGE_CAPACITY],
                length: 0,
            }),
        }
    }

    pub const fn capacity(&self) -> usize {
        MESSAGE_CAPACITY
    }

    /// Count of valid bytes currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the valid bytes, for diagnostics and tests. Does not drain.
    pub fn snapshot(&self) -> Vec<u8> {
        let buf = self.inner.lock();
        buf.contents[..buf.length].to_vec()
    }

    /// Replace the stored message with `src` followed by its length annotation.
    ///
    /// Returns the number of input bytes accepted, always `src.len()`.
    /// On any error the previous contents stay as they were.
    pub fn write<R: UserReader + ?Sized>(&self, src: &mut R) -> Result<usize, IoError> {
        let n = src.len();
        let mut staged = [0u8; MESSAGE_CAPACITY];
        // saturate: a claimed length near usize::MAX is just "too big"
        let needed = n.saturating_add(annotation_len(n));
        if needed > MESSAGE_CAPACITY {
            return Err(IoError::BufferOverflow { needed, capacity: MESSAGE_CAPACITY });
        }

        src.read_all(&mut staged[..n])?;
        let mut cursor = Cursor { buf: &mut staged, pos: n };
        write!(cursor, "({} letters)", n)
            .map_err(|_| IoError::BufferOverflow { needed, capacity: MESSAGE_CAPACITY })?;
        let length = cursor.pos;

        let mut buf = self.inner.lock();
        buf.contents[..length].copy_from_slice(&staged[..length]);
        buf.length = length;
        Ok(n)
    }

    /// Hand up to `dst.len()` valid bytes to the caller, then drain.
    ///
    /// Bytes beyond `dst.len()` are dropped with the rest of the message.
    /// A fault leaves the buffer untouched so the read can be retried; the
    /// fault's `requested` is the byte count taken under the lock.
    pub fn read<W: UserWriter + ?Sized>(&self, dst: &mut W) -> Result<usize, IoError> {
        let mut buf = self.inner.lock();
        let n = buf.length.min(dst.len());
        dst.write_bytes(&buf.contents[..n])?;
        buf.length = 0;
        Ok(n)
    }
}

/// Length of `"(<n> letters)"` without formatting it.
fn annotation_len(n: usize) -> usize {
    let mut digits = 1;
    let mut v = n;
    while v >= 10 {
        v /= 10;
        digits += 1;
    }
    "( letters)".len() + digits
}

/// `fmt::Write` over a fixed slice; errors instead of growing.
struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.pos..end].copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{CopyFault, FaultyUser, UserSlice, UserSliceMut};

    fn write(store: &MessageStore, data: &[u8]) -> Result<usize, IoError> {
        store.write(&mut UserSlice::new(data))
    }

    fn read(store: &MessageStore, max: usize) -> Vec<u8> {
        let mut out = alloc::vec![0u8; max];
        let n = store.read(&mut UserSliceMut::new(&mut out)).unwrap();
        out.truncate(n);
        out
    }

    #[test]
    fn write_appends_letter_count() {
        let store = MessageStore::new();
        assert_eq!(write(&store, b"hi"), Ok(2));
        assert_eq!(store.snapshot(), b"hi(2 letters)");
        assert_eq!(store.len(), 13);
    }

    #[test]
    fn empty_write_still_annotates() {
        let store = MessageStore::new();
        assert_eq!(write(&store, b""), Ok(0));
        assert_eq!(store.snapshot(), b"(0 letters)");
    }

    #[test]
    fn second_write_replaces_first() {
        let store = MessageStore::new();
        write(&store, b"first message").unwrap();
        write(&store, b"b").unwrap();
        assert_eq!(store.snapshot(), b"b(1 letters)");
    }

    #[test]
    fn read_drains_buffer() {
        let store = MessageStore::new();
        write(&store, b"test").unwrap();
        assert_eq!(read(&store, 256), b"test(4 letters)");
        assert!(store.is_empty());
        assert_eq!(read(&store, 256), b"");
    }

    #[test]
    fn short_read_truncates_and_drains() {
        let store = MessageStore::new();
        write(&store, b"hello").unwrap();
        assert_eq!(read(&store, 5), b"hello");
        assert!(store.is_empty());
    }

    #[test]
    fn fault_keeps_message() {
        let store = MessageStore::new();
        write(&store, b"keep").unwrap();
        let err = store.read(&mut FaultyUser::new(64)).unwrap_err();
        assert_eq!(err.errno(), Errno::EFAULT);
        assert_eq!(read(&store, 64), b"keep(4 letters)");
    }

    #[test]
    fn fault_reports_length_seen_under_lock() {
        let store = MessageStore::new();
        write(&store, b"abc").unwrap();
        let err = store.read(&mut FaultyUser::new(64)).unwrap_err();
        assert_eq!(err, IoError::CopyFault(CopyFault { requested: 14, failed: 14 }));

        // a smaller destination only ever tries its own length
        let err = store.read(&mut FaultyUser::new(5)).unwrap_err();
        assert_eq!(err, IoError::CopyFault(CopyFault { requested: 5, failed: 5 }));
        assert_eq!(store.len(), 14);
    }

    #[test]
    fn largest_message_that_fits() {
        // 242 bytes + "(242 letters)" (13) = 255
        let store = MessageStore::new();
        let data = [b'x'; 242];
        assert_eq!(write(&store, &data), Ok(242));
        assert_eq!(store.len(), 255);

        // 243 + 13 = 256, still fits exactly
        let data = [b'y'; 243];
        assert_eq!(write(&store, &data), Ok(243));
        assert_eq!(store.len(), MESSAGE_CAPACITY);
    }

    #[test]
    fn oversized_write_is_rejected_and_buffer_kept() {
        let store = MessageStore::new();
        write(&store, b"old").unwrap();
        let data = [b'z'; 244];
        let err = write(&store, &data).unwrap_err();
        assert_eq!(err, IoError::BufferOverflow { needed: 257, capacity: MESSAGE_CAPACITY });
        assert_eq!(err.errno(), Errno::ENOSPC);
        assert_eq!(store.snapshot(), b"old(3 letters)");
    }

    #[test]
    fn huge_claimed_length_is_overflow_not_panic() {
        let store = MessageStore::new();
        write(&store, b"old").unwrap();
        let err = store.write(&mut FaultyUser::new(usize::MAX)).unwrap_err();
        assert_eq!(err, IoError::BufferOverflow { needed: usize::MAX, capacity: MESSAGE_CAPACITY });
        assert_eq!(store.snapshot(), b"old(3 letters)");
    }

    #[test]
    fn faulting_source_keeps_previous_message() {
        let store = MessageStore::new();
        write(&store, b"old").unwrap();
        let err = store.write(&mut FaultyUser::new(4)).unwrap_err();
        assert!(matches!(err, IoError::CopyFault(_)));
        assert_eq!(store.snapshot(), b"old(3 letters)");
    }

    #[test]
    fn annotation_len_matches_format() {
        assert_eq!(annotation_len(0), "(0 letters)".len());
        assert_eq!(annotation_len(9), "(9 letters)".len());
        assert_eq!(annotation_len(10), "(10 letters)".len());
        assert_eq!(annotation_len(243), "(243 letters)".len());
    }
}
