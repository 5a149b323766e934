//! User-space buffer access.
//!
//! The platform hands the driver raw user addresses; every transfer can
//! fault. These traits are the only way the core touches caller memory,
//! so a fault is always a value (`CopyFault`), never a crash.

use thiserror::Error;

/// The destination (for `read`) or source (for `write`) was not accessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad address: {failed} of {requested} byte(s) not copied")]
pub struct CopyFault {
    /// Bytes the call tried to move.
    pub requested: usize,
    /// Bytes that could not be moved (`copy_to_user` return value).
    pub failed: usize,
}

/// Caller-supplied destination of a `read`.
pub trait UserWriter {
    /// Room available in the destination.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all of `data` to the start of the destination.
    ///
    /// Either every byte lands or the call fails; no partial success is
    /// reported to the session layer.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), CopyFault>;
}

/// Caller-supplied source of a `write`.
pub trait UserReader {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the whole source into `dst`, which is exactly `self.len()` long.
    fn read_all(&mut self, dst: &mut [u8]) -> Result<(), CopyFault>;
}

/// Accessible user destination backed by a byte slice.
pub struct UserSliceMut<'a> {
    buf: &'a mut [u8],
}

impl<'a> UserSliceMut<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }
}

impl UserWriter for UserSliceMut<'_> {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), CopyFault> {
        if data.len() > self.buf.len() {
            return Err(CopyFault {
                requested: data.len(),
                failed: data.len() - self.buf.len(),
            });
        }
        self.buf[..data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Accessible user source backed by a byte slice.
pub struct UserSlice<'a> {
    buf: &'a [u8],
}

impl<'a> UserSlice<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl UserReader for UserSlice<'_> {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn read_all(&mut self, dst: &mut [u8]) -> Result<(), CopyFault> {
        if dst.len() != self.buf.len() {
            return Err(CopyFault { requested: dst.len(), failed: dst.len() });
        }
        dst.copy_from_slice(self.buf);
        Ok(())
    }
}

/// A user address range that is not mapped: every copy faults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyUser {
    /// Length the caller claimed the buffer had.
    pub claimed_len: usize,
}

impl FaultyUser {
    pub fn new(claimed_len: usize) -> Self {
        Self { claimed_len }
    }
}

impl UserWriter for FaultyUser {
    fn len(&self) -> usize {
        self.claimed_len
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), CopyFault> {
        Err(CopyFault { requested: data.len(), failed: data.len() })
    }
}

impl UserReader for FaultyUser {
    fn len(&self) -> usize {
        self.claimed_len
    }

    fn read_all(&mut self, dst: &mut [u8]) -> Result<(), CopyFault> {
        Err(CopyFault { requested: dst.len(), failed: dst.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_writer_copies_prefix() {
        let mut out = [0u8; 8];
        let mut dst = UserSliceMut::new(&mut out);
        dst.write_bytes(b"abc").unwrap();
        assert_eq!(&out[..3], b"abc");
        assert_eq!(out[3], 0);
    }

    #[test]
    fn slice_writer_rejects_oversized_copy() {
        let mut out = [0u8; 2];
        let mut dst = UserSliceMut::new(&mut out);
        let err = dst.write_bytes(b"abcd").unwrap_err();
        assert_eq!(err, CopyFault { requested: 4, failed: 2 });
    }

    #[test]
    fn faulty_user_always_faults() {
        let mut bad = FaultyUser::new(64);
        assert_eq!(UserWriter::len(&bad), 64);
        assert!(bad.write_bytes(b"x").is_err());
        let mut dst = [0u8; 3];
        assert!(bad.read_all(&mut dst).is_err());
    }
}
