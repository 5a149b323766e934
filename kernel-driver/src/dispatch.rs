//! dispatch.rs
//! The fixed file-operation table and the dispatcher the platform calls into.
//!
//! Only open/read/write/release are provided. Every other slot falls back
//! to `default_handler`, which reports "not supported" (`-ENOTTY`).

use shared::Errno;

use crate::device::{Device, Session, SessionState};
use crate::helpers::{UserReader, UserWriter};

/// File operations the platform may invoke, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FileOp {
    Open = 0,
    Read,
    Write,
    Release,
    Ioctl,
    Mmap,
    Poll,
    Seek,
}

pub const FILE_OP_COUNT: usize = 8;

impl FileOp {
    pub const ALL: [FileOp; FILE_OP_COUNT] = [
        FileOp::Open,
        FileOp::Read,
        FileOp::Write,
        FileOp::Release,
        FileOp::Ioctl,
        FileOp::Mmap,
        FileOp::Poll,
        FileOp::Seek,
    ];
}

/// Arguments of one call through the file interface.
pub enum Request<'a> {
    Open,
    Read(&'a mut dyn UserWriter),
    Write(&'a mut dyn UserReader),
    Release,
    Ioctl { cmd: u32, arg: usize },
    Mmap { len: usize },
    Poll,
    Seek { offset: i64, whence: i32 },
}

impl Request<'_> {
    pub fn op(&self) -> FileOp {
        match self {
            Request::Open => FileOp::Open,
            Request::Read(_) => FileOp::Read,
            Request::Write(_) => FileOp::Write,
            Request::Release => FileOp::Release,
            Request::Ioctl { .. } => FileOp::Ioctl,
            Request::Mmap { .. } => FileOp::Mmap,
            Request::Poll => FileOp::Poll,
            Request::Seek { .. } => FileOp::Seek,
        }
    }
}

/// Per-descriptor state the platform keeps between calls.
#[derive(Debug, Default)]
pub struct File {
    session: Option<Session>,
}

impl File {
    pub const fn new() -> Self {
        Self { session: None }
    }

    pub fn state(&self) -> SessionState {
        match self.session {
            Some(_) => SessionState::Open,
            None => SessionState::Closed,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

/// Prototype for file-operation handlers.
///
/// Returns a byte count (or 0) on success, a negative errno on failure.
pub type Handler = fn(device: &Device, file: &mut File, request: &mut Request<'_>) -> isize;

/// The operation table handed to the platform at registration.
pub struct OperationTable {
    pub open:    Option<Handler>,
    pub read:    Option<Handler>,
    pub write:   Option<Handler>,
    pub release: Option<Handler>,
    pub ioctl:   Option<Handler>,
    pub mmap:    Option<Handler>,
    pub poll:    Option<Handler>,
    pub llseek:  Option<Handler>,
}

impl OperationTable {
    pub fn handler(&self, op: FileOp) -> Option<Handler> {
        match op {
            FileOp::Open => self.open,
            FileOp::Read => self.read,
            FileOp::Write => self.write,
            FileOp::Release => self.release,
            FileOp::Ioctl => self.ioctl,
            FileOp::Mmap => self.mmap,
            FileOp::Poll => self.poll,
            FileOp::Seek => self.llseek,
        }
    }

    pub fn supports(&self, op: FileOp) -> bool {
        self.handler(op).is_some()
    }
}

/// Operations this driver implements.
pub static OPERATIONS: OperationTable = OperationTable {
    open:    Some(dispatch_open),
    read:    Some(dispatch_read),
    write:   Some(dispatch_write),
    release: Some(dispatch_release),
    ioctl:   None,
    mmap:    None,
    poll:    None,
    llseek:  None,
};

/// Default handler: the operation is not supported.
fn default_handler(_device: &Device, _file: &mut File, _request: &mut Request<'_>) -> isize {
    status(Errno::ENOTTY)
}

fn status(e: Errno) -> isize {
    e.to_status() as isize
}

/// Dispatcher holds one handler per `FileOp`.
pub struct Dispatcher {
    handlers: [Handler; FILE_OP_COUNT],
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// All slots initialize to `default_handler`.
    pub const fn new() -> Self {
        Self { handlers: [default_handler; FILE_OP_COUNT] }
    }

    pub fn register(&mut self, op: FileOp, handler: Handler) {
        self.handlers[op as usize] = handler;
    }

    /// Install every handler present in `table`.
    pub fn from_table(table: &OperationTable) -> Self {
        let mut d = Self::new();
        for op in FileOp::ALL {
            if let Some(h) = table.handler(op) {
                d.register(op, h);
            }
        }
        d
    }

    /// Route `request` to the handler for its operation.
    pub fn dispatch(&self, device: &Device, file: &mut File, mut request: Request<'_>) -> isize {
        let op = request.op();
        (self.handlers[op as usize])(device, file, &mut request)
    }
}

// ------------------------------------------------------------
// Standard handlers

/// open: always succeeds, one session per descriptor.
fn dispatch_open(device: &Device, file: &mut File, _request: &mut Request<'_>) -> isize {
    if let Some(stale) = file.session.take() {
        device.release(stale);
    }
    file.session = Some(device.open());
    0
}

/// read: drain the message into the caller's buffer.
fn dispatch_read(device: &Device, file: &mut File, request: &mut Request<'_>) -> isize {
    let (Some(session), Request::Read(dst)) = (file.session.as_ref(), request) else {
        return status(Errno::EBADF);
    };
    match device.read(session, &mut **dst) {
        Ok(n) => n as isize,
        Err(e) => status(e.errno()),
    }
}

/// write: replace the message, report the input length.
fn dispatch_write(device: &Device, file: &mut File, request: &mut Request<'_>) -> isize {
    let (Some(session), Request::Write(src)) = (file.session.as_ref(), request) else {
        return status(Errno::EBADF);
    };
    match device.write(session, &mut **src) {
        Ok(n) => n as isize,
        Err(e) => status(e.errno()),
    }
}

/// release: always succeeds.
fn dispatch_release(device: &Device, file: &mut File, _request: &mut Request<'_>) -> isize {
    if let Some(session) = file.session.take() {
        device.release(session);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{FaultyUser, UserSlice, UserSliceMut};

    #[test]
    fn table_lists_only_file_basics() {
        assert!(OPERATIONS.supports(FileOp::Open));
        assert!(OPERATIONS.supports(FileOp::Read));
        assert!(OPERATIONS.supports(FileOp::Write));
        assert!(OPERATIONS.supports(FileOp::Release));
        assert!(!OPERATIONS.supports(FileOp::Ioctl));
        assert!(!OPERATIONS.supports(FileOp::Mmap));
        assert!(!OPERATIONS.supports(FileOp::Poll));
        assert!(!OPERATIONS.supports(FileOp::Seek));
    }

    #[test]
    fn unsupported_ops_return_enotty() {
        let dev = Device::new();
        let d = Dispatcher::from_table(&OPERATIONS);
        let mut f = File::new();
        d.dispatch(&dev, &mut f, Request::Open);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Ioctl { cmd: 1, arg: 0 }), -25);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Mmap { len: 4096 }), -25);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Poll), -25);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Seek { offset: 0, whence: 0 }), -25);
    }

    #[test]
    fn full_cycle_through_dispatcher() {
        let dev = Device::new();
        let d = Dispatcher::from_table(&OPERATIONS);
        let mut f = File::new();
        assert_eq!(f.state(), SessionState::Closed);

        assert_eq!(d.dispatch(&dev, &mut f, Request::Open), 0);
        assert_eq!(f.state(), SessionState::Open);

        let mut src = UserSlice::new(b"test");
        assert_eq!(d.dispatch(&dev, &mut f, Request::Write(&mut src)), 4);

        let mut out = [0u8; 64];
        let mut dst = UserSliceMut::new(&mut out);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Read(&mut dst)), 15);
        assert_eq!(&out[..15], b"test(4 letters)");

        let mut dst = UserSliceMut::new(&mut out);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Read(&mut dst)), 0);

        assert_eq!(d.dispatch(&dev, &mut f, Request::Release), 0);
        assert_eq!(f.state(), SessionState::Closed);
    }

    #[test]
    fn read_fault_maps_to_efault() {
        let dev = Device::new();
        let d = Dispatcher::from_table(&OPERATIONS);
        let mut f = File::new();
        d.dispatch(&dev, &mut f, Request::Open);
        let mut src = UserSlice::new(b"x");
        d.dispatch(&dev, &mut f, Request::Write(&mut src));
        let mut bad = FaultyUser::new(16);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Read(&mut bad)), -14);
        assert_eq!(dev.store().len(), "x(1 letters)".len());
    }

    #[test]
    fn io_without_open_is_ebadf() {
        let dev = Device::new();
        let d = Dispatcher::from_table(&OPERATIONS);
        let mut f = File::new();
        let mut out = [0u8; 4];
        let mut dst = UserSliceMut::new(&mut out);
        assert_eq!(d.dispatch(&dev, &mut f, Request::Read(&mut dst)), -9);
    }

    #[test]
    fn empty_dispatcher_supports_nothing() {
        let dev = Device::new();
        let d = Dispatcher::new();
        let mut f = File::new();
        assert_eq!(d.dispatch(&dev, &mut f, Request::Open), -25);
        assert_eq!(f.state(), SessionState::Closed);
    }
}
