//! Device session state machine.
//!
//!   Closed ──open──▶ Open ──release──▶ Closed
//!                     │ ▲
//!                     └─┘ read | write
//!
//!  * `open` never fails and is never exclusive; any number of sessions
//!    may be open at once, all sharing the one message store.
//!  * A `Session` value only exists between `open` and `release`, so read
//!    and write cannot be reached from `Closed`.

use crate::counter::OpenCounter;
use crate::helpers::{UserReader, UserWriter};
use crate::message::{IoError, MessageStore};

const LOG_TARGET: &str = "charDrv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// One open file handle on the device.
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    ordinal: u64,
}

impl Session {
    /// Value of the open counter right after this session was opened.
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }
}

/// The device proper: the message store plus the open counter.
#[derive(Default)]
pub struct Device {
    store: MessageStore,
    opens: OpenCounter,
}

impl Device {
    pub const fn new() -> Self {
        Self {
            store: MessageStore::new(),
            opens: OpenCounter::new(),
        }
    }

    pub fn open(&self) -> Session {
        let ordinal = self.opens.increment();
        log::info!(target: LOG_TARGET, "Device has been opened {} time(s)", ordinal);
        Session { ordinal }
    }

    pub fn read<W: UserWriter + ?Sized>(&self, _session: &Session, dst: &mut W) -> Result<usize, IoError> {
        match self.store.read(dst) {
            Ok(n) => {
                log::info!(target: LOG_TARGET, "Sent {} characters to the user", n);
                Ok(n)
            }
            Err(e) => {
                let attempted = match e {
                    IoError::CopyFault(fault) => fault.requested,
                    IoError::BufferOverflow { .. } => 0,
                };
                log::info!(target: LOG_TARGET, "Failed to send {} characters to the user", attempted);
                Err(e)
            }
        }
    }

    pub fn write<R: UserReader + ?Sized>(&self, _session: &Session, src: &mut R) -> Result<usize, IoError> {
        let len = src.len();
        match self.store.write(src) {
            Ok(n) => {
                log::info!(target: LOG_TARGET, "Received {} characters from the user", n);
                Ok(n)
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Rejected {} characters from the user: {}", len, e);
                Err(e)
            }
        }
    }

    pub fn release(&self, session: Session) {
        drop(session);
        log::info!(target: LOG_TARGET, "Device successfully closed");
    }

    pub fn open_count(&self) -> u64 {
        self.opens.get()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }
}
