//! Ways of reaching the driver from user space.
//!
//! * [`node::NodeClient`]: the real device node, through `std::fs`.
//! * [`sim::SimClient`]: the driver loaded in-process on `SimHost`.
//!
//! Both speak the same two calls; the exercise logic does not care which
//! one it is given.

pub mod node;
pub mod sim;

use shared::Errno;
use std::{io, path::PathBuf};
use thiserror::Error;

pub use node::NodeClient;
pub use sim::SimClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on device: {0}")]
    Io(#[from] io::Error),

    #[error("device returned {0}")]
    Device(Errno),

    #[error("driver failed to load: status {0}")]
    Load(i32),
}

impl ClientError {
    /// Platform error number behind this failure, when there is one.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            ClientError::Device(e) => Some(*e),
            ClientError::Load(status) => Errno::from_status(i64::from(*status)),
            ClientError::Open { source, .. } | ClientError::Io(source) => {
                source.raw_os_error().map(Errno)
            }
        }
    }
}

/// One open session on the device.
pub trait DeviceClient {
    /// Send `msg` in a single write; returns the bytes the driver accepted.
    fn write_message(&mut self, msg: &[u8]) -> Result<usize, ClientError>;

    /// Issue a single read of at most `max_len` bytes.
    fn read_message(&mut self, max_len: usize) -> Result<Vec<u8>, ClientError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}
