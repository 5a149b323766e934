// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

mod macros;

pub mod client;
pub mod config;
pub mod exercise;
pub mod logging;

use std::path::Path;

use crate::client::{ClientError, DeviceClient, NodeClient, SimClient};
use crate::config::{Backend, model::DeviceConfig};

/// Open a session on the device the config points at.
pub fn connect(device: &DeviceConfig) -> Result<Box<dyn DeviceClient>, ClientError> {
    let path: &Path = &device.path;
    Ok(match device.backend {
        Backend::Node => Box::new(NodeClient::open(path)?),
        Backend::Simulated => Box::new(SimClient::open(path)?),
    })
}
