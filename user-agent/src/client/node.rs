//! Client for a real device node (`/dev/charDrvOps`).

use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use log::Level;

use crate::agent_log;
use crate::client::{ClientError, DeviceClient};

pub struct NodeClient {
    path: PathBuf,
    file: File,
}

impl NodeClient {
    /// Open the node read/write; one `open` on the driver side.
    pub fn open(path: &Path) -> Result<Self, ClientError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ClientError::Open { path: path.to_path_buf(), source })?;
        agent_log!(Level::Debug, "client", "Opened device node {:?}", path);
        Ok(Self { path: path.to_path_buf(), file })
    }
}

impl DeviceClient for NodeClient {
    fn write_message(&mut self, msg: &[u8]) -> Result<usize, ClientError> {
        // one write(2); the driver never accepts partially
        let n = self.file.write(msg)?;
        Ok(n)
    }

    fn read_message(&mut self, max_len: usize) -> Result<Vec<u8>, ClientError> {
        let mut buf = vec![0u8; max_len];
        let n = self.file.read(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    fn describe(&self) -> String {
        format!("node {}", self.path.display())
    }
}
