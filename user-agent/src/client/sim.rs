//! Client that loads the driver in-process on a simulated platform.
//!
//! Creating the client is `insmod` + `open`; dropping it is `close` +
//! `rmmod`, so every run starts from an empty buffer.

use std::path::{Path, PathBuf};

use chardrv_driver::{
    helpers::{UserSlice, UserSliceMut},
    sim::{Fd, SimHost},
};
use log::Level;

use crate::agent_log;
use crate::client::{ClientError, DeviceClient};

pub struct SimClient {
    host: SimHost,
    fd:   Fd,
    path: PathBuf,
}

impl SimClient {
    pub fn open(path: &Path) -> Result<Self, ClientError> {
        let mut host = SimHost::new();
        let status = host.insmod();
        if status != 0 {
            return Err(ClientError::Load(status));
        }
        Self::attach(host, path)
    }

    /// Open `path` on an already prepared host.
    pub fn attach(mut host: SimHost, path: &Path) -> Result<Self, ClientError> {
        let fd = host
            .open(&path.to_string_lossy())
            .map_err(ClientError::Device)?;
        agent_log!(Level::Debug, "client", "Opened simulated node {:?}", path);
        Ok(Self { host, fd, path: path.to_path_buf() })
    }

    pub fn host(&self) -> &SimHost {
        &self.host
    }
}

impl DeviceClient for SimClient {
    fn write_message(&mut self, msg: &[u8]) -> Result<usize, ClientError> {
        self.host
            .write(self.fd, &mut UserSlice::new(msg))
            .map_err(ClientError::Device)
    }

    fn read_message(&mut self, max_len: usize) -> Result<Vec<u8>, ClientError> {
        let mut buf = vec![0u8; max_len];
        let n = self
            .host
            .read(self.fd, &mut UserSliceMut::new(&mut buf))
            .map_err(ClientError::Device)?;
        buf.truncate(n);
        Ok(buf)
    }

    fn describe(&self) -> String {
        format!("simulated {}", self.path.display())
    }
}

impl Drop for SimClient {
    fn drop(&mut self) {
        let _ = self.host.close(self.fd);
        self.host.rmmod();
    }
}
