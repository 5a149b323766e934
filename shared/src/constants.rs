//! Names and sizes both sides of the device boundary agree on.

#[cfg(feature = "kernel")]
use alloc::string::String;

/// Node name; the device appears at `/dev/charDrvOps`.
pub const DEVICE_NAME: &str = "charDrvOps";
/// Device class the node is created under.
pub const CLASS_NAME: &str = "charDrv";
/// Capacity of the in-kernel message buffer, annotation included.
pub const MESSAGE_CAPACITY: usize = 256;
/// Only minor number the driver ever creates.
pub const MINOR: u32 = 0;

/// Static module metadata, what `modinfo` would print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub license:     &'static str,
    pub author:      &'static str,
    pub description: &'static str,
    pub version:     &'static str,
}

pub const MODULE_INFO: ModuleInfo = ModuleInfo {
    license:     "GPL",
    author:      "Sandeep Singh",
    description: "A simple Linux char driver doing basic user read/write operations",
    version:     "0.1",
};

/// Conventional filesystem path of the device node.
pub fn dev_path() -> String {
    let mut path = String::from("/dev/");
    path.push_str(DEVICE_NAME);
    path
}
