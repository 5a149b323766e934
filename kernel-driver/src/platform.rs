//! Platform services the driver consumes at load and unload.
//!
//! Device-number allocation, class and node creation are provided by the
//! host (the kernel's driver model, or [`crate::sim::SimPlatform`] in
//! tests). The core only sequences them.

use shared::Errno;
use thiserror::Error;

use crate::dispatch::OperationTable;

/// Platform-allocated major device number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Major(pub u32);

/// Packed (major, minor) pair, same layout as the kernel's `MKDEV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevT(pub u32);

const MINOR_BITS: u32 = 20;

pub const fn mkdev(major: Major, minor: u32) -> DevT {
    DevT((major.0 << MINOR_BITS) | (minor & ((1 << MINOR_BITS) - 1)))
}

impl DevT {
    pub const fn major(self) -> Major {
        Major(self.0 >> MINOR_BITS)
    }

    pub const fn minor(self) -> u32 {
        self.0 & ((1 << MINOR_BITS) - 1)
    }
}

/// Opaque handle to a created device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassHandle(pub u64);

/// Opaque handle to a created device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// Registration steps, in the order `initialize` performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Number,
    Class,
    Node,
}

/// Device-model operations the lifecycle manager calls.
///
/// Release calls cannot fail; the platform is expected to log and carry on.
pub trait Platform {
    /// Ask for a dynamic major number bound to `ops`.
    fn register_chrdev(&mut self, name: &str, ops: &'static OperationTable) -> Result<Major, Errno>;
    fn unregister_chrdev(&mut self, major: Major, name: &str);

    fn class_create(&mut self, name: &str) -> Result<ClassHandle, Errno>;
    fn class_unregister(&mut self, class: ClassHandle);
    fn class_destroy(&mut self, class: ClassHandle);

    fn device_create(&mut self, class: ClassHandle, dev: DevT, name: &str) -> Result<NodeHandle, Errno>;
    fn device_destroy(&mut self, class: ClassHandle, dev: DevT);
}

/// Why the module could not load. Every variant is fully unwound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("failed to register a major number: {0}")]
    NumberAllocationFailed(Errno),

    #[error("failed to register device class: {0}")]
    ClassCreationFailed(Errno),

    #[error("failed to create the device: {0}")]
    NodeCreationFailed(Errno),
}

impl InitError {
    pub fn errno(&self) -> Errno {
        match *self {
            InitError::NumberAllocationFailed(e)
            | InitError::ClassCreationFailed(e)
            | InitError::NodeCreationFailed(e) => e,
        }
    }

    /// Negative status returned to the module loader.
    pub fn status(&self) -> i32 {
        self.errno().to_status()
    }

    pub fn step(&self) -> Step {
        match self {
            InitError::NumberAllocationFailed(_) => Step::Number,
            InitError::ClassCreationFailed(_) => Step::Class,
            InitError::NodeCreationFailed(_) => Step::Node,
        }
    }
}
