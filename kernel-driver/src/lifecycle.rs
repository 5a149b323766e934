//! Driver lifecycle: registration with the platform and its teardown.
//!
//! Load order is number → class → node. Each acquired resource is pushed
//! on an `Unwind` stack; if a later step fails, the stack is released in
//! reverse before the error is returned, so a failed load leaves nothing
//! behind. Teardown walks the same resources in exact reverse order.

use alloc::vec::Vec;

use shared::constants::{CLASS_NAME, DEVICE_NAME, MINOR};

use crate::dispatch::OPERATIONS;
use crate::platform::{ClassHandle, DevT, InitError, Major, NodeHandle, Platform, mkdev};

/// Everything the platform handed out for one loaded driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub major: Major,
    pub class: ClassHandle,
    pub node:  NodeHandle,
}

impl DeviceRegistration {
    pub fn dev(&self) -> DevT {
        mkdev(self.major, MINOR)
    }
}

/*──────────────────────────── rollback stack ────────────────────────────*/

#[derive(Debug, Clone, Copy)]
enum Acquired {
    Number(Major),
    Class(ClassHandle),
}

/// Resources acquired so far; released in reverse unless committed.
struct Unwind<'p, P: Platform> {
    platform: &'p mut P,
    acquired: Vec<Acquired>,
}

impl<'p, P: Platform> Unwind<'p, P> {
    fn new(platform: &'p mut P) -> Self {
        Self { platform, acquired: Vec::new() }
    }

    fn platform(&mut self) -> &mut P {
        &mut *self.platform
    }

    fn push(&mut self, res: Acquired) {
        self.acquired.push(res);
    }

    /// Keep everything; nothing will be released on drop.
    fn commit(mut self) {
        self.acquired.clear();
    }
}

impl<P: Platform> Drop for Unwind<'_, P> {
    fn drop(&mut self) {
        while let Some(res) = self.acquired.pop() {
            match res {
                Acquired::Class(class) => {
                    log::debug!("unwind: destroying class {:?}", class);
                    self.platform.class_destroy(class);
                }
                Acquired::Number(major) => {
                    log::debug!("unwind: releasing major {}", major.0);
                    self.platform.unregister_chrdev(major, DEVICE_NAME);
                }
            }
        }
    }
}

/*──────────────────────────── init / exit ───────────────────────────────*/

/// Register the device with the platform: number, class, then node.
pub fn initialize<P: Platform>(platform: &mut P) -> Result<DeviceRegistration, InitError> {
    log::info!("{}_init: Initializing the LKM", DEVICE_NAME);

    let mut unwind = Unwind::new(platform);

    // 1 ▸ major number
    let major = unwind
        .platform()
        .register_chrdev(DEVICE_NAME, &OPERATIONS)
        .map_err(|e| {
            log::error!("{} failed to register a major number", DEVICE_NAME);
            InitError::NumberAllocationFailed(e)
        })?;
    unwind.push(Acquired::Number(major));
    log::info!("{}: registered correctly with major number {}", DEVICE_NAME, major.0);

    // 2 ▸ device class
    let class = unwind.platform().class_create(CLASS_NAME).map_err(|e| {
        log::error!("Failed to register device class");
        InitError::ClassCreationFailed(e)
    })?;
    unwind.push(Acquired::Class(class));
    log::info!("{}: device class registered correctly", CLASS_NAME);

    // 3 ▸ device node
    let node = unwind
        .platform()
        .device_create(class, mkdev(major, MINOR), DEVICE_NAME)
        .map_err(|e| {
            log::error!("Failed to create the device");
            InitError::NodeCreationFailed(e)
        })?;
    log::info!("{}: device class created correctly", CLASS_NAME);

    unwind.commit();
    Ok(DeviceRegistration { major, class, node })
}

/// Remove the node, the class, then the number.
///
/// Must be called exactly once per successful [`initialize`].
pub fn teardown<P: Platform>(platform: &mut P, reg: DeviceRegistration) {
    platform.device_destroy(reg.class, reg.dev());
    platform.class_unregister(reg.class);
    platform.class_destroy(reg.class);
    platform.unregister_chrdev(reg.major, DEVICE_NAME);
    log::info!("{}: Goodbye from the LKM!", CLASS_NAME);
}
