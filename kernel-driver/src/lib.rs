//! charDrv: a single-buffer character device.
//!
//! One in-kernel message is shared by every process that opens
//! `/dev/charDrvOps`. Writing stores the text followed by its letter
//! count; reading hands that text back once and empties the buffer.
//!
//! Key pieces:
//! - [`message::MessageStore`]: the buffer and its drain-on-read rules.
//! - [`counter::OpenCounter`]: how many times the device was opened.
//! - [`device::Device`]: the open → (read|write)* → release state machine.
//! - [`dispatch`]: the fixed open/read/write/release operation table.
//! - [`lifecycle`]: registration with the platform, unwound on failure.
//! - [`sim`]: an in-process platform used by tests and the user agent.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod counter;
pub mod device;
pub mod dispatch;
pub mod helpers;
pub mod lifecycle;
pub mod message;
pub mod platform;
pub mod sim;

use shared::constants::MODULE_INFO;

use crate::lifecycle::{DeviceRegistration, initialize, teardown};
use crate::device::Device;
use crate::dispatch::{Dispatcher, OPERATIONS};
use crate::platform::{InitError, Platform};

pub use shared::constants::ModuleInfo;

/// Static metadata, what `modinfo` reports.
pub const fn module_info() -> ModuleInfo {
    MODULE_INFO
}

/// A loaded driver: its registration plus the device state it owns.
pub struct CharDriver {
    registration: DeviceRegistration,
    device:       Device,
    dispatcher:   Dispatcher,
}

impl CharDriver {
    /// Register with `platform` and allocate a fresh, empty device.
    pub fn load<P: Platform>(platform: &mut P) -> Result<Self, InitError> {
        let registration = initialize(platform)?;
        Ok(Self {
            registration,
            device: Device::new(),
            dispatcher: Dispatcher::from_table(&OPERATIONS),
        })
    }

    /// Tear the registration down; the message and counter go with it.
    pub fn unload<P: Platform>(self, platform: &mut P) {
        teardown(platform, self.registration);
    }

    pub fn registration(&self) -> &DeviceRegistration {
        &self.registration
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/*------------ module init -------------------------------*/

/// Load the driver into `slot`; returns 0 or the negative status for the loader.
pub fn driver_entry<P: Platform>(platform: &mut P, slot: &mut Option<CharDriver>) -> i32 {
    match CharDriver::load(platform) {
        Ok(driver) => {
            *slot = Some(driver);
            0
        }
        Err(e) => {
            log::error!("load failed: {}", e);
            e.status()
        }
    }
}

/*------------ module exit -------------------------------*/

pub fn driver_exit<P: Platform>(platform: &mut P, slot: &mut Option<CharDriver>) {
    match slot.take() {
        Some(driver) => driver.unload(platform),
        None => log::warn!("driver_exit without a loaded driver"),
    }
}
