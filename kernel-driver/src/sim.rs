//! In-process stand-in for the kernel's driver model.
//!
//! `SimPlatform` hands out majors, classes and nodes, remembers every call
//! in order, and can be told to fail a given registration step. `SimHost`
//! adds a tiny VFS on top (insmod/rmmod, open/read/write/close by path) so
//! user-space code can exercise the driver without a real kernel.

use alloc::{string::String, vec::Vec};

use shared::Errno;

use crate::CharDriver;
use crate::dispatch::{Dispatcher, File, OperationTable, Request};
use crate::helpers::{UserReader, UserWriter};
use crate::platform::{ClassHandle, DevT, Major, NodeHandle, Platform, Step};

/// First major handed out; dynamic majors on Linux start high.
const FIRST_DYNAMIC_MAJOR: u32 = 240;

/// One platform call, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RegisterChrdev(Major),
    UnregisterChrdev(Major),
    ClassCreate(ClassHandle),
    ClassUnregister(ClassHandle),
    ClassDestroy(ClassHandle),
    DeviceCreate(DevT),
    DeviceDestroy(DevT),
}

struct SimChrdev {
    major: Major,
    name:  String,
    ops:   &'static OperationTable,
}

struct SimClass {
    handle:     ClassHandle,
    name:       String,
    registered: bool,
}

struct SimNode {
    handle: NodeHandle,
    class:  ClassHandle,
    dev:    DevT,
    name:   String,
}

#[derive(Default)]
pub struct SimPlatform {
    next_major:  u32,
    next_handle: u64,
    chrdevs:     Vec<SimChrdev>,
    classes:     Vec<SimClass>,
    nodes:       Vec<SimNode>,
    fail:        Option<(Step, Errno)>,
    journal:     Vec<PlatformCall>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self { next_major: FIRST_DYNAMIC_MAJOR, next_handle: 1, ..Default::default() }
    }

    /// Make the given registration step fail with `errno` from now on.
    pub fn fail_at(&mut self, step: Step, errno: Errno) {
        self.fail = Some((step, errno));
    }

    pub fn clear_failure(&mut self) {
        self.fail = None;
    }

    /// No number, class or node is allocated.
    pub fn is_clean(&self) -> bool {
        self.chrdevs.is_empty() && self.classes.is_empty() && self.nodes.is_empty()
    }

    pub fn majors(&self) -> Vec<Major> {
        self.chrdevs.iter().map(|c| c.major).collect()
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn journal(&self) -> &[PlatformCall] {
        &self.journal
    }

    /// Resolve `/dev/<name>` (or a bare name) to its device number.
    pub fn lookup(&self, path: &str) -> Option<DevT> {
        let name = path.strip_prefix("/dev/").unwrap_or(path);
        self.nodes.iter().find(|n| n.name == name).map(|n| n.dev)
    }

    /// A node for `dev` is currently present.
    pub fn has_node(&self, dev: DevT) -> bool {
        self.nodes.iter().any(|n| n.dev == dev)
    }

    /// Operation table registered for `major`.
    pub fn ops_for(&self, major: Major) -> Option<&'static OperationTable> {
        self.chrdevs.iter().find(|c| c.major == major).map(|c| c.ops)
    }

    fn check(&self, step: Step) -> Result<(), Errno> {
        match self.fail {
            Some((s, e)) if s == step => Err(e),
            _ => Ok(()),
        }
    }

    fn next_handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl Platform for SimPlatform {
    fn register_chrdev(&mut self, name: &str, ops: &'static OperationTable) -> Result<Major, Errno> {
        self.check(Step::Number)?;
        if self.chrdevs.iter().any(|c| c.name == name) {
            return Err(Errno::EBUSY);
        }
        let major = Major(self.next_major);
        self.next_major += 1;
        self.chrdevs.push(SimChrdev { major, name: name.into(), ops });
        self.journal.push(PlatformCall::RegisterChrdev(major));
        Ok(major)
    }

    fn unregister_chrdev(&mut self, major: Major, name: &str) {
        let before = self.chrdevs.len();
        self.chrdevs.retain(|c| !(c.major == major && c.name == name));
        if self.chrdevs.len() == before {
            log::warn!("sim: unregister_chrdev of unknown major {}", major.0);
        }
        self.journal.push(PlatformCall::UnregisterChrdev(major));
    }

    fn class_create(&mut self, name: &str) -> Result<ClassHandle, Errno> {
        self.check(Step::Class)?;
        if self.classes.iter().any(|c| c.name == name) {
            return Err(Errno::EBUSY);
        }
        let handle = ClassHandle(self.next_handle());
        self.classes.push(SimClass { handle, name: name.into(), registered: true });
        self.journal.push(PlatformCall::ClassCreate(handle));
        Ok(handle)
    }

    fn class_unregister(&mut self, class: ClassHandle) {
        if let Some(c) = self.classes.iter_mut().find(|c| c.handle == class) {
            c.registered = false;
        }
        self.journal.push(PlatformCall::ClassUnregister(class));
    }

    fn class_destroy(&mut self, class: ClassHandle) {
        if self.nodes.iter().any(|n| n.class == class) {
            log::warn!("sim: destroying class {:?} with live nodes", class);
        }
        self.classes.retain(|c| c.handle != class);
        self.journal.push(PlatformCall::ClassDestroy(class));
    }

    fn device_create(&mut self, class: ClassHandle, dev: DevT, name: &str) -> Result<NodeHandle, Errno> {
        self.check(Step::Node)?;
        if !self.classes.iter().any(|c| c.handle == class && c.registered) {
            return Err(Errno::EINVAL);
        }
        let handle = NodeHandle(self.next_handle());
        self.nodes.push(SimNode { handle, class, dev, name: name.into() });
        self.journal.push(PlatformCall::DeviceCreate(dev));
        Ok(handle)
    }

    fn device_destroy(&mut self, class: ClassHandle, dev: DevT) {
        match self.nodes.iter().position(|n| n.class == class && n.dev == dev) {
            Some(i) => {
                let node = self.nodes.remove(i);
                log::debug!("sim: removed node {} ({:?})", node.name, node.handle);
            }
            None => log::warn!("sim: device_destroy of unknown node {:?}", dev),
        }
        self.journal.push(PlatformCall::DeviceDestroy(dev));
    }
}

/*──────────────────────────── host VFS ──────────────────────────────────*/

/// Index into the host's descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fd(pub usize);

/// An open descriptor and the device number it was opened through.
struct OpenFile {
    dev:  DevT,
    file: File,
}

/// Simulated kernel: a platform, at most one loaded driver, open files.
pub struct SimHost {
    platform: SimPlatform,
    module:   Option<CharDriver>,
    files:    Vec<Option<OpenFile>>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self::with_platform(SimPlatform::new())
    }

    pub fn with_platform(platform: SimPlatform) -> Self {
        Self { platform, module: None, files: Vec::new() }
    }

    pub fn platform(&self) -> &SimPlatform {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut SimPlatform {
        &mut self.platform
    }

    pub fn module(&self) -> Option<&CharDriver> {
        self.module.as_ref()
    }

    /// Load the driver; returns the loader status (0 or `-errno`).
    pub fn insmod(&mut self) -> i32 {
        if self.module.is_some() {
            return Errno::EBUSY.to_status();
        }
        crate::driver_entry(&mut self.platform, &mut self.module)
    }

    /// Unload the driver. Descriptors still open are released first.
    pub fn rmmod(&mut self) {
        for fd in 0..self.files.len() {
            if self.files[fd].is_none() {
                continue;
            }
            if let Err(e) = self.close(Fd(fd)) {
                log::warn!("sim: fd {} not released on unload: {}", fd, e);
                self.files[fd] = None;
            }
        }
        crate::driver_exit(&mut self.platform, &mut self.module);
    }

    /// Open a device node by path.
    pub fn open(&mut self, path: &str) -> Result<Fd, Errno> {
        let dev = self.platform.lookup(path).ok_or(Errno::ENOENT)?;
        let (driver, dispatcher) = route(&self.platform, &self.module, dev)?;
        let mut file = File::new();
        let status = dispatcher.dispatch(driver.device(), &mut file, Request::Open);
        check(status)?;
        let entry = OpenFile { dev, file };
        let fd = match self.files.iter().position(Option::is_none) {
            Some(free) => {
                self.files[free] = Some(entry);
                free
            }
            None => {
                self.files.push(Some(entry));
                self.files.len() - 1
            }
        };
        Ok(Fd(fd))
    }

    pub fn read(&mut self, fd: Fd, dst: &mut dyn UserWriter) -> Result<usize, Errno> {
        self.call(fd, Request::Read(dst))
    }

    pub fn write(&mut self, fd: Fd, src: &mut dyn UserReader) -> Result<usize, Errno> {
        self.call(fd, Request::Write(src))
    }

    /// Issue any request on an open descriptor.
    pub fn call(&mut self, fd: Fd, request: Request<'_>) -> Result<usize, Errno> {
        let open = self
            .files
            .get_mut(fd.0)
            .and_then(Option::as_mut)
            .ok_or(Errno::EBADF)?;
        let (driver, dispatcher) = route(&self.platform, &self.module, open.dev)?;
        check(dispatcher.dispatch(driver.device(), &mut open.file, request))
    }

    /// Release a descriptor. If its device can no longer be reached the
    /// descriptor stays open and the routing error is returned.
    pub fn close(&mut self, fd: Fd) -> Result<(), Errno> {
        let slot = self.files.get_mut(fd.0).ok_or(Errno::EBADF)?;
        let dev = slot.as_ref().ok_or(Errno::EBADF)?.dev;
        let (driver, dispatcher) = route(&self.platform, &self.module, dev)?;
        let mut open = slot.take().ok_or(Errno::EBADF)?;
        check(dispatcher.dispatch(driver.device(), &mut open.file, Request::Release)).map(|_| ())
    }
}

/// Find the loaded driver behind `dev` and a dispatcher for its table.
fn route<'h>(
    platform: &SimPlatform,
    module: &'h Option<CharDriver>,
    dev: DevT,
) -> Result<(&'h CharDriver, Dispatcher), Errno> {
    if !platform.has_node(dev) {
        return Err(Errno::ENXIO);
    }
    let ops = platform.ops_for(dev.major()).ok_or(Errno::ENXIO)?;
    let driver = module.as_ref().ok_or(Errno::ENXIO)?;
    Ok((driver, Dispatcher::from_table(ops)))
}

fn check(status: isize) -> Result<usize, Errno> {
    match usize::try_from(status) {
        Ok(n) => Ok(n),
        Err(_) => Err(Errno::from_status(status as i64).unwrap_or(Errno::EINVAL)),
    }
}
