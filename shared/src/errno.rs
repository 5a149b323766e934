//! Platform error numbers and the negative status convention.

use core::fmt;

/// A positive platform error number (`EFAULT`, `EINVAL`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    pub const ENOENT: Errno = Errno(2);
    pub const ENXIO:  Errno = Errno(6);
    pub const EBADF:  Errno = Errno(9);
    pub const ENOMEM: Errno = Errno(12);
    pub const EFAULT: Errno = Errno(14);
    pub const EBUSY:  Errno = Errno(16);
    pub const EINVAL: Errno = Errno(22);
    pub const ENOTTY: Errno = Errno(25);
    pub const ENOSPC: Errno = Errno(28);

    /// Status handed back across the file / loader interface (`-errno`).
    pub const fn to_status(self) -> i32 {
        -self.0
    }

    /// Inverse of [`Errno::to_status`]. `None` for success values and for
    /// negative statuses whose magnitude does not fit an errno.
    pub fn from_status(status: i64) -> Option<Errno> {
        if status >= 0 {
            return None;
        }
        let code = status.checked_neg()?;
        i32::try_from(code).ok().map(Errno)
    }

    pub const fn name(self) -> &'static str {
        match self.0 {
            2  => "ENOENT",
            6  => "ENXIO",
            9  => "EBADF",
            12 => "ENOMEM",
            14 => "EFAULT",
            16 => "EBUSY",
            22 => "EINVAL",
            25 => "ENOTTY",
            28 => "ENOSPC",
            _  => "E?",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}
