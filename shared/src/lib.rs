#![cfg_attr(all(feature = "kernel", not(test)), no_std)]

#[cfg(feature = "kernel")]
extern crate alloc; // gives String for dev_path

pub mod constants;
pub mod errno;

pub use errno::Errno;
