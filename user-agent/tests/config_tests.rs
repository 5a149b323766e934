//! # Config Loader Tests
//!
//! TOML parsing, defaults for every missing table, and the validation
//! errors the loader reports.

use std::{io::Write, path::PathBuf, time::Duration};

use agent::config::{self, Backend, Config, ConfigError};
use shared::constants::MESSAGE_CAPACITY;
use tempfile::NamedTempFile;

#[test]
fn empty_file_gives_defaults() {
    let cfg = config::parse("").unwrap();
    let def = Config::default();
    assert_eq!(cfg.device.path, PathBuf::from("/dev/charDrvOps"));
    assert_eq!(cfg.device.backend, Backend::Simulated);
    assert_eq!(cfg.exercise.message, def.exercise.message);
    assert_eq!(cfg.exercise.read_len, MESSAGE_CAPACITY);
    assert_eq!(cfg.exercise.repeat, 1);
    assert_eq!(cfg.exercise.interval, Duration::ZERO);
    assert!(!cfg.logging.enable);
    assert_eq!(cfg.logging.level, "INFO");
}

#[test]
fn full_file_is_loaded_from_disk() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        r#"
[device]
path    = "/dev/other"
backend = "node"

[exercise]
message  = "ping"
read_len = 32
repeat   = 4
interval = "250ms"
json     = true

[logging]
enable = true
file   = "x.log"
level  = "debug"
"#
    )
    .unwrap();

    let cfg = config::load(tmp.path()).unwrap();
    assert_eq!(cfg.device.path, PathBuf::from("/dev/other"));
    assert_eq!(cfg.device.backend, Backend::Node);
    assert_eq!(cfg.exercise.message, "ping");
    assert_eq!(cfg.exercise.read_len, 32);
    assert_eq!(cfg.exercise.repeat, 4);
    assert_eq!(cfg.exercise.interval, Duration::from_millis(250));
    assert!(cfg.exercise.json);
    assert!(cfg.logging.enable);
    assert_eq!(cfg.logging.file.as_deref(), Some("x.log"));
}

#[test]
fn bad_backend_is_rejected() {
    let err = config::parse("[device]\nbackend = \"usb\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackend(ref b) if b == "usb"), "{err}");
}

#[test]
fn bad_interval_is_rejected() {
    let err = config::parse("[exercise]\ninterval = \"soon\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDuration(ref s, _) if s == "soon"), "{err}");
}

#[test]
fn zero_repeat_is_rejected() {
    let err = config::parse("[exercise]\nrepeat = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ZeroRepeat));
}

#[test]
fn malformed_toml_is_reported() {
    let err = config::parse("[device\npath = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
