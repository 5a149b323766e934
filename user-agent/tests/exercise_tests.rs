//! # Exercise Tests
//!
//! Runs the agent's write/read round against the in-process driver and
//! against a plain file standing in for a device node.

use std::{fs, path::Path};

use agent::{
    client::{ClientError, DeviceClient, NodeClient, SimClient},
    config::{Backend, model::DeviceConfig},
    connect,
    exercise::{exercise, expected_reply},
};
use chardrv_driver::{platform::Step, sim::{SimHost, SimPlatform}};
use shared::{Errno, constants::dev_path};

#[test]
fn simulated_round_matches_and_drains() {
    let mut client = SimClient::open(Path::new(&dev_path())).unwrap();
    let report = exercise(&mut client, "test", 256).unwrap();
    assert_eq!(report.accepted, 4);
    assert_eq!(report.reply, "test(4 letters)");
    assert_eq!(report.reply_len, 15);
    assert!(report.matches);
    assert!(report.drained);
}

#[test]
fn repeated_rounds_reuse_one_session() {
    let mut client = SimClient::open(Path::new(&dev_path())).unwrap();
    for msg in ["one", "two", "three"] {
        let report = exercise(&mut client, msg, 256).unwrap();
        assert!(report.matches && report.drained, "{report:?}");
    }
    assert_eq!(client.host().module().unwrap().device().open_count(), 1);
}

#[test]
fn short_read_does_not_match_but_drains() {
    let mut client = SimClient::open(Path::new(&dev_path())).unwrap();
    let report = exercise(&mut client, "hello", 5).unwrap();
    assert_eq!(report.reply, "hello");
    assert!(!report.matches);
    assert!(report.drained);
}

#[test]
fn oversized_message_surfaces_enospc() {
    let mut client = SimClient::open(Path::new(&dev_path())).unwrap();
    let big = "x".repeat(300);
    let err = exercise(&mut client, &big, 256).unwrap_err();
    assert_eq!(err.errno(), Some(Errno::ENOSPC));
}

#[test]
fn load_failure_is_reported() {
    let mut platform = SimPlatform::new();
    platform.fail_at(Step::Node, Errno::ENOMEM);
    let mut host = SimHost::with_platform(platform);
    assert_eq!(host.insmod(), -12);
    let err = SimClient::attach(host, Path::new(&dev_path())).err().unwrap();
    assert!(matches!(err, ClientError::Device(Errno::ENOENT)));
}

#[test]
fn unknown_simulated_path_is_enoent() {
    let err = SimClient::open(Path::new("/dev/nope")).err().unwrap();
    assert_eq!(err.errno(), Some(Errno::ENOENT));
}

#[test]
fn connect_picks_backend() {
    let dev = DeviceConfig { path: dev_path().into(), backend: Backend::Simulated };
    let mut client = connect(&dev).unwrap();
    assert!(client.describe().starts_with("simulated"));
    assert_eq!(client.write_message(b"hi").unwrap(), 2);
    assert_eq!(client.read_message(64).unwrap(), expected_reply(b"hi"));
}

#[test]
fn node_client_reads_and_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let node = dir.path().join("charDrvOps");
    fs::write(&node, b"").unwrap();

    let mut client = NodeClient::open(&node).unwrap();
    assert!(client.describe().contains("charDrvOps"));
    assert_eq!(client.write_message(b"abc").unwrap(), 3);
    // a plain file keeps its cursor after the write
    assert!(client.read_message(16).unwrap().is_empty());
    assert_eq!(fs::read(&node).unwrap(), b"abc");
}

#[test]
fn node_client_missing_node_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NodeClient::open(&dir.path().join("missing")).err().unwrap();
    assert!(matches!(err, ClientError::Open { .. }));
    assert_eq!(err.errno(), Some(Errno::ENOENT));
}
