// src/main.rs

//! Agent entry-point: exercise the charDrv device from user space.
//!
//! 1. Load configuration (first CLI argument, else `agent.toml` next to the
//!    executable, else built-in defaults)
//! 2. Set up structured logging
//! 3. Open the device (real node or in-process simulation)
//! 4. Write, read back, and verify the drain, `repeat` times
//! 5. Print one report per round; exit non-zero if any round misbehaved

use anyhow::{Context, Result, bail};
use chrono::Local;
use std::{
    env,
    path::{Path, PathBuf},
    thread,
};

use agent::{
    config::{self, Config},
    connect,
    exercise::{Report, exercise},
    logging::setup_logging,
};

const CONFIG_FILE: &str = "agent.toml";

/// Directory that contains the running executable.
fn exe_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("cannot determine exe path")?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Pick and load the configuration.
fn load_config(exe_dir: &Path) -> Result<Config> {
    if let Some(arg) = env::args_os().nth(1) {
        let path = PathBuf::from(arg);
        return config::load(&path).with_context(|| format!("loading {}", path.display()));
    }
    let beside = exe_dir.join(CONFIG_FILE);
    if beside.exists() {
        return config::load(&beside).with_context(|| format!("loading {}", beside.display()));
    }
    Ok(Config::default())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!(
            "[{}] {} sent {:?} ({} accepted) -> {:?} ({} bytes), match={}, drained={}",
            report.started.to_rfc3339(),
            report.client,
            report.sent,
            report.accepted,
            report.reply,
            report.reply_len,
            report.matches,
            report.drained,
        );
    }
    Ok(())
}

fn run() -> Result<()> {
    // 1 ─ Context
    let exe_dir = exe_dir()?;
    let cfg = load_config(&exe_dir)?;

    // 2 ─ Logging
    setup_logging(&exe_dir, &cfg.logging).context("logging setup failed")?;
    log::info!("Agent starting against {}", cfg.device.path.display());

    // 3 ─ Device
    let mut client = connect(&cfg.device)
        .with_context(|| format!("opening {}", cfg.device.path.display()))?;

    // 4 ─ Rounds
    let ex = &cfg.exercise;
    let mut failures = 0;
    for round in 1..=ex.repeat {
        let report = exercise(client.as_mut(), &ex.message, ex.read_len)
            .with_context(|| format!("round {round}"))?;
        if !(report.matches && report.drained) {
            failures += 1;
        }
        print_report(&report, ex.json)?;
        if round < ex.repeat && !ex.interval.is_zero() {
            thread::sleep(ex.interval);
        }
    }

    // 5 ─ Verdict
    drop(client);
    log::info!("End of the program");
    if failures > 0 {
        bail!("{failures} of {} round(s) got an unexpected reply", ex.repeat);
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("[{}][ERROR][main] {:#}", Local::now().to_rfc3339(), e);
        std::process::exit(1);
    }
}
