//! The open → write → read → read round the agent performs.
//!
//! The second read checks the drain: the driver must hand the message
//! back once, then report an empty buffer.

use chrono::{DateTime, Local};
use log::Level;
use serde::Serialize;
use std::time::Instant;

use crate::agent_log;
use crate::client::{ClientError, DeviceClient};

/// What one round observed.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub started:    DateTime<Local>,
    pub client:     String,
    pub sent:       String,
    pub accepted:   usize,
    pub reply:      String,
    pub reply_len:  usize,
    /// The reply is exactly `sent` plus its letter count.
    pub matches:    bool,
    /// The read after the reply came back empty.
    pub drained:    bool,
    pub elapsed_us: u128,
}

/// Reply the driver produces for `message`.
pub fn expected_reply(message: &[u8]) -> Vec<u8> {
    let mut out = message.to_vec();
    out.extend_from_slice(format!("({} letters)", message.len()).as_bytes());
    out
}

/// Run one round against `client`.
pub fn exercise(
    client: &mut dyn DeviceClient,
    message: &str,
    read_len: usize,
) -> Result<Report, ClientError> {
    let started = Local::now();
    let clock = Instant::now();

    agent_log!(Level::Info, "exercise", "Writing message to the device [{}]", message);
    let accepted = client.write_message(message.as_bytes())?;

    agent_log!(Level::Info, "exercise", "Reading from the device...");
    let reply = client.read_message(read_len)?;
    let again = client.read_message(read_len)?;

    let expected = expected_reply(message.as_bytes());
    let report = Report {
        started,
        client: client.describe(),
        sent: message.to_owned(),
        accepted,
        reply: String::from_utf8_lossy(&reply).into_owned(),
        reply_len: reply.len(),
        matches: reply == expected,
        drained: again.is_empty(),
        elapsed_us: clock.elapsed().as_micros(),
    };

    if report.matches && report.drained {
        agent_log!(Level::Info, "exercise", "The received message is: [{}]", report.reply);
    } else {
        agent_log!(
            Level::Warn,
            "exercise",
            "Unexpected reply [{}] (drained={})",
            report.reply,
            report.drained
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_reply_appends_count() {
        assert_eq!(expected_reply(b"test"), b"test(4 letters)");
        assert_eq!(expected_reply(b""), b"(0 letters)");
    }
}
