/// Log under a per-component target, `agent::<component>`.
///
/// The fern format in [`crate::logging`] already stamps time, level, pid and
/// thread, and prints the target; this macro only picks the target so lines
/// can be filtered by component.
///
/// ```rust
/// # use log::Level;
/// agent::agent_log!(Level::Info, "client", "Device opened");
/// agent::agent_log!(Level::Error, "config", "Config load failed: {}", "missing file");
/// ```
#[macro_export]
macro_rules! agent_log {
    ($level:expr, $component:literal, $($arg:tt)+) => {
        log::log!(target: concat!("agent::", $component), $level, $($arg)+)
    };
}
