/// Injected diagnostic configuration. Per-tick diagnostics flow through
/// this value rather than process-wide statics, so two simulations in one
/// process can be instrumented independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugOptions {
    /// Log zone effect lifecycle and state transitions at debug level.
    pub log_zone_transitions: bool,
    /// Log per-tick force and speed values at trace level.
    pub log_tick_forces: bool,
}

impl DebugOptions {
    pub fn verbose() -> Self {
        Self {
            log_zone_transitions: true,
            log_tick_forces: true,
        }
    }
}
