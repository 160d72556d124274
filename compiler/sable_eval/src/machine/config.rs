//! Machine limits and language level.

use std::time::Duration;

use crate::checks::LanguageLevel;

/// Default maximum number of live (non-tail) calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Default number of frames kept in an overflow diagnostic.
pub const DEFAULT_TRACE_FRAMES: usize = 10;

/// Default number of dispatch steps between two reads of the clock.
pub const DEFAULT_DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Limits and behavior of one machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Live calls allowed before a stack overflow is reported.
    pub max_call_depth: usize,
    /// Most recent calls reported by an overflow diagnostic.
    pub trace_frames: usize,
    /// Dispatch steps allowed before a timeout.
    pub step_limit: Option<u64>,
    /// Wall-clock budget. Time spent paused does not count.
    pub time_limit: Option<Duration>,
    /// How often (in dispatch steps) the clock is read.
    pub deadline_check_interval: u64,
    pub language: LanguageLevel,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace_frames: DEFAULT_TRACE_FRAMES,
            step_limit: None,
            time_limit: None,
            deadline_check_interval: DEFAULT_DEADLINE_CHECK_INTERVAL,
            language: LanguageLevel::default(),
        }
    }
}
