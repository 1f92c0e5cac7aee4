//! Scheduler-facing types: what a timer callback asks for next, how the
//! device arms and cancels its timer, and the delays it uses.

/// Samples per second targeted while a device stays enabled.
pub const SAMPLES_PER_SECOND: u32 = 80;
/// Microseconds between clock edges.
pub const COMM_DELAY_US: u32 = 40;
/// Microseconds between data-ready checks while the chip is converting.
pub const NO_DATA_RETRY_DELAY_US: u32 = 200;

/// Result of one timer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Run again at this absolute clock.
    Reschedule(u32),
    /// Do not run again until re-armed.
    Done,
}

/// Timer operations a lifecycle request needs.
pub trait Scheduler {
    /// Drop any pending callback for `oid`.
    fn cancel(&mut self, oid: u8);

    /// Run the callback for `oid` at the absolute clock `waketime`.
    fn schedule(&mut self, oid: u8, waketime: u32);
}

/// Engine delays, in timer clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay after a completed frame before the next one starts.
    pub sample_interval: u32,
    /// Delay between clock edges within a frame.
    pub comm_delay: u32,
    /// Delay between data-ready checks.
    pub no_data_retry_delay: u32,
}

impl Timing {
    pub const fn from_clock_freq(clock_freq: u32) -> Self {
        let ticks_per_us = clock_freq / 1_000_000;
        Self {
            sample_interval: clock_freq / SAMPLES_PER_SECOND,
            comm_delay: COMM_DELAY_US * ticks_per_us,
            no_data_retry_delay: NO_DATA_RETRY_DELAY_US * ticks_per_us,
        }
    }
}

/// A 1 MHz timer, so every delay reads in microseconds.
impl Default for Timing {
    fn default() -> Self {
        Self::from_clock_freq(1_000_000)
    }
}
