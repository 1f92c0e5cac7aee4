//! Handoff of completed samples from the timer callback to the task context.

use core::cell::Cell;

use critical_section::Mutex;

/// Snapshot of one completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub oid: u8,
    /// Next scheduled callback after the frame, or the completing one if the
    /// device stopped there.
    pub clock: u32,
    pub value: i32,
    /// Probe linkage at completion time.
    pub endstop: Option<u8>,
}

/// Single-slot wake signal. Set from the timer callback, drained by the task.
///
/// A report that has not been taken yet is replaced by the next one; the task
/// only ever sees the latest sample.
pub struct SampleSignal {
    pending: Mutex<Cell<Option<Report>>>,
}

impl SampleSignal {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(None)),
        }
    }

    pub fn wake(&self, report: Report) {
        critical_section::with(|cs| self.pending.borrow(cs).set(Some(report)));
    }

    /// Take the pending report, leaving the signal clear.
    pub fn take(&self) -> Option<Report> {
        critical_section::with(|cs| self.pending.borrow(cs).take())
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get().is_some())
    }
}

impl Default for SampleSignal {
    fn default() -> Self {
        Self::new()
    }
}
