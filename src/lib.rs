//! A timer-driven hx711 sampler for firmware that talks to a host controller.
//!
//! The hx711 is clocked one half-cycle per timer callback: [`hx711::Hx711::event`]
//! never blocks, it samples the data line, toggles the clock line and tells the
//! caller when it wants to run next via [`TimerAction`]. Completed samples are
//! handed from the timer context to the task context through a
//! [`SampleSignal`], and [`task::hx711_task`] turns them into `hx711_in_state`
//! messages (and optionally feeds a [`LoadCellProbe`]).
//!
//! A firmware integration typically looks like:
//!
//! ```ignore
//! static SIGNALS: [SampleSignal; 2] = [const { SampleSignal::new() }; 2];
//! static TABLE: Mutex<RefCell<Option<Hx711Table<'static, Bank, 2>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! // command handler (task context)
//! critical_section::with(|cs| {
//!     let mut table = TABLE.borrow_ref_mut(cs);
//!     let table = table.as_mut().unwrap();
//!     table.handle_message(&ids, body, now(), &mut timers)
//! })?;
//!
//! // timer callback (interrupt context)
//! let action = critical_section::with(|cs| {
//!     TABLE.borrow_ref_mut(cs).as_mut().unwrap().on_timer(oid, now())
//! });
//!
//! // main loop (task context)
//! hx711_task(&SIGNALS, &ids, &mut probe, &mut transport);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod encoding;
pub mod error;
pub mod gpio;
pub mod hx711;
pub mod protocol;
pub mod sched;
pub mod table;
pub mod task;

pub use error::{DecodeError, EncodeError, Error};
pub use gpio::{PinBank, Pull};
pub use hx711::interrupt::{Report, SampleSignal};
pub use hx711::{GainMode, Hx711, Invert};
pub use protocol::{Command, ConfigHx711, MessageIds, QueryHx711, StateReport};
pub use sched::{Scheduler, TimerAction, Timing};
pub use table::Hx711Table;
pub use task::hx711_task;

/// Receives every completed sample of a device that has probe linkage.
///
/// Called from the task context, never from the timer callback. The call is
/// fire-and-forget: nothing it does feeds back into acquisition.
pub trait LoadCellProbe {
    /// A sample `value` completed at `clock` for the device linked to `endstop_oid`.
    fn on_sample(&mut self, endstop_oid: u8, value: i32, clock: u32);
}

/// No probe attached.
impl LoadCellProbe for () {
    fn on_sample(&mut self, _endstop_oid: u8, _value: i32, _clock: u32) {}
}

/// Outbound path to the host.
///
/// Each call hands over one encoded message body; framing it for the wire is
/// up to the implementation.
pub trait TransportOutput {
    fn output(&mut self, message: &[u8]);
}
