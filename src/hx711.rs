//! The hx711 clock/capture engine.
//!
//! Instead of bit-banging a whole conversion in one go, [`Hx711::event`] is
//! called from a timer once per clock half-cycle and returns when it wants to
//! be called again. A frame therefore spreads over `48 + 2 * gain` callbacks,
//! `comm_delay` apart, with nothing in between blocking the processor.

pub mod frame;
pub mod interrupt;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::sched::{Scheduler, TimerAction, Timing};
use frame::Frame;
use interrupt::{Report, SampleSignal};

pub use frame::{HX711_MAXIMUM, HX711_MINIMUM};

/// Channel and gain of the next conversion, selected by the number of extra
/// clock pulses after the data bits.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainMode {
    A128 = 1, // extra pulses
    B32 = 2,
    A64 = 3,
}

impl GainMode {
    pub const fn pulses(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for GainMode {
    type Error = u32;

    fn try_from(gain: u32) -> Result<Self, Self::Error> {
        match gain {
            1 => Ok(GainMode::A128),
            2 => Ok(GainMode::B32),
            3 => Ok(GainMode::A64),
            other => Err(other),
        }
    }
}

/// Sign applied to every assembled sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invert {
    Normal,
    Inverted,
}

impl Invert {
    pub const fn sign(self) -> i32 {
        match self {
            Invert::Normal => 1,
            Invert::Inverted => -1,
        }
    }
}

impl TryFrom<i32> for Invert {
    type Error = i32;

    fn try_from(invert: i32) -> Result<Self, Self::Error> {
        match invert {
            1 => Ok(Invert::Normal),
            -1 => Ok(Invert::Inverted),
            other => Err(other),
        }
    }
}

/// One hx711 bound to its data (DOUT) and clock (PD_SCK) lines.
pub struct Hx711<'a, DT, SCK> {
    oid: u8,
    dout: DT,
    sck: SCK,
    gain: GainMode,
    invert: Invert,
    timing: Timing,
    frame: Frame,
    result: i32,
    endstop: Option<u8>,
    active: bool,
    running: bool,
    waketime: u32,
    signal: &'a SampleSignal,
}

impl<'a, DT, SCK, E> Hx711<'a, DT, SCK>
where
    DT: InputPin<Error = E>,
    SCK: OutputPin<Error = E>,
{
    /// Take ownership of both lines and drive the clock high, which keeps the
    /// chip powered down until the first enable.
    pub fn new(
        oid: u8,
        dout: DT,
        mut sck: SCK,
        gain: GainMode,
        invert: Invert,
        timing: Timing,
        signal: &'a SampleSignal,
    ) -> Result<Self, E> {
        sck.set_high()?;
        Ok(Self {
            oid,
            dout,
            sck,
            gain,
            invert,
            timing,
            frame: Frame::new(),
            result: 0,
            endstop: None,
            active: false,
            running: false,
            waketime: 0,
            signal,
        })
    }

    /// Enable or disable periodic acquisition and set the probe linkage.
    ///
    /// Enabling always restarts: the pending callback is cancelled, the frame
    /// is cleared, the clock is pulled low and the first data-ready check is
    /// scheduled `no_data_retry_delay` after `now`. Disabling only clears the
    /// flag; a frame in flight runs to completion and then the engine stops.
    ///
    /// If the clock line cannot be pulled low the device is left stopped.
    pub fn query<S: Scheduler>(
        &mut self,
        enable: bool,
        endstop: Option<u8>,
        now: u32,
        scheduler: &mut S,
    ) -> Result<(), E> {
        if !enable {
            self.endstop = endstop;
            self.active = false;
            return Ok(());
        }
        scheduler.cancel(self.oid);
        self.frame = Frame::new();
        if let Err(err) = self.sck.set_low() {
            // the callback is already cancelled
            self.halt();
            return Err(err);
        }
        self.endstop = endstop;
        self.active = true;
        self.waketime = now.wrapping_add(self.timing.no_data_retry_delay);
        self.running = true;
        scheduler.schedule(self.oid, self.waketime);
        Ok(())
    }

    /// Timer callback: advance the frame by exactly one half-cycle.
    pub fn event(&mut self, now: u32) -> Result<TimerAction, E> {
        // read before any clock change in this half-cycle
        let data_high = self.dout.is_high()?;
        if self.frame.pulse_index() == 0 && data_high {
            // conversion not ready, no clock edges until it is
            return Ok(self.reschedule(now, self.timing.no_data_retry_delay));
        }

        let level = self.frame.advance(data_high);
        if !self.frame.is_complete(self.gain) {
            self.sck.set_state(level)?;
            return Ok(self.reschedule(now, self.timing.comm_delay));
        }

        self.result = self.frame.finish(self.invert);
        self.sck.set_low()?;
        let action = if self.active {
            self.reschedule(now, self.timing.sample_interval)
        } else {
            self.running = false;
            TimerAction::Done
        };
        // stamped with the next wake time, or the last one once stopped
        self.signal.wake(Report {
            oid: self.oid,
            clock: self.waketime,
            value: self.result,
            endstop: self.endstop,
        });
        Ok(action)
    }

    fn reschedule(&mut self, now: u32, delay: u32) -> TimerAction {
        self.waketime = now.wrapping_add(delay);
        TimerAction::Reschedule(self.waketime)
    }

    /// Stop acquisition without waiting for the frame boundary. Used when the
    /// lines can no longer be driven.
    pub(crate) fn halt(&mut self) {
        self.active = false;
        self.running = false;
    }
}

impl<DT, SCK> Hx711<'_, DT, SCK> {
    pub fn oid(&self) -> u8 {
        self.oid
    }

    pub fn gain_mode(&self) -> GainMode {
        self.gain
    }

    pub fn invert(&self) -> Invert {
        self.invert
    }

    /// Half-cycles in a frame with the configured gain.
    pub fn frame_len(&self) -> u32 {
        frame::frame_len(self.gain)
    }

    /// Last completed sample, after inversion.
    pub fn latest(&self) -> i32 {
        self.result
    }

    pub fn pulse_index(&self) -> u32 {
        self.frame.pulse_index()
    }

    /// Raw accumulator of the frame in flight.
    pub fn shift(&self) -> i32 {
        self.frame.shift()
    }

    pub fn endstop(&self) -> Option<u8> {
        self.endstop
    }

    /// Whether acquisition continues past the current frame.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a timer callback is outstanding.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Absolute clock of the next (or, once stopped, the last) callback.
    pub fn waketime(&self) -> u32 {
        self.waketime
    }
}
