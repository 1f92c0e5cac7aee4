//! Frame progress and sample assembly.
//!
//! A frame is 24 data bits, each one rising and one falling clock edge, then
//! `gain` extra pulses that select the channel of the next conversion. Bits
//! are captured MSB first into the top 24 bits of a 32-bit accumulator so that
//! an arithmetic shift right by 8 sign-extends the result.

use embedded_hal::digital::PinState;

use super::{GainMode, Invert};

pub const HX711_MINIMUM: i32 = -(1 << 23);
pub const HX711_MAXIMUM: i32 = (1 << 23) - 1;

/// Half-cycles covering the 24 data bits.
pub const DATA_HALF_CYCLES: u32 = 48;

/// Half-cycles in a full frame for `gain`.
pub const fn frame_len(gain: GainMode) -> u32 {
    DATA_HALF_CYCLES + 2 * gain.pulses()
}

/// Turn a filled accumulator into the final signed sample.
pub fn assemble(shift: i32, invert: Invert) -> i32 {
    (shift >> 8) * invert.sign()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pulse_index: u32,
    shift: i32,
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            pulse_index: 0,
            shift: 0,
        }
    }

    pub fn pulse_index(&self) -> u32 {
        self.pulse_index
    }

    pub fn shift(&self) -> i32 {
        self.shift
    }

    /// Process one half-cycle. `data_high` is the data line level sampled
    /// before any clock change in this half-cycle. Returns the clock level to drive.
    pub fn advance(&mut self, data_high: bool) -> PinState {
        let level = if self.pulse_index % 2 == 1 {
            if self.pulse_index < DATA_HALF_CYCLES {
                self.shift |= i32::from(data_high) << (31 - self.pulse_index / 2);
            }
            PinState::Low
        } else {
            PinState::High
        };
        self.pulse_index += 1;
        level
    }

    pub fn is_complete(&self, gain: GainMode) -> bool {
        self.pulse_index >= frame_len(gain)
    }

    /// Assemble the sample and start over.
    pub fn finish(&mut self, invert: Invert) -> i32 {
        let value = assemble(self.shift, invert);
        *self = Frame::new();
        value
    }
}
