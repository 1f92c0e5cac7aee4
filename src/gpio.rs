//! Pin allocation by number.
//!
//! Configuration requests name pins by number; a [`PinBank`] turns those
//! numbers into embedded-hal pins that the engine then owns exclusively.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Input bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

pub trait PinBank {
    type Error: core::fmt::Debug;
    type Input: InputPin<Error = Self::Error>;
    type Output: OutputPin<Error = Self::Error>;

    /// Claim `pin` as an input with the given bias.
    fn setup_input(&mut self, pin: u32, pull: Pull) -> Result<Self::Input, Self::Error>;

    /// Claim `pin` as a push-pull output driven to `initial` straight away.
    fn setup_output(&mut self, pin: u32, initial: PinState) -> Result<Self::Output, Self::Error>;
}
