//! Mock pins, scheduler, probe and transport shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use loadcell_sampler::{
    Hx711, LoadCellProbe, PinBank, Pull, SampleSignal, Scheduler, TimerAction, TransportOutput,
};

/// Data line level as seen by the engine; the test drives it.
pub struct MockInput {
    level: Rc<Cell<bool>>,
}

impl MockInput {
    pub fn new(level: Rc<Cell<bool>>) -> Self {
        Self { level }
    }
}

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

/// Clock line recording every level written to it.
pub struct MockOutput {
    writes: Rc<RefCell<Vec<bool>>>,
    clobber: Option<Rc<Cell<bool>>>,
}

impl MockOutput {
    pub fn new(writes: Rc<RefCell<Vec<bool>>>) -> Self {
        Self {
            writes,
            clobber: None,
        }
    }

    /// Every write also forces `line` high, like a chip that changes DOUT as
    /// soon as it sees a clock edge.
    pub fn clobbering(writes: Rc<RefCell<Vec<bool>>>, line: Rc<Cell<bool>>) -> Self {
        Self {
            writes,
            clobber: Some(line),
        }
    }

    fn write(&mut self, level: bool) {
        self.writes.borrow_mut().push(level);
        if let Some(line) = &self.clobber {
            line.set(true);
        }
    }
}

impl ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// Pins by number. Grab line handles before handing the bank to a table.
#[derive(Default)]
pub struct MockBank {
    lines: HashMap<u32, Rc<Cell<bool>>>,
    clocks: HashMap<u32, Rc<RefCell<Vec<bool>>>>,
    pub inputs: Vec<(u32, Pull)>,
    pub outputs: Vec<(u32, PinState)>,
}

impl MockBank {
    pub fn line(&mut self, pin: u32) -> Rc<Cell<bool>> {
        self.lines.entry(pin).or_default().clone()
    }

    pub fn clock(&mut self, pin: u32) -> Rc<RefCell<Vec<bool>>> {
        self.clocks.entry(pin).or_default().clone()
    }
}

impl PinBank for MockBank {
    type Error = Infallible;
    type Input = MockInput;
    type Output = MockOutput;

    fn setup_input(&mut self, pin: u32, pull: Pull) -> Result<MockInput, Infallible> {
        self.inputs.push((pin, pull));
        Ok(MockInput::new(self.line(pin)))
    }

    fn setup_output(&mut self, pin: u32, initial: PinState) -> Result<MockOutput, Infallible> {
        self.outputs.push((pin, initial));
        let writes = self.clock(pin);
        writes.borrow_mut().push(initial == PinState::High);
        Ok(MockOutput::new(writes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    Cancel(u8),
    Schedule(u8, u32),
}

#[derive(Default)]
pub struct MockScheduler {
    pub ops: Vec<TimerOp>,
}

impl Scheduler for MockScheduler {
    fn cancel(&mut self, oid: u8) {
        self.ops.push(TimerOp::Cancel(oid));
    }

    fn schedule(&mut self, oid: u8, waketime: u32) {
        self.ops.push(TimerOp::Schedule(oid, waketime));
    }
}

#[derive(Default)]
pub struct RecordingProbe {
    pub samples: Vec<(u8, i32, u32)>,
}

impl LoadCellProbe for RecordingProbe {
    fn on_sample(&mut self, endstop_oid: u8, value: i32, clock: u32) {
        self.samples.push((endstop_oid, value, clock));
    }
}

#[derive(Default)]
pub struct BufferTransport {
    pub messages: Vec<Vec<u8>>,
}

impl TransportOutput for BufferTransport {
    fn output(&mut self, message: &[u8]) {
        self.messages.push(message.to_vec());
    }
}

pub type TestHx711<'a> = Hx711<'a, MockInput, MockOutput>;

/// Data line level for half-cycle `index` of a frame carrying the 24-bit `pattern`.
///
/// Low at index 0 (data ready), the pattern bit on data capture half-cycles,
/// low everywhere else.
pub fn frame_level(pattern: u32, index: u32) -> bool {
    index % 2 == 1 && index < 48 && (pattern >> (23 - index / 2)) & 1 == 1
}

/// Drive one whole frame through `event`, starting at the device's waketime.
/// Returns the action of every call.
pub fn clock_frame(
    dev: &mut TestHx711<'_>,
    data: &Cell<bool>,
    pattern: u32,
) -> Vec<TimerAction> {
    let mut now = dev.waketime();
    let mut actions = Vec::new();
    for index in 0..dev.frame_len() {
        data.set(frame_level(pattern, index));
        let action = dev.event(now).unwrap();
        if let TimerAction::Reschedule(next) = action {
            now = next;
        }
        actions.push(action);
    }
    actions
}

pub fn new_signals<const N: usize>() -> [SampleSignal; N] {
    std::array::from_fn(|_| SampleSignal::new())
}
