//! HX 711 Host Loop Example
//!
//! Runs the sampler on the host against a simulated chip. The "timer
//! interrupt" clocks the chip one half-cycle at a time through the device
//! table, and the main loop turns completed samples into `hx711_in_state`
//! messages, the same way firmware would.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use heapless::Vec;
use loadcell_sampler::encoding::encode_int;
use loadcell_sampler::protocol::MESSAGE_MAX;
use loadcell_sampler::{
    hx711_task, Hx711Table, LoadCellProbe, MessageIds, PinBank, Pull, SampleSignal, Scheduler,
    StateReport, TimerAction, Timing, TransportOutput,
};

const OID: u8 = 0;
const ENDSTOP_OID: i32 = 7;
const CLOCK_FREQ: u32 = 1_000_000;

/// 24-bit two's complement conversions the simulated chip hands out in turn.
const CONVERSIONS: [u32; 4] = [0x00_1234, 0xff_ff00, 0x80_0000, 0x7f_ffff];

/// Reads of DOUT the chip stays busy for after a frame.
const CONVERSION_READS: u32 = 3;

struct Chip {
    next: usize,
    current: u32,
    rising_edges: u32,
    busy_reads: u32,
    dout: bool,
    level: bool,
}

impl Chip {
    const fn new() -> Self {
        Self {
            next: 1,
            current: CONVERSIONS[0],
            rising_edges: 0,
            busy_reads: 0,
            dout: false,
            level: true,
        }
    }

    fn read(&mut self) -> bool {
        if self.busy_reads > 0 {
            self.busy_reads -= 1;
            self.dout = self.busy_reads > 0;
            return true;
        }
        self.dout
    }

    fn clock(&mut self, high: bool) {
        let rising = high && !self.level;
        self.level = high;
        if !rising {
            return;
        }
        self.rising_edges += 1;
        if self.rising_edges <= 24 {
            self.dout = (self.current >> (24 - self.rising_edges)) & 1 == 1;
        } else {
            // gain pulse: shift-out is over, start the next conversion
            self.rising_edges = 0;
            self.dout = true;
            self.busy_reads = CONVERSION_READS;
            self.current = CONVERSIONS[self.next % CONVERSIONS.len()];
            self.next += 1;
        }
    }
}

// mutex to access the chip from both pins
static CHIP: Mutex<RefCell<Chip>> = Mutex::new(RefCell::new(Chip::new()));

struct SimDout;
struct SimSck;
struct SimBank;

impl ErrorType for SimDout {
    type Error = core::convert::Infallible;
}

impl InputPin for SimDout {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(critical_section::with(|cs| CHIP.borrow_ref_mut(cs).read()))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl ErrorType for SimSck {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimSck {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        critical_section::with(|cs| CHIP.borrow_ref_mut(cs).clock(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        critical_section::with(|cs| CHIP.borrow_ref_mut(cs).clock(true));
        Ok(())
    }
}

impl PinBank for SimBank {
    type Error = core::convert::Infallible;
    type Input = SimDout;
    type Output = SimSck;

    fn setup_input(&mut self, pin: u32, pull: Pull) -> Result<SimDout, Self::Error> {
        println!("dout on pin {} ({:?})", pin, pull);
        Ok(SimDout)
    }

    fn setup_output(&mut self, pin: u32, initial: PinState) -> Result<SimSck, Self::Error> {
        println!("sck on pin {} ({:?})", pin, initial);
        Ok(SimSck)
    }
}

/// One pending callback per oid, like a firmware timer list.
#[derive(Default)]
struct Timers {
    pending: std::vec::Vec<(u8, u32)>,
}

impl Timers {
    fn pop(&mut self) -> Option<(u8, u32)> {
        let next = (0..self.pending.len()).min_by_key(|&i| self.pending[i].1)?;
        Some(self.pending.swap_remove(next))
    }
}

impl Scheduler for Timers {
    fn cancel(&mut self, oid: u8) {
        self.pending.retain(|&(pending, _)| pending != oid);
    }

    fn schedule(&mut self, oid: u8, waketime: u32) {
        self.pending.push((oid, waketime));
    }
}

struct PrintProbe;

impl LoadCellProbe for PrintProbe {
    fn on_sample(&mut self, endstop_oid: u8, value: i32, clock: u32) {
        println!("  probe {}: {} @ {}", endstop_oid, value, clock);
    }
}

struct Host {
    ids: MessageIds,
    reports: usize,
}

impl TransportOutput for Host {
    fn output(&mut self, message: &[u8]) {
        let report = StateReport::decode(&self.ids, message).unwrap();
        println!(
            "hx711_in_state oid={} clock={} value={}",
            report.oid, report.clock, report.value
        );
        self.reports += 1;
    }
}

type Table = Hx711Table<'static, SimBank, 1>;

static SIGNALS: [SampleSignal; 1] = [SampleSignal::new()];
// mutex to access during the timer interrupt and in main
static TABLE: Mutex<RefCell<Option<Table>>> = Mutex::new(RefCell::new(None));

fn message(fields: &[u32]) -> Vec<u8, MESSAGE_MAX> {
    let mut out = Vec::new();
    for &field in fields {
        encode_int(&mut out, field).unwrap();
    }
    out
}

fn command(ids: &MessageIds, body: &[u8], now: u32, timers: &mut Timers) {
    critical_section::with(|cs| {
        TABLE
            .borrow_ref_mut(cs)
            .as_mut()
            .unwrap()
            .handle_message(ids, body, now, timers)
            .unwrap();
    });
}

fn timer_interrupt(oid: u8, now: u32) -> TimerAction {
    critical_section::with(|cs| TABLE.borrow_ref_mut(cs).as_mut().unwrap().on_timer(oid, now))
}

fn main() {
    let ids = MessageIds::default();
    let mut timers = Timers::default();
    let table = Hx711Table::new(SimBank, &SIGNALS, Timing::from_clock_freq(CLOCK_FREQ));
    critical_section::with(|cs| {
        TABLE.borrow_ref_mut(cs).replace(table);
    });

    command(
        &ids,
        &message(&[ids.config_hx711, OID.into(), 4, 5, 1, 1]),
        0,
        &mut timers,
    );
    command(
        &ids,
        &message(&[ids.query_hx711, OID.into(), 1, ENDSTOP_OID as u32]),
        0,
        &mut timers,
    );

    let mut host = Host { ids, reports: 0 };
    let mut now = 0;
    while host.reports < CONVERSIONS.len() {
        let Some((oid, waketime)) = timers.pop() else {
            break;
        };
        now = waketime;
        if let TimerAction::Reschedule(next) = timer_interrupt(oid, now) {
            timers.schedule(oid, next);
        }
        hx711_task(&SIGNALS, &ids, &mut PrintProbe, &mut host);
    }

    // disable: the frame in flight completes and the callback stops
    command(
        &ids,
        &message(&[ids.query_hx711, OID.into(), 0, -1i32 as u32]),
        now,
        &mut timers,
    );
    while let Some((oid, waketime)) = timers.pop() {
        if let TimerAction::Reschedule(next) = timer_interrupt(oid, waketime) {
            timers.schedule(oid, next);
        }
        hx711_task(&SIGNALS, &ids, &mut PrintProbe, &mut host);
    }
    println!("stopped after {} reports", host.reports);
}
