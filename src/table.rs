//! Device lifecycle: configure and query requests over a fixed table of hx711s.

use embedded_hal::digital::PinState;
use heapless::Vec;

use crate::error::Error;
use crate::gpio::{PinBank, Pull};
use crate::hx711::interrupt::SampleSignal;
use crate::hx711::{GainMode, Hx711, Invert};
use crate::protocol::{Command, ConfigHx711, MessageIds, QueryHx711};
use crate::sched::{Scheduler, TimerAction, Timing};

/// Up to `N` devices keyed by oid, each paired with the signal at the same
/// position in `signals`.
pub struct Hx711Table<'a, B: PinBank, const N: usize> {
    bank: B,
    timing: Timing,
    signals: &'a [SampleSignal; N],
    devices: Vec<Hx711<'a, B::Input, B::Output>, N>,
}

impl<'a, B: PinBank, const N: usize> Hx711Table<'a, B, N> {
    pub fn new(bank: B, signals: &'a [SampleSignal; N], timing: Timing) -> Self {
        Self {
            bank,
            timing,
            signals,
            devices: Vec::new(),
        }
    }

    /// Bind the lines of a new device. Configuring an oid again rebuilds the
    /// device in its existing slot.
    pub fn configure(&mut self, config: &ConfigHx711) -> Result<(), Error<B::Error>> {
        let gain = GainMode::try_from(config.gain).map_err(Error::InvalidGain)?;
        let invert = Invert::try_from(config.invert).map_err(Error::InvalidInvert)?;
        let slot = match self.position(config.oid) {
            Some(slot) => slot,
            None if self.devices.is_full() => return Err(Error::TableFull),
            None => self.devices.len(),
        };

        let dout = self
            .bank
            .setup_input(config.dout_pin, Pull::Down)
            .map_err(Error::Pin)?;
        let sck = self
            .bank
            .setup_output(config.sck_pin, PinState::High)
            .map_err(Error::Pin)?;
        let signals = self.signals;
        let device = Hx711::new(
            config.oid,
            dout,
            sck,
            gain,
            invert,
            self.timing,
            &signals[slot],
        )
        .map_err(Error::Pin)?;

        if slot < self.devices.len() {
            self.devices[slot] = device;
        } else if self.devices.push(device).is_err() {
            return Err(Error::TableFull);
        }
        log::debug!(
            "hx711 oid={} configured: dout={} sck={} gain={:?} invert={:?}",
            config.oid,
            config.dout_pin,
            config.sck_pin,
            gain,
            invert
        );
        Ok(())
    }

    pub fn query<S: Scheduler>(
        &mut self,
        query: &QueryHx711,
        now: u32,
        scheduler: &mut S,
    ) -> Result<(), Error<B::Error>> {
        let device = self
            .device_mut(query.oid)
            .ok_or(Error::UnknownOid(query.oid))?;
        device
            .query(query.enable, query.endstop_oid, now, scheduler)
            .map_err(Error::Pin)?;
        log::debug!(
            "hx711 oid={} {} endstop={:?}",
            query.oid,
            if query.enable { "enabled" } else { "disabled" },
            query.endstop_oid
        );
        Ok(())
    }

    pub fn dispatch<S: Scheduler>(
        &mut self,
        command: Command,
        now: u32,
        scheduler: &mut S,
    ) -> Result<(), Error<B::Error>> {
        match command {
            Command::Config(config) => self.configure(&config),
            Command::Query(query) => self.query(&query, now, scheduler),
        }
    }

    /// Decode an inbound message body and apply it.
    pub fn handle_message<S: Scheduler>(
        &mut self,
        ids: &MessageIds,
        body: &[u8],
        now: u32,
        scheduler: &mut S,
    ) -> Result<(), Error<B::Error>> {
        let command = Command::decode(ids, body)?;
        self.dispatch(command, now, scheduler)
    }

    /// Timer callback for `oid`.
    ///
    /// A pin failure stops the device instead of retrying on a line that
    /// cannot be driven.
    pub fn on_timer(&mut self, oid: u8, now: u32) -> TimerAction {
        let Some(device) = self.device_mut(oid) else {
            return TimerAction::Done;
        };
        match device.event(now) {
            Ok(action) => action,
            Err(err) => {
                log::error!("hx711 oid={} pin error, stopping: {:?}", oid, err);
                device.halt();
                TimerAction::Done
            }
        }
    }

    pub fn device(&self, oid: u8) -> Option<&Hx711<'a, B::Input, B::Output>> {
        self.devices.iter().find(|device| device.oid() == oid)
    }

    pub fn device_mut(&mut self, oid: u8) -> Option<&mut Hx711<'a, B::Input, B::Output>> {
        self.devices.iter_mut().find(|device| device.oid() == oid)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    fn position(&self, oid: u8) -> Option<usize> {
        self.devices.iter().position(|device| device.oid() == oid)
    }
}
