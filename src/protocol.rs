//! Host messages: field extraction for inbound commands and packing for the
//! outbound state report. Framing is left to the transport.

use heapless::Vec;

use crate::encoding::{encode_int, parse_int};
use crate::error::{DecodeError, EncodeError};
use crate::hx711::interrupt::Report;

/// Largest message body.
pub const MESSAGE_MAX: usize = 64;

pub const CONFIG_HX711_FORMAT: &str =
    "config_hx711 oid=%c dout_pin=%u sck_pin=%u gain=%u invert=%i";
pub const QUERY_HX711_FORMAT: &str = "query_hx711 oid=%c enable=%u endstop_oid=%i";
pub const HX711_IN_STATE_FORMAT: &str = "hx711_in_state oid=%c clock=%u value=%i";

/// Message ids as published in the firmware's data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    pub config_hx711: u32,
    pub query_hx711: u32,
    pub hx711_in_state: u32,
}

impl Default for MessageIds {
    fn default() -> Self {
        Self {
            config_hx711: 70,
            query_hx711: 71,
            hx711_in_state: 72,
        }
    }
}

/// `config_hx711`. Gain and invert are kept raw here and checked on configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigHx711 {
    pub oid: u8,
    pub dout_pin: u32,
    pub sck_pin: u32,
    pub gain: u32,
    pub invert: i32,
}

/// `query_hx711`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryHx711 {
    pub oid: u8,
    pub enable: bool,
    pub endstop_oid: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Config(ConfigHx711),
    Query(QueryHx711),
}

impl Command {
    pub fn decode(ids: &MessageIds, body: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = body;
        let id = parse_int(&mut buf)?;
        if id == ids.config_hx711 {
            Ok(Command::Config(ConfigHx711 {
                oid: parse_byte(&mut buf, "oid")?,
                dout_pin: parse_int(&mut buf)?,
                sck_pin: parse_int(&mut buf)?,
                gain: parse_int(&mut buf)?,
                invert: parse_int(&mut buf)? as i32,
            }))
        } else if id == ids.query_hx711 {
            let oid = parse_byte(&mut buf, "oid")?;
            let enable = parse_int(&mut buf)? != 0;
            let endstop = parse_int(&mut buf)? as i32;
            let endstop_oid = match endstop {
                e if e < 0 => None,
                e => Some(u8::try_from(e).map_err(|_| DecodeError::OutOfRange {
                    field: "endstop_oid",
                    value: e as u32,
                })?),
            };
            Ok(Command::Query(QueryHx711 {
                oid,
                enable,
                endstop_oid,
            }))
        } else {
            Err(DecodeError::UnknownMessage(id))
        }
    }
}

fn parse_byte(buf: &mut &[u8], field: &'static str) -> Result<u8, DecodeError> {
    let value = parse_int(buf)?;
    u8::try_from(value).map_err(|_| DecodeError::OutOfRange { field, value })
}

/// `hx711_in_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateReport {
    pub oid: u8,
    pub clock: u32,
    pub value: i32,
}

impl From<Report> for StateReport {
    fn from(report: Report) -> Self {
        Self {
            oid: report.oid,
            clock: report.clock,
            value: report.value,
        }
    }
}

impl StateReport {
    pub fn encode(&self, ids: &MessageIds) -> Result<Vec<u8, MESSAGE_MAX>, EncodeError> {
        let mut out = Vec::new();
        encode_int(&mut out, ids.hx711_in_state)?;
        encode_int(&mut out, u32::from(self.oid))?;
        encode_int(&mut out, self.clock)?;
        encode_int(&mut out, self.value as u32)?;
        Ok(out)
    }

    /// Host-side counterpart of [`encode`](Self::encode).
    pub fn decode(ids: &MessageIds, body: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = body;
        let id = parse_int(&mut buf)?;
        if id != ids.hx711_in_state {
            return Err(DecodeError::UnknownMessage(id));
        }
        Ok(Self {
            oid: parse_byte(&mut buf, "oid")?,
            clock: parse_int(&mut buf)?,
            value: parse_int(&mut buf)? as i32,
        })
    }
}
