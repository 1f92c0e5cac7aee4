//! Error types for device lifecycle requests and the message codec.

use core::fmt;

/// Failure of a configure/query request or of a pin operation.
///
/// `E` is the pin error type of the [`PinBank`](crate::PinBank) in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// A GPIO operation failed.
    Pin(E),
    /// Gain code outside 1..=3.
    InvalidGain(u32),
    /// Invert multiplier other than 1 or -1.
    InvalidInvert(i32),
    /// No device was configured with this oid.
    UnknownOid(u8),
    /// Every device slot is taken.
    TableFull,
    /// The request body could not be decoded.
    Decode(DecodeError),
}

impl<E> From<DecodeError> for Error<E> {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(err) => write!(f, "hx711 pin error: {:?}", err),
            Error::InvalidGain(gain) => write!(f, "invalid hx711 gain code {}", gain),
            Error::InvalidInvert(invert) => write!(f, "invalid hx711 invert value {}", invert),
            Error::UnknownOid(oid) => write!(f, "no hx711 configured with oid {}", oid),
            Error::TableFull => write!(f, "no free hx711 slot"),
            Error::Decode(err) => write!(f, "{}", err),
        }
    }
}

/// Failure to parse an inbound message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The body ended in the middle of a field.
    Truncated,
    /// The message id is not one this module handles.
    UnknownMessage(u32),
    /// A field does not fit its declared type.
    OutOfRange {
        field: &'static str,
        value: u32,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated => write!(f, "message truncated"),
            DecodeError::UnknownMessage(id) => write!(f, "unknown message id {}", id),
            DecodeError::OutOfRange { field, value } => {
                write!(f, "field {} out of range: {}", field, value)
            }
        }
    }
}

/// Failure to encode an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The message does not fit in [`MESSAGE_MAX`](crate::protocol::MESSAGE_MAX) bytes.
    Overflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Overflow => write!(f, "message exceeds buffer"),
        }
    }
}
