//! Error types for mqwire.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::packet::PacketType;

/// Main error type for mqwire.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Direction of a codec operation.
///
/// The decode and encode tables are intentionally asymmetric: some packet
/// types are only ever received by a broker, others only sent. Requesting
/// the missing direction is reported, not silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Decode => write!(f, "decode"),
            Direction::Encode => write!(f, "encode"),
        }
    }
}

/// MQTT protocol errors.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid packet type: {0}")]
    InvalidPacketType(u8),

    #[error("Invalid remaining length encoding")]
    InvalidRemainingLength,

    #[error("Remaining length {0} does not fit in 4 encoded bytes")]
    RemainingLengthOverflow(usize),

    #[error("Incomplete packet: need {needed} bytes, have {have}")]
    IncompletePacket { needed: usize, have: usize },

    #[error("No {direction} support for {packet_type:?} packets")]
    UnsupportedDirection {
        packet_type: PacketType,
        direction: Direction,
    },

    #[error("Packet too large: {size} bytes, max {max}")]
    PacketTooLarge { size: usize, max: usize },

    #[error("Invalid protocol name: expected 'MQTT', got '{0}'")]
    InvalidProtocolName(String),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(u8),

    #[error("Invalid connect flags: {0:#04x}")]
    InvalidConnectFlags(u8),

    #[error("Invalid UTF-8 string")]
    InvalidUtf8,

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),
}

pub type Result<T> = std::result::Result<T, Error>;
