//! mqwire - MQTT 3.1.1 wire codec.
//!
//! This crate turns raw bytes received from a network peer into typed MQTT
//! packets and typed packets back into their exact wire byte sequence. It
//! implements the fixed header bit layout, the variable-length Remaining
//! Length encoding, and the per-type variable header/payload layouts for
//! all MQTT 3.1.1 control packets.
//!
//! Transport, sessions, QoS retry and topic routing live in the caller;
//! the codec is a pure, synchronous transformation over in-memory buffers.

pub mod error;
pub mod packet;
pub mod varint;

pub use error::{Direction, Error, ProtocolError, Result};
pub use packet::*;
