//! MQTT packet types and codec for MQTT 3.1.1.
//!
//! [`decode_packet`] turns raw bytes into a [`Packet`]; [`encode_packet`]
//! and [`encode_to_vec`] turn a [`Packet`] back into its exact wire form.
//! The two directions are asymmetric on purpose: this codec decodes what a
//! broker receives and encodes what a broker sends. Requesting the missing
//! direction yields a typed error instead of an empty result.

use std::io::Write;

use bytes::Bytes;
use log::trace;

use crate::error::{Direction, ProtocolError, Result};
use crate::varint;

/// Fixed header byte plus a single-byte Remaining Length.
pub const HEADER_LEN: usize = 2;

/// On-wire size of the fixed-length acknowledgement packets.
pub const ACK_LEN: usize = 4;

/// First-byte stubs for generic replies: the fixed header byte of each
/// server-emitted type with all flag bits clear.
pub mod first_byte {
    pub const CONNACK: u8 = 0x20;
    pub const PUBLISH: u8 = 0x30;
    pub const PUBACK: u8 = 0x40;
    pub const PUBREC: u8 = 0x50;
    pub const PUBREL: u8 = 0x60;
    pub const PUBCOMP: u8 = 0x70;
    pub const SUBACK: u8 = 0x90;
    pub const UNSUBACK: u8 = 0xB0;
    pub const PINGRESP: u8 = 0xD0;
}

/// MQTT Control Packet Types (4 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl TryFrom<u8> for PacketType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::Connack),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::Puback),
            5 => Ok(PacketType::Pubrec),
            6 => Ok(PacketType::Pubrel),
            7 => Ok(PacketType::Pubcomp),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::Suback),
            10 => Ok(PacketType::Unsubscribe),
            11 => Ok(PacketType::Unsuback),
            12 => Ok(PacketType::Pingreq),
            13 => Ok(PacketType::Pingresp),
            14 => Ok(PacketType::Disconnect),
            _ => Err(ProtocolError::InvalidPacketType(value)),
        }
    }
}

/// Quality of Service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
#[allow(clippy::enum_variant_names)] // MQTT spec names
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = ProtocolError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(ProtocolError::MalformedPacket(format!(
                "Invalid QoS: {}",
                value
            ))),
        }
    }
}

/// CONNACK return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnackCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUsernamePassword = 4,
    NotAuthorized = 5,
}

/// MQTT Packets.
///
/// A single discriminated sum: the packet type is the enum tag itself, so
/// a value can never disagree with its declared type. The four-byte ack
/// shape is shared on the wire by five types; each gets its own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(Connect),
    Connack(Connack),
    Publish(Publish),
    Puback { packet_id: u16 },
    Pubrec { packet_id: u16 },
    Pubrel { packet_id: u16 },
    Pubcomp { packet_id: u16 },
    Subscribe(Subscribe),
    Suback(Suback),
    Unsubscribe(Unsubscribe),
    Unsuback { packet_id: u16 },
    Pingreq,
    Pingresp,
    Disconnect,
}

impl Packet {
    /// The wire type code of the active variant.
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::Connack(_) => PacketType::Connack,
            Packet::Publish(_) => PacketType::Publish,
            Packet::Puback { .. } => PacketType::Puback,
            Packet::Pubrec { .. } => PacketType::Pubrec,
            Packet::Pubrel { .. } => PacketType::Pubrel,
            Packet::Pubcomp { .. } => PacketType::Pubcomp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::Suback(_) => PacketType::Suback,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::Unsuback { .. } => PacketType::Unsuback,
            Packet::Pingreq => PacketType::Pingreq,
            Packet::Pingresp => PacketType::Pingresp,
            Packet::Disconnect => PacketType::Disconnect,
        }
    }

    pub fn puback(packet_id: u16) -> Self {
        Packet::Puback { packet_id }
    }

    pub fn pubrec(packet_id: u16) -> Self {
        Packet::Pubrec { packet_id }
    }

    pub fn pubrel(packet_id: u16) -> Self {
        Packet::Pubrel { packet_id }
    }

    pub fn pubcomp(packet_id: u16) -> Self {
        Packet::Pubcomp { packet_id }
    }

    pub fn unsuback(packet_id: u16) -> Self {
        Packet::Unsuback { packet_id }
    }

    /// Encode the packet and write it to `writer` in one call.
    ///
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let bytes = encode_to_vec(self)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

/// CONNECT packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub protocol_name: String,
    pub protocol_version: u8,
    pub clean_session: bool,
    pub keep_alive: u16,
    pub client_id: String,
    pub will: Option<Will>,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
}

/// Will message configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Will {
    pub topic: String,
    pub message: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// CONNACK packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connack {
    pub session_present: bool,
    pub code: ConnackCode,
}

impl Connack {
    pub fn new(session_present: bool, code: ConnackCode) -> Self {
        Self {
            session_present,
            code,
        }
    }
}

/// PUBLISH packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic: Bytes,
    pub packet_id: Option<u16>,
    pub payload: Bytes,
}

impl Publish {
    /// Outbound publish. `packet_id` is required for QoS 1 and 2 and
    /// ignored by the encoder for QoS 0.
    pub fn new(
        qos: QoS,
        retain: bool,
        topic: Bytes,
        packet_id: Option<u16>,
        payload: Bytes,
    ) -> Self {
        Self {
            dup: false,
            qos,
            retain,
            topic,
            packet_id,
            payload,
        }
    }
}

/// SUBSCRIBE packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    pub packet_id: u16,
    /// Topic filters with their requested QoS, in wire order. Order is
    /// load-bearing: SUBACK return codes align positionally with it.
    pub topics: Vec<(String, QoS)>,
}

/// SUBACK packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suback {
    pub packet_id: u16,
    pub return_codes: Vec<u8>,
}

impl Suback {
    pub fn new(packet_id: u16, return_codes: Vec<u8>) -> Self {
        Self {
            packet_id,
            return_codes,
        }
    }
}

/// UNSUBSCRIBE packet data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribe {
    pub packet_id: u16,
    pub topics: Vec<String>,
}

/// Byte cursor over a borrowed buffer.
///
/// Every read checks the slice boundary first; reads past it report
/// `IncompletePacket` instead of touching out-of-range memory. Multi-byte
/// integers are network byte order.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left before the boundary.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.buf.len() {
            return Err(ProtocolError::IncompletePacket { needed: 1, have: 0 }.into());
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        if self.remaining() < 2 {
            return Err(ProtocolError::IncompletePacket {
                needed: 2,
                have: self.remaining(),
            }
            .into());
        }
        let val = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(val)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        if self.remaining() < 4 {
            return Err(ProtocolError::IncompletePacket {
                needed: 4,
                have: self.remaining(),
            }
            .into());
        }
        let val = u32::from_be_bytes([
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(val)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtocolError::IncompletePacket {
                needed: len,
                have: self.remaining(),
            }
            .into());
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a 2-byte length prefix, then that many bytes as UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        // MQTT-1.5.3-2: UTF-8 string MUST NOT contain null character U+0000
        if bytes.contains(&0u8) {
            return Err(ProtocolError::MalformedPacket(
                "UTF-8 string must not contain null character".into(),
            )
            .into());
        }
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8.into())
    }

    /// Read a 2-byte length prefix, then that many raw bytes. Zero bytes
    /// in the data are legal; nothing here is NUL-terminated.
    pub fn read_binary(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(bytes.to_vec())
    }
}

/// Try to decode a complete packet from the buffer.
///
/// Returns `Ok(Some((packet, bytes_consumed)))` if successful, `Ok(None)`
/// if the buffer does not yet hold a whole packet, or `Err` on protocol
/// errors. `bytes_consumed` covers the full wire packet including the
/// fixed header; the caller advances its read buffer by that amount.
/// `max_packet_size` bounds the total on-wire size (0 = no limit).
pub fn decode_packet(buf: &[u8], max_packet_size: usize) -> Result<Option<(Packet, usize)>> {
    if buf.is_empty() {
        return Ok(None);
    }

    let fixed_header = buf[0];
    let packet_type_raw = fixed_header >> 4;
    let flags = fixed_header & 0x0F;

    // Decode remaining length
    let Some((remaining_len, len_bytes)) = varint::decode(&buf[1..])? else {
        return Ok(None);
    };

    let header_len = 1 + len_bytes;
    let total_len = header_len + remaining_len;

    if max_packet_size > 0 && total_len > max_packet_size {
        return Err(ProtocolError::PacketTooLarge {
            size: total_len,
            max: max_packet_size,
        }
        .into());
    }

    if buf.len() < total_len {
        return Ok(None);
    }

    let packet_type = PacketType::try_from(packet_type_raw)?;
    let body = &buf[header_len..total_len];

    // Validate fixed header flags for specific packet types
    // MQTT-3.8.1-1: SUBSCRIBE fixed header flags MUST be 0010
    // MQTT-3.10.1-1: UNSUBSCRIBE fixed header flags MUST be 0010
    // MQTT-3.6.1-1: PUBREL fixed header flags MUST be 0010
    match packet_type {
        PacketType::Subscribe | PacketType::Unsubscribe | PacketType::Pubrel => {
            if flags != 0x02 {
                return Err(ProtocolError::MalformedPacket(format!(
                    "{:?} fixed header flags must be 0x02, got {:#04x}",
                    packet_type, flags
                ))
                .into());
            }
        }
        _ => {}
    }

    let packet = match packet_type {
        PacketType::Connect => decode_connect(body)?,
        PacketType::Publish => decode_publish(flags, body)?,
        PacketType::Puback => Packet::Puback {
            packet_id: decode_packet_id(body)?,
        },
        PacketType::Pubrec => Packet::Pubrec {
            packet_id: decode_packet_id(body)?,
        },
        PacketType::Pubrel => Packet::Pubrel {
            packet_id: decode_packet_id(body)?,
        },
        PacketType::Pubcomp => Packet::Pubcomp {
            packet_id: decode_packet_id(body)?,
        },
        PacketType::Subscribe => decode_subscribe(body)?,
        PacketType::Unsubscribe => decode_unsubscribe(body)?,
        PacketType::Unsuback => Packet::Unsuback {
            packet_id: decode_packet_id(body)?,
        },
        PacketType::Pingreq => Packet::Pingreq,
        PacketType::Pingresp => Packet::Pingresp,
        PacketType::Disconnect => Packet::Disconnect,
        PacketType::Connack | PacketType::Suback => {
            return Err(ProtocolError::UnsupportedDirection {
                packet_type,
                direction: Direction::Decode,
            }
            .into())
        }
    };

    trace!("decoded {:?} ({} bytes)", packet.packet_type(), total_len);
    Ok(Some((packet, total_len)))
}

fn decode_connect(body: &[u8]) -> Result<Packet> {
    let mut dec = Decoder::new(body);

    // Protocol name
    let protocol_name = dec.read_string()?;
    if protocol_name != "MQTT" && protocol_name != "MQIsdp" {
        return Err(ProtocolError::InvalidProtocolName(protocol_name).into());
    }

    // Protocol version
    let protocol_version = dec.read_u8()?;
    if protocol_version != 4 && protocol_version != 3 {
        // 4 = MQTT 3.1.1, 3 = MQTT 3.1
        return Err(ProtocolError::UnsupportedProtocolVersion(protocol_version).into());
    }

    // Connect flags
    let flags = dec.read_u8()?;
    let clean_session = (flags & 0x02) != 0;
    let will_flag = (flags & 0x04) != 0;
    let will_qos = QoS::try_from((flags >> 3) & 0x03)?;
    let will_retain = (flags & 0x20) != 0;
    let password_flag = (flags & 0x40) != 0;
    let username_flag = (flags & 0x80) != 0;

    // Reserved bit must be 0
    if (flags & 0x01) != 0 {
        return Err(ProtocolError::InvalidConnectFlags(flags).into());
    }

    // MQTT-3.1.2-11/13: If Will Flag is 0, Will QoS MUST be 0
    if !will_flag && will_qos != QoS::AtMostOnce {
        return Err(ProtocolError::MalformedPacket(
            "Will QoS must be 0 when Will Flag is 0".into(),
        )
        .into());
    }

    // MQTT-3.1.2-15: If Will Flag is 0, Will Retain MUST be 0
    if !will_flag && will_retain {
        return Err(ProtocolError::MalformedPacket(
            "Will Retain must be 0 when Will Flag is 0".into(),
        )
        .into());
    }

    // MQTT-3.1.2-22: If Username Flag is 0, Password Flag MUST be 0
    if !username_flag && password_flag {
        return Err(ProtocolError::MalformedPacket(
            "Password Flag must be 0 when Username Flag is 0".into(),
        )
        .into());
    }

    // Keep alive
    let keep_alive = dec.read_u16()?;

    // Client ID (always present, may be empty)
    let client_id = dec.read_string()?;

    // Will
    let will = if will_flag {
        let topic = dec.read_string()?;
        let message = dec.read_binary()?;
        Some(Will {
            topic,
            message,
            qos: will_qos,
            retain: will_retain,
        })
    } else {
        None
    };

    // Username
    let username = if username_flag {
        Some(dec.read_string()?)
    } else {
        None
    };

    // Password
    let password = if password_flag {
        Some(dec.read_binary()?)
    } else {
        None
    };

    Ok(Packet::Connect(Connect {
        protocol_name,
        protocol_version,
        clean_session,
        keep_alive,
        client_id,
        will,
        username,
        password,
    }))
}

fn decode_publish(flags: u8, body: &[u8]) -> Result<Packet> {
    let dup = (flags & 0x08) != 0;
    let qos = QoS::try_from((flags >> 1) & 0x03)?;
    let retain = (flags & 0x01) != 0;

    let mut dec = Decoder::new(body);

    let topic = dec.read_string()?;

    let packet_id = if qos != QoS::AtMostOnce {
        Some(dec.read_u16()?)
    } else {
        None
    };

    // Whatever is left of the declared remaining length is the payload:
    // remaining - 2 - topic_len - (2 if QoS > 0). May contain zero bytes.
    let payload = dec.read_bytes(dec.remaining())?;

    Ok(Packet::Publish(Publish {
        dup,
        qos,
        retain,
        topic: Bytes::copy_from_slice(topic.as_bytes()),
        packet_id,
        payload: Bytes::copy_from_slice(payload),
    }))
}

// The ack family shares a single wire shape: remaining length 2, packet id.
fn decode_packet_id(body: &[u8]) -> Result<u16> {
    let mut dec = Decoder::new(body);
    dec.read_u16()
}

fn decode_subscribe(body: &[u8]) -> Result<Packet> {
    let mut dec = Decoder::new(body);
    let packet_id = dec.read_u16()?;

    let mut topics = Vec::new();
    while dec.remaining() > 0 {
        let topic = dec.read_string()?;

        // MQTT-4.7.0-1: Topic Filter must be at least 1 character
        if topic.is_empty() {
            return Err(
                ProtocolError::MalformedPacket("Topic filter must be at least 1 character".into())
                    .into(),
            );
        }

        let qos = QoS::try_from(dec.read_u8()? & 0x03)?;
        topics.push((topic, qos));
    }

    if topics.is_empty() {
        return Err(ProtocolError::MalformedPacket("SUBSCRIBE with no topics".into()).into());
    }

    Ok(Packet::Subscribe(Subscribe { packet_id, topics }))
}

fn decode_unsubscribe(body: &[u8]) -> Result<Packet> {
    let mut dec = Decoder::new(body);
    let packet_id = dec.read_u16()?;

    let mut topics = Vec::new();
    while dec.remaining() > 0 {
        let topic = dec.read_string()?;

        // MQTT-4.7.0-1: Topic Filter must be at least 1 character
        if topic.is_empty() {
            return Err(
                ProtocolError::MalformedPacket("Topic filter must be at least 1 character".into())
                    .into(),
            );
        }

        topics.push(topic);
    }

    if topics.is_empty() {
        return Err(ProtocolError::MalformedPacket("UNSUBSCRIBE with no topics".into()).into());
    }

    Ok(Packet::Unsubscribe(Unsubscribe { packet_id, topics }))
}

/// On-wire size of the encoded packet, fixed header included.
///
/// Fails for packet types this codec does not encode.
pub fn encoded_size(packet: &Packet) -> Result<usize> {
    let size = match packet {
        Packet::Connack(_)
        | Packet::Puback { .. }
        | Packet::Pubrec { .. }
        | Packet::Pubrel { .. }
        | Packet::Pubcomp { .. }
        | Packet::Unsuback { .. } => ACK_LEN,
        Packet::Pingreq | Packet::Pingresp => HEADER_LEN,
        Packet::Suback(suback) => {
            let remaining = 2 + suback.return_codes.len();
            1 + varint::encoded_len(remaining) + remaining
        }
        Packet::Publish(publish) => {
            let packet_id_len = if publish.qos != QoS::AtMostOnce { 2 } else { 0 };
            let remaining = 2 + publish.topic.len() + packet_id_len + publish.payload.len();
            1 + varint::encoded_len(remaining) + remaining
        }
        Packet::Connect(_) | Packet::Subscribe(_) | Packet::Unsubscribe(_) | Packet::Disconnect => {
            return Err(ProtocolError::UnsupportedDirection {
                packet_type: packet.packet_type(),
                direction: Direction::Encode,
            }
            .into())
        }
    };
    Ok(size)
}

/// Encode a packet into the provided buffer.
///
/// Returns the number of bytes written. Packet types this codec does not
/// encode (the client-to-server direction) fail with
/// `UnsupportedDirection` and leave the buffer untouched.
pub fn encode_packet(packet: &Packet, buf: &mut Vec<u8>) -> Result<usize> {
    let start = buf.len();

    match packet {
        Packet::Connack(connack) => encode_connack(connack, buf),
        Packet::Publish(publish) => encode_publish(publish, buf)?,
        Packet::Puback { packet_id } => encode_simple_ack(PacketType::Puback, *packet_id, buf),
        Packet::Pubrec { packet_id } => encode_simple_ack(PacketType::Pubrec, *packet_id, buf),
        Packet::Pubrel { packet_id } => encode_pubrel(*packet_id, buf),
        Packet::Pubcomp { packet_id } => encode_simple_ack(PacketType::Pubcomp, *packet_id, buf),
        Packet::Suback(suback) => encode_suback(suback, buf)?,
        Packet::Unsuback { packet_id } => encode_simple_ack(PacketType::Unsuback, *packet_id, buf),
        Packet::Pingreq => encode_ping(PacketType::Pingreq, buf),
        Packet::Pingresp => encode_ping(PacketType::Pingresp, buf),
        Packet::Connect(_) | Packet::Subscribe(_) | Packet::Unsubscribe(_) | Packet::Disconnect => {
            return Err(ProtocolError::UnsupportedDirection {
                packet_type: packet.packet_type(),
                direction: Direction::Encode,
            }
            .into())
        }
    }

    let written = buf.len() - start;
    trace!("encoded {:?} ({} bytes)", packet.packet_type(), written);
    Ok(written)
}

/// Encode a packet into a freshly allocated buffer sized exactly to the
/// wire form.
pub fn encode_to_vec(packet: &Packet) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_size(packet)?);
    encode_packet(packet, &mut buf)?;
    Ok(buf)
}

fn encode_connack(connack: &Connack, buf: &mut Vec<u8>) {
    buf.push(first_byte::CONNACK);
    buf.push(2); // Remaining length
    buf.push(if connack.session_present { 1 } else { 0 });
    buf.push(connack.code as u8);
}

fn encode_publish(publish: &Publish, buf: &mut Vec<u8>) -> Result<()> {
    let mut fixed_header = (PacketType::Publish as u8) << 4;
    if publish.dup {
        fixed_header |= 0x08;
    }
    fixed_header |= (publish.qos as u8) << 1;
    if publish.retain {
        fixed_header |= 0x01;
    }

    // The packet id is on the wire if and only if QoS > 0
    let packet_id = match (publish.qos, publish.packet_id) {
        (QoS::AtMostOnce, _) => None,
        (_, Some(id)) => Some(id),
        (_, None) => {
            return Err(ProtocolError::MalformedPacket(
                "PUBLISH with QoS > 0 requires a packet id".into(),
            )
            .into())
        }
    };

    // The remaining length must be known (and known to fit in 4 encoded
    // bytes) before anything is written.
    let topic_len = 2 + publish.topic.len();
    let packet_id_len = if packet_id.is_some() { 2 } else { 0 };
    let remaining = topic_len + packet_id_len + publish.payload.len();

    let mut len_buf = [0u8; 4];
    let len_bytes = varint::encode_to_slice(remaining, &mut len_buf)?;

    buf.push(fixed_header);
    buf.extend_from_slice(&len_buf[..len_bytes]);

    // Topic
    buf.extend_from_slice(&(publish.topic.len() as u16).to_be_bytes());
    buf.extend_from_slice(&publish.topic);

    if let Some(id) = packet_id {
        buf.extend_from_slice(&id.to_be_bytes());
    }

    // Payload
    buf.extend_from_slice(&publish.payload);
    Ok(())
}

fn encode_simple_ack(packet_type: PacketType, packet_id: u16, buf: &mut Vec<u8>) {
    buf.push((packet_type as u8) << 4);
    buf.push(2); // Remaining length
    buf.extend_from_slice(&packet_id.to_be_bytes());
}

fn encode_pubrel(packet_id: u16, buf: &mut Vec<u8>) {
    // PUBREL has fixed header flags of 0x02
    buf.push(first_byte::PUBREL | 0x02);
    buf.push(2); // Remaining length
    buf.extend_from_slice(&packet_id.to_be_bytes());
}

fn encode_suback(suback: &Suback, buf: &mut Vec<u8>) -> Result<()> {
    let remaining = 2 + suback.return_codes.len();
    let mut len_buf = [0u8; 4];
    let len_bytes = varint::encode_to_slice(remaining, &mut len_buf)?;

    buf.push(first_byte::SUBACK);
    buf.extend_from_slice(&len_buf[..len_bytes]);
    buf.extend_from_slice(&suback.packet_id.to_be_bytes());
    buf.extend_from_slice(&suback.return_codes);
    Ok(())
}

fn encode_ping(packet_type: PacketType, buf: &mut Vec<u8>) {
    buf.push((packet_type as u8) << 4);
    buf.push(0); // Remaining length
}
