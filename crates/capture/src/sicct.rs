//! SICCT framing extraction
//!
//! A captured packet is assumed to start with a fixed-size block of link,
//! network and transport headers, followed by a SICCT PDU:
//!
//! ```text
//! Byte 0      message type
//! Byte 1-2    source/destination address (LE)
//! Byte 3-4    sequence number (LE)
//! Byte 5      reserved
//! Byte 6-9    payload length (LE)
//! Byte 10..   payload (APDU)
//! ```
//!
//! The fixed lower-layer size is a heuristic for one known capture topology,
//! which is why it sits behind [`FramingStrategy`].

use std::fmt;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::pcap::CapturePacket;

/// Ethernet (14) + IPv4 (20) + TCP (20) header bytes
pub const LOWER_LAYER_HEADER_LEN: usize = 54;

/// Size of the SICCT PDU header
pub const SICCT_HEADER_LEN: usize = 10;

/// Declared payload lengths at or above this are not trusted
pub const MAX_DECLARED_LENGTH: u32 = 10_000;

/// Strategy locating the application payload inside a captured packet
pub trait FramingStrategy: fmt::Debug {
    /// Return the candidate APDU bytes, or `None` if the packet cannot carry one
    fn application_payload(&self, packet: &CapturePacket) -> Option<Bytes>;
}

/// SICCT PDU header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SicctHeader {
    /// Message type
    pub message_type: u8,
    /// Source/destination address
    pub src_cor_des_addr: u16,
    /// Sequence number
    pub sequence: u16,
    /// Reserved byte
    pub rfu: u8,
    /// Declared payload length
    pub length: u32,
}

impl SicctHeader {
    /// Parse the header from the start of a PDU
    pub fn parse(pdu: &[u8]) -> Option<Self> {
        let mut buf = pdu.get(..SICCT_HEADER_LEN)?;
        Some(Self {
            message_type: buf.get_u8(),
            src_cor_des_addr: buf.get_u16_le(),
            sequence: buf.get_u16_le(),
            rfu: buf.get_u8(),
            length: buf.get_u32_le(),
        })
    }

    /// Whether the declared length can be taken at face value for a body
    /// of `available` bytes
    pub const fn declared_length_fits(&self, available: usize) -> bool {
        self.length > 0
            && self.length < MAX_DECLARED_LENGTH
            && self.length as usize <= available
    }
}

/// Extract the application payload of a SICCT PDU.
///
/// A plausible declared length selects exactly that many bytes; anything
/// else falls back to every byte after the header.
pub fn sicct_payload(pdu: Bytes) -> Option<Bytes> {
    if pdu.len() <= SICCT_HEADER_LEN {
        return None;
    }
    let header = SicctHeader::parse(&pdu)?;
    let body = pdu.slice(SICCT_HEADER_LEN..);

    if header.declared_length_fits(body.len()) {
        Some(body.slice(..header.length as usize))
    } else {
        trace!(
            declared = header.length,
            available = body.len(),
            "Implausible SICCT length, using remaining bytes"
        );
        Some(body)
    }
}

/// Framing that skips a fixed number of lower-layer header bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOffsetFraming {
    lower_layer_len: usize,
}

impl Default for FixedOffsetFraming {
    fn default() -> Self {
        Self {
            lower_layer_len: LOWER_LAYER_HEADER_LEN,
        }
    }
}

impl FixedOffsetFraming {
    /// Create the default 54-byte framing
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different lower-layer header size
    pub const fn with_lower_layer_len(mut self, lower_layer_len: usize) -> Self {
        self.lower_layer_len = lower_layer_len;
        self
    }

    /// Lower-layer header size skipped before the SICCT PDU
    pub const fn lower_layer_len(&self) -> usize {
        self.lower_layer_len
    }
}

impl FramingStrategy for FixedOffsetFraming {
    fn application_payload(&self, packet: &CapturePacket) -> Option<Bytes> {
        if packet.data.len() <= self.lower_layer_len {
            return None;
        }
        sicct_payload(packet.data.slice(self.lower_layer_len..))
    }
}
