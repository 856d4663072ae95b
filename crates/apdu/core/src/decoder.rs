//! Structural validation and positional decoding of candidate APDUs
//!
//! The decoder is a filter: payloads that cannot be an APDU are dropped and
//! reported as `None`, never as an error, so a capture with mixed traffic
//! can be walked end to end.

use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::trace;

use crate::command::{CommandHeader, EXTENDED_LENGTH_MARKER, LengthField};
use crate::record::{ApduField, ApduRecord, Direction};
use crate::util::spaced_hex;

/// Shortest payload that can hold a command header
pub const MIN_APDU_LEN: usize = 4;

/// Class/instruction value used as padding, never a real command
pub const RESERVED_BYTE: u8 = 0xFF;

/// Default number of data bytes rendered in the `Data` field
pub const DEFAULT_PREVIEW_LEN: usize = 32;

/// Suffix appended to a truncated data preview
pub const TRUNCATION_MARKER: &str = "...";

/// Decoder turning candidate payloads into [`ApduRecord`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApduDecoder {
    preview_len: usize,
}

impl Default for ApduDecoder {
    fn default() -> Self {
        Self {
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl ApduDecoder {
    /// Create a decoder with the default preview length
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many data bytes the `Data` field renders
    pub const fn with_preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }

    /// Whether a payload looks like a command APDU at all
    pub fn is_valid(payload: &[u8]) -> bool {
        match CommandHeader::from_bytes(payload) {
            Some(header) => header.cla != RESERVED_BYTE && header.ins != RESERVED_BYTE,
            None => false,
        }
    }

    /// Validate and decode a payload.
    ///
    /// Fields are read left to right and each one is optional once the
    /// header has been consumed.
    pub fn decode(
        &self,
        payload: Bytes,
        timestamp: u32,
        direction: Direction,
    ) -> Option<ApduRecord> {
        if !Self::is_valid(&payload) {
            trace!(payload = %hex::encode(&payload), "Dropping invalid APDU candidate");
            return None;
        }
        let header = CommandHeader::from_bytes(&payload)?;

        let mut fields = BTreeMap::new();
        fields.insert(ApduField::Cla, format!("{:02X}", header.cla));
        fields.insert(ApduField::Ins, format!("{:02X}", header.ins));
        fields.insert(ApduField::P1, format!("{:02X}", header.p1));
        fields.insert(ApduField::P2, format!("{:02X}", header.p2));

        let mut offset = MIN_APDU_LEN;
        let mut length = None;
        if let Some(&indicator) = payload.get(offset) {
            offset += 1;
            if indicator == EXTENDED_LENGTH_MARKER {
                // Extended lengths are big-endian whatever the capture byte order
                if let Some(ext) = payload.get(offset..offset + 2) {
                    length = Some(LengthField::Extended(u16::from_be_bytes([ext[0], ext[1]])));
                    offset += 2;
                }
            } else {
                length = Some(LengthField::Short(indicator));
            }
        }
        if let Some(len) = length {
            fields.insert(ApduField::Lc, len.to_string());
        }

        let data_offset = offset;
        let remaining = payload.len().saturating_sub(data_offset);
        let data_truncated = remaining > self.preview_len;
        if remaining > 0 {
            let shown = remaining.min(self.preview_len);
            let mut preview = spaced_hex(&payload[data_offset..data_offset + shown]);
            if data_truncated {
                preview.push_str(TRUNCATION_MARKER);
            }
            fields.insert(ApduField::Data, preview);
        }

        let instruction = header.instruction_name();
        trace!(
            %header,
            lc = ?length.map(|len| len.value()),
            data_len = remaining,
            instruction = instruction.unwrap_or("-"),
            "Decoded APDU"
        );

        Some(ApduRecord {
            data: payload,
            timestamp,
            direction,
            header,
            length,
            data_offset,
            data_truncated,
            fields,
            instruction,
        })
    }
}
