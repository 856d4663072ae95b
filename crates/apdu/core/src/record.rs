//! Decoded APDU records

use std::{collections::BTreeMap, fmt};

use bytes::Bytes;

use crate::command::{CommandHeader, LengthField};
use crate::util::{canonical_hex, spaced_hex};

/// Where an APDU was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Direction {
    /// Host to card
    Command,
    /// Card to host
    Response,
    /// Extracted from a captured packet, direction unknown
    Packet,
}

/// Named positional fields of a decoded APDU, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ApduField {
    /// Class byte
    #[display("CLA")]
    Cla,
    /// Instruction byte
    #[display("INS")]
    Ins,
    /// Parameter 1
    #[display("P1")]
    P1,
    /// Parameter 2
    #[display("P2")]
    P2,
    /// Length indicator
    #[display("Lc")]
    Lc,
    /// Data preview
    #[display("Data")]
    Data,
}

/// A structurally valid APDU recovered from a capture.
///
/// Records are produced by [`crate::ApduDecoder`] and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduRecord {
    pub(crate) data: Bytes,
    pub(crate) timestamp: u32,
    pub(crate) direction: Direction,
    pub(crate) header: CommandHeader,
    pub(crate) length: Option<LengthField>,
    pub(crate) data_offset: usize,
    pub(crate) data_truncated: bool,
    pub(crate) fields: BTreeMap<ApduField, String>,
    pub(crate) instruction: Option<&'static str>,
}

impl ApduRecord {
    /// Raw APDU bytes, never truncated
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Capture timestamp (seconds)
    pub const fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Direction tag
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Header bytes
    pub const fn header(&self) -> CommandHeader {
        self.header
    }

    /// Length indicator, if one was present
    pub const fn length(&self) -> Option<LengthField> {
        self.length
    }

    /// Numeric Lc value, if one was present
    pub fn lc(&self) -> Option<usize> {
        self.length.map(|len| len.value())
    }

    /// Every byte after the length indicator
    pub fn data_region(&self) -> &[u8] {
        &self.data[self.data_offset.min(self.data.len())..]
    }

    /// Whether the `Data` field preview was cut short
    pub const fn is_data_truncated(&self) -> bool {
        self.data_truncated
    }

    /// Decoded field renderings in wire order
    pub const fn fields(&self) -> &BTreeMap<ApduField, String> {
        &self.fields
    }

    /// Rendering of a single field
    pub fn field(&self, field: ApduField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Instruction mnemonic, if the instruction byte is in the table
    pub const fn instruction_name(&self) -> Option<&'static str> {
        self.instruction
    }

    /// Canonical upper-case hex of the full APDU
    pub fn to_hex(&self) -> String {
        canonical_hex(&self.data)
    }

    /// Space separated hex dump of the full APDU
    pub fn hex_dump(&self) -> String {
        spaced_hex(&self.data)
    }
}

impl fmt::Display for ApduRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] t={} APDU: {}", self.direction, self.timestamp, self.header)?;
        if let Some(lc) = self.field(ApduField::Lc) {
            write!(f, " Lc={lc}")?;
        }
        Ok(())
    }
}
