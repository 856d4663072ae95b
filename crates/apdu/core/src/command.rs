//! APDU command header definitions
//!
//! This module provides the positional pieces of an ISO/IEC 7816-4 command
//! as they are recovered from captured traffic: the four header bytes and
//! the length indicator that follows them.

use std::fmt;

use crate::instruction::instruction_name;

/// Length indicator marking an extended (two byte) length
pub const EXTENDED_LENGTH_MARKER: u8 = 0xFF;

/// The four mandatory header bytes of a command APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandHeader {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
}

impl CommandHeader {
    /// Create a header from its four bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self { cla, ins, p1, p2 }
    }

    /// Read the header from the start of a payload, if it is long enough
    pub const fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [cla, ins, p1, p2, ..] => Some(Self::new(*cla, *ins, *p1, *p2)),
            _ => None,
        }
    }

    /// Classification of the class byte
    pub const fn class_kind(&self) -> ClassKind {
        ClassKind::from_cla(self.cla)
    }

    /// Mnemonic of the instruction, if known
    pub const fn instruction_name(&self) -> Option<&'static str> {
        instruction_name(self.cla, self.ins)
    }
}

impl fmt::Display for CommandHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CLA={:02X} INS={:02X} P1={:02X} P2={:02X}",
            self.cla, self.ins, self.p1, self.p2
        )
    }
}

/// Coarse classification of a class byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ClassKind {
    /// Bit 8 clear: inter-industry class
    #[display("ISO standard")]
    Iso,
    /// Bit 8 set, bit 7 clear: proprietary class
    #[display("proprietary")]
    Proprietary,
    /// Bits 8 and 7 set
    #[display("reserved")]
    Reserved,
}

impl ClassKind {
    /// Classify a class byte
    pub const fn from_cla(cla: u8) -> Self {
        if cla & 0x80 == 0 {
            Self::Iso
        } else if cla & 0x40 == 0 {
            Self::Proprietary
        } else {
            Self::Reserved
        }
    }
}

/// Length indicator following the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// Single byte length
    Short(u8),
    /// Two byte big-endian length introduced by [`EXTENDED_LENGTH_MARKER`]
    Extended(u16),
}

impl LengthField {
    /// Numeric length
    pub const fn value(&self) -> usize {
        match self {
            Self::Short(len) => *len as usize,
            Self::Extended(len) => *len as usize,
        }
    }

    /// Whether the extended form was used
    pub const fn is_extended(&self) -> bool {
        matches!(self, Self::Extended(_))
    }

    /// Number of bytes the indicator occupies in the APDU
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Short(_) => 1,
            Self::Extended(_) => 3,
        }
    }
}

impl fmt::Display for LengthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(len) => write!(f, "{len} (0x{len:02X})"),
            Self::Extended(len) => write!(f, "{len} (0x{len:04X})"),
        }
    }
}
