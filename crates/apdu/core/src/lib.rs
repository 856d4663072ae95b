//! Core types for APDUs recovered from SICCT traffic
//!
//! This crate turns raw candidate payloads into structured APDU records
//! according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! - [`ApduDecoder`] validates a candidate payload and decodes its header,
//!   length indicator and data preview
//! - [`instruction_name`] resolves instruction mnemonics from a fixed table
//! - [`StatusWord`] models the SW1-SW2 codes a scenario step expects
//!
//! Decoding is a filter rather than a parser that reports faults: payloads
//! that are not structurally valid produce no record.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::Bytes;

pub mod command;
pub mod decoder;
pub mod error;
pub mod instruction;
pub mod record;
pub mod status;
pub mod util;

pub use command::{ClassKind, CommandHeader, LengthField};
pub use decoder::ApduDecoder;
pub use error::{Error, Result};
pub use instruction::instruction_name;
pub use record::{ApduField, ApduRecord, Direction};
pub use status::StatusWord;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        ApduDecoder, ApduField, ApduRecord, Bytes, ClassKind, CommandHeader, Direction, Error,
        LengthField, StatusWord, instruction_name,
    };
    pub use crate::status::common as status;
    pub use crate::util::{canonical_hex, decode_hex, spaced_hex};
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test the basic types are re-exported correctly
    #[test]
    fn test_reexports() {
        let record = ApduDecoder::new()
            .decode(
                Bytes::from_static(&[0x00, 0xA4, 0x04, 0x0C]),
                0,
                Direction::Packet,
            )
            .unwrap();
        let header = record.header();
        assert_eq!(header.cla, 0x00);
        assert_eq!(header.ins, 0xA4);
        assert_eq!(header.p1, 0x04);
        assert_eq!(header.p2, 0x0C);
        assert_eq!(header.class_kind(), ClassKind::Iso);
        assert_eq!(record.instruction_name(), instruction_name(0x00, 0xA4));
        assert!(StatusWord::new(0x90, 0x00).is_success());
    }
}
