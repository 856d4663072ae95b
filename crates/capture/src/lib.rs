//! Capture file reading and APDU extraction for SICCT traffic
//!
//! Turns a packet capture of card terminal traffic into an ordered list of
//! [`ApduRecord`](sicct_apdu_core::ApduRecord)s:
//!
//! 1. [`CaptureReader`] yields packet records lazily, honoring the byte order
//!    announced by the magic number
//! 2. a [`FramingStrategy`] locates the SICCT payload inside each packet
//! 3. [`ApduExtractor`] validates and decodes the candidate payloads
//!
//! ```no_run
//! use sicct_capture::ApduExtractor;
//!
//! let extraction = ApduExtractor::new().extract_file("session.pcap")?;
//! for record in extraction.known_instructions() {
//!     println!("{record}");
//! }
//! # Ok::<(), sicct_capture::CaptureError>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod extract;
pub mod pcap;
pub mod sicct;

pub use error::{CaptureError, FormatError, Result};
pub use extract::{ApduExtractor, Extraction, ExtractionSummary, Records, extract_file};
pub use pcap::{ByteOrder, CaptureHeader, CapturePacket, CaptureReader};
pub use sicct::{FixedOffsetFraming, FramingStrategy, SicctHeader, sicct_payload};
