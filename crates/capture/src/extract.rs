//! Capture to APDU extraction pipeline

use std::{io::Read, path::Path};

use sicct_apdu_core::{ApduDecoder, ApduRecord, Bytes, Direction};
use tracing::{debug, info};

use crate::error::Result;
use crate::pcap::{CapturePacket, CaptureReader};
use crate::sicct::{FixedOffsetFraming, FramingStrategy};

/// Counters collected while walking a capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Packet records read
    pub packets: usize,
    /// Packets that yielded a candidate payload
    pub candidates: usize,
    /// Candidates accepted as APDUs
    pub apdus: usize,
}

/// Extracts APDU records from capture packets
#[derive(Debug, Clone, Default)]
pub struct ApduExtractor<F = FixedOffsetFraming> {
    framing: F,
    decoder: ApduDecoder,
}

impl ApduExtractor {
    /// Extractor with the default fixed-offset framing
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FramingStrategy> ApduExtractor<F> {
    /// Extractor with a custom framing strategy
    pub fn with_framing(framing: F) -> Self {
        Self {
            framing,
            decoder: ApduDecoder::default(),
        }
    }

    /// Replace the APDU decoder
    pub const fn with_decoder(mut self, decoder: ApduDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Framing strategy in use
    pub const fn framing(&self) -> &F {
        &self.framing
    }

    /// Candidate payload of a single packet, before APDU validation
    pub fn candidate(&self, packet: &CapturePacket) -> Option<Bytes> {
        self.framing.application_payload(packet)
    }

    /// Decode a single packet into an APDU record
    pub fn extract_packet(&self, packet: &CapturePacket) -> Option<ApduRecord> {
        let candidate = self.candidate(packet)?;
        self.decoder.decode(candidate, packet.timestamp, Direction::Packet)
    }

    /// Lazily decode every packet of a capture
    pub fn records<R: Read>(&self, reader: CaptureReader<R>) -> Records<'_, F, R> {
        Records {
            extractor: self,
            reader,
            summary: ExtractionSummary::default(),
        }
    }

    /// Decode a whole capture, in capture order
    pub fn extract<R: Read>(&self, reader: CaptureReader<R>) -> Result<Extraction> {
        let mut records = self.records(reader);
        let collected = records.by_ref().collect::<Result<Vec<_>>>()?;
        let summary = records.summary();

        info!(
            packets = summary.packets,
            candidates = summary.candidates,
            apdus = summary.apdus,
            "Extraction complete"
        );
        Ok(Extraction {
            records: collected,
            summary,
        })
    }

    /// Open a capture file and decode it
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        self.extract(CaptureReader::open(path)?)
    }
}

/// Iterator over the APDU records of a capture
#[derive(Debug)]
pub struct Records<'a, F, R> {
    extractor: &'a ApduExtractor<F>,
    reader: CaptureReader<R>,
    summary: ExtractionSummary,
}

impl<F, R> Records<'_, F, R> {
    /// Counters for the packets consumed so far
    pub const fn summary(&self) -> ExtractionSummary {
        self.summary
    }
}

impl<F: FramingStrategy, R: Read> Iterator for Records<'_, F, R> {
    type Item = Result<ApduRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let packet = match self.reader.next()? {
                Ok(packet) => packet,
                Err(e) => return Some(Err(e)),
            };
            self.summary.packets += 1;

            let Some(candidate) = self.extractor.candidate(&packet) else {
                continue;
            };
            self.summary.candidates += 1;

            match self
                .extractor
                .decoder
                .decode(candidate, packet.timestamp, Direction::Packet)
            {
                Some(record) => {
                    self.summary.apdus += 1;
                    debug!(%record, "APDU extracted");
                    return Some(Ok(record));
                }
                None => continue,
            }
        }
    }
}

/// Result of decoding a whole capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    records: Vec<ApduRecord>,
    summary: ExtractionSummary,
}

impl Extraction {
    /// Decoded records in capture order
    pub fn records(&self) -> &[ApduRecord] {
        &self.records
    }

    /// Take ownership of the decoded records
    pub fn into_records(self) -> Vec<ApduRecord> {
        self.records
    }

    /// Raw bytes of every record
    pub fn raw(&self) -> Vec<Bytes> {
        self.records.iter().map(|r| r.data().clone()).collect()
    }

    /// Records whose instruction is in the instruction table
    pub fn known_instructions(&self) -> impl Iterator<Item = &ApduRecord> {
        self.records
            .iter()
            .filter(|r| r.instruction_name().is_some())
    }

    /// Raw bytes of the records with a known instruction
    pub fn known_raw(&self) -> Vec<Bytes> {
        self.known_instructions().map(|r| r.data().clone()).collect()
    }

    /// Counters collected during extraction
    pub const fn summary(&self) -> ExtractionSummary {
        self.summary
    }

    /// Whether no APDU was found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of decoded records
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Decode every APDU of a capture file with the default pipeline
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    ApduExtractor::new().extract_file(path)
}
