//! End-to-end extraction over in-memory captures

use std::io::Cursor;

use hex_literal::hex;
use sicct_apdu_core::ApduField;
use sicct_capture::{
    ApduExtractor, ByteOrder, CaptureError, CaptureReader, FixedOffsetFraming, FormatError,
};

/// Builds capture files the way a sniffer on the terminal link writes them
struct CaptureBuilder {
    order: ByteOrder,
    bytes: Vec<u8>,
}

impl CaptureBuilder {
    fn new(order: ByteOrder) -> Self {
        let mut builder = Self {
            order,
            bytes: order.magic().to_vec(),
        };
        builder.u16(2);
        builder.u16(4);
        builder.u32(0);
        builder.u32(0);
        builder.u32(65535);
        builder.u32(1);
        builder
    }

    fn u16(&mut self, v: u16) {
        match self.order {
            ByteOrder::Little => self.bytes.extend(v.to_le_bytes()),
            ByteOrder::Big => self.bytes.extend(v.to_be_bytes()),
        }
    }

    fn u32(&mut self, v: u32) {
        match self.order {
            ByteOrder::Little => self.bytes.extend(v.to_le_bytes()),
            ByteOrder::Big => self.bytes.extend(v.to_be_bytes()),
        }
    }

    fn packet(mut self, ts: u32, data: &[u8]) -> Self {
        self.u32(ts);
        self.u32(0);
        self.u32(data.len() as u32);
        self.u32(data.len() as u32);
        self.bytes.extend_from_slice(data);
        self
    }

    /// Packet carrying a SICCT PDU with the given APDU, length always LE
    fn sicct(self, ts: u32, apdu: &[u8]) -> Self {
        let mut data = vec![0u8; 54];
        data.extend([0x6B, 0x01, 0x00, ts as u8, 0x00, 0x00]);
        data.extend((apdu.len() as u32).to_le_bytes());
        data.extend_from_slice(apdu);
        self.packet(ts, &data)
    }

    fn reader(self) -> CaptureReader<Cursor<Vec<u8>>> {
        CaptureReader::new(Cursor::new(self.bytes)).unwrap()
    }
}

#[test]
fn reads_every_record_in_order_for_both_byte_orders() {
    for order in [ByteOrder::Little, ByteOrder::Big] {
        let mut builder = CaptureBuilder::new(order);
        for ts in 0..5 {
            builder = builder.packet(ts, &[ts as u8; 60]);
        }

        let timestamps: Vec<u32> = builder
            .reader()
            .map(|packet| packet.unwrap().timestamp)
            .collect();
        assert_eq!(timestamps, [0, 1, 2, 3, 4], "{order:?}");
    }
}

#[test]
fn unrecognized_magic_fails_before_any_record() {
    let err = CaptureReader::new(Cursor::new(hex!("0A0D0D0A 00000000").to_vec())).unwrap_err();
    assert!(err.is_format_error());
    assert!(matches!(
        err,
        CaptureError::Format(FormatError::UnrecognizedMagic(magic)) if magic == hex!("0A0D0D0A")
    ));
}

#[test]
fn empty_capture_yields_no_records() {
    let extraction = ApduExtractor::new()
        .extract(CaptureBuilder::new(ByteOrder::Little).reader())
        .unwrap();
    assert!(extraction.is_empty());
    assert_eq!(extraction.summary().packets, 0);
}

#[test]
fn pipeline_keeps_only_valid_apdus() {
    let reader = CaptureBuilder::new(ByteOrder::Big)
        .sicct(10, &hex!("00A4040C 02 3F00"))
        // Too short for a lower-layer header
        .packet(11, &[0u8; 40])
        // Padding, rejected by the decoder
        .sicct(12, &hex!("FFFF0000"))
        .sicct(13, &hex!("00B00000 10"))
        .reader();

    let extraction = ApduExtractor::new().extract(reader).unwrap();
    let summary = extraction.summary();
    assert_eq!(summary.packets, 4);
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.apdus, 2);

    let records = extraction.records();
    assert_eq!(records[0].timestamp(), 10);
    assert_eq!(records[0].field(ApduField::Data), Some("3F 00"));
    assert_eq!(records[0].instruction_name(), Some("SELECT"));
    assert_eq!(records[1].timestamp(), 13);
    assert_eq!(records[1].instruction_name(), Some("READ BINARY"));
}

#[test]
fn custom_framing_offset() {
    let mut data = vec![0u8; 14];
    data.extend(hex!("6B 0000 0000 00 04000000 0084000008"));
    let reader = CaptureBuilder::new(ByteOrder::Little).packet(1, &data).reader();

    let framing = FixedOffsetFraming::new().with_lower_layer_len(14);
    let extraction = ApduExtractor::with_framing(framing).extract(reader).unwrap();
    // Declared length 4 cuts the trailing Le byte
    assert_eq!(extraction.records()[0].to_hex(), "00840000");
}

#[test]
fn truncated_trailing_record_ends_stream() {
    let mut builder = CaptureBuilder::new(ByteOrder::Little).sicct(1, &hex!("00A4040C"));
    builder.u32(2);
    builder.u32(0);
    builder.u32(200);
    builder.u32(200);
    builder.bytes.extend([0u8; 30]);

    let records: Vec<_> = ApduExtractor::new()
        .records(builder.reader())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 1);
}
