//! Capture file reading
//!
//! The byte order of every multi-byte field is fixed once by the magic
//! number and then applied to the global header and to every record header.
//! Records are produced lazily; the reader is not seekable and can only be
//! restarted by opening the source again.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use bytes::{Buf, Bytes};
use tracing::{debug, trace};

use crate::error::{FormatError, Result};

/// Magic number of a little-endian capture file
pub const MAGIC_LE: [u8; 4] = [0xD4, 0xC3, 0xB2, 0xA1];

/// Magic number of a big-endian capture file
pub const MAGIC_BE: [u8; 4] = [0xA1, 0xB2, 0xC3, 0xD4];

/// Global header bytes following the magic number
pub const GLOBAL_HEADER_LEN: usize = 20;

/// Per-record header size
pub const RECORD_HEADER_LEN: usize = 16;

/// Upper bound for the up-front buffer allocation of a single record
const MAX_PREALLOC: usize = 64 * 1024;

/// Byte order selected by the magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian fields
    Little,
    /// Big-endian fields
    Big,
}

impl ByteOrder {
    /// Byte order announced by a magic number, if it is recognized
    pub const fn from_magic(magic: [u8; 4]) -> Option<Self> {
        match magic {
            MAGIC_LE => Some(Self::Little),
            MAGIC_BE => Some(Self::Big),
            _ => None,
        }
    }

    /// Magic number announcing this byte order
    pub const fn magic(&self) -> [u8; 4] {
        match self {
            Self::Little => MAGIC_LE,
            Self::Big => MAGIC_BE,
        }
    }

    fn get_u16(self, buf: &mut impl Buf) -> u16 {
        match self {
            Self::Little => buf.get_u16_le(),
            Self::Big => buf.get_u16(),
        }
    }

    fn get_u32(self, buf: &mut impl Buf) -> u32 {
        match self {
            Self::Little => buf.get_u32_le(),
            Self::Big => buf.get_u32(),
        }
    }

    fn get_i32(self, buf: &mut impl Buf) -> i32 {
        match self {
            Self::Little => buf.get_i32_le(),
            Self::Big => buf.get_i32(),
        }
    }
}

/// Global header fields after the magic number, informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    /// Format major version
    pub version_major: u16,
    /// Format minor version
    pub version_minor: u16,
    /// GMT to local correction
    pub this_zone: i32,
    /// Timestamp accuracy
    pub sigfigs: u32,
    /// Snapshot length
    pub snap_len: u32,
    /// Link layer type
    pub link_type: u32,
}

impl CaptureHeader {
    fn parse(mut buf: &[u8], order: ByteOrder) -> Self {
        Self {
            version_major: order.get_u16(&mut buf),
            version_minor: order.get_u16(&mut buf),
            this_zone: order.get_i32(&mut buf),
            sigfigs: order.get_u32(&mut buf),
            snap_len: order.get_u32(&mut buf),
            link_type: order.get_u32(&mut buf),
        }
    }
}

/// One captured packet record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePacket {
    /// Timestamp seconds
    pub timestamp: u32,
    /// Timestamp microseconds
    pub timestamp_micros: u32,
    /// Number of bytes captured, the length of `data`
    pub captured_length: u32,
    /// Length of the packet on the wire
    pub original_length: u32,
    /// Captured bytes
    pub data: Bytes,
}

/// Lazy reader over the records of a capture file
#[derive(Debug)]
pub struct CaptureReader<R> {
    reader: R,
    byte_order: ByteOrder,
    header: Option<CaptureHeader>,
    records_read: usize,
    finished: bool,
}

impl CaptureReader<BufReader<File>> {
    /// Open a capture file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening capture file");
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> CaptureReader<R> {
    /// Check the magic number and consume the global header.
    ///
    /// Fails with a format error before any record is produced if the first
    /// four bytes are not a recognized magic number.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        if read_full(&mut reader, &mut magic)? < magic.len() {
            return Err(FormatError::TruncatedMagic.into());
        }
        let byte_order =
            ByteOrder::from_magic(magic).ok_or(FormatError::UnrecognizedMagic(magic))?;

        let mut global = [0u8; GLOBAL_HEADER_LEN];
        let header = if read_full(&mut reader, &mut global)? == GLOBAL_HEADER_LEN {
            Some(CaptureHeader::parse(&global, byte_order))
        } else {
            None
        };
        debug!(?byte_order, ?header, "Capture header read");

        Ok(Self {
            reader,
            byte_order,
            finished: header.is_none(),
            header,
            records_read: 0,
        })
    }

    /// Byte order fixed by the magic number
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Global header, `None` if the source ended inside it
    pub const fn header(&self) -> Option<&CaptureHeader> {
        self.header.as_ref()
    }

    /// Number of complete records produced so far
    pub const fn records_read(&self) -> usize {
        self.records_read
    }

    fn read_record(&mut self) -> Result<Option<CapturePacket>> {
        let mut raw = [0u8; RECORD_HEADER_LEN];
        let got = read_full(&mut self.reader, &mut raw)?;
        if got < RECORD_HEADER_LEN {
            trace!(got, "End of capture");
            return Ok(None);
        }

        let mut buf = &raw[..];
        let timestamp = self.byte_order.get_u32(&mut buf);
        let timestamp_micros = self.byte_order.get_u32(&mut buf);
        let captured_length = self.byte_order.get_u32(&mut buf);
        let original_length = self.byte_order.get_u32(&mut buf);

        let declared = captured_length as usize;
        let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC));
        (&mut self.reader)
            .take(u64::from(captured_length))
            .read_to_end(&mut data)?;
        if data.len() < declared {
            debug!(
                record = self.records_read,
                declared,
                available = data.len(),
                "Short record read, treating as end of capture"
            );
            return Ok(None);
        }

        Ok(Some(CapturePacket {
            timestamp,
            timestamp_micros,
            captured_length,
            original_length,
            data: Bytes::from(data),
        }))
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<CapturePacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(packet)) => {
                self.records_read += 1;
                Some(Ok(packet))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Read until `buf` is full or the source is exhausted
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
