use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::common::error::{Result, TagError};
use crate::common::util::read_exact_or_eof;
use crate::ogg::crc;

pub const PAGE_MAGIC: &[u8; 4] = b"OggS";

/// Header-type flag bits.
pub const CONTINUED_PACKET: u8 = 0x01;
pub const FIRST_PAGE: u8 = 0x02;
pub const LAST_PAGE: u8 = 0x04;

/// Offset of the little-endian CRC field within the page header.
pub(crate) const CRC_OFFSET: usize = 22;

/// How much of the next packet lives in the current page: the summed
/// lacing values of its segment run, and whether the packet ends there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    pub size: usize,
    pub complete: bool,
}

/// Streaming reader over the pages of a single logical Ogg bitstream.
///
/// Body bytes are not buffered: segments are claimed through
/// [`packet_info`](Self::packet_info) and then read off the underlying
/// source, so a packet reader can pull them without copying whole pages.
#[derive(Debug)]
pub struct PageReader<R> {
    reader: R,
    pub header_type: u8,
    pub granule_position: u64,
    pub serial: u32,
    pub sequence: u32,
    pub checksum: u32,
    segment_table: Vec<u8>,
    seg_index: usize,
}

impl<R: Read + Seek> PageReader<R> {
    /// Read the page header at the current position of `reader`.
    pub fn open(mut reader: R) -> Result<Self> {
        let header = RawHeader::read(&mut reader)?;
        Ok(PageReader {
            reader,
            header_type: header.header_type,
            granule_position: header.granule_position,
            serial: header.serial,
            sequence: header.sequence,
            checksum: header.checksum,
            segment_table: header.segment_table,
            seg_index: 0,
        })
    }

    /// Skip any still-unclaimed body bytes and load the next page.
    pub fn advance(&mut self) -> Result<()> {
        let unread: u64 = self.remaining_segments().iter().map(|&s| u64::from(s)).sum();
        self.reader.seek(SeekFrom::Current(unread as i64))?;

        let header = RawHeader::read(&mut self.reader)?;
        self.header_type = header.header_type;
        self.granule_position = header.granule_position;
        self.serial = header.serial;
        self.sequence = header.sequence;
        self.checksum = header.checksum;
        self.segment_table = header.segment_table;
        self.seg_index = 0;
        Ok(())
    }

    /// True iff this page closes the logical bitstream.
    pub fn is_last(&self) -> bool {
        self.header_type & LAST_PAGE != 0
    }

    pub fn is_first(&self) -> bool {
        self.header_type & FIRST_PAGE != 0
    }

    /// Claim the lacing run of the next packet chunk. Advances to the next
    /// page first when the current segment table is exhausted; a freshly
    /// loaded page with no segments is a structural error.
    pub fn packet_info(&mut self) -> Result<PacketInfo> {
        if self.seg_index == self.segment_table.len() {
            self.advance()?;
            if self.segment_table.is_empty() {
                return Err(TagError::MalformedStream(
                    "page with an empty segment table".into(),
                ));
            }
        }

        let mut size = 0usize;
        let mut complete = false;
        while self.seg_index < self.segment_table.len() {
            let lace = self.segment_table[self.seg_index];
            self.seg_index += 1;
            size += lace as usize;
            if lace < 255 {
                complete = true;
                break;
            }
        }
        Ok(PacketInfo { size, complete })
    }

    /// Read exactly `buf.len()` claimed body bytes.
    pub(crate) fn read_body(&mut self, buf: &mut [u8]) -> Result<()> {
        read_exact_or_eof(&mut self.reader, buf)
    }

    /// Serialize the page: header, segment table and every still-unclaimed
    /// body byte. With `recompute_crc` the CRC field is zeroed, the
    /// checksum recomputed over the whole page and patched back in.
    pub fn dump(&mut self, recompute_crc: bool) -> Result<Vec<u8>> {
        let body_len: usize = self.remaining_segments().iter().map(|&s| usize::from(s)).sum();

        let mut page = Vec::with_capacity(27 + self.segment_table.len() + body_len);
        page.extend_from_slice(PAGE_MAGIC);
        page.push(0); // stream structure version
        page.push(self.header_type);
        page.extend_from_slice(&self.granule_position.to_le_bytes());
        page.extend_from_slice(&self.serial.to_le_bytes());
        page.extend_from_slice(&self.sequence.to_le_bytes());
        if recompute_crc {
            page.extend_from_slice(&[0u8; 4]);
        } else {
            page.extend_from_slice(&self.checksum.to_le_bytes());
        }
        page.push(self.segment_table.len() as u8);
        page.extend_from_slice(&self.segment_table);

        let body_start = page.len();
        page.resize(body_start + body_len, 0);
        self.read_body_at(body_start, &mut page)?;
        self.seg_index = self.segment_table.len();

        if recompute_crc {
            let crc = crc::checksum(&page);
            page[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
            self.checksum = crc;
        }
        Ok(page)
    }

    /// Hand back the underlying source; its position is just past the last
    /// byte this reader consumed.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn remaining_segments(&self) -> &[u8] {
        &self.segment_table[self.seg_index..]
    }

    fn read_body_at(&mut self, start: usize, page: &mut [u8]) -> Result<()> {
        read_exact_or_eof(&mut self.reader, &mut page[start..])
    }
}

struct RawHeader {
    header_type: u8,
    granule_position: u64,
    serial: u32,
    sequence: u32,
    checksum: u32,
    segment_table: Vec<u8>,
}

impl RawHeader {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 27];
        read_exact_or_eof(reader, &mut header)?;

        if &header[0..4] != PAGE_MAGIC {
            return Err(TagError::MalformedPage("bad capture pattern".into()));
        }
        if header[4] != 0 {
            return Err(TagError::MalformedPage(format!(
                "unsupported stream structure version {}",
                header[4]
            )));
        }

        let mut fields = &header[6..];
        let granule_position = fields.read_u64::<LittleEndian>()?;
        let serial = fields.read_u32::<LittleEndian>()?;
        let sequence = fields.read_u32::<LittleEndian>()?;
        let checksum = fields.read_u32::<LittleEndian>()?;

        let mut segment_table = vec![0u8; header[26] as usize];
        read_exact_or_eof(reader, &mut segment_table)?;

        Ok(RawHeader {
            header_type: header[5],
            granule_position,
            serial,
            sequence,
            checksum,
            segment_table,
        })
    }
}
