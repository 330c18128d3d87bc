use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::common::error::Result;
use crate::common::util;
use crate::ogg::crc;
use crate::ogg::packet::PacketReader;
use crate::ogg::page::{PageReader, CONTINUED_PACKET, CRC_OFFSET, PAGE_MAGIC};
use crate::tagmap::TagMap;
use crate::vorbis;

/// Codec-specific shape of the comment header region: the comment packet
/// signature, whether the payload carries a framing bit, and how many
/// packets follow the comment packet before the audio (Vorbis has the
/// setup header there, Opus has nothing).
pub(crate) struct CommentCodec {
    pub signature: &'static [u8],
    pub framing_bit: bool,
    pub setup_packets: usize,
}

/// One output page under construction. `finalize` concatenates header,
/// segment table and body with the checksum patched in.
struct PageBuilder {
    header_type: u8,
    serial: u32,
    sequence: u32,
    segment_table: Vec<u8>,
    body: Vec<u8>,
}

impl PageBuilder {
    fn new(header_type: u8, serial: u32, sequence: u32) -> Self {
        PageBuilder {
            header_type,
            serial,
            sequence,
            segment_table: Vec::new(),
            body: Vec::new(),
        }
    }

    fn push_segment(&mut self, chunk: &[u8]) {
        self.segment_table.push(chunk.len() as u8);
        self.body.extend_from_slice(chunk);
    }

    fn segment_count(&self) -> usize {
        self.segment_table.len()
    }

    fn finalize(self) -> Vec<u8> {
        let mut page = Vec::with_capacity(27 + self.segment_table.len() + self.body.len());
        page.extend_from_slice(PAGE_MAGIC);
        page.push(0); // stream structure version
        page.push(self.header_type);
        page.extend_from_slice(&0u64.to_le_bytes()); // granule position
        page.extend_from_slice(&self.serial.to_le_bytes());
        page.extend_from_slice(&self.sequence.to_le_bytes());
        page.extend_from_slice(&[0u8; 4]); // checksum, patched below
        page.push(self.segment_table.len() as u8);
        page.extend_from_slice(&self.segment_table);
        page.extend_from_slice(&self.body);

        let checksum = crc::checksum(&page);
        page[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());
        page
    }
}

/// Splits packets into lacing-value segments, flushing a page whenever its
/// segment table fills up or a packet demands a page boundary.
struct PageEmitter<'a, W: Write> {
    out: &'a mut W,
    serial: u32,
    next_sequence: u32,
    last_sequence: u32,
    current: Option<PageBuilder>,
}

impl<'a, W: Write> PageEmitter<'a, W> {
    fn new(out: &'a mut W, serial: u32, first_sequence: u32) -> Self {
        PageEmitter {
            out,
            serial,
            next_sequence: first_sequence,
            last_sequence: first_sequence,
            current: None,
        }
    }

    /// Append one whole packet. Every packet ends on a lacing value below
    /// 255, so a length that is a multiple of 255 gets an explicit zero
    /// lacing. With `force_page_end` the page is flushed afterwards even
    /// if it still has room.
    fn append_packet(&mut self, packet: &[u8], force_page_end: bool) -> Result<()> {
        let mut offset = 0usize;
        loop {
            let take = (packet.len() - offset).min(255);
            let continued = offset > 0;

            if self.current.is_none() {
                let header_type = if continued { CONTINUED_PACKET } else { 0 };
                self.last_sequence = self.next_sequence;
                self.current = Some(PageBuilder::new(
                    header_type,
                    self.serial,
                    self.next_sequence,
                ));
                self.next_sequence += 1;
            }
            if let Some(builder) = self.current.as_mut() {
                builder.push_segment(&packet[offset..offset + take]);
            }
            offset += take;

            let full = self
                .current
                .as_ref()
                .is_some_and(|b| b.segment_count() == 255);
            if full {
                self.flush()?;
            }
            if take < 255 {
                break; // terminal lacing written
            }
        }

        if force_page_end {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush whatever page is still open.
    fn finish(mut self) -> Result<u32> {
        self.flush()?;
        Ok(self.last_sequence)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(builder) = self.current.take() {
            self.out.write_all(&builder.finalize())?;
        }
        Ok(())
    }
}

/// Rewrite the Ogg stream at `path` with a freshly built comment packet.
///
/// The identification page passes through untouched. The comment packet is
/// replaced and repaginated together with the codec's setup packets; when
/// that changes the page count, every following page is renumbered and
/// re-checksummed, otherwise the remainder is copied verbatim. The whole
/// result lands in a sibling temp file that replaces the original only on
/// success.
pub(crate) fn rewrite_comments(path: &Path, tags: &TagMap, codec: &CommentCodec) -> Result<()> {
    util::replace_file(path, |temp| {
        let input = BufReader::new(File::open(path)?);
        let mut out = BufWriter::new(temp);

        let mut pages = PageReader::open(input)?;
        let serial = pages.serial;

        // Identification page, checksum included.
        out.write_all(&pages.dump(false)?)?;
        pages.advance()?;

        let mut packets = PacketReader::new(pages);
        packets.read_all()?; // drop the old comment packet

        let comment_packet = vorbis::build_comments(tags, codec.signature, codec.framing_bit);
        let mut emitter = PageEmitter::new(&mut out, serial, 1);
        emitter.append_packet(&comment_packet, false)?;
        for _ in 0..codec.setup_packets {
            let setup = packets.read_all()?;
            emitter.append_packet(&setup, true)?;
        }
        let last_sequence = emitter.finish()?;

        let mut pages = packets.into_pages();
        let delta = i64::from(last_sequence) - i64::from(pages.sequence);
        if delta == 0 {
            // Pagination unchanged; the rest of the stream is bit-exact.
            let mut rest = pages.into_inner();
            io::copy(&mut rest, &mut out)?;
        } else {
            while !pages.is_last() {
                pages.advance()?;
                pages.sequence = (i64::from(pages.sequence) + delta) as u32;
                out.write_all(&pages.dump(true)?)?;
            }
        }

        out.flush()?;
        Ok(())
    })
}
