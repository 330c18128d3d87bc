use std::io::{Read, Seek};

use crate::common::error::Result;
use crate::ogg::page::PageReader;

/// Where the reader stands relative to packet boundaries. `remaining` is
/// the unread share of the current lacing run, `complete` whether the
/// packet ends with that run.
#[derive(Debug, Clone, Copy)]
enum State {
    AtPacketStart,
    InPacket { remaining: usize, complete: bool },
}

/// Reassembles logical packets from the lacing runs a [`PageReader`]
/// exposes, hiding how packets are laid out across segments and pages.
pub struct PacketReader<R> {
    pages: PageReader<R>,
    state: State,
}

impl<R: Read + Seek> PacketReader<R> {
    pub fn new(pages: PageReader<R>) -> Self {
        PacketReader {
            pages,
            state: State::AtPacketStart,
        }
    }

    pub fn pages(&self) -> &PageReader<R> {
        &self.pages
    }

    pub fn into_pages(self) -> PageReader<R> {
        self.pages
    }

    /// Read up to `n` bytes from the current packet, crossing segment and
    /// page boundaries as needed. Returns short exactly when the packet
    /// ends; the next call then starts on the following packet.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let (remaining, complete) = self.current_run()?;
            if remaining == 0 {
                if complete {
                    self.state = State::AtPacketStart;
                    break;
                }
                self.refresh()?;
                continue;
            }

            let take = remaining.min(n - out.len());
            let start = out.len();
            out.resize(start + take, 0);
            self.pages.read_body(&mut out[start..])?;
            self.state = State::InPacket {
                remaining: remaining - take,
                complete,
            };
        }

        // A fully consumed terminal run closes the packet implicitly.
        if let State::InPacket {
            remaining: 0,
            complete: true,
        } = self.state
        {
            self.state = State::AtPacketStart;
        }
        Ok(out)
    }

    /// Read everything up to the end of the current packet.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let (remaining, complete) = self.current_run()?;
            if remaining > 0 {
                let start = out.len();
                out.resize(start + remaining, 0);
                self.pages.read_body(&mut out[start..])?;
            }
            if complete {
                self.state = State::AtPacketStart;
                return Ok(out);
            }
            self.refresh()?;
        }
    }

    fn current_run(&mut self) -> Result<(usize, bool)> {
        match self.state {
            State::AtPacketStart => self.refresh(),
            State::InPacket { remaining, complete } => Ok((remaining, complete)),
        }
    }

    fn refresh(&mut self) -> Result<(usize, bool)> {
        let info = self.pages.packet_info()?;
        self.state = State::InPacket {
            remaining: info.size,
            complete: info.complete,
        };
        Ok((info.size, info.complete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::TagError;
    use crate::ogg::testutil::raw_page;
    use crate::ogg::page::LAST_PAGE;
    use std::io::Cursor;

    const TEXT: &[u8] = b"pytag";

    fn reader(data: Vec<u8>) -> PacketReader<Cursor<Vec<u8>>> {
        PacketReader::new(PageReader::open(Cursor::new(data)).unwrap())
    }

    // 255 * 51 == the largest single lacing value.
    fn full() -> Vec<u8> {
        TEXT.repeat(51)
    }

    #[test]
    fn single_segment_packet() {
        let data = raw_page(0, &[5], TEXT);
        let mut packets = reader(data);
        assert_eq!(packets.read_all().unwrap(), TEXT);
    }

    #[test]
    fn zero_lacing_terminates_packet() {
        // Segment table [255, 0]: one 255-byte packet ending on an empty
        // segment.
        let data = raw_page(0, &[255, 0], &full());
        let mut packets = reader(data);
        assert_eq!(packets.read_all().unwrap(), full());
    }

    #[test]
    fn two_segments_one_packet() {
        let body = [full(), TEXT.to_vec()].concat();
        let data = raw_page(0, &[255, 5], &body);
        let mut packets = reader(data);
        assert_eq!(packets.read_all().unwrap(), body);
    }

    #[test]
    fn consecutive_packets_in_one_page() {
        let body = [TEXT, TEXT].concat();
        let data = raw_page(0, &[5, 5], &body);
        let mut packets = reader(data);
        assert_eq!(packets.read_all().unwrap(), TEXT);
        assert_eq!(packets.read_all().unwrap(), TEXT);
    }

    #[test]
    fn four_packets_in_one_page() {
        let quad = TEXT.repeat(4);
        let double = TEXT.repeat(2);
        let body = [TEXT, &quad[..], &b"zz"[..], &double[..]].concat();
        let data = raw_page(0, &[5, 20, 2, 10], &body);
        let mut packets = reader(data);
        assert_eq!(packets.read_all().unwrap(), TEXT);
        assert_eq!(packets.read_all().unwrap(), TEXT.repeat(4));
        assert_eq!(packets.read_all().unwrap(), b"zz");
        assert_eq!(packets.read_all().unwrap(), TEXT.repeat(2));
    }

    #[test]
    fn packet_split_across_two_pages() {
        // First page: 255 segments of 255 bytes, all continuing. Second
        // page carries the 5-byte tail.
        let mut data = raw_page(0, &[255u8; 255], &full().repeat(255));
        data.extend_from_slice(&raw_page(LAST_PAGE, &[5], TEXT));
        let mut packets = reader(data);

        let packet = packets.read_all().unwrap();
        assert_eq!(packet.len(), 255 * 255 + 5);
        assert_eq!(packet, [full().repeat(255), TEXT.to_vec()].concat());
    }

    #[test]
    fn packet_split_across_three_pages() {
        let mut data = raw_page(0, &[255u8; 255], &full().repeat(255));
        data.extend_from_slice(&raw_page(0, &[255u8; 255], &full().repeat(255)));
        data.extend_from_slice(&raw_page(LAST_PAGE, &[5], TEXT));
        let mut packets = reader(data);

        let packet = packets.read_all().unwrap();
        assert_eq!(packet.len(), 2 * 255 * 255 + 5);
    }

    #[test]
    fn split_packet_ending_on_empty_page() {
        // The second page only holds the end-of-packet lacing.
        let mut data = raw_page(0, &[255u8; 255], &full().repeat(255));
        data.extend_from_slice(&raw_page(LAST_PAGE, &[0], b""));
        let mut packets = reader(data);

        let packet = packets.read_all().unwrap();
        assert_eq!(packet, full().repeat(255));
    }

    #[test]
    fn chunked_reads_equal_read_all() {
        let mut data = raw_page(0, &[255u8; 255], &full().repeat(255));
        data.extend_from_slice(&raw_page(LAST_PAGE, &[5], TEXT));
        let mut packets = reader(data);

        let mut out = packets.read(1).unwrap();
        out.extend(packets.read(255 * 255).unwrap());
        out.extend(packets.read(4).unwrap());
        assert_eq!(out.len(), 255 * 255 + 5);
        assert_eq!(out, [full().repeat(255), TEXT.to_vec()].concat());
    }

    #[test]
    fn read_stops_at_packet_end() {
        // Packet one is 255*255 bytes; a greedy read must not bleed into
        // the "hello" packet that follows.
        let mut data = raw_page(0, &[255u8; 255], &full().repeat(255));
        data.extend_from_slice(&raw_page(LAST_PAGE, &[0, 5], b"hello"));
        let mut packets = reader(data);

        let first = packets.read(255 * 255 + 100).unwrap();
        assert_eq!(first.len(), 255 * 255);
        assert_eq!(packets.read(1).unwrap(), b"h");
    }

    #[test]
    fn read_in_small_chunks() {
        let data = raw_page(0, &[4], b"pyta");
        let mut packets = reader(data);
        assert_eq!(packets.read(2).unwrap(), b"py");
        assert_eq!(packets.read(2).unwrap(), b"ta");
    }

    #[test]
    fn new_packet_on_segmentless_page_is_malformed() {
        let mut data = raw_page(0, &[5], TEXT);
        data.extend_from_slice(&raw_page(LAST_PAGE, &[], b""));
        let mut packets = reader(data);

        assert_eq!(packets.read_all().unwrap(), TEXT);
        let err = packets.read_all().unwrap_err();
        assert!(matches!(err, TagError::MalformedStream(_)));
    }
}
