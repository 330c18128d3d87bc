use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian};

use crate::common::error::{Result, TagError};
use crate::ogg::packet::PacketReader;
use crate::tagmap::{CaseInsensitiveMap, TagMap};

/// Vendor string written into rebuilt comment headers.
pub const VENDOR: &str = "oxtag";

/// Vorbis header packet signatures: packet type byte plus codec magic.
pub const VORBIS_ID_SIGNATURE: &[u8] = b"\x01vorbis";
pub const VORBIS_COMMENT_SIGNATURE: &[u8] = b"\x03vorbis";
pub const VORBIS_SETUP_SIGNATURE: &[u8] = b"\x05vorbis";

/// Opus header packet signatures.
pub const OPUS_HEAD_SIGNATURE: &[u8] = b"OpusHead";
pub const OPUS_TAGS_SIGNATURE: &[u8] = b"OpusTags";

/// Parse a comment header packet as defined by the Vorbis I spec.
///
/// The caller positions the packet reader on the comment packet;
/// `signature_len` bytes of codec signature are consumed and ignored.
/// Entries without a `=` or with invalid UTF-8 are skipped, and no framing
/// bit is required, matching how tolerant decoders treat the field in the
/// wild. Keys keep every well-formed entry; restriction to the canonical
/// field set happens at the public surface.
pub fn parse_comments<R: Read + Seek>(
    packet: &mut PacketReader<R>,
    signature_len: usize,
) -> Result<CaseInsensitiveMap> {
    packet.read(signature_len)?;

    let vendor_len = read_u32(packet)? as usize;
    packet.read(vendor_len)?;

    let count = read_u32(packet)?;
    let mut comments = CaseInsensitiveMap::new();
    for _ in 0..count {
        let len = read_u32(packet)? as usize;
        let raw = packet.read(len)?;
        if raw.len() < len {
            return Err(TagError::UnexpectedEof);
        }

        let Some(eq) = memchr::memchr(b'=', &raw) else {
            continue;
        };
        let (Ok(key), Ok(value)) = (
            std::str::from_utf8(&raw[..eq]),
            std::str::from_utf8(&raw[eq + 1..]),
        ) else {
            continue;
        };
        comments.insert(key, value);
    }
    Ok(comments)
}

/// Build a comment header packet: signature, vendor, and one lowercased
/// `key=value` entry per tag. Vorbis payloads end on a 0x01 framing byte,
/// Opus payloads do not.
pub fn build_comments(tags: &TagMap, signature: &[u8], framing_bit: bool) -> Vec<u8> {
    let mut packet = Vec::with_capacity(64);
    packet.extend_from_slice(signature);

    packet.extend_from_slice(&(VENDOR.len() as u32).to_le_bytes());
    packet.extend_from_slice(VENDOR.as_bytes());

    packet.extend_from_slice(&(tags.len() as u32).to_le_bytes());
    for (key, value) in tags.iter() {
        let comment = format!("{}={}", key, value);
        packet.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        packet.extend_from_slice(comment.as_bytes());
    }

    if framing_bit {
        packet.push(1);
    }
    packet
}

fn read_u32<R: Read + Seek>(packet: &mut PacketReader<R>) -> Result<u32> {
    let bytes = packet.read(4)?;
    if bytes.len() < 4 {
        return Err(TagError::UnexpectedEof);
    }
    Ok(LittleEndian::read_u32(&bytes))
}
