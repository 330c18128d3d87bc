use std::io::Read;

use crate::common::error::Result;
use crate::id3::header::{BitPaddedInt, Id3Header};
use crate::id3::specs::{self, Encoding};
use crate::id3::unsynch;
use crate::tagmap::{TagMap, TagValue, FIELD_NAMES};

/// Frame ids carrying the canonical fields, positionally matching
/// [`FIELD_NAMES`]. Each table is a bijection for its tag version.
const FRAMES_V22: [&str; 7] = ["TAL", "TP1", "COM", "TYE", "TCO", "TT2", "TRK"];
const FRAMES_V23: [&str; 7] = ["TALB", "TPE1", "COMM", "TYER", "TCON", "TIT2", "TRCK"];
const FRAMES_V24: [&str; 7] = ["TALB", "TPE1", "COMM", "TDRC", "TCON", "TIT2", "TRCK"];

fn frame_table(major: u8) -> &'static [&'static str; 7] {
    match major {
        2 => &FRAMES_V22,
        3 => &FRAMES_V23,
        _ => &FRAMES_V24,
    }
}

/// The v2.4 frame id a canonical field is written as.
pub fn v24_frame_id(field: &str) -> Option<&'static str> {
    FIELD_NAMES
        .iter()
        .position(|&name| name == field)
        .map(|index| FRAMES_V24[index])
}

/// Walk the frames of an ID3v2 tag body and collect the canonical tags.
///
/// Unknown frame ids are consumed and ignored. A zero byte where a frame
/// id should start means padding; a frame running past the tag boundary is
/// truncated there. Both end the walk.
pub fn read_frames(data: &[u8], header: &Id3Header) -> Result<TagMap> {
    let major = header.version.0;
    let mut tags = TagMap::new();

    let mut offset = extended_header_len(data, header);
    let head_len = if major == 2 { 6 } else { 10 };

    while offset + head_len <= data.len() {
        if data[offset] == 0 {
            break; // padding
        }

        let (id_end, size) = match major {
            2 => (
                offset + 3,
                BitPaddedInt::plain(&data[offset + 3..offset + 6]) as usize,
            ),
            3 => (
                offset + 4,
                BitPaddedInt::plain(&data[offset + 4..offset + 8]) as usize,
            ),
            _ => (
                offset + 4,
                BitPaddedInt::syncsafe(&data[offset + 4..offset + 8]) as usize,
            ),
        };
        let id = &data[offset..id_end];
        let flags = if major == 2 {
            0
        } else {
            u16::from_be_bytes([data[offset + 8], data[offset + 9]])
        };
        offset += head_len;

        let end = (offset + size).min(data.len());
        let truncated = end < offset + size;
        let body = &data[offset..end];
        offset = end;

        handle_frame(&mut tags, id, body, flags, major);
        if truncated {
            break;
        }
    }

    Ok(tags)
}

/// Decode one frame body into its canonical field, if it carries one.
/// Anything that fails locally (bad flags payload, bad encoding byte) just
/// drops the frame.
fn handle_frame(tags: &mut TagMap, id: &[u8], body: &[u8], flags: u16, major: u8) {
    let (compressed, encrypted, unsynchronised, data_length) = match major {
        4 => (
            flags & 0x0008 != 0,
            flags & 0x0004 != 0,
            flags & 0x0002 != 0,
            flags & 0x0001 != 0,
        ),
        3 => (flags & 0x0080 != 0, flags & 0x0040 != 0, false, flags & 0x0080 != 0),
        _ => (false, false, false, false),
    };
    if encrypted {
        return;
    }

    let Ok(id) = std::str::from_utf8(id) else {
        return;
    };
    let Some(index) = frame_table(major).iter().position(|&f| f == id) else {
        return;
    };
    let field = FIELD_NAMES[index];

    let mut body = body.to_vec();
    if data_length && body.len() >= 4 {
        body.drain(..4);
    }
    if unsynchronised {
        body = unsynch::decode(&body);
    }
    if compressed {
        match inflate(&body) {
            Ok(inflated) => body = inflated,
            Err(_) => return,
        }
    }

    let Some((&encoding_byte, text_bytes)) = body.split_first() else {
        return;
    };
    let Some(encoding) = Encoding::from_byte(encoding_byte) else {
        return;
    };
    let text = specs::decode_text(text_bytes, encoding);
    let text = text.trim_end_matches('\0');

    // Numeric genre references only exist before v2.4; a v2.4 genre body
    // is already a plain string.
    let value = if field == "genre" && major != 4 {
        specs::expand_genre_codes(text)
    } else {
        TagValue::Text(text.to_string())
    };
    tags.insert(field, value);
}

/// Byte count of the v2.3/v2.4 extended header, when the tag flags one.
fn extended_header_len(data: &[u8], header: &Id3Header) -> usize {
    if !header.flags.extended || header.version.0 < 3 || data.len() < 4 {
        return 0;
    }
    let len = if header.version.0 == 4 {
        BitPaddedInt::syncsafe(&data[0..4]) as usize
    } else {
        BitPaddedInt::plain(&data[0..4]) as usize + 4
    };
    len.min(data.len())
}

fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}
