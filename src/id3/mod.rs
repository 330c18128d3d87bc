pub mod frames;
pub mod header;
pub mod specs;
pub mod unsynch;
pub mod v1;
pub mod writer;

use std::io::{Read, Seek};

use crate::common::error::Result;
use crate::common::util::{read_exact_or_eof, read_prefix};
use crate::id3::header::Id3Header;
use crate::tagmap::TagMap;

/// Read canonical tags from the metadata regions of an MP3-shaped file:
/// an ID3v2 block at the start wins, otherwise a trailing ID3v1 block is
/// used, otherwise the map is empty.
pub fn read_tags<R: Read + Seek>(source: &mut R) -> Result<TagMap> {
    let mut head = [0u8; 10];
    let n = read_prefix(source, &mut head)?;

    if let Some(header) = Id3Header::parse(&head[..n])? {
        let mut body = vec![0u8; header.size as usize];
        read_exact_or_eof(source, &mut body)?;
        if header.flags.unsynchronisation && header.version.0 < 4 {
            body = unsynch::decode(&body);
        }
        return frames::read_frames(&body, &header);
    }

    if let Some(block) = v1::read_block(source)? {
        return Ok(v1::parse(&block));
    }
    Ok(TagMap::new())
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::id3::header::BitPaddedInt;
    use crate::id3::specs::Encoding;

    pub(crate) fn encode_text(encoding: u8, text: &str) -> Vec<u8> {
        match encoding {
            e if e == Encoding::Latin1 as u8 => {
                text.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' }).collect()
            }
            e if e == Encoding::Utf16 as u8 => {
                let mut out = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
            e if e == Encoding::Utf16Be as u8 => text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
            _ => text.as_bytes().to_vec(),
        }
    }

    pub(crate) fn v22_frame(id: &str, text: &str) -> Vec<u8> {
        let body = [&[0u8][..], &encode_text(0, text)[..]].concat();
        let mut out = id.as_bytes().to_vec();
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(&body);
        out
    }

    pub(crate) fn v23_frame(id: &str, encoding: u8, text: &str) -> Vec<u8> {
        let body = [&[encoding][..], &encode_text(encoding, text)[..]].concat();
        let mut out = id.as_bytes().to_vec();
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&body);
        out
    }

    pub(crate) fn v24_frame(id: &str, encoding: u8, text: &str) -> Vec<u8> {
        let body = [&[encoding][..], &encode_text(encoding, text)[..]].concat();
        let mut out = id.as_bytes().to_vec();
        out.extend_from_slice(&BitPaddedInt::encode(body.len() as u32, 4, 7));
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&body);
        out
    }

    /// A complete ID3v2 tag block around already-rendered frame data.
    pub(crate) fn v2_tag(major: u8, frames: &[u8]) -> Vec<u8> {
        let mut out = b"ID3".to_vec();
        out.push(major);
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&BitPaddedInt::encode(frames.len() as u32, 4, 7));
        out.extend_from_slice(frames);
        out
    }

    /// A 128-byte ID3v1 block with the v1.1 track layout.
    pub(crate) fn v1_block(
        title: &str,
        artist: &str,
        album: &str,
        year: &str,
        track: u8,
        genre: u8,
    ) -> [u8; 128] {
        let mut block = [0u8; 128];
        block[0..3].copy_from_slice(b"TAG");
        write_padded(&mut block[3..33], title);
        write_padded(&mut block[33..63], artist);
        write_padded(&mut block[63..93], album);
        write_padded(&mut block[93..97], year);
        block[126] = track;
        block[127] = genre;
        block
    }

    fn write_padded(dest: &mut [u8], text: &str) {
        let bytes = text.as_bytes();
        let len = bytes.len().min(dest.len());
        dest[..len].copy_from_slice(&bytes[..len]);
    }
}
