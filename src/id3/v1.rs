use std::io::{Read, Seek, SeekFrom};

use crate::common::error::Result;
use crate::common::util::read_exact_or_eof;
use crate::id3::specs::{self, Encoding, GENRES};
use crate::tagmap::{TagMap, TagValue};

/// Fixed on-disk size of an ID3v1 tag.
pub const BLOCK_LEN: u64 = 128;

/// Read the trailing 128-byte ID3v1 block, if the file carries one.
pub fn read_block<R: Read + Seek>(source: &mut R) -> Result<Option<[u8; 128]>> {
    let len = source.seek(SeekFrom::End(0))?;
    if len < BLOCK_LEN {
        return Ok(None);
    }

    source.seek(SeekFrom::End(-(BLOCK_LEN as i64)))?;
    let mut block = [0u8; 128];
    read_exact_or_eof(source, &mut block)?;
    if &block[0..3] != b"TAG" {
        return Ok(None);
    }
    Ok(Some(block))
}

/// Decode the fixed-layout fields, keeping only the non-empty ones. The
/// comment field is ignored apart from the track byte that the v1.1
/// layout carves out of it.
pub fn parse(block: &[u8; 128]) -> TagMap {
    let mut tags = TagMap::new();

    let fields: [(&str, std::ops::Range<usize>); 4] = [
        ("title", 3..33),
        ("artist", 33..63),
        ("album", 63..93),
        ("date", 93..97),
    ];
    for (field, range) in fields {
        let text = trim_padding(&block[range]);
        if !text.is_empty() {
            tags.insert(field, TagValue::Text(text));
        }
    }

    let track = block[126];
    if track != 0 {
        tags.insert("tracknumber", TagValue::Int(u32::from(track)));
    }

    if let Some(name) = GENRES.get(block[127] as usize) {
        tags.insert("genre", TagValue::Text((*name).to_string()));
    }

    tags
}

/// ID3v1 strings are NUL- or space-padded ISO-8859-1.
fn trim_padding(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    specs::decode_text(&data[..end], Encoding::Latin1)
        .trim_end()
        .to_string()
}
