use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::error::Result;
use crate::common::util::{read_prefix, replace_file};
use crate::id3::{self, header::Id3Header, v1, writer};
use crate::tagmap::TagMap;

/// An MP3 file carrying ID3v1/ID3v2 metadata. The audio bitstream is
/// copied byte for byte; only the tag regions are touched.
#[derive(Debug)]
pub struct Mp3 {
    path: PathBuf,
}

impl Mp3 {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Mp3 { path: path.into() }
    }

    pub fn get_tags(&self) -> Result<TagMap> {
        let mut file = File::open(&self.path)?;
        id3::read_tags(&mut file)
    }

    /// Rewrite the file with a v2.4 tag block in front of the preserved
    /// audio payload. Any trailing ID3v1 block is dropped in favor of the
    /// v2 tag; an empty map strips the metadata entirely.
    pub fn write_tags(&self, tags: &TagMap) -> Result<()> {
        replace_file(&self.path, |temp| {
            let mut input = File::open(&self.path)?;

            temp.write_all(&writer::render_tag(tags))?;

            let mut head = [0u8; 10];
            let n = read_prefix(&mut input, &mut head)?;
            let audio_start = match Id3Header::parse(&head[..n])? {
                Some(header) => u64::from(header.full_size()),
                None => 0,
            };
            let had_v1 = v1::read_block(&mut input)?.is_some();

            input.seek(SeekFrom::Start(audio_start))?;
            io::copy(&mut input, temp)?;

            if had_v1 {
                let len = temp.metadata()?.len();
                temp.set_len(len.saturating_sub(v1::BLOCK_LEN))?;
            }
            Ok(())
        })
    }

    pub(crate) fn score(path: &Path, header: &[u8]) -> u32 {
        let mut score = 0;
        let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
        if ext.as_deref() == Some("mp3") {
            score += 2;
        }
        if header.len() >= 3 && &header[0..3] == b"ID3" {
            score += 3;
        }
        score
    }
}
