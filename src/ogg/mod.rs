pub mod crc;
pub mod packet;
pub mod page;
mod write;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::common::error::Result;
use crate::ogg::packet::PacketReader;
use crate::ogg::page::PageReader;
use crate::ogg::write::CommentCodec;
use crate::tagmap::TagMap;
use crate::vorbis;

/// An Ogg file carrying a Vorbis bitstream. Tags live in the Vorbis
/// comment header packet; everything else in the stream is preserved.
#[derive(Debug)]
pub struct OggVorbis {
    path: PathBuf,
}

impl OggVorbis {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        OggVorbis { path: path.into() }
    }

    pub fn get_tags(&self) -> Result<TagMap> {
        read_comment_tags(&self.path, vorbis::VORBIS_COMMENT_SIGNATURE.len())
    }

    /// Rebuild the comment header from `tags` and rewrite the file. The
    /// Vorbis setup header that follows the comment packet is carried over
    /// onto the same page region.
    pub fn write_tags(&self, tags: &TagMap) -> Result<()> {
        write::rewrite_comments(
            &self.path,
            tags,
            &CommentCodec {
                signature: vorbis::VORBIS_COMMENT_SIGNATURE,
                framing_bit: true,
                setup_packets: 1,
            },
        )
    }

    pub(crate) fn score(path: &Path, header: &[u8]) -> u32 {
        let mut score = 0;
        if matches!(extension(path).as_deref(), Some("ogg") | Some("oga")) {
            score += 2;
        }
        score + signature_score(header, vorbis::VORBIS_ID_SIGNATURE)
    }
}

/// An Ogg file carrying an Opus bitstream. The comment layout matches
/// Vorbis except for the `OpusTags` signature and the missing framing bit,
/// and no setup packet follows the comments.
#[derive(Debug)]
pub struct OggOpus {
    path: PathBuf,
}

impl OggOpus {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        OggOpus { path: path.into() }
    }

    pub fn get_tags(&self) -> Result<TagMap> {
        read_comment_tags(&self.path, vorbis::OPUS_TAGS_SIGNATURE.len())
    }

    pub fn write_tags(&self, tags: &TagMap) -> Result<()> {
        write::rewrite_comments(
            &self.path,
            tags,
            &CommentCodec {
                signature: vorbis::OPUS_TAGS_SIGNATURE,
                framing_bit: false,
                setup_packets: 0,
            },
        )
    }

    pub(crate) fn score(path: &Path, header: &[u8]) -> u32 {
        let mut score = 0;
        if extension(path).as_deref() == Some("opus") {
            score += 2;
        }
        score + signature_score(header, vorbis::OPUS_HEAD_SIGNATURE)
    }
}

/// Read the comment packet of the second page into a canonical tag map.
fn read_comment_tags(path: &Path, signature_len: usize) -> Result<TagMap> {
    let file = BufReader::new(File::open(path)?);
    let mut pages = PageReader::open(file)?;
    pages.advance()?; // the comment packet starts on the second page
    let mut packets = PacketReader::new(pages);
    let comments = vorbis::parse_comments(&mut packets, signature_len)?;
    Ok(TagMap::from(comments))
}

/// Score the capture pattern plus the identification packet signature that
/// sits right after the first page's segment table.
fn signature_score(header: &[u8], signature: &[u8]) -> u32 {
    if header.len() < 4 || &header[0..4] != page::PAGE_MAGIC {
        return 0;
    }
    let mut score = 1;
    if header.len() > 27 {
        let sig_start = 27 + header[26] as usize;
        if header.len() >= sig_start + signature.len()
            && &header[sig_start..sig_start + signature.len()] == signature
        {
            score += 3;
        }
    }
    score
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::testutil::raw_page;

    #[test]
    fn vorbis_signature_outscores_extension_alone() {
        let header = raw_page(page::FIRST_PAGE, &[25], b"\x01vorbis rest of id header");
        let path = Path::new("sample.ogg");
        assert!(OggVorbis::score(path, &header) > OggOpus::score(path, &header));
    }

    #[test]
    fn opus_in_ogg_container_scores_as_opus() {
        let header = raw_page(page::FIRST_PAGE, &[19], b"OpusHead rest of id");
        let path = Path::new("sample.ogg");
        assert!(OggOpus::score(path, &header) > OggVorbis::score(path, &header));
    }

    #[test]
    fn non_ogg_data_scores_zero() {
        assert_eq!(OggVorbis::score(Path::new("file.bin"), b"RIFF...."), 0);
        assert_eq!(OggOpus::score(Path::new("file.bin"), b"RIFF...."), 0);
    }
}
