//! Audio metadata without audio decoding: Vorbis comments in Ogg
//! (Vorbis and Opus) and ID3v1/ID3v2 in MP3, exchanged through one
//! canonical [`TagMap`].

pub mod common;
pub mod id3;
pub mod mp3;
pub mod ogg;
pub mod tagmap;
pub mod vorbis;

use std::fs::File;
use std::path::Path;

pub use common::error::{Result, TagError};
pub use mp3::Mp3;
pub use ogg::{OggOpus, OggVorbis};
pub use tagmap::{TagMap, TagValue};

/// An audio file dispatched to its container-specific handler.
#[derive(Debug)]
pub enum AudioFile {
    OggVorbis(OggVorbis),
    OggOpus(OggOpus),
    Mp3(Mp3),
}

impl AudioFile {
    pub fn get_tags(&self) -> Result<TagMap> {
        match self {
            AudioFile::OggVorbis(f) => f.get_tags(),
            AudioFile::OggOpus(f) => f.get_tags(),
            AudioFile::Mp3(f) => f.get_tags(),
        }
    }

    pub fn write_tags(&self, tags: &TagMap) -> Result<()> {
        match self {
            AudioFile::OggVorbis(f) => f.write_tags(tags),
            AudioFile::OggOpus(f) => f.write_tags(tags),
            AudioFile::Mp3(f) => f.write_tags(tags),
        }
    }
}

/// Detect the format of `path` from its leading bytes and extension, and
/// hand back the matching handler. Every format scores the evidence; the
/// best nonzero score wins.
pub fn open<P: AsRef<Path>>(path: P) -> Result<AudioFile> {
    let path = path.as_ref();

    let mut header = [0u8; 64];
    let mut file = File::open(path)?;
    let n = common::util::read_prefix(&mut file, &mut header)?;
    let header = &header[..n];
    drop(file);

    let vorbis_score = OggVorbis::score(path, header);
    let opus_score = OggOpus::score(path, header);
    let mp3_score = Mp3::score(path, header);

    let best = vorbis_score.max(opus_score).max(mp3_score);
    if best == 0 {
        return Err(TagError::FormatNotSupported(path.display().to_string()));
    }

    if best == opus_score {
        Ok(AudioFile::OggOpus(OggOpus::new(path)))
    } else if best == vorbis_score {
        Ok(AudioFile::OggVorbis(OggVorbis::new(path)))
    } else {
        Ok(AudioFile::Mp3(Mp3::new(path)))
    }
}
