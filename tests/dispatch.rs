use std::fs;

use oxtag::{open, AudioFile, TagError};
use tempfile::tempdir;

#[test]
fn ogg_vorbis_is_detected_by_signature() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("detect.ogg");

    let mut page = b"OggS\x00\x02".to_vec();
    page.extend_from_slice(&[0u8; 20]);
    page.push(1);
    page.push(30);
    page.extend_from_slice(b"\x01vorbis");
    page.extend_from_slice(&[0u8; 23]);
    fs::write(&path, page).unwrap();

    assert!(matches!(open(&path).unwrap(), AudioFile::OggVorbis(_)));
}

#[test]
fn opus_wins_over_vorbis_inside_an_ogg_container() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("detect.ogg");

    let mut page = b"OggS\x00\x02".to_vec();
    page.extend_from_slice(&[0u8; 20]);
    page.push(1);
    page.push(19);
    page.extend_from_slice(b"OpusHead");
    page.extend_from_slice(&[0u8; 11]);
    fs::write(&path, page).unwrap();

    assert!(matches!(open(&path).unwrap(), AudioFile::OggOpus(_)));
}

#[test]
fn mp3_is_detected_by_id3_magic_or_extension() {
    let dir = tempdir().unwrap();

    let tagged = dir.path().join("tagged.bin");
    fs::write(&tagged, b"ID3\x04\x00\x00\x00\x00\x00\x00").unwrap();
    assert!(matches!(open(&tagged).unwrap(), AudioFile::Mp3(_)));

    let bare = dir.path().join("bare.mp3");
    fs::write(&bare, [0xFFu8, 0xFB, 0x90, 0x00]).unwrap();
    assert!(matches!(open(&bare).unwrap(), AudioFile::Mp3(_)));
}

#[test]
fn unknown_content_is_not_supported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("picture.png");
    fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

    assert!(matches!(
        open(&path).unwrap_err(),
        TagError::FormatNotSupported(_)
    ));
}
