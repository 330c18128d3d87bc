use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::common::error::{Result, TagError};

/// Read exactly `buf.len()` bytes, mapping a short read to `UnexpectedEof`.
pub(crate) fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TagError::UnexpectedEof,
        _ => TagError::Io(e),
    })
}

/// Fill as much of `buf` as the source can provide and return the count.
pub(crate) fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Write a replacement for `path` into a sibling temp file, then move it
/// over the original. The temp file is removed on any failure, so the
/// original is never left half-written.
pub(crate) fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let temp_path = sibling_temp_path(path);
    let mut temp = File::create(&temp_path)?;
    let result = write(&mut temp);
    drop(temp);

    match result {
        Ok(()) => fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            TagError::Io(e)
        }),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("oxtag"));
    name.push(".tmp");
    path.with_file_name(name)
}
