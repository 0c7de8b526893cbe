//! Binary extraction from a downloaded release asset.
//!
//! An asset is either a gzip-compressed tar archive holding the executable
//! or the executable itself.

use crate::error::{UpdateError, UpdateResult};
use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use tar::Archive;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extract the executable from `bytes`.
///
/// Non-gzip input is returned unchanged. Gzip input is read as a tar
/// archive and the first regular file whose base name starts with `prefix`
/// is returned.
pub fn extract_binary(bytes: Vec<u8>, prefix: &str) -> UpdateResult<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        debug!(size = bytes.len(), "Asset is not gzip, using it as the binary");
        return Ok(bytes);
    }

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(bytes)));
    let entries = archive
        .entries()
        .map_err(|e| UpdateError::extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| UpdateError::extract(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let matches = {
            let path = entry
                .path()
                .map_err(|e| UpdateError::extract(e.to_string()))?;
            debug!(entry = %path.display(), "Inspecting archive entry");
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix))
        };

        if matches {
            let mut binary = Vec::new();
            entry
                .read_to_end(&mut binary)
                .map_err(|e| UpdateError::extract(e.to_string()))?;
            return Ok(binary);
        }
    }

    Err(UpdateError::BinaryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_raw_binary_passes_through() {
        let raw = b"\x7fELF raw binary".to_vec();
        assert_eq!(extract_binary(raw.clone(), "mysql-mcp").unwrap(), raw);
    }

    #[test]
    fn test_finds_entry_by_base_name() {
        let archive = tar_gz(&[
            ("README.md", "docs"),
            ("dist/mysql-mcp", "new binary"),
        ]);
        assert_eq!(
            extract_binary(archive, "mysql-mcp").unwrap(),
            b"new binary".to_vec()
        );
    }

    #[test]
    fn test_missing_entry_is_binary_not_found() {
        let archive = tar_gz(&[("README.md", "docs"), ("LICENSE", "mit")]);
        assert!(matches!(
            extract_binary(archive, "mysql-mcp"),
            Err(UpdateError::BinaryNotFound)
        ));
    }

    #[test]
    fn test_corrupt_gzip_is_extract_error() {
        let bytes = vec![0x1f, 0x8b, 0x00, 0x01, 0x02];
        assert!(matches!(
            extract_binary(bytes, "mysql-mcp"),
            Err(UpdateError::Extract { .. })
        ));
    }
}
