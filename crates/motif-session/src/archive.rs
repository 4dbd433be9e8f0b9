//! Single-entry zip archives for session export/import

use std::io::{Cursor, Read, Write};

use crate::error::SessionError;
use crate::Result;

/// A ready-to-download archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArchive {
    /// Suggested download file name, e.g. `MotifNotebook-Chapter 1.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Build a zip holding one text entry.
pub fn write_single_entry(entry_name: &str, text: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut writer = zip::ZipWriter::new(cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        writer.start_file(entry_name, options)?;
        writer.write_all(text.as_bytes())?;
        writer.finish()?;
    }
    Ok(buf)
}

/// Read the first entry of a zip as UTF-8 text. Returns `(entry_name, text)`.
pub fn read_first_entry(bytes: &[u8]) -> Result<(String, String)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() == 0 {
        return Err(SessionError::Archive("archive contains no entries".to_string()));
    }

    let mut file = archive.by_index(0)?;
    let name = file.name().to_string();

    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| SessionError::Archive(format!("failed to read {name}: {e}")))?;

    Ok((name, text))
}

/// Session name for an imported archive: the uploaded file name without its
/// `.zip` suffix, else the entry's file stem, else a fixed fallback.
pub fn derive_import_name(suggested: &str, entry_name: &str) -> String {
    let trimmed = suggested.trim();
    let from_file = trimmed.strip_suffix(".zip").unwrap_or(trimmed).trim();
    if !from_file.is_empty() {
        return from_file.to_string();
    }

    let stem = std::path::Path::new(entry_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .unwrap_or("");
    if !stem.is_empty() {
        return stem.to_string();
    }

    "Imported Session".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry_roundtrip() {
        let bytes = write_single_entry("Chapter 1.json", "{\"oracle\":\"<p>é</p>\"}").unwrap();
        let (name, text) = read_first_entry(&bytes).unwrap();
        assert_eq!(name, "Chapter 1.json");
        assert_eq!(text, "{\"oracle\":\"<p>é</p>\"}");
    }

    #[test]
    fn test_rejects_non_zip() {
        let err = read_first_entry(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, SessionError::Archive(_)));
    }

    #[test]
    fn test_rejects_empty_archive() {
        let mut buf = Vec::new();
        zip::ZipWriter::new(Cursor::new(&mut buf)).finish().unwrap();
        let err = read_first_entry(&buf).unwrap_err();
        assert!(matches!(err, SessionError::Archive(_)));
    }

    #[test]
    fn test_derive_import_name() {
        assert_eq!(derive_import_name("MotifNotebook-Chapter 1.zip", "x.json"), "MotifNotebook-Chapter 1");
        assert_eq!(derive_import_name("notes", "x.json"), "notes");
        assert_eq!(derive_import_name("", "Chapter 2.json"), "Chapter 2");
        assert_eq!(derive_import_name(".zip", ""), "Imported Session");
    }
}
