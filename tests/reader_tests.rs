//! Reading input files from disk: encodings, BOMs and broken files

use csv2xlsx::diagnostics::MemoryDiagnostics;
use csv2xlsx::reader::read_rows;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use tracing::Level;

fn write_bytes(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_windows_1255_input_decoded() {
    let dir = TempDir::new().unwrap();
    let (bytes, _, _) = encoding_rs::WINDOWS_1255.encode("שם,כמות\nשלום,3\n");
    let path = write_bytes(&dir, "hebrew.csv", &bytes);
    let diag = MemoryDiagnostics::new();

    let rows = read_rows(&path, Some("windows-1255"), ',', &diag).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("שם").map(String::as_str), Some("שלום"));
    assert_eq!(rows[0].get("כמות").map(String::as_str), Some("3"));
    assert!(diag.messages_at(Level::WARN).is_empty());
}

#[test]
fn test_unknown_encoding_reads_as_utf8_with_warning() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(&dir, "plain.csv", "name\nZoë\n".as_bytes());
    let diag = MemoryDiagnostics::new();

    let fallback = read_rows(&path, Some("klingon-8"), ',', &diag).unwrap();
    let utf8 = read_rows(&path, Some("utf-8"), ',', &MemoryDiagnostics::new()).unwrap();

    assert_eq!(fallback, utf8);
    let warnings = diag.messages_at(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("klingon-8"));
}

#[test]
fn test_utf8_bom_not_part_of_first_header() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"id,name\n7,x\n");
    let path = write_bytes(&dir, "bom.csv", &bytes);

    let rows = read_rows(&path, None, ',', &MemoryDiagnostics::new()).unwrap();

    assert_eq!(rows[0].get("id").map(String::as_str), Some("7"));
}

#[test]
fn test_semicolon_delimiter_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(&dir, "semi.csv", b"a;b\r\n1;2,5\r\n");

    let rows = read_rows(&path, None, ';', &MemoryDiagnostics::new()).unwrap();

    assert_eq!(rows[0].get("b").map(String::as_str), Some("2,5"));
}

#[test]
fn test_empty_file_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(&dir, "empty.csv", b"");

    let err = read_rows(&path, None, ',', &MemoryDiagnostics::new()).unwrap_err();

    assert!(err.is_format());
    assert!(err.to_string().contains("empty.csv"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    let err = read_rows(&dir.path().join("gone.csv"), None, ',', &MemoryDiagnostics::new())
        .unwrap_err();

    assert!(err.is_io());
    assert!(err.to_string().contains("gone.csv"));
}
