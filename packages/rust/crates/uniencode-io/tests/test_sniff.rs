//! Tests for sniff module - binary sniffers over files on disk.

use tempfile::TempDir;

use uniencode_io::{BinarySniffer, ContentSniffer, FileCommandSniffer, IoError};

#[test]
fn test_content_sniffer_text_and_binary() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("notes.txt");
    let blob = dir.path().join("image.bin");
    std::fs::write(&text, "line one\nline two\n").unwrap();
    std::fs::write(&blob, [0x89, b'P', b'N', b'G', 0x00, 0x1a]).unwrap();

    assert!(!ContentSniffer.is_binary(&text).unwrap());
    assert!(ContentSniffer.is_binary(&blob).unwrap());
}

#[test]
fn test_content_sniffer_missing_file() {
    let result = ContentSniffer.is_binary(std::path::Path::new("/nonexistent/x.txt"));
    assert!(matches!(result, Err(IoError::System(_))));
}

#[cfg(unix)]
#[test]
fn test_file_command_sniffer_missing_program() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "hello\n").unwrap();

    let sniffer = FileCommandSniffer::with_program("uniencode-no-such-file-utility");
    assert!(matches!(
        sniffer.is_binary(&text),
        Err(IoError::Probe { .. })
    ));
}

#[cfg(windows)]
#[test]
fn test_file_command_sniffer_never_binary_on_windows() {
    let dir = TempDir::new().unwrap();
    let blob = dir.path().join("image.bin");
    std::fs::write(&blob, [0u8; 16]).unwrap();
    assert!(!FileCommandSniffer::new().is_binary(&blob).unwrap());
}
