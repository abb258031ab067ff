/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use doclingo::document::DocumentFormat;
use doclingo::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files only
#[test]
fn test_fileExists_shouldDistinguishFilesAndDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "report.docx", b"data")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists("non_existent_file.docx"));
    Ok(())
}

/// Test that the output sits next to the input with the language suffix
#[test]
fn test_generateOutputPath_shouldSuffixStem() {
    let output = FileManager::generate_output_path(Path::new("/tmp/input/q3 review.pptx"), "pt-BR");

    assert_eq!(output, Path::new("/tmp/input/q3 review_pt-BR.pptx"));
}

/// Test that documents are found recursively, sorted, and lock files ignored
#[test]
fn test_findDocuments_shouldListSupportedFilesOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested)?;
    common::create_test_file(temp_dir.path(), "b.docx", b"")?;
    common::create_test_file(temp_dir.path(), "a.PPTX", b"")?;
    common::create_test_file(temp_dir.path(), "~$b.docx", b"")?;
    common::create_test_file(temp_dir.path(), "notes.txt", b"")?;
    common::create_test_file(&nested, "c.docx", b"")?;

    let documents = FileManager::find_documents(temp_dir.path())?;
    let names: Vec<String> = documents
        .iter()
        .map(|path| path.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.PPTX", "b.docx", "nested/c.docx"]);
    Ok(())
}

/// Test that write_bytes creates missing parent directories
#[test]
fn test_writeBytes_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("deck_fr.pptx");

    FileManager::write_bytes(&path, b"zip")?;

    assert_eq!(FileManager::read_bytes(&path)?, b"zip");
    Ok(())
}

/// Test format detection from extensions
#[test]
fn test_detectDocumentFormat_shouldUseExtension() {
    assert_eq!(FileManager::detect_document_format("deck.pptx"), Some(DocumentFormat::Pptx));
    assert_eq!(FileManager::detect_document_format("report.doc"), None);
}

/// Test that read_bytes reports missing files
#[test]
fn test_readBytes_missingFile_shouldFail() {
    assert!(FileManager::read_bytes("definitely_missing.docx").is_err());
}
