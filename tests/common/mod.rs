/*!
 * Common test utilities for the doclingo test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use zip::ZipArchive;
use zip::write::FileOptions;

use doclingo::app_config::{Config, ProviderKind};
use doclingo::providers::mock::MockProvider;
use doclingo::translation::{DispatchOptions, RetryPolicy, TranslationClient};

pub const WORD_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const DRAWING_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const PRESENTATION_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Routes library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Packages `parts` into an in-memory zip container
pub fn package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The main part of a Word document whose body is `body`
pub fn word_document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        WORD_NAMESPACE, body
    )
}

/// A minimal .docx package whose body is `body`
pub fn docx(body: &str) -> Vec<u8> {
    package(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#
                .to_string(),
        ),
        ("word/document.xml", word_document_xml(body)),
        ("word/styles.xml", format!(r#"<w:styles xmlns:w="{}"/>"#, WORD_NAMESPACE)),
    ])
}

/// A slide whose text body is `body`
pub fn slide_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="{}" xmlns:p="{}"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
        DRAWING_NAMESPACE, PRESENTATION_NAMESPACE, body
    )
}

/// A minimal .pptx package with one slide per entry of `slides`
pub fn pptx(slides: &[&str]) -> Vec<u8> {
    let names: Vec<String> = (1..=slides.len())
        .map(|number| format!("ppt/slides/slide{}.xml", number))
        .collect();
    let mut parts = vec![(
        "ppt/presentation.xml",
        format!(r#"<p:presentation xmlns:p="{}"/>"#, PRESENTATION_NAMESPACE),
    )];
    for (name, body) in names.iter().zip(slides) {
        parts.push((name.as_str(), slide_xml(body)));
    }
    package(&parts)
}

/// A Word paragraph with one plain run per text
pub fn word_paragraph(texts: &[&str]) -> String {
    let runs: String = texts
        .iter()
        .map(|text| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text))
        .collect();
    format!("<w:p>{}</w:p>", runs)
}

/// Reads one part of a container as text
pub fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

/// Names of the parts of a container, in order
pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|index| archive.by_index(index).unwrap().name().to_string())
        .collect()
}

/// A retry policy fast enough for unit tests
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::ZERO,
        rate_limit_floor: Duration::from_millis(1),
        max_reset_wait: Duration::from_millis(10),
    }
}

/// A client around a mock provider with a fast retry policy
pub fn mock_client(provider: &MockProvider) -> TranslationClient {
    TranslationClient::new(Arc::new(provider.clone()), fast_policy(3))
}

/// Dispatcher pacing without delays
pub fn immediate_options(batch_size: usize) -> DispatchOptions {
    DispatchOptions {
        batch_size,
        min_inter_unit_delay: Duration::ZERO,
    }
}

/// A valid configuration for a local provider that needs no API key
pub fn local_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = ProviderKind::Ollama;
    config.translation.common.inter_unit_delay_ms = 0;
    config
}
