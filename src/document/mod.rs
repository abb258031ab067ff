/*!
 * Document model for OOXML translation.
 *
 * This module maps a document container to ordered translation units and back:
 * - `container`: zip packaging
 * - `markup`: paragraph/run/text index over one XML part
 * - `rewriter`: writes translated units back into the parts
 * - `fonts`: global typeface replacement for slide decks
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::errors::DocumentError;

pub mod container;
pub mod fonts;
pub mod markup;
pub mod rewriter;

pub use container::Container;
pub use fonts::replace_fonts;
pub use markup::{Dialect, MarkupPart, Paragraph, TextNode};
pub use rewriter::FormatPreservingRewriter;

/// Primary part of a word-processing document
pub const WORD_DOCUMENT_PART: &str = "word/document.xml";

static SLIDE_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// WordprocessingML (.docx)
    Docx,
    /// PresentationML (.pptx)
    Pptx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Docx => Dialect::WORD,
            Self::Pptx => Dialect::DRAWING,
        }
    }

    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect the format from the container content and list its text parts in order
    pub fn detect(container: &Container) -> Result<(Self, Vec<String>), DocumentError> {
        if container.contains(WORD_DOCUMENT_PART) {
            return Ok((Self::Docx, vec![WORD_DOCUMENT_PART.to_string()]));
        }

        let mut slides: Vec<(u32, String)> = container
            .names()
            .filter_map(|name| {
                SLIDE_PART
                    .captures(name)
                    .and_then(|caps| caps.get(1))
                    .and_then(|number| number.as_str().parse().ok())
                    .map(|number| (number, name.to_string()))
            })
            .collect();

        if slides.is_empty() {
            return Err(DocumentError::UnsupportedFormat(
                "container has neither word/document.xml nor ppt/slides/slideN.xml".to_string(),
            ));
        }

        slides.sort_by_key(|(number, _)| *number);
        Ok((Self::Pptx, slides.into_iter().map(|(_, name)| name).collect()))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Position of a unit inside the document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitPath {
    /// Container part holding the paragraph
    pub part: String,
    /// Ordinal of the paragraph within the part
    pub paragraph: usize,
}

/// One paragraph translated as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Contiguous index in document order
    pub index: usize,
    pub path: UnitPath,
    /// Concatenated text of all runs
    pub original_text: String,
    /// Set by the dispatcher
    pub translated_text: Option<String>,
}

impl TranslationUnit {
    /// Text to write back: the translation if present, the original otherwise
    pub fn output_text(&self) -> &str {
        self.translated_text.as_deref().unwrap_or(&self.original_text)
    }
}

/// A container with its text parts parsed, retained between extraction and rewriting
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    format: DocumentFormat,
    container: Container,
    parts: Vec<MarkupPart>,
}

impl ParsedDocument {
    /// Parse a document container
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let container = Container::read(bytes)?;
        let (format, part_names) = DocumentFormat::detect(&container)?;

        let parts = part_names
            .iter()
            .map(|name| {
                let data = container
                    .part(name)
                    .ok_or_else(|| DocumentError::InvalidInput(format!("Missing part {}", name)))?;
                MarkupPart::parse(name, data, format.dialect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            format,
            container,
            parts,
        })
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Parsed text parts in processing order
    pub fn parts(&self) -> &[MarkupPart] {
        &self.parts
    }

    /// Ordered translation units, one per non-blank paragraph.
    ///
    /// Fails with `NoContent` when no paragraph carries text.
    pub fn extract_units(&self) -> Result<Vec<TranslationUnit>, DocumentError> {
        let mut units = Vec::new();

        for part in &self.parts {
            for (ordinal, paragraph) in part.paragraphs().iter().enumerate() {
                if paragraph.text.trim().is_empty() {
                    continue;
                }
                units.push(TranslationUnit {
                    index: units.len(),
                    path: UnitPath {
                        part: part.name().to_string(),
                        paragraph: ordinal,
                    },
                    original_text: paragraph.text.clone(),
                    translated_text: None,
                });
            }
        }

        if units.is_empty() {
            return Err(DocumentError::NoContent);
        }

        Ok(units)
    }

    pub(crate) fn into_parts(self) -> (Container, Vec<MarkupPart>) {
        (self.container, self.parts)
    }
}

/// Parse `bytes` and extract its units in one step
pub fn extract_units(bytes: &[u8]) -> Result<(ParsedDocument, Vec<TranslationUnit>), DocumentError> {
    let document = ParsedDocument::parse(bytes)?;
    let units = document.extract_units()?;
    Ok((document, units))
}
