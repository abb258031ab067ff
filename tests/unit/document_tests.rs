/*!
 * Tests for unit extraction and format-preserving rewriting
 */

use doclingo::document::{DocumentFormat, FormatPreservingRewriter, ParsedDocument, extract_units, replace_fonts};
use doclingo::errors::DocumentError;
use crate::common;

const STYLED_PARAGRAPH: &str = concat!(
    r#"<w:p><w:pPr><w:jc w:val="center"/><w:rPr><w:i/></w:rPr></w:pPr>"#,
    r#"<w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:color w:val="FF0000"/><w:sz w:val="28"/></w:rPr><w:t>Hello </w:t></w:r>"#,
    r#"<w:r><w:rPr><w:b/></w:rPr><w:t>World</w:t></w:r>"#,
    r#"<w:r><w:t>!</w:t></w:r></w:p>"#
);

/// Test that paragraph text is the concatenation of its runs
#[test]
fn test_extractUnits_shouldConcatenateRuns() {
    let bytes = common::docx(STYLED_PARAGRAPH);

    let (parsed, units) = extract_units(&bytes).unwrap();

    assert_eq!(parsed.format(), DocumentFormat::Docx);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].original_text, "Hello World!");
    assert_eq!(units[0].translated_text, None);
}

/// Test that the translation goes into the first run with its formatting kept byte for byte
#[test]
fn test_rewrite_styledParagraph_shouldKeepLeadRunFormatting() {
    let bytes = common::docx(STYLED_PARAGRAPH);
    let (parsed, mut units) = extract_units(&bytes).unwrap();
    units[0].translated_text = Some("Bonjour Monde!".to_string());

    let rewritten = FormatPreservingRewriter::default().rewrite(parsed, &units).unwrap();
    let part = common::read_part(&rewritten, "word/document.xml");

    let expected = common::word_document_xml(concat!(
        r#"<w:p><w:pPr><w:jc w:val="center"/><w:rPr><w:i/></w:rPr></w:pPr>"#,
        r#"<w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:color w:val="FF0000"/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">Bonjour Monde!</w:t></w:r>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t></w:t></w:r>"#,
        r#"<w:r><w:t></w:t></w:r></w:p>"#
    ));
    assert_eq!(part, expected);
}

/// Test that skipped paragraphs and untouched parts are left byte for byte
#[test]
fn test_rewrite_shouldNotTouchSkippedParagraphsOrOtherParts() {
    let blank = r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t xml:space="preserve">   </w:t></w:r></w:p>"#;
    let body = format!("{}{}", blank, common::word_paragraph(&["Fish &amp; chips"]));
    let bytes = common::docx(&body);
    let (parsed, mut units) = extract_units(&bytes).unwrap();
    assert_eq!(units[0].original_text, "Fish & chips");
    units[0].translated_text = Some("Poisson & frites".to_string());

    let rewritten = FormatPreservingRewriter::default().rewrite(parsed, &units).unwrap();

    let part = common::read_part(&rewritten, "word/document.xml");
    assert!(part.contains(blank));
    assert!(part.contains(r#"<w:t xml:space="preserve">Poisson &amp; frites</w:t>"#));
    assert_eq!(
        common::read_part(&rewritten, "word/styles.xml"),
        common::read_part(&bytes, "word/styles.xml")
    );
    assert_eq!(common::part_names(&rewritten), common::part_names(&bytes));
}

/// Test that untranslated units are written back as their original text
#[test]
fn test_rewrite_withoutTranslation_shouldMergeOriginalText() {
    let bytes = common::docx(&common::word_paragraph(&["Good ", "morning"]));
    let (parsed, units) = extract_units(&bytes).unwrap();

    let rewritten = FormatPreservingRewriter::default().rewrite(parsed, &units).unwrap();
    let (_, reparsed) = extract_units(&rewritten).unwrap();

    assert_eq!(reparsed[0].original_text, "Good morning");
}

/// Test that slide text is extracted across slides and shapes in order
#[test]
fn test_extractUnits_pptx_shouldReadSlidesInOrder() {
    let bytes = common::pptx(&[
        r#"<a:p><a:r><a:t>Title</a:t></a:r></a:p><a:p><a:r><a:t>First </a:t></a:r><a:fld type="slidenum"><a:t>1</a:t></a:fld></a:p>"#,
        r#"<a:p><a:endParaRPr/></a:p><a:p><a:r><a:t>Closing</a:t></a:r></a:p>"#,
    ]);

    let (parsed, units) = extract_units(&bytes).unwrap();
    let texts: Vec<&str> = units.iter().map(|u| u.original_text.as_str()).collect();

    assert_eq!(parsed.format(), DocumentFormat::Pptx);
    assert_eq!(texts, vec!["Title", "First 1", "Closing"]);
    assert_eq!(units[2].path.part, "ppt/slides/slide2.xml");
    assert_eq!(units[2].path.paragraph, 1);
}

/// Test that a longer slide translation shrinks the leading run
#[test]
fn test_rewrite_pptxAutoFit_shouldShrinkLeadRun() {
    let bytes = common::pptx(&[r#"<a:p><a:r><a:rPr lang="en-US" sz="2000"/><a:t>Hi there</a:t></a:r></a:p>"#]);
    let (parsed, mut units) = extract_units(&bytes).unwrap();
    units[0].translated_text = Some("Bonjour tout le monde".to_string());

    let rewritten = FormatPreservingRewriter::new(true).rewrite(parsed, &units).unwrap();
    let slide = common::read_part(&rewritten, "ppt/slides/slide1.xml");

    assert!(slide.contains(r#"<a:rPr lang="en-US" sz="1600" dirty="0"/><a:t>Bonjour tout le monde</a:t>"#));
}

/// Test that auto-fit can be turned off
#[test]
fn test_rewrite_pptxAutoFitDisabled_shouldKeepSize() {
    let bytes = common::pptx(&[r#"<a:p><a:r><a:rPr lang="en-US" sz="2000"/><a:t>Hi there</a:t></a:r></a:p>"#]);
    let (parsed, mut units) = extract_units(&bytes).unwrap();
    units[0].translated_text = Some("Bonjour tout le monde".to_string());

    let rewritten = FormatPreservingRewriter::new(false).rewrite(parsed, &units).unwrap();
    let slide = common::read_part(&rewritten, "ppt/slides/slide1.xml");

    assert!(slide.contains(r#"<a:rPr lang="en-US" sz="2000"/><a:t>Bonjour tout le monde</a:t>"#));
}

/// Test that an archive that is not a zip file is invalid input
#[test]
fn test_parse_notAZip_shouldBeInvalidInput() {
    let result = ParsedDocument::parse(b"plain text, not a container");

    assert!(matches!(result, Err(DocumentError::InvalidInput(_))));
}

/// Test that a document with only blank paragraphs has no content
#[test]
fn test_extractUnits_blankDocument_shouldBeNoContent() {
    let bytes = common::docx(&common::word_paragraph(&[" ", "  "]));

    assert!(matches!(extract_units(&bytes), Err(DocumentError::NoContent)));
}

/// Test that every font reference of a deck is replaced
#[test]
fn test_replaceFonts_shouldPatchSlidesMastersAndLayouts() {
    let master = format!(
        r#"<p:sldMaster xmlns:a="{}" xmlns:p="{}"><a:latin typeface="+mj-lt"/><a:ea typeface=""/></p:sldMaster>"#,
        common::DRAWING_NAMESPACE,
        common::PRESENTATION_NAMESPACE
    );
    let slide = common::slide_xml(r#"<a:p><a:r><a:rPr><a:cs typeface="Arial"/></a:rPr><a:t>Hi</a:t></a:r></a:p>"#);
    let bytes = common::package(&[
        ("ppt/slides/slide1.xml", slide),
        ("ppt/slideMasters/slideMaster1.xml", master),
        ("ppt/theme/theme1.xml", r#"<a:theme><a:latin typeface="Calibri"/></a:theme>"#.to_string()),
    ]);

    let rewritten = replace_fonts(&bytes, "Noto Sans").unwrap();

    assert!(common::read_part(&rewritten, "ppt/slides/slide1.xml").contains(r#"<a:cs typeface="Noto Sans"/>"#));
    let master = common::read_part(&rewritten, "ppt/slideMasters/slideMaster1.xml");
    assert!(master.contains(r#"<a:latin typeface="Noto Sans"/><a:ea typeface="Noto Sans"/>"#));
    assert!(common::read_part(&rewritten, "ppt/theme/theme1.xml").contains("Calibri"));
}

/// Test that font replacement rejects Word documents and blank names
#[test]
fn test_replaceFonts_invalidArguments_shouldFail() {
    let deck = common::pptx(&["<a:p><a:r><a:t>Hi</a:t></a:r></a:p>"]);
    assert!(matches!(replace_fonts(&deck, "  "), Err(DocumentError::InvalidInput(_))));

    let document = common::docx(&common::word_paragraph(&["Hi"]));
    assert!(matches!(
        replace_fonts(&document, "Noto Sans"),
        Err(DocumentError::UnsupportedFormat(_))
    ));
}
