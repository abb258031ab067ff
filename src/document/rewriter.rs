/*!
 * Format-preserving write-back of translated units.
 *
 * Each translated paragraph keeps its paragraph properties and the properties of
 * its leading run. The whole translation goes into the first text element; the
 * other text elements of the paragraph are emptied but stay in place. Parts with
 * no translated paragraph are copied byte-for-byte.
 */

use log::debug;
use quick_xml::events::Event;
use std::collections::HashMap;

use crate::document::markup::{Dialect, MarkupPart, Patch, attribute_value, with_attribute};
use crate::document::{ParsedDocument, TranslationUnit};
use crate::errors::DocumentError;

/// DrawingML default run size when `sz` is absent, in hundredths of a point
pub const DEFAULT_FONT_SIZE: u32 = 1800;

/// Smallest size auto-fit may shrink a run to
pub const MIN_FONT_SIZE: u32 = 800;

/// Rewrites translated units into their document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPreservingRewriter {
    /// Shrink slide fonts when the translation is visibly wider than the original
    pub auto_fit_font: bool,
}

impl Default for FormatPreservingRewriter {
    fn default() -> Self {
        Self { auto_fit_font: true }
    }
}

impl FormatPreservingRewriter {
    pub fn new(auto_fit_font: bool) -> Self {
        Self { auto_fit_font }
    }

    /// Apply `units` to `document` and repackage it
    pub fn rewrite(&self, document: ParsedDocument, units: &[TranslationUnit]) -> Result<Vec<u8>, DocumentError> {
        let (mut container, parts) = document.into_parts();

        let mut by_part: HashMap<&str, Vec<&TranslationUnit>> = HashMap::new();
        for unit in units {
            by_part.entry(unit.path.part.as_str()).or_default().push(unit);
        }

        for part in &parts {
            let Some(part_units) = by_part.get(part.name()) else {
                continue;
            };

            let patches = self.part_patches(part, part_units)?;
            if patches.is_empty() {
                continue;
            }

            debug!("Rewriting {} paragraphs in {}", part_units.len(), part.name());
            container.replace(part.name(), part.serialize(&patches)?)?;
        }

        container.write()
    }

    fn part_patches(
        &self,
        part: &MarkupPart,
        units: &[&TranslationUnit],
    ) -> Result<HashMap<usize, Patch>, DocumentError> {
        let dialect = part.dialect();
        let mut patches = HashMap::new();

        for unit in units {
            let paragraph = part.paragraphs().get(unit.path.paragraph).ok_or_else(|| {
                DocumentError::Write(format!(
                    "Unit {} points to missing paragraph {} in {}",
                    unit.index,
                    unit.path.paragraph,
                    part.name()
                ))
            })?;

            let Some((first, rest)) = paragraph.text_nodes.split_first() else {
                continue;
            };

            let first_start = part
                .start_tag(first.open)
                .ok_or_else(|| DocumentError::Write(format!("Text element missing in {}", part.name())))?;
            let start = if dialect.preserve_space
                && attribute_value(first_start, "xml:space").as_deref() != Some("preserve")
            {
                with_attribute(first_start, "xml:space", "preserve")
            } else {
                first_start.clone()
            };
            patches.insert(
                first.open,
                Patch::Text {
                    node: *first,
                    start,
                    content: unit.output_text().to_string(),
                },
            );

            for node in rest.iter().filter(|node| !node.is_self_closing()) {
                if let Some(start) = part.start_tag(node.open) {
                    patches.insert(
                        node.open,
                        Patch::Text {
                            node: *node,
                            start: start.clone(),
                            content: String::new(),
                        },
                    );
                }
            }

            if self.auto_fit_font && dialect == Dialect::DRAWING {
                if let Some(properties) = paragraph.lead_run_properties {
                    if let Some(patch) = fit_font_size(part, properties, &unit.original_text, unit.output_text()) {
                        patches.insert(properties, patch);
                    }
                }
            }
        }

        Ok(patches)
    }
}

/// Estimated rendering width of `text`; wide glyphs count double
pub fn visual_width(text: &str) -> f64 {
    text.chars()
        .map(|c| match c {
            '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}' => 2.0,
            'A'..='Z' => 1.2,
            _ => 1.0,
        })
        .sum()
}

/// New run size after translating `original` into `translated`, if it must shrink
pub fn fitted_font_size(current: u32, original: &str, translated: &str) -> Option<u32> {
    let original_width = visual_width(original);
    let ratio = visual_width(translated) / if original_width > 0.0 { original_width } else { 1.0 };

    let reduced = if ratio > 1.25 {
        current.saturating_sub(400)
    } else if ratio > 1.1 {
        current.saturating_sub(200)
    } else {
        current
    };
    let reduced = reduced.max(MIN_FONT_SIZE);

    (reduced < current).then_some(reduced)
}

fn fit_font_size(part: &MarkupPart, properties: usize, original: &str, translated: &str) -> Option<Patch> {
    let start = part.start_tag(properties)?;
    let current = attribute_value(start, "sz")
        .and_then(|sz| sz.trim().parse().ok())
        .unwrap_or(DEFAULT_FONT_SIZE);
    let size = fitted_font_size(current, original, translated)?;

    debug!("Shrinking run in {} from {} to {}", part.name(), current, size);
    let updated = with_attribute(&with_attribute(start, "sz", &size.to_string()), "dirty", "0");
    match part.event(properties)? {
        Event::Empty(_) => Some(Patch::Tag(Event::Empty(updated))),
        _ => Some(Patch::Tag(Event::Start(updated))),
    }
}
