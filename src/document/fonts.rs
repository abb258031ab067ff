/*!
 * Global typeface replacement for slide decks.
 *
 * Sets the `typeface` of every Latin, East Asian and complex-script font
 * reference in slides, slide masters and slide layouts.
 */

use log::info;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use regex::Regex;
use std::collections::HashMap;

use crate::document::container::Container;
use crate::document::markup::{Dialect, MarkupPart, Patch, with_attribute};
use crate::errors::DocumentError;

static FONT_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ppt/(slides/slide|slideMasters/slideMaster|slideLayouts/slideLayout)\d+\.xml$").unwrap()
});

const FONT_ELEMENTS: [&[u8]; 3] = [b"a:latin", b"a:ea", b"a:cs"];

/// Replace every font reference in a slide deck with `typeface`
pub fn replace_fonts(bytes: &[u8], typeface: &str) -> Result<Vec<u8>, DocumentError> {
    let typeface = typeface.trim();
    if typeface.is_empty() {
        return Err(DocumentError::InvalidInput("Replacement font name is empty".to_string()));
    }

    let mut container = Container::read(bytes)?;
    let targets: Vec<String> = container
        .names()
        .filter(|name| FONT_PARTS.is_match(name))
        .map(str::to_string)
        .collect();

    if targets.is_empty() {
        return Err(DocumentError::UnsupportedFormat(
            "font replacement requires a slide deck".to_string(),
        ));
    }

    let mut updated_parts = 0;
    for name in &targets {
        let data = container
            .part(name)
            .ok_or_else(|| DocumentError::InvalidInput(format!("Missing part {}", name)))?;
        let part = MarkupPart::parse(name, data, Dialect::DRAWING)?;

        let patches = font_patches(&part, typeface);
        if patches.is_empty() {
            continue;
        }

        let rewritten = part.serialize(&patches)?;
        container.replace(name, rewritten)?;
        updated_parts += 1;
    }

    info!(
        "Applied font '{}' to {} of {} slide, master and layout parts",
        typeface,
        updated_parts,
        targets.len()
    );
    container.write()
}

fn font_patches(part: &MarkupPart, typeface: &str) -> HashMap<usize, Patch> {
    part.events()
        .filter_map(|(index, event)| {
            let patched = match event {
                Event::Empty(start) if is_font_element(start.name().as_ref()) => {
                    Event::Empty(with_attribute(start, "typeface", typeface))
                }
                Event::Start(start) if is_font_element(start.name().as_ref()) => {
                    Event::Start(with_attribute(start, "typeface", typeface))
                }
                _ => return None,
            };
            Some((index, Patch::Tag(patched)))
        })
        .collect()
}

fn is_font_element(name: &[u8]) -> bool {
    FONT_ELEMENTS.iter().any(|element| *element == name)
}
