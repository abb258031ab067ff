/*!
 * Event-level view of one XML part with a paragraph/run/text index.
 *
 * The part is kept as the flat list of parser events. Serializing writes every
 * event back unchanged except the ones that were explicitly patched, so markup the
 * engine does not understand survives a round trip.
 */

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

use crate::errors::DocumentError;

/// Element names of one OOXML text vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub paragraph: &'static str,
    pub run: &'static str,
    pub run_properties: &'static str,
    pub text: &'static str,
    /// Whether text elements accept `xml:space="preserve"`
    pub preserve_space: bool,
}

impl Dialect {
    /// WordprocessingML (`word/document.xml`)
    pub const WORD: Dialect = Dialect {
        paragraph: "w:p",
        run: "w:r",
        run_properties: "w:rPr",
        text: "w:t",
        preserve_space: true,
    };

    /// DrawingML text bodies (slides, masters, layouts)
    pub const DRAWING: Dialect = Dialect {
        paragraph: "a:p",
        run: "a:r",
        run_properties: "a:rPr",
        text: "a:t",
        preserve_space: false,
    };
}

/// Location of one text element in the event list.
///
/// `open == close` for a self-closing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNode {
    pub open: usize,
    pub close: usize,
}

impl TextNode {
    pub fn is_self_closing(&self) -> bool {
        self.open == self.close
    }
}

/// Text content of one paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Text elements in document order
    pub text_nodes: Vec<TextNode>,
    /// Concatenated (unescaped) text of all text elements
    pub text: String,
    /// Event index of the run properties of the run holding the first text element
    pub lead_run_properties: Option<usize>,
}

/// Replacement for part of the event list
#[derive(Debug, Clone)]
pub enum Patch {
    /// Rewrite a whole text element with a new start tag and content
    Text {
        node: TextNode,
        start: BytesStart<'static>,
        content: String,
    },
    /// Replace a single start or self-closing tag
    Tag(Event<'static>),
}

enum Frame {
    Paragraph(usize),
    Run { properties: Option<usize> },
    Other,
}

/// One parsed XML part
#[derive(Debug, Clone)]
pub struct MarkupPart {
    name: String,
    dialect: Dialect,
    events: Vec<Event<'static>>,
    paragraphs: Vec<Paragraph>,
}

impl MarkupPart {
    /// Parse `bytes` and index its paragraphs
    pub fn parse(name: &str, bytes: &[u8], dialect: Dialect) -> Result<Self, DocumentError> {
        let invalid = |detail: String| DocumentError::InvalidInput(format!("{}: {}", name, detail));

        let xml = std::str::from_utf8(bytes).map_err(|e| invalid(e.to_string()))?;
        let mut reader = Reader::from_str(xml);

        let mut events: Vec<Event<'static>> = Vec::new();
        let mut paragraphs: Vec<Paragraph> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        // (paragraph, event index of the open text element)
        let mut open_text: Option<(usize, usize)> = None;

        loop {
            let event = reader.read_event().map_err(|e| invalid(e.to_string()))?;
            let index = events.len();

            match &event {
                Event::Eof => break,
                Event::Start(start) => {
                    let qname = start.name();
                    let tag = qname.as_ref();
                    if tag == dialect.paragraph.as_bytes() {
                        paragraphs.push(Paragraph::default());
                        stack.push(Frame::Paragraph(paragraphs.len() - 1));
                    } else if tag == dialect.run.as_bytes() {
                        stack.push(Frame::Run { properties: None });
                    } else {
                        if tag == dialect.run_properties.as_bytes() {
                            mark_run_properties(&mut stack, index);
                        } else if tag == dialect.text.as_bytes() {
                            if let Some(paragraph) = innermost_paragraph(&stack) {
                                open_text = Some((paragraph, index));
                            }
                        }
                        stack.push(Frame::Other);
                    }
                }
                Event::Empty(start) => {
                    let qname = start.name();
                    let tag = qname.as_ref();
                    if tag == dialect.run_properties.as_bytes() {
                        mark_run_properties(&mut stack, index);
                    } else if tag == dialect.text.as_bytes() {
                        if let Some(paragraph) = innermost_paragraph(&stack) {
                            let lead = enclosing_run_properties(&stack);
                            add_text_node(&mut paragraphs[paragraph], TextNode { open: index, close: index }, lead);
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some((paragraph, _)) = open_text {
                        let content = text.unescape().map_err(|e| invalid(e.to_string()))?;
                        paragraphs[paragraph].text.push_str(&content);
                    }
                }
                Event::CData(data) => {
                    if let Some((paragraph, _)) = open_text {
                        paragraphs[paragraph].text.push_str(&String::from_utf8_lossy(data));
                    }
                }
                Event::End(end) => {
                    stack.pop();
                    if let Some((paragraph, open)) = open_text {
                        if end.name().as_ref() == dialect.text.as_bytes() {
                            let lead = enclosing_run_properties(&stack);
                            add_text_node(&mut paragraphs[paragraph], TextNode { open, close: index }, lead);
                            open_text = None;
                        }
                    }
                }
                _ => {}
            }

            events.push(event.into_owned());
        }

        Ok(Self {
            name: name.to_string(),
            dialect,
            events,
            paragraphs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Paragraphs in document order (by opening tag)
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// All events with their indices
    pub fn events(&self) -> impl Iterator<Item = (usize, &Event<'static>)> {
        self.events.iter().enumerate()
    }

    pub fn event(&self, index: usize) -> Option<&Event<'static>> {
        self.events.get(index)
    }

    /// The start tag at `index`, for start and self-closing events
    pub fn start_tag(&self, index: usize) -> Option<&BytesStart<'static>> {
        match self.events.get(index) {
            Some(Event::Start(start)) | Some(Event::Empty(start)) => Some(start),
            _ => None,
        }
    }

    /// Write the part back, applying `patches` keyed by event index
    pub fn serialize(&self, patches: &HashMap<usize, Patch>) -> Result<Vec<u8>, DocumentError> {
        let write_error = |e: quick_xml::Error| DocumentError::Write(format!("{}: {}", self.name, e));
        let mut writer = Writer::new(Vec::with_capacity(self.events.iter().map(event_len).sum()));
        let mut skip_through: Option<usize> = None;

        for (index, event) in self.events.iter().enumerate() {
            if let Some(last) = skip_through {
                if index <= last {
                    continue;
                }
                skip_through = None;
            }

            match patches.get(&index) {
                Some(Patch::Text { node, start, content }) => {
                    writer.write_event(Event::Start(start.clone())).map_err(write_error)?;
                    if !content.is_empty() {
                        writer
                            .write_event(Event::Text(BytesText::new(content)))
                            .map_err(write_error)?;
                    }
                    writer.write_event(Event::End(start.to_end())).map_err(write_error)?;
                    skip_through = Some(node.close);
                }
                Some(Patch::Tag(replacement)) => {
                    writer.write_event(replacement).map_err(write_error)?;
                }
                None => {
                    writer.write_event(event).map_err(write_error)?;
                }
            }
        }

        Ok(writer.into_inner())
    }
}

fn innermost_paragraph(stack: &[Frame]) -> Option<usize> {
    stack.iter().rev().find_map(|frame| match frame {
        Frame::Paragraph(index) => Some(*index),
        _ => None,
    })
}

// Run properties of the innermost run inside the innermost paragraph
fn enclosing_run_properties(stack: &[Frame]) -> Option<usize> {
    for frame in stack.iter().rev() {
        match frame {
            Frame::Run { properties } => return *properties,
            Frame::Paragraph(_) => return None,
            Frame::Other => {}
        }
    }
    None
}

// Only a direct child of a run counts (paragraph-mark properties live in pPr)
fn mark_run_properties(stack: &mut [Frame], index: usize) {
    if let Some(Frame::Run { properties }) = stack.last_mut() {
        if properties.is_none() {
            *properties = Some(index);
        }
    }
}

fn add_text_node(paragraph: &mut Paragraph, node: TextNode, run_properties: Option<usize>) {
    if paragraph.text_nodes.is_empty() {
        paragraph.lead_run_properties = run_properties;
    }
    paragraph.text_nodes.push(node);
}

fn event_len(event: &Event<'_>) -> usize {
    match event {
        Event::Start(e) | Event::Empty(e) => e.len() + 3,
        Event::End(e) => e.len() + 3,
        Event::Text(e) => e.len(),
        _ => 16,
    }
}

/// Read an attribute value (unescaped)
pub fn attribute_value(start: &BytesStart<'_>, key: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

/// Copy of `start` with `key` set to `value`.
///
/// An existing attribute keeps its position; a new one is appended.
pub fn with_attribute(start: &BytesStart<'_>, key: &str, value: &str) -> BytesStart<'static> {
    let mut updated = BytesStart::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    let mut replaced = false;

    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == key.as_bytes() {
            updated.push_attribute((key, value));
            replaced = true;
        } else {
            updated.push_attribute(attr);
        }
    }
    if !replaced {
        updated.push_attribute((key, value));
    }

    updated
}
