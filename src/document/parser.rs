//! XHTML parsing into the arena tree
//!
//! Whitespace-only text between elements is kept, so sibling indices line up
//! with what a browser DOM reports for the same markup.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Document, NodeId};
use crate::error::DocumentError;
use crate::tree::Tree;

/// Parse an XHTML (well-formed XML) fragment or document
pub fn parse(source: &str) -> Result<Document, DocumentError> {
    let mut reader = Reader::from_str(source);
    reader.trim_text(false);

    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];

    loop {
        let parent = stack.last().copied().unwrap_or_else(|| doc.root());
        match reader.read_event()? {
            Event::Start(e) => {
                let (name, attributes) = element_parts(&e)?;
                let id = doc.append_element(parent, name, attributes);
                stack.push(id);
            }
            Event::Empty(e) => {
                let (name, attributes) = element_parts(&e)?;
                doc.append_element(parent, name, attributes);
            }
            Event::End(e) => {
                if stack.len() <= 1 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(DocumentError::Unbalanced(name));
                }
                stack.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if !text.is_empty() {
                    doc.append_text(parent, text.into_owned());
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                if !text.is_empty() {
                    doc.append_text(parent, text);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    Ok(doc)
}

fn element_parts(e: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>), DocumentError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok((name, attributes))
}
