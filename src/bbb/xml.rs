//! Small lookups over the XML documents a BBB server publishes.
//!
//! Recording documents are shallow and only a handful of values are read
//! from them, so a streaming pass into plain maps is enough.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Collect the text of every element below the root, keyed by its
/// slash-separated path relative to the root (`meta/bbb-context-name`).
///
/// Elements that are present but empty map to an empty string. Only the
/// first occurrence of a path is recorded.
pub fn element_texts(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    // Whether the element at the same depth is the one whose text we keep.
    let mut recording: Vec<bool> = Vec::new();
    let mut texts: HashMap<String, String> = HashMap::new();

    loop {
        match reader.read_event().context("Malformed XML document")? {
            Event::Start(start) => {
                stack.push(element_name(&start));
                let keep = match relative_path(&stack) {
                    Some(path) if !texts.contains_key(&path) => {
                        texts.insert(path, String::new());
                        true
                    }
                    _ => false,
                };
                recording.push(keep);
            }
            Event::Empty(empty) => {
                stack.push(element_name(&empty));
                if let Some(path) = relative_path(&stack) {
                    texts.entry(path).or_default();
                }
                stack.pop();
            }
            Event::Text(text) => {
                if recording.last().copied().unwrap_or(false) {
                    let value = text.unescape().context("Invalid XML text content")?;
                    append_text(&mut texts, &stack, &value);
                }
            }
            Event::CData(cdata) => {
                if recording.last().copied().unwrap_or(false) {
                    let value = String::from_utf8_lossy(&cdata).into_owned();
                    append_text(&mut texts, &stack, &value);
                }
            }
            Event::End(_) => {
                stack.pop();
                recording.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    for value in texts.values_mut() {
        let trimmed = value.trim();
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
        }
    }

    Ok(texts)
}

/// Attributes of every direct child of the root named `name`, in document order.
pub fn child_attributes(xml: &str, name: &str) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut found = Vec::new();

    loop {
        match reader.read_event().context("Malformed XML document")? {
            Event::Start(start) => {
                if depth == 1 && element_name(&start) == name {
                    found.push(attributes(&start)?);
                }
                depth += 1;
            }
            Event::Empty(empty) => {
                if depth == 1 && element_name(&empty) == name {
                    found.push(attributes(&empty)?);
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn relative_path(stack: &[String]) -> Option<String> {
    if stack.len() < 2 {
        return None;
    }
    Some(stack[1..].join("/"))
}

fn append_text(texts: &mut HashMap<String, String>, stack: &[String], value: &str) {
    if let Some(path) = relative_path(stack) {
        if let Some(entry) = texts.get_mut(&path) {
            entry.push_str(value);
        }
    }
}

fn attributes(start: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.context("Malformed XML attribute")?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .with_context(|| format!("Invalid value for attribute {key}"))?
            .into_owned();
        values.insert(key, value);
    }
    Ok(values)
}
