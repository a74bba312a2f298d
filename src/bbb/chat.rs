use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::time::Duration;

use super::xml::child_attributes;

const CHAT_ELEMENT: &str = "chattimeline";

/// A single public chat message and when it was posted, relative to the
/// start of the recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub name: String,
    pub message: String,
    pub timestamp: Duration,
}

impl ChatEntry {
    /// Parse every `<chattimeline>` entry of a `slides_new.xml` document.
    pub fn from_xml(xml: &str) -> Result<Vec<Self>> {
        child_attributes(xml, CHAT_ELEMENT)
            .context("Failed to parse chat transcript")?
            .iter()
            .map(Self::from_attributes)
            .collect()
    }

    fn from_attributes(attributes: &HashMap<String, String>) -> Result<Self> {
        let attribute = |key: &str| {
            attributes
                .get(key)
                .ok_or_else(|| anyhow!("Chat entry is missing the \"{key}\" attribute"))
        };

        let raw_in = attribute("in")?;
        let seconds: f64 = raw_in
            .trim()
            .parse()
            .with_context(|| format!("Invalid chat timestamp \"{raw_in}\""))?;
        let timestamp = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("Chat timestamp \"{raw_in}\" is out of range"))?;

        Ok(Self {
            name: attribute("name")?.clone(),
            message: attribute("message")?.clone(),
            timestamp,
        })
    }
}
