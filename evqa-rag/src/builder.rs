//! Rendering records into natural-language documents.
//!
//! The phrasing produced here is what gets embedded, so it bounds how well
//! retrieval can do. The default template folds every vehicle field into one
//! descriptive sentence.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error};

use crate::document::{Document, Record, fields};
use crate::error::{RagError, Result};

/// Template used when none is configured.
pub const VEHICLE_TEMPLATE: &str = "The {make} {model} is a {drive_config} drive with a range of \
                                    {range} km and a price in Germany of €{price}.";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Field(String),
}

/// A sentence template with `{field}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTemplate {
    parts: Vec<Part>,
}

impl DocumentTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] on unbalanced braces or an empty
    /// placeholder.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(RagError::Configuration(format!(
                                    "nested '{{' in template: {source}"
                                )));
                            }
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(RagError::Configuration(format!(
                            "unclosed placeholder in template: {source}"
                        )));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(RagError::Configuration(format!(
                            "empty placeholder in template: {source}"
                        )));
                    }
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Field(name.to_string()));
                }
                '}' => {
                    return Err(RagError::Configuration(format!(
                        "unmatched '}}' in template: {source}"
                    )));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self { parts })
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Field(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Render one record. `position` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingField`] for the first referenced field the
    /// record does not carry.
    pub fn render(&self, record: &Record, position: usize) -> Result<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field(name) => {
                    let value = record.get(name).ok_or_else(|| RagError::MissingField {
                        record: position,
                        field: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl Default for DocumentTemplate {
    /// [`VEHICLE_TEMPLATE`], assembled directly rather than parsed.
    fn default() -> Self {
        let text = |s: &str| Part::Literal(s.to_string());
        let field = |name: &str| Part::Field(name.to_string());
        Self {
            parts: vec![
                text("The "),
                field(fields::MAKE),
                text(" "),
                field(fields::MODEL),
                text(" is a "),
                field(fields::DRIVE_CONFIG),
                text(" drive with a range of "),
                field(fields::RANGE),
                text(" km and a price in Germany of €"),
                field(fields::PRICE),
                text("."),
            ],
        }
    }
}

impl FromStr for DocumentTemplate {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Literal(text) => f.write_str(text)?,
                Part::Field(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}

/// Converts records into one [`Document`] each.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    template: DocumentTemplate,
}

impl DocumentBuilder {
    /// Create a builder with the given template.
    pub fn new(template: DocumentTemplate) -> Self {
        Self { template }
    }

    /// The template in use.
    pub fn template(&self) -> &DocumentTemplate {
        &self.template
    }

    /// Build exactly one document per record, in order.
    ///
    /// Document IDs are `record-{position}`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingField`] on the first incomplete record; no
    /// partial output is returned.
    pub fn build(&self, records: &[Record]) -> Result<Vec<Document>> {
        let documents = records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let text = self.template.render(record, position).inspect_err(|e| {
                    error!(record = position, error = %e, "cannot render record");
                })?;
                Ok(Document { id: format!("record-{position}"), text, record_index: position })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(document_count = documents.len(), "built documents");
        Ok(documents)
    }
}
