//! Data types for records, documents, segments, and query results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical field names used by the default vehicle template.
pub mod fields {
    /// Manufacturer, e.g. `Tesla`.
    pub const MAKE: &str = "make";
    /// Model name, e.g. `Model 3`.
    pub const MODEL: &str = "model";
    /// Drive configuration, e.g. `RWD`.
    pub const DRIVE_CONFIG: &str = "drive_config";
    /// Range in kilometres.
    pub const RANGE: &str = "range";
    /// Price in euros.
    pub const PRICE: &str = "price";
    /// Combined make and model text some exports carry instead of `make`.
    pub const TITLE: &str = "title";
}

/// One normalized row of the vehicle dataset.
///
/// Cells are kept as text keyed by canonical column name. Empty cells are
/// never stored, so [`Record::get`] returning `None` means the field is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a complete vehicle record from typed values.
    pub fn vehicle(
        make: impl Into<String>,
        model: impl Into<String>,
        drive_config: impl Into<String>,
        range_km: f64,
        price_eur: f64,
    ) -> Self {
        Self::new()
            .with_field(fields::MAKE, make)
            .with_field(fields::MODEL, model)
            .with_field(fields::DRIVE_CONFIG, drive_config)
            .with_field(fields::RANGE, range_km.to_string())
            .with_field(fields::PRICE, price_eur.to_string())
    }

    /// Set a field, returning the record. Blank values are ignored.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field in place. Blank values remove the field instead.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, value.to_string());
        }
    }

    /// The text value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The value of a field parsed as a number, if present and numeric.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|v| v.replace(',', "").parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Iterate over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Natural-language rendering of one [`Record`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The descriptive text the embedder will see.
    pub text: String,
    /// Position of the source record in the dataset.
    pub record_index: usize,
}

/// A contiguous slice of a [`Document`]'s text; the unit of indexing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Unique identifier, `{document_id}_{segment_index}`.
    pub id: String,
    /// The segment text.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Position of the source record in the dataset.
    pub record_index: usize,
    /// Character offset of this segment within the parent text.
    pub offset: usize,
}

/// A [`Segment`] paired with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedSegment {
    /// The embedded segment.
    pub segment: Segment,
    /// The vector produced by the embedding provider.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Segment`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredSegment {
    /// The retrieved segment.
    pub segment: Segment,
    /// The similarity score (higher is more similar).
    pub score: f32,
}

/// The response to one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated answer text.
    pub answer: String,
    /// Retrieved segments in descending similarity order.
    pub sources: Vec<ScoredSegment>,
}
