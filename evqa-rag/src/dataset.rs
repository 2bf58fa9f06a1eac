//! Loading and normalizing the vehicle dataset.
//!
//! Source exports name their columns inconsistently (`Drive_Configuration`,
//! `Germany_price_before_incentives`, ...). [`ColumnMapping`] folds them onto
//! the canonical names in [`fields`](crate::document::fields) once, before any
//! document is built.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::document::{Record, fields};
use crate::error::{RagError, Result};

/// Maps source column headers onto canonical field names.
///
/// Matching is case-insensitive on trimmed headers. Headers without an alias
/// are kept, lowercased.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    aliases: Vec<(String, String)>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::empty()
            .alias("Drive_Configuration", fields::DRIVE_CONFIG)
            .alias("drive", fields::DRIVE_CONFIG)
            .alias("Germany_price_before_incentives", fields::PRICE)
            .alias("price_de", fields::PRICE)
            .alias("range_km", fields::RANGE)
    }
}

impl ColumnMapping {
    /// A mapping with no aliases; headers are only trimmed and lowercased.
    pub fn empty() -> Self {
        Self { aliases: Vec::new() }
    }

    /// Add an alias from a source header to a canonical field name.
    pub fn alias(mut self, source: impl AsRef<str>, canonical: impl Into<String>) -> Self {
        self.aliases.push((source.as_ref().trim().to_lowercase(), canonical.into()));
        self
    }

    /// Resolve a source header to its canonical field name.
    pub fn canonical(&self, header: &str) -> String {
        let header = header.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|(source, _)| *source == header)
            .map(|(_, canonical)| canonical.clone())
            .unwrap_or(header)
    }

    /// Build a normalized [`Record`] from `(header, value)` cells.
    ///
    /// When two headers resolve to the same field, the first non-empty value
    /// wins. A missing `make` is derived from `title`.
    pub fn normalize<'a, I>(&self, cells: I) -> Record
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Record::new();
        for (header, value) in cells {
            let name = self.canonical(header);
            if record.get(&name).is_none() {
                record.insert(name, value);
            }
        }
        derive_make(&mut record);
        record
    }
}

/// Fill `make` from the first whitespace-delimited token of `title`.
fn derive_make(record: &mut Record) {
    if record.get(fields::MAKE).is_some() {
        return;
    }
    let make = record
        .get(fields::TITLE)
        .and_then(|title| title.split_whitespace().next())
        .map(str::to_string);
    if let Some(make) = make {
        record.insert(fields::MAKE, make);
    }
}

/// A normalized, immutable sequence of [`Record`]s.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wrap already-normalized records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load and normalize a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Dataset`] if the file cannot be opened or parsed.
    pub fn from_csv_path(path: impl AsRef<Path>, mapping: &ColumnMapping) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| RagError::Dataset(format!("cannot open '{}': {e}", path.display())))?;
        let dataset = Self::from_csv_reader(file, mapping)?;
        info!(path = %path.display(), record_count = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Load and normalize CSV data from any reader. The first row is the header.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Dataset`] on malformed CSV.
    pub fn from_csv_reader<R: Read>(reader: R, mapping: &ColumnMapping) -> Result<Self> {
        let mut reader =
            csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(RagError::Dataset("CSV has no header row".to_string()));
        }
        debug!(columns = headers.len(), "read CSV header");

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(mapping.normalize(headers.iter().zip(row.iter())));
        }

        Ok(Self { records })
    }

    /// The records, in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the dataset, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
title,model,Drive_Configuration,range,Germany_price_before_incentives
Tesla Model 3,Model 3,RWD,500,45000
Hyundai Ioniq 5,Ioniq 5,AWD,430,
";

    #[test]
    fn headers_are_mapped_to_canonical_names() {
        let mapping = ColumnMapping::default();
        assert_eq!(mapping.canonical(" Drive_Configuration "), "drive_config");
        assert_eq!(mapping.canonical("GERMANY_PRICE_BEFORE_INCENTIVES"), "price");
        assert_eq!(mapping.canonical("Model"), "model");
    }

    #[test]
    fn make_is_derived_from_title() {
        let dataset = Dataset::from_csv_reader(RAW.as_bytes(), &ColumnMapping::default()).unwrap();
        assert_eq!(dataset.len(), 2);

        let first = &dataset.records()[0];
        assert_eq!(first.get("make"), Some("Tesla"));
        assert_eq!(first.get("drive_config"), Some("RWD"));
        assert_eq!(first.get("price"), Some("45000"));

        // Empty trailing cell stays absent.
        assert_eq!(dataset.records()[1].get("price"), None);
    }

    #[test]
    fn explicit_make_is_not_overwritten() {
        let record = ColumnMapping::default()
            .normalize([("make", "Polestar"), ("title", "Volvo-built Polestar 2")]);
        assert_eq!(record.get("make"), Some("Polestar"));
    }

    #[test]
    fn first_non_empty_alias_wins() {
        let record = ColumnMapping::default().normalize([("price_de", ""), ("price", "39990")]);
        assert_eq!(record.get("price"), Some("39990"));
    }

    #[test]
    fn header_only_csv_is_an_empty_dataset() {
        let dataset =
            Dataset::from_csv_reader("make,model\n".as_bytes(), &ColumnMapping::default()).unwrap();
        assert!(dataset.is_empty());
    }
}
