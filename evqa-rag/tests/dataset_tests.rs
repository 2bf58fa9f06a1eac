//! Loading the raw CSV export and building an index from it.

mod common;

use std::io::Write;

use common::*;
use evqa_rag::{ColumnMapping, Dataset, OrchestratorState, QaConfig, RagError};

const RAW_EXPORT: &str = "\
title,Model,Drive_Configuration,range_km,Germany_price_before_incentives
Tesla Model 3,Model 3,RWD,500,\"45,000\"
Kia EV6,EV6,AWD,480,50000
";

#[tokio::test]
async fn csv_export_builds_and_answers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RAW_EXPORT.as_bytes()).unwrap();

    let dataset = Dataset::from_csv_path(file.path(), &ColumnMapping::default()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[1].get("make"), Some("Kia"));
    assert_eq!(dataset.records()[0].numeric("price"), Some(45000.0));

    let mut qa = keyword_orchestrator(QaConfig::default());
    let report = qa.build(dataset.records()).await.unwrap();
    assert_eq!(report.record_count, 2);
    assert_eq!(qa.state(), OrchestratorState::Ready);

    let answer = qa.ask("What drive does the Kia EV6 have?").await.unwrap();
    assert!(answer.sources[0].segment.text.starts_with("The Kia EV6 is a AWD drive"));
}

#[test]
fn missing_file_is_a_dataset_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dataset::from_csv_path(dir.path().join("absent.csv"), &ColumnMapping::default())
        .unwrap_err();
    assert!(matches!(err, RagError::Dataset(_)));
}
