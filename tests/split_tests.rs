mod common;

use chrono::NaiveDate;
use common::fixtures::*;
use common::{GeneratedPdf, TestResult, init_logging};
use quire::{
    CancellationToken, ErrorKind, ExecutorKind, PipelineBuilder, PipelineError, SplitRequest, TemplateSource,
};
use serde_json::{Value, json};

fn split_template() -> TemplateSource {
    TemplateSource::new(
        "{{!-- format: pdf --}}\n\
         {{#section \"header\"}}\nRegion {{split_key}}\n{{/section}}\n\
         {{#section \"content\"}}\n{{row_count}} rows\n\n{{#each rows}}{{rep}}: {{amount}}\n\n{{/each}}\n{{/section}}",
    )
}

#[test]
fn test_split_cardinality() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let rows = sales_rows(10, &["West", "East", "North"]);
    let request = SplitRequest::new(split_template(), rows, "region", dir.path());

    let result = pipeline().generate_split(&request, &CancellationToken::new())?;
    assert_eq!(result.len(), 3);
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.failure_count(), 0);
    assert_eq!(result.success_ratio(), 1.0);
    assert_eq!(result.partitions().iter().map(|p| p.row_count()).sum::<usize>(), 10);

    let keys: Vec<&Value> = result.partitions().iter().map(|p| p.key()).collect();
    assert_eq!(keys, vec![&json!("West"), &json!("East"), &json!("North")]);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 3);

    let west = GeneratedPdf::load(result.partitions()[0].output_path())?;
    assert_pdf_page_count!(west, 1);
    Ok(())
}

#[test]
fn test_partial_failure_is_isolated() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let mut rows = sales_rows(10, &["A", "B", "C", "D", "E"]);
    // Strict binding fails for the third partition only.
    for row in rows.iter_mut().filter(|r| r["region"] == "C") {
        row.remove("amount");
    }
    let request = SplitRequest::new(split_template(), rows, "region", dir.path());

    let result = pipeline().generate_split(&request, &CancellationToken::new())?;
    assert_eq!(result.len(), 5);
    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 1);

    let failed: Vec<_> = result.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].index(), 2);
    assert_eq!(failed[0].key(), &json!("C"));
    assert_eq!(failed[0].result().error_kind(), Some(ErrorKind::TemplateSyntax));
    assert!(!failed[0].output_path().exists());

    for (i, partition) in result.partitions().iter().enumerate() {
        assert_eq!(partition.is_success(), i != 2, "partition {}", i);
    }
    assert!((result.success_ratio() - 0.8).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_empty_dataset_gives_empty_result() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let request = SplitRequest::new(split_template(), Vec::new(), "region", dir.path().join("out"));
    let result = pipeline().generate_split(&request, &CancellationToken::new())?;
    assert!(result.is_empty());
    assert_eq!(result.success_count(), 0);
    Ok(())
}

#[test]
fn test_absent_split_column_fails_the_batch() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let request = SplitRequest::new(split_template(), sales_rows(4, &["West"]), "country", dir.path());
    let err = pipeline().generate_split(&request, &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_rows_without_key_form_a_null_partition() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let rows = rows(json!([
        {"region": "West", "rep": "a", "amount": 1},
        {"rep": "b", "amount": 2},
        {"region": null, "rep": "c", "amount": 3},
    ]));
    let request = SplitRequest::new(split_template(), rows, "region", dir.path()).with_filename_template("{key}.{ext}");
    let result = pipeline().generate_split(&request, &CancellationToken::new())?;
    assert_eq!(result.len(), 2);
    assert_eq!(result.partitions()[1].key(), &Value::Null);
    assert_eq!(result.partitions()[1].row_count(), 2);
    assert!(dir.path().join("null.pdf").exists());
    Ok(())
}

#[test]
fn test_filename_tokens_share_one_timestamp() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let batch_time = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .ok_or("invalid date")?;
    let request = SplitRequest::new(split_template(), sales_rows(4, &["North West", "South"]), "region", dir.path())
        .with_profile_name("Monthly Sales")
        .with_batch_time(batch_time);

    let result = pipeline().generate_split(&request, &CancellationToken::new())?;
    let names: Vec<String> = result
        .partitions()
        .iter()
        .map(|p| p.output_path().file_name().unwrap_or_default().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Monthly Sales_north-west_20240102_030405.pdf",
            "Monthly Sales_south_20240102_030405.pdf"
        ]
    );
    Ok(())
}

#[test]
fn test_parallel_results_keep_discovery_order() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let regions: Vec<String> = (0..12).map(|i| format!("region-{:02}", i)).collect();
    let region_refs: Vec<&str> = regions.iter().map(String::as_str).collect();
    let pipeline = PipelineBuilder::new()
        .with_executor(ExecutorKind::Parallel)
        .with_max_concurrent_documents(4)
        .build()?;
    let request = SplitRequest::new(split_template(), sales_rows(48, &region_refs), "region", dir.path())
        .with_filename_template("{key}.{ext}");

    let result = pipeline.generate_split(&request, &CancellationToken::new())?;
    assert_eq!(result.success_count(), 12);
    for (i, partition) in result.partitions().iter().enumerate() {
        assert_eq!(partition.index(), i);
        assert_eq!(partition.key(), &json!(regions[i]));
        assert_eq!(partition.row_count(), 4);
    }
    Ok(())
}

#[test]
fn test_cancelled_batch_writes_nothing() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let request = SplitRequest::new(split_template(), sales_rows(6, &["A", "B", "C"]), "region", dir.path());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = pipeline().generate_split(&request, &cancel)?;
    assert_eq!(result.len(), 3);
    assert_eq!(result.failure_count(), 3);
    assert!(result.failures().all(|p| p.result().error_kind() == Some(ErrorKind::Cancelled)));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_async_facade_runs_the_batch() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let request = SplitRequest::new(split_template(), sales_rows(6, &["A", "B"]), "region", dir.path());

    let result = pipeline().generate_split_async(request, CancellationToken::new()).await?;
    assert_eq!(result.len(), 2);
    assert_eq!(result.success_count(), 2);
    for partition in result.partitions() {
        assert!(partition.output_path().exists());
    }
    Ok(())
}
