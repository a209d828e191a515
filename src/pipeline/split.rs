//! Partitioning of a row set for split batches and the batch result types.

use crate::error::PipelineError;
use crate::pipeline::config::DEFAULT_PROFILE_NAME;
use chrono::NaiveDateTime;
use itertools::Itertools;
use log::{debug, warn};
use quire_render_core::GenerationResult;
use quire_template::TemplateSource;
use quire_types::{GenerationOptions, OutputFormat, Row};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME_TEMPLATE: &str = "{name}_{key}_{timestamp}.{ext}";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const TOKENS: [&str; 4] = ["name", "key", "timestamp", "ext"];

/// Slug used for `{key}` when the key has no sluggable characters.
const BLANK_KEY_SLUG: &str = "blank";

/// One document's worth of rows sharing a split-column value.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Position in discovery order, starting at 0.
    pub index: usize,
    /// The shared value; `null` for rows missing the column.
    pub key: Value,
    pub rows: Vec<Row>,
}

/// Groups rows by the value of `column`, keeping the order in which values
/// first appear. Rows that lack the column or hold `null` share one `null`
/// partition.
///
/// An empty row set gives no partitions. A non-empty set in which no row has
/// the column is a configuration error.
pub fn partition_rows(rows: &[Row], column: &str) -> Result<Vec<Partition>, PipelineError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if !rows.iter().any(|row| row.contains_key(column)) {
        return Err(PipelineError::Config(format!(
            "split column '{}' is not present in any of the {} rows",
            column,
            rows.len()
        )));
    }

    let mut partitions: Vec<Partition> = Vec::new();
    // JSON text of the key to partition index; `Value` is not hashable.
    let mut index_of: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = row.get(column).cloned().unwrap_or(Value::Null);
        let index = *index_of.entry(key.to_string()).or_insert_with(|| {
            partitions.push(Partition {
                index: partitions.len(),
                key,
                rows: Vec::new(),
            });
            partitions.len() - 1
        });
        partitions[index].rows.push(row.clone());
    }

    let missing = rows.iter().filter(|row| !row.contains_key(column)).count();
    if missing > 0 {
        warn!("{} rows lack split column '{}' and go to the null partition", missing, column);
    }
    debug!("Split {} rows on '{}' into {} partitions", rows.len(), column, partitions.len());
    Ok(partitions)
}

/// Display text of a key: strings unquoted, everything else as JSON.
pub fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A validated output filename pattern with `{name}`, `{key}`, `{timestamp}`
/// and `{ext}` tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    pattern: String,
}

impl FilenameTemplate {
    pub fn new(pattern: impl Into<String>) -> Result<Self, PipelineError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(PipelineError::Config("filename template must not be empty".to_string()));
        }
        if pattern.contains('/') || pattern.contains('\\') {
            return Err(PipelineError::Config(format!(
                "filename template '{}' must not contain path separators",
                pattern
            )));
        }
        let unknown = unknown_tokens(&pattern);
        if !unknown.is_empty() {
            warn!(
                "Filename template '{}' has unknown tokens {}; they are kept literally",
                pattern,
                unknown.iter().join(", ")
            );
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Substitutes the tokens. `key` is slugified; `name` has characters
    /// that are unsafe in file names replaced.
    pub fn render(&self, name: &str, key: &Value, timestamp: &str, format: OutputFormat) -> String {
        let mut key_slug = slug::slugify(key_label(key));
        if key_slug.is_empty() {
            key_slug = BLANK_KEY_SLUG.to_string();
        }
        self.pattern
            .replace("{name}", &sanitize_component(name))
            .replace("{key}", &key_slug)
            .replace("{timestamp}", timestamp)
            .replace("{ext}", format.extension())
    }
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self { pattern: DEFAULT_FILENAME_TEMPLATE.to_string() }
    }
}

fn unknown_tokens(pattern: &str) -> Vec<&str> {
    let mut unknown = Vec::new();
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else { break };
        let token = &after[..end];
        if !TOKENS.contains(&token) {
            unknown.push(token);
        }
        rest = &after[end + 1..];
    }
    unknown
}

fn sanitize_component(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Hands out unique file names, suffixing repeats with `-2`, `-3`… before
/// the extension.
#[derive(Debug, Default)]
pub(crate) struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub(crate) fn allocate(&mut self, name: String) -> String {
        if self.used.insert(name.clone()) {
            return name;
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => name.split_at(dot),
            _ => (name.as_str(), ""),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}{}", stem, n, ext);
            if self.used.insert(candidate.clone()) {
                debug!("File name '{}' already taken, using '{}'", name, candidate);
                return candidate;
            }
            n += 1;
        }
    }
}

/// Everything a split batch needs besides the pipeline itself.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub source: TemplateSource,
    pub rows: Vec<Row>,
    pub split_key_column: String,
    pub output_dir: PathBuf,
    pub filename_template: String,
    /// `{name}` token; the pipeline's profile name when unset.
    pub profile_name: Option<String>,
    /// Fields left unset fall back to the pipeline's default options.
    pub options: GenerationOptions,
    /// Fixes the `{timestamp}` token; the batch start time when unset.
    pub batch_time: Option<NaiveDateTime>,
}

impl SplitRequest {
    pub fn new(
        source: TemplateSource,
        rows: Vec<Row>,
        split_key_column: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            rows,
            split_key_column: split_key_column.into(),
            output_dir: output_dir.into(),
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            profile_name: None,
            options: GenerationOptions::default(),
            batch_time: None,
        }
    }

    pub fn with_filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = template.into();
        self
    }

    pub fn with_profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile_name = Some(name.into());
        self
    }

    /// The `{name}` token when run outside a pipeline.
    pub fn profile_name(&self) -> &str {
        self.profile_name.as_deref().unwrap_or(DEFAULT_PROFILE_NAME)
    }

    /// Sets the fields of `options` that are set, keeping the others.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options.with_fallback(&self.options);
        self
    }

    pub fn with_batch_time(mut self, time: NaiveDateTime) -> Self {
        self.batch_time = Some(time);
        self
    }
}

/// Outcome for one partition.
#[derive(Debug)]
pub struct PartitionResult {
    index: usize,
    key: Value,
    row_count: usize,
    result: GenerationResult,
}

impl PartitionResult {
    pub(crate) fn new(partition: &Partition, result: GenerationResult) -> Self {
        Self {
            index: partition.index,
            key: partition.key.clone(),
            row_count: partition.rows.len(),
            result,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    pub fn output_path(&self) -> &Path {
        self.result.output_path()
    }
}

/// Per-partition outcomes of a split batch in partition discovery order.
#[derive(Debug, Default)]
pub struct SplitResult {
    partitions: Vec<PartitionResult>,
}

impl SplitResult {
    pub(crate) fn new(partitions: Vec<PartitionResult>) -> Self {
        Self { partitions }
    }

    pub fn partitions(&self) -> &[PartitionResult] {
        &self.partitions
    }

    pub fn into_partitions(self) -> Vec<PartitionResult> {
        self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.partitions.iter().filter(|p| p.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PartitionResult> {
        self.partitions.iter().filter(|p| !p.is_success())
    }

    /// Share of successful partitions; 1.0 for an empty batch.
    pub fn success_ratio(&self) -> f64 {
        if self.partitions.is_empty() {
            return 1.0;
        }
        self.success_count() as f64 / self.len() as f64
    }

    pub fn total_bytes(&self) -> u64 {
        self.partitions.iter().map(|p| p.result.file_size_bytes()).sum()
    }

    /// One line per failure: key and error message.
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|p| {
                format!(
                    "{} ({}): {}",
                    key_label(&p.key),
                    p.output_path().display(),
                    p.result.error_message().unwrap_or_default()
                )
            })
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_render_core::{Encoded, GenerationError};
    use serde_json::json;

    fn rows(values: Value) -> Vec<Row> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn partitions_keep_first_seen_order() {
        let data = rows(json!([
            {"region": "West", "n": 1},
            {"region": "East", "n": 2},
            {"region": "West", "n": 3},
            {"region": "North", "n": 4},
        ]));
        let parts = partition_rows(&data, "region").unwrap();
        let keys: Vec<_> = parts.iter().map(|p| key_label(&p.key)).collect();
        assert_eq!(keys, vec!["West", "East", "North"]);
        assert_eq!(parts[0].rows.len(), 2);
        assert_eq!(parts[0].rows[1]["n"], json!(3));
        assert_eq!(parts.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn missing_and_null_keys_share_a_partition() {
        let data = rows(json!([
            {"region": null},
            {"other": 1},
            {"region": "East"},
        ]));
        let parts = partition_rows(&data, "region").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].key, Value::Null);
        assert_eq!(parts[0].rows.len(), 2);
    }

    #[test]
    fn values_of_different_types_stay_apart() {
        let data = rows(json!([{"k": 1}, {"k": "1"}, {"k": 1}]));
        let parts = partition_rows(&data, "k").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].rows.len(), 2);
    }

    #[test]
    fn absent_column_fails_fast() {
        let data = rows(json!([{"a": 1}, {"a": 2}]));
        let err = partition_rows(&data, "region").unwrap_err();
        assert!(matches!(err, PipelineError::Config(ref m) if m.contains("region")));
        assert!(partition_rows(&[], "region").unwrap().is_empty());
    }

    #[test]
    fn renders_filename_tokens() {
        let template = FilenameTemplate::default();
        let name = template.render("Monthly Sales", &json!("North East"), "20240102_030405", OutputFormat::Pdf);
        assert_eq!(name, "Monthly Sales_north-east_20240102_030405.pdf");

        let template = FilenameTemplate::new("{key}.{ext}").unwrap();
        assert_eq!(template.render("r", &Value::Null, "", OutputFormat::Docx), "null.docx");
        assert_eq!(template.render("r", &json!("!!!"), "", OutputFormat::Docx), "blank.docx");
        assert_eq!(template.render("r", &json!(42), "", OutputFormat::Pdf), "42.pdf");
    }

    #[test]
    fn rejects_unusable_templates() {
        assert!(FilenameTemplate::new("").is_err());
        assert!(FilenameTemplate::new("out/{key}.pdf").is_err());
        assert!(FilenameTemplate::new("{key}_{unknown}.pdf").is_ok());
        assert_eq!(unknown_tokens("{key}_{unknown}.{ext}"), vec!["unknown"]);
    }

    #[test]
    fn colliding_names_get_numbered() {
        let mut names = NameAllocator::default();
        assert_eq!(names.allocate("a.pdf".into()), "a.pdf");
        assert_eq!(names.allocate("a.pdf".into()), "a-2.pdf");
        assert_eq!(names.allocate("a.pdf".into()), "a-3.pdf");
        assert_eq!(names.allocate("a-2.pdf".into()), "a-2-2.pdf");
        assert_eq!(names.allocate("plain".into()), "plain");
        assert_eq!(names.allocate("plain".into()), "plain-2");
    }

    #[test]
    fn request_options_merge_over_earlier_ones() {
        let request = SplitRequest::new(TemplateSource::new(""), Vec::new(), "k", "out")
            .with_options(GenerationOptions { watermark: Some("DRAFT".into()), ..GenerationOptions::default() })
            .with_options(GenerationOptions { compress: Some(false), ..GenerationOptions::default() });
        assert_eq!(request.options.watermark.as_deref(), Some("DRAFT"));
        assert_eq!(request.options.compress, Some(false));
        assert_eq!(request.profile_name, None);
        assert_eq!(request.profile_name(), DEFAULT_PROFILE_NAME);
        assert_eq!(request.with_profile_name("weekly").profile_name(), "weekly");
    }

    #[test]
    fn split_result_counts() {
        let part = |i: usize| Partition { index: i, key: json!(i), rows: Vec::new() };
        let ok = |i: usize| {
            PartitionResult::new(&part(i), GenerationResult::success(format!("{}.pdf", i), Encoded { bytes: 10, pages: Some(1) }))
        };
        let failed = PartitionResult::new(&part(2), GenerationResult::failure("2.pdf", GenerationError::Cancelled));
        let result = SplitResult::new(vec![ok(0), ok(1), failed, ok(3)]);

        assert_eq!(result.success_count(), 3);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures().map(|p| p.index()).collect::<Vec<_>>(), vec![2]);
        assert!((result.success_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(result.total_bytes(), 30);
        assert!(result.failure_summary().contains("cancelled"));
        assert_eq!(SplitResult::default().success_ratio(), 1.0);
    }
}
