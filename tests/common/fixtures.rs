use quire::{GenerationOptions, PipelineBuilder, DocumentPipeline, Row};
use serde_json::{Value, json};

pub fn rows(values: Value) -> Vec<Row> {
    values
        .as_array()
        .expect("rows must be an array")
        .iter()
        .map(|v| v.as_object().expect("row must be an object").clone())
        .collect()
}

/// `n` sales rows cycling through `regions`.
pub fn sales_rows(n: usize, regions: &[&str]) -> Vec<Row> {
    let values: Vec<Value> = (0..n)
        .map(|i| json!({ "region": regions[i % regions.len()], "rep": format!("Rep {}", i), "amount": i * 100 }))
        .collect();
    rows(Value::Array(values))
}

/// A report with the given directive lines, a header, a row-per-paragraph
/// content section and a footer.
pub fn report_template(directives: &str) -> String {
    format!(
        "{{{{!--\n{}\n--}}}}\n\
         {{{{#section \"header\"}}}}\nQuarterly Sales\n{{{{/section}}}}\n\
         {{{{#section \"content\"}}}}\n\
         # Sales report\n\
         {{{{#each rows}}}}\n{{{{rep}}}} sold {{{{amount}}}}\n\n{{{{/each}}}}\n\
         {{{{/section}}}}\n\
         {{{{#section \"footer\"}}}}\nConfidential\n{{{{/section}}}}",
        directives
    )
}

pub fn static_template(directives: &str) -> String {
    format!(
        "{{{{!--\n{}\n--}}}}\n{{{{#section \"content\"}}}}\nNo data required\n{{{{/section}}}}",
        directives
    )
}

pub fn pipeline() -> DocumentPipeline {
    PipelineBuilder::new()
        .with_max_concurrent_documents(2)
        .build()
        .expect("default pipeline")
}

pub fn uncompressed() -> GenerationOptions {
    GenerationOptions { compress: Some(false), ..GenerationOptions::default() }
}
