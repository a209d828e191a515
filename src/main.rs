//! Command-line front end: generate one document, split a row set into many,
//! or validate a template.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use quire::{
    CancellationToken, DocumentPipeline, GenerationOptions, OutputFormat, PipelineBuilder,
    PipelineConfig, PipelineError, TemplateSource, read_rows,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

// Mimalloc keeps fragmentation down across long batches of many small
// allocations.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "quire",
    version,
    about = "Paginated PDF and DOCX reports from JSON rows and hybrid templates",
    after_help = "EXAMPLES:\n  \
                  quire generate --template sales.hbs --data rows.json --output sales.pdf\n  \
                  quire split --template sales.hbs --data rows.json --key region --output-dir out/\n  \
                  quire validate --template sales.hbs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline settings as JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log resident memory once a second
    #[arg(long, global = true)]
    monitor_memory: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one document from every row
    Generate {
        #[arg(long)]
        template: PathBuf,
        /// JSON array of row objects; no rows when omitted
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        /// Format used when the template has no `format` directive
        #[arg(long)]
        format: Option<OutputFormat>,
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Generate one document per distinct value of a column
    Split {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        data: PathBuf,
        /// Column whose values partition the rows
        #[arg(long)]
        key: String,
        #[arg(long)]
        output_dir: PathBuf,
        /// Tokens: {name}, {key}, {timestamp}, {ext}
        #[arg(long, default_value = quire::pipeline::split::DEFAULT_FILENAME_TEMPLATE)]
        filename_template: String,
        /// Overrides the configured profile name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[command(flatten)]
        options: OptionArgs,
    },

    /// Check a template without generating anything
    Validate {
        #[arg(long)]
        template: PathBuf,
    },
}

#[derive(Args)]
struct OptionArgs {
    #[arg(long)]
    watermark: Option<String>,
    /// e.g. "Page {page} of {total}"
    #[arg(long)]
    page_number_format: Option<String>,
    #[arg(long)]
    no_page_numbers: bool,
    #[arg(long)]
    no_compress: bool,
}

impl OptionArgs {
    fn to_options(&self) -> GenerationOptions {
        GenerationOptions {
            include_page_numbers: self.no_page_numbers.then_some(false),
            page_number_format: self.page_number_format.clone(),
            watermark: self.watermark.clone(),
            compress: self.no_compress.then_some(false),
        }
    }
}

/// Spawns a background thread to monitor physical memory usage (RSS).
fn spawn_memory_monitor() {
    thread::spawn(|| {
        let mut max_usage = 0;
        let start = Instant::now();
        info!("[Monitor] Memory monitoring started");
        loop {
            if let Some(usage) = memory_stats::memory_stats() {
                let mb = usage.physical_mem / 1024 / 1024;
                max_usage = max_usage.max(mb);
                info!(
                    "[Monitor] T+{:<3}s | RSS: {:<4} MB | Peak: {:<4} MB",
                    start.elapsed().as_secs(),
                    mb,
                    max_usage
                );
            }
            thread::sleep(Duration::from_secs(1));
        }
    });
}

fn read_template(path: &Path, format: Option<OutputFormat>) -> Result<TemplateSource, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read template from '{}': {}", path.display(), e),
        ))
    })?;
    let source = TemplateSource::new(text);
    Ok(match format {
        Some(format) => source.with_declared_format(format),
        None => source,
    })
}

fn build_pipeline(config: Option<&Path>) -> Result<DocumentPipeline, PipelineError> {
    let config = match config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    PipelineBuilder::new().with_config(config).build()
}

/// Returns whether every requested document was produced.
fn run(cli: Cli) -> Result<bool, PipelineError> {
    let pipeline = build_pipeline(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { template, data, output, format, options } => {
            let source = read_template(&template, format)?;
            let rows = match data {
                Some(path) => read_rows(path)?,
                None => Vec::new(),
            };
            let result = pipeline.generate(&source, &rows, &output, &options.to_options());
            match result.error_message() {
                None => {
                    let pages = result.page_count().map(|n| format!(", {} pages", n)).unwrap_or_default();
                    println!("Wrote {} ({} bytes{})", output.display(), result.file_size_bytes(), pages);
                    Ok(true)
                }
                Some(message) => {
                    eprintln!("Generation failed [{}]: {}", result.error_kind().map(|k| k.to_string()).unwrap_or_default(), message);
                    Ok(false)
                }
            }
        }
        Commands::Split {
            template,
            data,
            key,
            output_dir,
            filename_template,
            name,
            format,
            options,
        } => {
            let source = read_template(&template, format)?;
            let rows = read_rows(data)?;
            let mut request = pipeline
                .split_request(source, rows, key, output_dir)
                .with_filename_template(filename_template)
                .with_options(options.to_options());
            if let Some(name) = name {
                request = request.with_profile_name(name);
            }
            let result = pipeline.generate_split(&request, &CancellationToken::new())?;
            for partition in result.partitions().iter().filter(|p| p.is_success()) {
                println!("Wrote {} ({} rows)", partition.output_path().display(), partition.row_count());
            }
            if result.failure_count() > 0 {
                eprintln!("{} of {} documents failed:\n{}", result.failure_count(), result.len(), result.failure_summary());
            }
            println!(
                "{} of {} documents written ({:.0}%)",
                result.success_count(),
                result.len(),
                result.success_ratio() * 100.0
            );
            Ok(result.failure_count() == 0)
        }
        Commands::Validate { template } => {
            let path = template;
            let text = fs::read_to_string(&path)?;
            let validation = pipeline.validate(&text);
            match validation.error_message {
                None => {
                    println!("{} is valid", path.display());
                    Ok(true)
                }
                Some(message) => {
                    eprintln!("{} is invalid: {}", path.display(), message);
                    Ok(false)
                }
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.monitor_memory {
        spawn_memory_monitor();
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error [{}]: {}", e.kind(), e);
            ExitCode::from(2)
        }
    }
}
