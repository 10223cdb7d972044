//! Command-line interface for stream-diff
//!
//! # Usage Examples
//!
//! ## Schema Inference
//! ```bash
//! # Infer and print the schema of one source
//! stream-diff schema source1.yaml
//!
//! # Persist the schema, sampling at most 500 records
//! stream-diff schema source1.yaml --sample-size 500 --output schema.yaml
//! ```
//!
//! ## Stream Comparison
//! ```bash
//! # Compare two sources described by a run configuration
//! stream-diff compare --config run-config.yaml
//!
//! # Quick comparison of two CSV files with periodic reporting
//! stream-diff compare \
//!   --source1 before.csv --source2 after.csv \
//!   --key user_id --enable-periodic --record-interval 1000
//! ```
//!
//! ## Synthetic Data
//! ```bash
//! # Emit 1000 reproducible records as JSONL
//! stream-diff generate --count 1000 --seed 42 > data.jsonl
//!
//! # Generate from a schema file at 100 records/second
//! stream-diff generate --schema user_schema.yaml --rate 100 --count 5000
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use diff_core::{generate_schema, PeriodicCallback, RecordSource, StreamComparator};
use pattern_detection::create_detector;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use stream_diff::config::{Config, OutputConfig, RunConfig, SourceConfig};
use stream_diff::{create_source, report};
use stream_generator::{builtin_patterns, GeneratorConfig, StreamGenerator};
use tracing::info;

#[derive(Parser)]
#[command(name = "stream-diff")]
#[command(version)]
#[command(about = "Compare two record streams and report their differences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer the schema of a single source
    Schema {
        /// Source configuration file
        config: PathBuf,

        /// Sample at most this many records (overrides the config)
        #[arg(long)]
        sample_size: Option<usize>,

        /// Write the schema to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Compare two sources and report differences
    Compare {
        /// Run configuration file
        #[arg(long, default_value = "run-config.yaml")]
        config: PathBuf,

        /// First source CSV file, bypassing the run configuration
        #[arg(long, requires = "source2")]
        source1: Option<PathBuf>,

        /// Second source CSV file, bypassing the run configuration
        #[arg(long, requires = "source1")]
        source2: Option<PathBuf>,

        /// Key field for matching records across sources
        #[arg(long)]
        key: Option<String>,

        /// Enable periodic reporting
        #[arg(long)]
        enable_periodic: bool,

        /// Seconds between periodic reports (0 = keep configured value)
        #[arg(long, default_value_t = 0)]
        time_interval: u64,

        /// Records between periodic reports (0 = keep configured value)
        #[arg(long, default_value_t = 0)]
        record_interval: u64,

        /// Directory for report files when bypassing the run configuration
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Generate synthetic records as line-delimited JSON
    Generate {
        /// Schema file driving generation (built-in demo schema when omitted)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Number of records to generate (0 = unlimited)
        #[arg(long, default_value_t = 100)]
        count: u64,

        /// Records per second (0 = unthrottled)
        #[arg(long, default_value_t = 0.0)]
        rate: f64,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema {
            config,
            sample_size,
            output,
        } => run_schema(&config, sample_size, output.as_deref()).await,
        Commands::Compare {
            config,
            source1,
            source2,
            key,
            enable_periodic,
            time_interval,
            record_interval,
            output_dir,
        } => {
            let mut run_config = match (source1, source2) {
                (Some(path1), Some(path2)) => csv_run_config(&path1, &path2, &output_dir),
                _ => RunConfig::load(&config)
                    .with_context(|| format!("failed to load run config {}", config.display()))?,
            };

            if let Some(key) = key {
                run_config.key_field = key;
            }
            if enable_periodic {
                run_config.periodic.enabled = true;
            }
            if time_interval > 0 {
                run_config.periodic.time_interval_seconds = time_interval;
            }
            if record_interval > 0 {
                run_config.periodic.record_interval = record_interval;
            }

            run_compare(run_config).await
        }
        Commands::Generate {
            schema,
            count,
            rate,
            seed,
            output,
        } => run_generate(schema, count, rate, seed, output.as_deref()).await,
    }
}

async fn run_schema(
    config_path: &Path,
    sample_size: Option<usize>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;

    let detector = create_detector(config.pattern_detection.as_ref())
        .context("failed to create pattern detector")?;
    let mut source = create_source(&config.source).context("failed to create source")?;

    let sample_size = match sample_size {
        Some(size) if size > 0 => size,
        _ => config.source.sample_size(),
    };
    info!(sample_size, "generating schema");

    let schema = generate_schema(source.as_mut(), sample_size, detector.as_ref())
        .await
        .context("schema generation failed")?;
    source.close().await.context("failed to close source")?;

    match output {
        Some(path) => {
            report::save_yaml(&schema, path)?;
            info!(path = %path.display(), fields = schema.fields.len(), "schema written");
        }
        None => print!("{}", schema.to_yaml()?),
    }
    Ok(())
}

/// Run configuration for the `--source1/--source2` shortcut: both files
/// are treated as CSV and reports land in `output_dir`.
fn csv_run_config(source1: &Path, source2: &Path, output_dir: &Path) -> RunConfig {
    let csv_source = |path: &Path| SourceConfig {
        source_type: "csv".to_string(),
        path: path.display().to_string(),
        ..SourceConfig::default()
    };

    let mut config = RunConfig {
        source1: csv_source(source1),
        source2: csv_source(source2),
        output: OutputConfig {
            final_report: output_dir.join("final_report.yaml").display().to_string(),
            periodic_reports: output_dir.join("periodic_reports").display().to_string(),
        },
        ..RunConfig::default()
    };
    config.apply_defaults();
    config
}

async fn run_compare(config: RunConfig) -> anyhow::Result<()> {
    info!(
        source1 = %config.source1.path,
        source2 = %config.source2.path,
        key = %config.key_field,
        periodic = config.periodic.enabled,
        "starting comparison"
    );

    let source1 = create_source(&config.source1).context("failed to create source1")?;
    let source2 = create_source(&config.source2).context("failed to create source2")?;

    let periodic_dir = (!config.output.periodic_reports.is_empty())
        .then(|| PathBuf::from(&config.output.periodic_reports));
    if let (true, Some(dir)) = (config.periodic.enabled, &periodic_dir) {
        std::fs::create_dir_all(dir).with_context(|| {
            format!(
                "failed to create periodic reports directory {}",
                dir.display()
            )
        })?;
    }

    let callback: PeriodicCallback = Box::new(move |result| {
        info!(
            records = result.records_processed,
            matching = result.matching_keys,
            identical = result.identical_rows,
            diffs = result.value_diffs.len(),
            "periodic report"
        );
        if let Some(dir) = &periodic_dir {
            let path = report::periodic_report_path(dir, result.timestamp);
            report::save_yaml(result, &path)?;
            info!(path = %path.display(), "saved periodic report");
        }
        Ok(())
    });

    let comparator = StreamComparator::new(
        source1,
        source2,
        config.periodic,
        config.key_field.clone(),
        Some(callback),
    );

    let started = Instant::now();
    let result = comparator.compare().await.context("comparison failed")?;
    let elapsed = started.elapsed();

    println!("Comparison completed in {elapsed:.2?}");
    println!();
    println!("Final Results:");
    println!("  Records processed:     {}", result.records_processed);
    println!("  Source1 records:       {}", result.source1_records);
    println!("  Source2 records:       {}", result.source2_records);
    println!("  Matching keys:         {}", result.matching_keys);
    println!("  Identical rows:        {}", result.identical_rows);
    println!("  Value differences:     {} records", result.value_diffs.len());
    println!("  Keys only in source1:  {}", result.keys_only_in_source1.len());
    println!("  Keys only in source2:  {}", result.keys_only_in_source2.len());

    let final_report = if config.output.final_report.is_empty() {
        "final_report.yaml".to_string()
    } else {
        config.output.final_report
    };
    report::save_yaml(&result, Path::new(&final_report))?;
    println!();
    println!("Final report saved to: {final_report}");
    Ok(())
}

async fn run_generate(
    schema: Option<PathBuf>,
    count: u64,
    rate: f64,
    seed: Option<u64>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let config = GeneratorConfig {
        schema_path: schema.map(|p| p.display().to_string()),
        seed,
        max_records: count,
        records_per_second: rate,
        patterns: builtin_patterns(),
    };
    let mut generator =
        StreamGenerator::from_config(&config).context("failed to create generator")?;

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    while let Some(record) = generator.read().await.context("generation failed")? {
        serde_json::to_writer(&mut out, &record).context("failed to encode record")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
