//! mqc - metabolomics feature-table QC CLI
//!
//! Curates untargeted-metabolomics feature tables into sample-by-metabolite
//! matrices using blank, zero-proportion and CV filters.

use clap::{Parser, Subcommand, ValueEnum};
use metabo_qc::data::{read_table, TableSource, TextEncoding};
use metabo_qc::error::Result;
use metabo_qc::pipeline::{Pipeline, PipelineConfig, Polarity, RunSummary};
use metabo_qc::reshape::{add_feature_ids, FEATURE_ID_COLUMN};
use std::path::PathBuf;

/// Output format for run reports
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// CLI-friendly polarity enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPolarity {
    Pos,
    Neg,
}

impl From<CliPolarity> for Polarity {
    fn from(p: CliPolarity) -> Self {
        match p {
            CliPolarity::Pos => Polarity::Pos,
            CliPolarity::Neg => Polarity::Neg,
        }
    }
}

/// CLI-friendly encoding enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEncoding {
    Utf8,
    Latin1,
}

impl From<CliEncoding> for TextEncoding {
    fn from(e: CliEncoding) -> Self {
        match e {
            CliEncoding::Utf8 => TextEncoding::Utf8,
            CliEncoding::Latin1 => TextEncoding::Latin1,
        }
    }
}

/// Metabolomics feature-table quality control
#[derive(Parser)]
#[command(name = "mqc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more dataset configurations (e.g. POS then NEG)
    Run {
        /// Path to a dataset configuration YAML (repeatable)
        #[arg(short, long, required = true, num_args = 1..)]
        config: Vec<PathBuf>,

        /// Report format printed to stdout
        #[arg(long, value_enum, default_value = "text")]
        report_format: ReportFormat,
    },

    /// Write an example dataset configuration
    Example {
        /// Output path for the YAML file
        #[arg(short, long)]
        output: PathBuf,

        /// Instrument polarity of the example
        #[arg(short, long, value_enum, default_value = "pos")]
        polarity: CliPolarity,
    },

    /// Load a feature table and preview its feature identifiers
    Inspect {
        /// Path to the feature table
        #[arg(short, long)]
        input: PathBuf,

        /// Field separator
        #[arg(short, long, default_value = ";")]
        separator: char,

        /// Text encoding
        #[arg(short, long, value_enum, default_value = "utf8")]
        encoding: CliEncoding,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            report_format,
        } => cmd_run(&config, report_format),
        Commands::Example { output, polarity } => cmd_example(&output, polarity.into()),
        Commands::Inspect {
            input,
            separator,
            encoding,
        } => cmd_inspect(&input, separator, encoding.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(config_paths: &[PathBuf], format: ReportFormat) -> Result<()> {
    let mut summaries: Vec<RunSummary> = Vec::with_capacity(config_paths.len());

    for path in config_paths {
        eprintln!("Loading configuration from {:?}...", path);
        let config = PipelineConfig::from_yaml_file(path)?;
        let summary = Pipeline::new(config).run()?;
        if let ReportFormat::Text = format {
            println!("{}", summary);
        }
        summaries.push(summary);
    }

    if let ReportFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }
    Ok(())
}

fn cmd_example(output_path: &PathBuf, polarity: Polarity) -> Result<()> {
    let yaml = PipelineConfig::example(polarity).to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example {} configuration to {:?}", polarity, output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}

fn cmd_inspect(input: &PathBuf, separator: char, encoding: TextEncoding) -> Result<()> {
    let source = TableSource::new(input).separator(separator).encoding(encoding);
    let table = read_table(&source)?;

    println!("Table Profile");
    println!("=============");
    println!();
    println!("Dimensions:");
    println!("  Rows:    {}", table.n_rows());
    println!("  Columns: {}", table.n_columns());
    println!();
    println!("Columns:");
    for name in table.column_names() {
        println!("  {}", name);
    }

    let with_ids = add_feature_ids(&table)?;
    let ids = with_ids.resolve(FEATURE_ID_COLUMN)?;
    println!();
    println!("Feature identifiers (first 10 of {}):", ids.len());
    for id in ids.iter().take(10) {
        println!("  {}", id);
    }

    Ok(())
}
