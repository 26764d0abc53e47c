//! restdoc CLI
//!
//! Command-line interface for generating and aggregating Swagger documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use restdoc::{aggregate_directory, generate_from_catalog, AggregatorConfig, GeneratorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restdoc")]
#[command(about = "Generate and aggregate Swagger 2.0 documents for REST resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a document from a resource catalog
    Generate {
        /// Directory holding the scanned packages
        #[arg(long, default_value = "target/classes")]
        classes_dir: PathBuf,

        /// Comma-separated packages to scan
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "org.openmrs.module.webservices.rest.web.v1_0.resource"
        )]
        scan_packages: Vec<String>,

        /// Directory the document is written to
        #[arg(long, default_value = "target/generated-sources/openapi")]
        output_dir: PathBuf,

        /// Version used in the output file name
        #[arg(long = "version", default_value = "2.4")]
        spec_version: String,

        /// Host advertised by the document
        #[arg(long, default_value = "localhost:8080/openmrs")]
        host: String,

        /// Base path advertised by the document
        #[arg(long, default_value = "/openmrs")]
        base_path: String,

        /// Do nothing
        #[arg(long)]
        skip: bool,
    },

    /// Merge every document of a directory into one
    Aggregate {
        /// Directory of documents to merge
        #[arg(long, default_value = "target/module-specs")]
        input_dir: PathBuf,

        /// Directory the merged document is written to
        #[arg(long, default_value = "target/aggregated-openapi")]
        output_dir: PathBuf,

        /// File name of the merged document
        #[arg(long, default_value = "openapi-aggregated.json")]
        output_filename: String,

        /// Base URL of the aggregated API
        #[arg(long, default_value = "http://localhost:8080/openmrs")]
        base_url: String,

        #[arg(long, default_value = "1.0.0")]
        api_version: String,

        #[arg(long, default_value = "OpenMRS REST API (Aggregated)")]
        api_title: String,

        #[arg(long, default_value = "Aggregated OpenMRS REST API specification")]
        api_description: String,

        /// Check each document before merging (default: true)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        validate: bool,

        /// Extra document to merge: file path or URL (repeatable)
        #[arg(long = "spec-url")]
        spec_urls: Vec<String>,

        /// Do nothing
        #[arg(long)]
        skip: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Generate {
            classes_dir,
            scan_packages,
            output_dir,
            spec_version,
            host,
            base_path,
            skip,
        } => {
            if skip {
                info!("generation skipped");
                Ok(())
            } else {
                let config = GeneratorConfig::default().host(host).base_path(base_path);
                run_generate(&classes_dir, &scan_packages, &output_dir, &spec_version, config)
            }
        }

        Commands::Aggregate {
            input_dir,
            output_dir,
            output_filename,
            base_url,
            api_version,
            api_title,
            api_description,
            validate,
            spec_urls,
            skip,
        } => {
            if skip {
                info!("aggregation skipped");
                Ok(())
            } else {
                let mut config = AggregatorConfig::default()
                    .base_url(base_url)
                    .api_version(api_version)
                    .title(api_title)
                    .description(api_description)
                    .validate(validate)
                    .output_filename(output_filename);
                config.spec_urls = spec_urls;
                run_aggregate(&input_dir, &output_dir, &config)
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(
    classes_dir: &Path,
    packages: &[String],
    output_dir: &Path,
    version: &str,
    config: GeneratorConfig,
) -> Result<(), u8> {
    let path = generate_from_catalog(classes_dir, packages, output_dir, version, config).map_err(
        |e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        },
    )?;
    println!("{}", path.display());
    Ok(())
}

fn run_aggregate(input_dir: &Path, output_dir: &Path, config: &AggregatorConfig) -> Result<(), u8> {
    let written = aggregate_directory(input_dir, output_dir, config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    if let Some(path) = written {
        println!("{}", path.display());
    }
    Ok(())
}
