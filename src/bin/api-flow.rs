//! API Flow CLI
//!
//! Command-line interface for detecting, analyzing and converting API descriptions.

use std::path::PathBuf;
use std::process::ExitCode;

use api_flow::{
    convert, detect, parse, read_source_auto, ConvertOptions, Format, SchemaGraph,
};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "API_FLOW_LOG";

#[derive(Parser)]
#[command(name = "api-flow")]
#[command(about = "Convert API descriptions between formats")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to another format
    Convert {
        /// Source: file path or URL (http:// or https://)
        source: String,

        /// Target format: internal or raml
        #[arg(long)]
        to: String,

        /// Source format: swagger or internal (detected if omitted)
        #[arg(long)]
        from: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Fail instead of writing schemas as raw JSON when the target cannot express them
        #[arg(long)]
        strict: bool,
    },

    /// Score a document against every known source format
    Detect {
        /// Source: file path or URL (http:// or https://)
        source: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Report the schema dependency graph and which schemas convert natively
    Analyze {
        /// Source: file path or URL (http:// or https://)
        source: String,

        /// Source format: swagger or internal (detected if omitted)
        #[arg(long)]
        from: Option<String>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            source,
            to,
            from,
            output,
            strict,
        } => run_convert(&source, &to, from.as_deref(), output, strict),
        Commands::Detect { source, json } => run_detect(&source, json),
        Commands::Analyze { source, from, json } => run_analyze(&source, from.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr. `-v` flags win over the environment filter.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_format(name: &str) -> Result<Format, u8> {
    Format::parse(name).ok_or_else(|| {
        eprintln!("Error: unknown format '{}'", name);
        2u8
    })
}

fn load(source: &str) -> Result<String, u8> {
    read_source_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_convert(
    source: &str,
    to: &str,
    from: Option<&str>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<(), u8> {
    let mut options = ConvertOptions::new(parse_format(to)?).strict(strict);
    if let Some(from) = from {
        options = options.from(parse_format(from)?);
    }

    let content = load(source)?;
    let converted = convert(&content, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &converted).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", converted);
        }
    }

    Ok(())
}

fn run_detect(source: &str, json_output: bool) -> Result<(), u8> {
    let content = load(source)?;
    let detections = detect(&content);

    if json_output {
        let output = serde_json::to_string_pretty(&detections).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else {
        for detection in &detections {
            println!(
                "{} {}: {:.2}",
                detection.format, detection.version, detection.score
            );
        }
    }

    if detections.iter().any(|d| d.score > 0.0) {
        Ok(())
    } else {
        Err(2)
    }
}

fn run_analyze(source: &str, from: Option<&str>, json_output: bool) -> Result<(), u8> {
    let from = from.map(parse_format).transpose()?;
    let content = load(source)?;
    let api = parse(&content, from).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let graph = SchemaGraph::from_store(&api.store);
    let report: Vec<serde_json::Value> = graph
        .nodes()
        .map(|node| {
            serde_json::json!({
                "name": node.name,
                "deps": node.deps,
                "convertible": node.convertible,
                "transitivelyConvertible": graph.is_transitively_convertible(&node.name),
            })
        })
        .collect();

    if json_output {
        let output = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
        return Ok(());
    }

    if report.is_empty() {
        println!("No named schemas");
        return Ok(());
    }
    for node in graph.nodes() {
        let status = if graph.is_transitively_convertible(&node.name) {
            "native"
        } else if node.convertible {
            "raw (dependency)"
        } else {
            "raw"
        };
        if node.deps.is_empty() {
            println!("{}: {}", node.name, status);
        } else {
            println!("{}: {} -> {}", node.name, status, node.deps.join(", "));
        }
    }
    Ok(())
}
