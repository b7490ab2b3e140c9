//! Command-line interface for the genre classifier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fiction_inference::GenreModel;
use tracing::Level;

use crate::render::{render, RenderOptions};
use crate::report::{Report, Reporter};
use crate::source::{Document, DocumentSource, JsonlSource, RECENT_DOCUMENT_LIMIT};

#[derive(Parser)]
#[command(name = "is-it-fiction")]
#[command(about = "Classify text as fiction or non-fiction", long_about = None)]
pub struct Cli {
    /// Text to classify (if not provided, reads from stdin)
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Classify a batch of posts from a JSONL file (one {"id", "text"} object per line)
    #[arg(short, long, value_name = "PATH", conflicts_with_all = ["text", "file"])]
    posts: Option<PathBuf>,

    /// Classify the recent posts of an account handle (requires --source-dir)
    #[arg(
        long,
        value_name = "HANDLE",
        requires = "source_dir",
        conflicts_with_all = ["text", "file", "posts"]
    )]
    handle: Option<String>,

    /// Directory holding <handle>.jsonl post archives
    #[arg(long, value_name = "DIR")]
    source_dir: Option<PathBuf>,

    /// Path to the pre-trained genre model artifact
    #[arg(short, long, value_name = "PATH")]
    model: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode (detailed output)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    /// Human-readable verdict with probabilities
    Human,
    /// Full report as JSON
    Json,
    /// Just the non-fiction probability as a float 0-1
    Probability,
    /// Self-contained HTML fragments
    Html,
}

enum ReportInput {
    Text(String),
    Documents {
        handle: Option<String>,
        documents: Vec<Document>,
    },
}

pub fn run(cli: &Cli) -> Result<()> {
    init_tracing(cli);

    // The model is loaded exactly once; an unreadable artifact refuses the
    // whole run rather than degrading to a default.
    let model = GenreModel::load(&cli.model)
        .with_context(|| format!("failed to load model from {}", cli.model.display()))?;
    let reporter = Reporter::new(model);

    let input = determine_input(cli)?;
    let (handle, report) = match input {
        ReportInput::Text(text) => (None, reporter.classify_text(&text)?),
        ReportInput::Documents { handle, documents } => {
            (handle, reporter.classify_documents(&documents)?)
        }
    };

    output_report(&report, handle.as_deref(), cli)
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        Level::WARN
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Determine input source from CLI args.
/// Priority: text arg > file > posts > handle > stdin
fn determine_input(cli: &Cli) -> Result<ReportInput> {
    use std::io::Read;

    if let Some(text) = &cli.text {
        return Ok(ReportInput::Text(text.clone()));
    }

    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        return Ok(ReportInput::Text(text));
    }

    if let Some(path) = &cli.posts {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read posts file: {}", path.display()))?;
        let documents = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<Document>)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| "Failed to parse posts JSONL")?;
        return Ok(ReportInput::Documents {
            handle: None,
            documents,
        });
    }

    if let (Some(handle), Some(dir)) = (&cli.handle, &cli.source_dir) {
        let source = JsonlSource::new(dir);
        let documents = source.recent_documents(handle, RECENT_DOCUMENT_LIMIT)?;
        return Ok(ReportInput::Documents {
            handle: Some(handle.clone()),
            documents,
        });
    }

    // Read from stdin
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(ReportInput::Text(buffer))
}

/// Output the report based on the selected format.
fn output_report(report: &Report, handle: Option<&str>, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Human => {
            println!("This is {}", report.genre);
            println!(
                "P(non-fiction) = {:.2}%, P(fiction) = {:.2}%",
                report.probability * 100.0,
                (1.0 - report.probability) * 100.0
            );
            if !report.genre_table.is_empty() {
                println!();
                println!("Genre ranking:");
                for row in report.genre_table.descending() {
                    println!("  {:<24} {:>6.2}%", row.genre, row.probability * 100.0);
                }
            }
            if !report.word_cloud.is_empty() {
                let top: Vec<&str> = report
                    .word_cloud
                    .iter()
                    .take(10)
                    .map(|(token, _)| token)
                    .collect();
                println!();
                println!("Telltale words: {}", top.join(", "));
            }
            if let (Some(handle), Some(id)) = (
                handle,
                report
                    .best_document
                    .as_ref()
                    .and_then(|best| best.id.as_deref()),
            ) {
                println!();
                println!(
                    "Most representative post: {}",
                    crate::render::permalink(handle, id)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(report)?);
        }
        OutputFormat::Probability => {
            println!("{:.4}", report.probability);
        }
        OutputFormat::Html => {
            let options = RenderOptions {
                handle: handle.map(String::from),
            };
            let rendered = render(report, &options);
            println!("<p>{}</p>", rendered.verdict);
            println!("<p>{}</p>", rendered.probability_sentence);
            for fragment in [
                rendered.bar_chart,
                rendered.word_cloud,
                rendered.table_html,
                rendered.embed,
            ]
            .into_iter()
            .flatten()
            {
                println!("{fragment}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_text_input_with_model() {
        let cli = Cli::try_parse_from(["is-it-fiction", "--model", "model.bin", "some text"])
            .unwrap();
        assert_eq!(cli.text.as_deref(), Some("some text"));
        assert_eq!(cli.model, PathBuf::from("model.bin"));
    }

    #[test]
    fn handle_requires_source_dir() {
        let result =
            Cli::try_parse_from(["is-it-fiction", "--model", "m.bin", "--handle", "goodcaptain"]);
        assert!(result.is_err());
    }

    #[test]
    fn text_and_file_are_exclusive() {
        let result = Cli::try_parse_from([
            "is-it-fiction",
            "--model",
            "m.bin",
            "--file",
            "in.txt",
            "text",
        ]);
        assert!(result.is_err());
    }
}
