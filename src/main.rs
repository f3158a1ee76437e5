use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use repo_context::config::{load_config, OutputFormat};
use repo_context::document::format_count;
use repo_context::generator::{generate, now_timestamp, output_path, resolve_root, write_output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "repo-context")]
#[command(version)]
#[command(about = "Generate a size-bounded context document describing a source repository")]
struct Cli {
    /// Repository to describe
    #[arg(value_name = "REPO_PATH", default_value = ".")]
    repo_path: PathBuf,

    /// Output file (relative paths resolve against the repository root)
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Per-file byte ceiling; larger files become a placeholder
    #[arg(long, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Character ceiling for the whole document
    #[arg(long, value_name = "CHARS")]
    max_total_size: Option<usize>,

    /// Files longer than this are truncated
    #[arg(long, value_name = "N")]
    max_lines: Option<usize>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print the document to stdout instead of writing the output file
    #[arg(long)]
    stdout: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let root = resolve_root(&cli.repo_path)?;

    let mut cfg = load_config(&root);
    if let Some(out) = cli.output {
        cfg.output_file = out;
    }
    if let Some(n) = cli.max_file_size {
        cfg.budget.max_fragment_size = n;
    }
    if let Some(n) = cli.max_total_size {
        cfg.budget.max_document_size = n;
    }
    if let Some(n) = cli.max_lines {
        cfg.budget.max_lines = n;
    }
    if let Some(format) = cli.format {
        cfg.format = format;
    }

    eprintln!("Analyzing repository: {}", root.display());
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message("assembling context...");
    let generated = generate(&root, &cfg, now_timestamp());
    spinner.finish_and_clear();
    let generated = generated.with_context(|| format!("Failed to generate context for {}", root.display()))?;

    let types = if generated.project_types().is_empty() {
        "Generic".to_string()
    } else {
        generated.project_types().join(", ")
    };

    if cli.stdout {
        print!("{}", generated.text);
        return Ok(());
    }

    let out = output_path(&root, &cfg);
    write_output(&out, &generated.text)?;

    println!("Context file generated: {}", out.display());
    println!("Size: {} characters", format_count(generated.text.chars().count() as u64));
    println!("Detected types: {types}");
    Ok(())
}
