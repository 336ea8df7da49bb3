//! image-title-captions CLI
//!
//! Reads a JSON document tree, turns image titles into figure captions and writes the
//! resulting tree back out as JSON or HTML.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image_title_captions::{CaptionOptions, ImageTitlesToCaptions, Root, Transform};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// hast-style JSON tree (default)
    Json,
    /// Rendered HTML
    Html,
}

#[derive(Parser)]
#[command(name = "image-title-captions")]
#[command(version)]
#[command(about = "Turn image titles into figure captions", long_about = None)]
struct Cli {
    /// JSON document tree to read (default: stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where to write the result (default: stdout)
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON file with options (pictureSelector, imgSelector, deleteTitles)
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Selector for the elements to wrap (default: the image selector)
    #[arg(long, value_name = "SELECTOR")]
    picture_selector: Option<String>,

    /// Selector for the image carrying the title (default: img)
    #[arg(long, value_name = "SELECTOR")]
    img_selector: Option<String>,

    /// Keep title attributes after creating captions
    #[arg(long)]
    keep_titles: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "json")]
    format: Format,

    /// Print a JSON summary of the pass to stderr
    #[arg(long)]
    report: bool,

    /// Print the JSON schema of the options file and exit
    #[arg(long)]
    print_schema: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.print_schema {
        let schema = schemars::schema_for!(CaptionOptions);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let options = load_options(&cli)?;
    let transform = ImageTitlesToCaptions::new(options).context("Invalid options")?;

    let source = read_input(cli.input.as_ref())?;
    let mut tree = Root::from_json(&source).context("Failed to parse document tree")?;

    log::debug!(
        "Running {} with picture selector `{}`, image selector `{}`",
        transform.name(),
        transform.options().picture_selector,
        transform.options().img_selector
    );

    let report = transform
        .apply(&mut tree)
        .with_context(|| format!("{} failed", transform.name()))?;

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    let rendered = match cli.format {
        Format::Json => tree.to_json()?,
        Format::Html => tree.to_html(),
    };
    write_output(cli.output.as_ref(), &rendered)
}

/// Options file first, then command line flags on top
fn load_options(cli: &Cli) -> Result<CaptionOptions> {
    let base = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            CaptionOptions::from_json(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => CaptionOptions::default(),
    };

    let overrides = CaptionOptions {
        picture_selector: cli.picture_selector.clone(),
        img_selector: cli.img_selector.clone(),
        delete_titles: cli.keep_titles.then_some(false),
    };
    Ok(base.merge(overrides))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&PathBuf>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered).context("Failed to write stdout")
        }
    }
}
