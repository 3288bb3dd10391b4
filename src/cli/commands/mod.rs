//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod languages;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};
use crate::text::PageBreaks;

#[derive(Parser)]
#[command(name = "textgrab")]
#[command(about = "Extract plain text from scanned images and PDFs")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image or PDF
    Run(RunArgs),

    /// List supported language codes
    Languages,

    /// Check external tools and installed language models
    Check,
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunArgs {
    /// Image (png, jpg, jpeg, bmp, tiff, tif) or PDF file
    file: PathBuf,

    /// Comma-separated language codes (e.g. "en,tl")
    #[arg(short, long)]
    languages: Option<String>,

    /// PDF rasterization resolution
    #[arg(long)]
    dpi: Option<f32>,

    /// Pages recognized concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep page delimiters on their own lines or flatten everything
    #[arg(long, value_enum)]
    page_breaks: Option<PageBreaks>,

    /// Tesseract language data directory
    #[arg(long)]
    tessdata_dir: Option<PathBuf>,

    /// Directory to write annotated page images to
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Draw boxes only, without text labels
    #[arg(long)]
    no_labels: bool,

    /// List detected regions with their confidence
    #[arg(long)]
    regions: bool,

    /// Directory for the `<name>_ocr.txt` file (default: print to stdout only)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Languages => languages::cmd_languages(),
        Commands::Check => {
            let settings = load_settings(&LoadOptions {
                config_path: cli.config,
            })?;
            check::cmd_check(&settings)
        }
        Commands::Run(args) => {
            let settings = load_settings(&LoadOptions {
                config_path: cli.config,
            })?;
            run::cmd_run(settings, args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "textgrab",
            "-v",
            "run",
            "scan.pdf",
            "-l",
            "en,ja",
            "--dpi",
            "300",
            "--page-breaks",
            "preserve",
            "--annotate",
            "out/boxes",
            "--no-labels",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.file, PathBuf::from("scan.pdf"));
        assert_eq!(args.languages.as_deref(), Some("en,ja"));
        assert_eq!(args.dpi, Some(300.0));
        assert_eq!(args.page_breaks, Some(PageBreaks::Preserve));
        assert_eq!(args.annotate, Some(PathBuf::from("out/boxes")));
        assert!(args.no_labels);
        assert!(!args.regions);
    }

    #[test]
    fn test_tessdata_dir_only_from_flag() {
        let cli = Cli::try_parse_from(["textgrab", "run", "scan.png"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.tessdata_dir, None);

        let cli = Cli::try_parse_from(["textgrab", "run", "scan.png", "--tessdata-dir", "td"])
            .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.tessdata_dir, Some(PathBuf::from("td")));
    }

    #[test]
    fn test_run_requires_file() {
        assert!(Cli::try_parse_from(["textgrab", "run"]).is_err());
    }

    #[test]
    fn test_subcommands_parse() {
        assert!(matches!(
            Cli::try_parse_from(["textgrab", "languages"]).unwrap().command,
            Commands::Languages
        ));
        assert!(matches!(
            Cli::try_parse_from(["textgrab", "--config", "x.toml", "check"])
                .unwrap()
                .command,
            Commands::Check
        ));
    }
}
