//! docrender - Render Word templates from the command line

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docrender")]
#[command(version)]
#[command(about = "Fill Word and HTML templates with JSON data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Substitute placeholders in a template and save the result
    Render {
        /// Template: .docx for Word output, HTML for PDF output
        #[arg(short, long)]
        template: PathBuf,
        /// JSON object whose top-level keys are bound as variables
        #[arg(short, long)]
        data: PathBuf,
        /// Output document (.docx or .pdf); falls back to the settings file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on placeholders without a bound value
        #[arg(long)]
        strict: bool,
        /// Match key paths exactly instead of ignoring case
        #[arg(long)]
        case_sensitive: bool,
        /// Settings file (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// List the placeholders used by a template
    Placeholders {
        /// Template document (.docx)
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Write a new document with one paragraph per line
    Text {
        /// Output document (.docx or .pdf)
        #[arg(short, long)]
        output: PathBuf,
        /// Paragraph texts
        #[arg(required = true)]
        lines: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            data,
            output,
            strict,
            case_sensitive,
            settings,
        } => commands::render(commands::RenderArgs {
            template,
            data,
            output,
            strict,
            case_sensitive,
            settings,
        }),
        Commands::Placeholders { template } => commands::placeholders(&template),
        Commands::Text { output, lines } => commands::text(&output, &lines),
    }
}
