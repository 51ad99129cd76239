// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewerk: assemble one PDF from pages of many PDFs and images.
//
// Entry point. Initialises logging, loads the config, and dispatches the
// subcommand.

mod commands;
mod plan;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pagewerk_core::InsertionMode;
use pagewerk_core::human_errors::humanize_error;

use commands::MergeOptions;
use services::config_dir;

#[derive(Parser)]
#[command(name = "pagewerk")]
#[command(about = "Assemble one PDF from pages of many PDFs and images")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/pagewerk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge files in order into one PDF
    Merge {
        /// PDFs and images (jpg, png, tiff, webp)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output name; ".pdf" is appended if missing
        #[arg(short, long)]
        output: Option<String>,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Pages to take from each PDF, e.g. "1-3,5"
        #[arg(long)]
        range: Option<String>,
        /// How each file joins the pages before it: append, prepend,
        /// interleave, or after:<position>
        #[arg(long, default_value = "append")]
        mode: InsertionMode,
        /// Rotate every page clockwise by a multiple of 90 degrees
        #[arg(long, allow_negative_numbers = true)]
        rotate: Option<i32>,
        /// Document title
        #[arg(long)]
        title: Option<String>,
    },
    /// Run a JSON assembly plan
    Plan {
        plan: PathBuf,
        /// Directory to write into (default: the plan's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show page count and page sizes of a file
    Inspect { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_dir::load_config(cli.config.as_deref()).await;

    let result = match cli.command {
        Command::Merge {
            inputs,
            output,
            out_dir,
            range,
            mode,
            rotate,
            title,
        } => {
            let options = MergeOptions {
                inputs,
                output,
                out_dir,
                range,
                mode,
                rotate,
                title,
            };
            commands::merge(config, options).await
        }
        Command::Plan { plan, out_dir } => commands::plan(config, &plan, out_dir).await,
        Command::Inspect { file } => commands::inspect(&file).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}
