// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   fest-link-guardian check [--root DIR] [--config FILE] [--json] [--output FILE]
//                            [--csv FILE] [--check-external] [--concurrency N]
//   fest-link-guardian file <PATH> [--root DIR] [--config FILE] [--json]
//   fest-link-guardian classify <URL>
//
// --verbose is global and works with every subcommand.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fest-link-guardian",
    version,
    about = "Validate every link in the festival site's HTML without a running server",
    long_about = "fest-link-guardian classifies every link in the site's HTML pages and checks it \
                  against the project on disk, the clean-URL route table and format rules. \
                  Exits 0 when every link is valid, 1 when some are broken, 2 on errors."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logging to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Options shared by the commands that validate documents.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Site configuration file (defaults to <root>/linkcheck.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the machine-readable JSON report instead of text
    #[arg(long)]
    pub json: bool,

    /// Also save the report to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Export every checked link as CSV to this file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Request every well-formed external URL over the network
    #[arg(long)]
    pub check_external: bool,

    /// Maximum concurrent requests for --check-external
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate every HTML document of the project
    ///
    /// Example: fest-link-guardian check --root ./site --json
    Check {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// Validate a single HTML file
    ///
    /// Example: fest-link-guardian file pages/about.html
    File {
        /// HTML file to check; relative links resolve against its directory
        path: PathBuf,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Print the category a URL would be given
    ///
    /// Example: fest-link-guardian classify /api/gallery
    Classify {
        url: String,

        /// Site configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
