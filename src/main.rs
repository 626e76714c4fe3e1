// src/main.rs
// =============================================================================
// This is the entry point of the CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, WARN by default, DEBUG with --verbose)
// 3. Dispatch to the subcommand handler
// 4. Print the report and exit with the proper code
//    (0 = every link valid, 1 = broken links, 2 = error)
//
// The engine itself lives in the library (src/lib.rs). The only async part
// is the optional live check of external links.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, SiteArgs};
use fest_link_guardian::checker::{self, Classifier};
use fest_link_guardian::{discover, write_report, Document, SiteChecker, SiteConfig, ValidationReport};
use std::path::{Path, PathBuf};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = could not produce a report (exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check { site } => handle_check(&site).await,
        Commands::File { path, site } => handle_file(&path, &site).await,
        Commands::Classify { url, config } => handle_classify(&url, config.as_deref()),
    }
}

// Handles the 'check' subcommand: every document of the project
async fn handle_check(site: &SiteArgs) -> Result<i32> {
    eprintln!("🔍 Scanning project: {}", site.root.display());

    let config = load_config(site.config.as_deref(), &site.root);
    let documents = discover::find_documents(&site.root, &config);

    if documents.is_empty() {
        eprintln!("⚠️  No HTML documents found");
    } else {
        eprintln!("📄 Found {} document(s) to check", documents.len());
    }

    run_pipeline(site, config, documents).await
}

// Handles the 'file' subcommand: a single document
async fn handle_file(path: &Path, site: &SiteArgs) -> Result<i32> {
    eprintln!("🔍 Checking file: {}", path.display());

    let config = load_config(site.config.as_deref(), &site.root);
    let document = document_for(&site.root, path);
    run_pipeline(site, config, vec![document]).await
}

// Handles the 'classify' subcommand
fn handle_classify(url: &str, config: Option<&Path>) -> Result<i32> {
    let config = load_config(config, Path::new("."));
    let category = Classifier::new(&config).category_of(url);
    println!("{}", category);
    Ok(0)
}

async fn run_pipeline(site: &SiteArgs, config: SiteConfig, documents: Vec<Document>) -> Result<i32> {
    let site_checker =
        SiteChecker::new(site.root.clone(), config).context("site configuration is not usable")?;
    let mut results = site_checker.check_documents(documents);

    if site.check_external {
        eprintln!("🌐 Checking external links (concurrency {})...", site.concurrency);
        let demoted = checker::http::recheck_external(
            results.iter_mut().flat_map(|document| document.results.iter_mut()),
            site.concurrency,
        )
        .await
        .context("live external check failed")?;
        eprintln!("   {} external link(s) unreachable", demoted);
    }

    let mut report = ValidationReport::from_results(results);
    report.valid_internal_urls = site_checker.config().valid_internal_urls(&site.root);

    let rendered = if site.json {
        report.to_json()?
    } else {
        report.render_text()
    };
    println!("{}", rendered);

    if let Some(output) = &site.output {
        write_report(output, &rendered)?;
        eprintln!("💾 Report saved to {}", output.display());
    }

    if let Some(csv) = &site.csv {
        write_report(csv, &report.to_csv()?)?;
        eprintln!("💾 CSV export saved to {}", csv.display());
    }

    if report.is_success() {
        Ok(0) // Exit code 0 = all good
    } else {
        Ok(1) // Exit code 1 = broken links found
    }
}

// An explicit --config must exist; the default location may be absent.
// Either way a broken file falls back to the defaults with a warning.
fn load_config(explicit: Option<&Path>, root: &Path) -> SiteConfig {
    match explicit {
        Some(path) if !path.is_file() => {
            tracing::warn!(path = %path.display(), "config file not found, using built-in defaults");
            SiteConfig::default()
        }
        Some(path) => SiteConfig::load_or_default(path),
        None => SiteConfig::load_or_default(&root.join(SiteConfig::FILE_NAME)),
    }
}

// Documents inside the root are named relative to it so relative links resolve
fn document_for(root: &Path, path: &Path) -> Document {
    let relative = path.strip_prefix(root).ok().map(Path::to_path_buf).or_else(|| {
        let root = root.canonicalize().ok()?;
        let path = path.canonicalize().ok()?;
        path.strip_prefix(&root).ok().map(Path::to_path_buf)
    });

    match relative {
        Some(relative) => Document::read(root, relative),
        None => Document {
            id: path.display().to_string(),
            path: None::<PathBuf>,
            content: std::fs::read_to_string(path),
        },
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is main async when the pipeline is not?
//    - Only --check-external talks to the network, and that part uses reqwest
//      and futures. Everything else runs straight through on one thread.
//
// 2. Why print progress with eprintln!?
//    - stdout carries the report. With --json it has to stay valid JSON, so
//      progress lines and logs go to stderr.
//
// 3. What does {:#} do for an anyhow::Error?
//    - It prints the whole chain: "site configuration is not usable: invalid
//      skip pattern ..." instead of only the outermost message.
// -----------------------------------------------------------------------------
