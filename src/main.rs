//! CouponFinder CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use coupon_finder::cli;
use coupon_finder::page::{checkout_signal, match_coupon_field, HtmlPage, Page};
use coupon_finder::parser::parse_manifest_from_file;
use coupon_finder::validator::{missing_capabilities, validate_manifest};
use coupon_finder::{run_session, Config, CouponChoice, Manifest, SessionOptions, Visit};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coupon-finder")]
#[command(about = "Find and apply coupon codes on checkout pages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checkout detection and coupon field discovery on a page
    Detect {
        /// Page URL
        #[arg(short, long)]
        url: String,

        /// HTML of the page (defaults to an empty body)
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Visit a page with the extension installed and use the popup
    Session {
        /// Page URL
        #[arg(short, long)]
        url: String,

        /// HTML of the page (defaults to an empty body)
        #[arg(long)]
        html: Option<PathBuf>,

        /// JSON5 config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Coupon code to click (defaults to the first one listed)
        #[arg(long, conflicts_with = "interactive")]
        code: Option<String>,

        /// Pick the coupon from a menu
        #[arg(short, long)]
        interactive: bool,

        /// Simulate a clipboard the page may not write to
        #[arg(long)]
        deny_clipboard: bool,
    },

    /// Write the extension manifest
    Manifest {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse and validate a manifest.json
    CheckManifest {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn load_html(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => Ok("<html><body></body></html>".to_string()),
    }
}

fn detect(url: &str, html: Option<&Path>) -> Result<()> {
    let page = HtmlPage::parse(url, &load_html(html)?)?;
    let fields = page.input_fields();
    cli::print_detection(page.href(), checkout_signal(&page), match_coupon_field(&fields));
    Ok(())
}

fn session(
    url: String,
    html: Option<&Path>,
    config: &Config,
    code: Option<String>,
    interactive: bool,
    deny_clipboard: bool,
) -> Result<()> {
    let visit = Visit::new(url, load_html(html)?);
    let options = SessionOptions { deny_clipboard };
    let choice = code.map(CouponChoice::Code).unwrap_or(CouponChoice::First);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let spinner = cli::spinner("Looking for coupons...");
    let progress = spinner.clone();

    let outcome = runtime.block_on(run_session(config, &visit, &options, move |coupons| {
        progress.finish_and_clear();
        if !interactive {
            return choice.pick(coupons);
        }
        cli::select_coupon(coupons).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "coupon selection aborted");
            None
        })
    }));
    spinner.finish_and_clear();

    cli::print_outcome(&outcome?);
    Ok(())
}

fn write_manifest(output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&Manifest::coupon_finder())?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "✅ Manifest written to".green().bold(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn check_manifest(input: &Path) -> Result<()> {
    let manifest = parse_manifest_from_file(input)?;
    println!("Extension: {} v{}", manifest.name, manifest.version);

    for capability in missing_capabilities(&manifest) {
        println!("  {} {}", "✗ missing".red(), capability);
    }
    validate_manifest(&manifest)?;

    println!("{}", "✅ Manifest grants everything CouponFinder needs".green().bold());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect { url, html } => {
            init_tracing("warn");
            detect(&url, html.as_deref())
        }
        Commands::Session {
            url,
            html,
            config,
            code,
            interactive,
            deny_clipboard,
        } => load_config(config.as_deref()).and_then(|config| {
            init_tracing(&config.log_filter);
            session(url, html.as_deref(), &config, code, interactive, deny_clipboard)
        }),
        Commands::Manifest { output } => write_manifest(output.as_deref()),
        Commands::CheckManifest { input } => check_manifest(&input),
    };

    if let Err(e) = result {
        eprintln!("{}", "❌ Failed!".red().bold());
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
