use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use scraper::Html;

use ticket_scan::adapters;
use ticket_scan::client::HttpClientFactory;
use ticket_scan::config;

#[derive(Debug, PartialEq, Eq)]
pub struct ScanArgs {
    pub url: Url,
    pub html_path: Option<PathBuf>,
    pub verbose: bool,
}

/// Scan one page and print every ticket found as a JSON line.
pub async fn handle_scan(args: &ScanArgs) -> Result<()> {
    let config = config::load_config()?;
    let factory = Arc::new(HttpClientFactory::new(&config.http)?);

    let html = match &args.html_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => factory
            .fetch_text(&args.url)
            .await
            .with_context(|| format!("Failed to load page {}", args.url))?,
    };
    let document = Html::parse_document(&html);

    let adapters = adapters::create_adapters(&config, factory);
    if adapters.is_empty() {
        bail!("No adapters enabled. Check ~/.ticket-scan/config.toml");
    }

    let tickets = adapters::scan_all(&adapters, &args.url, &document).await?;
    log::info!("Found {} ticket(s) on {}", tickets.len(), args.url);

    for ticket in &tickets {
        println!("{}", serde_json::to_string(ticket)?);
    }

    Ok(())
}

/// Parse `ticket-scan` arguments.
///
/// Supported forms:
///   ticket-scan https://example.youtrack.cloud/issue/TT-1
///   ticket-scan <url> --html page.html
///   ticket-scan <url> -v
pub fn parse_scan_args(args: &[String]) -> Result<ScanArgs> {
    let mut url: Option<Url> = None;
    let mut html_path: Option<PathBuf> = None;
    let mut verbose = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--html" | "-f" => {
                i += 1;
                match args.get(i) {
                    Some(path) => html_path = Some(PathBuf::from(path)),
                    None => bail!("Missing value for --html flag"),
                }
            }
            "-v" | "--verbose" => verbose = true,
            flag if flag.starts_with('-') => bail!("Unknown option: {flag}"),
            raw => {
                if url.is_some() {
                    bail!("Only one page URL may be given");
                }
                let parsed =
                    Url::parse(raw).with_context(|| format!("Invalid page URL: {raw}"))?;
                url = Some(parsed);
            }
        }
        i += 1;
    }

    let Some(url) = url else {
        bail!("Usage: ticket-scan <url> [--html <file>] [-v]");
    };

    Ok(ScanArgs {
        url,
        html_path,
        verbose,
    })
}

pub fn print_help() {
    println!("ticket-scan — find issue-tracker tickets referenced by a page\n");
    println!("USAGE:");
    println!("  ticket-scan <url> [options]");
    println!();
    println!("OPTIONS:");
    println!("  -f, --html <file>  Use a saved copy of the page instead of fetching it");
    println!("  -v, --verbose      Log adapter decisions to stderr");
    println!("  -h, --help         Show this help");
    println!();
    println!("EXAMPLES:");
    println!("  ticket-scan https://example.youtrack.cloud/issue/TT-1");
    println!("  ticket-scan \"https://example.youtrack.cloud/agiles/1-2/current?issue=TT-2\" -f board.html");
}
