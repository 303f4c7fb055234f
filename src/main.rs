mod cli;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        cli::print_help();
        return Ok(());
    }

    let scan_args = cli::parse_scan_args(&args)?;

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if scan_args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    cli::handle_scan(&scan_args).await
}
