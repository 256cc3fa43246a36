//! CLI entry point for the linkharvest tool.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use linkharvest_core::{Harvester, Resolver, client, output};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let started = Instant::now();
    info!(keyword = %args.keyword, "searching for albums");

    let harvester = Harvester::new(
        client::search_client(&args.base_url),
        args.base_url.clone(),
    )
    .with_page_delay(Duration::from_millis(args.page_delay));

    let harvested = harvester.harvest(&args.keyword).await;

    if harvested.ids.is_empty() {
        // An aborted run already logged the failing page; plain guidance
        // only fits the clean zero-result case.
        if harvested.abort.is_none() {
            info!("{}", output::NO_IDS_GUIDANCE);
        }
        return Ok(());
    }

    info!(
        albums = harvested.ids.len(),
        pages = harvested.pages_fetched,
        "search complete"
    );

    let resolver = Resolver::new(
        client::resolve_client(&args.base_url),
        args.base_url.clone(),
    );
    let summary = resolver.resolve_all(&harvested.ids).await;

    if summary.mirrors.is_empty() {
        info!("{}", output::NO_LINKS_MESSAGE);
        return Ok(());
    }

    let output_dir = args.output_dir.unwrap_or_else(output::default_output_dir);
    let path = output_dir.join(output::output_filename(&args.keyword));
    output::write_links(&path, &summary.mirrors)?;

    let tally = output::HostTally::from_links(&summary.mirrors);
    let written = path.canonicalize().unwrap_or(path);

    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "run complete"
    );
    info!("Distribution: {}", tally.summary());
    info!(total = summary.mirrors.len(), "valid mirror links");
    info!(path = %written.display(), "links written");

    Ok(())
}
