//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use linkharvest_core::DEFAULT_BASE_URL;

/// Harvest file-host mirror links from a site's search results.
///
/// Pages through the search listing for the given keyword, probes every
/// album's download form for a redirect, and writes the allow-listed
/// mirror links to a text file, one per line.
#[derive(Parser, Debug)]
#[command(name = "linkharvest")]
#[command(author, version, about)]
pub struct Args {
    /// Search keyword in the URL-encoded form the site expects (e.g. "c107%20touhou")
    pub keyword: String,

    /// Base site URL; override to point at a mirror or a test server
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Directory for the links file (defaults to the executable's directory)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Delay between search page fetches in milliseconds (max 60000)
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub page_delay: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
