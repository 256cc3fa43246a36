//! Output artifact naming, link file writing, and the end-of-run tally.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Printed when harvesting finds no album ids at all.
pub const NO_IDS_GUIDANCE: &str =
    "No album ids matched the keyword. Check the keyword spelling and URL encoding.";

/// Printed when resolution finishes without a single mirror link.
pub const NO_LINKS_MESSAGE: &str = "Finished without extracting any valid mirror links.";

/// Derives the output filename from the URL-encoded search keyword.
///
/// The keyword is percent-decoded first so `c107%20touhou` becomes
/// `links_c107_touhou.txt`; characters illegal in Windows or Unix filenames
/// (and spaces) are replaced with underscores. Deterministic for a given
/// keyword.
#[must_use]
pub fn output_filename(keyword: &str) -> String {
    let decoded = urlencoding::decode(keyword)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| keyword.to_string());
    let safe: String = decoded
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    format!("links_{safe}.txt")
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | ' ')
}

/// Directory the links file lands in by default: beside the executable,
/// falling back to the current directory when the executable path is
/// unavailable.
#[must_use]
pub fn default_output_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes the mirror links one per line, ascending, overwriting `path`.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be written.
pub fn write_links(path: &Path, links: &BTreeSet<String>) -> io::Result<()> {
    let body = links
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(path, body)
}

/// Per-host link counts for the console summary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HostTally {
    /// Links on mega.nz.
    pub mega: usize,
    /// Links on mediafire.com.
    pub mediafire: usize,
    /// Links on drive.google.com.
    pub google_drive: usize,
    /// Links on pixeldrain.com.
    pub pixeldrain: usize,
}

impl HostTally {
    /// Counts links per allow-listed host substring.
    #[must_use]
    pub fn from_links(links: &BTreeSet<String>) -> Self {
        let count = |host: &str| links.iter().filter(|link| link.contains(host)).count();
        Self {
            mega: count("mega.nz"),
            mediafire: count("mediafire.com"),
            google_drive: count("drive.google.com"),
            pixeldrain: count("pixeldrain.com"),
        }
    }

    /// Renders the distribution line for the final summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Mega({}), Mediafire({}), GD({}), PD({})",
            self.mega, self.mediafire, self.google_drive, self.pixeldrain
        )
    }
}
