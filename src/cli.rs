// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Flags only override settings that were actually given; everything else
// comes from site-guardian.toml or the built-in defaults (see config.rs).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use site_guardian::config::AuditConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "site-guardian",
    version,
    about = "Audit a static site for broken links, orphan pages and SEO health",
    long_about = "site-guardian scans a directory of HTML documents, checks that every internal link \
                  resolves to a real file, probes external links, finds pages nothing links to, and \
                  reports a 0-100 health score. It's meant to run in CI before a deploy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit the site and print a report
    ///
    /// Example: site-guardian audit ./public --min-score 80
    Audit(AuditArgs),

    /// Rewrite relative links into clean root-relative ones
    ///
    /// Without --write this is a dry run that lists the changes.
    FixLinks {
        /// Site root directory
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Actually modify the files
        #[arg(long)]
        write: bool,

        /// Config file (default: <ROOT>/site-guardian.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the rewrites as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Site root directory
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Config file (default: <ROOT>/site-guardian.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Site URL to use when the entry point has no canonical link
    #[arg(long)]
    pub base_url: Option<String>,

    /// Entry-point document, relative to the root
    #[arg(long)]
    pub entry_point: Option<String>,

    /// Maximum number of external links checked at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout for external links, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Don't check external links at all
    #[arg(long)]
    pub offline: bool,

    /// Exit with code 1 if the score is below this
    #[arg(long, default_value_t = 0)]
    pub min_score: u32,
}

impl AuditArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut AuditConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(entry_point) = &self.entry_point {
            config.entry_point = entry_point.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.offline {
            config.check_external = false;
        }
    }
}
