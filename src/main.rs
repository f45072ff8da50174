// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (diagnostics on stderr, the report on stdout)
// 2. Parse command-line arguments using clap
// 3. Load the configuration and run the requested command
// 4. Print the report
// 5. Exit with proper code (0 = healthy, 1 = broken links / low score, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use cli::{AuditArgs, Cli, Commands};
use site_guardian::audit::{self, AuditReport, Severity};
use site_guardian::config::AuditConfig;
use site_guardian::site::fix::{fix_links, FileFix};
use site_guardian::site::PathResolver;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    // RUST_LOG overrides the default level (info).
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit(args) => handle_audit(args).await,
        Commands::FixLinks {
            root,
            write,
            config,
            json,
        } => handle_fix_links(&root, write, config.as_deref(), json),
    }
}

async fn handle_audit(args: AuditArgs) -> Result<i32> {
    let mut config = AuditConfig::load(&args.root, args.config.as_deref())?;
    args.apply_to(&mut config);

    if !args.json {
        println!("🔍 Auditing site: {}", args.root.display());
    }

    let report = audit::run_audit(&args.root, &config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_broken_links() || report.score < args.min_score {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn handle_fix_links(root: &Path, write: bool, config_path: Option<&Path>, json: bool) -> Result<i32> {
    let config = AuditConfig::load(root, config_path)?;
    let resolver = PathResolver::new(root, &config.document_suffix, &config.index_document)?;
    let fixes = fix_links(&resolver, &config, write)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fixes)?);
    } else {
        print_fixes(&fixes, write);
    }
    Ok(0)
}

// Prints the report as a human-readable listing
fn print_report(report: &AuditReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!(" AUDIT REPORT");
    println!("{}", "=".repeat(60));
    println!("📄 Documents scanned: {}", report.documents_scanned);
    println!("🌐 External links checked: {}", report.external_checked);
    if let Some(base) = &report.profile.base_url {
        println!("🏠 Base URL: {}", base);
    }
    println!();

    for issue in &report.issues {
        println!(
            "{} [{}] {} (-{})",
            format_severity(issue.severity()),
            issue.kind,
            issue.message,
            issue.weight
        );
    }

    println!("{}", "-".repeat(60));
    println!("🔗 Top pages by inbound links:");
    for page in &report.top_pages {
        println!("   {:>4} links -> {}", page.inbound, page.identity);
    }

    println!("{}", "-".repeat(60));
    let band = match report.score {
        81..=100 => "✅",
        51..=80 => "⚠️ ",
        _ => "❌",
    };
    println!("{} FINAL SCORE: {}/100", band, report.score);
}

fn format_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌ ERROR",
        Severity::Warning => "⚠️  WARN ",
        Severity::Seo => "🔎 SEO  ",
    }
}

fn print_fixes(fixes: &[FileFix], written: bool) {
    if fixes.is_empty() {
        println!("✅ No relative links to fix");
        return;
    }

    for fix in fixes {
        println!("📄 {}", fix.identity);
        for (old, new) in &fix.rewrites {
            println!("   {} -> {}", old, new);
        }
    }

    let total: usize = fixes.iter().map(|f| f.rewrites.len()).sum();
    if written {
        println!("\n✅ Rewrote {} link(s) in {} file(s)", total, fixes.len());
    } else {
        println!("\n📋 {} link(s) in {} file(s) would change (run with --write to apply)", total, fixes.len());
    }
}
