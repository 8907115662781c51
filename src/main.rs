use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use ospi_reconcile::config::DEFAULT_CONFIG_FILE;
use ospi_reconcile::logging::init_logging;
use ospi_reconcile::{run_enrichment, run_revenue, run_validation, Config, ResolvedPaths};

const USAGE: &str = "usage: ospi-reconcile [validate|revenue|enrich|all] [CONFIG]";

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("all");

    if matches!(command, "-h" | "--help" | "help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let (config, base) = load_config(args.get(2).map(Path::new))?;
    let paths = config.resolve_paths(&base);

    info!(version = ospi_reconcile::VERSION, command, base = %base.display(), "ospi-reconcile");

    match command {
        "validate" => validate(&paths, &config)?,
        "revenue" => revenue(&paths)?,
        "enrich" => enrich(&paths, &config)?,
        "all" => {
            validate(&paths, &config)?;
            revenue(&paths)?;
            enrich(&paths, &config)?;
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}

/// Explicit config path, else `reconcile.toml` in the working directory, else defaults.
/// Relative data paths resolve against the config file's directory.
fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    let cwd = env::current_dir()?;

    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                return Ok((Config::default(), cwd));
            }
            candidate
        }
    };

    let config = Config::load_from_file(&path)?;
    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd,
    };

    info!(path = %path.display(), "loaded config");
    Ok((config, base))
}

fn validate(paths: &ResolvedPaths, config: &Config) -> Result<()> {
    let outcome = run_validation(paths, &config.validation)?;
    println!(
        "✓ Validation: {} of {} districts matched, {} compared → {}",
        outcome.official.len(),
        config.validation.target_districts.len(),
        outcome.comparison.len(),
        paths.validation_workbook.display()
    );
    if !outcome.unmatched.is_empty() {
        println!("  Not found: {}", outcome.unmatched.join(", "));
    }
    Ok(())
}

fn revenue(paths: &ResolvedPaths) -> Result<()> {
    let outcome = run_revenue(paths)?;
    println!(
        "✓ Revenue: {} line items, {} districts → {}",
        outcome.line_items,
        outcome.summaries.len(),
        paths.revenue_json.display()
    );
    if let Some(named) = &outcome.named {
        println!(
            "  Named: {} districts → {}",
            named.len(),
            paths.matched_revenue_json.display()
        );
    }
    Ok(())
}

fn enrich(paths: &ResolvedPaths, config: &Config) -> Result<()> {
    let summary = run_enrichment(paths, &config.enrichment)?;
    println!(
        "✓ Enrichment: {} enriched, {} without mapping, {} without revenue → {}",
        summary.enriched,
        summary.unmapped,
        summary.missing_revenue,
        paths.districts_with_revenue_json.display()
    );
    Ok(())
}
