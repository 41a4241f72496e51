//! Citerank CLI: rank ADS papers against their publication month.
//!
//! Commands:
//! - `paper`: rank one bibcode and print the result
//! - `library`: rank every paper in an ADS library, write CSV and a Markdown report
//! - `report`: regenerate the Markdown report (or a LaTeX table) from a rank CSV
//! - `quota`: show the ADS rate-limit status for the current token

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use citerank_core::catalog::{AdsCatalog, CircuitBreaker, Credential, SyntheticCatalog};
use citerank_core::{get_paper_rank, Catalog, PaperRankResult};
use citerank_runner::table::read_rank_csv;
use citerank_runner::{
    generate_latex_table, generate_report, load_library_artifacts, run_library,
    run_library_outcomes, save_library_artifacts, summarize, write_report, ArtifactPaths,
    LogProgress, RankConfig, RankTable,
};

#[derive(Parser)]
#[command(
    name = "citerank",
    version,
    about = "Citation percentile ranks for ADS papers within their publication month"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ADS API token. Defaults to the environment variable named in the config.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Use a deterministic synthetic catalog with this seed instead of ADS.
    #[arg(long, global = true, value_name = "SEED")]
    synthetic: Option<u64>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a single paper.
    Paper {
        /// ADS bibcode, e.g. 2020MNRAS.498.5581B.
        bibcode: String,
    },
    /// Rank every paper in an ADS library.
    Library {
        /// ADS library id.
        id: String,

        /// Output file stem. Defaults to the library id.
        #[arg(long)]
        name: Option<String>,

        /// Re-rank even if a table from an earlier run exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Regenerate the Markdown report from a rank CSV.
    Report {
        /// Rank table written by `library`.
        csv: PathBuf,

        /// Emit a LaTeX table instead of Markdown.
        #[arg(long, default_value_t = false)]
        latex: bool,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the ADS API rate-limit status.
    Quota,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => RankConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RankConfig::default(),
    };

    let breaker = Arc::new(CircuitBreaker::default_catalog());
    let outcome = match &cli.command {
        Commands::Paper { bibcode } => run_paper(&cli, &config, &breaker, bibcode),
        Commands::Library { id, name, force } => run_library_cmd(
            &cli,
            &config,
            &breaker,
            id,
            name.as_deref().unwrap_or(id),
            *force,
        ),
        Commands::Report {
            csv,
            latex,
            output,
        } => run_report(csv, *latex, output.as_deref()),
        Commands::Quota => run_quota(&cli, &config, &breaker),
    };
    outcome.map_err(|e| with_cooldown(e, breaker.remaining_cooldown()))
}

/// Tell the user how long ADS requests stay paused once the breaker is open.
fn with_cooldown(err: anyhow::Error, cooldown: Duration) -> anyhow::Error {
    if cooldown.is_zero() {
        return err;
    }
    err.context(format!(
        "ADS requests are paused by the circuit breaker for another {}s",
        cooldown.as_secs()
    ))
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,citerank={level},citerank_core={level},citerank_runner={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn ads_catalog(
    cli: &Cli,
    config: &RankConfig,
    breaker: &Arc<CircuitBreaker>,
) -> Result<AdsCatalog> {
    let env_var = &config.ads.token_env;
    let credential = match &cli.token {
        Some(token) => Credential::new(token.as_str()),
        None => match Credential::from_env(env_var) {
            Some(c) => c,
            None => bail!("no ADS API token: pass --token or set {env_var}"),
        },
    };
    Ok(AdsCatalog::new(
        credential,
        config.ads_settings(),
        Arc::clone(breaker),
    )?)
}

fn build_catalog(
    cli: &Cli,
    config: &RankConfig,
    breaker: &Arc<CircuitBreaker>,
) -> Result<Box<dyn Catalog>> {
    match cli.synthetic {
        Some(seed) => {
            info!(seed, "using synthetic catalog");
            Ok(Box::new(SyntheticCatalog::new(seed)))
        }
        None => Ok(Box::new(ads_catalog(cli, config, breaker)?)),
    }
}

fn run_paper(
    cli: &Cli,
    config: &RankConfig,
    breaker: &Arc<CircuitBreaker>,
    bibcode: &str,
) -> Result<()> {
    let settings = config.rank_settings()?;
    let catalog = build_catalog(cli, config, breaker)?;
    let result = get_paper_rank(catalog.as_ref(), bibcode, &settings)?;
    print_result(&result);
    Ok(())
}

fn print_result(r: &PaperRankResult) {
    println!("Bibcode:           {}", r.bib_code);
    println!("First author:      {}", r.author);
    println!("Publication month: {}", r.pub_date);
    println!("Citations:         {}", r.citation_count);
    println!("Papers that month: {}", r.total_papers_month);
    println!(
        "Rank (>=):         {:.2}% ({} papers)",
        r.percentage, r.greater_citations
    );
    println!("Rank (>):          {:.2}%", r.percentage_upper);
    if r.is_possibly_truncated() {
        let ranges: Vec<String> = r.truncated_ranges.iter().map(|s| s.to_string()).collect();
        warn!(
            ranges = %ranges.join(", "),
            "a citation range returned a full page; the month population may be undercounted"
        );
    }
}

fn run_library_cmd(
    cli: &Cli,
    config: &RankConfig,
    breaker: &Arc<CircuitBreaker>,
    collection_id: &str,
    stem: &str,
    force: bool,
) -> Result<()> {
    let out_dir = &config.output.directory;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    let paths = ArtifactPaths::new(out_dir, stem);

    let stored = if force {
        None
    } else {
        load_library_artifacts(&paths, collection_id)?
    };

    let (table, summary) = match stored {
        Some(stored) => {
            info!(
                path = %paths.csv.display(),
                "reusing existing rank table (pass --force to re-rank)"
            );
            let summary = summarize(&stored.table.rows)?;
            if stored.complete || !paths.report.is_file() {
                write_report(&stored.table, Some(&summary), &paths.report)?;
            }
            (stored.table, Some(summary))
        }
        None => {
            let table = rank_library(cli, config, breaker, collection_id)?;
            let summary = save_library_artifacts(&table, &paths)?;
            (table, summary)
        }
    };

    match summary {
        Some(summary) => println!(
            "{} papers, median rank {:.2}%, {} in the top 5%",
            summary.papers,
            summary.median_midpoint,
            summary.highlighted.len()
        ),
        None => println!("no papers could be ranked for library {collection_id}"),
    }
    if !table.failures.is_empty() {
        println!(
            "{} papers could not be ranked; see {}",
            table.failures.len(),
            paths.report.display()
        );
    }
    Ok(())
}

fn rank_library(
    cli: &Cli,
    config: &RankConfig,
    breaker: &Arc<CircuitBreaker>,
    collection_id: &str,
) -> Result<RankTable> {
    let settings = config.rank_settings()?;
    let opts = config.run_options();
    let catalog = build_catalog(cli, config, breaker)?;
    let catalog = catalog.as_ref();

    let table = if opts.isolate_failures {
        let outcomes = run_library_outcomes(catalog, collection_id, &settings, opts, &LogProgress)?;
        RankTable::from_outcomes(Some(collection_id), &settings, &outcomes)
    } else {
        let results = run_library(catalog, collection_id, &settings, opts, &LogProgress)?;
        RankTable::from_results(Some(collection_id), &settings, &results)
    };
    Ok(table.with_catalog(catalog.name(), cli.synthetic.is_some()))
}

fn run_report(csv: &Path, latex: bool, output: Option<&Path>) -> Result<()> {
    let rows = read_rank_csv(csv)?;
    let summary = summarize(&rows).with_context(|| format!("cannot report on {}", csv.display()))?;
    let report = if latex {
        generate_latex_table(&rows, Some(&summary))
    } else {
        generate_report(&RankTable::from_rows(rows), Some(&summary))
    };
    match output {
        Some(path) => std::fs::write(path, report)
            .with_context(|| format!("failed to write report {}", path.display()))?,
        None => print!("{report}"),
    }
    Ok(())
}

fn run_quota(cli: &Cli, config: &RankConfig, breaker: &Arc<CircuitBreaker>) -> Result<()> {
    if cli.synthetic.is_some() {
        bail!("quota is only available against the ADS API");
    }
    let status = ads_catalog(cli, config, breaker)?.check_rate_limit()?;
    println!("{status}");
    Ok(())
}
