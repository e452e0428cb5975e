//! fetcharoo main entry point
//!
//! This is the command-line interface for the fetcharoo PDF downloader.

use clap::Parser;
use fetcharoo::config::{load_config_with_hash, Config};
use fetcharoo::schema::SiteSchema;
use fetcharoo::{
    CrawlOptions, CrawlSession, DiscoverOptions, FilterConfig, OutputMode, Outcome,
    ProcessOptions, SortBy, SORT_BY_OPTIONS,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// fetcharoo: find PDFs on a webpage and download them
///
/// fetcharoo collects every PDF linked from a page (optionally following
/// links a few levels deep within the same site), then saves them as
/// separate files or merges them into one document.
#[derive(Parser, Debug)]
#[command(name = "fetcharoo")]
#[command(version)]
#[command(about = "Download PDFs from webpages", long_about = None)]
struct Cli {
    /// Webpage to search for PDFs
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory [default: output]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// How many link levels to follow below the page [default: 0]
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// Merge all PDFs into one file
    #[arg(short, long)]
    merge: bool,

    /// Name of the merged PDF [default: merged.pdf]
    #[arg(long, value_name = "NAME")]
    output_name: Option<String>,

    /// Seconds to wait between page requests [default: 0.5]
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Skip PDFs disallowed by robots.txt
    #[arg(long)]
    respect_robots: bool,

    /// Custom User-Agent string
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// List the PDFs that would be downloaded without downloading them
    #[arg(long)]
    dry_run: bool,

    /// Show progress bars while crawling and downloading
    #[arg(long)]
    progress: bool,

    /// Only keep PDFs whose filename matches (repeatable)
    #[arg(long, value_name = "PATTERN")]
    include: Vec<String>,

    /// Drop PDFs whose filename matches (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Only keep PDFs whose URL matches (repeatable)
    #[arg(long, value_name = "PATTERN")]
    url_include: Vec<String>,

    /// Drop PDFs whose URL matches (repeatable)
    #[arg(long, value_name = "PATTERN")]
    url_exclude: Vec<String>,

    /// Minimum PDF size in bytes
    #[arg(long, value_name = "BYTES")]
    min_size: Option<u64>,

    /// Maximum PDF size in bytes
    #[arg(long, value_name = "BYTES")]
    max_size: Option<u64>,

    /// Order PDFs before saving or merging
    #[arg(
        long,
        value_name = "STRATEGY",
        value_parser = clap::builder::PossibleValuesParser::new(SORT_BY_OPTIONS.iter().copied())
    )]
    sort_by: Option<String>,

    /// Use a schema from the config file by name
    #[arg(long, value_name = "NAME")]
    schema: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Decrease logging verbosity (-q, -qq)
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    let schema = resolve_schema(&cli, &config)?;
    let options = build_options(&cli, &config, schema.as_ref())?;

    let user_agent = options
        .crawl
        .user_agent
        .clone()
        .unwrap_or_else(|| fetcharoo::DEFAULT_USER_AGENT.to_string());
    let mut session = CrawlSession::with_user_agent(user_agent)?;

    let outcome = session.download_pdfs_from_webpage(&cli.url, &options).await;
    report(&outcome, &options);

    if !outcome.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: u8) {
    let filter = match (quiet, verbose) {
        (0, 0) => EnvFilter::new("fetcharoo=info,warn"),
        (0, 1) => EnvFilter::new("fetcharoo=debug,info"),
        (0, _) => EnvFilter::new("fetcharoo=trace,debug"),
        (1, _) => EnvFilter::new("warn"),
        _ => EnvFilter::new("error"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Finds the schema named by `--schema`, or one matching the URL
fn resolve_schema(
    cli: &Cli,
    config: &Config,
) -> Result<Option<SiteSchema>, Box<dyn std::error::Error>> {
    let registry = config.schema_registry()?;

    if let Some(name) = &cli.schema {
        return match registry.get(name) {
            Some(schema) => {
                tracing::info!("Using schema: {}", schema);
                Ok(Some(schema.clone()))
            }
            None => {
                let available = registry.names().join(", ");
                Err(format!("Unknown schema '{}'. Available: [{}]", name, available).into())
            }
        };
    }

    let detected = registry.detect(&cli.url).cloned();
    if let Some(schema) = &detected {
        tracing::info!("Auto-detected schema: {}", schema);
    }
    Ok(detected)
}

fn seconds(flag: &str, value: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| format!("{} must be a non-negative number of seconds, got {}", flag, value).into())
}

/// Merges CLI flags, schema and config file into run options
///
/// Precedence: CLI flag, then schema, then config file, then defaults.
fn build_options(
    cli: &Cli,
    config: &Config,
    schema: Option<&SiteSchema>,
) -> Result<DiscoverOptions, Box<dyn std::error::Error>> {
    let request_delay = match cli.delay {
        Some(delay) => seconds("--delay", delay)?,
        None => schema
            .and_then(SiteSchema::explicit_request_delay)
            .or_else(|| config.crawl.request_delay())
            .unwrap_or(fetcharoo::DEFAULT_REQUEST_DELAY),
    };

    let timeout = match cli.timeout {
        Some(timeout) if timeout > 0.0 => seconds("--timeout", timeout)?,
        Some(timeout) => return Err(format!("--timeout must be positive, got {}", timeout).into()),
        None => config.crawl.timeout().unwrap_or(fetcharoo::DEFAULT_TIMEOUT),
    };

    let crawl = CrawlOptions {
        depth: cli
            .depth
            .or_else(|| schema.and_then(SiteSchema::explicit_depth))
            .or(config.crawl.depth)
            .unwrap_or(0),
        allowed_domains: config.crawl.allowed_domains(),
        request_delay,
        timeout,
        respect_robots: cli.respect_robots || config.crawl.respect_robots.unwrap_or(false),
        user_agent: cli.user_agent.clone().or_else(|| config.crawl.user_agent.clone()),
        deduplicate: config.crawl.deduplicate.unwrap_or(true),
        show_progress: cli.progress,
    };

    let mode = if cli.merge {
        OutputMode::Merge
    } else {
        config.output.mode().unwrap_or_default()
    };

    // A custom comparator only applies when no strategy was named on the command line
    let sort_key = match &cli.sort_by {
        Some(_) => None,
        None => schema.and_then(|s| s.sort_key().cloned()),
    };

    let sort_by = match &cli.sort_by {
        Some(value) => SortBy::parse_lenient(value),
        None => schema
            .map(|s| s.sort_by)
            .filter(|s| *s != SortBy::None)
            .or_else(|| config.output.sort_by())
            .unwrap_or_default(),
    };

    let filter = build_filter(cli, config, schema);
    if let (Some(min), Some(max)) = (filter.min_size, filter.max_size) {
        if min > max {
            return Err(format!("--min-size ({}) cannot exceed --max-size ({})", min, max).into());
        }
    }

    let process = ProcessOptions {
        mode,
        filter: (!filter.is_empty()).then_some(filter),
        sort_by,
        sort_key,
        output_name: cli
            .output_name
            .clone()
            .or_else(|| schema.and_then(|s| s.default_output_name.clone()))
            .or_else(|| config.output.output_name.clone()),
        timeout,
        user_agent: crawl.user_agent.clone(),
        show_progress: cli.progress,
        ..Default::default()
    };

    let write_dir = cli
        .output
        .clone()
        .or_else(|| config.output.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(fetcharoo::DEFAULT_WRITE_DIR));

    Ok(DiscoverOptions {
        crawl,
        process,
        write_dir,
        dry_run: cli.dry_run,
    })
}

/// Each pattern list comes from the first source that sets it
fn build_filter(cli: &Cli, config: &Config, schema: Option<&SiteSchema>) -> FilterConfig {
    let schema_filter = schema.and_then(SiteSchema::filter_config).unwrap_or_default();
    let pick = |first: &[String], second: &[String], third: &[String]| -> Vec<String> {
        [first, second, third]
            .into_iter()
            .find(|list| !list.is_empty())
            .map(|list| list.to_vec())
            .unwrap_or_default()
    };

    FilterConfig {
        filename_include: pick(
            &cli.include,
            &schema_filter.filename_include,
            &config.filter.filename_include,
        ),
        filename_exclude: pick(
            &cli.exclude,
            &schema_filter.filename_exclude,
            &config.filter.filename_exclude,
        ),
        url_include: pick(
            &cli.url_include,
            &schema_filter.url_include,
            &config.filter.url_include,
        ),
        url_exclude: pick(
            &cli.url_exclude,
            &schema_filter.url_exclude,
            &config.filter.url_exclude,
        ),
        min_size: cli.min_size.or(config.filter.min_size),
        max_size: cli.max_size.or(config.filter.max_size),
    }
}

/// Prints the run summary
fn report(outcome: &Outcome, options: &DiscoverOptions) {
    match outcome {
        Outcome::DryRun { urls, count } => {
            println!("=== fetcharoo Dry Run ===\n");
            println!("Found {} PDF(s) that would be downloaded:", count);
            for url in urls {
                println!("  - {}", url);
            }
        }
        Outcome::Processed(result) => {
            if result.success {
                println!(
                    "✓ Saved {} file(s) to {}",
                    result.files_created.len(),
                    options.write_dir.display()
                );
                for path in &result.files_created {
                    println!("  - {}", path.display());
                }
            } else {
                println!("✗ No PDFs were saved");
            }
            if result.filtered_count > 0 {
                println!("  Filtered: {}", result.filtered_count);
            }
            if result.failed_count > 0 {
                println!("  Failed: {}", result.failed_count);
                for error in &result.errors {
                    println!("    {}", error);
                }
            }
        }
    }
}
