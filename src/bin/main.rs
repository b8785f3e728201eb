//! metric-bridge CLI - check metric connectivity before emission
//!
//! Usage:
//!   metric-bridge --catalog <catalog.json> validate [--metric <name>]... [--strict|--lenient]
//!   metric-bridge --catalog <catalog.json> eligibility [--metric <name>]...
//!   metric-bridge --catalog <catalog.json> reach <anchor_entity> [--max-hops <n>]
//!   metric-bridge --catalog <catalog.json> list
//!
//! Examples:
//!   metric-bridge --catalog build/catalog.json validate --lenient
//!   metric-bridge --catalog build/catalog.json validate --metric conv_rate --format json
//!   metric-bridge reach rental --max-hops 3

use clap::{Parser, Subcommand, ValueEnum};
use metric_bridge::config::Settings;
use metric_bridge::model::{Catalog, Metric};
use metric_bridge::semantic::{CatalogIndex, JoinGraph, MetricEligibilityResolver};
use metric_bridge::validation::{suggest_closest, EntityConnectivityValidator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metric-bridge")]
#[command(about = "Check semantic-model metrics for join reachability and same-model eligibility")]
#[command(version)]
struct Cli {
    /// Settings file (overrides the default search)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog JSON (defaults to [catalog].path from settings)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate entity connectivity for metrics
    Validate {
        /// Metric to validate (all metrics if omitted)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,

        /// Fail on any error
        #[arg(long, conflicts_with = "lenient")]
        strict: bool,

        /// Report errors and skip failing metrics
        #[arg(long)]
        lenient: bool,

        /// Join budget for reachability
        #[arg(long)]
        max_hops: Option<usize>,

        /// Worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show same-model eligibility for metrics
    Eligibility {
        /// Metric to resolve (all metrics if omitted)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,
    },

    /// Show models reachable from an anchor entity
    Reach {
        /// Primary entity to anchor on
        anchor: String,

        /// Join budget for reachability
        #[arg(long)]
        max_hops: Option<usize>,
    },

    /// List semantic models and metrics in the catalog
    List,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON issues
    Json,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let catalog = match load_catalog(cli.catalog, &settings) {
        Ok(c) => c,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let index = match CatalogIndex::build(&catalog) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Invalid catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };
    for (model, entity) in index.relationships().dangling_foreign_entities() {
        warn!(%model, %entity, "foreign entity matches no primary entity; relationship ignored");
    }

    match cli.command {
        Commands::Validate {
            metrics,
            strict,
            lenient,
            max_hops,
            workers,
            format,
        } => {
            let strict = if lenient {
                false
            } else {
                strict || settings.validation.strict
            };
            cmd_validate(
                &index,
                &settings,
                &metrics,
                strict,
                max_hops,
                workers,
                format,
            )
        }
        Commands::Eligibility { metrics } => cmd_eligibility(&index, &metrics),
        Commands::Reach { anchor, max_hops } => {
            cmd_reach(&index, &anchor, max_hops.unwrap_or(settings.validation.max_hops))
        }
        Commands::List => cmd_list(&catalog),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: Option<PathBuf>, settings: &Settings) -> Result<Catalog, String> {
    let path = match path {
        Some(path) => path,
        None => settings
            .catalog
            .resolved_path()
            .map_err(|e| format!("Error resolving catalog path: {}", e))?
            .ok_or_else(|| {
                "No catalog given: pass --catalog or set [catalog].path in the settings file"
                    .to_string()
            })?,
    };

    let catalog = Catalog::from_file(&path)
        .map_err(|e| format!("Error loading catalog '{}': {}", path.display(), e))?;
    info!(
        path = %path.display(),
        models = catalog.semantic_models.len(),
        metrics = catalog.metrics.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// The requested metrics in argument order, or every catalog metric.
fn select_metrics<'a>(index: &CatalogIndex<'a>, names: &[String]) -> Result<Vec<&'a Metric>, String> {
    if names.is_empty() {
        return Ok(index.catalog().metrics.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            index.metric(name).ok_or_else(|| {
                match suggest_closest(name, &index.metric_names()) {
                    Some(closest) => format!("Unknown metric '{}' (did you mean '{}'?)", name, closest),
                    None => format!("Unknown metric '{}'", name),
                }
            })
        })
        .collect()
}

fn cmd_validate(
    index: &CatalogIndex<'_>,
    settings: &Settings,
    names: &[String],
    strict: bool,
    max_hops: Option<usize>,
    workers: Option<usize>,
    format: OutputFormat,
) -> ExitCode {
    let metrics = match select_metrics(index, names) {
        Ok(m) => m,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let mut options = settings.connectivity_options();
    if let Some(max_hops) = max_hops {
        if max_hops == 0 {
            eprintln!("--max-hops must be at least 1");
            return ExitCode::FAILURE;
        }
        options.max_hops = max_hops;
    }
    let workers = workers.unwrap_or(settings.validation.workers);

    let validator = EntityConnectivityValidator::with_options(index, options);
    let result = validator.validate_metrics_parallel(&metrics, workers);
    let failed = strict && result.has_errors();

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) if failed => eprintln!("{}", json),
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Text if failed => eprintln!("{}", result.format_report()),
        OutputFormat::Text => {
            println!("{}", result.format_report());
            let skipped = result.failing_metrics();
            if !skipped.is_empty() {
                println!();
                println!(
                    "Skipping {} metric(s): {}",
                    skipped.len(),
                    skipped.join(", ")
                );
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn cmd_eligibility(index: &CatalogIndex<'_>, names: &[String]) -> ExitCode {
    let metrics = match select_metrics(index, names) {
        Ok(m) => m,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    let resolver = MetricEligibilityResolver::new(index);
    for metric in metrics {
        match resolver.resolve(metric).anchor_entity() {
            Some(anchor) => println!("  {} - eligible (anchor: {})", metric.name, anchor),
            None => println!("  {} - ineligible", metric.name),
        }
    }

    ExitCode::SUCCESS
}

fn cmd_reach(index: &CatalogIndex<'_>, anchor: &str, max_hops: usize) -> ExitCode {
    let graph = JoinGraph::build(anchor, index, max_hops);

    let Some(anchor_model) = graph.anchor_model() else {
        match suggest_closest(anchor, &index.primary_entity_names()) {
            Some(closest) => eprintln!(
                "'{}' is not a primary entity (did you mean '{}'?)",
                anchor, closest
            ),
            None => eprintln!("'{}' is not a primary entity", anchor),
        }
        return ExitCode::FAILURE;
    };

    println!(
        "Reachable from '{}' (model: {}, max hops: {}):",
        anchor, anchor_model, max_hops
    );
    for row in graph.reachable_models() {
        println!("  {} {}", row.hops, row.model);
    }

    ExitCode::SUCCESS
}

fn cmd_list(catalog: &Catalog) -> ExitCode {
    if !catalog.semantic_models.is_empty() {
        println!("Semantic models:");
        for model in &catalog.semantic_models {
            match model.primary_entity() {
                Some(entity) => println!("  - {} (primary: {})", model.name, entity.name),
                None => println!("  - {}", model.name),
            }
            for measure in &model.measures {
                println!("    - {} [{}]", measure.name, measure.agg);
            }
        }
        println!();
    }

    if catalog.metrics.is_empty() {
        println!("No metrics defined.");
    } else {
        println!("Metrics:");
        for metric in &catalog.metrics {
            println!("  - {} [{}]", metric.name, metric.kind_name());
        }
    }

    ExitCode::SUCCESS
}
