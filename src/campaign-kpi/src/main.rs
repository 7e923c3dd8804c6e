//! campaign-kpi: command-line front end for campaign KPI roll-ups,
//! display formatting, list filtering and optimization forecasts.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::optimization::dispatch;
use campaign_core::{Campaign, OptimizationRequest};
use campaign_reporting::dashboard::page;
use campaign_reporting::format::{
    format_currency_in, format_date_str, format_number, format_value,
};
use campaign_reporting::{
    BaselineForecaster, CampaignDashboard, CampaignPerformance, Currency, Dimension, FormatKind,
    FormatOptions, MetricRecord,
};
use campaign_web_sdk::CampaignFilters;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-kpi")]
#[command(about = "Campaign KPI roll-ups, formatting and optimization forecasts")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables still apply on top)
    #[arg(long, global = true, env = "CAMPAIGN_KPI_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Currency code (overrides format.currency)
    #[arg(long, global = true, env = "CAMPAIGN_KPI__FORMAT__CURRENCY")]
    currency: Option<String>,

    /// Breakdown page size (overrides reporting.page_size)
    #[arg(long, global = true, env = "CAMPAIGN_KPI__REPORTING__PAGE_SIZE")]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll up daily campaign rows into totals and a breakdown
    Summarize {
        /// JSON array of daily campaign performance rows
        records: PathBuf,
        /// channel, campaign or date (defaults to reporting.default_group_by)
        #[arg(long)]
        group_by: Option<String>,
        /// Zero-based breakdown page
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render a single value for display
    Format {
        /// currency, percentage, number or date
        kind: String,
        /// Numeric value; `date` also takes Unix milliseconds or a date string
        value: String,
    },
    /// Filter a campaign list with a query string
    Filter {
        /// JSON array of campaigns
        campaigns: PathBuf,
        /// e.g. "platform=meta&status=active&budget=0-1000&days=7&q=spring"
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Run an optimization request against a historical baseline
    Optimize {
        /// JSON `{"action": ..., "data": ...}` request
        request: PathBuf,
        /// JSON array of daily rows; rows for the requested campaign form the baseline
        #[arg(long)]
        baseline: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campaign_kpi=info,campaign_reporting=info".into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    // Apply CLI overrides
    if let Some(currency) = cli.currency {
        config.format.currency = currency;
    }
    if let Some(page_size) = cli.page_size {
        config.reporting.page_size = page_size;
    }
    config.validate()?;

    info!(
        currency = %config.format.currency,
        page_size = config.reporting.page_size,
        "Configuration loaded"
    );

    let options = format_options(&config)?;

    match cli.command {
        Command::Summarize {
            records,
            group_by,
            page: index,
            json,
        } => {
            let dimension: Dimension = group_by
                .as_deref()
                .unwrap_or(&config.reporting.default_group_by)
                .parse()?;
            summarize(&config, &options, &records, dimension, index, json)
        }
        Command::Format { kind, value } => {
            let kind: FormatKind = kind.parse()?;
            println!("{}", render(kind, &value, &options));
            Ok(())
        }
        Command::Filter { campaigns, query } => {
            let campaigns: Vec<Campaign> = read_json(&campaigns)?;
            let filters = CampaignFilters::from_query_string(&query)?;
            let kept = filters.apply(&campaigns, Utc::now());
            info!(total = campaigns.len(), kept = kept.len(), "Campaigns filtered");
            println!("{}", serde_json::to_string_pretty(&kept)?);
            Ok(())
        }
        Command::Optimize { request, baseline } => {
            let raw = std::fs::read_to_string(&request)
                .with_context(|| format!("reading {}", request.display()))?;
            let request = OptimizationRequest::from_json(&raw)?;
            let rows: Vec<CampaignPerformance> = read_json(&baseline)?;
            let baseline = baseline_for(&rows, request.campaign_id());

            let forecaster = BaselineForecaster::new(baseline, &config.forecast);
            info!(
                action = request.action(),
                campaign_id = request.campaign_id(),
                "Running optimization"
            );
            let response = dispatch(&forecaster, &request)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

fn summarize(
    config: &AppConfig,
    options: &FormatOptions,
    records: &Path,
    dimension: Dimension,
    index: usize,
    json: bool,
) -> anyhow::Result<()> {
    let rows: Vec<CampaignPerformance> = read_json(records)?;
    let dashboard = CampaignDashboard::new();
    let recorded = dashboard.record_all(rows);
    info!(rows = recorded, %dimension, "Records loaded");

    let overview = dashboard.overview();
    let size = NonZeroUsize::new(config.reporting.page_size).unwrap_or(NonZeroUsize::MIN);
    let breakdown = page(&dashboard.breakdown(dimension), size, index);

    if json {
        let out = serde_json::json!({
            "overview": overview,
            "group_by": dimension,
            "page": index,
            "breakdown": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let money = |v: f64| format_currency_in(Some(v), options.currency);
    let pct = |v: f64| format_value(Some(v / 100.0), FormatKind::Percentage, options);

    println!(
        "{} campaigns  impressions {}  clicks {}  spend {}  revenue {}",
        overview.total_campaigns,
        format_number(Some(overview.totals.impressions as f64)),
        format_number(Some(overview.totals.clicks as f64)),
        money(overview.totals.spend),
        money(overview.totals.revenue),
    );
    println!(
        "CTR {}  CPC {}  CPM {}  ROAS {:.2}x  CVR {}  CPA {}",
        pct(overview.derived.ctr),
        money(overview.derived.cpc),
        money(overview.derived.cpm),
        overview.derived.roas,
        pct(overview.derived.conversion_rate),
        money(overview.derived.cpa),
    );
    println!();
    println!(
        "{:<24} {:>6} {:>10} {:>8} {:>12} {:>8} {:>8}",
        dimension.to_string().to_uppercase(),
        "ROWS",
        "IMPR",
        "CTR",
        "SPEND",
        "ROAS",
        "CVR"
    );
    for row in &breakdown {
        println!(
            "{:<24} {:>6} {:>10} {:>8} {:>12} {:>8.2} {:>8}",
            row.key,
            row.rows,
            format_number(Some(row.metrics.impressions as f64)),
            pct(row.derived.ctr),
            money(row.metrics.spend),
            row.derived.roas,
            pct(row.derived.conversion_rate),
        );
    }
    Ok(())
}

fn format_options(config: &AppConfig) -> anyhow::Result<FormatOptions> {
    let currency: Currency = config.format.currency.parse()?;
    Ok(FormatOptions {
        currency,
        percentage_decimals: config.format.percentage_decimals,
    })
}

/// Numbers go through `format_value`; a non-numeric `date` argument is
/// parsed as a date string instead.
fn render(kind: FormatKind, raw: &str, options: &FormatOptions) -> String {
    let number = raw.trim().parse::<f64>().ok();
    match (kind, number) {
        (FormatKind::Date, None) => format_date_str(raw),
        _ => format_value(number, kind, options),
    }
}

/// Sum of the campaign's rows, or of every row when the campaign has none.
fn baseline_for(rows: &[CampaignPerformance], campaign_id: &str) -> MetricRecord {
    let own: MetricRecord = rows
        .iter()
        .filter(|r| r.campaign_id == campaign_id)
        .map(|r| &r.metrics)
        .sum();
    if own == MetricRecord::default() {
        warn!(campaign_id, "No baseline rows for campaign, using all rows");
        return rows.iter().map(|r| &r.metrics).sum();
    }
    own
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
