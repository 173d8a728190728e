use std::path::PathBuf;

use clap::Parser;

// ── Settings (CLI) ────────────────────────────────────────────────────────────

/// Claims turnaround and pivot reporting from a tabular claims export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "claims-insight",
    about = "Claims turnaround and pivot reporting from a tabular claims export",
    version
)]
pub struct Settings {
    /// Path to the claims export (.csv, .xlsx or .xls)
    pub input: PathBuf,

    /// Report sections to print
    #[arg(long, default_value = "full", value_parser = ["kpis", "pivots", "full"])]
    pub view: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "csv", "json"])]
    pub format: String,

    /// Keep only claims intimated on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<String>,

    /// Keep only claims intimated on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<String>,

    /// Categorical filter as CATEGORY=VALUE, repeatable
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Records per batch streamed out of the ingestion worker
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}
