mod bootstrap;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use claims_core::formatting::{format_count, format_currency};
use claims_core::models::{Category, KpiData, PivotDict, PivotTable, FILTER_CATEGORIES};
use claims_core::settings::Settings;
use claims_data::filter::FilterState;
use claims_data::pivot::pivot_to_csv;
use claims_runtime::session::DashboardSession;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Claims Insight v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, View: {}, Format: {}",
        settings.input.display(),
        settings.view,
        settings.format
    );

    let filters = build_filters(&settings)?;

    let mut session =
        DashboardSession::load(settings.input.clone(), settings.batch_size as usize).await?;
    if !filters.is_empty() {
        session.set_filters(filters);
    }

    match settings.view.as_str() {
        "kpis" => print_kpis(session.kpis(), &settings.format)?,
        "pivots" => print_pivots(session.pivots(), &settings.format)?,
        _ => {
            print_kpis(session.kpis(), &settings.format)?;
            println!();
            print_pivots(session.pivots(), &settings.format)?;
        }
    }

    Ok(())
}

// ── Filter arguments ───────────────────────────────────────────────────────────

/// Build the filter state from the CLI arguments.
fn build_filters(settings: &Settings) -> Result<FilterState> {
    let mut filters = FilterState {
        date_from: settings
            .date_from
            .as_deref()
            .map(parse_date_bound)
            .transpose()?,
        date_to: settings
            .date_to
            .as_deref()
            .map(parse_date_bound)
            .transpose()?,
        ..FilterState::default()
    };

    for argument in &settings.filters {
        let (category, value) = parse_filter_arg(argument)?;
        filters.select(category, [value]);
    }
    Ok(filters)
}

fn parse_date_bound(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date \"{}\": expected YYYY-MM-DD", s))
}

/// Parse one `--filter CATEGORY=VALUE` argument.
fn parse_filter_arg(argument: &str) -> Result<(Category, String)> {
    let Some((name, value)) = argument.split_once('=') else {
        bail!("invalid filter \"{}\": expected CATEGORY=VALUE", argument);
    };
    let category = Category::from_name(name)
        .ok_or_else(|| anyhow!("unknown filter category \"{}\"", name.trim()))?;
    if !FILTER_CATEGORIES.contains(&category) {
        bail!(
            "category \"{}\" is not filterable; choose one of: {}",
            category,
            FILTER_CATEGORIES.map(Category::as_str).join(", ")
        );
    }
    Ok((category, value.trim().to_string()))
}

// ── Report output ──────────────────────────────────────────────────────────────

fn print_kpis(kpis: &KpiData, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(kpis)?);
        return Ok(());
    }
    println!("Registered Claims Summary");
    println!("  Total Claims   : {}", kpis.total_rows_display);
    println!("  Claim Amount   : {}", kpis.sum_claim_display);
    println!("  Settled Amount : {}", kpis.sum_settled_display);
    println!("  Average TAT    : {} days", kpis.avg_tat_display);
    Ok(())
}

fn print_pivots(pivots: &PivotDict, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(pivots)?),
        "csv" => {
            for table in &pivots.tables {
                println!("{}", pivot_to_csv(table)?);
            }
        }
        _ => {
            for table in &pivots.tables {
                print_table(table);
                println!();
            }
        }
    }
    Ok(())
}

fn print_table(table: &PivotTable) {
    let key_width = table
        .rows
        .iter()
        .map(|row| row.key.chars().count())
        .chain([table.category.as_str().chars().count()])
        .max()
        .unwrap_or(0);

    println!(
        "{:<key_width$}  {:>10}  {:>16}  {:>16}",
        table.category.as_str(),
        "Rows",
        "Claim Amount",
        "Settled Amount"
    );
    for row in &table.rows {
        println!(
            "{:<key_width$}  {:>10}  {:>16}  {:>16}",
            row.key,
            format_count(row.rows),
            format_currency(row.claim_amount),
            format_currency(row.settled_amount)
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
