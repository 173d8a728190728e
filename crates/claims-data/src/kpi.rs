//! Top-line KPI snapshot for one record subset.

use claims_core::formatting::{format_count, format_currency, format_tat};
use claims_core::models::{parse_amount, ClaimRecord, KpiData};

/// Compute the KPI snapshot for a record subset.
///
/// Unparseable amounts contribute zero to the sums. Unknown TATs are
/// excluded from the average entirely, numerator and denominator both. An
/// empty subset yields all-zero raw values with zero-formatted displays.
pub fn summarize(records: &[ClaimRecord]) -> KpiData {
    let total_rows = records.len() as u64;
    let sum_claim: f64 = records
        .iter()
        .filter_map(|r| parse_amount(&r.raw.claim_amount))
        .sum();
    let sum_settled: f64 = records
        .iter()
        .filter_map(|r| parse_amount(&r.raw.settled_amount))
        .sum();

    let known_tats: Vec<i64> = records.iter().filter_map(|r| r.tat_days).collect();
    let avg_tat = if known_tats.is_empty() {
        0.0
    } else {
        known_tats.iter().sum::<i64>() as f64 / known_tats.len() as f64
    };

    KpiData {
        total_rows,
        sum_claim,
        sum_settled,
        avg_tat,
        total_rows_display: format_count(total_rows),
        sum_claim_display: format_currency(sum_claim),
        sum_settled_display: format_currency(sum_settled),
        avg_tat_display: format_tat(avg_tat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims_core::classify::classify_record;
    use claims_core::models::{CellValue, RawClaim};

    fn record(claim_amount: &str, settled_amount: &str, dates: Option<(&str, &str)>) -> ClaimRecord {
        let (file_date, close_date) = dates.unwrap_or(("", ""));
        classify_record(RawClaim {
            claim_status: Some("SETTLED".to_string()),
            claim_amount: CellValue::from_text(claim_amount),
            settled_amount: CellValue::from_text(settled_amount),
            claim_file_date: CellValue::from_text(file_date),
            close_date: CellValue::from_text(close_date),
            ..RawClaim::default()
        })
    }

    #[test]
    fn test_kpi_empty_subset_is_all_zero() {
        let kpis = summarize(&[]);
        assert_eq!(kpis.total_rows, 0);
        assert_eq!(kpis.sum_claim, 0.0);
        assert_eq!(kpis.sum_settled, 0.0);
        assert_eq!(kpis.avg_tat, 0.0);
        assert_eq!(kpis.total_rows_display, "0");
        assert_eq!(kpis.sum_claim_display, "₹0");
        assert_eq!(kpis.sum_settled_display, "₹0");
        assert_eq!(kpis.avg_tat_display, "0.0");
    }

    #[test]
    fn test_kpi_sums_and_formatting() {
        let records = vec![
            record("1,00,000", "90,000", Some(("01-01-2024", "10-01-2024"))),
            record("50,000", "45,000", Some(("01-01-2024", "12-01-2024"))),
        ];
        let kpis = summarize(&records);
        assert_eq!(kpis.total_rows, 2);
        assert!((kpis.sum_claim - 150_000.0).abs() < 1e-9);
        assert!((kpis.sum_settled - 135_000.0).abs() < 1e-9);
        assert_eq!(kpis.sum_claim_display, "₹1,50,000");
        assert_eq!(kpis.total_rows_display, "2");
    }

    #[test]
    fn test_kpi_unknown_tat_excluded_from_average() {
        let records = vec![
            record("0", "0", Some(("01-01-2024", "10-01-2024"))), // TAT 9
            record("0", "0", Some(("01-01-2024", "12-01-2024"))), // TAT 11
            record("0", "0", None),                               // unknown, excluded
        ];
        let kpis = summarize(&records);
        assert!((kpis.avg_tat - 10.0).abs() < 1e-9);
        assert_eq!(kpis.avg_tat_display, "10.0");
    }

    #[test]
    fn test_kpi_all_unknown_tat_averages_zero() {
        let records = vec![record("100", "50", None)];
        let kpis = summarize(&records);
        assert_eq!(kpis.avg_tat, 0.0);
        assert_eq!(kpis.avg_tat_display, "0.0");
    }

    #[test]
    fn test_kpi_unparseable_amounts_contribute_zero() {
        let records = vec![record("n/a", "", None), record("100", "60", None)];
        let kpis = summarize(&records);
        assert!((kpis.sum_claim - 100.0).abs() < 1e-9);
        assert!((kpis.sum_settled - 60.0).abs() < 1e-9);
    }
}
