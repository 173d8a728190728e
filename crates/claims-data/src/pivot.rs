//! Pivot aggregation: grouped row counts and monetary sums per category.

use std::collections::BTreeMap;

use claims_core::error::Result;
use claims_core::models::{
    parse_amount, Category, ClaimRecord, PivotDict, PivotRow, PivotTable, NOT_AVAILABLE_KEY,
    PIVOT_CATEGORIES, TOTAL_KEY, UNCATEGORIZED_KEY,
};
use serde::Serialize;
use tracing::debug;

#[derive(Default)]
struct Accumulator {
    rows: u64,
    claim_amount: f64,
    settled_amount: f64,
}

/// Build the pivot table for one category over a record subset.
///
/// Records group by the category's string value; missing or empty values
/// fall into the `Uncategorized` group. Groups sort descending by row count;
/// ties keep the alphabetical grouping order, which makes repeated runs
/// byte-identical. Exactly one `TOTAL` row is appended.
pub fn create_pivot(records: &[ClaimRecord], category: Category) -> PivotTable {
    let mut rows = aggregate(records.iter(), category, UNCATEGORIZED_KEY);

    let mut total = PivotRow {
        key: TOTAL_KEY.to_string(),
        rows: 0,
        claim_amount: 0.0,
        settled_amount: 0.0,
    };
    for row in &rows {
        total.rows += row.rows;
        total.claim_amount += row.claim_amount;
        total.settled_amount += row.settled_amount;
    }
    rows.push(total);

    PivotTable { category, rows }
}

/// Build pivot tables for every configured category over a subset.
///
/// A raw category is skipped when its column never appeared in the file (not
/// when values are merely empty); derived categories are always generated.
/// An empty subset yields an empty set of tables.
pub fn build_pivot_dict(records: &[ClaimRecord]) -> PivotDict {
    if records.is_empty() {
        return PivotDict::default();
    }

    let mut tables = Vec::new();
    for category in PIVOT_CATEGORIES {
        if !column_present(records.iter(), category) {
            debug!(category = category.as_str(), "column absent, pivot skipped");
            continue;
        }
        tables.push(create_pivot(records, category));
    }
    PivotDict { tables }
}

/// Serialize one pivot table as CSV with the fixed column order: category
/// key, `Rows`, `Claim_Amount`, `Settled_Amount`.
pub fn pivot_to_csv(table: &PivotTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        table.category.as_str(),
        "Rows",
        "Claim_Amount",
        "Settled_Amount",
    ])?;
    for row in &table.rows {
        let rows = row.rows.to_string();
        let claim_amount = row.claim_amount.to_string();
        let settled_amount = row.settled_amount.to_string();
        writer.write_record([
            row.key.as_str(),
            rows.as_str(),
            claim_amount.as_str(),
            settled_amount.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV buffer flush failed: {e}"))?;
    Ok(String::from_utf8(bytes).map_err(anyhow::Error::from)?)
}

// ── Partner pivots ────────────────────────────────────────────────────────────

/// Per-partner pivot bundle, grouped by the `Channel` column.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerPivots {
    pub partner: String,
    pub tables: Vec<PivotTable>,
}

/// Group a subset by `Channel` and build each partner's per-category tables.
///
/// Partner tables follow the partner report format: the `N/A` sentinel for
/// missing values and no trailing `TOTAL` row. Records without a channel are
/// left out, and categories whose column never appeared are omitted.
pub fn partner_pivots(records: &[ClaimRecord]) -> Vec<PartnerPivots> {
    let mut groups: BTreeMap<String, Vec<&ClaimRecord>> = BTreeMap::new();
    for record in records {
        let channel = match Category::Channel.value_of(record) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        groups.entry(channel).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(partner, members)| {
            let tables = PIVOT_CATEGORIES
                .into_iter()
                .filter(|&category| column_present(members.iter().copied(), category))
                .map(|category| PivotTable {
                    category,
                    rows: aggregate(members.iter().copied(), category, NOT_AVAILABLE_KEY),
                })
                .filter(|table| !table.rows.is_empty())
                .collect();
            PartnerPivots { partner, tables }
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Group records by category value and emit rows sorted descending by count.
/// No totals row; callers append one where their format requires it.
fn aggregate<'a>(
    records: impl Iterator<Item = &'a ClaimRecord>,
    category: Category,
    missing_key: &str,
) -> Vec<PivotRow> {
    // BTreeMap keeps the groups alphabetical, which pins the tie order.
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records {
        let key = match category.value_of(record) {
            Some(value) if !value.is_empty() => value,
            _ => missing_key.to_string(),
        };
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(amount) = parse_amount(&record.raw.claim_amount) {
            acc.claim_amount += amount;
        }
        if let Some(amount) = parse_amount(&record.raw.settled_amount) {
            acc.settled_amount += amount;
        }
    }

    let mut rows: Vec<PivotRow> = groups
        .into_iter()
        .map(|(key, acc)| PivotRow {
            key,
            rows: acc.rows,
            claim_amount: acc.claim_amount,
            settled_amount: acc.settled_amount,
        })
        .collect();
    rows.sort_by(|a, b| b.rows.cmp(&a.rows));
    rows
}

fn column_present<'a>(
    mut records: impl Iterator<Item = &'a ClaimRecord>,
    category: Category,
) -> bool {
    category.is_derived() || records.any(|r| category.value_of(r).is_some())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use claims_core::classify::classify_record;
    use claims_core::models::{CellValue, RawClaim};

    fn registered(region: Option<&str>, claim_amount: &str, settled_amount: &str) -> ClaimRecord {
        let raw = RawClaim {
            claim_status: Some("SETTLED".to_string()),
            claim_amount: CellValue::from_text(claim_amount),
            settled_amount: CellValue::from_text(settled_amount),
            region: region.map(str::to_string),
            ..RawClaim::default()
        };
        classify_record(raw)
    }

    #[test]
    fn test_pivot_worked_example() {
        let records = vec![
            registered(Some("North"), "100", "90"),
            registered(Some("South"), "50", "40"),
            registered(Some("North"), "200", "180"),
        ];

        let table = create_pivot(&records, Category::Region);
        assert_eq!(table.rows.len(), 3);

        assert_eq!(table.rows[0].key, "North");
        assert_eq!(table.rows[0].rows, 2);
        assert!((table.rows[0].claim_amount - 300.0).abs() < 1e-9);

        assert_eq!(table.rows[1].key, "South");
        assert_eq!(table.rows[1].rows, 1);
        assert!((table.rows[1].claim_amount - 50.0).abs() < 1e-9);

        assert_eq!(table.rows[2].key, TOTAL_KEY);
        assert_eq!(table.rows[2].rows, 3);
        assert!((table.rows[2].claim_amount - 350.0).abs() < 1e-9);
        assert!((table.rows[2].settled_amount - 310.0).abs() < 1e-9);
    }

    #[test]
    fn test_pivot_total_matches_column_sums() {
        let records = vec![
            registered(Some("North"), "1,000", "900"),
            registered(Some("South"), "junk", "100"),
            registered(None, "250.5", ""),
        ];

        let table = create_pivot(&records, Category::Region);
        let total = table.total().expect("total row");
        let data = table.data_rows();

        assert_eq!(total.rows, data.iter().map(|r| r.rows).sum::<u64>());
        let claim_sum: f64 = data.iter().map(|r| r.claim_amount).sum();
        let settled_sum: f64 = data.iter().map(|r| r.settled_amount).sum();
        assert!((total.claim_amount - claim_sum).abs() < 1e-9);
        assert!((total.settled_amount - settled_sum).abs() < 1e-9);
    }

    #[test]
    fn test_pivot_missing_and_empty_group_as_uncategorized() {
        let records = vec![
            registered(None, "10", "0"),
            registered(Some(""), "20", "0"),
            registered(Some("East"), "30", "0"),
        ];

        let table = create_pivot(&records, Category::Region);
        let uncategorized = table
            .data_rows()
            .iter()
            .find(|r| r.key == UNCATEGORIZED_KEY)
            .expect("uncategorized row");
        assert_eq!(uncategorized.rows, 2);
        assert!((uncategorized.claim_amount - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pivot_unparseable_amount_contributes_zero() {
        let records = vec![registered(Some("North"), "not-a-number", "")];
        let table = create_pivot(&records, Category::Region);
        assert_eq!(table.rows[0].rows, 1);
        assert_eq!(table.rows[0].claim_amount, 0.0);
        assert_eq!(table.rows[0].settled_amount, 0.0);
    }

    #[test]
    fn test_pivot_idempotent() {
        let records = vec![
            registered(Some("North"), "100", "90"),
            registered(Some("South"), "100", "90"),
            registered(Some("East"), "100", "90"),
        ];
        let first = create_pivot(&records, Category::Region);
        let second = create_pivot(&records, Category::Region);
        assert_eq!(first, second);
        // All counts tie, so rows stay alphabetical.
        let keys: Vec<_> = first.data_rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["East", "North", "South"]);
    }

    #[test]
    fn test_pivot_dict_skips_absent_column_only() {
        // Region present (though empty on one record), State never present.
        let records = vec![
            registered(Some(""), "10", "0"),
            registered(Some("West"), "20", "0"),
        ];

        let dict = build_pivot_dict(&records);
        assert!(dict.get(Category::Region).is_some());
        assert!(dict.get(Category::State).is_none());
        // Derived categories are always generated.
        assert!(dict.get(Category::AgingBucket).is_some());
        assert!(dict.get(Category::RegisteredToInsurer).is_some());
    }

    #[test]
    fn test_pivot_dict_empty_subset() {
        assert!(build_pivot_dict(&[]).is_empty());
    }

    #[test]
    fn test_pivot_to_csv_column_order() {
        let records = vec![registered(Some("North"), "300", "250")];
        let csv_text = pivot_to_csv(&create_pivot(&records, Category::Region)).expect("csv");
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("Region,Rows,Claim_Amount,Settled_Amount"));
        assert_eq!(lines.next(), Some("North,1,300,250"));
        assert_eq!(lines.next(), Some("TOTAL,1,300,250"));
    }

    #[test]
    fn test_partner_pivots_group_by_channel() {
        let mut a1 = registered(Some("North"), "100", "90");
        a1.raw.channel = Some("Alpha Bank".to_string());
        let mut a2 = registered(Some("South"), "50", "40");
        a2.raw.channel = Some("Alpha Bank".to_string());
        let mut b1 = registered(Some("North"), "75", "60");
        b1.raw.channel = Some("Beta MFI".to_string());
        let unchanneled = registered(Some("East"), "10", "5");

        let bundles = partner_pivots(&[a1, a2, b1, unchanneled]);
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].partner, "Alpha Bank");
        assert_eq!(bundles[1].partner, "Beta MFI");

        let region_table = bundles[0]
            .tables
            .iter()
            .find(|t| t.category == Category::Region)
            .expect("region table");
        // Partner tables carry no totals row.
        assert!(region_table.total().is_none());
        assert_eq!(region_table.rows.len(), 2);
        assert_eq!(
            region_table.rows.iter().map(|r| r.rows).sum::<u64>(),
            2
        );
    }
}
