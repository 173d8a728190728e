use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Sentinels ─────────────────────────────────────────────────────────────────

/// Key of the synthetic totals row appended to every pivot table.
pub const TOTAL_KEY: &str = "TOTAL";

/// Group key for records whose category value is missing or empty.
pub const UNCATEGORIZED_KEY: &str = "Uncategorized";

/// Group key used by the per-partner report variant instead of
/// [`UNCATEGORIZED_KEY`].
pub const NOT_AVAILABLE_KEY: &str = "N/A";

// ── Column names ──────────────────────────────────────────────────────────────

/// Column headers recognised in the input file. Fields are matched by exact
/// name; unknown columns are ignored.
pub mod columns {
    pub const CLAIM_STATUS: &str = "Claim Status";
    pub const CLAIM_FILE_DATE: &str = "Claim File Date";
    pub const CLOSE_DATE: &str = "Close Date";
    pub const CLAIM_INTIMATION_DATE: &str = "Claim Intimation Date";
    pub const CLAIM_AMOUNT: &str = "Claim Amount";
    pub const SETTLED_AMOUNT: &str = "Settled Amount";
    pub const BRANCH: &str = "Branch";
    pub const REGION: &str = "Region";
    pub const STATE: &str = "State";
    pub const FILED_BY: &str = "Filed By";
    pub const PRODUCT: &str = "Product";
    pub const CHANNEL: &str = "Channel";
    pub const PAYMENT_DONE: &str = "Payment Done";
    pub const CUSTOMER_GENDER: &str = "Customer Gender";
    pub const CONSTRUCT_TYPE: &str = "Construct Type";
    pub const REGISTERED_TO_INSURER: &str = "Registered to Insurer";
    pub const AGING_BUCKET: &str = "Aging Days Bucketing";
    pub const TAT_GROUP: &str = "TAT Group";
}

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single raw cell from the input file.
///
/// CSV parsing only ever produces `Text` and `Empty`; spreadsheet input can
/// additionally carry `Number` cells, including serial-encoded dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Wrap a text cell; whitespace-only text collapses to `Empty`.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// String form of the cell as it would appear in a text column.
    pub fn to_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{}", n),
        }
    }
}

/// Parse a monetary cell into a number.
///
/// Thousands separators are stripped first (`"1,234.50"` → 1234.5) and any
/// trailing non-numeric garbage after a leading numeric prefix is ignored.
/// Returns `None` when the cell is empty or carries no numeric prefix at
/// all; the caller decides whether that degrades to zero.
pub fn parse_amount(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) => None,
        CellValue::Text(s) => {
            let cleaned = s.trim().replace(',', "");
            numeric_prefix(&cleaned)
        }
    }
}

/// Longest leading `[+-]?digits[.digits]` prefix of `s`, parsed as `f64`.
fn numeric_prefix(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    s[..end].parse::<f64>().ok()
}

// ── RawClaim ──────────────────────────────────────────────────────────────────

/// One row of the claims export, exactly as read from the file.
///
/// Categorical fields are `Option<String>` so that an absent column (`None`)
/// stays distinguishable from a present-but-empty cell (`Some("")`): pivot
/// generation skips a category only when its column never appeared in the
/// file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawClaim {
    pub claim_status: Option<String>,
    pub claim_file_date: CellValue,
    pub close_date: CellValue,
    pub claim_intimation_date: CellValue,
    pub claim_amount: CellValue,
    pub settled_amount: CellValue,
    pub branch: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub filed_by: Option<String>,
    pub product: Option<String>,
    pub channel: Option<String>,
    pub payment_done: Option<String>,
    pub customer_gender: Option<String>,
    pub construct_type: Option<String>,
}

impl RawClaim {
    /// Assign a cell to the field matching `column`; unknown columns are
    /// ignored.
    pub fn set_column(&mut self, column: &str, value: CellValue) {
        match column.trim() {
            columns::CLAIM_STATUS => self.claim_status = Some(value.to_display()),
            columns::CLAIM_FILE_DATE => self.claim_file_date = value,
            columns::CLOSE_DATE => self.close_date = value,
            columns::CLAIM_INTIMATION_DATE => self.claim_intimation_date = value,
            columns::CLAIM_AMOUNT => self.claim_amount = value,
            columns::SETTLED_AMOUNT => self.settled_amount = value,
            columns::BRANCH => self.branch = Some(value.to_display()),
            columns::REGION => self.region = Some(value.to_display()),
            columns::STATE => self.state = Some(value.to_display()),
            columns::FILED_BY => self.filed_by = Some(value.to_display()),
            columns::PRODUCT => self.product = Some(value.to_display()),
            columns::CHANNEL => self.channel = Some(value.to_display()),
            columns::PAYMENT_DONE => self.payment_done = Some(value.to_display()),
            columns::CUSTOMER_GENDER => self.customer_gender = Some(value.to_display()),
            columns::CONSTRUCT_TYPE => self.construct_type = Some(value.to_display()),
            _ => {}
        }
    }
}

// ── Status and bucket enums ───────────────────────────────────────────────────

/// Status bucket assigned to every record during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusBucket {
    IntimationPending,
    RegisteredWithProvider,
    UnderProcess,
    Unmapped,
}

impl StatusBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntimationPending => "Intimation Pending",
            Self::RegisteredWithProvider => "Registered with Provider",
            Self::UnderProcess => "Under-Process",
            Self::Unmapped => "Unmapped",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aging bucket derived from the turnaround time. Upper bounds are
/// inclusive; an unknown TAT is always `Uncategorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    Uncategorized,
    UpTo7Days,
    Days8To15,
    Days16To30,
    Above30Days,
}

impl AgingBucket {
    pub fn from_tat(tat: Option<i64>) -> Self {
        match tat {
            None => Self::Uncategorized,
            Some(t) if t <= 7 => Self::UpTo7Days,
            Some(t) if t <= 15 => Self::Days8To15,
            Some(t) if t <= 30 => Self::Days16To30,
            Some(_) => Self::Above30Days,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncategorized => UNCATEGORIZED_KEY,
            Self::UpTo7Days => "0-7 Days",
            Self::Days8To15 => "8-15 Days",
            Self::Days16To30 => "16-30 Days",
            Self::Above30Days => "Above 30 Days",
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarser TAT grouping used by the dashboard's distribution charts.
/// Upper bounds are inclusive; an unknown TAT is always `Uncategorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TatGroup {
    Uncategorized,
    UpTo10,
    From11To20,
    From21To30,
    From31To50,
    From51To100,
    Over100,
}

impl TatGroup {
    pub fn from_tat(tat: Option<i64>) -> Self {
        match tat {
            None => Self::Uncategorized,
            Some(t) if t <= 10 => Self::UpTo10,
            Some(t) if t <= 20 => Self::From11To20,
            Some(t) if t <= 30 => Self::From21To30,
            Some(t) if t <= 50 => Self::From31To50,
            Some(t) if t <= 100 => Self::From51To100,
            Some(_) => Self::Over100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncategorized => UNCATEGORIZED_KEY,
            Self::UpTo10 => "0-10",
            Self::From11To20 => "11-20",
            Self::From21To30 => "21-30",
            Self::From31To50 => "31-50",
            Self::From51To100 => "51-100",
            Self::Over100 => "100+",
        }
    }
}

impl fmt::Display for TatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ClaimRecord ───────────────────────────────────────────────────────────────

/// A classified claim: the raw row plus every derived field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    #[serde(flatten)]
    pub raw: RawClaim,
    /// Exactly one bucket per record.
    pub status: StatusBucket,
    /// Insurer-registration label; `Some` only on the Registered subset.
    pub registered_to_insurer: Option<String>,
    /// Turnaround time in whole days; `None` means unknown and is never
    /// coerced to zero.
    pub tat_days: Option<i64>,
    pub aging_bucket: AgingBucket,
    pub tat_group: TatGroup,
    /// Normalized `Claim Intimation Date`, used by the filter engine.
    pub intimation_date: Option<NaiveDate>,
}

// ── Category ──────────────────────────────────────────────────────────────────

/// A categorical dimension over which pivots and filters operate: the nine
/// raw columns plus the three derived classification dimensions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    RegisteredToInsurer,
    AgingBucket,
    TatGroup,
    CustomerGender,
    ConstructType,
    Branch,
    Region,
    State,
    FiledBy,
    Product,
    PaymentDone,
    Channel,
}

/// Pivot tables are generated for these categories, in this report order.
pub const PIVOT_CATEGORIES: [Category; 11] = [
    Category::RegisteredToInsurer,
    Category::AgingBucket,
    Category::TatGroup,
    Category::CustomerGender,
    Category::ConstructType,
    Category::Branch,
    Category::Region,
    Category::State,
    Category::FiledBy,
    Category::Product,
    Category::PaymentDone,
];

/// Categories the dashboard filter panel can restrict on.
pub const FILTER_CATEGORIES: [Category; 6] = [
    Category::Region,
    Category::State,
    Category::FiledBy,
    Category::Product,
    Category::Channel,
    Category::AgingBucket,
];

impl Category {
    /// Column header / report title for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisteredToInsurer => columns::REGISTERED_TO_INSURER,
            Self::AgingBucket => columns::AGING_BUCKET,
            Self::TatGroup => columns::TAT_GROUP,
            Self::CustomerGender => columns::CUSTOMER_GENDER,
            Self::ConstructType => columns::CONSTRUCT_TYPE,
            Self::Branch => columns::BRANCH,
            Self::Region => columns::REGION,
            Self::State => columns::STATE,
            Self::FiledBy => columns::FILED_BY,
            Self::Product => columns::PRODUCT,
            Self::PaymentDone => columns::PAYMENT_DONE,
            Self::Channel => columns::CHANNEL,
        }
    }

    /// Look a category up by its column header, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [Category; 12] = [
            Category::RegisteredToInsurer,
            Category::AgingBucket,
            Category::TatGroup,
            Category::CustomerGender,
            Category::ConstructType,
            Category::Branch,
            Category::Region,
            Category::State,
            Category::FiledBy,
            Category::Product,
            Category::PaymentDone,
            Category::Channel,
        ];
        let wanted = name.trim();
        ALL.into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }

    /// Derived categories exist on every classified record; raw categories
    /// only when their column was present in the file.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Self::RegisteredToInsurer | Self::AgingBucket | Self::TatGroup
        )
    }

    /// The record's value for this category, `None` when the underlying
    /// column was absent.
    pub fn value_of(self, record: &ClaimRecord) -> Option<String> {
        match self {
            Self::RegisteredToInsurer => record.registered_to_insurer.clone(),
            Self::AgingBucket => Some(record.aging_bucket.as_str().to_string()),
            Self::TatGroup => Some(record.tat_group.as_str().to_string()),
            Self::CustomerGender => record.raw.customer_gender.clone(),
            Self::ConstructType => record.raw.construct_type.clone(),
            Self::Branch => record.raw.branch.clone(),
            Self::Region => record.raw.region.clone(),
            Self::State => record.raw.state.clone(),
            Self::FiledBy => record.raw.filed_by.clone(),
            Self::Product => record.raw.product.clone(),
            Self::PaymentDone => record.raw.payment_done.clone(),
            Self::Channel => record.raw.channel.clone(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ProcessedData ─────────────────────────────────────────────────────────────

/// The fully classified dataset, partitioned by status.
///
/// Built once per ingested file and replaced wholesale on reload or reset;
/// never mutated afterwards. Every record appears in `all`; records with one
/// of the three mapped statuses additionally appear in exactly one subset,
/// `Unmapped` records in none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedData {
    pub all: Vec<ClaimRecord>,
    pub intimation: Vec<ClaimRecord>,
    pub registered: Vec<ClaimRecord>,
    pub under_process: Vec<ClaimRecord>,
}

// ── Pivot structures ──────────────────────────────────────────────────────────

/// One row of a pivot table.
///
/// Field order is the serialization contract: category value first, then
/// `Rows`, `Claim_Amount`, `Settled_Amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    /// Category value, [`UNCATEGORIZED_KEY`], or [`TOTAL_KEY`] on the final
    /// row.
    pub key: String,
    #[serde(rename = "Rows")]
    pub rows: u64,
    #[serde(rename = "Claim_Amount")]
    pub claim_amount: f64,
    #[serde(rename = "Settled_Amount")]
    pub settled_amount: f64,
}

/// Grouped aggregate for one category: data rows sorted descending by count
/// followed by exactly one `TOTAL` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub category: Category,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// The trailing totals row, if present.
    pub fn total(&self) -> Option<&PivotRow> {
        self.rows.last().filter(|row| row.key == TOTAL_KEY)
    }

    /// The data rows, excluding any trailing totals row.
    pub fn data_rows(&self) -> &[PivotRow] {
        match self.rows.split_last() {
            Some((last, rest)) if last.key == TOTAL_KEY => rest,
            _ => &self.rows,
        }
    }
}

/// The full set of pivot tables for one record subset, in report order.
///
/// Rebuilt wholesale whenever the subset or the filters change; never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotDict {
    pub tables: Vec<PivotTable>,
}

impl PivotDict {
    pub fn get(&self, category: Category) -> Option<&PivotTable> {
        self.tables.iter().find(|t| t.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

// ── KpiData ───────────────────────────────────────────────────────────────────

/// Top-line aggregates for one record subset, with display strings.
///
/// A point-in-time snapshot: stale as soon as the subset changes, at which
/// point it is recomputed from scratch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiData {
    pub total_rows: u64,
    pub sum_claim: f64,
    pub sum_settled: f64,
    pub avg_tat: f64,
    pub total_rows_display: String,
    pub sum_claim_display: String,
    pub sum_settled_display: String,
    pub avg_tat_display: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
