//! Status classification and derived-field computation.
//!
//! The lookup tables below are fixed configuration data: enumerated claim
//! statuses from the upstream claims system and their display labels. They
//! are consulted at classification time only and never mutated.

use crate::dates::normalize_date;
use crate::models::{AgingBucket, CellValue, ClaimRecord, RawClaim, StatusBucket, TatGroup};

/// `Claim Status` values meaning the claim has only been intimated.
pub const INTIMATION_STATUSES: [&str; 2] = ["INTIMATION", "INFO COLLECTION"];

/// `Claim Status` values for claims registered with the insurance provider.
pub const REGISTERED_STATUSES: [&str; 6] = [
    "SETTLED",
    "REJECTED",
    "PENDING APPROVAL INSURANCE",
    "RAISE_CLAIMDOC_3",
    "MORE INFO",
    "APPROVED",
];

/// `Claim Status` values for claims still under internal process.
pub const UNDER_PROCESS_STATUSES: [&str; 2] =
    ["PENDING APPROVAL M-INSURE", "SUBMISSION APPROVAL INSURANCE"];

/// Display label per registered claim status, for the
/// `Registered to Insurer` dimension. Label text, including the APPROVED
/// casing, matches the upstream claims system verbatim.
const REGISTERED_INSURER_LABELS: [(&str, &str); 6] = [
    (
        "MORE INFO",
        "Requirement Raised for Documents – Actionable from Partner",
    ),
    (
        "RAISE_CLAIMDOC_3",
        "Requirement Raised for Documents – Actionable from Partner",
    ),
    ("PENDING APPROVAL INSURANCE", "Under-Process with Insurer"),
    ("REJECTED", "Repudiated"),
    ("SETTLED", "Settled"),
    ("APPROVED", "APPROVED"),
];

/// Classify a raw `Claim Status` value into its bucket.
///
/// The value is trimmed and uppercased before lookup; anything outside the
/// three disjoint status sets is `Unmapped`.
pub fn classify_status(status: &str) -> StatusBucket {
    let key = status.trim().to_uppercase();
    if INTIMATION_STATUSES.contains(&key.as_str()) {
        StatusBucket::IntimationPending
    } else if REGISTERED_STATUSES.contains(&key.as_str()) {
        StatusBucket::RegisteredWithProvider
    } else if UNDER_PROCESS_STATUSES.contains(&key.as_str()) {
        StatusBucket::UnderProcess
    } else {
        StatusBucket::Unmapped
    }
}

/// Label shown in the `Registered to Insurer` dimension for a registered
/// claim status; statuses outside the table map to `"Unmapped"`.
pub fn registered_insurer_label(status: &str) -> &'static str {
    let key = status.trim().to_uppercase();
    REGISTERED_INSURER_LABELS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, label)| *label)
        .unwrap_or("Unmapped")
}

/// Turnaround time in whole days between filing and closure.
///
/// `None` (unknown) when either date fails to normalize; never coerced to
/// zero. The difference is taken as an absolute value so reversed date pairs
/// still yield a duration.
pub fn turnaround_days(file_date: &CellValue, close_date: &CellValue) -> Option<i64> {
    let filed = normalize_date(file_date)?;
    let closed = normalize_date(close_date)?;
    Some((closed - filed).num_days().abs())
}

/// Enrich one raw row with every derived field.
///
/// Pure function of the input and the constant tables above: status bucket,
/// insurer-registration label (Registered records only), TAT and both TAT
/// bucketings, and the normalized intimation date.
pub fn classify_record(raw: RawClaim) -> ClaimRecord {
    let status_value = raw.claim_status.as_deref().unwrap_or_default();
    let status = classify_status(status_value);
    let registered_to_insurer = (status == StatusBucket::RegisteredWithProvider)
        .then(|| registered_insurer_label(status_value).to_string());

    let tat_days = turnaround_days(&raw.claim_file_date, &raw.close_date);
    let intimation_date = normalize_date(&raw.claim_intimation_date);

    ClaimRecord {
        status,
        registered_to_insurer,
        tat_days,
        aging_bucket: AgingBucket::from_tat(tat_days),
        tat_group: TatGroup::from_tat(tat_days),
        intimation_date,
        raw,
    }
}
