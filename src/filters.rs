use crate::models::{ActivityFilter, BranchSelection, CheatingFilter, CustomerRecord, FilterState};

/// A member counts as active when their last visit is at most a year old.
pub const ACTIVE_RECENCY_DAYS: i64 = 365;

fn branch_matches(record: &CustomerRecord, selection: &BranchSelection) -> bool {
    match selection {
        BranchSelection::All => true,
        BranchSelection::Only(name) => record.branch_name == *name,
    }
}

fn activity_matches(record: &CustomerRecord, filter: ActivityFilter) -> bool {
    match filter {
        ActivityFilter::All => true,
        ActivityFilter::ActiveOnly => record.recency <= ACTIVE_RECENCY_DAYS,
    }
}

fn cheating_matches(record: &CustomerRecord, filter: CheatingFilter) -> bool {
    match filter {
        CheatingFilter::Include => true,
        CheatingFilter::Exclude => !record.is_cheating,
    }
}

/// Apply the filter chain in its fixed order: branch, then activity, then
/// cheating. The predicates are independent, so the order only matters for
/// keeping the phone normalization a single pass over the surviving rows.
pub fn apply_filters(records: &[CustomerRecord], state: &FilterState) -> Vec<CustomerRecord> {
    let mut kept: Vec<CustomerRecord> = records
        .iter()
        .filter(|record| branch_matches(record, &state.branch))
        .filter(|record| activity_matches(record, state.activity))
        .filter(|record| cheating_matches(record, state.cheating))
        .cloned()
        .collect();

    for record in kept.iter_mut() {
        record.member_phone = normalize_phone(&record.member_phone);
    }

    kept
}

/// Phone identifiers are opaque text, but the upstream export writes them
/// through a float column and leaves a trailing ".0" artifact.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => trimmed.to_string(),
    }
}
