use crate::models::{AgeBreakdown, AgeSummary, CustomerRecord, SegmentDetail, SegmentShare};

pub const AGE_FLOOR: f64 = 0.0;
pub const AGE_CEILING: f64 = 80.0;

/// Count and percentage share per segment over the filtered set, largest
/// segment first. An empty input yields an empty vector, never a division
/// error.
pub fn segment_mix(records: &[CustomerRecord]) -> Vec<SegmentShare> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for record in records {
        *counts.entry(record.segment.clone()).or_insert(0) += 1;
    }

    let total = records.len();
    let mut shares: Vec<SegmentShare> = counts
        .into_iter()
        .map(|(segment, count)| SegmentShare {
            segment,
            count,
            share_pct: count as f64 / total as f64 * 100.0,
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.segment.cmp(&b.segment)));
    shares
}

pub fn segment_records(records: &[CustomerRecord], segment: &str) -> Vec<CustomerRecord> {
    records
        .iter()
        .filter(|record| record.segment == segment)
        .cloned()
        .collect()
}

/// Descriptive statistics for one segment of the filtered set. An empty
/// group reports zero counts and zero means rather than failing, since a
/// segment picked earlier can legitimately empty out when upstream filters
/// change.
pub fn segment_detail(records: &[CustomerRecord], segment: &str) -> SegmentDetail {
    let rows = segment_records(records, segment);

    SegmentDetail {
        count: rows.len(),
        mean_monetary: mean(rows.iter().map(|r| r.monetary)),
        mean_frequency: mean(rows.iter().map(|r| r.frequency as f64)),
        mean_aov: mean(rows.iter().map(|r| r.aov)),
        ages: age_breakdown(&rows),
    }
}

pub fn age_breakdown(records: &[CustomerRecord]) -> AgeBreakdown {
    let known: Vec<f64> = records.iter().filter_map(|record| record.age).collect();
    if known.is_empty() {
        return AgeBreakdown::Unavailable;
    }

    let mut in_range: Vec<f64> = known
        .iter()
        .copied()
        .filter(|age| (AGE_FLOOR..=AGE_CEILING).contains(age))
        .collect();
    let excluded_count = known.len() - in_range.len();

    if in_range.is_empty() {
        return AgeBreakdown::OutOfRangeOnly { excluded_count };
    }

    in_range.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    AgeBreakdown::Profile(AgeSummary {
        mean: mean(in_range.iter().copied()),
        median: median(&in_range),
        min: in_range[0],
        max: in_range[in_range.len() - 1],
        valid_count: in_range.len(),
        excluded_count,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
