use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer};

use crate::models::{BranchConfig, BranchPeriodRecord, CustomerRecord};

pub fn load_branch_snapshot(path: &Path) -> anyhow::Result<Vec<BranchPeriodRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open branch snapshot {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize::<BranchPeriodRecord>() {
        let record =
            row.with_context(|| format!("malformed branch row in {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_customer_snapshot(path: &Path) -> anyhow::Result<Vec<CustomerRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open customer snapshot {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize::<CustomerRecord>() {
        let record =
            row.with_context(|| format!("malformed customer row in {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

/// Cut targets and chair counts for the production branches. Goodfellas Home
/// is excluded from KPI rendering and carries no targets.
pub fn default_branch_config() -> HashMap<String, BranchConfig> {
    let table = [
        ("Citraland (9GO)", 900, 5),
        ("Graha Family", 1575, 7),
        ("Intro", 900, 4),
        ("Klampis", 1575, 7),
        ("Margorejo", 1575, 7),
        ("Sukomanunggal", 1125, 5),
        ("Bukit Darmo Golf", 1125, 5),
    ];

    table
        .into_iter()
        .map(|(name, cut_target, chairs)| {
            (name.to_string(), BranchConfig { cut_target, chairs })
        })
        .collect()
}

pub fn load_branch_config(path: Option<&Path>) -> anyhow::Result<HashMap<String, BranchConfig>> {
    let Some(path) = path else {
        return Ok(default_branch_config());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read branch config {}", path.display()))?;
    let table: HashMap<String, BranchConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid branch config {}", path.display()))?;

    Ok(table)
}

/// Upstream exports leave the age column blank or carrying junk for walk-ins
/// with no profile; either loads as "no age" rather than failing the row.
pub(crate) fn lenient_age<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<f64>().ok()))
}

pub(crate) fn zero_one_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(raw.trim(), "1" | "true" | "True" | "TRUE"))
}
