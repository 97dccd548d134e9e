use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BranchPeriodRecord {
    #[serde(rename = "Branch_Name")]
    pub branch_name: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "TotalCut")]
    pub total_cut: i64,
    #[serde(rename = "MemberCut")]
    pub member_cut: i64,
    #[serde(rename = "NonMemberCut")]
    pub non_member_cut: i64,
    #[serde(rename = "NewMember")]
    pub new_members: i64,
    #[serde(rename = "TotalMember")]
    pub total_members: i64,
    #[serde(rename = "MembersLost")]
    pub members_lost: i64,
    #[serde(rename = "MembersSemiLost")]
    pub members_semi_lost: i64,
    #[serde(rename = "MembersNew")]
    pub members_new: i64,
    #[serde(rename = "MembersReturning")]
    pub members_returning: i64,
    #[serde(rename = "CutPerChair")]
    pub cut_per_chair: f64,
}

impl BranchPeriodRecord {
    /// The four activity buckets are expected to partition the member base.
    pub fn buckets_reconcile(&self) -> bool {
        self.members_lost + self.members_semi_lost + self.members_new + self.members_returning
            == self.total_members
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchConfig {
    pub cut_target: i64,
    pub chairs: i64,
}

#[derive(Debug, Clone)]
pub struct DerivedBranchMetrics {
    pub branch_name: String,
    pub pct_lost: f64,
    pub pct_semi_lost: f64,
    pub pct_new: f64,
    pub pct_returning: f64,
    pub pct_member_cut: f64,
    pub pct_non_member_cut: f64,
    pub pct_acquisition: f64,
    pub pct_target: f64,
    pub cut_per_chair: f64,
    pub member_ratio_tenths: i64,
    pub non_member_ratio_tenths: i64,
    pub active_member_pct: f64,
}

/// One row of the month summary: the raw record joined with the derived
/// target attainment, which is absent for branches skipped during KPI
/// computation.
#[derive(Debug, Clone)]
pub struct BranchSummaryRow {
    pub record: BranchPeriodRecord,
    pub target_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Branch_Name")]
    pub branch_name: String,
    #[serde(rename = "Recency")]
    pub recency: i64,
    #[serde(rename = "Frequency")]
    pub frequency: i64,
    #[serde(rename = "Monetary")]
    pub monetary: f64,
    #[serde(rename = "AOV")]
    pub aov: f64,
    #[serde(rename = "Age", default, deserialize_with = "crate::data::lenient_age")]
    pub age: Option<f64>,
    #[serde(rename = "RScore")]
    pub r_score: i32,
    #[serde(rename = "FScore")]
    pub f_score: i32,
    #[serde(rename = "MScore")]
    pub m_score: i32,
    #[serde(rename = "RFMScore")]
    pub rfm_score: f64,
    #[serde(rename = "Segmentation")]
    pub segment: String,
    #[serde(rename = "isCheating", deserialize_with = "crate::data::zero_one_flag")]
    pub is_cheating: bool,
    #[serde(rename = "memberPhone")]
    pub member_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelection {
    All,
    Only(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityFilter {
    All,
    ActiveOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatingFilter {
    Include,
    Exclude,
}

/// One dashboard interaction's worth of filter choices. Built from CLI
/// flags and passed by reference into the pipeline, never mutated.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub branch: BranchSelection,
    pub activity: ActivityFilter,
    pub cheating: CheatingFilter,
    pub segment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SegmentShare {
    pub segment: String,
    pub count: usize,
    pub share_pct: f64,
}

#[derive(Debug, Clone)]
pub struct SegmentDetail {
    pub count: usize,
    pub mean_monetary: f64,
    pub mean_frequency: f64,
    pub mean_aov: f64,
    pub ages: AgeBreakdown,
}

/// Age statistics come in three mutually exclusive states the presentation
/// layer renders differently: no usable age column at all, ages present but
/// none inside the valid window, or a computed summary.
#[derive(Debug, Clone, PartialEq)]
pub enum AgeBreakdown {
    Unavailable,
    OutOfRangeOnly { excluded_count: usize },
    Profile(AgeSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub valid_count: usize,
    pub excluded_count: usize,
}

/// A (year, month) pair ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

/// Inclusive first/last bounds of the months the snapshot actually covers.
#[derive(Debug, Clone, Copy)]
pub struct CoverageWindow {
    pub first: Period,
    pub last: Period,
}

impl CoverageWindow {
    pub fn contains(&self, period: Period) -> bool {
        self.first <= period && period <= self.last
    }
}
