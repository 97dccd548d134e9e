use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{
    BranchConfig, BranchSummaryRow, CustomerRecord, DerivedBranchMetrics, Period,
};

/// Column order of the downloadable segment detail, fixed by the dashboard.
pub const EXPORT_COLUMNS: [&str; 8] = [
    "Age",
    "Recency",
    "Frequency",
    "Monetary",
    "RFMScore",
    "AOV",
    "Segmentation",
    "Branch_Name",
];

pub fn period_label(period: Period) -> String {
    match NaiveDate::from_ymd_opt(period.year, period.month, 1) {
        Some(date) => date.format("%B %Y").to_string(),
        None => format!("{}-{:02}", period.year, period.month),
    }
}

pub fn build_report(
    period: Period,
    summary: &[BranchSummaryRow],
    metrics: &[DerivedBranchMetrics],
    config: &HashMap<String, BranchConfig>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Branch RFM Report");
    let _ = writeln!(output, "Generated for {}", period_label(period));
    let _ = writeln!(output);

    if metrics.is_empty() {
        let _ = writeln!(output, "No branch activity recorded for this month.");
        let _ = writeln!(output);
    }

    for metric in metrics {
        let row = summary
            .iter()
            .find(|row| row.record.branch_name == metric.branch_name);

        let _ = writeln!(output, "## {}", metric.branch_name);
        if let Some(row) = row {
            let _ = writeln!(
                output,
                "- customers served: {} ({} members on the books)",
                row.record.total_cut, row.record.total_members
            );
            let _ = writeln!(
                output,
                "- activity mix: lost {:.2}% ({}), semi-lost {:.2}% ({}), new {:.2}% ({}), returning {:.2}% ({})",
                metric.pct_lost,
                row.record.members_lost,
                metric.pct_semi_lost,
                row.record.members_semi_lost,
                metric.pct_new,
                row.record.members_new,
                metric.pct_returning,
                row.record.members_returning
            );
            let _ = writeln!(
                output,
                "- member cut {:.2}% ({} heads), non-member cut {:.2}% ({} heads)",
                metric.pct_member_cut,
                row.record.member_cut,
                metric.pct_non_member_cut,
                row.record.non_member_cut
            );
            let _ = writeln!(
                output,
                "- acquisition to member: {:.2}% ({} sign-ups)",
                metric.pct_acquisition, row.record.new_members
            );
        }
        let _ = writeln!(output, "- cut vs target: {:.1}%", metric.pct_target);
        match config.get(&metric.branch_name) {
            Some(branch_config) => {
                let _ = writeln!(
                    output,
                    "- cut per chair: {:.1} across {} chairs",
                    metric.cut_per_chair, branch_config.chairs
                );
            }
            None => {
                let _ = writeln!(output, "- cut per chair: {:.1}", metric.cut_per_chair);
            }
        }
        let _ = writeln!(
            output,
            "- member active ratio: {} : {}",
            metric.member_ratio_tenths, metric.non_member_ratio_tenths
        );
        let _ = writeln!(
            output,
            "- active member share: {:.1}%",
            metric.active_member_pct
        );
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Month Summary");

    if summary.is_empty() {
        let _ = writeln!(output, "No branch rows for this month.");
        return output;
    }

    let _ = writeln!(
        output,
        "| Branch | Total Cut | Member Cut | Non-Member Cut | New Members | Total Members | Target % |"
    );
    let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- | --- |");
    for row in summary {
        let target = row
            .target_pct
            .map(|pct| format!("{pct:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} |",
            row.record.branch_name,
            row.record.total_cut,
            row.record.member_cut,
            row.record.non_member_cut,
            row.record.new_members,
            row.record.total_members,
            target
        );
    }

    output
}

pub fn export_filename(segment: &str) -> String {
    format!("rfm_segment_{segment}.csv")
}

pub fn write_segment_export<W: std::io::Write>(
    records: &[CustomerRecord],
    out: W,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_COLUMNS)?;

    for record in records {
        let age = record
            .age
            .map(|age| format!("{age:.0}"))
            .unwrap_or_default();
        writer.write_record(&[
            age,
            record.recency.to_string(),
            record.frequency.to_string(),
            format!("{:.2}", record.monetary),
            format!("{:.2}", record.rfm_score),
            format!("{:.2}", record.aov),
            record.segment.clone(),
            record.branch_name.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi;
    use crate::models::BranchPeriodRecord;

    fn sample_record(branch: &str) -> BranchPeriodRecord {
        BranchPeriodRecord {
            branch_name: branch.to_string(),
            year: 2024,
            month: 6,
            total_cut: 800,
            member_cut: 440,
            non_member_cut: 360,
            new_members: 36,
            total_members: 500,
            members_lost: 60,
            members_semi_lost: 90,
            members_new: 125,
            members_returning: 225,
            cut_per_chair: 160.0,
        }
    }

    fn sample_customer(age: Option<f64>) -> CustomerRecord {
        CustomerRecord {
            branch_name: "Klampis".to_string(),
            recency: 21,
            frequency: 6,
            monetary: 420_000.0,
            aov: 70_000.0,
            age,
            r_score: 5,
            f_score: 4,
            m_score: 4,
            rfm_score: 4.33,
            segment: "Champion".to_string(),
            is_cheating: false,
            member_phone: "628123".to_string(),
        }
    }

    #[test]
    fn report_carries_branch_sections_and_summary_table() {
        let records = vec![sample_record("Intro")];
        let config = crate::data::default_branch_config();
        let metrics = kpi::metrics_for_period(&records, &config);
        let summary = kpi::summarize_period(&records, &metrics);

        let report = build_report(
            Period {
                year: 2024,
                month: 6,
            },
            &summary,
            &metrics,
            &config,
        );

        assert!(report.contains("# Branch RFM Report"));
        assert!(report.contains("Generated for June 2024"));
        assert!(report.contains("## Intro"));
        assert!(report.contains("member active ratio: 6 : 4"));
        assert!(report.contains("| Intro | 800 |"));
    }

    #[test]
    fn empty_month_report_degrades_to_fallback_text() {
        let config = crate::data::default_branch_config();
        let report = build_report(
            Period {
                year: 2024,
                month: 6,
            },
            &[],
            &[],
            &config,
        );

        assert!(report.contains("No branch activity recorded for this month."));
        assert!(report.contains("No branch rows for this month."));
    }

    #[test]
    fn export_filename_embeds_the_segment() {
        assert_eq!(export_filename("Champion"), "rfm_segment_Champion.csv");
    }

    #[test]
    fn export_writes_fixed_columns_and_blank_missing_ages() {
        let records = vec![sample_customer(Some(36.0)), sample_customer(None)];

        let mut buffer = Vec::new();
        write_segment_export(&records, &mut buffer).expect("export should succeed");
        let text = String::from_utf8(buffer).expect("export is utf-8");

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Age,Recency,Frequency,Monetary,RFMScore,AOV,Segmentation,Branch_Name")
        );
        assert_eq!(
            lines.next(),
            Some("36,21,6,420000.00,4.33,70000.00,Champion,Klampis")
        );
        assert_eq!(
            lines.next(),
            Some(",21,6,420000.00,4.33,70000.00,Champion,Klampis")
        );
    }
}
