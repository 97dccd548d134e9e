use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod data;
mod filters;
mod kpi;
mod models;
mod report;
mod segments;

use models::{
    ActivityFilter, AgeBreakdown, BranchSelection, CheatingFilter, FilterState, Period,
};

#[derive(Parser)]
#[command(name = "branch-rfm")]
#[command(about = "Branch and customer RFM analytics over dashboard snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-branch KPI tiles for one month
    Kpi {
        #[arg(long, default_value = "branch_rfm.csv")]
        data: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Summarize customer segments under the active filters
    Segments {
        #[arg(long, default_value = "rfm_customers.csv")]
        data: PathBuf,
        #[arg(long, default_value = "all")]
        branch: String,
        #[arg(long)]
        active_only: bool,
        #[arg(long)]
        exclude_cheating: bool,
        #[arg(long)]
        segment: Option<String>,
    },
    /// Export the filtered customer detail for one segment
    Export {
        #[arg(long, default_value = "rfm_customers.csv")]
        data: PathBuf,
        #[arg(long, default_value = "all")]
        branch: String,
        #[arg(long)]
        active_only: bool,
        #[arg(long)]
        exclude_cheating: bool,
        #[arg(long)]
        segment: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report for one month
    Report {
        #[arg(long, default_value = "branch_rfm.csv")]
        data: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn filter_state(
    branch: String,
    active_only: bool,
    exclude_cheating: bool,
    segment: Option<String>,
) -> FilterState {
    FilterState {
        branch: if branch.eq_ignore_ascii_case("all") {
            BranchSelection::All
        } else {
            BranchSelection::Only(branch)
        },
        activity: if active_only {
            ActivityFilter::ActiveOnly
        } else {
            ActivityFilter::All
        },
        cheating: if exclude_cheating {
            CheatingFilter::Exclude
        } else {
            CheatingFilter::Include
        },
        segment,
    }
}

fn month_inputs(
    data: &PathBuf,
    config: Option<&PathBuf>,
    period: Period,
) -> anyhow::Result<Option<MonthInputs>> {
    if !kpi::DATA_COVERAGE.contains(period) {
        eprintln!(
            "Data not available for the selected date. Coverage runs {} through {}.",
            report::period_label(kpi::DATA_COVERAGE.first),
            report::period_label(kpi::DATA_COVERAGE.last)
        );
        return Ok(None);
    }

    let records = data::load_branch_snapshot(data)?;
    let selected = kpi::select_period(&records, period);

    for record in &selected {
        if !record.buckets_reconcile() {
            eprintln!(
                "Activity buckets for {} do not add up to its member total; its percentages will not sum to 100.",
                record.branch_name
            );
        }
    }

    let config = data::load_branch_config(config.map(PathBuf::as_path))?;
    for record in &selected {
        if record.branch_name != kpi::EXCLUDED_BRANCH && !config.contains_key(&record.branch_name) {
            eprintln!(
                "No configuration for branch {}; skipping its KPIs.",
                record.branch_name
            );
        }
    }
    let metrics = kpi::metrics_for_period(&selected, &config);
    let summary = kpi::summarize_period(&selected, &metrics);

    Ok(Some(MonthInputs {
        metrics,
        summary,
        config,
    }))
}

struct MonthInputs {
    metrics: Vec<models::DerivedBranchMetrics>,
    summary: Vec<models::BranchSummaryRow>,
    config: std::collections::HashMap<String, models::BranchConfig>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Kpi {
            data,
            year,
            month,
            config,
        } => {
            let period = Period { year, month };
            let Some(inputs) = month_inputs(&data, config.as_ref(), period)? else {
                return Ok(());
            };

            if inputs.metrics.is_empty() {
                println!("No branch rows for {}.", report::period_label(period));
                return Ok(());
            }

            for metric in &inputs.metrics {
                println!("{} - {}", metric.branch_name, report::period_label(period));
                println!(
                    "  lost {:.2}% | semi-lost {:.2}% | new {:.2}% | returning {:.2}%",
                    metric.pct_lost, metric.pct_semi_lost, metric.pct_new, metric.pct_returning
                );
                println!(
                    "  member cut {:.2}% | non-member cut {:.2}% | acquisition {:.2}%",
                    metric.pct_member_cut, metric.pct_non_member_cut, metric.pct_acquisition
                );
                println!(
                    "  cut vs target {:.1}% | cut per chair {:.1} | active ratio {} : {} | active members {:.1}%",
                    metric.pct_target,
                    metric.cut_per_chair,
                    metric.member_ratio_tenths,
                    metric.non_member_ratio_tenths,
                    metric.active_member_pct
                );
            }

            println!();
            println!("Month summary:");
            for row in &inputs.summary {
                let target = row
                    .target_pct
                    .map(|pct| format!("{pct:.1}%"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {}: {} cuts, {} members, target {}",
                    row.record.branch_name, row.record.total_cut, row.record.total_members, target
                );
            }
        }
        Commands::Segments {
            data,
            branch,
            active_only,
            exclude_cheating,
            segment,
        } => {
            let records = data::load_customer_snapshot(&data)?;
            let state = filter_state(branch, active_only, exclude_cheating, segment);
            let filtered = filters::apply_filters(&records, &state);

            println!("Total = {} members", filtered.len());

            let mix = segments::segment_mix(&filtered);
            if mix.is_empty() {
                println!("No members match the current filters.");
                return Ok(());
            }
            for share in &mix {
                println!("- {}: {} ({:.1}%)", share.segment, share.count, share.share_pct);
            }

            if let Some(segment) = &state.segment {
                let detail = segments::segment_detail(&filtered, segment);
                println!();
                println!("Segment: {segment}");
                println!("- customers: {}", detail.count);
                println!("- average monetary: Rp{:.2}", detail.mean_monetary);
                println!("- average frequency: {:.1}", detail.mean_frequency);
                println!("- average order value: Rp{:.2}", detail.mean_aov);
                match detail.ages {
                    AgeBreakdown::Unavailable => println!("- age data not available"),
                    AgeBreakdown::OutOfRangeOnly { excluded_count } => println!(
                        "- no ages inside {:.0}-{:.0} ({excluded_count} outside the window)",
                        segments::AGE_FLOOR,
                        segments::AGE_CEILING
                    ),
                    AgeBreakdown::Profile(ages) => println!(
                        "- age: mean {:.1}, median {:.1}, range {:.0}-{:.0} ({} valid, {} outside the window)",
                        ages.mean, ages.median, ages.min, ages.max, ages.valid_count, ages.excluded_count
                    ),
                }
            }
        }
        Commands::Export {
            data,
            branch,
            active_only,
            exclude_cheating,
            segment,
            out,
        } => {
            let records = data::load_customer_snapshot(&data)?;
            let state = filter_state(branch, active_only, exclude_cheating, Some(segment.clone()));
            let filtered = filters::apply_filters(&records, &state);
            let rows = segments::segment_records(&filtered, &segment);

            let out_path = out.unwrap_or_else(|| PathBuf::from(report::export_filename(&segment)));
            let file = std::fs::File::create(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            report::write_segment_export(&rows, file)?;

            println!("Exported {} rows to {}.", rows.len(), out_path.display());
        }
        Commands::Report {
            data,
            year,
            month,
            config,
            out,
        } => {
            let period = Period { year, month };
            let Some(inputs) = month_inputs(&data, config.as_ref(), period)? else {
                return Ok(());
            };

            let rendered =
                report::build_report(period, &inputs.summary, &inputs.metrics, &inputs.config);
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
