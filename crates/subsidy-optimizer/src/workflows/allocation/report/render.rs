use super::super::currency::{format_rupees, group_thousands};
use super::super::domain::Efficiency;
use super::super::policy::AllocationMode;
use super::super::sensitivity::SweepOutcome;
use super::views::AllocationReport;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 80;
const EMPTY_MARKER: &str = "—";

/// Renders the fixed-width text report written next to the results CSV.
pub fn render_text(report: &AllocationReport) -> String {
    let mut text = String::new();
    write_report(&mut text, report).expect("writing to a String cannot fail");
    text
}

fn write_report(out: &mut String, report: &AllocationReport) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "SUBSIDY ALLOCATION OPTIMIZATION REPORT")?;
    writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "{rule}")?;

    write_policy(out, report)?;
    write_summary(out, report)?;
    write_aggregates(out, report)?;
    write_schemes(out, report)?;
    write_top_selections(out, report)?;
    write_justifications(out, report)?;
    write_sensitivity(out, report)?;
    write_utilization(out, report)?;
    if report.policy.mode == AllocationMode::CategoryBudgets {
        write_sub_budgets(out, report)?;
    }

    writeln!(out)?;
    writeln!(out, "{rule}")
}

fn heading(out: &mut String, number: usize, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{number}. {title}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn write_policy(out: &mut String, report: &AllocationReport) -> fmt::Result {
    let policy = &report.policy;
    heading(out, 1, "POLICY CONFIGURATION")?;
    writeln!(
        out,
        "   Total budget:            {}",
        format_rupees(policy.total_budget, 0)
    )?;
    writeln!(
        out,
        "   Revenue weight (alpha):  {:.2}",
        policy.alpha
    )?;
    writeln!(out, "   Employment weight (beta): {:.2}", policy.beta)?;
    writeln!(out, "   Allocation mode:         {}", policy.mode_label)?;
    writeln!(
        out,
        "   Eligible pairs:          {}",
        group_thousands(policy.pool_size as f64, 0)
    )
}

fn write_summary(out: &mut String, report: &AllocationReport) -> fmt::Result {
    let summary = &report.summary;
    heading(out, 2, "OPTIMIZATION SUMMARY")?;
    if summary.pairs_selected == 0 {
        writeln!(out, "   No pairs could be funded within the budget.")?;
    }
    writeln!(
        out,
        "   Pairs selected:          {}",
        summary.pairs_selected
    )?;
    writeln!(
        out,
        "   Beneficiaries funded:    {}",
        summary.unique_beneficiaries
    )?;
    writeln!(
        out,
        "   Budget used:             {}",
        format_rupees(summary.budget_used, 0)
    )?;
    writeln!(
        out,
        "   Budget unused:           {}",
        format_rupees(summary.budget_unused, 0)
    )?;
    writeln!(
        out,
        "   Utilization:             {:.2}%",
        summary.utilization_pct
    )
}

fn write_aggregates(out: &mut String, report: &AllocationReport) -> fmt::Result {
    let totals = &report.aggregates;
    heading(out, 3, "AGGREGATE IMPACT (SELECTED PAIRS)")?;
    writeln!(
        out,
        "   {:<22} {:>20} {:>20} {:>10}",
        "Metric", "Before", "After", "Lift"
    )?;
    writeln!(
        out,
        "   {:<22} {:>20} {:>20} {:>9.2}%",
        "Annual revenue",
        format_rupees(totals.revenue_before, 0),
        format_rupees(totals.revenue_after, 0),
        totals.revenue_lift_pct
    )?;
    writeln!(
        out,
        "   {:<22} {:>20} {:>20} {:>9.2}%",
        "Employees",
        group_thousands(totals.employees_before as f64, 0),
        group_thousands(totals.employees_after as f64, 0),
        totals.employment_lift_pct
    )?;
    writeln!(
        out,
        "   Revenue gain:            {}",
        format_rupees(totals.revenue_gain, 0)
    )?;
    writeln!(
        out,
        "   New jobs created:        {}",
        group_thousands(totals.new_jobs as f64, 0)
    )?;
    writeln!(
        out,
        "   Subsidy disbursed:       {}",
        format_rupees(totals.subsidy_disbursed, 0)
    )
}

fn write_schemes(out: &mut String, report: &AllocationReport) -> fmt::Result {
    heading(out, 4, "SCHEME BREAKDOWN")?;
    if report.schemes.is_empty() {
        return writeln!(out, "   No schemes selected.");
    }

    writeln!(
        out,
        "   {:<34} {:>6} {:>18} {:>8} {:>8}",
        "Scheme", "Count", "Subsidy", "Jobs", "Score"
    )?;
    for entry in &report.schemes {
        writeln!(
            out,
            "   {:<34} {:>6} {:>18} {:>8} {:>8.4}",
            truncate(&entry.scheme_name, 34),
            entry.times_selected,
            format_rupees(entry.total_subsidy, 0),
            entry.total_new_jobs,
            entry.mean_score
        )?;
    }
    Ok(())
}

fn write_top_selections(out: &mut String, report: &AllocationReport) -> fmt::Result {
    heading(out, 5, "TOP RANKED SELECTIONS")?;
    if report.top_selections.is_empty() {
        return writeln!(out, "   No selections.");
    }

    writeln!(
        out,
        "   {:>4} {:<12} {:<28} {:>8} {:>12} {:>14}",
        "Rank", "MSME", "Scheme", "Score", "Efficiency", "Subsidy"
    )?;
    for view in &report.top_selections {
        writeln!(
            out,
            "   {:>4} {:<12} {:<28} {:>8.4} {:>12} {:>14}",
            view.selection_rank,
            truncate(&view.beneficiary_id, 12),
            truncate(&view.scheme_name, 28),
            view.composite_score,
            efficiency_cell(view.efficiency),
            format_rupees(view.subsidy, 0)
        )?;
    }
    Ok(())
}

fn write_justifications(out: &mut String, report: &AllocationReport) -> fmt::Result {
    heading(out, 6, "SELECTION JUSTIFICATIONS (SAMPLE)")?;
    if report.justifications.is_empty() {
        return writeln!(out, "   No selections to justify.");
    }

    for view in &report.justifications {
        writeln!(
            out,
            "   #{} {} / {}",
            view.selection_rank, view.beneficiary_id, view.scheme_name
        )?;
        writeln!(out, "      {}", view.justification)?;
    }
    Ok(())
}

fn write_sensitivity(out: &mut String, report: &AllocationReport) -> fmt::Result {
    heading(out, 7, "POLICY SENSITIVITY (GLOBAL GREEDY)")?;
    writeln!(
        out,
        "   {:>6} {:>6} {:>8} {:>18} {:>10}  {}",
        "Alpha", "Beta", "Pairs", "Budget used", "Mean", "Top scheme"
    )?;
    for row in &report.sensitivity {
        match &row.outcome {
            SweepOutcome::Empty => writeln!(
                out,
                "   {:>6.1} {:>6.1} {:>8} {:>18} {:>10}  {}",
                row.alpha, row.beta, 0, EMPTY_MARKER, EMPTY_MARKER, EMPTY_MARKER
            )?,
            SweepOutcome::Selected {
                count,
                budget_used,
                top_scheme,
                mean_score,
            } => writeln!(
                out,
                "   {:>6.1} {:>6.1} {:>8} {:>18} {:>10.4}  {}",
                row.alpha,
                row.beta,
                count,
                format_rupees(*budget_used, 0),
                mean_score,
                top_scheme
            )?,
        }
    }
    Ok(())
}

fn write_utilization(out: &mut String, report: &AllocationReport) -> fmt::Result {
    let view = &report.utilization;
    heading(out, 8, "BUDGET UTILIZATION")?;
    writeln!(
        out,
        "   Eligible pairs:          {}",
        group_thousands(view.eligible_pairs as f64, 0)
    )?;
    writeln!(out, "   Funded pairs:            {}", view.funded_pairs)?;
    writeln!(out, "   Unfunded pairs:          {}", view.unfunded_pairs)?;
    writeln!(
        out,
        "   Total subsidy demand:    {}",
        format_rupees(view.total_demand, 0)
    )?;
    writeln!(
        out,
        "   Budget covers:           {:.2}% of demand",
        view.coverage_pct
    )?;
    writeln!(
        out,
        "   Demand met:              {:.2}%",
        view.demand_met_pct
    )?;
    writeln!(
        out,
        "   Budget utilization:      {:.2}%",
        report.summary.utilization_pct
    )
}

fn write_sub_budgets(out: &mut String, report: &AllocationReport) -> fmt::Result {
    heading(out, 9, "CATEGORY SUB-BUDGETS")?;
    writeln!(
        out,
        "   {:<8} {:>6} {:>18} {:>18} {:>18} {:>6}",
        "Category", "Share", "Allocated", "Used", "Unused", "Pairs"
    )?;
    for usage in &report.sub_budgets {
        writeln!(
            out,
            "   {:<8} {:>5.0}% {:>18} {:>18} {:>18} {:>6}",
            usage.category_label,
            usage.share * 100.0,
            format_rupees(usage.allocated, 0),
            format_rupees(usage.used, 0),
            format_rupees(usage.unused, 0),
            usage.selected
        )?;
    }
    Ok(())
}

fn efficiency_cell(efficiency: Efficiency) -> String {
    match efficiency {
        Efficiency::CostFree => "cost-free".to_string(),
        Efficiency::PerUnit(value) => format!("{value:.3e}"),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut shortened: String = value.chars().take(width.saturating_sub(3)).collect();
        shortened.push_str("...");
        shortened
    }
}
