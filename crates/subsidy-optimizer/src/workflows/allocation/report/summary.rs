use super::super::domain::SelectionRecord;
use super::super::engine::AllocationRun;
use super::super::export::SelectionRow;
use super::views::{
    AggregateTotals, AllocationDocument, AllocationReport, JustificationView, PolicyEcho,
    RankedSelectionView, SchemeBreakdownEntry, SelectionSummary, UnselectedView,
    UtilizationView,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

const JUSTIFICATION_SAMPLE: usize = 3;

impl AllocationReport {
    pub fn build(run: &AllocationRun, top_n: usize, generated_at: DateTime<Utc>) -> Self {
        let selections = run.selections();

        let top_selections = selections
            .iter()
            .take(top_n)
            .map(ranked_view)
            .collect();

        let justifications = selections
            .iter()
            .take(JUSTIFICATION_SAMPLE)
            .map(|record| JustificationView {
                selection_rank: record.selection_rank,
                beneficiary_id: record.pair.candidate.beneficiary_id.clone(),
                scheme_name: record.pair.candidate.scheme_name.clone(),
                justification: record.justification.clone(),
            })
            .collect();

        Self {
            generated_at,
            policy: policy_echo(run),
            summary: selection_summary(run),
            aggregates: aggregate_totals(selections),
            schemes: scheme_breakdown(selections),
            top_selections,
            justifications,
            sensitivity: run.sensitivity().to_vec(),
            utilization: utilization(run),
            sub_budgets: run.sub_budgets().to_vec(),
        }
    }
}

impl AllocationDocument {
    pub fn build(run: &AllocationRun, generated_at: DateTime<Utc>) -> Self {
        let policy = run.policy();
        let selections = run.selections();
        let aggregates = aggregate_totals(selections);

        let unselected = run
            .rejected()
            .iter()
            .map(|entry| UnselectedView {
                beneficiary_id: entry.pair.candidate.beneficiary_id.clone(),
                scheme_name: entry.pair.candidate.scheme_name.clone(),
                subsidy: entry.pair.candidate.subsidy,
                composite_score: entry.pair.composite_score,
                efficiency: entry.pair.efficiency,
                efficiency_rank: entry.efficiency_rank,
                reason: entry.reason.summary(),
            })
            .collect();

        Self {
            generated_at,
            budget: policy.total_budget,
            budget_used: run.budget_used(),
            utilization_pct: percentage(run.budget_used(), policy.total_budget),
            alpha: policy.weights.alpha(),
            beta: policy.weights.beta(),
            mode: policy.mode,
            total_selected: selections.len(),
            total_jobs_created: aggregates.new_jobs,
            total_revenue_gain: aggregates.revenue_gain,
            total_demand: run.total_demand(),
            selected: selections.iter().map(SelectionRow::from).collect(),
            unselected,
            sub_budgets: run.sub_budgets().to_vec(),
            sensitivity: run.sensitivity().to_vec(),
        }
    }
}

/// `part / whole * 100`, or 0 when `whole` is not positive.
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn policy_echo(run: &AllocationRun) -> PolicyEcho {
    let policy = run.policy();
    PolicyEcho {
        total_budget: policy.total_budget,
        alpha: policy.weights.alpha(),
        beta: policy.weights.beta(),
        mode: policy.mode,
        mode_label: policy.mode.label(),
        pool_size: run.pool_size(),
    }
}

fn selection_summary(run: &AllocationRun) -> SelectionSummary {
    let budget = run.policy().total_budget;
    let budget_used = run.budget_used();
    let unique_beneficiaries = run
        .selections()
        .iter()
        .map(|record| record.pair.candidate.beneficiary_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    SelectionSummary {
        pairs_selected: run.selections().len(),
        unique_beneficiaries,
        budget_used,
        budget_unused: (budget - budget_used).max(0.0),
        utilization_pct: percentage(budget_used, budget),
    }
}

fn aggregate_totals(selections: &[SelectionRecord]) -> AggregateTotals {
    let mut totals = AggregateTotals {
        revenue_before: 0.0,
        revenue_after: 0.0,
        revenue_lift_pct: 0.0,
        revenue_gain: 0.0,
        employees_before: 0,
        employees_after: 0,
        employment_lift_pct: 0.0,
        new_jobs: 0,
        subsidy_disbursed: 0.0,
    };

    for record in selections {
        let candidate = &record.pair.candidate;
        totals.revenue_before += candidate.revenue_before;
        totals.revenue_after += candidate.revenue_after;
        totals.revenue_gain += candidate.revenue_gain();
        totals.employees_before += u64::from(candidate.employees_before);
        totals.employees_after += u64::from(candidate.employees_after);
        totals.new_jobs += u64::from(candidate.new_jobs);
        totals.subsidy_disbursed += candidate.subsidy;
    }

    totals.revenue_lift_pct = percentage(
        totals.revenue_after - totals.revenue_before,
        totals.revenue_before,
    );
    totals.employment_lift_pct = percentage(
        totals.employees_after as f64 - totals.employees_before as f64,
        totals.employees_before as f64,
    );

    totals
}

/// Per-scheme totals, most frequently selected first; ties ordered by scheme name.
fn scheme_breakdown(selections: &[SelectionRecord]) -> Vec<SchemeBreakdownEntry> {
    let mut entries: Vec<SchemeBreakdownEntry> = Vec::new();
    for record in selections {
        let candidate = &record.pair.candidate;
        let position = entries
            .iter()
            .position(|entry| entry.scheme_name == candidate.scheme_name);
        let entry = match position {
            Some(index) => &mut entries[index],
            None => {
                entries.push(SchemeBreakdownEntry {
                    scheme_name: candidate.scheme_name.clone(),
                    times_selected: 0,
                    total_subsidy: 0.0,
                    total_new_jobs: 0,
                    mean_score: 0.0,
                });
                let last = entries.len() - 1;
                &mut entries[last]
            }
        };

        entry.times_selected += 1;
        entry.total_subsidy += candidate.subsidy;
        entry.total_new_jobs += u64::from(candidate.new_jobs);
        // running sum; divided below
        entry.mean_score += record.pair.composite_score;
    }

    for entry in &mut entries {
        entry.mean_score /= entry.times_selected as f64;
    }

    entries.sort_by(|left, right| {
        right
            .times_selected
            .cmp(&left.times_selected)
            .then_with(|| left.scheme_name.cmp(&right.scheme_name))
    });
    entries
}

fn ranked_view(record: &SelectionRecord) -> RankedSelectionView {
    let candidate = &record.pair.candidate;
    RankedSelectionView {
        selection_rank: record.selection_rank,
        beneficiary_id: candidate.beneficiary_id.clone(),
        scheme_id: candidate.scheme_id.clone(),
        scheme_name: candidate.scheme_name.clone(),
        composite_score: record.pair.composite_score,
        efficiency: record.pair.efficiency,
        subsidy: candidate.subsidy,
        revenue_increase_pct: candidate.revenue_increase_pct,
        employment_increase_pct: candidate.employment_increase_pct,
    }
}

fn utilization(run: &AllocationRun) -> UtilizationView {
    let total_demand = run.total_demand();
    let funded_pairs = run.selections().len();

    UtilizationView {
        eligible_pairs: run.pool_size(),
        funded_pairs,
        unfunded_pairs: run.pool_size() - funded_pairs,
        total_demand,
        coverage_pct: percentage(run.policy().total_budget.max(0.0), total_demand),
        demand_met_pct: percentage(run.budget_used(), total_demand),
    }
}
