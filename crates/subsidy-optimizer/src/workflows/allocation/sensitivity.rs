use super::domain::{validate_pool, AllocationError, CandidatePair};
use super::greedy::{allocate_global, Allocation};
use super::policy::PolicyWeights;
use super::scoring::score_pool;
use serde::Serialize;
use tracing::debug;

/// Revenue weights swept from employment-heavy to revenue-heavy.
pub const SENSITIVITY_ALPHAS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub alpha: f64,
    pub beta: f64,
    pub outcome: SweepOutcome,
}

/// Result of one sweep point. `Empty` is reported explicitly rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    Empty,
    Selected {
        count: usize,
        budget_used: f64,
        top_scheme: String,
        mean_score: f64,
    },
}

/// Re-runs scoring and the global greedy pass once per `alpha`, in the given order.
pub fn sweep(
    pool: &[CandidatePair],
    budget: f64,
    alphas: &[f64],
) -> Result<Vec<SensitivityRow>, AllocationError> {
    validate_pool(pool)?;

    alphas
        .iter()
        .map(|&alpha| {
            let weights = PolicyWeights::clamped(alpha)?;
            let allocation = allocate_global(&score_pool(pool, weights), budget);
            let outcome = summarize(&allocation);
            debug!(alpha = weights.alpha(), ?outcome, "sensitivity point evaluated");

            Ok(SensitivityRow {
                alpha: weights.alpha(),
                beta: weights.beta(),
                outcome,
            })
        })
        .collect()
}

fn summarize(allocation: &Allocation) -> SweepOutcome {
    let count = allocation.selections.len();
    let Some(top_scheme) = most_frequent_scheme(allocation) else {
        return SweepOutcome::Empty;
    };

    SweepOutcome::Selected {
        count,
        budget_used: allocation.budget_used(),
        top_scheme,
        mean_score: allocation.total_score() / count as f64,
    }
}

/// Most frequently selected scheme name; ties go to the one seen first.
fn most_frequent_scheme(allocation: &Allocation) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in &allocation.selections {
        let name = record.pair.candidate.scheme_name.as_str();
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }

    best.map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::domain::BeneficiaryCategory;

    fn pair(
        id: &str,
        scheme: &str,
        subsidy: f64,
        revenue_pct: f64,
        employment_pct: f64,
    ) -> CandidatePair {
        CandidatePair {
            beneficiary_id: id.to_string(),
            sector: "Textiles".to_string(),
            category: BeneficiaryCategory::Micro,
            location_type: "Urban".to_string(),
            scheme_id: scheme.to_ascii_uppercase(),
            scheme_name: scheme.to_string(),
            revenue_before: 1_000_000.0,
            employees_before: 10,
            revenue_after: 1_000_000.0 + subsidy,
            employees_after: 11,
            new_jobs: 1,
            subsidy,
            revenue_increase_pct: revenue_pct,
            employment_increase_pct: employment_pct,
        }
    }

    fn pool() -> Vec<CandidatePair> {
        vec![
            pair("A", "Revenue Booster", 100.0, 20.0, 1.0),
            pair("B", "Revenue Booster", 100.0, 18.0, 2.0),
            pair("C", "Jobs Drive", 100.0, 1.0, 20.0),
            pair("D", "Jobs Drive", 100.0, 2.0, 18.0),
        ]
    }

    #[test]
    fn one_row_per_alpha_in_requested_order() {
        let rows = sweep(&pool(), 200.0, &SENSITIVITY_ALPHAS).expect("sweep runs");

        let alphas: Vec<f64> = rows.iter().map(|row| row.alpha).collect();
        assert_eq!(alphas, SENSITIVITY_ALPHAS.to_vec());
        for row in &rows {
            assert!((row.alpha + row.beta - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn selection_shifts_with_policy_weight() {
        let rows = sweep(&pool(), 200.0, &[0.1, 0.9]).expect("sweep runs");

        match &rows[0].outcome {
            SweepOutcome::Selected {
                count, top_scheme, ..
            } => {
                assert_eq!(*count, 2);
                assert_eq!(top_scheme, "Jobs Drive");
            }
            other => panic!("expected selection, got {other:?}"),
        }
        match &rows[1].outcome {
            SweepOutcome::Selected {
                top_scheme,
                budget_used,
                ..
            } => {
                assert_eq!(top_scheme, "Revenue Booster");
                assert_eq!(*budget_used, 200.0);
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn empty_sweep_points_are_reported_not_dropped() {
        let rows = sweep(&pool(), 50.0, &SENSITIVITY_ALPHAS).expect("sweep runs");
        assert_eq!(rows.len(), SENSITIVITY_ALPHAS.len());
        assert!(rows.iter().all(|row| row.outcome == SweepOutcome::Empty));

        let rows = sweep(&[], 1_000.0, &SENSITIVITY_ALPHAS).expect("sweep runs");
        assert_eq!(rows.len(), SENSITIVITY_ALPHAS.len());
    }

    #[test]
    fn top_scheme_ties_go_to_first_selected() {
        let rows = sweep(&pool(), 400.0, &[0.5]).expect("sweep runs");
        match &rows[0].outcome {
            SweepOutcome::Selected {
                count,
                top_scheme,
                mean_score,
                ..
            } => {
                assert_eq!(*count, 4);
                assert_eq!(top_scheme, "Revenue Booster");
                assert!(*mean_score > 0.0 && *mean_score <= 1.0);
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }
}
