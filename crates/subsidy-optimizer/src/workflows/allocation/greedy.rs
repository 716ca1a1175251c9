//! Efficiency-ranked greedy selection under a budget ceiling.
//!
//! Each pair is a 0/1 decision taken once, in descending efficiency order, with no
//! backtracking. A costly pair that does not fit is skipped even when a cheaper,
//! less efficient pair later in the order does fit. This is the usual greedy
//! approximation of budgeted selection and is not an exact knapsack solution.

use super::domain::{
    BeneficiaryCategory, RejectedPair, RejectionReason, ScoredPair, SelectionRecord,
    SubBudgetTag, SubBudgetUsage,
};
use super::justification::justify;
use super::policy::CategoryShares;
use serde::Serialize;
use tracing::debug;

/// Outcome of one allocator pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Allocation {
    pub selections: Vec<SelectionRecord>,
    pub rejected: Vec<RejectedPair>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_budgets: Vec<SubBudgetUsage>,
}

impl Allocation {
    pub fn budget_used(&self) -> f64 {
        self.selections
            .iter()
            .map(|record| record.pair.candidate.subsidy)
            .sum()
    }

    pub fn total_score(&self) -> f64 {
        self.selections
            .iter()
            .map(|record| record.pair.composite_score)
            .sum()
    }
}

/// Indices into `scored`, most efficient first. Equal efficiencies keep input order.
pub fn efficiency_order(scored: &[ScoredPair]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&left, &right| {
        scored[left]
            .efficiency
            .cmp_descending(&scored[right].efficiency)
    });
    order
}

/// Single pass over the whole pool against one budget.
pub fn allocate_global(scored: &[ScoredPair], budget: f64) -> Allocation {
    let ranked = ranked_order(scored);
    let walk = walk(
        scored,
        ranked.into_iter(),
        budget,
        RejectionReason::NoBudgetAvailable,
        |remaining| RejectionReason::ExceedsRemainingBudget { remaining },
    );

    let accepted = walk
        .accepted
        .into_iter()
        .map(|accepted| (accepted, None))
        .collect();

    Allocation {
        selections: into_records(scored, accepted),
        rejected: walk.rejected,
        sub_budgets: Vec::new(),
    }
}

/// Splits the budget by category share and runs an independent greedy pass per
/// category. Selections are concatenated in category order; the cumulative spend is a
/// running total over that concatenation.
pub fn allocate_by_category(
    scored: &[ScoredPair],
    total_budget: f64,
    shares: &CategoryShares,
) -> Allocation {
    let ranked = ranked_order(scored);
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    let mut sub_budgets = Vec::new();

    for category in BeneficiaryCategory::ordered() {
        let allocated = shares.sub_budget(category, total_budget);
        let partition = ranked
            .iter()
            .copied()
            .filter(|&(_, index)| scored[index].candidate.category == category);
        let exhausted = if total_budget > 0.0 {
            RejectionReason::NoSubBudget { category }
        } else {
            RejectionReason::NoBudgetAvailable
        };

        let walk = walk(scored, partition, allocated, exhausted, |remaining| {
            RejectionReason::ExceedsSubBudget {
                category,
                remaining,
            }
        });

        debug!(
            category = category.label(),
            allocated,
            used = walk.used,
            selected = walk.accepted.len(),
            "category sub-budget allocated"
        );

        sub_budgets.push(SubBudgetUsage {
            category,
            category_label: category.label(),
            share: shares.share(category),
            allocated,
            used: walk.used,
            unused: (allocated - walk.used).max(0.0),
            selected: walk.accepted.len(),
        });

        let tag = SubBudgetTag {
            category,
            allocated,
        };
        accepted.extend(walk.accepted.into_iter().map(|entry| (entry, Some(tag))));
        rejected.extend(walk.rejected);
    }

    rejected.sort_by_key(|entry: &RejectedPair| entry.efficiency_rank);

    Allocation {
        selections: into_records(scored, accepted),
        rejected,
        sub_budgets,
    }
}

/// `(efficiency_rank, index)` pairs over the whole pool, rank starting at 1.
fn ranked_order(scored: &[ScoredPair]) -> Vec<(usize, usize)> {
    efficiency_order(scored)
        .into_iter()
        .enumerate()
        .map(|(position, index)| (position + 1, index))
        .collect()
}

struct Accepted {
    index: usize,
    efficiency_rank: usize,
    remaining: f64,
}

#[derive(Default)]
struct Walk {
    accepted: Vec<Accepted>,
    rejected: Vec<RejectedPair>,
    used: f64,
}

fn walk<I, F>(
    scored: &[ScoredPair],
    ranked: I,
    budget: f64,
    exhausted: RejectionReason,
    over_budget: F,
) -> Walk
where
    I: Iterator<Item = (usize, usize)>,
    F: Fn(f64) -> RejectionReason,
{
    let mut walk = Walk::default();
    let mut remaining = budget;

    for (efficiency_rank, index) in ranked {
        let pair = &scored[index];
        let cost = pair.candidate.subsidy;

        let reason = if budget <= 0.0 {
            Some(exhausted.clone())
        } else if cost <= remaining {
            None
        } else {
            Some(over_budget(remaining))
        };

        match reason {
            None => {
                remaining -= cost;
                walk.used += cost;
                walk.accepted.push(Accepted {
                    index,
                    efficiency_rank,
                    remaining,
                });
            }
            Some(reason) => walk.rejected.push(RejectedPair {
                pair: pair.clone(),
                efficiency_rank,
                reason,
            }),
        }
    }

    walk
}

fn into_records(
    scored: &[ScoredPair],
    accepted: Vec<(Accepted, Option<SubBudgetTag>)>,
) -> Vec<SelectionRecord> {
    let pool_size = scored.len();
    let mut cumulative = 0.0;

    accepted
        .into_iter()
        .enumerate()
        .map(|(position, (entry, sub_budget))| {
            let pair = scored[entry.index].clone();
            cumulative += pair.candidate.subsidy;

            let mut record = SelectionRecord {
                pair,
                selection_rank: position + 1,
                efficiency_rank: entry.efficiency_rank,
                cumulative_budget_used: cumulative,
                remaining_budget: entry.remaining,
                sub_budget,
                justification: String::new(),
            };
            record.justification = justify(&record, pool_size);
            record
        })
        .collect()
}
