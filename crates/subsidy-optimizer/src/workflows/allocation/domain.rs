use super::policy::PolicyWeights;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Size class of a beneficiary enterprise; the key of the sub-budget table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BeneficiaryCategory {
    Micro,
    Small,
    Medium,
}

impl BeneficiaryCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Micro, Self::Small, Self::Medium]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Micro => "Micro",
            Self::Small => "Small",
            Self::Medium => "Medium",
        }
    }

    /// Case and whitespace insensitive lookup of a category label.
    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
    }
}

/// One beneficiary x funding-scheme combination produced by the eligibility step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePair {
    pub beneficiary_id: String,
    pub sector: String,
    pub category: BeneficiaryCategory,
    pub location_type: String,
    pub scheme_id: String,
    pub scheme_name: String,
    pub revenue_before: f64,
    pub employees_before: u32,
    pub revenue_after: f64,
    pub employees_after: u32,
    pub new_jobs: u32,
    pub subsidy: f64,
    pub revenue_increase_pct: f64,
    pub employment_increase_pct: f64,
}

impl CandidatePair {
    pub fn revenue_gain(&self) -> f64 {
        (self.revenue_after - self.revenue_before).max(0.0)
    }
}

/// Composite score per unit of subsidy.
///
/// Pairs that cost nothing have no finite ratio; they are treated as maximally
/// efficient and order ahead of every priced pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Efficiency {
    CostFree,
    PerUnit(f64),
}

impl Efficiency {
    pub fn of(composite_score: f64, subsidy: f64) -> Self {
        if subsidy > 0.0 {
            Self::PerUnit(composite_score / subsidy)
        } else {
            Self::CostFree
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::CostFree => None,
            Self::PerUnit(value) => Some(value),
        }
    }

    /// Ordering used by the greedy walk: most efficient first.
    pub fn cmp_descending(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::CostFree, Self::CostFree) => Ordering::Equal,
            (Self::CostFree, Self::PerUnit(_)) => Ordering::Less,
            (Self::PerUnit(_), Self::CostFree) => Ordering::Greater,
            (Self::PerUnit(left), Self::PerUnit(right)) => right.total_cmp(left),
        }
    }
}

impl Serialize for Efficiency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::CostFree => serializer.serialize_none(),
            Self::PerUnit(value) => serializer.serialize_f64(*value),
        }
    }
}

/// Candidate pair plus the fields derived by one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPair {
    #[serde(flatten)]
    pub candidate: CandidatePair,
    pub norm_revenue_score: f64,
    pub norm_employment_score: f64,
    pub composite_score: f64,
    pub efficiency: Efficiency,
    pub weights: PolicyWeights,
}

/// Category partition a selection was funded from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubBudgetTag {
    pub category: BeneficiaryCategory,
    pub allocated: f64,
}

/// A pair accepted by the allocator, with the budget snapshot at acceptance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRecord {
    pub pair: ScoredPair,
    pub selection_rank: usize,
    pub efficiency_rank: usize,
    pub cumulative_budget_used: f64,
    pub remaining_budget: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_budget: Option<SubBudgetTag>,
    pub justification: String,
}

impl SelectionRecord {
    /// Budget that was still available right before this pair was accepted.
    pub fn remaining_before(&self) -> f64 {
        self.remaining_budget + self.pair.candidate.subsidy
    }
}

/// Why the allocator passed over a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    NoBudgetAvailable,
    ExceedsRemainingBudget {
        remaining: f64,
    },
    NoSubBudget {
        category: BeneficiaryCategory,
    },
    ExceedsSubBudget {
        category: BeneficiaryCategory,
        remaining: f64,
    },
}

impl RejectionReason {
    pub fn summary(&self) -> String {
        match self {
            RejectionReason::NoBudgetAvailable => "no budget available".to_string(),
            RejectionReason::ExceedsRemainingBudget { remaining } => format!(
                "subsidy exceeds remaining budget of {}",
                super::currency::format_rupees(*remaining, 0)
            ),
            RejectionReason::NoSubBudget { category } => {
                format!("no sub-budget allocated to {} beneficiaries", category.label())
            }
            RejectionReason::ExceedsSubBudget {
                category,
                remaining,
            } => format!(
                "subsidy exceeds remaining {} sub-budget of {}",
                category.label(),
                super::currency::format_rupees(*remaining, 0)
            ),
        }
    }
}

/// A pair the allocator did not fund.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedPair {
    pub pair: ScoredPair,
    pub efficiency_rank: usize,
    pub reason: RejectionReason,
}

/// Spend against one category sub-budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubBudgetUsage {
    pub category: BeneficiaryCategory,
    pub category_label: &'static str,
    pub share: f64,
    pub allocated: f64,
    pub used: f64,
    pub unused: f64,
    pub selected: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("alpha must be a number within [0, 1], got {value}")]
    InvalidAlpha { value: f64 },
    #[error("total budget must be a finite number, got {value}")]
    InvalidBudget { value: f64 },
    #[error("{beneficiary_id}/{scheme_id}: subsidy amount {value} is negative")]
    NegativeSubsidy {
        beneficiary_id: String,
        scheme_id: String,
        value: f64,
    },
    #[error("{beneficiary_id}/{scheme_id}: {field} is not a finite number")]
    NonFiniteValue {
        beneficiary_id: String,
        scheme_id: String,
        field: &'static str,
    },
    #[error("unknown beneficiary category '{label}' in budget shares")]
    UnknownCategory { label: String },
    #[error("budget share for {category} listed more than once")]
    DuplicateCategory { category: &'static str },
    #[error("budget share for {category} must be a non-negative number, got {value}")]
    InvalidShare { category: &'static str, value: f64 },
    #[error("category budget shares must sum to 1.0, got {total:.4}")]
    SharesDoNotSumToOne { total: f64 },
}

/// Rejects structurally invalid rows before any scoring or allocation happens.
pub fn validate_pool(pool: &[CandidatePair]) -> Result<(), AllocationError> {
    for pair in pool {
        let numeric = [
            ("subsidy", pair.subsidy),
            ("revenue_before", pair.revenue_before),
            ("revenue_after", pair.revenue_after),
            ("revenue_increase_pct", pair.revenue_increase_pct),
            ("employment_increase_pct", pair.employment_increase_pct),
        ];
        if let Some((field, _)) = numeric.iter().find(|(_, value)| !value.is_finite()) {
            return Err(AllocationError::NonFiniteValue {
                beneficiary_id: pair.beneficiary_id.clone(),
                scheme_id: pair.scheme_id.clone(),
                field: *field,
            });
        }

        if pair.subsidy < 0.0 {
            return Err(AllocationError::NegativeSubsidy {
                beneficiary_id: pair.beneficiary_id.clone(),
                scheme_id: pair.scheme_id.clone(),
                value: pair.subsidy,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(subsidy: f64) -> CandidatePair {
        CandidatePair {
            beneficiary_id: "MSME-0001".to_string(),
            sector: "Textiles".to_string(),
            category: BeneficiaryCategory::Micro,
            location_type: "Urban".to_string(),
            scheme_id: "SCH-01".to_string(),
            scheme_name: "Credit Guarantee".to_string(),
            revenue_before: 1_000_000.0,
            employees_before: 10,
            revenue_after: 1_100_000.0,
            employees_after: 12,
            new_jobs: 2,
            subsidy,
            revenue_increase_pct: 10.0,
            employment_increase_pct: 20.0,
        }
    }

    #[test]
    fn category_labels_round_trip_case_insensitively() {
        assert_eq!(
            BeneficiaryCategory::from_label(" micro "),
            Some(BeneficiaryCategory::Micro)
        );
        assert_eq!(
            BeneficiaryCategory::from_label("MEDIUM"),
            Some(BeneficiaryCategory::Medium)
        );
        assert_eq!(BeneficiaryCategory::from_label("Large"), None);
    }

    #[test]
    fn cost_free_pairs_sort_ahead_of_priced_pairs() {
        let mut values = vec![
            Efficiency::PerUnit(0.2),
            Efficiency::CostFree,
            Efficiency::PerUnit(0.9),
        ];
        values.sort_by(Efficiency::cmp_descending);
        assert_eq!(
            values,
            vec![
                Efficiency::CostFree,
                Efficiency::PerUnit(0.9),
                Efficiency::PerUnit(0.2)
            ]
        );
        assert_eq!(Efficiency::of(0.5, 0.0), Efficiency::CostFree);
        assert_eq!(Efficiency::of(0.5, 100.0).value(), Some(0.005));
    }

    #[test]
    fn validate_pool_rejects_negative_subsidy() {
        match validate_pool(&[pair(100.0), pair(-1.0)]) {
            Err(AllocationError::NegativeSubsidy { value, .. }) => assert_eq!(value, -1.0),
            other => panic!("expected negative subsidy error, got {other:?}"),
        }
    }

    #[test]
    fn validate_pool_rejects_nan_metrics() {
        let mut broken = pair(100.0);
        broken.employment_increase_pct = f64::NAN;
        match validate_pool(&[broken]) {
            Err(AllocationError::NonFiniteValue { field, .. }) => {
                assert_eq!(field, "employment_increase_pct")
            }
            other => panic!("expected non-finite error, got {other:?}"),
        }
        assert!(validate_pool(&[]).is_ok());
    }

    #[test]
    fn rejection_reasons_render_amounts() {
        let reason = RejectionReason::ExceedsSubBudget {
            category: BeneficiaryCategory::Small,
            remaining: 1_250_000.0,
        };
        assert_eq!(
            reason.summary(),
            "subsidy exceeds remaining Small sub-budget of ₹1,250,000"
        );
    }
}
