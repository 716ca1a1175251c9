use super::domain::{AllocationError, BeneficiaryCategory};
use serde::Serialize;
use std::collections::BTreeMap;

const SHARE_TOLERANCE: f64 = 1e-6;

/// Revenue weight `alpha`; the employment weight is always `1 - alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "WeightsView")]
pub struct PolicyWeights {
    alpha: f64,
}

#[derive(Serialize)]
struct WeightsView {
    alpha: f64,
    beta: f64,
}

impl From<PolicyWeights> for WeightsView {
    fn from(weights: PolicyWeights) -> Self {
        Self {
            alpha: weights.alpha(),
            beta: weights.beta(),
        }
    }
}

impl PolicyWeights {
    /// Clamps `alpha` into `[0, 1]`. NaN has no place in that range and is rejected.
    pub fn clamped(alpha: f64) -> Result<Self, AllocationError> {
        if alpha.is_nan() {
            return Err(AllocationError::InvalidAlpha { value: alpha });
        }

        Ok(Self {
            alpha: alpha.clamp(0.0, 1.0),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        1.0 - self.alpha
    }

    pub fn blend(&self, revenue_score: f64, employment_score: f64) -> f64 {
        self.alpha * revenue_score + self.beta() * employment_score
    }
}

/// How the total budget is spent across the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    Global,
    CategoryBudgets,
}

impl AllocationMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Global => "Global Greedy",
            Self::CategoryBudgets => "Category Sub-budgets",
        }
    }
}

/// Fraction of the total budget reserved for each beneficiary category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShares {
    shares: BTreeMap<BeneficiaryCategory, f64>,
}

impl CategoryShares {
    /// 40% Micro, 35% Small, 25% Medium.
    pub fn standard() -> Self {
        let shares = BTreeMap::from([
            (BeneficiaryCategory::Micro, 0.40),
            (BeneficiaryCategory::Small, 0.35),
            (BeneficiaryCategory::Medium, 0.25),
        ]);
        Self { shares }
    }

    /// Builds a share table from `(label, share)` pairs. Categories left out receive
    /// no sub-budget.
    pub fn from_labels<I, S>(entries: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut shares = BTreeMap::new();
        for (label, share) in entries {
            let category = BeneficiaryCategory::from_label(label.as_ref()).ok_or_else(|| {
                AllocationError::UnknownCategory {
                    label: label.as_ref().to_string(),
                }
            })?;

            if !share.is_finite() || share < 0.0 {
                return Err(AllocationError::InvalidShare {
                    category: category.label(),
                    value: share,
                });
            }

            if shares.insert(category, share).is_some() {
                return Err(AllocationError::DuplicateCategory {
                    category: category.label(),
                });
            }
        }

        let total: f64 = shares.values().sum();
        if (total - 1.0).abs() > SHARE_TOLERANCE {
            return Err(AllocationError::SharesDoNotSumToOne { total });
        }

        Ok(Self { shares })
    }

    pub fn share(&self, category: BeneficiaryCategory) -> f64 {
        self.shares.get(&category).copied().unwrap_or(0.0)
    }

    pub fn sub_budget(&self, category: BeneficiaryCategory, total_budget: f64) -> f64 {
        self.share(category) * total_budget
    }
}

impl Default for CategoryShares {
    fn default() -> Self {
        Self::standard()
    }
}

/// Everything that parameterises one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPolicy {
    pub weights: PolicyWeights,
    pub total_budget: f64,
    pub mode: AllocationMode,
    pub category_shares: CategoryShares,
}

impl AllocationPolicy {
    pub fn new(alpha: f64, total_budget: f64) -> Result<Self, AllocationError> {
        if !total_budget.is_finite() {
            return Err(AllocationError::InvalidBudget {
                value: total_budget,
            });
        }

        Ok(Self {
            weights: PolicyWeights::clamped(alpha)?,
            total_budget,
            mode: AllocationMode::Global,
            category_shares: CategoryShares::standard(),
        })
    }

    pub fn with_mode(mut self, mode: AllocationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_category_shares(mut self, shares: CategoryShares) -> Self {
        self.category_shares = shares;
        self
    }
}
