use super::domain::{
    validate_pool, AllocationError, CandidatePair, RejectedPair, ScoredPair, SelectionRecord,
    SubBudgetUsage,
};
use super::greedy::{allocate_by_category, allocate_global, Allocation};
use super::policy::{AllocationMode, AllocationPolicy};
use super::report::views::{AllocationDocument, AllocationReport};
use super::scoring::score_pool;
use super::sensitivity::{sweep, SensitivityRow, SENSITIVITY_ALPHAS};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Stateless optimizer that applies one policy to a candidate pool.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    policy: AllocationPolicy,
}

impl AllocationEngine {
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Validates, scores, allocates and sweeps. Nothing is retained between calls.
    pub fn run(&self, pool: &[CandidatePair]) -> Result<AllocationRun, AllocationError> {
        validate_pool(pool)?;

        let scored = score_pool(pool, self.policy.weights);
        let allocation = match self.policy.mode {
            AllocationMode::Global => allocate_global(&scored, self.policy.total_budget),
            AllocationMode::CategoryBudgets => allocate_by_category(
                &scored,
                self.policy.total_budget,
                &self.policy.category_shares,
            ),
        };
        let sensitivity = sweep(pool, self.policy.total_budget, &SENSITIVITY_ALPHAS)?;

        if allocation.selections.is_empty() {
            warn!(
                pool_size = pool.len(),
                budget = self.policy.total_budget,
                "no pairs could be selected within the budget"
            );
        } else {
            info!(
                pool_size = pool.len(),
                selected = allocation.selections.len(),
                budget_used = allocation.budget_used(),
                budget = self.policy.total_budget,
                mode = self.policy.mode.label(),
                "allocation complete"
            );
        }

        Ok(AllocationRun {
            policy: self.policy.clone(),
            scored,
            allocation,
            sensitivity,
        })
    }
}

/// Everything one run produced; read-only once built.
#[derive(Debug, Clone)]
pub struct AllocationRun {
    policy: AllocationPolicy,
    scored: Vec<ScoredPair>,
    allocation: Allocation,
    sensitivity: Vec<SensitivityRow>,
}

impl AllocationRun {
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    pub fn scored(&self) -> &[ScoredPair] {
        &self.scored
    }

    pub fn selections(&self) -> &[SelectionRecord] {
        &self.allocation.selections
    }

    pub fn rejected(&self) -> &[RejectedPair] {
        &self.allocation.rejected
    }

    pub fn sub_budgets(&self) -> &[SubBudgetUsage] {
        &self.allocation.sub_budgets
    }

    pub fn sensitivity(&self) -> &[SensitivityRow] {
        &self.sensitivity
    }

    pub fn pool_size(&self) -> usize {
        self.scored.len()
    }

    pub fn budget_used(&self) -> f64 {
        self.allocation.budget_used()
    }

    /// Subsidy cost of every eligible pair, funded or not.
    pub fn total_demand(&self) -> f64 {
        self.scored.iter().map(|pair| pair.candidate.subsidy).sum()
    }

    pub fn report(&self, top_n: usize, generated_at: DateTime<Utc>) -> AllocationReport {
        AllocationReport::build(self, top_n, generated_at)
    }

    pub fn document(&self, generated_at: DateTime<Utc>) -> AllocationDocument {
        AllocationDocument::build(self, generated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::domain::BeneficiaryCategory;

    fn pair(id: &str, category: BeneficiaryCategory, subsidy: f64, pct: f64) -> CandidatePair {
        CandidatePair {
            beneficiary_id: id.to_string(),
            sector: "Agro".to_string(),
            category,
            location_type: "Rural".to_string(),
            scheme_id: "SCH-03".to_string(),
            scheme_name: "Market Linkage".to_string(),
            revenue_before: 400_000.0,
            employees_before: 4,
            revenue_after: 400_000.0 + subsidy,
            employees_after: 5,
            new_jobs: 1,
            subsidy,
            revenue_increase_pct: pct,
            employment_increase_pct: pct / 2.0,
        }
    }

    #[test]
    fn run_dispatches_on_mode() {
        let pool = vec![
            pair("m", BeneficiaryCategory::Micro, 500.0, 10.0),
            pair("s", BeneficiaryCategory::Small, 500.0, 20.0),
        ];

        let global = AllocationEngine::new(AllocationPolicy::new(0.6, 1_000.0).expect("valid"))
            .run(&pool)
            .expect("run succeeds");
        assert_eq!(global.selections().len(), 2);
        assert!(global.sub_budgets().is_empty());

        let partitioned = AllocationEngine::new(
            AllocationPolicy::new(0.6, 1_000.0)
                .expect("valid")
                .with_mode(AllocationMode::CategoryBudgets),
        )
        .run(&pool)
        .expect("run succeeds");
        // Micro 400 and Small 350 are both below the 500 subsidy.
        assert!(partitioned.selections().is_empty());
        assert_eq!(partitioned.sub_budgets().len(), 3);
        assert_eq!(partitioned.rejected().len(), 2);
    }

    #[test]
    fn run_rejects_malformed_pool_before_allocating() {
        let pool = vec![pair("bad", BeneficiaryCategory::Micro, -5.0, 10.0)];
        let engine = AllocationEngine::new(AllocationPolicy::new(0.6, 1_000.0).expect("valid"));
        assert!(matches!(
            engine.run(&pool),
            Err(AllocationError::NegativeSubsidy { .. })
        ));
    }

    #[test]
    fn total_demand_covers_the_whole_pool() {
        let pool = vec![
            pair("a", BeneficiaryCategory::Micro, 300.0, 10.0),
            pair("b", BeneficiaryCategory::Micro, 900.0, 5.0),
        ];
        let run = AllocationEngine::new(AllocationPolicy::new(0.5, 500.0).expect("valid"))
            .run(&pool)
            .expect("run succeeds");
        assert_eq!(run.total_demand(), 1_200.0);
        assert_eq!(run.budget_used(), 300.0);
        assert_eq!(run.sensitivity().len(), SENSITIVITY_ALPHAS.len());
    }
}
