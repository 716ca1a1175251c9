use super::super::domain::{Efficiency, SubBudgetUsage};
use super::super::export::SelectionRow;
use super::super::policy::AllocationMode;
use super::super::sensitivity::SensitivityRow;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PolicyEcho {
    pub total_budget: f64,
    pub alpha: f64,
    pub beta: f64,
    pub mode: AllocationMode,
    pub mode_label: &'static str,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionSummary {
    pub pairs_selected: usize,
    pub unique_beneficiaries: usize,
    pub budget_used: f64,
    pub budget_unused: f64,
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateTotals {
    pub revenue_before: f64,
    pub revenue_after: f64,
    pub revenue_lift_pct: f64,
    pub revenue_gain: f64,
    pub employees_before: u64,
    pub employees_after: u64,
    pub employment_lift_pct: f64,
    pub new_jobs: u64,
    pub subsidy_disbursed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemeBreakdownEntry {
    pub scheme_name: String,
    pub times_selected: usize,
    pub total_subsidy: f64,
    pub total_new_jobs: u64,
    pub mean_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSelectionView {
    pub selection_rank: usize,
    pub beneficiary_id: String,
    pub scheme_id: String,
    pub scheme_name: String,
    pub composite_score: f64,
    pub efficiency: Efficiency,
    pub subsidy: f64,
    pub revenue_increase_pct: f64,
    pub employment_increase_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JustificationView {
    pub selection_rank: usize,
    pub beneficiary_id: String,
    pub scheme_name: String,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UtilizationView {
    pub eligible_pairs: usize,
    pub funded_pairs: usize,
    pub unfunded_pairs: usize,
    pub total_demand: f64,
    /// Budget as a share of the cost of funding every eligible pair.
    pub coverage_pct: f64,
    /// Spend as a share of the cost of funding every eligible pair.
    pub demand_met_pct: f64,
}

/// Structured run report; rendered to text by [`super::render_text`].
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub generated_at: DateTime<Utc>,
    pub policy: PolicyEcho,
    pub summary: SelectionSummary,
    pub aggregates: AggregateTotals,
    pub schemes: Vec<SchemeBreakdownEntry>,
    pub top_selections: Vec<RankedSelectionView>,
    pub justifications: Vec<JustificationView>,
    pub sensitivity: Vec<SensitivityRow>,
    pub utilization: UtilizationView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_budgets: Vec<SubBudgetUsage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnselectedView {
    #[serde(rename = "MSME_ID")]
    pub beneficiary_id: String,
    #[serde(rename = "Scheme_Name")]
    pub scheme_name: String,
    #[serde(rename = "Subsidy_Applied")]
    pub subsidy: f64,
    #[serde(rename = "Composite_Score")]
    pub composite_score: f64,
    #[serde(rename = "Efficiency")]
    pub efficiency: Efficiency,
    #[serde(rename = "Efficiency_Rank")]
    pub efficiency_rank: usize,
    #[serde(rename = "Reason")]
    pub reason: String,
}

/// Single machine-readable document describing a run.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationDocument {
    pub generated_at: DateTime<Utc>,
    pub budget: f64,
    pub budget_used: f64,
    pub utilization_pct: f64,
    pub alpha: f64,
    pub beta: f64,
    pub mode: AllocationMode,
    pub total_selected: usize,
    pub total_jobs_created: u64,
    pub total_revenue_gain: f64,
    pub total_demand: f64,
    pub selected: Vec<SelectionRow>,
    pub unselected: Vec<UnselectedView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_budgets: Vec<SubBudgetUsage>,
    pub sensitivity: Vec<SensitivityRow>,
}
