use chrono::{DateTime, TimeZone, Utc};
use subsidy_optimizer::workflows::allocation::export::write_selections_csv;
use subsidy_optimizer::workflows::allocation::greedy::efficiency_order;
use subsidy_optimizer::workflows::allocation::{
    render_text, AllocationEngine, AllocationMode, AllocationPolicy, AllocationRun,
    BeneficiaryCategory, CandidatePair, RejectionReason, SweepOutcome, SENSITIVITY_ALPHAS,
};
use subsidy_optimizer::workflows::candidates::CandidateImporter;

fn fixture_pool() -> Vec<CandidatePair> {
    let data = include_bytes!("fixtures/scheme_eligibility_sample.csv");
    CandidateImporter::from_reader(&data[..])
        .expect("fixture imports")
        .pairs
}

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn run(pool: &[CandidatePair], policy: AllocationPolicy) -> AllocationRun {
    AllocationEngine::new(policy)
        .run(pool)
        .expect("allocation succeeds")
}

fn uniform_pair(id: usize, revenue_pct: f64, employment_pct: f64) -> CandidatePair {
    CandidatePair {
        beneficiary_id: format!("MSME-{id:04}"),
        sector: "Textiles".to_string(),
        category: BeneficiaryCategory::Small,
        location_type: "Urban".to_string(),
        scheme_id: "SCH-01".to_string(),
        scheme_name: "Credit Guarantee Scheme".to_string(),
        revenue_before: 1_000_000.0,
        employees_before: 10,
        revenue_after: 1_000_000.0 * (1.0 + revenue_pct / 100.0),
        employees_after: 11,
        new_jobs: 1,
        subsidy: 50_000.0,
        revenue_increase_pct: revenue_pct,
        employment_increase_pct: employment_pct,
    }
}

#[test]
fn fixture_run_funds_the_cost_free_pair_first() {
    let pool = fixture_pool();
    assert_eq!(pool.len(), 11);

    let result = run(&pool, AllocationPolicy::new(0.6, 1_000_000.0).expect("valid"));
    let first = &result.selections()[0];
    assert_eq!(first.pair.candidate.beneficiary_id, "MSME-0004");
    assert_eq!(first.pair.candidate.scheme_id, "SCH-06");
    assert_eq!(first.efficiency_rank, 1);
    assert!(first.pair.efficiency.value().is_none());
}

#[test]
fn spend_never_exceeds_budget_and_every_pair_is_accounted_for() {
    let pool = fixture_pool();

    for budget in [50_000.0, 500_000.0, 1_000_000.0, 2_500_000.0, 10_000_000.0] {
        let result = run(&pool, AllocationPolicy::new(0.6, budget).expect("valid"));
        let selections = result.selections();

        assert!(result.budget_used() <= budget, "overspent budget {budget}");
        assert_eq!(selections.len() + result.rejected().len(), pool.len());

        let mut previous = 0.0;
        for (position, record) in selections.iter().enumerate() {
            assert_eq!(record.selection_rank, position + 1);
            assert!(record.cumulative_budget_used >= previous);
            assert!(record.remaining_budget >= 0.0);
            previous = record.cumulative_budget_used;
        }
        if let Some(last) = selections.last() {
            assert!((last.cumulative_budget_used - result.budget_used()).abs() < 1e-6);
        }
    }

    let everything = run(&pool, AllocationPolicy::new(0.6, 10_000_000.0).expect("valid"));
    assert!(everything.rejected().is_empty());
    assert!((everything.budget_used() - everything.total_demand()).abs() < 1e-6);
}

#[test]
fn identical_inputs_produce_identical_documents() {
    let pool = fixture_pool();
    let policy = AllocationPolicy::new(0.45, 1_250_000.0).expect("valid");

    let first = run(&pool, policy.clone()).document(generated_at());
    let second = run(&pool, policy).document(generated_at());

    assert_eq!(
        serde_json::to_value(&first).expect("serializes"),
        serde_json::to_value(&second).expect("serializes")
    );
}

#[test]
fn selection_count_grows_with_budget_when_costs_are_uniform() {
    let pool: Vec<CandidatePair> = (0..12)
        .map(|id| uniform_pair(id, 5.0 + id as f64, 20.0 - id as f64))
        .collect();

    let mut previous = 0;
    for step in 0..=14 {
        let budget = step as f64 * 50_000.0;
        let result = run(&pool, AllocationPolicy::new(0.6, budget).expect("valid"));
        let count = result.selections().len();
        assert!(count >= previous, "count fell at budget {budget}");
        assert_eq!(count, step.min(pool.len()));
        previous = count;
    }
}

#[test]
fn zero_budget_yields_an_explained_empty_run() {
    let pool = fixture_pool();
    let result = run(&pool, AllocationPolicy::new(0.6, 0.0).expect("valid"));

    assert!(result.selections().is_empty());
    assert!(result
        .rejected()
        .iter()
        .all(|entry| entry.reason == RejectionReason::NoBudgetAvailable));

    let document = result.document(generated_at());
    assert_eq!(document.utilization_pct, 0.0);
    assert_eq!(document.total_selected, 0);
    assert_eq!(document.unselected.len(), pool.len());

    let json = serde_json::to_value(&document).expect("serializes");
    assert_eq!(json["selected"], serde_json::json!([]));

    let text = render_text(&result.report(10, generated_at()));
    assert!(!text.contains("NaN"));
}

#[test]
fn empty_pool_reports_zero_percentages() {
    let result = run(&[], AllocationPolicy::new(0.6, 1_000_000.0).expect("valid"));
    assert!(result.selections().is_empty());
    assert_eq!(result.total_demand(), 0.0);

    let report = result.report(10, generated_at());
    assert_eq!(report.utilization.coverage_pct, 0.0);
    assert_eq!(report.utilization.demand_met_pct, 0.0);
    assert_eq!(report.sensitivity.len(), SENSITIVITY_ALPHAS.len());
    assert!(report
        .sensitivity
        .iter()
        .all(|row| row.outcome == SweepOutcome::Empty));

    let text = render_text(&report);
    assert!(!text.contains("NaN"));
    assert!(!text.contains("inf"));

    let document = result.document(generated_at());
    assert_eq!(document.utilization_pct, 0.0);
    assert_eq!(document.sensitivity.len(), 5);
    let json = serde_json::to_value(&document).expect("serializes");
    assert!(json.get("sub_budgets").is_none());
}

#[test]
fn cost_free_pool_has_zero_demand_and_is_fully_funded() {
    let pool: Vec<CandidatePair> = (0..3)
        .map(|id| CandidatePair {
            subsidy: 0.0,
            ..uniform_pair(id, 4.0 + id as f64, 10.0)
        })
        .collect();
    let result = run(&pool, AllocationPolicy::new(0.6, 500_000.0).expect("valid"));

    assert_eq!(result.selections().len(), 3);
    assert_eq!(result.budget_used(), 0.0);
    assert_eq!(result.total_demand(), 0.0);

    let report = result.report(10, generated_at());
    assert_eq!(report.utilization.coverage_pct, 0.0);
    assert_eq!(report.utilization.demand_met_pct, 0.0);
    assert_eq!(report.sensitivity.len(), 5);

    let text = render_text(&report);
    assert!(!text.contains("NaN"));
    assert!(!text.contains("inf"));

    let json = serde_json::to_value(result.document(generated_at())).expect("serializes");
    assert_eq!(json["utilization_pct"], serde_json::json!(0.0));
    assert!(json["selected"][0]["Efficiency"].is_null());
}

#[test]
fn category_mode_reports_idle_sub_budgets() {
    let pool: Vec<CandidatePair> = fixture_pool()
        .into_iter()
        .filter(|pair| pair.category != BeneficiaryCategory::Medium)
        .collect();
    let policy = AllocationPolicy::new(0.6, 2_000_000.0)
        .expect("valid")
        .with_mode(AllocationMode::CategoryBudgets);
    let result = run(&pool, policy);

    let medium = result
        .sub_budgets()
        .iter()
        .find(|usage| usage.category == BeneficiaryCategory::Medium)
        .expect("medium sub-budget reported");
    assert_eq!(medium.selected, 0);
    assert_eq!(medium.used, 0.0);
    assert_eq!(medium.unused, medium.allocated);

    for usage in result.sub_budgets() {
        assert!(usage.used <= usage.allocated);
    }
    for record in result.selections() {
        let tag = record.sub_budget.expect("category runs tag every selection");
        assert_eq!(tag.category, record.pair.candidate.category);
    }
}

#[test]
fn category_mode_keeps_pool_wide_efficiency_ranks() {
    let pool = fixture_pool();
    let policy = AllocationPolicy::new(0.6, 3_000_000.0)
        .expect("valid")
        .with_mode(AllocationMode::CategoryBudgets);
    let result = run(&pool, policy);

    let order = efficiency_order(result.scored());
    for record in result.selections() {
        let index = order[record.efficiency_rank - 1];
        let ranked = &result.scored()[index].candidate;
        assert_eq!(ranked.beneficiary_id, record.pair.candidate.beneficiary_id);
        assert_eq!(ranked.scheme_id, record.pair.candidate.scheme_id);
    }
}

#[test]
fn selections_csv_has_one_row_per_selection() {
    let pool = fixture_pool();
    let result = run(&pool, AllocationPolicy::new(0.6, 1_000_000.0).expect("valid"));

    let mut buffer = Vec::new();
    write_selections_csv(&mut buffer, result.selections()).expect("csv written");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.get(0), Some("Selection_Rank"));
    assert_eq!(reader.records().count(), result.selections().len());
}
