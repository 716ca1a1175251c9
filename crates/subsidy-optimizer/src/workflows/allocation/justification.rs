use super::currency::format_rupees;
use super::domain::SelectionRecord;

/// Human-readable reason a pair was funded. Depends only on the record and the pool
/// size, so identical runs produce identical text.
pub fn justify(record: &SelectionRecord, pool_size: usize) -> String {
    let pair = &record.pair;
    let candidate = &pair.candidate;
    let budget_label = match record.sub_budget {
        Some(tag) => format!("remaining {} sub-budget", tag.category.label()),
        None => "remaining budget".to_string(),
    };

    format!(
        "Selected (Efficiency Rank #{} of {}). \
         Revenue impact: {:.2}% (weight={:.2}), \
         Employment impact: {:.2}% (weight={:.2}). \
         Composite score: {:.4}. \
         Subsidy {} fit within {} {}.",
        record.efficiency_rank,
        pool_size,
        candidate.revenue_increase_pct,
        pair.weights.alpha(),
        candidate.employment_increase_pct,
        pair.weights.beta(),
        pair.composite_score,
        format_rupees(candidate.subsidy, 0),
        budget_label,
        format_rupees(record.remaining_before(), 0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::domain::{
        BeneficiaryCategory, CandidatePair, Efficiency, ScoredPair, SubBudgetTag,
    };
    use crate::workflows::allocation::policy::PolicyWeights;

    fn record(sub_budget: Option<SubBudgetTag>) -> SelectionRecord {
        let candidate = CandidatePair {
            beneficiary_id: "MSME-0042".to_string(),
            sector: "Handicrafts".to_string(),
            category: BeneficiaryCategory::Micro,
            location_type: "Rural".to_string(),
            scheme_id: "SCH-07".to_string(),
            scheme_name: "Interest Subvention".to_string(),
            revenue_before: 800_000.0,
            employees_before: 6,
            revenue_after: 920_000.0,
            employees_after: 7,
            new_jobs: 1,
            subsidy: 120_000.0,
            revenue_increase_pct: 15.0,
            employment_increase_pct: 16.6667,
        };
        SelectionRecord {
            pair: ScoredPair {
                candidate,
                norm_revenue_score: 0.75,
                norm_employment_score: 0.5,
                composite_score: 0.65,
                efficiency: Efficiency::of(0.65, 120_000.0),
                weights: PolicyWeights::clamped(0.6).expect("valid"),
            },
            selection_rank: 1,
            efficiency_rank: 4,
            cumulative_budget_used: 120_000.0,
            remaining_budget: 880_000.0,
            sub_budget,
            justification: String::new(),
        }
    }

    #[test]
    fn restates_rank_impacts_and_budget_before_acceptance() {
        let text = justify(&record(None), 250);
        assert_eq!(
            text,
            "Selected (Efficiency Rank #4 of 250). Revenue impact: 15.00% (weight=0.60), \
             Employment impact: 16.67% (weight=0.40). Composite score: 0.6500. \
             Subsidy ₹120,000 fit within remaining budget ₹1,000,000."
        );
    }

    #[test]
    fn names_the_sub_budget_in_category_mode() {
        let text = justify(
            &record(Some(SubBudgetTag {
                category: BeneficiaryCategory::Micro,
                allocated: 2_000_000.0,
            })),
            250,
        );
        assert!(text.ends_with("fit within remaining Micro sub-budget ₹1,000,000."));
    }
}
