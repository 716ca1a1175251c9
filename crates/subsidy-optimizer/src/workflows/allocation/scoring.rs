use super::domain::{CandidatePair, Efficiency, ScoredPair};
use super::policy::PolicyWeights;

/// Scores every pair in the pool against the pool-wide maximum of each impact metric.
///
/// When every pair has zero impact on an axis the normalised score on that axis is 0
/// for the whole pool. Pure: repeated calls with the same inputs give identical output.
pub fn score_pool(pool: &[CandidatePair], weights: PolicyWeights) -> Vec<ScoredPair> {
    let max_revenue = pool_max(pool.iter().map(|pair| pair.revenue_increase_pct));
    let max_employment = pool_max(pool.iter().map(|pair| pair.employment_increase_pct));

    pool.iter()
        .map(|pair| {
            let norm_revenue_score = normalize(pair.revenue_increase_pct, max_revenue);
            let norm_employment_score = normalize(pair.employment_increase_pct, max_employment);
            let composite_score = weights.blend(norm_revenue_score, norm_employment_score);

            ScoredPair {
                candidate: pair.clone(),
                norm_revenue_score,
                norm_employment_score,
                composite_score,
                efficiency: Efficiency::of(composite_score, pair.subsidy),
                weights,
            }
        })
        .collect()
}

fn pool_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}
