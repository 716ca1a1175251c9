use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use subsidy_optimizer::config::OptimizerConfig;
use subsidy_optimizer::workflows::allocation::{
    AllocationError, AllocationMode, AllocationPolicy, CategoryShares,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) optimizer: Arc<OptimizerConfig>,
}

/// Builds the run policy shared by the CLI and the HTTP route. Supplying custom
/// shares implies category sub-budgets.
pub(crate) fn build_policy(
    alpha: f64,
    budget: f64,
    category_budgets: bool,
    category_shares: &[(String, f64)],
) -> Result<AllocationPolicy, AllocationError> {
    let policy = AllocationPolicy::new(alpha, budget)?;
    if category_shares.is_empty() && !category_budgets {
        return Ok(policy);
    }

    let shares = if category_shares.is_empty() {
        CategoryShares::standard()
    } else {
        CategoryShares::from_labels(
            category_shares
                .iter()
                .map(|(label, share)| (label.as_str(), *share)),
        )?
    };

    Ok(policy
        .with_mode(AllocationMode::CategoryBudgets)
        .with_category_shares(shares))
}

/// Parses `LABEL=SHARE`, e.g. `Micro=0.4`.
pub(crate) fn parse_category_share(raw: &str) -> Result<(String, f64), String> {
    let (label, share) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=SHARE, got '{raw}'"))?;
    let share = share
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid share in '{raw}' ({err})"))?;
    Ok((label.trim().to_string(), share))
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsidy_optimizer::workflows::allocation::BeneficiaryCategory;

    #[test]
    fn plain_policy_stays_global() {
        let policy = build_policy(0.6, 1_000.0, false, &[]).expect("valid policy");
        assert_eq!(policy.mode, AllocationMode::Global);
    }

    #[test]
    fn custom_shares_switch_to_category_mode() {
        let shares = vec![("Micro".to_string(), 0.6), ("Medium".to_string(), 0.4)];
        let policy = build_policy(0.6, 1_000.0, false, &shares).expect("valid policy");
        assert_eq!(policy.mode, AllocationMode::CategoryBudgets);
        assert_eq!(policy.category_shares.share(BeneficiaryCategory::Small), 0.0);
    }

    #[test]
    fn invalid_shares_are_rejected() {
        let shares = vec![("Micro".to_string(), 0.6)];
        let error =
            build_policy(0.6, 1_000.0, true, &shares).expect_err("shares must sum to one");
        assert!(matches!(error, AllocationError::SharesDoNotSumToOne { .. }));
    }

    #[test]
    fn category_share_argument_format() {
        assert_eq!(
            parse_category_share(" Small = 0.35 "),
            Ok(("Small".to_string(), 0.35))
        );
        assert!(parse_category_share("Small").is_err());
        assert!(parse_category_share("Small=lots").is_err());
    }
}
