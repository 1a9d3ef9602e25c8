//! Candidate ranking and position sizing.

use std::collections::{BTreeSet, HashMap};

use famafrench_math::{mean, round_half_even, sample_std};
use famafrench_primitives::{
    Allocation, Diagnostic, DiagnosticKind, RankedCandidate, RegressionResult, Symbol, total_cost,
};
use tracing::{debug, warn};

use crate::{EqualWeightConfig, RankingConfig};

/// Selected candidates plus symbols dropped as outliers.
#[derive(Debug, Clone, Default)]
pub struct RankingOutcome {
    /// Best candidates first, at most `top_k`.
    pub selected: Vec<RankedCandidate>,
    /// Outlier rejections.
    pub diagnostics: Vec<Diagnostic>,
}

/// Allocations plus symbols that could not be priced.
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    /// One row per priced symbol, in ranking order.
    pub allocations: Vec<Allocation>,
    /// Symbols skipped for lack of a usable price.
    pub diagnostics: Vec<Diagnostic>,
}

impl AllocationOutcome {
    /// Sum of subtotals.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        total_cost(&self.allocations)
    }
}

/// Equal-weight shortlist of the best fits under a price ceiling.
#[derive(Debug, Clone, Default)]
pub struct EqualWeightPlan {
    /// Shortlisted positions, highest R-squared first.
    pub allocations: Vec<Allocation>,
    /// Sum of subtotals.
    pub total_cost: f64,
}

/// Filter, score and select regression results.
///
/// Excluded symbols are removed first. Alpha outliers are then rejected: each row's distance
/// from the mean alpha in sample standard deviations is rounded to two decimals and rows at or
/// beyond `outlier_std` are dropped; when the deviation is zero or undefined nothing is dropped.
/// Remaining rows are scored by
/// `rsquared_weight * (r2 - max_r2)^2 + alpha_weight * (alpha - max_alpha)^2`
/// and sorted ascending, ties broken by symbol.
#[must_use]
pub fn rank_and_select(
    results: &[RegressionResult],
    exclude: &BTreeSet<Symbol>,
    config: &RankingConfig,
) -> RankingOutcome {
    let eligible: Vec<&RegressionResult> =
        results.iter().filter(|r| !exclude.contains(&r.symbol)).collect();

    let alphas: Vec<f64> = eligible.iter().map(|r| r.alpha).collect();
    let alpha_mean = mean(&alphas);
    let alpha_std = sample_std(&alphas).filter(|s| s.is_finite() && *s > 0.0);

    let mut diagnostics = Vec::new();
    let mut kept: Vec<(&RegressionResult, Option<f64>)> = Vec::with_capacity(eligible.len());
    for r in eligible {
        let z = alpha_mean
            .zip(alpha_std)
            .map(|(m, s)| round_half_even((r.alpha - m).abs() / s, 2));
        match z {
            Some(z) if z >= config.outlier_std => {
                warn!(symbol = %r.symbol, z, "alpha outlier, dropping");
                diagnostics.push(Diagnostic::new(
                    r.symbol.clone(),
                    DiagnosticKind::Outlier,
                    format!("alpha {z} standard deviations from mean"),
                ));
            }
            _ => kept.push((r, z)),
        }
    }

    let max_rsquared = kept.iter().map(|(r, _)| r.rsquared).fold(f64::NEG_INFINITY, f64::max);
    let max_alpha = kept.iter().map(|(r, _)| r.alpha).fold(f64::NEG_INFINITY, f64::max);

    let mut scored: Vec<RankedCandidate> = kept
        .into_iter()
        .map(|(r, z)| RankedCandidate {
            symbol: r.symbol.clone(),
            alpha: r.alpha,
            rsquared: r.rsquared,
            std_from_mean: z,
            objective: config.rsquared_weight * (r.rsquared - max_rsquared).powi(2)
                + config.alpha_weight * (r.alpha - max_alpha).powi(2),
        })
        .collect();
    scored.sort_by(|a, b| {
        a.objective.total_cmp(&b.objective).then_with(|| a.symbol.cmp(&b.symbol))
    });
    scored.truncate(config.top_k);

    debug!(selected = scored.len(), outliers = diagnostics.len(), "ranking complete");
    RankingOutcome { selected: scored, diagnostics }
}

/// Split `investment_amount` evenly across the selection and convert to whole shares.
///
/// Each of the `N` selected symbols targets `investment_amount / N`; shares are
/// `round(target / price)` with ties to even, so a position may round to zero.
#[must_use]
pub fn allocate(
    selected: &[RankedCandidate],
    latest_prices: &HashMap<Symbol, f64>,
    investment_amount: f64,
) -> AllocationOutcome {
    let mut outcome = AllocationOutcome::default();
    if selected.is_empty() {
        return outcome;
    }
    let target = investment_amount / selected.len() as f64;

    for candidate in selected {
        let Some(&price) = latest_prices.get(&candidate.symbol).filter(|p| **p > 0.0) else {
            warn!(symbol = %candidate.symbol, "no usable latest price, skipping allocation");
            outcome.diagnostics.push(Diagnostic::new(
                candidate.symbol.clone(),
                DiagnosticKind::MissingData,
                "no usable latest price",
            ));
            continue;
        };
        let shares = (target / price).round_ties_even().max(0.0) as u64;
        outcome.allocations.push(Allocation::new(
            candidate.symbol.clone(),
            shares,
            price,
            candidate.rsquared,
            candidate.alpha,
        ));
    }
    outcome
}

/// Price-capped, R-squared-sorted shortlist with equal-weight sizing.
///
/// Symbols priced below `price_ceiling` are sorted by descending R-squared (ties by symbol),
/// the first `topx` are kept and each receives `ceil(budget / (price * topx))` shares.
#[must_use]
pub fn equal_weight_shortlist(
    results: &[RegressionResult],
    exclude: &BTreeSet<Symbol>,
    latest_prices: &HashMap<Symbol, f64>,
    config: &EqualWeightConfig,
) -> EqualWeightPlan {
    let mut priced: Vec<(&RegressionResult, f64)> = results
        .iter()
        .filter(|r| !exclude.contains(&r.symbol))
        .filter_map(|r| latest_prices.get(&r.symbol).map(|p| (r, *p)))
        .filter(|(_, p)| *p > 0.0 && *p < config.price_ceiling)
        .collect();
    priced.sort_by(|(a, _), (b, _)| {
        b.rsquared.total_cmp(&a.rsquared).then_with(|| a.symbol.cmp(&b.symbol))
    });
    priced.truncate(config.topx);

    let topx = config.topx as f64;
    let allocations: Vec<Allocation> = priced
        .into_iter()
        .map(|(r, price)| {
            let shares = (config.budget / (price * topx)).ceil() as u64;
            Allocation::new(r.symbol.clone(), shares, price, r.rsquared, r.alpha)
        })
        .collect();
    let total_cost = total_cost(&allocations);
    EqualWeightPlan { allocations, total_cost }
}

/// The `n` highest-alpha results, re-sorted by descending R-squared.
#[must_use]
pub fn alpha_leaders(results: &[RegressionResult], n: usize) -> Vec<RegressionResult> {
    let mut by_alpha: Vec<&RegressionResult> = results.iter().collect();
    by_alpha.sort_by(|a, b| b.alpha.total_cmp(&a.alpha).then_with(|| a.symbol.cmp(&b.symbol)));
    by_alpha.truncate(n);
    by_alpha.sort_by(|a, b| b.rsquared.total_cmp(&a.rsquared));
    by_alpha.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn result(symbol: &str, alpha: f64, rsquared: f64) -> RegressionResult {
        RegressionResult {
            symbol: Symbol::new(symbol),
            alpha,
            beta_market: 1.0,
            beta_smb: 0.0,
            beta_hml: 0.0,
            rsquared,
            observations: 250,
            residuals: Vec::new(),
        }
    }

    fn prices(pairs: &[(&str, f64)]) -> HashMap<Symbol, f64> {
        pairs.iter().map(|(s, p)| (Symbol::new(s), *p)).collect()
    }

    #[test]
    fn best_alpha_and_fit_ranks_first() {
        let results = vec![
            result("LOW", 0.0001, 0.9),
            result("TOP", 0.0010, 0.95),
            result("MID", 0.0005, 0.5),
        ];

        let outcome = rank_and_select(&results, &BTreeSet::new(), &RankingConfig::default());

        let order: Vec<&str> = outcome.selected.iter().map(|c| c.symbol.as_str()).collect();
        // A small alpha gap outweighs a large R-squared gap.
        assert_eq!(order, vec!["TOP", "LOW", "MID"]);
        assert_relative_eq!(outcome.selected[0].objective, 0.0);
    }

    #[test]
    fn excluded_symbols_removed() {
        let results = vec![result("sg", 0.5, 1.0), result("AAPL", 0.001, 0.4)];
        let exclude: BTreeSet<Symbol> = [Symbol::new("sg")].into_iter().collect();

        let outcome = rank_and_select(&results, &exclude, &RankingConfig::default());

        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(outcome.selected[0].symbol, Symbol::new("AAPL"));
    }

    #[test]
    fn outliers_rejected() {
        let mut results: Vec<_> =
            (0..49).map(|i| result(&format!("S{i:02}"), 0.001 * f64::from(i % 3), 0.5)).collect();
        results.push(result("FREAK", 5.0, 0.5));

        let outcome = rank_and_select(&results, &BTreeSet::new(), &RankingConfig::default());

        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].symbol, Symbol::new("FREAK"));
        assert!(outcome.selected.iter().all(|c| c.symbol.as_str() != "FREAK"));
    }

    // 49 background alphas plus one candidate; raw z of 6.0015, 5.9971 and 5.9916.
    #[rstest]
    #[case(0.011029, Some(6.0))]
    #[case(0.011, Some(6.0))]
    #[case(0.010963, None)]
    fn outlier_cutoff_applies_to_rounded_z(#[case] alpha: f64, #[case] dropped_at: Option<f64>) {
        let mut results: Vec<_> =
            (0..49).map(|i| result(&format!("S{i:02}"), 0.001 * f64::from(i % 3), 0.5)).collect();
        results.push(result("EDGE", alpha, 0.5));

        let outcome = rank_and_select(&results, &BTreeSet::new(), &RankingConfig::default());

        let edge = outcome.selected.iter().find(|c| c.symbol.as_str() == "EDGE");
        match dropped_at {
            Some(z) => {
                assert!(edge.is_none());
                assert_eq!(outcome.diagnostics.len(), 1);
                assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Outlier);
                assert!(outcome.diagnostics[0].reason.starts_with(&format!("alpha {z} ")));
            }
            None => {
                assert!(outcome.diagnostics.is_empty());
                assert_eq!(edge.unwrap().std_from_mean, Some(5.99));
            }
        }
    }

    #[test]
    fn zero_dispersion_drops_nothing() {
        let results: Vec<_> = (0..5).map(|i| result(&format!("S{i}"), 0.002, 0.5)).collect();

        let outcome = rank_and_select(&results, &BTreeSet::new(), &RankingConfig::default());

        assert_eq!(outcome.selected.len(), 5);
        assert!(outcome.selected.iter().all(|c| c.std_from_mean.is_none()));
        // Equal objectives fall back to symbol order.
        let order: Vec<&str> = outcome.selected.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(order, vec!["S0", "S1", "S2", "S3", "S4"]);
    }

    #[test]
    fn top_k_truncates() {
        let results: Vec<_> =
            (0..60).map(|i| result(&format!("S{i:02}"), 0.0001 * f64::from(i), 0.5)).collect();
        let config = RankingConfig { top_k: 40, ..RankingConfig::default() };

        let outcome = rank_and_select(&results, &BTreeSet::new(), &config);

        assert_eq!(outcome.selected.len(), 40);
        assert_eq!(outcome.selected[0].symbol, Symbol::new("S59"));
    }

    #[rstest]
    #[case(12.0, 833)]
    #[case(250.0, 40)]
    #[case(4000.0, 2)]
    #[case(20_001.0, 0)]
    fn allocation_rounds_target_over_price(#[case] price: f64, #[case] expected: u64) {
        let selected = rank_and_select(
            &[result("A", 0.001, 0.9)],
            &BTreeSet::new(),
            &RankingConfig::default(),
        )
        .selected;

        let outcome = allocate(&selected, &prices(&[("A", price)]), 10_000.0);

        assert_eq!(outcome.allocations[0].shares, expected);
        assert_eq!(outcome.allocations[0].shares, (10_000.0 / price).round_ties_even() as u64);
        assert_relative_eq!(outcome.allocations[0].subtotal, expected as f64 * price);
    }

    #[test]
    fn allocation_splits_budget_and_skips_unpriced() {
        let results = vec![result("A", 0.002, 0.9), result("B", 0.001, 0.8), result("C", 0.0, 0.1)];
        let selected =
            rank_and_select(&results, &BTreeSet::new(), &RankingConfig::default()).selected;

        let outcome = allocate(&selected, &prices(&[("A", 100.0), ("B", 7.0)]), 9_000.0);

        // 3000 per name: 30 shares of A, round(428.57) = 429 of B, C unpriced.
        assert_eq!(outcome.allocations.len(), 2);
        assert_eq!(outcome.allocations[0].shares, 30);
        assert_eq!(outcome.allocations[1].shares, 429);
        assert_eq!(outcome.diagnostics[0].symbol, Symbol::new("C"));
        assert_relative_eq!(outcome.total_cost(), 3000.0 + 429.0 * 7.0);
    }

    #[test]
    fn equal_weight_shortlist_caps_price_and_sorts_by_fit() {
        let results = vec![
            result("PRICEY", 0.001, 0.99),
            result("BEST", 0.001, 0.95),
            result("GOOD", 0.001, 0.90),
            result("OK", 0.001, 0.50),
        ];
        let latest = prices(&[("PRICEY", 1500.0), ("BEST", 40.0), ("GOOD", 300.0), ("OK", 10.0)]);
        let config = EqualWeightConfig { price_ceiling: 1000.0, topx: 2, budget: 10_000.0 };

        let plan = equal_weight_shortlist(&results, &BTreeSet::new(), &latest, &config);

        let symbols: Vec<&str> = plan.allocations.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BEST", "GOOD"]);
        assert_eq!(plan.allocations[0].shares, 125);
        assert_eq!(plan.allocations[1].shares, 17);
        assert_relative_eq!(plan.total_cost, 125.0 * 40.0 + 17.0 * 300.0);
    }

    #[test]
    fn alpha_leaders_resorted_by_fit() {
        let results = vec![
            result("A", 0.004, 0.2),
            result("B", 0.003, 0.9),
            result("C", 0.002, 0.5),
            result("D", 0.001, 0.99),
        ];

        let leaders = alpha_leaders(&results, 3);

        let symbols: Vec<&str> = leaders.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B", "C", "A"]);
    }
}
