//! Size by book-to-market classification.

use std::collections::BTreeSet;

use famafrench_primitives::{
    AssetFundamental, Bucket, BucketAssignment, Diagnostic, DiagnosticKind, SizeLeg, Symbol,
    ValueLeg,
};
use tracing::{debug, warn};

use crate::PortfolioError;

/// Configuration for the 2x3 sort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyConfig {
    /// Assets with `|book_to_market|` at or below this are excluded.
    pub book_to_market_epsilon: f64,
    /// Assets with market cap at or below this are excluded.
    pub market_cap_epsilon: f64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self { book_to_market_epsilon: 1e-5, market_cap_epsilon: 1e-4 }
    }
}

/// Rank cut points derived from the number of eligible assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    /// Eligible asset count.
    pub n: usize,
    /// `floor(n / 10)`.
    pub p10: usize,
    /// `3 * p10`.
    pub p30: usize,
    /// `7 * p10`.
    pub p70: usize,
    /// `9 * p10`.
    pub p90: usize,
}

impl Breakpoints {
    /// Cut points for `n` assets.
    #[must_use]
    pub const fn from_count(n: usize) -> Self {
        let p10 = n / 10;
        Self { n, p10, p30: 3 * p10, p70: 7 * p10, p90: 9 * p10 }
    }
}

/// Output of the 2x3 sort.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// The six bucket symbol sets.
    pub assignment: BucketAssignment,
    /// Lowest book-to-market tercile.
    pub growth: BTreeSet<Symbol>,
    /// Middle book-to-market band.
    pub neutral: BTreeSet<Symbol>,
    /// Highest book-to-market tercile.
    pub value: BTreeSet<Symbol>,
    /// Smallest market caps.
    pub small: BTreeSet<Symbol>,
    /// Largest market caps.
    pub big: BTreeSet<Symbol>,
    /// Assets excluded before ranking.
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    /// Symbols in a size leg.
    #[must_use]
    pub const fn size_leg(&self, leg: SizeLeg) -> &BTreeSet<Symbol> {
        match leg {
            SizeLeg::Small => &self.small,
            SizeLeg::Big => &self.big,
        }
    }

    /// Symbols in a book-to-market leg.
    #[must_use]
    pub const fn value_leg(&self, leg: ValueLeg) -> &BTreeSet<Symbol> {
        match leg {
            ValueLeg::Growth => &self.growth,
            ValueLeg::Neutral => &self.neutral,
            ValueLeg::Value => &self.value,
        }
    }
}

/// Sorts fundamentals into the six Fama-French buckets.
#[derive(Debug, Clone, Default)]
pub struct BucketClassifier {
    config: ClassifyConfig,
}

impl BucketClassifier {
    /// Create a classifier with default epsilons.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with the given configuration.
    ///
    /// # Errors
    /// Returns `PortfolioError::InvalidConfig` for negative or non-finite epsilons.
    pub fn with_config(config: ClassifyConfig) -> Result<Self, PortfolioError> {
        for (name, value) in [
            ("book_to_market_epsilon", config.book_to_market_epsilon),
            ("market_cap_epsilon", config.market_cap_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PortfolioError::InvalidConfig(format!("{name} must be >= 0")));
            }
        }
        Ok(Self { config })
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    /// Run the 2x3 sort.
    ///
    /// Ranks are taken with stable sorts, so assets with equal keys keep their input order.
    #[must_use]
    pub fn classify(&self, fundamentals: &[AssetFundamental]) -> Classification {
        let mut diagnostics = Vec::new();
        let mut eligible: Vec<(&Symbol, f64, f64)> = Vec::with_capacity(fundamentals.len());

        for f in fundamentals {
            match f.book_to_market() {
                Some(btm)
                    if btm.abs() > self.config.book_to_market_epsilon
                        && f.market_cap > self.config.market_cap_epsilon =>
                {
                    eligible.push((&f.symbol, btm, f.market_cap));
                }
                _ => {
                    warn!(symbol = %f.symbol, "unusable fundamentals, excluded from buckets");
                    diagnostics.push(Diagnostic::new(
                        f.symbol.clone(),
                        DiagnosticKind::MissingData,
                        "book-to-market or market cap unusable",
                    ));
                }
            }
        }

        let bp = Breakpoints::from_count(eligible.len());
        debug!(n = bp.n, p10 = bp.p10, "classification breakpoints");

        let mut by_btm = eligible.clone();
        by_btm.sort_by(|a, b| a.1.total_cmp(&b.1));
        let growth = collect(&by_btm[..bp.p30]);
        let neutral = collect(&by_btm[bp.p30..bp.p70]);
        let value = collect(&by_btm[bp.p70..]);

        let mut by_cap = eligible;
        by_cap.sort_by(|a, b| a.2.total_cmp(&b.2));
        let small = collect(&by_cap[..bp.p10]);
        let big = collect(&by_cap[bp.p90..]);

        let mut classification =
            Classification { growth, neutral, value, small, big, diagnostics, ..Default::default() };
        for bucket in Bucket::ALL {
            let members = classification
                .size_leg(bucket.size())
                .intersection(classification.value_leg(bucket.value()))
                .cloned()
                .collect();
            classification.assignment.set(bucket, members);
        }

        for bucket in classification.assignment.empty_buckets() {
            warn!(%bucket, "bucket is empty");
        }
        classification
    }
}

fn collect(rows: &[(&Symbol, f64, f64)]) -> BTreeSet<Symbol> {
    rows.iter().map(|(s, _, _)| (*s).clone()).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn fundamentals(n: usize) -> Vec<AssetFundamental> {
        // Book-to-market rises with i while market cap falls, so legs are predictable.
        (0..n)
            .map(|i| {
                let cap = 1_000.0 * (n - i) as f64;
                let btm = 0.01 * (i + 1) as f64;
                AssetFundamental::new(Symbol::new(format!("S{i:03}")), cap, btm * cap, 1.0)
            })
            .collect()
    }

    #[rstest]
    #[case(100, 10, 30, 70, 90)]
    #[case(15, 1, 3, 7, 9)]
    #[case(9, 0, 0, 0, 0)]
    fn breakpoints(
        #[case] n: usize,
        #[case] p10: usize,
        #[case] p30: usize,
        #[case] p70: usize,
        #[case] p90: usize,
    ) {
        assert_eq!(Breakpoints::from_count(n), Breakpoints { n, p10, p30, p70, p90 });
    }

    #[test]
    fn hundred_assets_partition_exactly() {
        let c = BucketClassifier::new().classify(&fundamentals(100));

        assert_eq!(c.growth.len(), 30);
        assert_eq!(c.neutral.len(), 40);
        assert_eq!(c.value.len(), 30);
        assert_eq!(c.small.len(), 10);
        assert_eq!(c.big.len(), 10);
        assert!(c.growth.is_disjoint(&c.value));
        assert!(c.small.is_disjoint(&c.big));
        // Low book-to-market coincides with big caps in this fixture.
        assert_eq!(c.assignment.get(Bucket::BigGrowth).len(), 10);
        assert_eq!(c.assignment.get(Bucket::SmallValue).len(), 10);
        assert!(c.assignment.get(Bucket::SmallGrowth).is_empty());
    }

    #[test]
    fn remainder_falls_into_upper_legs() {
        let c = BucketClassifier::new().classify(&fundamentals(15));

        assert_eq!(c.growth.len(), 3);
        assert_eq!(c.neutral.len(), 4);
        assert_eq!(c.value.len(), 8);
        assert_eq!(c.small.len(), 1);
        assert_eq!(c.big.len(), 6);
    }

    #[test]
    fn unusable_fundamentals_excluded() {
        let mut input = fundamentals(20);
        input.push(AssetFundamental::new(Symbol::new("ZCAP"), 0.0, 1.0, 1.0));
        input.push(AssetFundamental::new(Symbol::new("ZBOOK"), 1_000.0, 0.0, 1.0));
        input.push(AssetFundamental::new(Symbol::new("NAN"), f64::NAN, 1.0, 1.0));

        let c = BucketClassifier::new().classify(&input);

        let excluded: Vec<&str> = c.diagnostics.iter().map(|d| d.symbol.as_str()).collect();
        assert_eq!(excluded, vec!["ZCAP", "ZBOOK", "NAN"]);
        assert_eq!(c.growth.len() + c.neutral.len() + c.value.len(), 20);
    }

    #[test]
    fn ties_keep_input_order() {
        let input: Vec<_> = (0..10)
            .map(|i| AssetFundamental::new(Symbol::new(format!("T{i}")), 100.0, 50.0, 1.0))
            .collect();

        let c = BucketClassifier::new().classify(&input);

        assert_eq!(c.small.iter().map(Symbol::as_str).collect::<Vec<_>>(), vec!["T0"]);
        assert_eq!(c.big.iter().map(Symbol::as_str).collect::<Vec<_>>(), vec!["T9"]);
    }

    #[test]
    fn rejects_negative_epsilon() {
        let config = ClassifyConfig { book_to_market_epsilon: -1.0, market_cap_epsilon: 1e-4 };
        assert!(BucketClassifier::with_config(config).is_err());
    }
}
