//! End-to-end pipeline run.

use std::collections::{BTreeSet, HashMap, HashSet};

use famafrench_math::{percent_to_fraction, yearly_to_daily};
use famafrench_portfolios::{BucketClassifier, Classification, with_bucket_prices};
use famafrench_primitives::{
    Allocation, Bucket, BucketAssignment, Diagnostic, DiagnosticKind, PriceSeries,
    RankedCandidate, RateSeries, RegressionResult, Symbol,
};
use famafrench_traits::{FactorRegressor, MarketDataSource, ResultSink};
use famafrench_utils::{align_series, column_values, full_join_on_date};
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::{
    EqualWeightPlan, FactorConfig, FactorReturnsBuilder, FactorTable, ModelError, OlsConfig,
    OlsFactorRegressor, PipelineConfig, RegressionEngine, allocate, alpha_leaders,
    equal_weight_shortlist, rank_and_select, reserved_columns,
};

/// Inputs gathered from a source, ready for factor construction.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Candidate prices, the six bucket columns and the market proxies, outer-joined on date.
    pub prices: DataFrame,
    /// Symbols that survived alignment, in universe order.
    pub candidates: Vec<Symbol>,
    /// Bucket sort of the fundamentals.
    pub classification: Classification,
    /// Daily risk-free rates over the lookback window.
    pub risk_free_daily: RateSeries,
    /// Last observed price per candidate.
    pub latest_prices: HashMap<Symbol, f64>,
    /// Warnings raised so far.
    pub diagnostics: Vec<Diagnostic>,
}

/// Every table a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Bucket sort of the fundamentals.
    pub classification: Classification,
    /// Factor table the regressions ran against.
    pub factors: FactorTable,
    /// Date, market, risk-free and factor columns for reporting.
    pub factor_frame: DataFrame,
    /// Per-symbol fits.
    pub regressions: Vec<RegressionResult>,
    /// Objective ranking, best first.
    pub ranking: Vec<RankedCandidate>,
    /// Share allocation across the ranking.
    pub allocations: Vec<Allocation>,
    /// Equal-weight shortlist variant.
    pub equal_weight: EqualWeightPlan,
    /// Highest-alpha fits re-sorted by R-squared.
    pub alpha_leaders: Vec<RegressionResult>,
    /// Last observed price per candidate.
    pub latest_prices: HashMap<Symbol, f64>,
    /// Excluded and warned symbols in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineOutput {
    /// Total cost of the allocation.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        famafrench_primitives::total_cost(&self.allocations)
    }

    /// Write every table to a sink.
    ///
    /// # Errors
    /// Returns the sink's error if any table fails to write.
    pub fn write_to<S: ResultSink + ?Sized>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.write_allocation(&self.allocations)?;
        sink.write_regressions(&self.regressions)?;
        sink.write_excluded(&self.diagnostics)?;
        sink.write_factors(&self.factor_frame)
    }
}

/// Three-factor ranking pipeline over a market data source.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the configuration fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch, classify and align everything the factor builder needs.
    ///
    /// # Errors
    /// Returns `ModelError::Configuration` if the risk-free series or a market proxy is
    /// unavailable, or if a bucket has no member with a usable price series. Also returns any
    /// source error that is not specific to one symbol.
    pub fn prepare<S: MarketDataSource + ?Sized>(
        &self,
        source: &S,
        universe: &[Symbol],
    ) -> Result<PreparedData, ModelError> {
        let reserved = reserved_columns(&self.config.market_proxies);
        let mut seen = HashSet::new();
        let universe: Vec<Symbol> = universe
            .iter()
            .filter(|s| {
                let clash = reserved.contains(s.as_str());
                if clash {
                    debug!(symbol = %s, "symbol collides with a pipeline column, skipping");
                }
                !clash
            })
            .filter(|s| seen.insert((*s).clone()))
            .cloned()
            .collect();
        info!(symbols = universe.len(), "preparing universe");

        let mut diagnostics = Vec::new();

        let fundamentals = source.fundamentals(&universe)?;
        let covered: HashSet<&Symbol> = fundamentals.iter().map(|f| &f.symbol).collect();
        for symbol in universe.iter().filter(|s| !covered.contains(s)) {
            warn!(%symbol, "no fundamentals, not bucketed");
            diagnostics.push(Diagnostic::new(
                symbol.clone(),
                DiagnosticKind::MissingData,
                "no fundamentals; not bucketed",
            ));
        }
        let classification =
            BucketClassifier::with_config(self.config.classify_config())?.classify(&fundamentals);
        diagnostics.extend(classification.diagnostics.iter().cloned());

        let mut series = Vec::with_capacity(universe.len());
        for symbol in &universe {
            match source.price_series(symbol) {
                Ok(Some(prices)) => series.push((symbol.clone(), prices)),
                Ok(None) => {
                    warn!(%symbol, "price series not found");
                    diagnostics.push(Diagnostic::new(
                        symbol.clone(),
                        DiagnosticKind::MissingData,
                        "price series not found",
                    ));
                }
                Err(e) if e.is_recoverable() => {
                    warn!(%symbol, error = %e, "price series unusable");
                    diagnostics.push(Diagnostic::new(
                        symbol.clone(),
                        DiagnosticKind::MissingData,
                        e.to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let aligned = align_series(series, self.config.nan_limit)?;
        diagnostics.extend(aligned.diagnostics);
        let latest_prices = latest_prices(&aligned.frame, &aligned.symbols)?;

        let unpriced = unpriced_buckets(&classification.assignment, &aligned.symbols);
        if !unpriced.is_empty() {
            let names: Vec<String> = unpriced.iter().map(ToString::to_string).collect();
            return Err(ModelError::Configuration(format!(
                "no priced members in bucket(s): {}",
                names.join(", ")
            )));
        }

        let with_buckets = with_bucket_prices(&aligned.frame, &classification.assignment)?;
        let proxies = self.fetch_proxies(source)?;
        let prices = full_join_on_date(&with_buckets, &proxies)?;

        let risk_free_daily = self.fetch_risk_free(source)?;

        Ok(PreparedData {
            prices,
            candidates: aligned.symbols,
            classification,
            risk_free_daily,
            latest_prices,
            diagnostics,
        })
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    /// Returns an error for pipeline-level failures: missing required series, an empty factor
    /// table, or a failing source. Per-symbol problems are reported in
    /// [`PipelineOutput::diagnostics`].
    pub fn run<S: MarketDataSource + ?Sized>(
        &self,
        source: &S,
        universe: &[Symbol],
    ) -> Result<PipelineOutput, ModelError> {
        let PreparedData {
            prices,
            candidates,
            classification,
            risk_free_daily,
            latest_prices,
            mut diagnostics,
        } = self.prepare(source, universe)?;

        let builder = FactorReturnsBuilder::with_config(FactorConfig {
            market_proxies: self.config.market_proxies.clone(),
            volatility_ceiling: self.config.volatility_ceiling,
        });
        let factors = builder.build(&prices, &risk_free_daily)?;
        diagnostics.extend(factors.diagnostics().iter().cloned());
        let factor_frame = factors.factor_columns()?;

        let candidates: Vec<Symbol> =
            candidates.into_iter().filter(|s| factors.has_column(s)).collect();
        let regressor = OlsFactorRegressor::with_config(OlsConfig {
            min_observations: self.config.min_observations,
        });
        let engine = RegressionEngine::new(regressor)
            .with_excess_returns(self.config.regress_excess_returns);
        let regression = engine.regress_all(&factors, &candidates)?;
        diagnostics.extend(regression.diagnostics);
        let regressions = regression.results;

        let exclude: BTreeSet<Symbol> = self.config.ranking.exclude.iter().cloned().collect();
        let ranking = rank_and_select(&regressions, &exclude, &self.config.ranking);
        diagnostics.extend(ranking.diagnostics);

        let allocation =
            allocate(&ranking.selected, &latest_prices, self.config.investment_amount);
        diagnostics.extend(allocation.diagnostics);

        let equal_weight = equal_weight_shortlist(
            &regressions,
            &exclude,
            &latest_prices,
            &self.config.equal_weight,
        );
        let alpha_leaders = alpha_leaders(&regressions, self.config.ranking.alpha_leaders);

        let output = PipelineOutput {
            classification,
            factors,
            factor_frame,
            regressions,
            ranking: ranking.selected,
            allocations: allocation.allocations,
            equal_weight,
            alpha_leaders,
            latest_prices,
            diagnostics,
        };
        info!(
            fitted = output.regressions.len(),
            selected = output.ranking.len(),
            total_cost = output.total_cost(),
            warnings = output.diagnostics.len(),
            "pipeline complete"
        );
        Ok(output)
    }

    fn fetch_proxies<S: MarketDataSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<DataFrame, ModelError> {
        let mut series: Vec<(Symbol, PriceSeries)> = Vec::new();
        for name in &self.config.market_proxies {
            let prices = source
                .market_proxy_series(name)
                .map_err(|e| ModelError::Configuration(format!("market proxy {name}: {e}")))?;
            if prices.is_empty() {
                return Err(ModelError::Configuration(format!("market proxy {name}: empty")));
            }
            series.push((Symbol::new(name), prices));
        }
        Ok(align_series(series, usize::MAX)?.frame)
    }

    fn fetch_risk_free<S: MarketDataSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<RateSeries, ModelError> {
        let annual = source
            .risk_free_rates()
            .map_err(|e| ModelError::Configuration(format!("risk-free rate series: {e}")))?;
        if annual.is_empty() {
            return Err(ModelError::Configuration("risk-free rate series: empty".to_string()));
        }
        let in_percent = self.config.risk_free_in_percent;
        Ok(annual.tail(self.config.risk_free_lookback).map_values(|r| {
            yearly_to_daily(if in_percent { percent_to_fraction(r) } else { r })
        }))
    }
}

/// Buckets none of whose members survived alignment.
fn unpriced_buckets(assignment: &BucketAssignment, priced: &[Symbol]) -> Vec<Bucket> {
    let priced: HashSet<&Symbol> = priced.iter().collect();
    Bucket::ALL
        .into_iter()
        .filter(|b| !assignment.get(*b).iter().any(|s| priced.contains(s)))
        .collect()
}

fn latest_prices(
    frame: &DataFrame,
    symbols: &[Symbol],
) -> Result<HashMap<Symbol, f64>, ModelError> {
    let mut latest = HashMap::with_capacity(symbols.len());
    for symbol in symbols {
        let values = column_values(frame, symbol.as_str())?;
        if let Some(price) = values.into_iter().rev().flatten().next() {
            latest.insert(symbol.clone(), price);
        }
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use famafrench_primitives::{AssetFundamental, Date};
    use famafrench_traits::SourceError;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    use super::*;

    const DAYS: usize = 120;

    #[derive(Default)]
    struct TestSource {
        fundamentals: Vec<AssetFundamental>,
        prices: HashMap<Symbol, PriceSeries>,
        proxies: HashMap<String, PriceSeries>,
        risk_free: RateSeries,
    }

    impl MarketDataSource for TestSource {
        fn fundamentals(&self, universe: &[Symbol]) -> Result<Vec<AssetFundamental>, SourceError> {
            Ok(self.fundamentals.iter().filter(|f| universe.contains(&f.symbol)).cloned().collect())
        }

        fn price_series(&self, symbol: &Symbol) -> Result<Option<PriceSeries>, SourceError> {
            Ok(self.prices.get(symbol).cloned())
        }

        fn risk_free_rates(&self) -> Result<RateSeries, SourceError> {
            Ok(self.risk_free.clone())
        }

        fn market_proxy_series(&self, name: &str) -> Result<PriceSeries, SourceError> {
            self.proxies.get(name).cloned().ok_or_else(|| SourceError::NotFound(name.to_string()))
        }
    }

    fn dates() -> Vec<Date> {
        Date::from_ymd_opt(2023, 1, 2).unwrap().iter_days().take(DAYS).collect()
    }

    fn random_walk(rng: &mut StdRng, start: f64, sigma: f64) -> PriceSeries {
        let noise = Normal::new(0.0005, sigma).unwrap();
        let mut price = start;
        dates()
            .into_iter()
            .map(|d| {
                price *= 1.0 + noise.sample(rng);
                (d, price)
            })
            .collect()
    }

    /// Thirty names whose caps and book-to-market ranks fill all six buckets.
    fn source() -> TestSource {
        let mut rng = StdRng::seed_from_u64(11);
        let mut src = TestSource::default();
        for i in 0..30_usize {
            let symbol = Symbol::new(format!("S{i:02}"));
            let cap = (i + 1) as f64 * 1e9;
            let btm = match i {
                0 => 0.01,
                27 => 0.02,
                1 => 0.50,
                28 => 0.51,
                2 => 0.98,
                29 => 0.99,
                _ => 0.03 + 0.035 * (i - 3) as f64,
            };
            src.fundamentals.push(AssetFundamental::new(symbol.clone(), cap, btm * cap / 1e6, 1e6));
            src.prices.insert(symbol, random_walk(&mut rng, 20.0 + i as f64, 0.01));
        }
        for proxy in ["NDX", "NYA", "XMI"] {
            src.proxies.insert(proxy.to_string(), random_walk(&mut rng, 10_000.0, 0.008));
        }
        src.risk_free = dates().into_iter().map(|d| (d, 5.0)).collect();
        src
    }

    fn universe(src: &TestSource) -> Vec<Symbol> {
        src.fundamentals.iter().map(|f| f.symbol.clone()).collect()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn prepare_fills_every_bucket() {
        let src = source();

        let prepared = pipeline().prepare(&src, &universe(&src)).unwrap();

        assert!(prepared.classification.assignment.empty_buckets().is_empty());
        assert_eq!(prepared.candidates.len(), 30);
        assert_eq!(prepared.latest_prices.len(), 30);
        assert_eq!(prepared.risk_free_daily.len(), DAYS);
        for column in ["sg", "sn", "sv", "bg", "bn", "bv", "NDX", "NYA", "XMI"] {
            assert!(prepared.prices.column(column).is_ok(), "{column}");
        }
    }

    #[test]
    fn run_produces_allocation() {
        let src = source();

        let output = pipeline().run(&src, &universe(&src)).unwrap();

        assert_eq!(output.regressions.len(), 30);
        assert_eq!(output.ranking.len(), 30);
        assert_eq!(output.allocations.len(), 30);
        assert!(output.alpha_leaders.len() <= 50);
        assert!(output.equal_weight.allocations.len() <= 10);
        assert_eq!(output.factors.height(), DAYS - 1);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn missing_prices_are_diagnosed_not_fatal() {
        let mut src = source();
        src.prices.remove(&Symbol::new("S10"));
        let mut symbols = universe(&src);
        symbols.push(Symbol::new("NOPE"));

        let output = pipeline().run(&src, &symbols).unwrap();

        assert_eq!(output.regressions.len(), 29);
        let flagged: Vec<&str> = output.diagnostics.iter().map(|d| d.symbol.as_str()).collect();
        assert!(flagged.contains(&"S10"));
        assert!(flagged.contains(&"NOPE"));
    }

    #[test]
    fn empty_bucket_is_fatal() {
        let mut src = source();
        // S00 moves from growth to neutral, leaving no small-growth name.
        src.fundamentals[0].book_value_per_share = 0.5 * 1e9 / 1e6;

        let err = pipeline().run(&src, &universe(&src)).unwrap_err();

        assert!(
            matches!(&err, ModelError::Configuration(msg) if msg.contains("small-growth")),
            "{err}"
        );
    }

    #[test]
    fn bucket_without_priced_members_is_fatal() {
        let mut src = source();
        for symbol in ["S00", "S01", "S02"] {
            src.prices.remove(&Symbol::new(symbol));
        }

        let err = pipeline().prepare(&src, &universe(&src)).unwrap_err();

        let ModelError::Configuration(msg) = err else { panic!("unexpected error: {err}") };
        for bucket in ["small-growth", "small-neutral", "small-value"] {
            assert!(msg.contains(bucket), "{msg}");
        }
        assert!(!msg.contains("big-"), "{msg}");
    }

    #[test]
    fn missing_risk_free_is_fatal() {
        let mut src = source();
        src.risk_free = RateSeries::new();

        let err = pipeline().run(&src, &universe(&src)).unwrap_err();

        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn missing_proxy_is_fatal() {
        let mut src = source();
        src.proxies.remove("XMI");

        let err = pipeline().run(&src, &universe(&src)).unwrap_err();

        assert!(matches!(err, ModelError::Configuration(msg) if msg.contains("XMI")));
    }

    #[test]
    fn reserved_names_skipped_from_universe() {
        let src = source();
        let mut symbols = universe(&src);
        symbols.push(Symbol::new("NDX"));

        let prepared = pipeline().prepare(&src, &symbols).unwrap();

        assert!(!prepared.candidates.contains(&Symbol::new("NDX")));
    }

    #[test]
    fn risk_free_uses_trailing_window_in_percent() {
        let src = source();
        let config = PipelineConfig { risk_free_lookback: 10, ..PipelineConfig::default() };

        let prepared = Pipeline::new(config).unwrap().prepare(&src, &universe(&src)).unwrap();

        assert_eq!(prepared.risk_free_daily.len(), 10);
        let (_, daily) = prepared.risk_free_daily.last().unwrap();
        assert!((daily - yearly_to_daily(0.05)).abs() < 1e-15);
    }

    #[derive(Default)]
    struct RecordingSink {
        tables: Vec<&'static str>,
    }

    impl ResultSink for RecordingSink {
        type Error = std::convert::Infallible;

        fn write_allocation(&mut self, _: &[Allocation]) -> Result<(), Self::Error> {
            self.tables.push("allocation");
            Ok(())
        }

        fn write_regressions(&mut self, _: &[RegressionResult]) -> Result<(), Self::Error> {
            self.tables.push("regressions");
            Ok(())
        }

        fn write_excluded(&mut self, _: &[Diagnostic]) -> Result<(), Self::Error> {
            self.tables.push("excluded");
            Ok(())
        }

        fn write_factors(&mut self, _: &DataFrame) -> Result<(), Self::Error> {
            self.tables.push("factors");
            Ok(())
        }
    }

    #[test]
    fn output_writes_every_table() {
        let src = source();
        let output = pipeline().run(&src, &universe(&src)).unwrap();
        let mut sink = RecordingSink::default();

        output.write_to(&mut sink).unwrap();

        assert_eq!(sink.tables, vec!["allocation", "regressions", "excluded", "factors"]);
    }
}
