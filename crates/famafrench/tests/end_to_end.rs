//! End-to-end runs of the three-factor pipeline on a synthetic market.
#![allow(missing_docs)]

use std::{collections::BTreeMap, fmt::Write as _, fs, path::Path};

use approx::assert_relative_eq;
use chrono::{Datelike, Weekday};
use famafrench::{
    io::{CsvDirectorySource, CsvSink, InMemorySource},
    model::{FactorReturnsBuilder, Pipeline, PipelineConfig},
    portfolios::BucketClassifier,
    primitives::{AssetFundamental, Date, DiagnosticKind, FactorObservation, PriceSeries, Symbol},
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};
use tempfile::TempDir;

const DAYS: usize = 504;
const STOCKS: usize = 100;
const PROXIES: [&str; 3] = ["NDX", "NYA", "XMI"];
const PROBE_ALPHAS: [f64; 5] = [0.0004, 0.0006, 0.0008, 0.0010, 0.0012];

/// Synthetic market data, kept as plain tables so it can feed either source.
struct Market {
    dates: Vec<Date>,
    fundamentals: Vec<AssetFundamental>,
    prices: Vec<(Symbol, PriceSeries)>,
    proxies: Vec<(String, PriceSeries)>,
    risk_free: PriceSeries,
}

impl Market {
    fn source(&self) -> InMemorySource {
        let mut source = InMemorySource::new()
            .with_fundamentals(self.fundamentals.iter().cloned())
            .with_risk_free(self.risk_free.clone());
        for (symbol, prices) in &self.prices {
            source.insert_prices(symbol.clone(), prices.clone());
        }
        for (name, prices) in &self.proxies {
            source = source.with_proxy(name.clone(), prices.clone());
        }
        source
    }

    fn universe(&self) -> Vec<Symbol> {
        self.prices.iter().map(|(s, _)| s.clone()).collect()
    }

    fn write_dir(&self, root: &Path) {
        fs::create_dir_all(root.join("prices")).unwrap();

        let mut text = String::from("symbol,market_cap,book_value_per_share,shares_outstanding\n");
        for f in &self.fundamentals {
            writeln!(
                text,
                "{},{},{},{}",
                f.symbol, f.market_cap, f.book_value_per_share, f.shares_outstanding
            )
            .unwrap();
        }
        fs::write(root.join("fundamentals.csv"), text).unwrap();
        fs::write(root.join("risk_free.csv"), dated_csv("rate", &self.risk_free)).unwrap();

        let named = self
            .prices
            .iter()
            .map(|(s, p)| (s.as_str(), p))
            .chain(self.proxies.iter().map(|(n, p)| (n.as_str(), p)));
        for (name, prices) in named {
            fs::write(root.join("prices").join(format!("{name}.csv")), dated_csv("close", prices))
                .unwrap();
        }
    }
}

fn dated_csv(column: &str, series: &PriceSeries) -> String {
    let mut text = format!("date,{column}\n");
    for (date, value) in series.iter() {
        writeln!(text, "{},{value}", date.format("%Y-%m-%d")).unwrap();
    }
    text
}

fn trading_days() -> Vec<Date> {
    Date::from_ymd_opt(2022, 1, 3)
        .unwrap()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(DAYS)
        .collect()
}

/// Compound `returns` from `start`; the first date carries the starting price.
fn compound(dates: &[Date], start: f64, returns: &[f64]) -> PriceSeries {
    let mut price = start;
    let mut points = vec![(dates[0], price)];
    for (date, r) in dates[1..].iter().zip(returns) {
        price *= 1.0 + r;
        points.push((*date, price));
    }
    PriceSeries::from_points(points).unwrap()
}

fn random_fundamentals(seed: u64) -> Vec<AssetFundamental> {
    let mut rng = StdRng::seed_from_u64(seed);
    let log_cap = Uniform::new(20.0_f64, 27.0);
    let btm = Uniform::new(0.05, 2.0);
    let shares = 1e8;
    (0..STOCKS)
        .map(|i| {
            let market_cap = log_cap.sample(&mut rng).exp();
            let book_per_share = btm.sample(&mut rng) * market_cap / shares;
            let symbol = Symbol::new(format!("S{i:03}"));
            AssetFundamental::new(symbol, market_cap, book_per_share, shares)
        })
        .collect()
}

/// First seed whose fundamentals leave none of the six buckets empty; an empty bucket is fatal.
fn bucketed_fundamentals() -> (u64, Vec<AssetFundamental>) {
    let classifier = BucketClassifier::new();
    (0..200)
        .map(|seed| (seed, random_fundamentals(seed)))
        .find(|(_, f)| classifier.classify(f).assignment.empty_buckets().is_empty())
        .expect("a seed that fills all six buckets")
}

/// Stocks driven by a common shock plus idiosyncratic noise, and proxies tracking the shock.
fn background_market() -> Market {
    let (seed, fundamentals) = bucketed_fundamentals();
    let mut rng = StdRng::seed_from_u64(seed + 10_000);
    let dates = trading_days();
    let steps = DAYS - 1;

    let shock = Normal::new(0.0003, 0.01).unwrap();
    let idiosyncratic = Normal::new(0.0, 0.005).unwrap();
    let proxy_noise = Normal::new(0.0, 0.002).unwrap();
    let true_alpha = Normal::new(0.0, 0.0004).unwrap();
    let beta = Uniform::new(0.5, 1.5);
    let start_price = Uniform::new(10.0, 200.0);

    let shocks: Vec<f64> = (0..steps).map(|_| shock.sample(&mut rng)).collect();

    let mut prices = Vec::with_capacity(STOCKS);
    for f in &fundamentals {
        let (a, b) = (true_alpha.sample(&mut rng), beta.sample(&mut rng));
        let returns: Vec<f64> =
            shocks.iter().map(|m| a + b * m + idiosyncratic.sample(&mut rng)).collect();
        let start = start_price.sample(&mut rng);
        prices.push((f.symbol.clone(), compound(&dates, start, &returns)));
    }

    let proxies = PROXIES
        .iter()
        .map(|name| {
            let returns: Vec<f64> =
                shocks.iter().map(|m| m + proxy_noise.sample(&mut rng)).collect();
            (name.to_string(), compound(&dates, 10_000.0, &returns))
        })
        .collect();

    let risk_free = dates.iter().map(|d| (*d, 4.5)).collect();
    Market { dates, fundamentals, prices, proxies, risk_free }
}

/// Add symbols whose returns are exact linear combinations of the market's own factors.
fn with_probes(mut market: Market, config: &PipelineConfig) -> Market {
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let prepared = pipeline.prepare(&market.source(), &market.universe()).unwrap();
    let factors = FactorReturnsBuilder::new()
        .build(&prepared.prices, &prepared.risk_free_daily)
        .unwrap();
    let by_date: BTreeMap<Date, FactorObservation> =
        factors.observations().unwrap().into_iter().map(|o| (o.date, o)).collect();

    for (i, alpha) in PROBE_ALPHAS.iter().enumerate() {
        let k = i as f64;
        let (b_mkt, b_smb, b_hml) = (0.8 + 0.1 * k, 0.3 - 0.15 * k, -0.2 + 0.1 * k);
        let returns: Vec<f64> = market.dates[1..]
            .iter()
            .map(|d| {
                by_date.get(d).map_or(0.0, |o| {
                    alpha + b_mkt * o.excess_return + b_smb * o.smb + b_hml * o.hml
                })
            })
            .collect();
        let probe = compound(&market.dates, 50.0, &returns);
        market.prices.push((Symbol::new(format!("PROBE{i}")), probe));
    }
    market
}

#[test]
fn highest_alpha_probe_tops_the_ranking() {
    let config = PipelineConfig::default();
    let market = with_probes(background_market(), &config);

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let output = pipeline.run(&market.source(), &market.universe()).unwrap();

    assert_eq!(output.factors.height(), config.risk_free_lookback);
    assert_eq!(output.regressions.len(), STOCKS + PROBE_ALPHAS.len());

    let best = Symbol::new("PROBE4");
    let fit = output.regressions.iter().find(|r| r.symbol == best).unwrap();
    assert_relative_eq!(fit.alpha, 0.0012, epsilon = 1e-9);
    assert_relative_eq!(fit.beta_market, 1.2, epsilon = 1e-7);
    assert_relative_eq!(fit.rsquared, 1.0, epsilon = 1e-9);

    let position = output.ranking.iter().position(|c| c.symbol == best).unwrap();
    assert!(position < 3, "probe ranked at {position}");
    assert!(output.ranking.len() <= config.ranking.top_k);
}

#[test]
fn allocation_splits_budget_evenly() {
    let config = PipelineConfig::default();
    let market = with_probes(background_market(), &config);

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let output = pipeline.run(&market.source(), &market.universe()).unwrap();

    let n = output.ranking.len() as f64;
    assert_eq!(output.allocations.len(), output.ranking.len());
    for a in &output.allocations {
        let expected = (config.investment_amount / n / a.unit_price).round_ties_even();
        assert_eq!(a.shares as f64, expected, "{}", a.symbol);
        assert_relative_eq!(a.subtotal, a.shares as f64 * a.unit_price);
    }
    let subtotals: f64 = output.allocations.iter().map(|a| a.subtotal).sum();
    assert_relative_eq!(output.total_cost(), subtotals);
}

#[test]
fn symbols_without_fundamentals_are_still_ranked() {
    let config = PipelineConfig::default();
    let market = with_probes(background_market(), &config);

    let output = Pipeline::new(config).unwrap().run(&market.source(), &market.universe()).unwrap();

    let probe = Symbol::new("PROBE0");
    assert!(
        output
            .diagnostics
            .iter()
            .any(|d| d.symbol == probe && d.kind == DiagnosticKind::MissingData)
    );
    assert!(output.regressions.iter().any(|r| r.symbol == probe));
}

#[test]
fn csv_directory_round_trip() {
    let config = PipelineConfig::default();
    let market = background_market();
    let data = TempDir::new().unwrap();
    market.write_dir(data.path());

    let source = CsvDirectorySource::new(data.path());
    let universe = source.universe().unwrap();
    let output = Pipeline::new(config).unwrap().run(&source, &universe).unwrap();

    let out = data.path().join("results");
    output.write_to(&mut CsvSink::create(&out).unwrap()).unwrap();

    for file in ["allocation.csv", "regressions.csv", "excluded.csv", "factors.csv"] {
        assert!(out.join(file).is_file(), "{file}");
    }
    let allocation = fs::read_to_string(out.join("allocation.csv")).unwrap();
    assert_eq!(allocation.lines().count(), output.allocations.len() + 1);
    assert_eq!(output.regressions.len(), STOCKS);
}
