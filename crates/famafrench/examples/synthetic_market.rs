//! Example: ranking a synthetic market
//!
//! This example demonstrates how to:
//! 1. Build an in-memory market data source
//! 2. Run the three-factor pipeline over it
//! 3. Inspect the bucket sort, the fits and the allocation

use famafrench::{
    io::InMemorySource,
    model::{Pipeline, PipelineConfig},
    primitives::{AssetFundamental, Bucket, Date, PriceSeries, Symbol},
};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};

const STOCKS: usize = 60;
const DAYS: usize = 300;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Fama-French Three-Factor Ranking on Synthetic Data ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    let dates: Vec<Date> =
        Date::from_ymd_opt(2023, 1, 2).ok_or("bad date")?.iter_days().take(DAYS).collect();
    let market = Normal::new(0.0004, 0.01)?;
    let noise = Normal::new(0.0, 0.006)?;
    let shocks: Vec<f64> = dates.iter().map(|_| market.sample(&mut rng)).collect();

    let walk = |start: f64, returns: &[f64]| -> PriceSeries {
        let mut price = start;
        dates
            .iter()
            .zip(returns)
            .map(|(d, r)| {
                price *= 1.0 + r;
                (*d, price)
            })
            .collect()
    };

    let mut source = InMemorySource::new();
    let log_cap = Uniform::new(21.0_f64, 27.0);
    let btm = Uniform::new(0.1, 1.5);
    let beta = Uniform::new(0.6, 1.4);
    let mut universe = Vec::with_capacity(STOCKS);
    for i in 0..STOCKS {
        let symbol = Symbol::new(format!("SYN{i:02}"));
        let cap = log_cap.sample(&mut rng).exp();
        let shares = 1e8;
        let book_per_share = btm.sample(&mut rng) * cap / shares;
        let fundamental = AssetFundamental::new(symbol.clone(), cap, book_per_share, shares);

        let b = beta.sample(&mut rng);
        let returns: Vec<f64> = shocks.iter().map(|m| b * m + noise.sample(&mut rng)).collect();

        source =
            source.with_fundamental(fundamental).with_prices(symbol.clone(), walk(50.0, &returns));
        universe.push(symbol);
    }
    for proxy in ["NDX", "NYA", "XMI"] {
        let returns: Vec<f64> = shocks.iter().map(|m| m + noise.sample(&mut rng) / 4.0).collect();
        source = source.with_proxy(proxy, walk(10_000.0, &returns));
    }
    source = source.with_risk_free(dates.iter().map(|d| (*d, 4.0)).collect());

    let config = PipelineConfig { investment_amount: 5_000.0, ..PipelineConfig::default() };
    let output = Pipeline::new(config)?.run(&source, &universe)?;

    println!("Bucket sizes:");
    for bucket in Bucket::ALL {
        let members = output.classification.assignment.get(bucket).len();
        println!("  {:<14} {members}", bucket.to_string());
    }

    println!("\nFactor table: {} days", output.factors.height());
    println!("Fitted {} symbols, {} ranked\n", output.regressions.len(), output.ranking.len());

    println!(
        "{:<8} {:>6} {:>9} {:>9} {:>7} {:>10}",
        "symbol", "shares", "price", "subtotal", "r2", "alpha"
    );
    for a in output.allocations.iter().take(10) {
        println!(
            "{:<8} {:>6} {:>9.2} {:>9.2} {:>7.3} {:>10.6}",
            a.symbol.as_str(),
            a.shares,
            a.unit_price,
            a.subtotal,
            a.rsquared,
            a.alpha
        );
    }
    println!("\nTotal cost: {:.2}", output.total_cost());

    println!("\nEqual-weight shortlist:");
    for a in &output.equal_weight.allocations {
        println!("  {:<8} {:>4} shares @ {:.2}", a.symbol.as_str(), a.shares, a.unit_price);
    }

    Ok(())
}
