//! Fama-French three-factor ranking CLI.
//!
//! Ranks a universe by three-factor alpha and fit, then sizes a whole-share allocation.
//!
//! Usage: `famafrench --data-dir data --out results [--yahoo] [--config pipeline.json]`
//! Example: `famafrench --data-dir data --symbols AAPL,MSFT,XOM --investment-amount 25000`

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use clap::Parser;
use famafrench::{
    io::{CsvDirectorySource, CsvSink, InMemorySource},
    model::{Pipeline, PipelineConfig, PipelineOutput},
    primitives::{PriceSeries, Symbol},
    traits::MarketDataSource,
};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yahoo_finance_api as yahoo;

/// Yahoo ticker of the 13-week Treasury bill yield, quoted in percent.
const TBILL_TICKER: &str = "^IRX";

/// Rank stocks with the Fama-French three-factor model.
#[derive(Debug, Parser)]
#[command(name = "famafrench", version, about)]
struct Args {
    /// Directory holding fundamentals.csv, risk_free.csv and prices/.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory the result tables are written to.
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// JSON pipeline configuration. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated universe. Defaults to every symbol in fundamentals.csv.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Fetch prices, market proxies and the risk-free rate from Yahoo Finance.
    #[arg(long)]
    yahoo: bool,

    /// Years of history to fetch with --yahoo.
    #[arg(long, default_value_t = 1)]
    years: i64,

    /// Capital split across the selection.
    #[arg(long)]
    investment_amount: Option<f64>,

    /// Number of symbols kept by the objective ranking.
    #[arg(long)]
    top_k: Option<usize>,

    /// Maximum missing prices per symbol.
    #[arg(long)]
    nan_limit: Option<usize>,

    /// Drop candidates whose annualized volatility exceeds this.
    #[arg(long)]
    volatility_ceiling: Option<f64>,

    /// Regress returns net of the risk-free rate.
    #[arg(long)]
    excess_returns: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("famafrench=info")),
        )
        .init();

    let args = Args::parse();
    let pipeline = Pipeline::new(build_config(&args)?)?;

    let csv = CsvDirectorySource::new(&args.data_dir);
    let universe: Vec<Symbol> = if args.symbols.is_empty() {
        csv.universe()?
    } else {
        args.symbols.iter().map(Symbol::new).collect()
    };
    info!(symbols = universe.len(), data_dir = %args.data_dir.display(), "starting run");

    let output = if args.yahoo {
        let source = prefetch_yahoo(&csv, &universe, pipeline.config(), args.years).await?;
        pipeline.run(&source, &universe)?
    } else {
        pipeline.run(&csv, &universe)?
    };

    let mut sink = CsvSink::create(&args.out)?;
    output.write_to(&mut sink)?;
    print_summary(&output, &args.out);
    Ok(())
}

fn build_config(args: &Args) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(amount) = args.investment_amount {
        config.investment_amount = amount;
    }
    if let Some(top_k) = args.top_k {
        config.ranking.top_k = top_k;
    }
    if let Some(limit) = args.nan_limit {
        config.nan_limit = limit;
    }
    if args.volatility_ceiling.is_some() {
        config.volatility_ceiling = args.volatility_ceiling;
    }
    if args.excess_returns {
        config.regress_excess_returns = true;
    }
    Ok(config)
}

/// Load fundamentals from disk and everything dated from Yahoo Finance.
async fn prefetch_yahoo(
    csv: &CsvDirectorySource,
    universe: &[Symbol],
    config: &PipelineConfig,
    years: i64,
) -> Result<InMemorySource, Box<dyn Error>> {
    let provider = yahoo::YahooConnector::new()?;
    let end = OffsetDateTime::now_utc();
    let start = end - Duration::days(365 * years);
    info!(%start, %end, "fetching from yahoo finance");

    let mut source = InMemorySource::new().with_fundamentals(csv.fundamentals(universe)?);
    for symbol in universe {
        // Yahoo writes share classes with a dash (BRK-B).
        let ticker = symbol.as_str().replace('.', "-");
        match fetch_closes(&provider, &ticker, start, end).await {
            Ok(prices) => source.insert_prices(symbol.clone(), prices),
            Err(e) => warn!(%symbol, error = %e, "yahoo fetch failed"),
        }
    }
    for proxy in &config.market_proxies {
        let prices = fetch_closes(&provider, &format!("^{proxy}"), start, end).await?;
        source = source.with_proxy(proxy.clone(), prices);
    }
    let rates = fetch_closes(&provider, TBILL_TICKER, start, end).await?;
    Ok(source.with_risk_free(rates))
}

async fn fetch_closes(
    provider: &yahoo::YahooConnector,
    ticker: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<PriceSeries, Box<dyn Error>> {
    let response = provider.get_quote_history(ticker, start, end).await?;
    let series: PriceSeries = response
        .quotes()?
        .iter()
        .filter_map(|q| {
            let secs = i64::try_from(q.timestamp).ok()?;
            let date = chrono::DateTime::from_timestamp(secs, 0)?.date_naive();
            q.close.is_finite().then_some((date, q.close))
        })
        .collect();
    info!(ticker, observations = series.len(), "fetched quotes");
    Ok(series)
}

fn print_summary(output: &PipelineOutput, out: &Path) {
    println!(
        "\n{:<8} {:>7} {:>10} {:>11} {:>8} {:>10}",
        "symbol", "shares", "price", "subtotal", "r2", "alpha"
    );
    for a in &output.allocations {
        println!(
            "{:<8} {:>7} {:>10.2} {:>11.2} {:>8.4} {:>10.6}",
            a.symbol.as_str(),
            a.shares,
            a.unit_price,
            a.subtotal,
            a.rsquared,
            a.alpha
        );
    }
    println!("\ntotal cost: {:.2}", output.total_cost());
    println!(
        "{} symbols excluded or warned; tables written to {}",
        output.diagnostics.len(),
        out.display()
    );
}
