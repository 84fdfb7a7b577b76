use anyhow::Context;
use swap_cycles::datasource::{load_balances_path, load_trades_path};
use swap_cycles::report::build_document;
use swap_cycles::{config::Config, AppError, BalanceSource, CycleEngine};

fn run(config: &Config) -> Result<String, AppError> {
    let trades = load_trades_path(&config.trades_path)?;
    tracing::info!(count = trades.len(), path = %config.trades_path.display(), "loaded trades");

    let balances = config
        .balances_path
        .as_deref()
        .map(load_balances_path)
        .transpose()?;

    let engine = CycleEngine::new(config.engine_config());
    let report = engine.run(&trades);

    let document = build_document(
        &report,
        config.output,
        balances.as_ref().map(|b| b as &dyn BalanceSource),
        config.dust_threshold,
    );
    Ok(serde_json::to_string_pretty(&document)?)
}

fn main() {
    // Initialize tracing; stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match run(&config).context("building cycle report") {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
