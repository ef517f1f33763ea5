use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnnualizationSettings, BacktestSettings, BuyAndHoldParams, Config, LedgerConfig,
    ReversalCommission, SmaCrossoverParams, Strategies,
};

/// Loads and validates the run configuration from a TOML file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, and checks it before returning.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates a configuration held in memory.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StrategyId;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        [ledger]
        initial_cash = 100000
        commission = 2.70
        leverage = 1.0

        [backtest]
        symbol = "NQ"
        strategy = "sma_crossover"
        warmup_bars = 30
        order_budget = 100000
        frequency = "hourly"

        [strategies.sma_crossover]
        short_period = 10
        long_period = 30
    "#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = parse_config(SAMPLE).expect("sample config is valid");

        assert_eq!(config.ledger.initial_cash, dec!(100000));
        assert_eq!(config.ledger.commission, dec!(2.70));
        assert_eq!(config.ledger.reversal_commission, ReversalCommission::PerLeg);
        assert_eq!(config.backtest.strategy, StrategyId::SmaCrossover);
        assert_eq!(config.backtest.risk_free_rate, 0.0);
        assert_eq!(config.annualization, AnnualizationSettings::default());
        assert_eq!(config.strategies.buy_and_hold.quantity, dec!(1));
    }

    #[test]
    fn reads_reversal_policy() {
        let toml = SAMPLE.replace(
            "leverage = 1.0",
            "leverage = 1.0\nreversal_commission = \"once\"",
        );
        let config = parse_config(&toml).expect("config is valid");
        assert_eq!(config.ledger.reversal_commission, ReversalCommission::Once);
    }

    #[test]
    fn rejects_inverted_sma_periods() {
        let toml = SAMPLE.replace("short_period = 10", "short_period = 40");
        let err = parse_config(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn sma_warm_up_must_cover_the_long_window() {
        let short = SAMPLE.replace("warmup_bars = 30", "warmup_bars = 29");
        assert!(matches!(
            parse_config(&short),
            Err(ConfigError::ValidationError(_))
        ));

        let buy_and_hold = short.replace("\"sma_crossover\"", "\"buy_and_hold\"");
        let config: Config = parse_config(&buy_and_hold).expect("buy and hold needs no warm-up");
        assert_eq!(config.backtest.warmup_bars, 29);
    }

    #[test]
    fn rejects_non_positive_cash() {
        let toml = SAMPLE.replace("initial_cash = 100000", "initial_cash = 0");
        assert!(matches!(
            parse_config(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_ledger_section_is_a_load_error() {
        let toml = SAMPLE.replace("[ledger]", "[ledgr]");
        assert!(matches!(parse_config(&toml), Err(ConfigError::LoadError(_))));
    }
}
