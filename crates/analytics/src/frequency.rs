use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling interval of the bars behind an equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Hourly,
    Minute,
}

impl FromStr for Frequency {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" | "d" => Ok(Frequency::Daily),
            "hourly" | "1h" | "h" => Ok(Frequency::Hourly),
            "minute" | "1m" | "m" => Ok(Frequency::Minute),
            _ => Err(AnalyticsError::UnknownFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Hourly => "hourly",
            Frequency::Minute => "minute",
        };
        write!(f, "{s}")
    }
}

/// The trading calendar of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annualization {
    pub trading_days_per_year: u32,
    pub trading_hours_per_day: u32,
}

impl Annualization {
    pub fn new(trading_days_per_year: u32, trading_hours_per_day: u32) -> Self {
        Self {
            trading_days_per_year,
            trading_hours_per_day,
        }
    }

    /// Number of bars of the given frequency in one trading year.
    pub fn periods_per_year(&self, frequency: Frequency) -> f64 {
        let days = f64::from(self.trading_days_per_year);
        let hours = f64::from(self.trading_hours_per_day);
        match frequency {
            Frequency::Daily => days,
            Frequency::Hourly => days * hours,
            Frequency::Minute => days * hours * 60.0,
        }
    }
}

impl Default for Annualization {
    /// Futures-like hours: 23 hours a day, 252 days a year.
    fn default() -> Self {
        Self::new(252, 23)
    }
}
