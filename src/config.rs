use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "demandcast.toml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub split: SplitConfig,
    pub holt_winters: HoltWintersConfig,
    pub arima: ArimaConfig,
    pub seasonal_trend: SeasonalTrendConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// strftime pattern for the `week` column (source files use day/month/2-digit-year).
    pub date_format: String,
    /// Raw rows shown in the preview pane.
    pub preview_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_format: "%d/%m/%y".to_string(),
            preview_rows: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of the weekly series used for training (positional split).
    pub train_ratio: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { train_ratio: 0.8 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HoltWintersConfig {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Observations per seasonal cycle. 52 = yearly seasonality on weekly data.
    pub seasonal_periods: usize,
}

impl Default for HoltWintersConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.2,
            seasonal_periods: 52,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArimaConfig {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self { p: 1, d: 0, q: 0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeasonalTrendConfig {
    /// Length of the yearly cycle in weeks.
    pub period: usize,
    /// Number of Fourier harmonics for the seasonal component.
    pub fourier_order: usize,
}

impl Default for SeasonalTrendConfig {
    fn default() -> Self {
        Self {
            period: 52,
            fourier_order: 3,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config path, or the default file if it exists,
    /// or fall back to built-in defaults. The tool must run on a bare
    /// checkout with nothing but a CSV.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.split.train_ratio > 0.0 && self.split.train_ratio < 1.0) {
            anyhow::bail!(
                "split.train_ratio must be between 0 and 1 (exclusive), got {}",
                self.split.train_ratio
            );
        }
        for (name, value) in [
            ("holt_winters.alpha", self.holt_winters.alpha),
            ("holt_winters.beta", self.holt_winters.beta),
            ("holt_winters.gamma", self.holt_winters.gamma),
        ] {
            if !(value > 0.0 && value < 1.0) {
                anyhow::bail!("{} must be between 0 and 1 (exclusive), got {}", name, value);
            }
        }
        if self.holt_winters.seasonal_periods < 2 {
            anyhow::bail!(
                "holt_winters.seasonal_periods must be at least 2, got {}",
                self.holt_winters.seasonal_periods
            );
        }
        if self.arima.p > 10 || self.arima.q > 10 {
            anyhow::bail!("arima.p and arima.q must be <= 10");
        }
        if self.arima.d > 2 {
            anyhow::bail!("arima.d must be <= 2, got {}", self.arima.d);
        }
        if self.seasonal_trend.period < 2 {
            anyhow::bail!(
                "seasonal_trend.period must be at least 2, got {}",
                self.seasonal_trend.period
            );
        }
        if self.seasonal_trend.fourier_order == 0 {
            anyhow::bail!("seasonal_trend.fourier_order must be at least 1");
        }
        Ok(())
    }
}
