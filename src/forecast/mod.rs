pub mod arima;
pub mod holt_winters;
pub mod seasonal_trend;

pub use arima::Arima;
pub use holt_winters::HoltWinters;
pub use seasonal_trend::{Decomposition, ForecastFrame, SeasonalTrend};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    #[error("need at least {required} training observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("training data contains NaN or infinite values")]
    InvalidData,
    #[error("model has not been fitted")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, ForecastError>;

/// A stateless-per-run point forecaster. Fit once on the train series,
/// then ask for `horizon` steps past the end of it.
pub trait Forecaster {
    fn name(&self) -> &'static str;
    fn fit(&mut self, train: &[f64]) -> Result<()>;
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;
}

fn check_finite(data: &[f64]) -> Result<()> {
    if data.iter().any(|x| !x.is_finite()) {
        return Err(ForecastError::InvalidData);
    }
    Ok(())
}
