//! Additive Holt-Winters (triple exponential smoothing).
//!
//! Level, trend, and a repeating seasonal offset, each updated with its
//! own smoothing weight. Weekly sales with yearly seasonality use a
//! 52-week period, which means at least two full years of history are
//! required before a fit is meaningful.

use super::{check_finite, ForecastError, Forecaster, Result};

#[derive(Debug, Clone)]
pub struct HoltWinters {
    alpha: f64,
    beta: f64,
    gamma: f64,
    period: usize,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    n_train: usize,
    fitted: bool,
}

impl HoltWinters {
    /// Smoothing weights must be in (0, 1); `period` is the seasonal
    /// cycle length in observations and must be at least 2.
    pub fn new(alpha: f64, beta: f64, gamma: f64, period: usize) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(0.0 < value && value < 1.0) {
                return Err(ForecastError::InvalidParameter {
                    name,
                    reason: "must be between 0 and 1 (exclusive)",
                });
            }
        }
        if period < 2 {
            return Err(ForecastError::InvalidParameter {
                name: "period",
                reason: "must be at least 2",
            });
        }

        Ok(Self {
            alpha,
            beta,
            gamma,
            period,
            level: 0.0,
            trend: 0.0,
            seasonal: vec![0.0; period],
            n_train: 0,
            fitted: false,
        })
    }

    /// Observations needed before `fit` will accept a series.
    pub fn min_train_len(&self) -> usize {
        self.period * 2
    }

    fn initialize(&mut self, data: &[f64]) {
        let first_cycle_avg = data[..self.period].iter().sum::<f64>() / self.period as f64;
        let second_cycle_avg =
            data[self.period..2 * self.period].iter().sum::<f64>() / self.period as f64;

        self.level = first_cycle_avg;
        self.trend = (second_cycle_avg - first_cycle_avg) / self.period as f64;
        for i in 0..self.period {
            self.seasonal[i] = data[i] - first_cycle_avg;
        }
    }
}

impl Forecaster for HoltWinters {
    fn name(&self) -> &'static str {
        "Holt-Winters"
    }

    fn fit(&mut self, train: &[f64]) -> Result<()> {
        let required = self.min_train_len();
        if train.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: train.len(),
            });
        }
        check_finite(train)?;

        self.initialize(train);

        for (i, &value) in train.iter().enumerate().skip(self.period) {
            let season_idx = i % self.period;
            let prev_level = self.level;
            let prev_seasonal = self.seasonal[season_idx];

            self.level = self.alpha * (value - prev_seasonal)
                + (1.0 - self.alpha) * (self.level + self.trend);
            self.trend = self.beta * (self.level - prev_level) + (1.0 - self.beta) * self.trend;
            self.seasonal[season_idx] =
                self.gamma * (value - self.level) + (1.0 - self.gamma) * prev_seasonal;
        }

        self.n_train = train.len();
        self.fitted = true;
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }

        Ok((1..=horizon)
            .map(|h| {
                // Continue the seasonal cycle from where training ended;
                // seasonal[j] belongs to time indices with i % period == j
                let season_idx = (self.n_train + h - 1) % self.period;
                self.level + h as f64 * self.trend + self.seasonal[season_idx]
            })
            .collect())
    }
}
