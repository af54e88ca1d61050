//! Additive trend + yearly-seasonality regression (Prophet-class model).
//!
//! Decomposes the series into an OLS linear trend and a Fourier-basis
//! seasonal component fit on the detrended residuals. The same curve
//! extends over history and future, so the caller gets a full forecast
//! frame and can split out trend/seasonality for display.

use super::{check_finite, ForecastError, Forecaster, Result};

/// Alternating trend/seasonal refits; three passes are enough for the
/// slope estimate to converge on clean seasonal data.
const BACKFIT_PASSES: usize = 3;

#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    period: f64,
    fourier_order: usize,
    intercept: f64,
    slope: f64,
    cos_coef: Vec<f64>,
    sin_coef: Vec<f64>,
    n_train: usize,
    train: Vec<f64>,
    fitted: bool,
}

/// Fitted values over the training span plus point forecasts for the
/// horizon past it. Evaluation uses only the future tail; the history
/// half is for the overlay and decomposition views.
#[derive(Debug, Clone)]
pub struct ForecastFrame {
    pub history: Vec<f64>,
    pub future: Vec<f64>,
}

/// Trend/seasonal/residual split of the training span.
#[derive(Debug, Clone, Default)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl SeasonalTrend {
    /// `period` is the seasonal cycle length in observations (52 for
    /// yearly seasonality on weekly data); `fourier_order` the number
    /// of harmonics used for the seasonal shape.
    pub fn new(period: usize, fourier_order: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter {
                name: "period",
                reason: "must be at least 2",
            });
        }
        if fourier_order == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "fourier_order",
                reason: "must be at least 1",
            });
        }

        Ok(Self {
            period: period as f64,
            fourier_order,
            intercept: 0.0,
            slope: 0.0,
            cos_coef: vec![0.0; fourier_order],
            sin_coef: vec![0.0; fourier_order],
            n_train: 0,
            train: Vec::new(),
            fitted: false,
        })
    }

    /// One full seasonal cycle of history is required to estimate the
    /// seasonal shape.
    pub fn min_train_len(&self) -> usize {
        self.period as usize
    }

    fn trend_at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }

    fn seasonal_at(&self, t: f64) -> f64 {
        let mut value = 0.0;
        for j in 0..self.fourier_order {
            let angle = 2.0 * std::f64::consts::PI * (j + 1) as f64 * t / self.period;
            value += self.cos_coef[j] * angle.cos() + self.sin_coef[j] * angle.sin();
        }
        value
    }

    fn predict_at(&self, t: f64) -> f64 {
        self.trend_at(t) + self.seasonal_at(t)
    }

    /// Fitted history plus `horizon` forecast steps, one frame.
    pub fn frame(&self, horizon: usize) -> Result<ForecastFrame> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        let history = (0..self.n_train).map(|t| self.predict_at(t as f64)).collect();
        let future = (self.n_train..self.n_train + horizon)
            .map(|t| self.predict_at(t as f64))
            .collect();
        Ok(ForecastFrame { history, future })
    }

    /// Component split over the training span.
    pub fn decomposition(&self) -> Result<Decomposition> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        let trend: Vec<f64> = (0..self.n_train).map(|t| self.trend_at(t as f64)).collect();
        let seasonal: Vec<f64> = (0..self.n_train)
            .map(|t| self.seasonal_at(t as f64))
            .collect();
        let residual = self
            .train
            .iter()
            .zip(trend.iter().zip(seasonal.iter()))
            .map(|(y, (t, s))| y - t - s)
            .collect();
        Ok(Decomposition {
            trend,
            seasonal,
            residual,
        })
    }
}

impl Forecaster for SeasonalTrend {
    fn name(&self) -> &'static str {
        "Seasonal-Trend"
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

        let n = train.len();
        let nf = n as f64;
        let t_mean = (nf - 1.0) / 2.0;
        let var: f64 = (0..n).map(|i| (i as f64 - t_mean).powi(2)).sum();

        // Backfit trend and seasonality: OLS line on the seasonally
        // adjusted series, then Fourier projection of the detrended
        // residuals, repeated so neither component absorbs the other.
        // The basis is close to orthogonal on evenly spaced points, so
        // projection stands in for a full joint regression.
        let mut seasonal = vec![0.0; n];
        for _ in 0..BACKFIT_PASSES {
            let y_mean = train
                .iter()
                .zip(seasonal.iter())
                .map(|(y, s)| y - s)
                .sum::<f64>()
                / nf;
            let cov: f64 = train
                .iter()
                .zip(seasonal.iter())
                .enumerate()
                .map(|(i, (y, s))| (i as f64 - t_mean) * (y - s - y_mean))
                .sum();
            self.slope = if var > 0.0 { cov / var } else { 0.0 };
            self.intercept = y_mean - self.slope * t_mean;

            let detrended: Vec<f64> = train
                .iter()
                .enumerate()
                .map(|(i, &y)| y - self.trend_at(i as f64))
                .collect();
            for j in 0..self.fourier_order {
                let omega = 2.0 * std::f64::consts::PI * (j + 1) as f64 / self.period;
                let mut cos_sum = 0.0;
                let mut sin_sum = 0.0;
                for (i, &r) in detrended.iter().enumerate() {
                    let angle = omega * i as f64;
                    cos_sum += r * angle.cos();
                    sin_sum += r * angle.sin();
                }
                self.cos_coef[j] = 2.0 * cos_sum / nf;
                self.sin_coef[j] = 2.0 * sin_sum / nf;
            }
            for (i, s) in seasonal.iter_mut().enumerate() {
                *s = self.seasonal_at(i as f64);
            }
        }

        self.n_train = n;
        self.train = train.to_vec();
        self.fitted = true;
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(self.frame(horizon)?.future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_series(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                200.0 + 1.5 * t + 30.0 * (2.0 * std::f64::consts::PI * t / period).sin()
            })
            .collect()
    }

    #[test]
    fn test_rejects_degenerate_parameters() {
        assert!(SeasonalTrend::new(1, 3).is_err());
        assert!(SeasonalTrend::new(52, 0).is_err());
        assert!(SeasonalTrend::new(52, 3).is_ok());
    }

    #[test]
    fn test_needs_one_full_cycle() {
        let mut model = SeasonalTrend::new(52, 3).unwrap();
        match model.fit(&vec![1.0; 30]) {
            Err(ForecastError::InsufficientData { required, .. }) => assert_eq!(required, 52),
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_recovers_trend_and_seasonality() {
        let data = seasonal_series(104, 52.0);
        let mut model = SeasonalTrend::new(52, 3).unwrap();
        model.fit(&data).unwrap();

        // Slope of the underlying trend is 1.5
        assert!((model.slope - 1.5).abs() < 0.1, "slope {}", model.slope);

        // One-cycle-ahead forecast should land near the true curve
        let forecast = model.forecast(52).unwrap();
        let truth = seasonal_series(156, 52.0);
        for (h, value) in forecast.iter().enumerate() {
            let expected = truth[104 + h];
            assert!(
                (value - expected).abs() < 5.0,
                "h={} got {} want {}",
                h,
                value,
                expected
            );
        }
    }

    #[test]
    fn test_frame_covers_history_and_future() {
        let data = seasonal_series(104, 52.0);
        let mut model = SeasonalTrend::new(52, 3).unwrap();
        model.fit(&data).unwrap();
        let frame = model.frame(26).unwrap();
        assert_eq!(frame.history.len(), 104);
        assert_eq!(frame.future.len(), 26);
        // The future tail equals forecast() output
        assert_eq!(frame.future, model.forecast(26).unwrap());
    }

    #[test]
    fn test_decomposition_sums_back_to_data() {
        let data = seasonal_series(104, 52.0);
        let mut model = SeasonalTrend::new(52, 3).unwrap();
        model.fit(&data).unwrap();
        let parts = model.decomposition().unwrap();
        assert_eq!(parts.trend.len(), 104);
        for i in 0..104 {
            let rebuilt = parts.trend[i] + parts.seasonal[i] + parts.residual[i];
            assert!((rebuilt - data[i]).abs() < 1e-9);
        }
        // Most of the signal is explained: residuals are small next to
        // the seasonal swing
        let max_resid = parts.residual.iter().fold(0.0f64, |m, r| m.max(r.abs()));
        assert!(max_resid < 5.0, "max residual {}", max_resid);
    }

    #[test]
    fn test_flat_series_forecasts_flat() {
        let data = vec![42.0; 60];
        let mut model = SeasonalTrend::new(52, 3).unwrap();
        model.fit(&data).unwrap();
        for value in model.forecast(10).unwrap() {
            assert!((value - 42.0).abs() < 1e-6);
        }
    }
}
