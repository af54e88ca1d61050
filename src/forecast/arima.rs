//! ARIMA(p, d, q) point forecaster.
//!
//! AR coefficients come from the Yule-Walker equations solved with
//! Levinson-Durbin recursion; MA coefficients from the autocorrelation
//! of the AR residuals. Differencing is applied before estimation and
//! reversed on the forecasts. No order search is performed here; the
//! order is part of the run configuration.

use super::{check_finite, ForecastError, Forecaster, Result};

#[derive(Debug, Clone)]
pub struct Arima {
    p: usize,
    d: usize,
    q: usize,
    ar: Vec<f64>,
    ma: Vec<f64>,
    mean: f64,
    history: Vec<f64>,
    stationary: Vec<f64>,
    residuals: Vec<f64>,
    fitted: bool,
}

impl Arima {
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 10 {
            return Err(ForecastError::InvalidParameter {
                name: "p",
                reason: "AR order must be <= 10",
            });
        }
        if d > 2 {
            return Err(ForecastError::InvalidParameter {
                name: "d",
                reason: "differencing order must be <= 2",
            });
        }
        if q > 10 {
            return Err(ForecastError::InvalidParameter {
                name: "q",
                reason: "MA order must be <= 10",
            });
        }

        Ok(Self {
            p,
            d,
            q,
            ar: vec![0.0; p],
            ma: vec![0.0; q],
            mean: 0.0,
            history: Vec::new(),
            stationary: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
        })
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Observations needed before `fit` will accept a series.
    pub fn min_train_len(&self) -> usize {
        self.p + self.d + self.q + 10
    }

    fn difference(data: &[f64], order: usize) -> Vec<f64> {
        let mut series = data.to_vec();
        for _ in 0..order {
            series = series.windows(2).map(|w| w[1] - w[0]).collect();
        }
        series
    }

    /// Cumulate forecasts back onto the original scale, once per
    /// differencing order, anchored at the last observed value.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut result = forecasts.to_vec();
        for _ in 0..self.d {
            let mut acc = *self.history.last().unwrap_or(&0.0);
            for value in result.iter_mut() {
                acc += *value;
                *value = acc;
            }
        }
        result
    }

    /// Yule-Walker via Levinson-Durbin on the (biased) autocovariances.
    fn solve_yule_walker(&self, data: &[f64]) -> Vec<f64> {
        if self.p == 0 {
            return Vec::new();
        }

        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

        let mut autocov = vec![0.0; self.p + 1];
        for (k, cov) in autocov.iter_mut().enumerate() {
            *cov = (k..n).map(|i| centered[i] * centered[i - k]).sum::<f64>() / n as f64;
        }

        let mut phi = vec![0.0; self.p];
        if autocov[0].abs() < 1e-10 {
            return phi;
        }
        phi[0] = autocov[1] / autocov[0];

        for k in 1..self.p {
            let mut num = autocov[k + 1];
            let mut den = autocov[0];
            for j in 0..k {
                num -= phi[j] * autocov[k - j];
                den -= phi[j] * autocov[j + 1];
            }
            if den.abs() < 1e-10 {
                continue;
            }
            let reflection = num / den;
            let prev = phi.clone();
            phi[k] = reflection;
            for j in 0..k {
                phi[j] = prev[j] - reflection * prev[k - 1 - j];
            }
        }

        phi
    }

    /// MA weights from the lagged autocorrelation of the AR residuals,
    /// clamped for stability.
    fn estimate_ma(&self, residuals: &[f64]) -> Vec<f64> {
        if self.q == 0 || residuals.is_empty() {
            return vec![0.0; self.q];
        }

        let n = residuals.len();
        let mean = residuals.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = residuals.iter().map(|x| x - mean).collect();
        let var = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;

        let mut theta = vec![0.0; self.q];
        if var.abs() < 1e-10 {
            return theta;
        }
        for (k, coeff) in theta.iter_mut().enumerate() {
            let lagged: f64 = ((k + 1)..n).map(|i| centered[i] * centered[i - k - 1]).sum();
            *coeff = ((lagged / n as f64) / var).clamp(-0.99, 0.99);
        }
        theta
    }
}

impl Forecaster for Arima {
    fn name(&self) -> &'static str {
        "ARIMA"
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

        self.history = train.to_vec();
        self.stationary = Self::difference(train, self.d);
        self.ar = self.solve_yule_walker(&self.stationary);

        let n = self.stationary.len();
        self.mean = self.stationary.iter().sum::<f64>() / n as f64;
        self.residuals = vec![0.0; n];
        for i in self.p..n {
            let mut predicted = self.mean;
            for j in 0..self.p {
                predicted += self.ar[j] * (self.stationary[i - j - 1] - self.mean);
            }
            self.residuals[i] = self.stationary[i] - predicted;
        }

        self.ma = self.estimate_ma(&self.residuals);
        self.fitted = true;
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        if horizon == 0 {
            return Ok(Vec::new());
        }

        let n = self.stationary.len();
        let mut extended = self.stationary.clone();
        let mut errors = self.residuals.clone();

        for _ in 0..horizon {
            let mut next = self.mean;
            for j in 0..self.p {
                next += self.ar[j] * (extended[extended.len() - j - 1] - self.mean);
            }
            for j in 0..self.q.min(errors.len()) {
                next += self.ma[j] * errors[errors.len() - j - 1];
            }
            extended.push(next);
            // Future shocks are taken at their expectation of zero
            errors.push(0.0);
        }

        Ok(self.undifference(&extended[n..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_bounds_enforced() {
        assert!(Arima::new(11, 0, 0).is_err());
        assert!(Arima::new(0, 3, 0).is_err());
        assert!(Arima::new(0, 0, 11).is_err());
        assert!(Arima::new(1, 0, 0).is_ok());
    }

    #[test]
    fn test_short_series_rejected() {
        let mut model = Arima::new(1, 0, 0).unwrap();
        match model.fit(&[1.0, 2.0, 3.0]) {
            Err(ForecastError::InsufficientData { required, actual }) => {
                assert_eq!(required, 11);
                assert_eq!(actual, 3);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_ar1_stays_near_recent_level() {
        // Level series around 100: an AR(1) forecast should stay close
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + if i % 2 == 0 { 2.0 } else { -2.0 })
            .collect();
        let mut model = Arima::new(1, 0, 0).unwrap();
        model.fit(&data).unwrap();
        let forecast = model.forecast(5).unwrap();
        for value in &forecast {
            assert!((value - 100.0).abs() < 5.0, "forecast {:?}", forecast);
        }
    }

    #[test]
    fn test_differenced_model_follows_trend() {
        // With d=1 a linear ramp becomes a constant step; forecasts
        // should keep climbing past the last observation
        let data: Vec<f64> = (0..60).map(|i| 10.0 + 2.0 * i as f64).collect();
        let mut model = Arima::new(1, 1, 0).unwrap();
        model.fit(&data).unwrap();
        let forecast = model.forecast(5).unwrap();
        let last = *data.last().unwrap();
        assert!(forecast[0] > last, "forecast {:?}", forecast);
        assert!(forecast[4] > forecast[0]);
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let data: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let mut model = Arima::new(1, 0, 0).unwrap();
        model.fit(&data).unwrap();
        assert!(model.forecast(0).unwrap().is_empty());
    }

    #[test]
    fn test_forecast_before_fit_fails() {
        let model = Arima::new(1, 0, 0).unwrap();
        assert!(matches!(model.forecast(3), Err(ForecastError::NotFitted)));
    }

    #[test]
    fn test_deterministic_refit() {
        let data: Vec<f64> = (0..80).map(|i| (i as f64 * 0.3).sin() * 10.0 + 50.0).collect();
        let run = |data: &[f64]| {
            let mut model = Arima::new(1, 0, 0).unwrap();
            model.fit(data).unwrap();
            model.forecast(10).unwrap()
        };
        assert_eq!(run(&data), run(&data));
    }
}
