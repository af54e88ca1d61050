//! The five-stage run: load -> validate -> prepare -> fit -> score.
//!
//! One upload triggers one full pass, top to bottom. The three model
//! fits run sequentially; the `progress` callback exists only so the
//! UI can show which stage is underway, and has no effect on ordering.

use std::path::Path;

use thiserror::Error;

use crate::config::Config;
use crate::data::loader::{DataError, RawTable};
use crate::data::weekly::{self, WeeklySeries};
use crate::eval::{best_score, rmse, ModelScore};
use crate::forecast::{
    Arima, Decomposition, ForecastError, ForecastFrame, Forecaster, HoltWinters, SeasonalTrend,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("{model} failed: {source}")]
    Model {
        model: &'static str,
        #[source]
        source: ForecastError,
    },
    #[error("weekly series of {weeks} weeks is too short for a {ratio:.0}% train split")]
    DegenerateSplit { weeks: usize, ratio: f64 },
}

/// Stage markers for the progress spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Loading,
    Fitting { model: &'static str, index: usize },
    Evaluating,
}

pub const MODEL_COUNT: usize = 3;

/// Forecast curve for one model: `values` covers the test window, and
/// `history` holds fitted values over the training span for models that
/// produce them (empty otherwise). The overlay chart draws both.
#[derive(Debug, Clone)]
pub struct ModelForecast {
    pub model: String,
    pub values: Vec<f64>,
    pub history: Vec<f64>,
}

/// Everything the reporting layer needs from one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub file_name: String,
    pub preview_headers: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
    pub dropped_rows: usize,
    pub series: WeeklySeries,
    pub train_len: usize,
    pub test_len: usize,
    pub forecasts: Vec<ModelForecast>,
    pub scores: Vec<ModelScore>,
    pub best_model: String,
    pub decomposition: Decomposition,
}

/// Run the whole pipeline against one CSV. Everything is recomputed
/// from scratch; nothing survives between runs.
pub fn run(
    path: &Path,
    config: &Config,
    mut progress: impl FnMut(Progress),
) -> Result<RunReport, PipelineError> {
    progress(Progress::Loading);

    let table = RawTable::load(path)?;
    // Validation comes first: a missing column must halt the run before
    // any model fitting happens.
    let (week_idx, units_idx) = table.validate_columns()?;

    let prepared = weekly::prepare(&table, week_idx, units_idx, &config.data.date_format)?;
    if prepared.dropped_rows > 0 {
        tracing::warn!(
            dropped = prepared.dropped_rows,
            kept = prepared.series.len(),
            "dropped rows with unparseable week/units values"
        );
    }

    let (train, test) = prepared.series.split(config.split.train_ratio);
    if train.is_empty() || test.is_empty() {
        return Err(PipelineError::DegenerateSplit {
            weeks: prepared.series.len(),
            ratio: config.split.train_ratio * 100.0,
        });
    }
    let train_values = train.values();
    let test_values = test.values();
    let horizon = test_values.len();

    tracing::info!(
        weeks = prepared.series.len(),
        train = train_values.len(),
        test = horizon,
        "series prepared"
    );

    // --- Model 1: Holt-Winters ---
    progress(Progress::Fitting {
        model: "Holt-Winters",
        index: 1,
    });
    let hw = &config.holt_winters;
    let mut holt_winters = HoltWinters::new(hw.alpha, hw.beta, hw.gamma, hw.seasonal_periods)
        .map_err(|source| PipelineError::Model {
            model: "Holt-Winters",
            source,
        })?;
    let hw_forecast = fit_and_forecast(&mut holt_winters, &train_values, horizon)?;

    // --- Model 2: ARIMA ---
    progress(Progress::Fitting {
        model: "ARIMA",
        index: 2,
    });
    let mut arima = Arima::new(config.arima.p, config.arima.d, config.arima.q).map_err(
        |source| PipelineError::Model {
            model: "ARIMA",
            source,
        },
    )?;
    let arima_forecast = fit_and_forecast(&mut arima, &train_values, horizon)?;

    // --- Model 3: Seasonal-Trend (Prophet-class additive regression) ---
    progress(Progress::Fitting {
        model: "Seasonal-Trend",
        index: 3,
    });
    let st = &config.seasonal_trend;
    let mut seasonal_trend =
        SeasonalTrend::new(st.period, st.fourier_order).map_err(|source| PipelineError::Model {
            model: "Seasonal-Trend",
            source,
        })?;
    seasonal_trend
        .fit(&train_values)
        .map_err(|source| PipelineError::Model {
            model: "Seasonal-Trend",
            source,
        })?;
    // The frame spans history + horizon; only the tail is scored.
    let st_frame = seasonal_trend
        .frame(horizon)
        .map_err(|source| PipelineError::Model {
            model: "Seasonal-Trend",
            source,
        })?;
    let decomposition = seasonal_trend
        .decomposition()
        .map_err(|source| PipelineError::Model {
            model: "Seasonal-Trend",
            source,
        })?;
    let ForecastFrame {
        history: st_history,
        future: st_forecast,
    } = st_frame;

    progress(Progress::Evaluating);

    let forecasts = vec![
        ModelForecast {
            model: "Holt-Winters".to_string(),
            values: hw_forecast,
            history: Vec::new(),
        },
        ModelForecast {
            model: "ARIMA".to_string(),
            values: arima_forecast,
            history: Vec::new(),
        },
        ModelForecast {
            model: "Seasonal-Trend".to_string(),
            values: st_forecast,
            history: st_history,
        },
    ];

    let scores: Vec<ModelScore> = forecasts
        .iter()
        .map(|f| ModelScore {
            model: f.model.clone(),
            rmse: rmse(&test_values, &f.values),
        })
        .collect();

    // Scores are never empty here; forecasts always has MODEL_COUNT rows
    let best_model = best_score(&scores)
        .map(|s| s.model.clone())
        .unwrap_or_default();

    for score in &scores {
        tracing::info!(model = %score.model, rmse = score.rmse, "scored");
    }
    tracing::info!(best = %best_model, "run complete");

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(RunReport {
        file_name,
        preview_headers: table.headers.clone(),
        preview_rows: table.preview(config.data.preview_rows).to_vec(),
        dropped_rows: prepared.dropped_rows,
        series: prepared.series,
        train_len: train_values.len(),
        test_len: horizon,
        forecasts,
        scores,
        best_model,
        decomposition,
    })
}

fn fit_and_forecast(
    model: &mut impl Forecaster,
    train: &[f64],
    horizon: usize,
) -> Result<Vec<f64>, PipelineError> {
    let name = model.name();
    model.fit(train).map_err(|source| PipelineError::Model {
        model: name,
        source,
    })?;
    model
        .forecast(horizon)
        .map_err(|source| PipelineError::Model {
            model: name,
            source,
        })
}
