use std::time::Instant;

use crate::pipeline::RunReport;

/// Where the single pipeline run currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Loading,
    /// `index` is 1-based out of `pipeline::MODEL_COUNT`.
    Fitting { model: &'static str, index: usize },
    Evaluating,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub file_name: String,
    pub phase: RunPhase,
    pub report: Option<RunReport>,
    pub error: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(file_name: String) -> Self {
        Self {
            file_name,
            phase: RunPhase::Loading,
            report: None,
            error: None,
            start_time: Instant::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, RunPhase::Done | RunPhase::Failed)
    }

    pub fn elapsed(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
