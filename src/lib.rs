pub mod config;
pub mod data;
pub mod eval;
pub mod forecast;
pub mod pipeline;
pub mod tui;
