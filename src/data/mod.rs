pub mod loader;
pub mod weekly;

pub use loader::{DataError, RawTable, UNITS_COLUMN, WEEK_COLUMN};
pub use weekly::{WeeklyPoint, WeeklySeries};
