pub mod aggregator;
pub mod dashboard;
pub mod heatmap;
pub mod hourly;
pub mod period;
pub mod products;
pub mod variance;

pub use dashboard::{DashboardService, PeriodQuery};
pub use period::{Bucket, Period, PeriodBounds, PeriodError};
