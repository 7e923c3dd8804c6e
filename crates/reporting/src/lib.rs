//! Campaign performance reporting: KPI derivation, display formatting,
//! roll-up helpers, the campaign dashboard and the baseline forecaster.

pub mod collections;
pub mod dashboard;
pub mod forecast;
pub mod format;
pub mod kpi;

pub use dashboard::{CampaignDashboard, CampaignPerformance, Dimension};
pub use forecast::BaselineForecaster;
pub use format::{Currency, FormatKind, FormatOptions};
pub use kpi::{DerivedMetrics, MetricRecord};
