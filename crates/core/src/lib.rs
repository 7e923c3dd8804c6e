pub mod config;
pub mod error;
pub mod optimization;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use optimization::{OptimizationRequest, OptimizationResponse, PredictionService};
pub use types::{Campaign, CampaignStatus};
