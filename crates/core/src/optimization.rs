//! Optimization request/response contract and the prediction service seam.
//!
//! Requests arrive as `{"action": ..., "data": ...}` envelopes. Each action
//! carries its own typed payload and is decoded at the boundary, so
//! handlers never see untyped JSON. Implementations of
//! [`PredictionService`] produce the actual recommendations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};

/// Action names accepted by [`OptimizationRequest::from_json`].
pub const SUPPORTED_ACTIONS: &[&str] = &["predict_performance", "auto_scale_budget", "optimize_bids"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum OptimizationRequest {
    PredictPerformance(PerformanceRequest),
    AutoScaleBudget(BudgetScalingRequest),
    OptimizeBids(BidOptimizationRequest),
}

impl OptimizationRequest {
    /// Decode a request envelope, rejecting unknown actions before the
    /// payload is inspected.
    pub fn from_json(raw: &str) -> CampaignResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or_else(|| CampaignError::Validation("missing `action` field".to_string()))?;

        if !SUPPORTED_ACTIONS.contains(&action) {
            return Err(CampaignError::UnsupportedAction(action.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn action(&self) -> &'static str {
        match self {
            OptimizationRequest::PredictPerformance(_) => "predict_performance",
            OptimizationRequest::AutoScaleBudget(_) => "auto_scale_budget",
            OptimizationRequest::OptimizeBids(_) => "optimize_bids",
        }
    }

    pub fn campaign_id(&self) -> &str {
        match self {
            OptimizationRequest::PredictPerformance(r) => &r.campaign_id,
            OptimizationRequest::AutoScaleBudget(r) => &r.campaign_id,
            OptimizationRequest::OptimizeBids(r) => &r.campaign_id,
        }
    }
}

// ─── Performance prediction ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl Timeframe {
    /// How many weekly baselines the timeframe spans.
    pub fn multiplier(&self) -> f64 {
        match self {
            Timeframe::Week => 1.0,
            Timeframe::Month => 4.0,
            Timeframe::Quarter => 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRequest {
    pub campaign_id: String,
    pub timeframe: Timeframe,
}

/// A point prediction with its confidence and range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted: f64,
    pub confidence: f64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceForecast {
    pub campaign_id: String,
    pub timeframe: Timeframe,
    pub impressions: Prediction,
    pub clicks: Prediction,
    pub conversions: Prediction,
    pub cost: Prediction,
    pub roas: Prediction,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

// ─── Budget scaling ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingStrategy {
    Aggressive,
    Conservative,
    #[default]
    Balanced,
}

impl ScalingStrategy {
    pub fn factor(&self) -> f64 {
        match self {
            ScalingStrategy::Aggressive => 1.5,
            ScalingStrategy::Conservative => 1.2,
            ScalingStrategy::Balanced => 1.35,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetConstraints {
    #[serde(default)]
    pub max_budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetScalingRequest {
    pub campaign_id: String,
    pub current_budget: f64,
    #[serde(default)]
    pub scaling_strategy: ScalingStrategy,
    #[serde(default)]
    pub constraints: BudgetConstraints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetScaling {
    pub campaign_id: String,
    pub current_budget: f64,
    pub recommended_budget: f64,
    pub scaling_factor: f64,
    pub rationale: String,
    pub additional_conversions: u64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

// ─── Bid optimization ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStrategy {
    MaximizeConversions,
    TargetCpa,
    TargetRoas,
    MaximizeClicks,
    Adaptive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidConstraints {
    #[serde(default)]
    pub min_bid: Option<f64>,
    #[serde(default)]
    pub max_bid: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidSegment {
    pub segment: String,
    pub current_bid: f64,
    /// Observed return on ad spend for this segment.
    pub roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidOptimizationRequest {
    pub campaign_id: String,
    pub strategy: BidStrategy,
    #[serde(default)]
    pub constraints: BidConstraints,
    pub segments: Vec<BidSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecommendation {
    pub segment: String,
    pub current_bid: f64,
    pub recommended_bid: f64,
    pub expected_lift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidOptimization {
    pub campaign_id: String,
    pub strategy: BidStrategy,
    pub recommendations: Vec<BidRecommendation>,
}

// ─── Responses ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizationOutcome {
    Forecast(PerformanceForecast),
    BudgetScaling(BudgetScaling),
    Bids(BidOptimization),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    pub success: bool,
    pub data: OptimizationOutcome,
    pub message: String,
}

/// Produces optimization recommendations. Implementations may be backed
/// by a trained model or by a deterministic baseline.
pub trait PredictionService: Send + Sync {
    fn predict_performance(&self, request: &PerformanceRequest) -> CampaignResult<PerformanceForecast>;

    fn scale_budget(&self, request: &BudgetScalingRequest) -> CampaignResult<BudgetScaling>;

    fn optimize_bids(&self, request: &BidOptimizationRequest) -> CampaignResult<BidOptimization>;

    /// Service name for logging.
    fn service_name(&self) -> &str;
}

/// Route a decoded request to the matching service operation.
pub fn dispatch(
    service: &dyn PredictionService,
    request: &OptimizationRequest,
) -> CampaignResult<OptimizationResponse> {
    tracing::debug!(
        service = service.service_name(),
        action = request.action(),
        campaign_id = request.campaign_id(),
        "Dispatching optimization request"
    );

    let (data, message) = match request {
        OptimizationRequest::PredictPerformance(r) => (
            OptimizationOutcome::Forecast(service.predict_performance(r)?),
            "Performance prediction completed".to_string(),
        ),
        OptimizationRequest::AutoScaleBudget(r) => (
            OptimizationOutcome::BudgetScaling(service.scale_budget(r)?),
            "Budget scaling recommendation generated".to_string(),
        ),
        OptimizationRequest::OptimizeBids(r) => {
            let bids = service.optimize_bids(r)?;
            let message = format!("Generated {} bid recommendations", bids.recommendations.len());
            (OptimizationOutcome::Bids(bids), message)
        }
    };

    Ok(OptimizationResponse {
        success: true,
        data,
        message,
    })
}
