//! Baseline forecaster: a deterministic [`PredictionService`] that
//! projects a campaign's weekly counters forward instead of consulting a
//! trained model.

use campaign_core::config::ForecastConfig;
use campaign_core::optimization::{
    BidOptimization, BidOptimizationRequest, BidRecommendation, BudgetScaling,
    BudgetScalingRequest, PerformanceForecast, PerformanceRequest, Prediction, PredictionService,
    RiskLevel, ScalingStrategy,
};
use campaign_core::{CampaignError, CampaignResult};
use chrono::Utc;
use tracing::info;

use crate::kpi::{calculate_percentage_change, calculate_roas, MetricRecord};

pub struct BaselineForecaster {
    /// Counters for one representative week.
    baseline: MetricRecord,
    confidence: f64,
    spread: f64,
}

impl BaselineForecaster {
    pub fn new(baseline: MetricRecord, config: &ForecastConfig) -> Self {
        Self {
            baseline,
            confidence: config.confidence,
            spread: config.range_spread,
        }
    }

    pub fn baseline(&self) -> &MetricRecord {
        &self.baseline
    }

    fn predict(&self, value: f64, round: bool) -> Prediction {
        let shape = |v: f64| if round { v.round() } else { v };
        Prediction {
            predicted: shape(value),
            confidence: self.confidence,
            low: shape(value * (1.0 - self.spread)),
            high: shape(value * (1.0 + self.spread)),
        }
    }

    fn recommendations(&self) -> Vec<String> {
        let derived = self.baseline.derived();
        let mut out = Vec::new();
        if derived.roas >= 3.0 {
            out.push("Increase budget allocation to high-performing segments".to_string());
        }
        if derived.ctr < 1.0 {
            out.push("Test new creative variations to lift click-through rate".to_string());
        }
        if derived.conversion_rate < 2.0 {
            out.push("Review landing pages for conversion blockers".to_string());
        }
        if out.is_empty() {
            out.push("Maintain the current strategy and expand to similar audiences".to_string());
        }
        out
    }
}

impl PredictionService for BaselineForecaster {
    fn predict_performance(&self, request: &PerformanceRequest) -> CampaignResult<PerformanceForecast> {
        let factor = request.timeframe.multiplier();
        let b = &self.baseline;
        let cost = b.spend * factor;
        let revenue = b.revenue * factor;

        let forecast = PerformanceForecast {
            campaign_id: request.campaign_id.clone(),
            timeframe: request.timeframe,
            impressions: self.predict(b.impressions as f64 * factor, true),
            clicks: self.predict(b.clicks as f64 * factor, true),
            conversions: self.predict(b.conversions as f64 * factor, true),
            cost: self.predict(cost, true),
            roas: self.predict(calculate_roas(revenue, cost), false),
            recommendations: self.recommendations(),
            generated_at: Utc::now(),
        };

        info!(
            campaign_id = %request.campaign_id,
            impressions = forecast.impressions.predicted,
            roas = forecast.roas.predicted,
            "Performance forecast produced"
        );
        Ok(forecast)
    }

    fn scale_budget(&self, request: &BudgetScalingRequest) -> CampaignResult<BudgetScaling> {
        if !request.current_budget.is_finite() || request.current_budget < 0.0 {
            return Err(CampaignError::Validation(format!(
                "current_budget must be a non-negative number, got {}",
                request.current_budget
            )));
        }

        let factor = request.scaling_strategy.factor();
        let cap = request.constraints.max_budget.unwrap_or(f64::INFINITY);
        let recommended = (request.current_budget * factor).min(cap);
        let roas = self.baseline.derived().roas;

        let mut risk = match request.scaling_strategy {
            ScalingStrategy::Aggressive => RiskLevel::High,
            ScalingStrategy::Balanced => RiskLevel::Medium,
            ScalingStrategy::Conservative => RiskLevel::Low,
        };
        if roas < 1.0 {
            risk = RiskLevel::High;
        }

        let verdict = if roas >= 1.0 { "strong" } else { "weak" };
        Ok(BudgetScaling {
            campaign_id: request.campaign_id.clone(),
            current_budget: request.current_budget,
            recommended_budget: recommended,
            scaling_factor: factor,
            rationale: format!("Current ROAS of {roas:.2} indicates {verdict} performance"),
            additional_conversions: (self.baseline.conversions as f64 * (factor - 1.0)).floor() as u64,
            risk_level: risk,
            confidence: self.confidence,
        })
    }

    fn optimize_bids(&self, request: &BidOptimizationRequest) -> CampaignResult<BidOptimization> {
        let min_bid = request.constraints.min_bid.unwrap_or(0.0);
        let max_bid = request.constraints.max_bid.unwrap_or(f64::INFINITY);
        if min_bid > max_bid {
            return Err(CampaignError::Validation(format!(
                "min_bid {min_bid} exceeds max_bid {max_bid}"
            )));
        }

        let campaign_roas = self.baseline.derived().roas;
        let mut recommendations = Vec::with_capacity(request.segments.len());
        for segment in &request.segments {
            if !segment.current_bid.is_finite() || segment.current_bid < 0.0 {
                return Err(CampaignError::Validation(format!(
                    "segment {} has an invalid bid {}",
                    segment.segment, segment.current_bid
                )));
            }
            let ratio = if campaign_roas > 0.0 && segment.roas.is_finite() {
                segment.roas / campaign_roas
            } else {
                1.0
            };
            let bid = (segment.current_bid * ratio).clamp(min_bid, max_bid);
            let recommended_bid = (bid * 100.0).round() / 100.0;
            recommendations.push(BidRecommendation {
                segment: segment.segment.clone(),
                current_bid: segment.current_bid,
                recommended_bid,
                expected_lift: calculate_percentage_change(segment.current_bid, recommended_bid) / 100.0,
            });
        }

        info!(
            campaign_id = %request.campaign_id,
            segments = recommendations.len(),
            "Bid recommendations produced"
        );
        Ok(BidOptimization {
            campaign_id: request.campaign_id.clone(),
            strategy: request.strategy,
            recommendations,
        })
    }

    fn service_name(&self) -> &str {
        "baseline-forecaster"
    }
}
