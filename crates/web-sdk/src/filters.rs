//! Campaign list filter state and its URL query-string form.

use std::fmt;
use std::str::FromStr;

use campaign_core::{Campaign, CampaignError, CampaignResult, CampaignStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{build_query_string, parse_query_params, QueryValue};

const KEY_PLATFORM: &str = "platform";
const KEY_STATUS: &str = "status";
const KEY_BUDGET: &str = "budget";
const KEY_DAYS: &str = "days";
const KEY_SEARCH: &str = "q";

/// Budget buckets offered by the campaign list. Bounds are `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetRange {
    #[serde(rename = "0-1000")]
    UpTo1k,
    #[serde(rename = "1000-5000")]
    From1kTo5k,
    #[serde(rename = "5000-10000")]
    From5kTo10k,
    #[serde(rename = "10000-50000")]
    From10kTo50k,
    #[serde(rename = "50000+")]
    Over50k,
}

impl BudgetRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetRange::UpTo1k => "0-1000",
            BudgetRange::From1kTo5k => "1000-5000",
            BudgetRange::From5kTo10k => "5000-10000",
            BudgetRange::From10kTo50k => "10000-50000",
            BudgetRange::Over50k => "50000+",
        }
    }

    fn bounds(&self) -> (f64, f64) {
        match self {
            BudgetRange::UpTo1k => (0.0, 1_000.0),
            BudgetRange::From1kTo5k => (1_000.0, 5_000.0),
            BudgetRange::From5kTo10k => (5_000.0, 10_000.0),
            BudgetRange::From10kTo50k => (10_000.0, 50_000.0),
            BudgetRange::Over50k => (50_000.0, f64::INFINITY),
        }
    }

    pub fn contains(&self, budget: f64) -> bool {
        let (min, max) = self.bounds();
        budget >= min && budget < max
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetRange {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-1000" => Ok(BudgetRange::UpTo1k),
            "1000-5000" => Ok(BudgetRange::From1kTo5k),
            "5000-10000" => Ok(BudgetRange::From5kTo10k),
            "10000-50000" => Ok(BudgetRange::From10kTo50k),
            "50000+" => Ok(BudgetRange::Over50k),
            other => Err(CampaignError::Parse(format!("unknown budget range: {other}"))),
        }
    }
}

/// Filter state for the campaign list. Empty fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilters {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<CampaignStatus>,
    #[serde(default)]
    pub budget_range: Option<BudgetRange>,
    #[serde(default)]
    pub date_range_days: Option<u32>,
    #[serde(default)]
    pub search_term: String,
}

impl CampaignFilters {
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
            && self.statuses.is_empty()
            && self.budget_range.is_none()
            && self.date_range_days.is_none()
            && self.search_term.trim().is_empty()
    }

    pub fn matches(&self, campaign: &Campaign, now: DateTime<Utc>) -> bool {
        if !self.platforms.is_empty() && !self.platforms.iter().any(|p| *p == campaign.platform) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&campaign.status) {
            return false;
        }
        if let Some(range) = self.budget_range {
            if !range.contains(campaign.budget.unwrap_or(0.0)) {
                return false;
            }
        }
        if let Some(days) = self.date_range_days {
            let cutoff = now - Duration::days(i64::from(days));
            if campaign.created_at < cutoff {
                return false;
            }
        }
        let term = self.search_term.trim().to_lowercase();
        if !term.is_empty() {
            let haystacks = [
                campaign.name.as_str(),
                campaign.client_name.as_str(),
                campaign.platform.as_str(),
                campaign.status.as_str(),
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&term)) {
                return false;
            }
        }
        true
    }

    /// Campaigns passing every filter, in input order.
    pub fn apply(&self, campaigns: &[Campaign], now: DateTime<Utc>) -> Vec<Campaign> {
        let filtered: Vec<Campaign> = campaigns
            .iter()
            .filter(|c| self.matches(c, now))
            .cloned()
            .collect();
        debug!(total = campaigns.len(), kept = filtered.len(), "Applied campaign filters");
        filtered
    }

    /// List values are comma-joined; unset fields are omitted.
    pub fn to_query_string(&self) -> String {
        let join = |values: Vec<&str>| {
            if values.is_empty() {
                QueryValue::Null
            } else {
                QueryValue::Text(values.join(","))
            }
        };
        let search = self.search_term.trim();
        build_query_string([
            (KEY_PLATFORM, join(self.platforms.iter().map(String::as_str).collect())),
            (KEY_STATUS, join(self.statuses.iter().map(CampaignStatus::as_str).collect())),
            (KEY_BUDGET, self.budget_range.map(|r| r.as_str()).into()),
            (KEY_DAYS, self.date_range_days.into()),
            (KEY_SEARCH, (!search.is_empty()).then_some(search).into()),
        ])
    }

    /// Unknown keys are ignored; malformed values for known keys are errors.
    pub fn from_query_string(query: &str) -> CampaignResult<Self> {
        let params = parse_query_params(query);
        let split = |key: &str| -> Vec<String> {
            params
                .get(key)
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        let statuses = split(KEY_STATUS)
            .iter()
            .map(|s| s.parse::<CampaignStatus>())
            .collect::<CampaignResult<Vec<_>>>()?;

        let budget_range = match params.get(KEY_BUDGET).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<BudgetRange>()?),
            _ => None,
        };

        let date_range_days = match params.get(KEY_DAYS).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<u32>().map_err(|e| {
                CampaignError::Parse(format!("invalid day range {raw:?}: {e}"))
            })?),
            _ => None,
        };

        Ok(Self {
            platforms: split(KEY_PLATFORM),
            statuses,
            budget_range,
            date_range_days,
            search_term: params.get(KEY_SEARCH).cloned().unwrap_or_default(),
        })
    }
}
