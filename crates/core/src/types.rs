use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;

/// Campaign lifecycle status as shown in the campaign list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "ended" => Ok(CampaignStatus::Ended),
            other => Err(CampaignError::Parse(format!("unknown campaign status: {other}"))),
        }
    }
}

/// A campaign as listed by the management views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub client_name: String,
    pub status: CampaignStatus,
    /// Missing budgets are treated as zero by filters.
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spend: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Active".parse::<CampaignStatus>().unwrap(), CampaignStatus::Active);
        assert_eq!(" paused ".parse::<CampaignStatus>().unwrap(), CampaignStatus::Paused);
        assert!("archived".parse::<CampaignStatus>().is_err());
    }

    #[test]
    fn test_campaign_missing_budget_deserializes() {
        let json = r#"{
            "id": "5",
            "name": "No Budget Campaign",
            "platform": "meta",
            "client_name": "Client E",
            "status": "active",
            "created_at": "2024-01-20T00:00:00Z",
            "updated_at": "2024-01-20T00:00:00Z"
        }"#;
        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(campaign.budget, None);
        assert_eq!(campaign.spend, 0.0);
        assert_eq!(campaign.status.to_string(), "active");
    }
}
