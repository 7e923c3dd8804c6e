//! Campaign performance dashboard: roll-ups of per-campaign daily rows.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use campaign_core::CampaignError;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collections::{chunk, group_by, sort_by};
use crate::kpi::{calculate_percentage_change, DerivedMetrics, MetricRecord};

/// One campaign's counters for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub campaign_name: String,
    pub channel: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: MetricRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    Campaign,
    Date,
}

impl Dimension {
    fn key(&self, row: &CampaignPerformance) -> String {
        match self {
            Dimension::Channel => row.channel.clone(),
            Dimension::Campaign => row.campaign_name.clone(),
            Dimension::Date => row.date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Channel => "channel",
            Dimension::Campaign => "campaign",
            Dimension::Date => "date",
        };
        f.write_str(name)
    }
}

impl FromStr for Dimension {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "channel" => Ok(Dimension::Channel),
            "campaign" => Ok(Dimension::Campaign),
            "date" => Ok(Dimension::Date),
            other => Err(CampaignError::Parse(format!("unknown breakdown dimension: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub key: String,
    pub rows: usize,
    pub metrics: MetricRecord,
    pub derived: DerivedMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_campaigns: usize,
    pub totals: MetricRecord,
    pub derived: DerivedMetrics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub previous: f64,
    pub current: f64,
    pub change_pct: f64,
}

/// Explicit store of campaign performance rows. One row per campaign per
/// day; recording the same pair again replaces the earlier counters.
pub struct CampaignDashboard {
    rows: DashMap<(String, NaiveDate), CampaignPerformance>,
}

impl CampaignDashboard {
    pub fn new() -> Self {
        info!("Campaign dashboard initialized");
        Self {
            rows: DashMap::new(),
        }
    }

    pub fn record(&self, row: CampaignPerformance) {
        debug!(campaign_id = %row.campaign_id, date = %row.date, "Recording campaign performance");
        metrics::counter!("reporting.rows_recorded").increment(1);
        self.rows.insert((row.campaign_id.clone(), row.date), row);
    }

    pub fn record_all<I: IntoIterator<Item = CampaignPerformance>>(&self, rows: I) -> usize {
        let mut count = 0;
        for row in rows {
            self.record(row);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by date, then campaign id.
    pub fn snapshot(&self) -> Vec<CampaignPerformance> {
        let rows: Vec<_> = self.rows.iter().map(|r| r.value().clone()).collect();
        sort_by(&rows, |r| (r.date, r.campaign_id.clone()))
    }

    pub fn overview(&self) -> DashboardOverview {
        let rows = self.snapshot();
        let totals: MetricRecord = rows.iter().map(|r| &r.metrics).sum();
        let campaigns = group_by(&rows, |r| r.campaign_id.clone());

        DashboardOverview {
            total_campaigns: campaigns.len(),
            totals,
            derived: totals.derived(),
            generated_at: Utc::now(),
        }
    }

    /// Totals for rows dated within `[start, end]`.
    pub fn totals_between(&self, start: NaiveDate, end: NaiveDate) -> MetricRecord {
        self.rows
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| r.metrics)
            .sum()
    }

    /// Roll rows up by `dimension`, sorted by group key.
    pub fn breakdown(&self, dimension: Dimension) -> Vec<BreakdownRow> {
        let rows = self.snapshot();
        let groups = group_by(&rows, |r| dimension.key(r));

        let summary: Vec<BreakdownRow> = groups
            .into_iter()
            .map(|(key, members)| {
                let metrics: MetricRecord = members.iter().map(|r| &r.metrics).sum();
                BreakdownRow {
                    key,
                    rows: members.len(),
                    metrics,
                    derived: metrics.derived(),
                }
            })
            .collect();

        debug!(%dimension, groups = summary.len(), "Breakdown computed");
        sort_by(&summary, |r| r.key.clone())
    }

    pub fn list_campaign_rows(&self, campaign_id: &str) -> Vec<CampaignPerformance> {
        self.snapshot()
            .into_iter()
            .filter(|r| r.campaign_id == campaign_id)
            .collect()
    }
}

impl Default for CampaignDashboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-based page of `rows`. Pages past the end are empty.
pub fn page<T: Clone>(rows: &[T], size: NonZeroUsize, index: usize) -> Vec<T> {
    chunk(rows, size).into_iter().nth(index).unwrap_or_default()
}

/// Period-over-period change for the raw counters and the derived KPIs.
pub fn compare_periods(previous: &MetricRecord, current: &MetricRecord) -> Vec<MetricComparison> {
    let before = previous.derived();
    let after = current.derived();
    let pairs = [
        ("impressions", previous.impressions as f64, current.impressions as f64),
        ("clicks", previous.clicks as f64, current.clicks as f64),
        ("spend", previous.spend, current.spend),
        ("conversions", previous.conversions as f64, current.conversions as f64),
        ("revenue", previous.revenue, current.revenue),
        ("ctr", before.ctr, after.ctr),
        ("cpc", before.cpc, after.cpc),
        ("cpm", before.cpm, after.cpm),
        ("roas", before.roas, after.roas),
    ];

    pairs
        .into_iter()
        .map(|(metric, previous, current)| MetricComparison {
            metric: metric.to_string(),
            previous,
            current,
            change_pct: calculate_percentage_change(previous, current),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(campaign: &str, channel: &str, day: u32, impressions: u64, clicks: u64, spend: f64, revenue: f64) -> CampaignPerformance {
        CampaignPerformance {
            campaign_id: campaign.to_string(),
            campaign_name: format!("Campaign {campaign}"),
            channel: channel.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            metrics: MetricRecord {
                impressions,
                clicks,
                spend,
                conversions: clicks / 10,
                revenue,
            },
        }
    }

    fn seeded() -> CampaignDashboard {
        let dashboard = CampaignDashboard::new();
        dashboard.record_all([
            row("c1", "search", 1, 1000, 50, 100.0, 400.0),
            row("c1", "search", 2, 1000, 50, 100.0, 400.0),
            row("c2", "social", 1, 2000, 20, 50.0, 75.0),
            row("c3", "search", 3, 0, 0, 0.0, 0.0),
        ]);
        dashboard
    }

    #[test]
    fn test_overview_totals() {
        let overview = seeded().overview();
        assert_eq!(overview.total_campaigns, 3);
        assert_eq!(overview.totals.impressions, 4000);
        assert_eq!(overview.totals.clicks, 120);
        assert_eq!(overview.derived.ctr, 3.0);
        assert_eq!(overview.derived.roas, 875.0 / 250.0);
    }

    #[test]
    fn test_record_replaces_same_campaign_day() {
        let dashboard = seeded();
        dashboard.record(row("c1", "search", 1, 10, 1, 1.0, 1.0));
        assert_eq!(dashboard.len(), 4);
        let c1 = dashboard.list_campaign_rows("c1");
        assert_eq!(c1[0].metrics.impressions, 10);
        assert_eq!(c1[1].metrics.impressions, 1000);
    }

    #[test]
    fn test_breakdown_by_channel() {
        let rows = seeded().breakdown(Dimension::Channel);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "search");
        assert_eq!(rows[0].rows, 3);
        assert_eq!(rows[0].metrics.clicks, 100);
        assert_eq!(rows[0].derived.ctr, 5.0);
        assert_eq!(rows[1].key, "social");
        assert_eq!(rows[1].derived.cpc, 2.5);
    }

    #[test]
    fn test_breakdown_zero_row_has_no_nan() {
        let rows = seeded().breakdown(Dimension::Campaign);
        let empty = rows.iter().find(|r| r.key == "Campaign c3").unwrap();
        assert_eq!(empty.derived, DerivedMetrics::default());
    }

    #[test]
    fn test_breakdown_by_date_sorted() {
        let keys: Vec<_> = seeded()
            .breakdown(Dimension::Date)
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn test_totals_between() {
        let dashboard = seeded();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let first = dashboard.totals_between(day(1), day(1));
        assert_eq!(first.impressions, 3000);
        let second = dashboard.totals_between(day(2), day(3));
        assert_eq!(second.impressions, 1000);
    }

    #[test]
    fn test_page() {
        let items: Vec<u32> = (1..=7).collect();
        let size = NonZeroUsize::new(3).unwrap();
        assert_eq!(page(&items, size, 0), vec![1, 2, 3]);
        assert_eq!(page(&items, size, 2), vec![7]);
        assert!(page(&items, size, 3).is_empty());
    }

    #[test]
    fn test_compare_periods() {
        let previous = MetricRecord {
            impressions: 1000,
            clicks: 50,
            spend: 100.0,
            conversions: 5,
            revenue: 300.0,
        };
        let current = MetricRecord {
            impressions: 1500,
            clicks: 50,
            spend: 0.0,
            conversions: 5,
            revenue: 0.0,
        };
        let comparison = compare_periods(&previous, &current);
        let find = |name: &str| comparison.iter().find(|c| c.metric == name).unwrap().change_pct;
        assert_eq!(find("impressions"), 50.0);
        assert_eq!(find("clicks"), 0.0);
        assert_eq!(find("spend"), -100.0);
        assert_eq!(find("roas"), -100.0);
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("Channel".parse::<Dimension>().unwrap(), Dimension::Channel);
        assert!("region".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_performance_row_flattens_metrics() {
        let json = r#"{
            "campaign_id": "c9",
            "campaign_name": "Spring Sale",
            "channel": "email",
            "date": "2024-04-02",
            "impressions": 120,
            "clicks": 6
        }"#;
        let row: CampaignPerformance = serde_json::from_str(json).unwrap();
        assert_eq!(row.metrics.clicks, 6);
        assert_eq!(row.metrics.revenue, 0.0);
    }
}
