//! Derived marketing KPIs.
//!
//! Every calculator guards its denominator and returns `0.0` instead of
//! `NaN` or an infinity, so a missing counter never poisons a chart or a
//! roll-up further down the line.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Raw campaign counters. Absent fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub revenue: f64,
}

/// KPIs computed on demand from a [`MetricRecord`]. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Click-through rate, percent.
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub roas: f64,
    /// Conversions per click, percent.
    pub conversion_rate: f64,
    /// Cost per acquisition.
    pub cpa: f64,
}

impl DerivedMetrics {
    pub fn from_record(record: &MetricRecord) -> Self {
        let impressions = record.impressions as f64;
        let clicks = record.clicks as f64;
        let conversions = record.conversions as f64;
        Self {
            ctr: calculate_ctr(clicks, impressions),
            cpc: calculate_cpc(record.spend, clicks),
            cpm: calculate_cpm(record.spend, impressions),
            roas: calculate_roas(record.revenue, record.spend),
            conversion_rate: calculate_conversion_rate(conversions, clicks),
            cpa: calculate_cpa(record.spend, conversions),
        }
    }
}

impl MetricRecord {
    pub fn derived(&self) -> DerivedMetrics {
        DerivedMetrics::from_record(self)
    }
}

impl Add for MetricRecord {
    type Output = MetricRecord;

    fn add(mut self, rhs: MetricRecord) -> MetricRecord {
        self += rhs;
        self
    }
}

impl AddAssign for MetricRecord {
    fn add_assign(&mut self, rhs: MetricRecord) {
        self.impressions = self.impressions.saturating_add(rhs.impressions);
        self.clicks = self.clicks.saturating_add(rhs.clicks);
        self.spend += rhs.spend;
        self.conversions = self.conversions.saturating_add(rhs.conversions);
        self.revenue += rhs.revenue;
    }
}

impl Sum for MetricRecord {
    fn sum<I: Iterator<Item = MetricRecord>>(iter: I) -> Self {
        iter.fold(MetricRecord::default(), Add::add)
    }
}

impl<'a> Sum<&'a MetricRecord> for MetricRecord {
    fn sum<I: Iterator<Item = &'a MetricRecord>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

fn is_falsy(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `((new - old) / old) * 100`. A zero baseline yields `0` when nothing
/// changed and `100` otherwise.
pub fn calculate_percentage_change(old_value: f64, new_value: f64) -> f64 {
    let old_value = finite_or_zero(old_value);
    let new_value = finite_or_zero(new_value);
    if old_value == 0.0 {
        return if new_value == 0.0 { 0.0 } else { 100.0 };
    }
    finite_or_zero(((new_value - old_value) / old_value) * 100.0)
}

pub fn calculate_ctr(clicks: f64, impressions: f64) -> f64 {
    if is_falsy(clicks) || is_falsy(impressions) {
        return 0.0;
    }
    finite_or_zero((clicks / impressions) * 100.0)
}

pub fn calculate_cpc(cost: f64, clicks: f64) -> f64 {
    if is_falsy(cost) || is_falsy(clicks) {
        return 0.0;
    }
    finite_or_zero(cost / clicks)
}

pub fn calculate_cpm(cost: f64, impressions: f64) -> f64 {
    if is_falsy(cost) || is_falsy(impressions) {
        return 0.0;
    }
    finite_or_zero((cost / impressions) * 1000.0)
}

pub fn calculate_roas(revenue: f64, cost: f64) -> f64 {
    if is_falsy(cost) {
        return 0.0;
    }
    finite_or_zero(revenue / cost)
}

pub fn calculate_conversion_rate(conversions: f64, clicks: f64) -> f64 {
    if is_falsy(conversions) || is_falsy(clicks) {
        return 0.0;
    }
    finite_or_zero((conversions / clicks) * 100.0)
}

pub fn calculate_cpa(cost: f64, conversions: f64) -> f64 {
    if is_falsy(cost) || is_falsy(conversions) {
        return 0.0;
    }
    finite_or_zero(cost / conversions)
}
