pub mod monitor;
pub mod source;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classifies a budget overrun by `value / threshold`.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 3.0 {
            Self::Critical
        } else if ratio > 2.0 {
            Self::High
        } else if ratio > 1.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn penalty(&self) -> u32 {
        match self {
            Self::Critical => 30,
            Self::High => 20,
            Self::Medium => 10,
            Self::Low => 5,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown severity: {0}")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" | "crit" => Ok(Self::Critical),
            _ => Err(SeverityParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSample {
    pub metric: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSample {
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceAlert {
    pub sequence: u64,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub ratio: f64,
    pub severity: Severity,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceAlert {
    pub fn title(&self) -> String {
        format!("{} budget exceeded ({})", self.metric, self.severity)
    }

    pub fn body(&self) -> String {
        format!(
            "{} measured {} against a budget of {} ({:.2}x)",
            self.metric, self.value, self.threshold, self.ratio
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BudgetError {
    #[error("budget metric name is empty")]
    EmptyMetric,
    #[error("budget threshold for {metric} must be positive, got {threshold}")]
    InvalidThreshold { metric: String, threshold: f64 },
}

/// Metric name to the largest acceptable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PerformanceBudget(BTreeMap<String, f64>);

impl PerformanceBudget {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, metric: &str, threshold: f64) -> Result<(), BudgetError> {
        let metric = normalize_metric_name(metric);
        if metric.is_empty() {
            return Err(BudgetError::EmptyMetric);
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BudgetError::InvalidThreshold { metric, threshold });
        }
        self.0.insert(metric, threshold);
        Ok(())
    }

    pub fn threshold(&self, metric: &str) -> Option<f64> {
        self.0.get(&normalize_metric_name(metric)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(metric, threshold)| (metric.as_str(), *threshold))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validated(&self) -> Result<Self, BudgetError> {
        let mut out = Self::empty();
        for (metric, threshold) in &self.0 {
            out.insert(metric, *threshold)?;
        }
        Ok(out)
    }
}

impl Default for PerformanceBudget {
    fn default() -> Self {
        let entries = [
            ("lcp", 2500.0),
            ("fid", 100.0),
            ("cls", 0.1),
            ("fcp", 1800.0),
            ("ttfb", 800.0),
            ("memory", 50.0),
        ];
        Self(
            entries
                .into_iter()
                .map(|(metric, threshold)| (metric.to_string(), threshold))
                .collect(),
        )
    }
}

pub fn normalize_metric_name(metric: &str) -> String {
    metric.trim().to_ascii_lowercase()
}

pub fn recommendations_for(metric: &str) -> &'static [&'static str] {
    match metric {
        "lcp" => &[
            "Compress and resize hero images",
            "Preload the largest above-the-fold resource",
            "Reduce render-blocking scripts and styles",
        ],
        "fid" => &[
            "Break up long main-thread tasks",
            "Defer non-critical JavaScript",
            "Move heavy computation to a web worker",
        ],
        "cls" => &[
            "Reserve space for images and embeds with explicit dimensions",
            "Avoid inserting content above existing content",
        ],
        "fcp" => &[
            "Inline critical CSS",
            "Reduce server response time",
        ],
        "ttfb" => &[
            "Cache responses closer to the user",
            "Optimize slow backend queries",
        ],
        "memory" => &[
            "Release unused caches and detached nodes",
            "Paginate large data sets",
            "Check for listeners that are never removed",
        ],
        _ => &["Profile the affected view to locate the regression"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_severity_by_ratio() {
        assert_eq!(Severity::from_ratio(7600.0 / 2500.0), Severity::Critical);
        assert_eq!(Severity::from_ratio(2.5), Severity::High);
        assert_eq!(Severity::from_ratio(1.8), Severity::Medium);
        assert_eq!(Severity::from_ratio(3000.0 / 2500.0), Severity::Low);
        // boundaries are exclusive
        assert_eq!(Severity::from_ratio(3.0), Severity::High);
        assert_eq!(Severity::from_ratio(1.5), Severity::Low);
    }

    #[test]
    fn budget_normalizes_names_and_rejects_bad_thresholds() {
        let mut budget = PerformanceBudget::empty();
        budget.insert(" LCP ", 2500.0).unwrap();
        assert_eq!(budget.threshold("lcp"), Some(2500.0));
        assert_eq!(
            budget.insert("fid", 0.0),
            Err(BudgetError::InvalidThreshold {
                metric: "fid".to_string(),
                threshold: 0.0
            })
        );
        assert_eq!(budget.insert("  ", 1.0), Err(BudgetError::EmptyMetric));
    }

    #[test]
    fn default_budget_has_web_vitals() {
        let budget = PerformanceBudget::default();
        assert_eq!(budget.threshold("lcp"), Some(2500.0));
        assert_eq!(budget.threshold("cls"), Some(0.1));
        assert_eq!(budget.threshold("memory"), Some(50.0));
        assert!(budget.threshold("inp").is_none());
    }

    #[test]
    fn unknown_metrics_get_generic_recommendation() {
        assert_eq!(recommendations_for("lcp").len(), 3);
        assert_eq!(recommendations_for("custom").len(), 1);
    }
}
