use serde::{Deserialize, Serialize};

use crate::performance::{normalize_metric_name, PerformanceAlert, Severity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertRules {
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
    #[serde(default)]
    pub muted_metrics: Vec<String>,
}

impl AlertRules {
    pub fn allows(&self, alert: &PerformanceAlert) -> bool {
        if alert.severity < self.min_severity {
            return false;
        }
        !self
            .muted_metrics
            .iter()
            .any(|muted| normalize_metric_name(muted) == alert.metric)
    }
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            min_severity: default_min_severity(),
            muted_metrics: Vec::new(),
        }
    }
}

fn default_min_severity() -> Severity {
    Severity::Low
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn alert(metric: &str, severity: Severity) -> PerformanceAlert {
        PerformanceAlert {
            sequence: 1,
            metric: metric.to_string(),
            value: 1.0,
            threshold: 1.0,
            ratio: 1.0,
            severity,
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn filters_by_severity_and_muted_metric() {
        let rules = AlertRules {
            min_severity: Severity::Medium,
            muted_metrics: vec!["CLS".to_string()],
        };
        assert!(!rules.allows(&alert("lcp", Severity::Low)));
        assert!(rules.allows(&alert("lcp", Severity::Medium)));
        assert!(rules.allows(&alert("fid", Severity::Critical)));
        assert!(!rules.allows(&alert("cls", Severity::Critical)));
    }
}
