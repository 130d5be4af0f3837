use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::performance::{
    normalize_metric_name, recommendations_for, PerformanceAlert, PerformanceBudget, Severity,
};

pub const DEFAULT_ALERT_CAPACITY: usize = 50;

pub type AlertCallback = Arc<dyn Fn(&PerformanceAlert) + Send + Sync>;

#[derive(Default)]
struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(u64, AlertCallback)>,
}

pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<SubscriberRegistry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut guard = registry.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entries.retain(|(id, _)| *id != self.id);
    }
}

pub struct PerformanceMonitor {
    budget: PerformanceBudget,
    capacity: usize,
    alerts: VecDeque<PerformanceAlert>,
    violations: BTreeMap<String, Severity>,
    subscribers: Arc<Mutex<SubscriberRegistry>>,
    next_sequence: u64,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_budget(PerformanceBudget::default())
    }

    pub fn with_budget(budget: PerformanceBudget) -> Self {
        Self::with_capacity(budget, DEFAULT_ALERT_CAPACITY)
    }

    pub fn with_capacity(budget: PerformanceBudget, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            budget,
            capacity,
            alerts: VecDeque::with_capacity(capacity),
            violations: BTreeMap::new(),
            subscribers: Arc::new(Mutex::new(SubscriberRegistry::default())),
            next_sequence: 1,
        }
    }

    pub fn budget(&self) -> &PerformanceBudget {
        &self.budget
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record_sample(&mut self, metric: &str, value: f64) -> Option<PerformanceAlert> {
        self.record_sample_at(metric, value, Utc::now())
    }

    pub fn record_sample_at(
        &mut self,
        metric: &str,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<PerformanceAlert> {
        let metric = normalize_metric_name(metric);
        let Some(threshold) = self.budget.threshold(&metric) else {
            debug!("no budget for metric {metric}, sample ignored");
            return None;
        };
        if !value.is_finite() {
            warn!("non-finite sample for {metric} ignored");
            return None;
        }
        if value <= threshold {
            self.violations.remove(&metric);
            return None;
        }

        let ratio = value / threshold;
        let severity = Severity::from_ratio(ratio);
        let alert = PerformanceAlert {
            sequence: self.next_sequence,
            recommendations: recommendations_for(&metric)
                .iter()
                .map(|r| r.to_string())
                .collect(),
            metric: metric.clone(),
            value,
            threshold,
            ratio,
            severity,
            timestamp,
        };
        self.next_sequence += 1;

        if self.alerts.len() == self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert.clone());
        self.violations.insert(metric, severity);
        warn!(
            "performance budget exceeded: {} = {} (budget {}, {})",
            alert.metric, alert.value, alert.threshold, alert.severity
        );

        self.notify(&alert);
        Some(alert)
    }

    /// Budget health from 100 down to 0, recomputed from the standing violations.
    pub fn score(&self) -> u32 {
        let penalty: u32 = self.violations.values().map(Severity::penalty).sum();
        100u32.saturating_sub(penalty)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &PerformanceAlert> {
        self.alerts.iter()
    }

    pub fn recent_alerts(&self) -> Vec<PerformanceAlert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn violations(&self) -> &BTreeMap<String, Severity> {
        &self.violations
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    pub fn on_alert<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PerformanceAlert) + Send + Sync + 'static,
    {
        let mut guard = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn notify(&self, alert: &PerformanceAlert) {
        // Snapshot first so callbacks can (un)subscribe without deadlocking.
        let callbacks: Vec<AlertCallback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(alert);
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
