use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, warn};

use crate::alert::rules::AlertRules;
use crate::alert::sink::AlertSink;
use crate::performance::monitor::{PerformanceMonitor, Subscription};
use crate::performance::PerformanceAlert;

pub fn forward_alerts(
    monitor: &PerformanceMonitor,
    rules: AlertRules,
) -> (Subscription, UnboundedReceiver<PerformanceAlert>) {
    let (tx, rx) = unbounded_channel();
    let subscription = monitor.on_alert(move |alert| {
        if !rules.allows(alert) {
            debug!("alert {} for {} filtered by rules", alert.sequence, alert.metric);
            return;
        }
        if tx.send(alert.clone()).is_err() {
            debug!("alert receiver closed, dropping alert {}", alert.sequence);
        }
    });
    (subscription, rx)
}

pub async fn deliver_alerts(
    mut rx: UnboundedReceiver<PerformanceAlert>,
    sinks: &[Box<dyn AlertSink>],
) -> usize {
    let mut delivered = 0usize;
    while let Some(alert) = rx.recv().await {
        for sink in sinks {
            if let Err(err) = sink.send(&alert).await {
                warn!("failed sending alert: {err}");
            }
        }
        delivered += 1;
    }
    delivered
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::performance::Severity;

    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send(&self, alert: &PerformanceAlert) -> Result<()> {
            self.0.lock().unwrap().push(alert.metric.clone());
            Ok(())
        }
    }

    #[test]
    fn forwards_only_allowed_alerts_to_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(RecordingSink(Arc::clone(&seen)))];

        let mut monitor = PerformanceMonitor::new();
        let rules = AlertRules {
            min_severity: Severity::High,
            muted_metrics: Vec::new(),
        };
        let (subscription, rx) = forward_alerts(&monitor, rules);
        monitor.record_sample("lcp", 7600.0);
        monitor.record_sample("fid", 120.0);
        monitor.record_sample("memory", 120.0);
        subscription.unsubscribe();

        let delivered = tokio_test::block_on(deliver_alerts(rx, &sinks));
        assert_eq!(delivered, 2);
        assert_eq!(*seen.lock().unwrap(), vec!["lcp".to_string(), "memory".to_string()]);
    }
}
