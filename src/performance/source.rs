use std::collections::VecDeque;
use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::performance::monitor::PerformanceMonitor;
use crate::performance::PerformanceSample;

pub trait SampleSource: Send {
    fn poll(&mut self) -> Vec<PerformanceSample>;

    fn is_exhausted(&self) -> bool {
        false
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SampleParseError {
    #[error("expected metric=value, got {0:?}")]
    MissingSeparator(String),
    #[error("invalid value for {metric}: {raw:?}")]
    InvalidValue { metric: String, raw: String },
}

pub fn parse_sample_pair(raw: &str) -> Result<(String, f64), SampleParseError> {
    let Some((metric, value)) = raw.split_once('=') else {
        return Err(SampleParseError::MissingSeparator(raw.to_string()));
    };
    let metric = metric.trim().to_string();
    if metric.is_empty() {
        return Err(SampleParseError::MissingSeparator(raw.to_string()));
    }
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| SampleParseError::InvalidValue {
            metric: metric.clone(),
            raw: value.to_string(),
        })?;
    Ok((metric, parsed))
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    metric: String,
    value: f64,
}

#[derive(Debug, Default)]
pub struct ReplaySource {
    pending: VecDeque<(String, f64)>,
}

impl ReplaySource {
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, SampleParseError> {
        let mut pending = VecDeque::with_capacity(pairs.len());
        for raw in pairs {
            pending.push_back(parse_sample_pair(raw.as_ref())?);
        }
        Ok(Self { pending })
    }

    /// Reads `metric,value` rows; the header line is required.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut pending = VecDeque::new();
        for (line, row) in csv_reader.deserialize::<SampleRow>().enumerate() {
            let row = row.with_context(|| format!("failed parsing sample row {}", line + 1))?;
            pending.push_back((row.metric, row.value));
        }
        Ok(Self { pending })
    }

    pub fn extend(&mut self, other: ReplaySource) {
        self.pending.extend(other.pending);
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl SampleSource for ReplaySource {
    fn poll(&mut self) -> Vec<PerformanceSample> {
        self.pending
            .pop_front()
            .map(|(metric, value)| vec![PerformanceSample::new(metric, value)])
            .unwrap_or_default()
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Returns the number of samples recorded.
pub async fn run_sampler(
    monitor: &mut PerformanceMonitor,
    source: &mut dyn SampleSource,
    interval: Duration,
    max_ticks: Option<u64>,
) -> usize {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    let mut recorded = 0usize;
    let mut ticks = 0u64;
    loop {
        if source.is_exhausted() || max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        ticker.tick().await;
        ticks += 1;
        for sample in source.poll() {
            debug!("sample {} = {}", sample.metric, sample.value);
            monitor.record_sample_at(&sample.metric, sample.value, sample.timestamp);
            recorded += 1;
        }
    }
    info!("sampler stopped after {ticks} ticks, {recorded} samples");
    recorded
}
