use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alert::rules::AlertRules;
use crate::estimate::material::MaterialPricing;
use crate::estimate::sealcoat::SealcoatPricing;
use crate::estimate::striping::PaintTable;
use crate::performance::monitor::{PerformanceMonitor, DEFAULT_ALERT_CAPACITY};
use crate::performance::PerformanceBudget;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub sealcoat: SealcoatPricing,
    #[serde(default)]
    pub striping: PaintTable,
    #[serde(default)]
    pub material: MaterialPricing,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceConfig {
    #[serde(default)]
    pub budget: PerformanceBudget,
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertsConfig {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_enable_stdout")]
    pub enable_stdout: bool,
    #[serde(default)]
    pub rules: AlertRules,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub webhook_url: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("pavemaster/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let mut parsed: Self = toml::from_str(data)?;
        parsed.performance.budget = parsed
            .performance
            .budget
            .validated()
            .context("invalid performance budget")?;
        parsed.sealcoat.validate()?;
        parsed.striping.validate()?;
        parsed.material.validate()?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(webhook_url) = overrides.webhook_url {
            self.alerts.webhook_url = webhook_url;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn build_monitor(&self) -> PerformanceMonitor {
        PerformanceMonitor::with_capacity(
            self.performance.budget.clone(),
            self.performance.alert_capacity,
        )
    }

    pub fn default_template() -> String {
        let template = r#"[sealcoat]
additive_per_gallon = 4.50
sand_per_pound = 0.15

[sealcoat.sealer_costs]
coal_tar = 1.85
asphalt_emulsion = 1.65
acrylic = 3.25
polymer_modified = 2.45

[striping]
labor_rate_per_hour = 65.0
equipment_rate_per_sq_ft = 0.05

[striping.waterborne]
coverage_sq_ft_per_gallon = 320.0
white_per_gallon = 18.50
yellow_per_gallon = 19.75
blue_per_gallon = 24.00

[striping.solvent_based]
coverage_sq_ft_per_gallon = 280.0
white_per_gallon = 22.00
yellow_per_gallon = 23.50
blue_per_gallon = 28.00

[striping.epoxy]
coverage_sq_ft_per_gallon = 200.0
white_per_gallon = 45.00
yellow_per_gallon = 47.50
blue_per_gallon = 55.00

[material]
aggregate_per_ton = 28.0
binder_per_ton = 550.0
fuel_surcharge_per_ton = 3.50
delivery_per_trip = 150.0
labor_per_hour = 45.0

[material.mix_per_ton]
standard = 95.0
premium = 115.0
recycled = 80.0

[performance]
alert_capacity = 50
sample_interval_ms = 1000

[performance.budget]
lcp = 2500.0
fid = 100.0
cls = 0.1
fcp = 1800.0
ttfb = 800.0
memory = 50.0

[storage]
db_path = "~/.local/share/pavemaster/pavemaster.db"

[alerts]
webhook_url = ""
enable_stdout = true

[alerts.rules]
min_severity = "low"
muted_metrics = []

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            budget: PerformanceBudget::default(),
            alert_capacity: default_alert_capacity(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            enable_stdout: default_enable_stdout(),
            rules: AlertRules::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_alert_capacity() -> usize {
    DEFAULT_ALERT_CAPACITY
}

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_db_path() -> String {
    "~/.local/share/pavemaster/pavemaster.db".to_string()
}

fn default_enable_stdout() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::Severity;

    #[test]
    fn template_parses_to_defaults() {
        let parsed = Config::from_toml(&Config::default_template()).expect("template parses");
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let parsed = Config::from_toml(
            r#"
[material.mix_per_ton]
standard = 101.0
premium = 120.0
recycled = 85.0

[performance.budget]
LCP = 3000.0

[alerts.rules]
min_severity = "high"
"#,
        )
        .unwrap();
        assert_eq!(parsed.material.mix_per_ton.standard, 101.0);
        assert_eq!(parsed.material.binder_per_ton, 550.0);
        assert_eq!(parsed.performance.budget.threshold("lcp"), Some(3000.0));
        assert!(parsed.performance.budget.threshold("fid").is_none());
        assert_eq!(parsed.alerts.rules.min_severity, Severity::High);
        assert_eq!(parsed.server.port, 3001);
    }

    #[test]
    fn rejects_invalid_budget_and_prices() {
        assert!(Config::from_toml("[performance.budget]\nlcp = 0.0\n").is_err());
        assert!(Config::from_toml("[material]\nbinder_per_ton = -1.0\n").is_err());
    }

    #[test]
    fn overrides_replace_storage_and_webhook() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            db_path: Some("/tmp/pm.db".to_string()),
            webhook_url: None,
        });
        assert_eq!(config.resolved_db_path(), PathBuf::from("/tmp/pm.db"));
        assert!(config.alerts.webhook_url.is_empty());
    }
}
