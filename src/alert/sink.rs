use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::performance::PerformanceAlert;

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, alert: &PerformanceAlert) -> Result<()>;
}

pub struct StdoutSink;

#[async_trait]
impl AlertSink for StdoutSink {
    async fn send(&self, alert: &PerformanceAlert) -> Result<()> {
        println!(
            "[{}] {} - {}",
            alert.severity.to_string().to_uppercase(),
            alert.title(),
            alert.body()
        );
        Ok(())
    }
}

pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pavemaster/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn is_discord_webhook(url: &str) -> bool {
    url.contains("discord.com/api/webhooks") || url.contains("discordapp.com/api/webhooks")
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn send(&self, alert: &PerformanceAlert) -> Result<()> {
        let req = if is_discord_webhook(&self.url) {
            let mut content = format!("**{}**\n{}", alert.title(), alert.body());
            for tip in &alert.recommendations {
                content.push_str(&format!("\n- {tip}"));
            }
            self.client
                .post(&self.url)
                .json(&serde_json::json!({ "content": content }))
        } else {
            self.client.post(&self.url).json(alert)
        };

        req.send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::is_discord_webhook;

    #[test]
    fn detects_discord_webhook_urls() {
        assert!(is_discord_webhook("https://discord.com/api/webhooks/1/abc"));
        assert!(is_discord_webhook("https://discordapp.com/api/webhooks/1/abc"));
        assert!(!is_discord_webhook("https://hooks.example.com/alerts"));
    }
}
