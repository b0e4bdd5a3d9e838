// Configuration loading. Every section defaults so a missing or partial file
// still yields a runnable agent; an invalid file is a Config error and the
// caller falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

pub const MAX_DISPATCH_DELAY_MS: u64 = 10_000;
const BACKOFF_CAP_MS: u64 = 30_000;

/// The draft moment a feature reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Hover,
    Pick,
    LockIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub enabled: bool,
    pub trigger: TriggerKind,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger: TriggerKind::Pick,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildGuideConfig {
    pub enabled: bool,
    pub trigger: TriggerKind,
    pub open_in_game: bool,
}

impl Default for BuildGuideConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger: TriggerKind::LockIn,
            open_in_game: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub matchup: FeatureConfig,
    pub my_counters: FeatureConfig,
    pub enemy_counters: FeatureConfig,
    pub build_guide: BuildGuideConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub base_url: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lolalytics.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { delay_ms: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub retry_interval_ms: u64,
    pub max_retries: u32,
    pub backoff: BackoffKind,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: 2_000,
            max_retries: 0, // 0 = retry forever
            backoff: BackoffKind::Exponential,
        }
    }
}

impl TransportConfig {
    /// Delay before the given retry attempt (1-based), capped at 30 s.
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let base = self.retry_interval_ms.max(1);
        let ms = match self.backoff {
            BackoffKind::Linear => base.saturating_mul(attempt as u64),
            BackoffKind::Exponential => {
                base.saturating_mul(1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX))
            }
        };
        std::time::Duration::from_millis(ms.min(BACKOFF_CAP_MS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChampionDataConfig {
    pub refresh_on_start: bool,
    pub cdn_base_url: String,
}

impl Default for ChampionDataConfig {
    fn default() -> Self {
        Self {
            refresh_on_start: false,
            cdn_base_url: "https://ddragon.leagueoflegends.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Install directory holding the lockfile, used when the process command
    /// line is unreadable.
    pub install_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub features: FeaturesConfig,
    pub analytics: AnalyticsConfig,
    pub dispatch: DispatchConfig,
    pub transport: TransportConfig,
    pub champion_data: ChampionDataConfig,
    pub client: ClientConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| AgentError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dispatch.delay_ms > MAX_DISPATCH_DELAY_MS {
            return Err(AgentError::Config(format!(
                "dispatch.delay_ms {} exceeds maximum {}",
                self.dispatch.delay_ms, MAX_DISPATCH_DELAY_MS
            )));
        }
        if self.analytics.base_url.is_empty() {
            return Err(AgentError::Config("analytics.base_url is empty".into()));
        }
        Ok(())
    }
}
