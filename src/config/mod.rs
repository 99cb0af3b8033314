use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub accept_language: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Deadline in seconds for one whole link resolution across all strategies
    pub resolve_budget_secs: u64,
    pub verify_streams: bool,
    pub sites: BTreeMap<String, SiteOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteOverride {
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            timeout_secs: 20,
            resolve_budget_secs: 15,
            verify_streams: true,
            sites: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScrapeError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).map_err(|e| ScrapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ScrapeError::Config("timeout_secs must be positive".to_string()));
        }
        if self.resolve_budget_secs == 0 {
            return Err(ScrapeError::Config(
                "resolve_budget_secs must be positive".to_string(),
            ));
        }
        for (name, site) in &self.sites {
            if let Some(base) = &site.base_url {
                url::Url::parse(base).map_err(|e| {
                    ScrapeError::Config(format!("sites.{}.base_url '{}': {}", name, base, e))
                })?;
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolve_budget(&self) -> Duration {
        Duration::from_secs(self.resolve_budget_secs)
    }

    /// Returns the configured base URL override for a site, matched case-insensitively.
    pub fn base_url_for(&self, site: &str) -> Option<&str> {
        self.sites
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(site))
            .and_then(|(_, o)| o.base_url.as_deref())
    }
}
