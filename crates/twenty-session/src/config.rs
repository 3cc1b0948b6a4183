use std::io::Read;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    // Session timing and RNG settings under one nested key.
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct SessionConfig {
    /// Seconds to wait for a qualifying input before ending the game.
    #[serde(default = "defaults::input_timeout_secs")]
    pub input_timeout_secs: u64,

    /// Seconds the board stays up after a loss before it is retired.
    #[serde(default = "defaults::loss_linger_secs")]
    pub loss_linger_secs: u64,

    /// Fixed RNG seed for tile spawns. If None, seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_timeout_secs: defaults::input_timeout_secs(),
            loss_linger_secs: defaults::loss_linger_secs(),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn input_timeout(&self) -> Duration {
        Duration::from_secs(self.input_timeout_secs)
    }

    pub fn loss_linger(&self) -> Duration {
        Duration::from_secs(self.loss_linger_secs)
    }
}

impl Config {
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.session.input_timeout_secs == 0 {
            bail!("session.input_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

mod defaults {
    pub fn input_timeout_secs() -> u64 { 300 }
    pub fn loss_linger_secs() -> u64 { 5 }
}
