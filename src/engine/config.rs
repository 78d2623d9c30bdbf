//! Registry configuration.
//!
//! [`ECSConfig`] carries the few behavioural policies a host may want to
//! choose at startup. It is plain data: construct it in code with the builder
//! setters, or load it from a TOML document with [`ECSConfig::from_toml_str`].
//!
//! ```toml
//! stage_dedup = "deduplicate"   # or "per_scene"
//! usage_hints = true
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::error::ECSResult;


/// How the stage treats a system that belongs to several staged scenes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageDedup {
    /// A system runs once per tick, at its first position in the flattened
    /// scene order.
    #[default]
    Deduplicate,

    /// A system runs once per scene that contains it.
    PerScene,
}

/// Behavioural policies for an [`ECSManager`](crate::engine::manager::ECSManager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ECSConfig {
    /// Stage de-duplication policy.
    pub stage_dedup: StageDedup,

    /// Whether usage hints are emitted as `tracing` warnings. Hints are
    /// counted either way.
    pub usage_hints: bool,
}

impl Default for ECSConfig {
    fn default() -> Self {
        Self { stage_dedup: StageDedup::Deduplicate, usage_hints: true }
    }
}

impl ECSConfig {

    /// Returns the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stage de-duplication policy.
    pub fn with_stage_dedup(mut self, policy: StageDedup) -> Self {
        self.stage_dedup = policy;
        self
    }

    /// Enables or disables usage-hint warnings.
    pub fn with_usage_hints(mut self, enabled: bool) -> Self {
        self.usage_hints = enabled;
        self
    }

    /// Parses a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> ECSResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
