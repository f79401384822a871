//! Tunables for a comparison run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::risk::RiskWeights;

/// Limit spread, as a percentage of the highest limit, above which a
/// difference is reported as a conflict.
pub const DEFAULT_MATERIALITY_THRESHOLD_PCT: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonConfig {
    pub materiality_threshold_pct: f64,
    pub risk_weights: RiskWeights,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            materiality_threshold_pct: DEFAULT_MATERIALITY_THRESHOLD_PCT,
            risk_weights: RiskWeights::default(),
        }
    }
}

impl ComparisonConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.materiality_threshold_pct;
        if !t.is_finite() || t <= 0.0 || t > 100.0 {
            return Err(ConfigError::InvalidThreshold(t));
        }
        Ok(())
    }

    pub fn with_materiality_threshold(mut self, pct: f64) -> Result<Self, ConfigError> {
        self.materiality_threshold_pct = pct;
        self.validate()?;
        Ok(self)
    }
}
