use crate::catalog::ProfileSet;
use crate::nn::{Activation, HiddenWeights, OutputWeights, TasteNet};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VizConfig {
    /// Delay between two transition ticks.
    pub tick_period_ms: u64,
    pub tick_count: usize,
    /// Fraction of the remaining gap closed on each tick.
    pub step_factor: f64,
    pub error_amplitude: f64,
    /// Ticks for the synthetic error envelope to shrink by a factor of e.
    pub error_decay: f64,
    pub activation: Activation,
    pub profile_set: ProfileSet,
    /// Seed for the synthetic error series. Entropy-seeded when absent.
    pub seed: Option<u64>,
    pub initial_inputs: [f64; 2],
    pub initial_weights1: HiddenWeights,
    pub initial_weights2: OutputWeights,
}

impl Default for VizConfig {
    fn default() -> Self {
        let net = TasteNet::default();
        Self {
            tick_period_ms: 200,
            tick_count: 20,
            step_factor: 0.1,
            error_amplitude: 0.5,
            error_decay: 10.0,
            activation: Activation::Plain,
            profile_set: ProfileSet::Classic,
            seed: None,
            initial_inputs: [0.5, 0.5],
            initial_weights1: net.w_ih,
            initial_weights2: net.w_ho,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick_count must be positive")]
    ZeroTickCount,
    #[error("tick_period_ms ({actual}) exceeds supported maximum ({max})")]
    TickPeriodTooLong { max: u64, actual: u64 },
    #[error("step_factor must be in (0, 1], got {0}")]
    StepFactorOutOfRange(f64),
    #[error("error_decay must be positive, got {0}")]
    NonPositiveDecay(f64),
    #[error("error_amplitude must be non-negative, got {0}")]
    NegativeAmplitude(f64),
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("invalid config JSON: {0}")]
    Parse(String),
}

impl VizConfig {
    pub const MAX_TICK_PERIOD_MS: u64 = 60_000;

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn initial_net(&self) -> TasteNet {
        TasteNet::new(self.initial_weights1, self.initial_weights2)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_count == 0 {
            return Err(ConfigError::ZeroTickCount);
        }
        if self.tick_period_ms > Self::MAX_TICK_PERIOD_MS {
            return Err(ConfigError::TickPeriodTooLong {
                max: Self::MAX_TICK_PERIOD_MS,
                actual: self.tick_period_ms,
            });
        }
        if !(self.step_factor > 0.0 && self.step_factor <= 1.0) {
            return Err(ConfigError::StepFactorOutOfRange(self.step_factor));
        }
        if !self.error_amplitude.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "error_amplitude",
            });
        }
        if self.error_amplitude < 0.0 {
            return Err(ConfigError::NegativeAmplitude(self.error_amplitude));
        }
        if !self.error_decay.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "error_decay",
            });
        }
        if self.error_decay <= 0.0 {
            return Err(ConfigError::NonPositiveDecay(self.error_decay));
        }
        if !self.initial_inputs.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "initial_inputs",
            });
        }
        if !self.initial_net().to_weight_vec().iter().all(|v| v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "initial_weights",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VizConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_period(), Duration::from_millis(200));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            VizConfig::from_json_str(r#"{"activation": "steep", "seed": 7}"#).unwrap();
        assert_eq!(config.activation, Activation::Steep);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tick_count, 20);
        assert_eq!(config.profile_set, ProfileSet::Classic);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            (
                VizConfig {
                    tick_count: 0,
                    ..VizConfig::default()
                },
                ConfigError::ZeroTickCount,
            ),
            (
                VizConfig {
                    step_factor: 1.5,
                    ..VizConfig::default()
                },
                ConfigError::StepFactorOutOfRange(1.5),
            ),
            (
                VizConfig {
                    error_decay: 0.0,
                    ..VizConfig::default()
                },
                ConfigError::NonPositiveDecay(0.0),
            ),
            (
                VizConfig {
                    error_amplitude: -1.0,
                    ..VizConfig::default()
                },
                ConfigError::NegativeAmplitude(-1.0),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        let config = VizConfig {
            initial_weights2: [f64::NAN, 0.0],
            ..VizConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "initial_weights"
            })
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            VizConfig::from_json_str("{ tick_count: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
