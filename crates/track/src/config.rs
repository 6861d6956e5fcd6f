use autorunner_common::{layers, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`TrackConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Track generation and path maintenance settings.
///
/// Every field has a default, so a YAML file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Blocks requested per generation pass.
    pub blocks_per_pass: usize,
    /// Consecutive rejected placements tolerated before generation fails.
    pub retry_budget: u32,
    /// Length of the obstruction probe cast from each exit.
    pub probe_distance: f32,
    /// Collision layers the obstruction probe tests against.
    pub probe_layers: u32,
    /// Rebuild the path once the follower has this many points or fewer left.
    pub refill_threshold: usize,
    /// Passed blocks kept in the scene behind the character.
    pub retain_passed: usize,
    /// Where the first block of a run attaches.
    pub initial_anchor: Transform,
    /// Height above the first block's entry at which the character spawns.
    pub spawn_height: f32,
    /// Fixed RNG seed; `None` lets the caller pick one.
    pub seed: Option<u64>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            blocks_per_pass: 3,
            retry_budget: 30,
            probe_distance: 20.0,
            probe_layers: layers::FLOOR,
            refill_threshold: 3,
            retain_passed: 2,
            initial_anchor: Transform::from_position(Vec3::new(0.0, 0.0, -2.0)),
            spawn_height: 10.0,
            seed: None,
        }
    }
}

impl TrackConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded track config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks_per_pass == 0 {
            return Err(ConfigError::Invalid("blocks_per_pass must be at least 1".into()));
        }
        if self.retry_budget == 0 {
            return Err(ConfigError::Invalid("retry_budget must be at least 1".into()));
        }
        if self.probe_distance.is_nan() || self.probe_distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "probe_distance must be positive, got {}",
                self.probe_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrackConfig::default();
        assert_eq!(config.blocks_per_pass, 3);
        assert_eq!(config.retry_budget, 30);
        assert_eq!(config.probe_distance, 20.0);
        assert_eq!(config.probe_layers, layers::FLOOR);
        assert_eq!(config.refill_threshold, 3);
        assert_eq!(config.initial_anchor.position, Vec3::new(0.0, 0.0, -2.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = TrackConfig::from_yaml_str("retry_budget: 5\nseed: 99\n").unwrap();
        assert_eq!(config.retry_budget, 5);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.blocks_per_pass, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            TrackConfig::from_yaml_str("retry_budget: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrackConfig::from_yaml_str("probe_distance: -1.0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = TrackConfig {
            blocks_per_pass: 5,
            seed: Some(3),
            ..TrackConfig::default()
        };
        std::fs::write(tmp.path(), config.to_yaml().unwrap()).unwrap();
        assert_eq!(TrackConfig::load(tmp.path()).unwrap(), config);
    }
}
