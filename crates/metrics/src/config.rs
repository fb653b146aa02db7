use crate::error::{MetricsError, Result};
use crate::lexicon::LexiconSpec;
use crate::types::LengthBin;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable constants of the scoring pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of previous assistant texts kept for callback/novelty history
    pub callback_window: usize,

    /// Emergence score at or above which a turn is flagged hot
    pub hot_threshold: f64,

    /// Upper token bound (inclusive) of the `short` length bin
    pub length_short_max: usize,

    /// Upper token bound (inclusive) of the `medium` length bin
    pub length_medium_max: usize,

    /// Rotation applied to user texts by the negative control
    pub control_shift: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            callback_window: 3,
            hot_threshold: 0.55,
            length_short_max: 60,
            length_medium_max: 200,
            control_shift: 5,
        }
    }
}

impl ScoringConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.callback_window == 0 {
            return Err("callback_window must be > 0".to_string());
        }

        if !self.hot_threshold.is_finite() || !(0.0..=1.0).contains(&self.hot_threshold) {
            return Err(format!(
                "hot_threshold ({}) must be within [0, 1]",
                self.hot_threshold
            ));
        }

        if self.length_short_max > self.length_medium_max {
            return Err(format!(
                "length_short_max ({}) cannot exceed length_medium_max ({})",
                self.length_short_max, self.length_medium_max
            ));
        }

        Ok(())
    }

    #[must_use]
    pub const fn length_bin(&self, tokens: usize) -> LengthBin {
        if tokens <= self.length_short_max {
            LengthBin::Short
        } else if tokens <= self.length_medium_max {
            LengthBin::Medium
        } else {
            LengthBin::Long
        }
    }

    #[must_use]
    pub fn is_hot(&self, emergence_score: f64) -> bool {
        emergence_score >= self.hot_threshold
    }
}

const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Scoring constants plus vocabulary, as loaded from a TOML profile.
///
/// Every field is optional in the file:
///
/// ```toml
/// schema_version = 1
///
/// [scoring]
/// hot_threshold = 0.6
/// control_shift = 3
///
/// [lexicon]
/// motif_tokens = ["lantern", "tide"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsProfile {
    pub schema_version: u32,
    pub scoring: ScoringConfig,
    pub lexicon: LexiconSpec,
}

impl Default for MetricsProfile {
    fn default() -> Self {
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            scoring: ScoringConfig::default(),
            lexicon: LexiconSpec::default(),
        }
    }
}

impl MetricsProfile {
    /// Parse a profile from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let profile: Self = toml::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != PROFILE_SCHEMA_VERSION {
            return Err(MetricsError::invalid_config(format!(
                "schema_version {} is not supported (expected {PROFILE_SCHEMA_VERSION})",
                self.schema_version
            )));
        }
        self.scoring.validate().map_err(MetricsError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.callback_window, 3);
        assert_eq!(config.control_shift, 5);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScoringConfig {
            callback_window: 0,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());

        config.callback_window = 3;
        config.hot_threshold = 1.5;
        assert!(config.validate().is_err());

        config.hot_threshold = f64::NAN;
        assert!(config.validate().is_err());

        config.hot_threshold = 0.55;
        config.length_short_max = 300;
        assert!(config.validate().is_err());

        config.length_short_max = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn length_bins_use_inclusive_cutoffs() {
        let config = ScoringConfig::default();
        assert_eq!(config.length_bin(0), LengthBin::Short);
        assert_eq!(config.length_bin(60), LengthBin::Short);
        assert_eq!(config.length_bin(61), LengthBin::Medium);
        assert_eq!(config.length_bin(200), LengthBin::Medium);
        assert_eq!(config.length_bin(201), LengthBin::Long);
    }

    #[test]
    fn hot_flag_is_inclusive() {
        let config = ScoringConfig::default();
        assert!(config.is_hot(0.55));
        assert!(!config.is_hot(0.549));
    }

    #[test]
    fn partial_profile_falls_back_to_defaults() {
        let profile = MetricsProfile::from_toml_str(
            r#"
            [scoring]
            hot_threshold = 0.6

            [lexicon]
            motif_tokens = ["lantern"]
            "#,
        )
        .unwrap();

        assert_eq!(profile.scoring.hot_threshold, 0.6);
        assert_eq!(profile.scoring.callback_window, 3);
        assert_eq!(profile.lexicon.motif_tokens, vec!["lantern".to_string()]);
        assert_eq!(profile.lexicon.stopwords, LexiconSpec::default().stopwords);
    }

    #[test]
    fn empty_profile_is_default() {
        assert_eq!(
            MetricsProfile::from_toml_str("").unwrap(),
            MetricsProfile::default()
        );
    }

    #[test]
    fn profile_rejects_unknown_schema_and_bad_values() {
        assert!(MetricsProfile::from_toml_str("schema_version = 2").is_err());
        assert!(matches!(
            MetricsProfile::from_toml_str("[scoring]\ncallback_window = 0"),
            Err(MetricsError::InvalidConfig(_))
        ));
        assert!(matches!(
            MetricsProfile::from_toml_str("[scoring\n"),
            Err(MetricsError::ProfileParse(_))
        ));
    }

    #[test]
    fn profile_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "[scoring]\ncontrol_shift = 2\n").unwrap();

        let profile = MetricsProfile::load(&path).unwrap();
        assert_eq!(profile.scoring.control_shift, 2);

        assert!(matches!(
            MetricsProfile::load(dir.path().join("missing.toml")),
            Err(MetricsError::IoError(_))
        ));
    }
}
