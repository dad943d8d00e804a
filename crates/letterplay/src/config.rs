use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::types::{ActivityKind, Letter};
use crate::error::ConfigError;

/// Top-level configuration for all mini-games.
/// Loaded from a JSON document at startup; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterplayConfig {
    pub tracing: TracingSettings,
    pub identity: IdentitySettings,
    /// Letters enumerated when clearing a uniqueness scope.
    pub alphabet: Vec<Letter>,
    pub scopes: ScopePresets,
}

/// Numeric knobs of the gesture tracing engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingSettings {
    /// Fraction of a point's radius a round's first touch must land within.
    pub start_radius_factor: f32,
    /// Minimum distance between recorded trail vertices.
    pub point_spacing: f32,
    /// Seconds the pointer may stay outside every valid zone.
    pub out_of_bounds_limit: f32,
    /// Seconds between an error and the round restarting.
    pub feedback_delay: f32,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            start_radius_factor: 0.8,
            point_spacing: 4.0,
            out_of_bounds_limit: 0.75,
            feedback_delay: 1.0,
        }
    }
}

/// Retry policy of the identity resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub retry_interval_ms: u64,
    pub retry_window_ms: u64,
}

impl IdentitySettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn retry_window(&self) -> Duration {
        Duration::from_millis(self.retry_window_ms)
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            retry_interval_ms: 500,
            retry_window_ms: 5000,
        }
    }
}

/// Activity groups whose attempts exclude each other, per activity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopePresets {
    pub tracing: Vec<ActivityKind>,
    pub detect: Vec<ActivityKind>,
    pub speech: Vec<ActivityKind>,
    pub cards: Vec<ActivityKind>,
}

impl ScopePresets {
    pub fn group_for(&self, kind: ActivityKind) -> &[ActivityKind] {
        match kind {
            ActivityKind::Tracing => &self.tracing,
            ActivityKind::Detect => &self.detect,
            ActivityKind::Speech => &self.speech,
            ActivityKind::Cards => &self.cards,
        }
    }
}

impl Default for ScopePresets {
    fn default() -> Self {
        Self {
            tracing: vec![ActivityKind::Tracing],
            detect: vec![ActivityKind::Detect, ActivityKind::Cards],
            speech: vec![ActivityKind::Speech],
            cards: vec![ActivityKind::Detect, ActivityKind::Cards],
        }
    }
}

fn default_alphabet() -> Vec<Letter> {
    ('A'..='Z').map(Letter::from).collect()
}

impl Default for LetterplayConfig {
    fn default() -> Self {
        Self {
            tracing: TracingSettings::default(),
            identity: IdentitySettings::default(),
            alphabet: default_alphabet(),
            scopes: ScopePresets::default(),
        }
    }
}

impl LetterplayConfig {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracing;
        check_unit("tracing.start_radius_factor", t.start_radius_factor)?;
        check_non_negative("tracing.point_spacing", t.point_spacing)?;
        check_non_negative("tracing.out_of_bounds_limit", t.out_of_bounds_limit)?;
        check_non_negative("tracing.feedback_delay", t.feedback_delay)?;

        if self.identity.retry_interval_ms == 0 && self.identity.retry_window_ms > 0 {
            return Err(ConfigError::Invalid {
                field: "identity.retry_interval_ms",
                reason: "must be positive when a retry window is set".into(),
            });
        }
        if self.alphabet.is_empty() {
            return Err(ConfigError::Invalid {
                field: "alphabet",
                reason: "must name at least one letter".into(),
            });
        }
        for kind in ActivityKind::ALL {
            if !self.scopes.group_for(kind).contains(&kind) {
                return Err(ConfigError::Invalid {
                    field: "scopes",
                    reason: format!("scope for {kind} must include {kind} itself"),
                });
            }
        }
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite value >= 0, got {value}"),
        })
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a value in (0, 1], got {value}"),
        })
    }
}
