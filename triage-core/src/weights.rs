//! Weighting policy: named presets, custom weight sets, validation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WeightError;
use crate::task::FactorScores;

/// Allowed drift of a weight sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One of the four scoring factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Urgency,
    Importance,
    Effort,
    Blocking,
}

impl Factor {
    pub const ALL: [Factor; 4] = [
        Factor::Urgency,
        Factor::Importance,
        Factor::Effort,
        Factor::Blocking,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Factor::Urgency => "urgency",
            Factor::Importance => "importance",
            Factor::Effort => "effort",
            Factor::Blocking => "blocking",
        }
    }
}

impl FactorScores {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Urgency => self.urgency,
            Factor::Importance => self.importance,
            Factor::Effort => self.effort,
            Factor::Blocking => self.blocking,
        }
    }
}

/// Named weight presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    SmartBalance,
    FastestWins,
    HighImpact,
    DeadlineDriven,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::SmartBalance,
        Strategy::FastestWins,
        Strategy::HighImpact,
        Strategy::DeadlineDriven,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::SmartBalance => "smart_balance",
            Strategy::FastestWins => "fastest_wins",
            Strategy::HighImpact => "high_impact",
            Strategy::DeadlineDriven => "deadline_driven",
        }
    }

    /// Urgency / importance / effort / blocking.
    pub fn weights(self) -> WeightSet {
        let (u, i, e, b) = match self {
            Strategy::SmartBalance => (0.30, 0.30, 0.20, 0.20),
            Strategy::FastestWins => (0.15, 0.15, 0.60, 0.10),
            Strategy::HighImpact => (0.15, 0.60, 0.10, 0.15),
            Strategy::DeadlineDriven => (0.60, 0.20, 0.10, 0.10),
        };
        WeightSet::new(u, i, e, b)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|st| st.name() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
                format!("unknown strategy '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Four factor weights plus the flag saying whether they override presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    pub urgency_weight: f64,
    pub importance_weight: f64,
    pub effort_weight: f64,
    pub blocking_weight: f64,
    #[serde(default)]
    pub custom_weights_enabled: bool,
}

impl Default for WeightSet {
    fn default() -> Self {
        Strategy::SmartBalance.weights()
    }
}

impl WeightSet {
    pub fn new(urgency: f64, importance: f64, effort: f64, blocking: f64) -> Self {
        Self {
            urgency_weight: urgency,
            importance_weight: importance,
            effort_weight: effort,
            blocking_weight: blocking,
            custom_weights_enabled: false,
        }
    }

    pub fn custom(urgency: f64, importance: f64, effort: f64, blocking: f64) -> Self {
        Self {
            custom_weights_enabled: true,
            ..Self::new(urgency, importance, effort, blocking)
        }
    }

    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Urgency => self.urgency_weight,
            Factor::Importance => self.importance_weight,
            Factor::Effort => self.effort_weight,
            Factor::Blocking => self.blocking_weight,
        }
    }

    fn set(&mut self, factor: Factor, value: f64) {
        match factor {
            Factor::Urgency => self.urgency_weight = value,
            Factor::Importance => self.importance_weight = value,
            Factor::Effort => self.effort_weight = value,
            Factor::Blocking => self.blocking_weight = value,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Reject non-finite or negative components and sums away from 1.0.
    pub fn validate(&self) -> Result<(), WeightError> {
        for f in Factor::ALL {
            let value = self.get(f);
            let name = weight_name(f);
            if !value.is_finite() {
                return Err(WeightError::NonFinite { name, value });
            }
            if value < 0.0 {
                return Err(WeightError::Negative { name, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum { sum });
        }
        Ok(())
    }

    /// Divide every component by the sum. Zero or non-finite sums fall back to the default preset.
    pub fn normalized(&self) -> WeightSet {
        let sum = self.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return WeightSet {
                custom_weights_enabled: self.custom_weights_enabled,
                ..WeightSet::default()
            };
        }
        let mut out = *self;
        for f in Factor::ALL {
            out.set(f, self.get(f) / sum);
        }
        out
    }

    /// Apply `adjust` to each weight, floor at `floor`, then renormalize.
    pub(crate) fn adjusted(&self, floor: f64, mut adjust: impl FnMut(Factor, f64) -> f64) -> WeightSet {
        let mut out = *self;
        for f in Factor::ALL {
            out.set(f, adjust(f, self.get(f)).max(floor));
        }
        out.normalized()
    }

    /// Weighted sum of the factor scores.
    pub fn combine(&self, scores: &FactorScores) -> f64 {
        Factor::ALL
            .iter()
            .map(|f| self.get(*f) * scores.get(*f))
            .sum()
    }
}

fn weight_name(f: Factor) -> &'static str {
    match f {
        Factor::Urgency => "urgency_weight",
        Factor::Importance => "importance_weight",
        Factor::Effort => "effort_weight",
        Factor::Blocking => "blocking_weight",
    }
}

/// The weighting selected for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    Preset(Strategy),
    Custom(WeightSet),
}

impl Default for WeightPolicy {
    fn default() -> Self {
        WeightPolicy::Preset(Strategy::default())
    }
}

impl WeightPolicy {
    /// Pick stored weights only when they exist and are flagged as custom.
    pub fn resolve(strategy: Strategy, stored: Option<WeightSet>) -> WeightPolicy {
        match stored {
            Some(ws) if ws.custom_weights_enabled => WeightPolicy::Custom(ws),
            _ => WeightPolicy::Preset(strategy),
        }
    }

    /// Concrete weights to score with. Custom weights are validated here.
    pub fn weights(&self) -> Result<WeightSet, WeightError> {
        match self {
            WeightPolicy::Preset(s) => Ok(s.weights()),
            WeightPolicy::Custom(ws) => {
                ws.validate()?;
                Ok(*ws)
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            WeightPolicy::Preset(s) => s.name().to_string(),
            WeightPolicy::Custom(_) => "custom".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for s in Strategy::ALL {
            assert!(s.weights().validate().is_ok(), "{s} preset invalid");
            assert!(!s.weights().custom_weights_enabled);
        }
    }

    #[test]
    fn preset_table() {
        let w = Strategy::FastestWins.weights();
        assert_eq!(
            (w.urgency_weight, w.importance_weight, w.effort_weight, w.blocking_weight),
            (0.15, 0.15, 0.60, 0.10)
        );
        let w = Strategy::DeadlineDriven.weights();
        assert_eq!(w.urgency_weight, 0.60);
    }

    #[test]
    fn strategy_parses_names() {
        assert_eq!("smart_balance".parse::<Strategy>().unwrap(), Strategy::SmartBalance);
        assert_eq!("High-Impact".parse::<Strategy>().unwrap(), Strategy::HighImpact);
        assert!("random".parse::<Strategy>().is_err());
    }

    #[test]
    fn validate_accepts_exact_sum() {
        assert!(WeightSet::custom(0.3, 0.3, 0.2, 0.2).validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_sum() {
        let err = WeightSet::custom(0.3, 0.3, 0.2, 0.1).validate().unwrap_err();
        assert!(matches!(err, WeightError::BadSum { .. }));
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        let err = WeightSet::custom(1.2, -0.2, 0.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, WeightError::Negative { name: "importance_weight", .. }));

        let err = WeightSet::custom(f64::NAN, 0.5, 0.5, 0.0).validate().unwrap_err();
        assert!(matches!(err, WeightError::NonFinite { .. }));
    }

    #[test]
    fn normalized_sums_to_one() {
        let w = WeightSet::custom(0.3, 0.3, 0.2, 0.1).normalized();
        assert!(w.validate().is_ok());
        assert!(w.custom_weights_enabled);
        assert!((w.urgency_weight - 0.3 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn normalized_zero_sum_falls_back() {
        let w = WeightSet::custom(0.0, 0.0, 0.0, 0.0).normalized();
        assert!(w.validate().is_ok());
    }

    #[test]
    fn resolve_prefers_preset_unless_custom_enabled() {
        let mut stored = WeightSet::new(0.7, 0.1, 0.1, 0.1);
        assert_eq!(
            WeightPolicy::resolve(Strategy::HighImpact, Some(stored)),
            WeightPolicy::Preset(Strategy::HighImpact)
        );
        stored.custom_weights_enabled = true;
        assert_eq!(
            WeightPolicy::resolve(Strategy::HighImpact, Some(stored)),
            WeightPolicy::Custom(stored)
        );
        assert_eq!(
            WeightPolicy::resolve(Strategy::FastestWins, None),
            WeightPolicy::Preset(Strategy::FastestWins)
        );
    }

    #[test]
    fn combine_is_weighted_sum() {
        let w = Strategy::SmartBalance.weights();
        let s = FactorScores {
            urgency: 1.0,
            importance: 0.5,
            effort: 0.0,
            blocking: 1.0,
        };
        assert!((w.combine(&s) - (0.3 + 0.15 + 0.2)).abs() < 1e-12);
    }
}
