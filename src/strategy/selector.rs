// src/strategy/selector.rs

//! Picks an ordering policy from a SKU's demand and supply characteristics.

use std::fmt;

use serde::Serialize;

use crate::simulation::config::Criticality;

/// Cadences this long or longer mean stock is exchanged, not forecast.
pub const EXCHANGE_CADENCE_DAYS: u32 = 14;

/// Days of usage a single MOQ may cover before it counts as over-ordering.
pub const MOQ_COVERAGE_LIMIT_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyChoice {
    ParDriven,
    ForecastDriven,
    ForecastCapped,
}

impl PolicyChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyChoice::ParDriven => "par_driven",
            PolicyChoice::ForecastDriven => "forecast_driven",
            PolicyChoice::ForecastCapped => "forecast_capped",
        }
    }
}

impl fmt::Display for PolicyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to [`select_ordering_policy`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyInputs {
    pub avg_daily_usage: f64,
    /// Coefficient of variation (std / mean) of daily demand.
    pub cv_demand: f64,
    pub shelf_life_days: u32,
    pub moq_units: Option<u32>,
    pub criticality: Criticality,
    pub exchange_cadence_days: Option<u32>,
    /// Return `ForecastCapped` instead of `ForecastDriven`.
    pub par_cap_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectorThresholds {
    /// Below this daily usage a SKU is low volume.
    pub min_daily_usage: f64,
    /// Above this CV demand is highly intermittent.
    pub high_cv: f64,
    /// Below this many days shelf life is short.
    pub short_shelf_life_days: u32,
}

impl Default for SelectorThresholds {
    fn default() -> Self {
        Self {
            min_daily_usage: 5.0,
            high_cv: 1.0,
            short_shelf_life_days: 180,
        }
    }
}

/// Derived flags the selection rules are written in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandCharacteristics {
    pub avg_daily_usage: f64,
    pub cv_demand: f64,
    pub is_low_volume: bool,
    pub is_high_intermittency: bool,
    pub is_short_shelf_life: bool,
    pub is_exchange_based: bool,
    pub is_critical: bool,
    pub moq_forces_overorder: bool,
}

impl DemandCharacteristics {
    pub fn classify(inputs: &PolicyInputs, thresholds: &SelectorThresholds) -> Self {
        Self {
            avg_daily_usage: inputs.avg_daily_usage,
            cv_demand: inputs.cv_demand,
            is_low_volume: inputs.avg_daily_usage < thresholds.min_daily_usage,
            is_high_intermittency: inputs.cv_demand > thresholds.high_cv,
            is_short_shelf_life: inputs.shelf_life_days < thresholds.short_shelf_life_days,
            is_exchange_based: inputs
                .exchange_cadence_days
                .is_some_and(|d| d >= EXCHANGE_CADENCE_DAYS),
            is_critical: inputs.criticality == Criticality::Critical,
            moq_forces_overorder: inputs
                .moq_units
                .is_some_and(|moq| inputs.avg_daily_usage * MOQ_COVERAGE_LIMIT_DAYS < f64::from(moq)),
        }
    }
}

/// Chooses between par-driven and forecast-driven replenishment.
///
/// Rules, first match wins:
/// 1. exchange cadence of 14+ days -> par-driven
/// 2. low volume and high intermittency -> par-driven if critical or if the
///    MOQ covers more than 30 days of usage
/// 3. otherwise low volume and short shelf life -> par-driven
/// 4. forecast-driven, capped when the par cap is enabled
pub fn select_ordering_policy(inputs: &PolicyInputs, thresholds: &SelectorThresholds) -> PolicyChoice {
    let c = DemandCharacteristics::classify(inputs, thresholds);

    let par_driven = if c.is_exchange_based {
        true
    } else if c.is_low_volume && c.is_high_intermittency {
        c.is_critical || c.moq_forces_overorder
    } else {
        c.is_low_volume && c.is_short_shelf_life
    };

    if par_driven {
        PolicyChoice::ParDriven
    } else if inputs.par_cap_enabled {
        PolicyChoice::ForecastCapped
    } else {
        PolicyChoice::ForecastDriven
    }
}

/// A selection together with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRationale {
    pub policy: PolicyChoice,
    pub reasons: Vec<String>,
    pub characteristics: DemandCharacteristics,
}

pub fn explain_policy(inputs: &PolicyInputs, thresholds: &SelectorThresholds) -> PolicyRationale {
    let policy = select_ordering_policy(inputs, thresholds);
    let c = DemandCharacteristics::classify(inputs, thresholds);

    let mut reasons = Vec::new();
    if policy == PolicyChoice::ParDriven {
        if c.is_exchange_based {
            reasons.push("exchange-based replenishment".to_string());
        }
        if c.is_low_volume && c.is_high_intermittency {
            reasons.push("low volume with high intermittency".to_string());
            if c.moq_forces_overorder {
                reasons.push("MOQ exceeds 30 days of usage".to_string());
            }
        }
        if c.is_low_volume && c.is_short_shelf_life {
            reasons.push("low volume with short shelf life".to_string());
        }
        if c.is_critical && c.is_low_volume {
            reasons.push("critical item at low volume".to_string());
        }
    } else {
        reasons.push("high volume or low intermittency".to_string());
        if policy == PolicyChoice::ForecastCapped {
            reasons.push("forecast orders capped at par level".to_string());
        }
    }

    PolicyRationale {
        policy,
        reasons,
        characteristics: c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn inputs(avg: f64, cv: f64, shelf: u32) -> PolicyInputs {
        PolicyInputs {
            avg_daily_usage: avg,
            cv_demand: cv,
            shelf_life_days: shelf,
            moq_units: None,
            criticality: Criticality::Routine,
            exchange_cadence_days: None,
            par_cap_enabled: false,
        }
    }

    #[rstest]
    #[case(inputs(50.0, 0.2, 730), PolicyChoice::ForecastDriven)]
    #[case(inputs(2.0, 1.5, 730), PolicyChoice::ForecastDriven)]
    #[case(inputs(2.0, 0.5, 90), PolicyChoice::ParDriven)]
    #[case(inputs(20.0, 0.5, 90), PolicyChoice::ForecastDriven)]
    #[case(PolicyInputs { criticality: Criticality::Critical, ..inputs(2.0, 1.5, 730) }, PolicyChoice::ParDriven)]
    #[case(PolicyInputs { moq_units: Some(200), ..inputs(2.0, 1.5, 730) }, PolicyChoice::ParDriven)]
    #[case(PolicyInputs { moq_units: Some(50), ..inputs(2.0, 1.5, 730) }, PolicyChoice::ForecastDriven)]
    #[case(PolicyInputs { exchange_cadence_days: Some(14), ..inputs(80.0, 0.1, 730) }, PolicyChoice::ParDriven)]
    #[case(PolicyInputs { exchange_cadence_days: Some(7), ..inputs(80.0, 0.1, 730) }, PolicyChoice::ForecastDriven)]
    #[case(PolicyInputs { par_cap_enabled: true, ..inputs(80.0, 0.1, 730) }, PolicyChoice::ForecastCapped)]
    fn selection_rules(#[case] input: PolicyInputs, #[case] expected: PolicyChoice) {
        assert_eq!(
            select_ordering_policy(&input, &SelectorThresholds::default()),
            expected
        );
    }

    #[test]
    fn intermittent_branch_shadows_short_shelf_life() {
        // low volume + intermittent + short shelf life but neither critical nor MOQ-bound
        let choice = select_ordering_policy(&inputs(2.0, 1.5, 90), &SelectorThresholds::default());
        assert_eq!(choice, PolicyChoice::ForecastDriven);
    }

    #[test]
    fn selection_is_repeatable() {
        let input = PolicyInputs {
            moq_units: Some(120),
            ..inputs(3.0, 1.2, 150)
        };
        let thresholds = SelectorThresholds::default();
        let first = select_ordering_policy(&input, &thresholds);
        for _ in 0..100 {
            assert_eq!(select_ordering_policy(&input, &thresholds), first);
        }
    }

    #[test]
    fn rationale_lists_reasons() {
        let input = PolicyInputs {
            criticality: Criticality::Critical,
            ..inputs(1.0, 2.0, 90)
        };
        let rationale = explain_policy(&input, &SelectorThresholds::default());
        assert_eq!(rationale.policy, PolicyChoice::ParDriven);
        assert!(rationale.characteristics.is_low_volume);
        assert!(rationale
            .reasons
            .iter()
            .any(|r| r == "low volume with high intermittency"));
        assert!(rationale.reasons.iter().any(|r| r == "critical item at low volume"));
    }
}
