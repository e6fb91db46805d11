// src/io/demand.rs

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::rng::SimRng;

/// Weekday of day 0 (Monday = 0). Synthetic series start on a Sunday, 1 January.
const START_WEEKDAY: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalSize {
    Small,
    Medium,
    Large,
}

impl FromStr for HospitalSize {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(HospitalSize::Small),
            "medium" => Ok(HospitalSize::Medium),
            "large" => Ok(HospitalSize::Large),
            other => Err(SimError::invalid("hospital_size", format!("unknown size {other}"))),
        }
    }
}

/// Demand shapes of the synthetic bank. Each maps onto one category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandArchetype {
    /// A: high volume, stable, mild yearly season.
    StableSeasonal,
    /// B: low volume with many zero days.
    Intermittent,
    /// C: weekday high, weekend low.
    WeeklyPattern,
    /// D: linear trend or one step change.
    Trend,
    /// E: normal usage with rare multi-day spikes.
    Burst,
}

impl DemandArchetype {
    pub const ALL: [DemandArchetype; 5] = [
        DemandArchetype::StableSeasonal,
        DemandArchetype::Intermittent,
        DemandArchetype::WeeklyPattern,
        DemandArchetype::Trend,
        DemandArchetype::Burst,
    ];

    pub fn category(&self) -> &'static str {
        match self {
            DemandArchetype::StableSeasonal => "A",
            DemandArchetype::Intermittent => "B",
            DemandArchetype::WeeklyPattern => "C",
            DemandArchetype::Trend => "D",
            DemandArchetype::Burst => "E",
        }
    }

    fn base_demand(&self, size: HospitalSize) -> f64 {
        let (small, medium, large) = match self {
            DemandArchetype::StableSeasonal => (20.0, 50.0, 120.0),
            DemandArchetype::Intermittent => (1.5, 3.0, 6.0),
            DemandArchetype::WeeklyPattern => (15.0, 35.0, 80.0),
            DemandArchetype::Trend => (25.0, 60.0, 140.0),
            DemandArchetype::Burst => (18.0, 45.0, 100.0),
        };
        match size {
            HospitalSize::Small => small,
            HospitalSize::Medium => medium,
            HospitalSize::Large => large,
        }
    }
}

impl fmt::Display for DemandArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

impl FromStr for DemandArchetype {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        DemandArchetype::ALL
            .into_iter()
            .find(|a| a.category() == s)
            .ok_or_else(|| SimError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    LinearUp,
    LinearDown,
    StepUp,
    StepDown,
}

impl TrendKind {
    const ALL: [TrendKind; 4] = [
        TrendKind::LinearUp,
        TrendKind::LinearDown,
        TrendKind::StepUp,
        TrendKind::StepDown,
    ];

    fn is_step(&self) -> bool {
        matches!(self, TrendKind::StepUp | TrendKind::StepDown)
    }
}

/// Shape parameters drawn once per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "archetype", rename_all = "snake_case")]
pub enum ArchetypeParams {
    StableSeasonal {
        season_amp: f64,
        phase: f64,
    },
    Intermittent {
        zero_prob: f64,
    },
    WeeklyPattern {
        weekday_multiplier: f64,
        weekend_multiplier: f64,
    },
    Trend {
        kind: TrendKind,
        rate: f64,
        step_day: Option<u32>,
        step_multiplier: f64,
    },
    Burst {
        burst_prob: f64,
        burst_multiplier: f64,
    },
}

impl ArchetypeParams {
    /// Draws scenario-level parameters for `archetype` over a `days`-long horizon.
    pub fn draw(archetype: DemandArchetype, days: usize, rng: &mut SimRng) -> Self {
        match archetype {
            DemandArchetype::StableSeasonal => ArchetypeParams::StableSeasonal {
                season_amp: 0.1 + 0.1 * rng.uniform(),
                phase: rng.uniform(),
            },
            DemandArchetype::Intermittent => ArchetypeParams::Intermittent {
                zero_prob: 0.3 + 0.3 * rng.uniform(),
            },
            DemandArchetype::WeeklyPattern => ArchetypeParams::WeeklyPattern {
                weekday_multiplier: 1.3 + 0.4 * rng.uniform(),
                weekend_multiplier: 0.5 + 0.2 * rng.uniform(),
            },
            DemandArchetype::Trend => {
                let kind = *rng.choose(&TrendKind::ALL).unwrap_or(&TrendKind::LinearUp);
                let rate = 0.0005 + 0.001 * rng.uniform();
                let step_day = kind.is_step().then(|| {
                    if days > 400 {
                        rng.int_range(200, days as i64 - 200) as u32
                    } else {
                        (days / 2) as u32
                    }
                });
                ArchetypeParams::Trend {
                    kind,
                    rate,
                    step_day,
                    step_multiplier: 1.3 + 0.4 * rng.uniform(),
                }
            }
            DemandArchetype::Burst => ArchetypeParams::Burst {
                burst_prob: 0.01 + 0.03 * rng.uniform(),
                burst_multiplier: 2.5 + 1.5 * rng.uniform(),
            },
        }
    }

    pub fn archetype(&self) -> DemandArchetype {
        match self {
            ArchetypeParams::StableSeasonal { .. } => DemandArchetype::StableSeasonal,
            ArchetypeParams::Intermittent { .. } => DemandArchetype::Intermittent,
            ArchetypeParams::WeeklyPattern { .. } => DemandArchetype::WeeklyPattern,
            ArchetypeParams::Trend { .. } => DemandArchetype::Trend,
            ArchetypeParams::Burst { .. } => DemandArchetype::Burst,
        }
    }
}

/// Generates a demand schedule where every day has the exact same amount.
/// Handy for engine tests whose expected orders can be worked out by hand.
pub fn generate_constant_demand(days: usize, value: u32) -> Vec<u32> {
    vec![value; days]
}

/// Generates a demand schedule from a Normal distribution, clamped at zero.
pub fn generate_normal_demand(days: usize, mean: f64, std_dev: f64, rng: &mut SimRng) -> Vec<u32> {
    (0..days).map(|_| to_units(rng.gaussian(mean, std_dev).round())).collect()
}

/// Generates `days` of synthetic demand for one archetype at one hospital size.
pub fn generate_archetype_demand(
    params: &ArchetypeParams,
    size: HospitalSize,
    days: usize,
    rng: &mut SimRng,
) -> Vec<u32> {
    let base = params.archetype().base_demand(size);
    let mut schedule = Vec::with_capacity(days);

    match *params {
        ArchetypeParams::StableSeasonal { season_amp, phase } => {
            for day in 0..days {
                let seasonal = 1.0 + season_amp * (2.0 * PI * (day_of_year(day) / 365.25 + phase)).sin();
                let lambda = base * seasonal * (1.0 + 0.05 * rng.gaussian(0.0, 1.0));
                schedule.push(to_units(rng.gaussian(lambda, lambda * 0.15)));
            }
        }
        ArchetypeParams::Intermittent { zero_prob } => {
            for _ in 0..days {
                if rng.uniform() < zero_prob {
                    schedule.push(0);
                    continue;
                }
                let lambda = base * (0.8 + 0.4 * rng.uniform());
                schedule.push(to_units(rng.gaussian(lambda, lambda * 0.5)));
            }
        }
        ArchetypeParams::WeeklyPattern {
            weekday_multiplier,
            weekend_multiplier,
        } => {
            for day in 0..days {
                let weekend = (START_WEEKDAY + day as u32) % 7 >= 5;
                let multiplier = if weekend {
                    weekend_multiplier
                } else {
                    weekday_multiplier
                };
                let lambda = base * multiplier * (0.9 + 0.2 * rng.uniform());
                schedule.push(to_units(rng.gaussian(lambda, lambda * 0.2)));
            }
        }
        ArchetypeParams::Trend {
            kind,
            rate,
            step_day,
            step_multiplier,
        } => {
            for day in 0..days {
                let mut level = base;
                match kind {
                    TrendKind::LinearUp => level *= 1.0 + rate * day as f64,
                    TrendKind::LinearDown => level *= 1.0 - rate * day as f64,
                    TrendKind::StepUp | TrendKind::StepDown => {
                        if step_day.is_some_and(|s| day as u32 >= s) {
                            if kind == TrendKind::StepUp {
                                level *= step_multiplier;
                            } else {
                                level /= step_multiplier;
                            }
                        }
                    }
                }
                level *= 1.0 + 0.1 * (2.0 * PI * day_of_year(day) / 365.25).sin();
                let lambda = level * (0.95 + 0.1 * rng.uniform());
                schedule.push(to_units(rng.gaussian(lambda, lambda * 0.18)));
            }
        }
        ArchetypeParams::Burst {
            burst_prob,
            burst_multiplier,
        } => {
            let mut burst_remaining: i64 = 0;
            for _ in 0..days {
                if burst_remaining <= 0 && rng.uniform() < burst_prob {
                    burst_remaining = rng.int_range(1, 3);
                }
                let multiplier = if burst_remaining > 0 {
                    burst_remaining -= 1;
                    burst_multiplier
                } else {
                    1.0
                };
                let lambda = base * multiplier * (0.9 + 0.2 * rng.uniform());
                schedule.push(to_units(rng.gaussian(lambda, lambda * 0.25)));
            }
        }
    }

    schedule
}

fn day_of_year(day: usize) -> f64 {
    (day % 365 + 1) as f64
}

/// Truncates toward zero and clamps negatives, the way unit counts are taken from draws.
fn to_units(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        0
    } else {
        value.min(f64::from(u32::MAX)) as u32
    }
}

/// Summary statistics of a demand series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandStats {
    pub days: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// std / mean, zero for an all-zero series.
    pub cv: f64,
    pub pct_zero: f64,
    pub max: f64,
}

impl DemandStats {
    pub fn from_units(series: &[u32]) -> Self {
        let values: Vec<f64> = series.iter().map(|&u| f64::from(u)).collect();
        Self::from_values(&values)
    }

    pub fn from_values(series: &[f64]) -> Self {
        let days = series.len();
        if days == 0 {
            return Self {
                days,
                mean: 0.0,
                std_dev: 0.0,
                cv: 0.0,
                pct_zero: 0.0,
                max: 0.0,
            };
        }
        let n = days as f64;
        let mean = series.iter().sum::<f64>() / n;
        let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };
        let zeros = series.iter().filter(|v| **v == 0.0).count();
        let max = series.iter().copied().fold(f64::MIN, f64::max);

        Self {
            days,
            mean,
            std_dev,
            cv,
            pct_zero: zeros as f64 / n * 100.0,
            max,
        }
    }
}
