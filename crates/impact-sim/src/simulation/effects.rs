//! Intervention effect model.
//!
//! Every category carries a fixed profile: the fraction of achievable improvement on each
//! metric at intensity 100 once fully adopted (year 5, standard strictness). A single
//! intervention's fraction is
//!
//! ```text
//! profile[metric] * intensity_response(intensity) * ramp(year) * strictness
//! ```
//!
//! and fractions of several interventions on the same metric compose as
//! `1 - prod(1 - f)`, so the combined fraction stays below 1.

use super::domain::{
    Intervention, InterventionCategory, Metric, MetricVector, ModelStrictness, HORIZON_YEARS,
    MAX_INTENSITY,
};

const INTENSITY_CURVATURE: f64 = 2.0;
const ADOPTION_TIME_CONSTANT: f64 = 1.5;

impl InterventionCategory {
    /// Maximum improvement fractions at full intensity and full adoption.
    pub const fn effect_profile(self) -> MetricVector {
        match self {
            //                        mortality  life exp  disease  access  economic
            Self::Medical => MetricVector::new(0.22, 0.08, 0.25, 0.05, 0.02),
            Self::Infrastructure => MetricVector::new(0.08, 0.04, 0.12, 0.20, 0.15),
            Self::Policy => MetricVector::new(0.05, 0.03, 0.10, 0.18, 0.04),
            Self::Environment => MetricVector::new(0.06, 0.03, 0.18, 0.02, 0.06),
        }
    }

    /// The two metrics each category moves the most.
    pub const fn primary_targets(self) -> [Metric; 2] {
        match self {
            Self::Medical => [Metric::Mortality, Metric::DiseasePrevalence],
            Self::Infrastructure => [Metric::EconomicIndex, Metric::HealthcareAccess],
            Self::Policy => [Metric::HealthcareAccess, Metric::DiseasePrevalence],
            Self::Environment => [Metric::DiseasePrevalence, Metric::EconomicIndex],
        }
    }
}

/// Saturating response to intensity: 0 at 0, 1 at 100, non-decreasing in between.
pub fn intensity_response(intensity: u8) -> f64 {
    let share = f64::from(intensity.min(MAX_INTENSITY)) / f64::from(MAX_INTENSITY);
    (1.0 - (-INTENSITY_CURVATURE * share).exp()) / (1.0 - (-INTENSITY_CURVATURE).exp())
}

/// Adoption lag: share of the full effect reached by `year` (0 before start, 1 at the horizon).
pub fn ramp(year: usize) -> f64 {
    let year = year.min(HORIZON_YEARS) as f64;
    let horizon = HORIZON_YEARS as f64;
    (1.0 - (-year / ADOPTION_TIME_CONSTANT).exp())
        / (1.0 - (-horizon / ADOPTION_TIME_CONSTANT).exp())
}

/// Apply an improvement fraction to a baseline value in the metric's improving direction.
pub fn apply_improvement(metric: Metric, baseline_value: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return baseline_value;
    }

    if metric.lower_is_better() {
        baseline_value * (1.0 - fraction)
    } else {
        let (_, upper) = metric.bounds();
        baseline_value + fraction * (upper - baseline_value).max(0.0)
    }
}

/// Per-year improvement fractions of one active intervention.
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionEffect {
    pub id: String,
    pub name: String,
    pub category: InterventionCategory,
    pub intensity: u8,
    yearly: [MetricVector; HORIZON_YEARS],
}

impl InterventionEffect {
    pub fn new(intervention: &Intervention, strictness: ModelStrictness) -> Self {
        let profile = intervention.category.effect_profile();
        let response = intensity_response(intervention.intensity);
        let multiplier = strictness.effect_multiplier();

        let mut yearly = [MetricVector::zero(); HORIZON_YEARS];
        for (index, fractions) in yearly.iter_mut().enumerate() {
            let adoption = ramp(index + 1);
            *fractions = MetricVector::from_fn(|metric| {
                profile[metric] * response * adoption * multiplier
            });
        }

        Self {
            id: intervention.id.clone(),
            name: intervention.name.clone(),
            category: intervention.category,
            intensity: intervention.intensity,
            yearly,
        }
    }

    /// Fractions for `year` in 1..=HORIZON_YEARS.
    pub fn fractions(&self, year: usize) -> &MetricVector {
        &self.yearly[year.clamp(1, HORIZON_YEARS) - 1]
    }

    pub fn final_year(&self) -> &MetricVector {
        self.fractions(HORIZON_YEARS)
    }
}

/// Cumulative effect of every active intervention, per metric and year.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSchedule {
    effects: Vec<InterventionEffect>,
    combined: [MetricVector; HORIZON_YEARS],
}

impl EffectSchedule {
    pub fn none() -> Self {
        Self {
            effects: Vec::new(),
            combined: [MetricVector::zero(); HORIZON_YEARS],
        }
    }

    /// Build the schedule for the active subset of `interventions`.
    pub fn build<'a, I>(interventions: I, strictness: ModelStrictness) -> Self
    where
        I: IntoIterator<Item = &'a Intervention>,
    {
        let effects: Vec<InterventionEffect> = interventions
            .into_iter()
            .filter(|intervention| intervention.active)
            .map(|intervention| InterventionEffect::new(intervention, strictness))
            .collect();

        let mut combined = [MetricVector::zero(); HORIZON_YEARS];
        for (index, totals) in combined.iter_mut().enumerate() {
            *totals = MetricVector::from_fn(|metric| {
                let remaining: f64 = effects
                    .iter()
                    .map(|effect| 1.0 - effect.fractions(index + 1)[metric])
                    .product();
                1.0 - remaining
            });
        }

        Self { effects, combined }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effects(&self) -> &[InterventionEffect] {
        &self.effects
    }

    /// Combined improvement fraction for `metric` in `year` (1..=HORIZON_YEARS).
    pub fn combined(&self, metric: Metric, year: usize) -> f64 {
        if year == 0 {
            return 0.0;
        }
        self.combined[year.min(HORIZON_YEARS) - 1][metric]
    }

    /// Projected value before range clamping.
    pub fn apply(&self, metric: Metric, year: usize, baseline_value: f64) -> f64 {
        apply_improvement(metric, baseline_value, self.combined(metric, year))
    }

    /// Signed change from the baseline-path value for `metric` in `year`.
    pub fn delta(&self, metric: Metric, year: usize, baseline_value: f64) -> f64 {
        self.apply(metric, year, baseline_value) - baseline_value
    }
}
