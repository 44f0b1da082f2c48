//! Trajectory integration over the fixed horizon.
//!
//! The baseline path drifts from the year-0 snapshot with fixed secular trends; the
//! projected path applies the effect schedule on top of it. Both are clamped to the metric
//! ranges.

use super::baseline::{economic_index_for, BaselineSnapshot};
use super::domain::{Metric, MetricVector, YearlyMetrics, HORIZON_YEARS};
use super::effects::EffectSchedule;

/// Annual relative decline of mortality absent new interventions.
pub const MORTALITY_TREND: f64 = 0.01;
/// Annual relative decline of disease prevalence.
pub const DISEASE_TREND: f64 = 0.005;
/// Life expectancy gained per year of background progress.
pub const LIFE_EXPECTANCY_TREND: f64 = 0.15;
/// Share of the remaining healthcare access gap closed per year.
pub const ACCESS_TREND: f64 = 0.01;
/// Annual GDP per capita growth feeding the economic index.
pub const GDP_GROWTH: f64 = 0.02;

/// Business-as-usual value of `metric` after `year` years (year 0 is the snapshot).
pub fn baseline_value(snapshot: &BaselineSnapshot, metric: Metric, year: usize) -> f64 {
    let start = snapshot.metrics[metric];
    let elapsed = year as i32;

    let drifted = match metric {
        Metric::Mortality => start * (1.0 - MORTALITY_TREND).powi(elapsed),
        Metric::DiseasePrevalence => start * (1.0 - DISEASE_TREND).powi(elapsed),
        Metric::LifeExpectancy => start + LIFE_EXPECTANCY_TREND * year as f64,
        Metric::HealthcareAccess => {
            let (_, upper) = metric.bounds();
            let gap = (upper - start).max(0.0);
            start + gap * (1.0 - (1.0 - ACCESS_TREND).powi(elapsed))
        }
        Metric::EconomicIndex => {
            if year == 0 {
                start
            } else {
                economic_index_for(snapshot.gdp_per_capita * (1.0 + GDP_GROWTH).powi(elapsed))
            }
        }
    };

    metric.clamp(drifted)
}

pub fn baseline_metrics(snapshot: &BaselineSnapshot, year: usize) -> MetricVector {
    MetricVector::from_fn(|metric| baseline_value(snapshot, metric, year))
}

/// Produce the ordered yearly series for years 1..=HORIZON_YEARS.
pub fn integrate(snapshot: &BaselineSnapshot, schedule: &EffectSchedule) -> Vec<YearlyMetrics> {
    (1..=HORIZON_YEARS)
        .map(|year| {
            let baseline = baseline_metrics(snapshot, year);
            let projected = if schedule.is_empty() {
                baseline
            } else {
                MetricVector::from_fn(|metric| {
                    metric.clamp(schedule.apply(metric, year, baseline[metric]))
                })
            };
            YearlyMetrics::new(year as u8, &baseline, &projected)
        })
        .collect()
}
