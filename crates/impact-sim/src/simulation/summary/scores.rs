use super::super::domain::{InterventionContribution, Metric, MetricVector, YearlyMetrics};
use super::super::effects::EffectSchedule;

/// Economic index-point-years expected per unit (intensity 100) of investment.
pub const COST_PER_INTENSITY_UNIT: f64 = 10.0;

const IMPACT_SCORE_STEEPNESS: f64 = 3.0;

/// Deaths averted over the horizon with population held fixed at the resolved value.
pub fn lives_saved(trajectory: &[YearlyMetrics], population: u64) -> i64 {
    let population = population as f64;
    let averted: f64 = trajectory
        .iter()
        .map(|year| (year.mortality_baseline - year.mortality_rate) / 1_000.0 * population)
        .sum();

    averted.round() as i64
}

/// Cumulative economic index gain per normalized unit of intervention intensity.
pub fn economic_roi(trajectory: &[YearlyMetrics], schedule: &EffectSchedule) -> f64 {
    let investment: f64 = schedule
        .effects()
        .iter()
        .map(|effect| f64::from(effect.intensity) / 100.0)
        .sum::<f64>()
        * COST_PER_INTENSITY_UNIT;

    if investment <= 0.0 {
        return 0.0;
    }

    let gain: f64 = trajectory
        .iter()
        .map(|year| year.economic_index - year.economic_baseline)
        .sum();

    round_to(gain.max(0.0) / investment, 2)
}

/// Final-year improvement per metric, normalized by the room each metric had to improve.
pub fn normalized_improvement(year: &YearlyMetrics) -> MetricVector {
    MetricVector::from_fn(|metric| {
        let baseline = year.baseline(metric);
        let room = if metric.lower_is_better() {
            baseline
        } else {
            metric.bounds().1 - baseline
        };

        if room > 0.0 {
            year.improvement(metric) / room
        } else {
            0.0
        }
    })
}

/// Composite 0-100 effectiveness rating of the final projected year.
pub fn impact_score(trajectory: &[YearlyMetrics]) -> f64 {
    let Some(final_year) = trajectory.last() else {
        return 0.0;
    };

    let weighted = normalized_improvement(final_year).weighted_sum();
    let score = 100.0 * (1.0 - (-IMPACT_SCORE_STEEPNESS * weighted).exp());
    round_to(score.clamp(0.0, 100.0), 1)
}

/// Share of final-year weighted improvement attributable to each active intervention.
pub fn contributions(schedule: &EffectSchedule) -> Vec<InterventionContribution> {
    let effects = schedule.effects();
    if effects.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f64> = effects
        .iter()
        .map(|effect| effect.final_year().weighted_sum())
        .collect();
    let total: f64 = raw.iter().sum();

    let mut shares: Vec<f64> = if total > 0.0 {
        raw.iter()
            .map(|value| round_to(100.0 * value / total, 1))
            .collect()
    } else {
        let even = round_to(100.0 / effects.len() as f64, 1);
        vec![even; effects.len()]
    };

    let residue = 100.0 - shares.iter().sum::<f64>();
    if let Some(largest) = largest_index(&shares) {
        shares[largest] = round_to(shares[largest] + residue, 1);
    }

    effects
        .iter()
        .zip(shares)
        .map(|(effect, score)| InterventionContribution {
            id: effect.id.clone(),
            name: effect.name.clone(),
            category: effect.category,
            score,
        })
        .collect()
}

fn largest_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, value) in values.iter().enumerate() {
        if best.map_or(true, |current| *value > values[current]) {
            best = Some(index);
        }
    }
    best
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Final-year change of `metric` relative to its baseline value, in percent.
pub(crate) fn percent_change(year: &YearlyMetrics, metric: Metric) -> f64 {
    let baseline = year.baseline(metric);
    if baseline.abs() < f64::EPSILON {
        return 0.0;
    }
    100.0 * (year.projected(metric) - baseline) / baseline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::catalog::InterventionCatalog;
    use crate::simulation::domain::{Intervention, ModelStrictness};

    fn active(id: &str, intensity: u8) -> Intervention {
        InterventionCatalog::builtin()
            .get(id)
            .cloned()
            .expect("catalog intervention")
            .with_intensity(intensity)
            .activated()
    }

    fn year(baseline: MetricVector, projected: MetricVector) -> YearlyMetrics {
        YearlyMetrics::new(5, &baseline, &projected)
    }

    #[test]
    fn lives_saved_sums_mortality_differential() {
        let baseline = MetricVector::new(10.0, 70.0, 20.0, 50.0, 40.0);
        let projected = MetricVector::new(9.0, 70.0, 20.0, 50.0, 40.0);
        let trajectory = vec![year(baseline, projected), year(baseline, projected)];

        assert_eq!(lives_saved(&trajectory, 1_000_000), 2_000);
    }

    #[test]
    fn lives_saved_can_be_negative() {
        let baseline = MetricVector::new(10.0, 70.0, 20.0, 50.0, 40.0);
        let projected = MetricVector::new(10.5, 70.0, 20.0, 50.0, 40.0);

        assert_eq!(lives_saved(&[year(baseline, projected)], 10_000), -5);
    }

    #[test]
    fn roi_is_zero_without_investment() {
        let baseline = MetricVector::new(10.0, 70.0, 20.0, 50.0, 40.0);
        let trajectory = vec![year(baseline, baseline)];

        assert_eq!(economic_roi(&trajectory, &EffectSchedule::none()), 0.0);

        let idle = active("wash_infra", 0);
        let schedule = EffectSchedule::build([&idle], ModelStrictness::Standard);
        assert_eq!(economic_roi(&trajectory, &schedule), 0.0);
    }

    #[test]
    fn roi_never_goes_negative() {
        let baseline = MetricVector::new(10.0, 70.0, 20.0, 50.0, 40.0);
        let worse = MetricVector::new(10.0, 70.0, 20.0, 50.0, 35.0);
        let infra = active("wash_infra", 100);
        let schedule = EffectSchedule::build([&infra], ModelStrictness::Standard);

        assert_eq!(economic_roi(&[year(baseline, worse)], &schedule), 0.0);
    }

    #[test]
    fn impact_score_is_zero_for_identical_paths() {
        let baseline = MetricVector::new(10.0, 70.0, 20.0, 50.0, 40.0);
        assert_eq!(impact_score(&[year(baseline, baseline)]), 0.0);
        assert_eq!(impact_score(&[]), 0.0);
    }

    #[test]
    fn contributions_are_normalized_to_one_hundred() {
        let vaccines = active("vax_expanded", 80);
        let water = active("wash_infra", 35);
        let education = active("education", 10);
        let schedule =
            EffectSchedule::build([&vaccines, &water, &education], ModelStrictness::Standard);

        let shares = contributions(&schedule);

        assert_eq!(shares.len(), 3);
        let total: f64 = shares.iter().map(|share| share.score).sum();
        assert!((total - 100.0).abs() < 1e-6, "total {total}");
        assert!(shares[0].score > shares[2].score);
        assert_eq!(shares[1].id, "wash_infra");
    }

    #[test]
    fn idle_interventions_split_evenly() {
        let first = active("vax_expanded", 0);
        let second = active("telehealth", 0);
        let third = active("education", 0);
        let schedule = EffectSchedule::build([&first, &second, &third], ModelStrictness::Standard);

        let shares = contributions(&schedule);

        let total: f64 = shares.iter().map(|share| share.score).sum();
        assert!((total - 100.0).abs() < 1e-6);
        assert!(shares.iter().all(|share| share.score >= 33.3));
    }

    #[test]
    fn no_interventions_means_no_contributions() {
        assert!(contributions(&EffectSchedule::none()).is_empty());
    }
}
