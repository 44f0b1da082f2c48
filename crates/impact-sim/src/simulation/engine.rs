use super::baseline::resolve_baseline;
use super::catalog::RegionCatalog;
use super::domain::{
    Intervention, Metric, ModelStrictness, Region, SimulationOptions, SimulationResult,
    HORIZON_YEARS,
};
use super::effects::EffectSchedule;
use super::request::{validate_inputs, InputViolation};
use super::summary::summarize;
use super::trajectory;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid simulation input: {0}")]
    InvalidInput(#[from] InputViolation),
    #[error("simulation produced invalid output: {0}")]
    Internal(#[from] InvariantViolation),
}

/// Output checks that indicate a defect in the model rather than bad input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("expected {expected} projected years, found {found}")]
    HorizonLength { expected: usize, found: usize },
    #[error("year {year} appears out of order")]
    YearOrder { year: u8 },
    #[error("{metric:?} {path} value for year {year} is {value}, outside [{lower}, {upper}]")]
    OutOfRange {
        metric: Metric,
        path: &'static str,
        year: u8,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("impact score {0} is outside [0, 100]")]
    ImpactScore(f64),
    #[error("economic ROI {0} is negative")]
    NegativeRoi(f64),
    #[error("intervention contributions sum to {0} instead of 100")]
    ContributionSum(f64),
    #[error("projected path differs from baseline with no active interventions")]
    PhantomEffect,
}

const CONTRIBUTION_TOLERANCE: f64 = 0.05;

/// Deterministic simulation engine: resolve baseline, build effects, integrate the
/// trajectory, then summarize.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    catalog: Arc<RegionCatalog>,
    options: SimulationOptions,
}

impl SimulationEngine {
    pub fn new(catalog: Arc<RegionCatalog>, options: SimulationOptions) -> Self {
        Self { catalog, options }
    }

    /// Engine over the builtin catalog with standard strictness.
    pub fn standard() -> Self {
        Self::new(RegionCatalog::builtin(), SimulationOptions::default())
    }

    pub fn options(&self) -> SimulationOptions {
        self.options
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn run(
        &self,
        region: &Region,
        interventions: &[Intervention],
    ) -> Result<SimulationResult, SimulationError> {
        self.run_with_strictness(region, interventions, self.options.strictness)
    }

    pub fn run_with_strictness(
        &self,
        region: &Region,
        interventions: &[Intervention],
        strictness: ModelStrictness,
    ) -> Result<SimulationResult, SimulationError> {
        validate_inputs(region, interventions)?;

        let snapshot = resolve_baseline(region, &self.catalog);
        let schedule = EffectSchedule::build(interventions, strictness);
        let trajectory = trajectory::integrate(&snapshot, &schedule);
        let impact = summarize(&snapshot, &trajectory, &schedule);
        let narrative = impact.narrative(&region.name, &snapshot, &trajectory, &schedule);

        let result = SimulationResult {
            region_name: region.name.clone(),
            summary: narrative.summary,
            key_insights: narrative.key_insights,
            recommendations: narrative.recommendations,
            trajectory,
            contributions: impact.contributions,
            impact_score: impact.impact_score,
            lives_saved: impact.lives_saved,
            economic_roi: impact.economic_roi,
            estimated_baseline: snapshot.estimated_baseline(),
        };

        if let Err(violation) = check_invariants(&result, schedule.is_empty()) {
            error!(region = %region.name, %violation, "simulation output failed invariant checks");
            return Err(violation.into());
        }

        debug!(
            region = %result.region_name,
            active = schedule.effects().len(),
            ?strictness,
            lives_saved = result.lives_saved,
            impact_score = result.impact_score,
            "simulation complete"
        );

        Ok(result)
    }
}

/// Reject results that break the trajectory or score invariants.
pub fn check_invariants(
    result: &SimulationResult,
    no_active_interventions: bool,
) -> Result<(), InvariantViolation> {
    if result.trajectory.len() != HORIZON_YEARS {
        return Err(InvariantViolation::HorizonLength {
            expected: HORIZON_YEARS,
            found: result.trajectory.len(),
        });
    }

    for (index, year) in result.trajectory.iter().enumerate() {
        if usize::from(year.year) != index + 1 {
            return Err(InvariantViolation::YearOrder { year: year.year });
        }

        for metric in Metric::ordered() {
            let (lower, upper) = metric.bounds();
            for (path, value) in [
                ("baseline", year.baseline(metric)),
                ("projected", year.projected(metric)),
            ] {
                if !value.is_finite() || value < lower || value > upper {
                    return Err(InvariantViolation::OutOfRange {
                        metric,
                        path,
                        year: year.year,
                        value,
                        lower,
                        upper,
                    });
                }
            }

            if no_active_interventions && year.baseline(metric) != year.projected(metric) {
                return Err(InvariantViolation::PhantomEffect);
            }
        }
    }

    for (label, value) in [
        ("impact score", result.impact_score),
        ("economic ROI", result.economic_roi),
    ] {
        if !value.is_finite() {
            return Err(InvariantViolation::NonFinite(label));
        }
    }

    if !(0.0..=100.0).contains(&result.impact_score) {
        return Err(InvariantViolation::ImpactScore(result.impact_score));
    }

    if result.economic_roi < 0.0 {
        return Err(InvariantViolation::NegativeRoi(result.economic_roi));
    }

    if !result.contributions.is_empty() {
        let total: f64 = result.contributions.iter().map(|share| share.score).sum();
        if !total.is_finite() || (total - 100.0).abs() > CONTRIBUTION_TOLERANCE {
            return Err(InvariantViolation::ContributionSum(total));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::catalog::InterventionCatalog;

    fn region(id: &str) -> Region {
        RegionCatalog::builtin().get(id).cloned().expect("catalog region")
    }

    #[test]
    fn rejects_invalid_input_before_computing() {
        let engine = SimulationEngine::standard();
        let mut region = region("global");
        region.baseline_mortality = -1.0;

        let err = engine.run(&region, &[]).expect_err("negative mortality rejected");

        assert!(matches!(
            err,
            SimulationError::InvalidInput(InputViolation::InvalidRegionValue { .. })
        ));
    }

    #[test]
    fn invariant_check_flags_out_of_range_values() {
        let engine = SimulationEngine::standard();
        let mut result = engine.run(&region("global"), &[]).expect("runs");
        result.trajectory[2].disease_prevalence = 140.0;
        result.trajectory[2].disease_baseline = 140.0;

        let violation = check_invariants(&result, true).expect_err("range violation");

        assert!(matches!(
            violation,
            InvariantViolation::OutOfRange {
                metric: Metric::DiseasePrevalence,
                year: 3,
                ..
            }
        ));
    }

    #[test]
    fn invariant_check_flags_nan_and_bad_shares() {
        let engine = SimulationEngine::standard();
        let vaccines = InterventionCatalog::builtin()
            .get("vax_expanded")
            .cloned()
            .expect("vaccines")
            .with_intensity(60)
            .activated();
        let result = engine.run(&region("south_asia"), &[vaccines]).expect("runs");

        let mut nan = result.clone();
        nan.trajectory[0].mortality_rate = f64::NAN;
        assert!(check_invariants(&nan, false).is_err());

        let mut skewed = result.clone();
        skewed.contributions[0].score = 80.0;
        assert_eq!(
            check_invariants(&skewed, false),
            Err(InvariantViolation::ContributionSum(80.0))
        );

        let mut reordered = result;
        reordered.trajectory.swap(0, 1);
        assert!(matches!(
            check_invariants(&reordered, false),
            Err(InvariantViolation::YearOrder { .. })
        ));
    }

    #[test]
    fn per_call_strictness_overrides_engine_default() {
        let engine = SimulationEngine::standard();
        let water = InterventionCatalog::builtin()
            .get("wash_infra")
            .cloned()
            .expect("water")
            .with_intensity(80)
            .activated();
        let region = region("south_america");

        let standard = engine.run(&region, &[water.clone()]).expect("runs");
        let conservative = engine
            .run_with_strictness(&region, &[water], ModelStrictness::Conservative)
            .expect("runs");

        let last = |result: &SimulationResult| result.final_year().cloned().expect("final year");
        assert!(last(&conservative).healthcare_access < last(&standard).healthcare_access);
        assert!(conservative.impact_score <= standard.impact_score);
    }
}
