mod narrative;
pub mod scores;

pub use narrative::Narrative;

use super::baseline::BaselineSnapshot;
use super::domain::{InterventionContribution, YearlyMetrics};
use super::effects::EffectSchedule;

/// Aggregate figures derived from a finished trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactSummary {
    pub lives_saved: i64,
    pub economic_roi: f64,
    pub impact_score: f64,
    pub contributions: Vec<InterventionContribution>,
}

pub fn summarize(
    snapshot: &BaselineSnapshot,
    trajectory: &[YearlyMetrics],
    schedule: &EffectSchedule,
) -> ImpactSummary {
    ImpactSummary {
        lives_saved: scores::lives_saved(trajectory, snapshot.population),
        economic_roi: scores::economic_roi(trajectory, schedule),
        impact_score: scores::impact_score(trajectory),
        contributions: scores::contributions(schedule),
    }
}

impl ImpactSummary {
    /// Deterministic summary, insight, and recommendation text for this result.
    pub fn narrative(
        &self,
        region_name: &str,
        snapshot: &BaselineSnapshot,
        trajectory: &[YearlyMetrics],
        schedule: &EffectSchedule,
    ) -> Narrative {
        narrative::compose(region_name, snapshot, trajectory, schedule, self)
    }
}
