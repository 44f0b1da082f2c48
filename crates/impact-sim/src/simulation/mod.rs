//! Deterministic regional health and economic impact simulation.
//!
//! A run resolves a baseline for the region, builds the effect schedule of the
//! active interventions, integrates the five-year trajectory, and summarizes it
//! into scores and narrative text.

pub mod baseline;
pub mod catalog;
pub mod domain;
pub mod effects;
pub mod engine;
pub mod request;
pub mod service;
pub mod summary;
pub mod trajectory;

pub use baseline::{resolve_baseline, BaselineSnapshot, BaselineSource};
pub use catalog::{CatalogImportError, InterventionCatalog, RegionCatalog, RegionCatalogImporter};
pub use domain::{
    EstimatedBaseline, Intervention, InterventionCategory, InterventionContribution, Metric,
    MetricVector, ModelStrictness, Region, SimulationOptions, SimulationResult, YearlyMetrics,
    HORIZON_YEARS, MAX_INTENSITY,
};
pub use effects::EffectSchedule;
pub use engine::{check_invariants, InvariantViolation, SimulationEngine, SimulationError};
pub use request::{
    validate_inputs, InputViolation, InterventionSelection, PreparedSimulation, RegionSelection,
    RequestGuard, SimulationRequest,
};
pub use service::SimulationService;
pub use summary::{summarize, ImpactSummary, Narrative};
