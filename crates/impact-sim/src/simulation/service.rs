use super::catalog::{
    CatalogImportError, InterventionCatalog, RegionCatalog, RegionCatalogImporter,
};
use super::domain::{SimulationOptions, SimulationResult};
use super::engine::{SimulationEngine, SimulationError};
use super::request::{PreparedSimulation, RequestGuard, SimulationRequest};
use crate::config::SimulationConfig;
use std::sync::Arc;
use tracing::info;

/// Catalog-aware front door shared by the HTTP routes and the CLI.
#[derive(Debug, Clone)]
pub struct SimulationService {
    regions: Arc<RegionCatalog>,
    interventions: Arc<InterventionCatalog>,
    engine: SimulationEngine,
}

impl SimulationService {
    pub fn new(
        regions: Arc<RegionCatalog>,
        interventions: Arc<InterventionCatalog>,
        options: SimulationOptions,
    ) -> Self {
        let engine = SimulationEngine::new(Arc::clone(&regions), options);
        Self {
            regions,
            interventions,
            engine,
        }
    }

    /// Builtin catalogs, optionally extended by the configured region CSV.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, CatalogImportError> {
        let builtin = RegionCatalog::builtin();
        let regions = match &config.region_catalog {
            Some(path) => {
                let catalog = RegionCatalogImporter::from_path(path, &builtin)?;
                info!(
                    path = %path.display(),
                    regions = catalog.regions().len(),
                    "loaded region catalog"
                );
                Arc::new(catalog)
            }
            None => builtin,
        };

        Ok(Self::new(
            regions,
            InterventionCatalog::builtin(),
            SimulationOptions {
                strictness: config.strictness,
            },
        ))
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    pub fn interventions(&self) -> &InterventionCatalog {
        &self.interventions
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn prepare(
        &self,
        request: SimulationRequest,
    ) -> Result<PreparedSimulation, SimulationError> {
        let guard = RequestGuard::new(&self.regions, &self.interventions);
        let prepared = guard.prepare(request, self.engine.options().strictness)?;
        Ok(prepared)
    }

    pub fn run_prepared(
        &self,
        prepared: &PreparedSimulation,
    ) -> Result<SimulationResult, SimulationError> {
        self.engine.run_with_strictness(
            &prepared.region,
            &prepared.interventions,
            prepared.strictness,
        )
    }

    pub fn simulate(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let prepared = self.prepare(request)?;
        self.run_prepared(&prepared)
    }
}

impl Default for SimulationService {
    fn default() -> Self {
        Self::new(
            RegionCatalog::builtin(),
            InterventionCatalog::builtin(),
            SimulationOptions::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::request::{InputViolation, InterventionSelection, RegionSelection};
    use std::io::Write;

    fn request(region: &str, interventions: Vec<InterventionSelection>) -> SimulationRequest {
        SimulationRequest {
            region: RegionSelection {
                id: Some(region.to_string()),
                name: None,
            },
            interventions,
            strictness: None,
        }
    }

    #[test]
    fn simulate_resolves_catalog_entries() {
        let service = SimulationService::default();

        let result = service
            .simulate(request(
                "sub_saharan_africa",
                vec![InterventionSelection::new("vax_expanded", 70)],
            ))
            .expect("simulation runs");

        assert_eq!(result.region_name, "Sub-Saharan Africa");
        assert!(result.lives_saved > 0);
        assert!(result.estimated_baseline.is_none());
    }

    #[test]
    fn simulate_surfaces_guard_violations() {
        let service = SimulationService::default();

        let err = service
            .simulate(request(
                "global",
                vec![InterventionSelection::new("vax_expanded", 130)],
            ))
            .expect_err("intensity rejected");

        assert!(matches!(
            err,
            SimulationError::InvalidInput(InputViolation::IntensityOutOfRange {
                intensity: 130,
                ..
            })
        ));
    }

    #[test]
    fn config_catalog_extends_builtin_regions() {
        let dir = std::env::temp_dir().join(format!("impact-sim-service-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("regions.csv");
        let mut file = std::fs::File::create(&path).expect("csv file");
        writeln!(file, "id,name,population,mortality,gdp,description,countries").expect("header");
        writeln!(
            file,
            "andes,Andean Highlands,18000000,28,7200,Highland districts,Peru;Bolivia"
        )
        .expect("row");
        drop(file);

        let config = SimulationConfig {
            region_catalog: Some(path.clone()),
            ..SimulationConfig::default()
        };
        let service = SimulationService::from_config(&config).expect("catalog loads");

        assert!(service.regions().get("andes").is_some());
        assert!(service.regions().get("global").is_some());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let config = SimulationConfig {
            region_catalog: Some("/nonexistent/impact-sim/regions.csv".into()),
            ..SimulationConfig::default()
        };

        assert!(matches!(
            SimulationService::from_config(&config),
            Err(CatalogImportError::Io(_))
        ));
    }
}
