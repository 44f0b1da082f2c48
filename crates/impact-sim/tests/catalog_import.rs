use impact_sim::simulation::{
    InterventionCatalog, InterventionSelection, ModelStrictness, RegionCatalog,
    RegionCatalogImporter, RegionSelection, SimulationOptions, SimulationRequest,
    SimulationService,
};
use std::io::Cursor;
use std::sync::Arc;

const REGIONS_CSV: &str = "\
id,name,population,mortality,gdp,description,countries
andes,Andean Highlands,18000000,28,7200,High-altitude districts,Peru;Bolivia;Ecuador
western_europe,Western Europe,200000000,8,50000,Revised statistics,
";

fn imported_service() -> SimulationService {
    let catalog =
        RegionCatalogImporter::from_reader(Cursor::new(REGIONS_CSV), &RegionCatalog::builtin())
            .expect("catalog imports");
    SimulationService::new(
        Arc::new(catalog),
        InterventionCatalog::builtin(),
        SimulationOptions {
            strictness: ModelStrictness::Standard,
        },
    )
}

#[test]
fn imported_regions_simulate_with_their_own_statistics() {
    let service = imported_service();

    let result = service
        .simulate(SimulationRequest {
            region: RegionSelection {
                id: Some("andes".to_string()),
                name: None,
            },
            interventions: vec![InterventionSelection::new("nutri_supp", 60)],
            strictness: None,
        })
        .expect("imported region simulates");

    assert_eq!(result.region_name, "Andean Highlands");
    assert!(result.estimated_baseline.is_none());
    let first_year = result.trajectory.first().expect("first year");
    assert!(first_year.mortality_baseline < 28.0);
    assert!(result.lives_saved > 0);
}

#[test]
fn imported_rows_replace_builtin_regions_with_the_same_id() {
    let service = imported_service();

    let europe = service.regions().get("western_europe").expect("region kept");
    assert_eq!(europe.population, 200_000_000);
    assert_eq!(europe.baseline_mortality, 8.0);
    assert_eq!(
        service
            .regions()
            .regions()
            .iter()
            .filter(|region| region.id == "western_europe")
            .count(),
        1
    );
}

#[test]
fn imported_country_lists_feed_estimation() {
    let service = imported_service();

    let result = service
        .simulate(SimulationRequest {
            region: RegionSelection {
                id: None,
                name: Some("Ecuador".to_string()),
            },
            interventions: Vec::new(),
            strictness: None,
        })
        .expect("country simulates");

    let estimate = result.estimated_baseline.expect("estimate reported");
    assert!(estimate.description.contains("Ecuador"));
    assert!(estimate.population > 0);
}
