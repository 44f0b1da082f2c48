use crate::infra::{parse_intervention, parse_strictness};
use clap::Args;
use impact_sim::config::AppConfig;
use impact_sim::error::AppError;
use impact_sim::simulation::{
    InterventionCatalog, InterventionSelection, Metric, ModelStrictness, RegionCatalog,
    RegionSelection, SimulationRequest, SimulationResult, SimulationService,
};
use impact_sim::telemetry;
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Catalog region id, or any region name to estimate its baseline
    #[arg(long)]
    pub(crate) region: String,
    /// Active intervention as ID=INTENSITY (repeatable)
    #[arg(long = "intervention", value_parser = parse_intervention)]
    pub(crate) interventions: Vec<InterventionSelection>,
    /// Effect strictness: conservative, standard, or aggressive
    #[arg(long, value_parser = parse_strictness)]
    pub(crate) strictness: Option<ModelStrictness>,
    /// Extra region catalog CSV layered over the builtin regions
    #[arg(long)]
    pub(crate) regions_csv: Option<PathBuf>,
    /// Print the full result as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Extra region catalog CSV layered over the builtin regions
    #[arg(long)]
    pub(crate) regions_csv: Option<PathBuf>,
    /// Print the catalogs as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        region,
        interventions,
        strictness,
        regions_csv,
        json,
    } = args;

    let service = load_service(regions_csv)?;
    let request = SimulationRequest {
        region: region_selection(service.regions(), &region),
        interventions,
        strictness,
    };

    let result = service.simulate(request)?;
    if json {
        let body = serde_json::to_string_pretty(&result)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        println!("{body}");
    } else {
        print!("{}", render_result(&result));
    }

    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let service = load_service(args.regions_csv)?;

    if args.json {
        let body = serde_json::to_string_pretty(&json!({
            "regions": service.regions().regions(),
            "interventions": service.interventions().interventions(),
        }))
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        println!("{body}");
    } else {
        print!(
            "{}",
            render_catalog(service.regions(), service.interventions())
        );
    }

    Ok(())
}

fn load_service(regions_csv: Option<PathBuf>) -> Result<SimulationService, AppError> {
    let mut config = AppConfig::load()?;
    if regions_csv.is_some() {
        config.simulation.region_catalog = regions_csv;
    }

    telemetry::init(&config.telemetry)?;
    Ok(SimulationService::from_config(&config.simulation)?)
}

/// Known ids select a catalog region; anything else is treated as a custom name.
fn region_selection(catalog: &RegionCatalog, raw: &str) -> RegionSelection {
    if catalog.get(raw.trim()).is_some() {
        RegionSelection {
            id: Some(raw.trim().to_string()),
            name: None,
        }
    } else {
        RegionSelection {
            id: None,
            name: Some(raw.trim().to_string()),
        }
    }
}

pub(crate) fn render_result(result: &SimulationResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Impact simulation: {}", result.region_name);
    let _ = writeln!(out, "{}", result.summary);

    if let Some(estimate) = &result.estimated_baseline {
        let _ = writeln!(
            out,
            "\nEstimated baseline: population {}, GDP/capita ${:.0}, mortality {:.1}/1,000",
            estimate.population, estimate.gdp, estimate.mortality
        );
        let _ = writeln!(out, "- {}", estimate.description);
    }

    let _ = writeln!(out, "\nTrajectory (projected vs baseline)");
    for year in &result.trajectory {
        let _ = write!(out, "- Year {}:", year.year);
        for metric in Metric::ordered() {
            let _ = write!(
                out,
                " {} {:.1} ({:.1})",
                short_label(metric),
                year.projected(metric),
                year.baseline(metric)
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "\nImpact score {:.1}/100 | lives saved {} | economic ROI {:.2}x",
        result.impact_score, result.lives_saved, result.economic_roi
    );

    if result.contributions.is_empty() {
        let _ = writeln!(out, "\nIntervention contributions: none");
    } else {
        let _ = writeln!(out, "\nIntervention contributions");
        for share in &result.contributions {
            let _ = writeln!(
                out,
                "- {} [{}]: {:.1}%",
                share.name,
                share.category.label(),
                share.score
            );
        }
    }

    let _ = writeln!(out, "\nKey insights");
    for insight in &result.key_insights {
        let _ = writeln!(out, "- {insight}");
    }

    let _ = writeln!(out, "\nRecommendations");
    for recommendation in &result.recommendations {
        let _ = writeln!(out, "- {recommendation}");
    }

    out
}

pub(crate) fn render_catalog(
    regions: &RegionCatalog,
    interventions: &InterventionCatalog,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Regions");
    for region in regions.regions() {
        let _ = writeln!(
            out,
            "- {} ({}): population {}, mortality {:.1}/1,000, GDP/capita ${:.0}",
            region.name,
            region.id,
            region.population,
            region.baseline_mortality,
            region.baseline_gdp
        );
    }

    let _ = writeln!(out, "\nInterventions");
    for intervention in interventions.interventions() {
        let _ = writeln!(
            out,
            "- {} ({}) [{}]: {}",
            intervention.name,
            intervention.id,
            intervention.category.label(),
            intervention.description
        );
    }

    out
}

fn short_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Mortality => "mort",
        Metric::LifeExpectancy => "LE",
        Metric::DiseasePrevalence => "disease",
        Metric::HealthcareAccess => "access",
        Metric::EconomicIndex => "econ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate(
        region: RegionSelection,
        interventions: Vec<InterventionSelection>,
    ) -> SimulationResult {
        SimulationService::default()
            .simulate(SimulationRequest {
                region,
                interventions,
                strictness: None,
            })
            .expect("simulation runs")
    }

    #[test]
    fn catalog_ids_select_catalog_regions() {
        let catalog = RegionCatalog::builtin();

        assert_eq!(
            region_selection(&catalog, "south_asia").id.as_deref(),
            Some("south_asia")
        );
        assert_eq!(
            region_selection(&catalog, " Atlantis ").name.as_deref(),
            Some("Atlantis")
        );
    }

    #[test]
    fn text_report_lists_every_year_and_contribution() {
        let result = simulate(
            RegionSelection {
                id: Some("southeast_asia".to_string()),
                name: None,
            },
            vec![
                InterventionSelection::new("telehealth", 60),
                InterventionSelection::new("wash_infra", 40),
            ],
        );

        let report = render_result(&result);

        assert!(report.starts_with("Impact simulation: Southeast Asia"));
        for year in 1..=5 {
            assert!(report.contains(&format!("- Year {year}:")));
        }
        assert!(report.contains("Telemedicine & AI [Policy]"));
        assert!(report.contains("WASH Infrastructure [Infrastructure]"));
        assert!(!report.contains("Estimated baseline"));
    }

    #[test]
    fn text_report_flags_estimated_baselines() {
        let result = simulate(
            RegionSelection {
                id: None,
                name: Some("Kenya".to_string()),
            },
            Vec::new(),
        );

        let report = render_result(&result);

        assert!(report.contains("Estimated baseline"));
        assert!(report.contains("Intervention contributions: none"));
    }

    #[test]
    fn catalog_listing_includes_builtin_entries() {
        let listing = render_catalog(&RegionCatalog::builtin(), &InterventionCatalog::builtin());

        assert!(listing.contains("Global Average (global)"));
        assert!(listing.contains("Advanced Vector Control (vector_control) [Environment]"));
    }
}
