//! Static region and intervention reference data.
//!
//! Both catalogs are built once per process and shared read-only; the builtin sets can be
//! extended with a CSV region file at start-up (see [`RegionCatalog::with_overrides`]).

mod import;
pub(crate) mod normalizer;

pub use import::{CatalogImportError, RegionCatalogImporter};

use super::domain::{Intervention, InterventionCategory, Region};
use normalizer::normalize_name;
use std::sync::{Arc, OnceLock};

/// Identifier of the worldwide aggregate entry used as the estimation fallback.
pub const GLOBAL_REGION_ID: &str = "global";

static BUILTIN_REGIONS: OnceLock<Arc<RegionCatalog>> = OnceLock::new();
static BUILTIN_INTERVENTIONS: OnceLock<Arc<InterventionCatalog>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn builtin() -> Arc<Self> {
        BUILTIN_REGIONS
            .get_or_init(|| Arc::new(Self::new(builtin_regions())))
            .clone()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    /// Match by identifier or display name after whitespace/case normalization.
    pub fn find(&self, id_or_name: &str) -> Option<&Region> {
        let wanted = normalize_name(id_or_name);
        if wanted.is_empty() {
            return None;
        }

        self.regions.iter().find(|region| {
            normalize_name(&region.id) == wanted || normalize_name(&region.name) == wanted
        })
    }

    pub fn global(&self) -> Option<&Region> {
        self.get(GLOBAL_REGION_ID)
    }

    /// New catalog where `extra` entries replace builtin entries sharing an id and
    /// are appended otherwise.
    pub fn with_overrides(&self, extra: Vec<Region>) -> Self {
        let mut regions = self.regions.clone();
        for region in extra {
            match regions.iter_mut().find(|existing| existing.id == region.id) {
                Some(existing) => *existing = region,
                None => regions.push(region),
            }
        }
        Self { regions }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterventionCatalog {
    interventions: Vec<Intervention>,
}

impl InterventionCatalog {
    pub fn new(interventions: Vec<Intervention>) -> Self {
        Self { interventions }
    }

    pub fn builtin() -> Arc<Self> {
        BUILTIN_INTERVENTIONS
            .get_or_init(|| Arc::new(Self::new(builtin_interventions())))
            .clone()
    }

    pub fn interventions(&self) -> &[Intervention] {
        &self.interventions
    }

    pub fn get(&self, id: &str) -> Option<&Intervention> {
        let id = id.trim();
        self.interventions
            .iter()
            .find(|intervention| intervention.id == id)
    }

    pub fn by_category(&self, category: InterventionCategory) -> Vec<&Intervention> {
        self.interventions
            .iter()
            .filter(|intervention| intervention.category == category)
            .collect()
    }
}

fn region(
    id: &str,
    name: &str,
    population: u64,
    baseline_mortality: f64,
    baseline_gdp: f64,
    description: &str,
    countries: &[&str],
) -> Region {
    Region {
        id: id.to_string(),
        name: name.to_string(),
        population,
        baseline_mortality,
        baseline_gdp,
        description: description.to_string(),
        estimated: false,
        countries: countries.iter().map(|country| country.to_string()).collect(),
    }
}

fn builtin_regions() -> Vec<Region> {
    vec![
        region(
            GLOBAL_REGION_ID,
            "Global Average",
            8_000_000_000,
            45.0,
            12_000.0,
            "Worldwide aggregate health and economic simulation.",
            &[],
        ),
        region(
            "sub_saharan_africa",
            "Sub-Saharan Africa",
            1_100_000_000,
            76.0,
            1_600.0,
            "High burden of infectious diseases, developing infrastructure.",
            &[
                "Nigeria",
                "Ethiopia",
                "DR Congo",
                "South Africa",
                "Kenya",
                "Uganda",
                "Sudan",
                "Angola",
                "Ghana",
                "Mozambique",
            ],
        ),
        region(
            "southeast_asia",
            "Southeast Asia",
            675_000_000,
            60.0,
            4_500.0,
            "Rapidly industrializing, mixed healthcare access.",
            &[
                "Indonesia",
                "Vietnam",
                "Thailand",
                "Philippines",
                "Malaysia",
                "Myanmar",
                "Cambodia",
                "Laos",
                "Singapore",
            ],
        ),
        region(
            "south_america",
            "South America",
            430_000_000,
            55.0,
            8_500.0,
            "Urbanized population, challenges with inequality and vector-borne diseases.",
            &[
                "Brazil",
                "Colombia",
                "Argentina",
                "Peru",
                "Venezuela",
                "Chile",
                "Ecuador",
                "Bolivia",
                "Paraguay",
                "Uruguay",
            ],
        ),
        region(
            "south_asia",
            "South Asia",
            1_900_000_000,
            62.0,
            2_200.0,
            "High population density, dual burden of communicable and lifestyle diseases.",
            &[
                "India",
                "Pakistan",
                "Bangladesh",
                "Sri Lanka",
                "Nepal",
                "Afghanistan",
                "Bhutan",
                "Maldives",
            ],
        ),
        region(
            "western_europe",
            "Western Europe",
            196_000_000,
            12.0,
            45_000.0,
            "Aging population, advanced healthcare, focus on chronic diseases.",
            &[
                "Germany",
                "United Kingdom",
                "France",
                "Italy",
                "Spain",
                "Netherlands",
                "Belgium",
                "Sweden",
                "Switzerland",
                "Portugal",
            ],
        ),
    ]
}

fn intervention(
    id: &str,
    name: &str,
    category: InterventionCategory,
    description: &str,
) -> Intervention {
    Intervention {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: description.to_string(),
        intensity: 50,
        active: false,
    }
}

fn builtin_interventions() -> Vec<Intervention> {
    use InterventionCategory::*;

    vec![
        intervention(
            "vax_expanded",
            "Expanded Immunization",
            Medical,
            "Universal coverage for measles, polio, and new malaria vaccines.",
        ),
        intervention(
            "wash_infra",
            "WASH Infrastructure",
            Infrastructure,
            "Investment in clean water access and modern sanitation facilities.",
        ),
        intervention(
            "telehealth",
            "Telemedicine & AI",
            Policy,
            "Digital health platforms to reach remote rural areas.",
        ),
        intervention(
            "vector_control",
            "Advanced Vector Control",
            Environment,
            "Genetically modified mosquito release and widespread bed net usage.",
        ),
        intervention(
            "nutri_supp",
            "Maternal Nutrition",
            Medical,
            "Supplements and food security programs for mothers and infants.",
        ),
        intervention(
            "climate_res",
            "Climate Resilience",
            Environment,
            "Infrastructure hardening against extreme weather and heat.",
        ),
        intervention(
            "education",
            "Health Education",
            Policy,
            "Community-led programs for hygiene and preventive care.",
        ),
    ]
}
