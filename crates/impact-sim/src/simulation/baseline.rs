//! Baseline resolution: turns a [`Region`] into a fully populated year-0 snapshot.
//!
//! Catalog regions derive the four indices that are not part of the region record
//! (life expectancy, disease prevalence, healthcare access, economic index) from mortality
//! and GDP per capita. Estimated regions first borrow statistics from the closest catalog
//! entry, in this order:
//!
//! 1. exact region id or name,
//! 2. constituent country (population split evenly across the listed countries),
//! 3. token similarity of the name (Jaccard >= 0.5, or phrase containment),
//! 4. the global average rates with a fixed placeholder population.

use super::catalog::normalizer::{name_tokens, normalize_name, token_similarity};
use super::catalog::RegionCatalog;
use super::domain::{EstimatedBaseline, Metric, MetricVector, Region};
use serde::Serialize;
use tracing::debug;

/// Global average deaths per 1,000 when the catalog lacks a global entry.
pub const GLOBAL_DEFAULT_MORTALITY: f64 = 45.0;
/// Global average GDP per capita (USD) when the catalog lacks a global entry.
pub const GLOBAL_DEFAULT_GDP: f64 = 12_000.0;
/// Placeholder population for regions that match nothing in the catalog.
pub const GLOBAL_DEFAULT_POPULATION: u64 = 50_000_000;

const MIN_NAME_SIMILARITY: f64 = 0.5;
const CONTAINMENT_SIMILARITY: f64 = 0.75;

const ACCESS_HALF_SATURATION_GDP: f64 = 8_000.0;
const ECONOMIC_HALF_SATURATION_GDP: f64 = 20_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaselineSource {
    /// The region's own statistics.
    Catalog,
    RegionMatch { region_id: String },
    CountryMatch { region_id: String, country: String },
    GlobalDefault,
}

impl BaselineSource {
    pub fn is_estimated(&self) -> bool {
        !matches!(self, BaselineSource::Catalog)
    }
}

/// Year-0 starting condition for both trajectory paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineSnapshot {
    pub population: u64,
    pub gdp_per_capita: f64,
    pub metrics: MetricVector,
    pub description: String,
    pub source: BaselineSource,
}

impl BaselineSnapshot {
    pub fn mortality(&self) -> f64 {
        self.metrics[Metric::Mortality]
    }

    /// Annotation attached to results whose region statistics were estimated.
    pub fn estimated_baseline(&self) -> Option<EstimatedBaseline> {
        if !self.source.is_estimated() {
            return None;
        }

        Some(EstimatedBaseline {
            population: self.population,
            gdp: self.gdp_per_capita,
            mortality: self.mortality(),
            description: self.description.clone(),
        })
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn life_expectancy_for(mortality: f64) -> f64 {
    (90.0 - 0.5 * non_negative(mortality)).clamp(40.0, 90.0)
}

pub fn disease_prevalence_for(mortality: f64) -> f64 {
    (5.0 + 0.4 * non_negative(mortality)).clamp(0.0, 100.0)
}

pub fn healthcare_access_for(gdp_per_capita: f64) -> f64 {
    let gdp = non_negative(gdp_per_capita);
    (100.0 * gdp / (gdp + ACCESS_HALF_SATURATION_GDP)).clamp(0.0, 100.0)
}

pub fn economic_index_for(gdp_per_capita: f64) -> f64 {
    let gdp = non_negative(gdp_per_capita);
    (100.0 * gdp / (gdp + ECONOMIC_HALF_SATURATION_GDP)).clamp(0.0, 100.0)
}

/// Derive every tracked metric from the two statistics carried by a region.
pub fn derive_metrics(mortality: f64, gdp_per_capita: f64) -> MetricVector {
    let mortality = Metric::Mortality.clamp(non_negative(mortality));
    MetricVector::new(
        mortality,
        life_expectancy_for(mortality),
        disease_prevalence_for(mortality),
        healthcare_access_for(gdp_per_capita),
        economic_index_for(gdp_per_capita),
    )
}

/// Resolve the starting condition for `region`. Never fails: unknown regions degrade to
/// the global default.
pub fn resolve_baseline(region: &Region, catalog: &RegionCatalog) -> BaselineSnapshot {
    if region.has_authoritative_baseline() {
        return snapshot(
            region.population,
            region.baseline_mortality,
            region.baseline_gdp,
            region.description.clone(),
            BaselineSource::Catalog,
        );
    }

    let estimate = estimate(region, catalog);
    debug!(
        region = %region.name,
        source = ?estimate.source,
        population = estimate.population,
        "estimated region baseline"
    );
    estimate
}

fn snapshot(
    population: u64,
    mortality: f64,
    gdp_per_capita: f64,
    description: String,
    source: BaselineSource,
) -> BaselineSnapshot {
    let gdp_per_capita = non_negative(gdp_per_capita);
    BaselineSnapshot {
        population,
        gdp_per_capita,
        metrics: derive_metrics(mortality, gdp_per_capita),
        description,
        source,
    }
}

fn estimate(region: &Region, catalog: &RegionCatalog) -> BaselineSnapshot {
    let candidates = [region.name.as_str(), region.id.as_str()];

    for query in candidates {
        if let Some(matched) = catalog
            .find(query)
            .filter(|matched| matched.has_authoritative_baseline())
        {
            return snapshot(
                matched.population,
                matched.baseline_mortality,
                matched.baseline_gdp,
                format!(
                    "Estimated from the {} catalog baseline. {}",
                    matched.name, matched.description
                ),
                BaselineSource::RegionMatch {
                    region_id: matched.id.clone(),
                },
            );
        }
    }

    if let Some((matched, country)) = country_match(&region.name, catalog) {
        let share = matched.countries.len().max(1) as u64;
        let population = (matched.population / share).max(1);
        return snapshot(
            population,
            matched.baseline_mortality,
            matched.baseline_gdp,
            format!(
                "Estimated for {} using {} regional rates; population approximated as an even \
                 share of {} listed countries.",
                country,
                matched.name,
                matched.countries.len()
            ),
            BaselineSource::CountryMatch {
                region_id: matched.id.clone(),
                country: country.to_string(),
            },
        );
    }

    if let Some(matched) = similar_region(&region.name, catalog) {
        return snapshot(
            matched.population,
            matched.baseline_mortality,
            matched.baseline_gdp,
            format!(
                "Estimated from the closest catalog region, {}. {}",
                matched.name, matched.description
            ),
            BaselineSource::RegionMatch {
                region_id: matched.id.clone(),
            },
        );
    }

    let (mortality, gdp) = catalog
        .global()
        .filter(|global| global.has_authoritative_baseline())
        .map(|global| (global.baseline_mortality, global.baseline_gdp))
        .unwrap_or((GLOBAL_DEFAULT_MORTALITY, GLOBAL_DEFAULT_GDP));

    let label = if region.name.trim().is_empty() {
        "this region".to_string()
    } else {
        region.name.trim().to_string()
    };

    snapshot(
        GLOBAL_DEFAULT_POPULATION,
        mortality,
        gdp,
        format!(
            "No catalog match for {label}; using global average rates ({mortality} deaths per \
             1,000, ${gdp:.0} GDP per capita) with a placeholder population of {GLOBAL_DEFAULT_POPULATION}."
        ),
        BaselineSource::GlobalDefault,
    )
}

fn country_match<'a>(name: &str, catalog: &'a RegionCatalog) -> Option<(&'a Region, &'a str)> {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return None;
    }

    catalog
        .regions()
        .iter()
        .filter(|region| region.has_authoritative_baseline())
        .find_map(|region| {
            region
                .countries
                .iter()
                .find(|country| normalize_name(country) == wanted)
                .map(|country| (region, country.as_str()))
        })
}

fn similar_region<'a>(name: &str, catalog: &'a RegionCatalog) -> Option<&'a Region> {
    let query = name_tokens(name);
    if query.is_empty() {
        return None;
    }
    let normalized = normalize_name(name);

    let mut best: Option<(&Region, f64)> = None;
    for region in catalog
        .regions()
        .iter()
        .filter(|region| region.has_authoritative_baseline())
    {
        let mut score = token_similarity(&query, &name_tokens(&region.name));
        if normalized.contains(&normalize_name(&region.name)) {
            score = score.max(CONTAINMENT_SIMILARITY);
        }

        if score >= MIN_NAME_SIMILARITY && best.map_or(true, |(_, top)| score > top) {
            best = Some((region, score));
        }
    }

    best.map(|(region, _)| region)
}
