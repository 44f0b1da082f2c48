use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of projected years in every simulation.
pub const HORIZON_YEARS: usize = 5;

/// Upper bound on intervention intensity.
pub const MAX_INTENSITY: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterventionCategory {
    Medical,
    Infrastructure,
    Policy,
    Environment,
}

impl InterventionCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Medical,
            Self::Infrastructure,
            Self::Policy,
            Self::Environment,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Medical => "Medical",
            Self::Infrastructure => "Infrastructure",
            Self::Policy => "Policy",
            Self::Environment => "Environment",
        }
    }

    /// Case-insensitive lookup used when callers describe custom interventions.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value))
    }
}

/// The five tracked quantities of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mortality,
    LifeExpectancy,
    DiseasePrevalence,
    HealthcareAccess,
    EconomicIndex,
}

impl Metric {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Mortality,
            Self::LifeExpectancy,
            Self::DiseasePrevalence,
            Self::HealthcareAccess,
            Self::EconomicIndex,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Mortality => 0,
            Self::LifeExpectancy => 1,
            Self::DiseasePrevalence => 2,
            Self::HealthcareAccess => 3,
            Self::EconomicIndex => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mortality => "Mortality rate",
            Self::LifeExpectancy => "Life expectancy",
            Self::DiseasePrevalence => "Disease prevalence",
            Self::HealthcareAccess => "Healthcare access",
            Self::EconomicIndex => "Economic index",
        }
    }

    /// Inclusive valid range for every value of this metric.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::LifeExpectancy => (0.0, 120.0),
            Self::Mortality
            | Self::DiseasePrevalence
            | Self::HealthcareAccess
            | Self::EconomicIndex => (0.0, 100.0),
        }
    }

    /// Mortality and disease improve by falling; everything else by rising.
    pub const fn lower_is_better(self) -> bool {
        matches!(self, Self::Mortality | Self::DiseasePrevalence)
    }

    /// Weight of the metric in the composite impact score and contribution shares.
    pub const fn impact_weight(self) -> f64 {
        match self {
            Self::Mortality => 0.30,
            Self::LifeExpectancy => 0.20,
            Self::DiseasePrevalence => 0.20,
            Self::HealthcareAccess => 0.15,
            Self::EconomicIndex => 0.15,
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        let (lower, upper) = self.bounds();
        value.clamp(lower, upper)
    }
}

/// One value per tracked metric, indexable by [`Metric`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricVector([f64; Metric::COUNT]);

impl MetricVector {
    pub const fn zero() -> Self {
        Self([0.0; Metric::COUNT])
    }

    pub const fn new(
        mortality: f64,
        life_expectancy: f64,
        disease_prevalence: f64,
        healthcare_access: f64,
        economic_index: f64,
    ) -> Self {
        Self([
            mortality,
            life_expectancy,
            disease_prevalence,
            healthcare_access,
            economic_index,
        ])
    }

    pub fn from_fn(mut value: impl FnMut(Metric) -> f64) -> Self {
        let mut values = [0.0; Metric::COUNT];
        for metric in Metric::ordered() {
            values[metric.index()] = value(metric);
        }
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ordered()
            .into_iter()
            .map(move |metric| (metric, self.0[metric.index()]))
    }

    /// Sum of the values weighted by [`Metric::impact_weight`].
    pub fn weighted_sum(&self) -> f64 {
        self.iter()
            .map(|(metric, value)| metric.impact_weight() * value)
            .sum()
    }
}

impl Index<Metric> for MetricVector {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.index()]
    }
}

impl IndexMut<Metric> for MetricVector {
    fn index_mut(&mut self, metric: Metric) -> &mut f64 {
        &mut self.0[metric.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub population: u64,
    /// Deaths per 1,000 people per year.
    pub baseline_mortality: f64,
    /// GDP per capita in USD.
    #[serde(rename = "baselineGDP")]
    pub baseline_gdp: f64,
    pub description: String,
    /// User-entered region whose statistics must be estimated.
    #[serde(default, rename = "isCustom")]
    pub estimated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<String>,
}

impl Region {
    /// A user-entered region with placeholder statistics.
    pub fn custom(name: &str) -> Self {
        let name = name.trim();
        Self {
            id: format!("custom_{}", slugify(name)),
            name: name.to_string(),
            population: 0,
            baseline_mortality: 0.0,
            baseline_gdp: 0.0,
            description: "User-specified region; baseline statistics are estimated.".to_string(),
            estimated: true,
            countries: Vec::new(),
        }
    }

    /// True when the region's own statistics can seed a baseline directly.
    pub fn has_authoritative_baseline(&self) -> bool {
        !self.estimated
            && self.population > 0
            && self.baseline_mortality > 0.0
            && self.baseline_gdp > 0.0
    }
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: String,
    pub name: String,
    pub category: InterventionCategory,
    pub description: String,
    /// Investment/effort level, 0-100.
    pub intensity: u8,
    pub active: bool,
}

impl Intervention {
    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }
}

/// Scaling dial on intervention effect magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStrictness {
    Conservative,
    #[default]
    Standard,
    Aggressive,
}

impl ModelStrictness {
    pub const fn ordered() -> [Self; 3] {
        [Self::Conservative, Self::Standard, Self::Aggressive]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Standard => "Standard",
            Self::Aggressive => "Aggressive",
        }
    }

    pub const fn effect_multiplier(self) -> f64 {
        match self {
            Self::Conservative => 0.75,
            Self::Standard => 1.0,
            Self::Aggressive => 1.2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|strictness| strictness.label().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    pub strictness: ModelStrictness,
}

/// Baseline and projected values of every metric for one year of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyMetrics {
    pub year: u8,

    pub mortality_rate: f64,
    pub life_expectancy: f64,
    pub disease_prevalence: f64,
    pub healthcare_access: f64,
    pub economic_index: f64,

    pub mortality_baseline: f64,
    pub life_expectancy_baseline: f64,
    pub disease_baseline: f64,
    pub healthcare_baseline: f64,
    pub economic_baseline: f64,
}

impl YearlyMetrics {
    pub fn new(year: u8, baseline: &MetricVector, projected: &MetricVector) -> Self {
        Self {
            year,
            mortality_rate: projected[Metric::Mortality],
            life_expectancy: projected[Metric::LifeExpectancy],
            disease_prevalence: projected[Metric::DiseasePrevalence],
            healthcare_access: projected[Metric::HealthcareAccess],
            economic_index: projected[Metric::EconomicIndex],
            mortality_baseline: baseline[Metric::Mortality],
            life_expectancy_baseline: baseline[Metric::LifeExpectancy],
            disease_baseline: baseline[Metric::DiseasePrevalence],
            healthcare_baseline: baseline[Metric::HealthcareAccess],
            economic_baseline: baseline[Metric::EconomicIndex],
        }
    }

    pub fn projected(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mortality => self.mortality_rate,
            Metric::LifeExpectancy => self.life_expectancy,
            Metric::DiseasePrevalence => self.disease_prevalence,
            Metric::HealthcareAccess => self.healthcare_access,
            Metric::EconomicIndex => self.economic_index,
        }
    }

    pub fn baseline(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mortality => self.mortality_baseline,
            Metric::LifeExpectancy => self.life_expectancy_baseline,
            Metric::DiseasePrevalence => self.disease_baseline,
            Metric::HealthcareAccess => self.healthcare_baseline,
            Metric::EconomicIndex => self.economic_baseline,
        }
    }

    /// Signed change from baseline to projected, positive when the metric improves.
    pub fn improvement(&self, metric: Metric) -> f64 {
        let change = self.projected(metric) - self.baseline(metric);
        if metric.lower_is_better() {
            -change
        } else {
            change
        }
    }
}

/// Normalized share of total improvement attributed to one intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionContribution {
    pub id: String,
    pub name: String,
    pub category: InterventionCategory,
    pub score: f64,
}

/// Resolved starting condition reported for regions whose statistics were estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedBaseline {
    pub population: u64,
    pub gdp: f64,
    pub mortality: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub region_name: String,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(rename = "data")]
    pub trajectory: Vec<YearlyMetrics>,
    #[serde(rename = "interventionImpact")]
    pub contributions: Vec<InterventionContribution>,
    pub impact_score: f64,
    pub lives_saved: i64,
    #[serde(rename = "economicROI")]
    pub economic_roi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_baseline: Option<EstimatedBaseline>,
}

impl SimulationResult {
    pub fn final_year(&self) -> Option<&YearlyMetrics> {
        self.trajectory.last()
    }
}
