use super::catalog::{InterventionCatalog, RegionCatalog};
use super::domain::{Intervention, InterventionCategory, ModelStrictness, Region, MAX_INTENSITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Raw caller input for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub region: RegionSelection,
    #[serde(default)]
    pub interventions: Vec<InterventionSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strictness: Option<ModelStrictness>,
}

/// Catalog id, or a free-text name for a region whose statistics will be estimated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionSelection {
    pub id: String,
    pub intensity: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Custom interventions outside the catalog must carry a name and category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}

impl InterventionSelection {
    pub fn new(id: impl Into<String>, intensity: i64) -> Self {
        Self {
            id: id.into(),
            intensity,
            active: true,
            name: None,
            category: None,
            description: None,
        }
    }
}

/// Reasons input is rejected before any computation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputViolation {
    #[error("region selection must include an id or a name")]
    MissingRegion,
    #[error("region '{region}' has invalid {field}: {value}")]
    InvalidRegionValue {
        region: String,
        field: &'static str,
        value: f64,
    },
    #[error("intervention id must not be empty")]
    MissingInterventionId,
    #[error("intervention '{id}' intensity {intensity} is outside 0-100")]
    IntensityOutOfRange { id: String, intensity: i64 },
    #[error("intervention '{id}' has unknown category '{category}'")]
    UnknownCategory { id: String, category: String },
    #[error("intervention '{0}' is not in the catalog and has no custom name and category")]
    UnknownIntervention(String),
    #[error("intervention '{0}' is selected more than once")]
    DuplicateIntervention(String),
}

/// Validated inputs ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSimulation {
    pub region: Region,
    pub interventions: Vec<Intervention>,
    pub strictness: ModelStrictness,
}

impl PreparedSimulation {
    /// Stable key identifying the computation: region, strictness, and the ordered active
    /// interventions. Every field is length-prefixed so ids containing separators cannot
    /// collide with a different selection.
    pub fn fingerprint(&self) -> String {
        let mut key = String::new();
        push_key_field(&mut key, &self.region.id);
        push_key_field(&mut key, &self.region.name);
        push_key_field(&mut key, self.strictness.label());

        for intervention in self.interventions.iter().filter(|item| item.active) {
            push_key_field(&mut key, &intervention.id);
            push_key_field(&mut key, &intervention.name);
            push_key_field(&mut key, intervention.category.label());
            push_key_field(&mut key, &intervention.intensity.to_string());
        }
        key
    }
}

fn push_key_field(key: &mut String, field: &str) {
    let _ = write!(key, "{}:{}", field.len(), field);
}

/// Guard turning raw selections into engine inputs.
#[derive(Debug, Clone, Copy)]
pub struct RequestGuard<'a> {
    regions: &'a RegionCatalog,
    interventions: &'a InterventionCatalog,
}

impl<'a> RequestGuard<'a> {
    pub fn new(regions: &'a RegionCatalog, interventions: &'a InterventionCatalog) -> Self {
        Self {
            regions,
            interventions,
        }
    }

    pub fn prepare(
        &self,
        request: SimulationRequest,
        default_strictness: ModelStrictness,
    ) -> Result<PreparedSimulation, InputViolation> {
        let region = self.region(&request.region)?;
        let interventions = self.interventions(request.interventions)?;

        Ok(PreparedSimulation {
            region,
            interventions,
            strictness: request.strictness.unwrap_or(default_strictness),
        })
    }

    /// Catalog regions are returned as-is; anything else becomes an estimated custom region.
    pub fn region(&self, selection: &RegionSelection) -> Result<Region, InputViolation> {
        let id = selection.id.as_deref().map(str::trim).unwrap_or_default();
        let name = selection.name.as_deref().map(str::trim).unwrap_or_default();

        if id.is_empty() && name.is_empty() {
            return Err(InputViolation::MissingRegion);
        }

        if let Some(region) = self.regions.get(id) {
            return Ok(region.clone());
        }

        let query = if name.is_empty() { id } else { name };
        match self.regions.find(query) {
            Some(region) => Ok(region.clone()),
            None => Ok(Region::custom(query)),
        }
    }

    pub fn interventions(
        &self,
        selections: Vec<InterventionSelection>,
    ) -> Result<Vec<Intervention>, InputViolation> {
        let mut seen = BTreeSet::new();
        let mut interventions = Vec::with_capacity(selections.len());

        for selection in selections {
            let intervention = self.intervention(selection)?;
            if !seen.insert(intervention.id.clone()) {
                return Err(InputViolation::DuplicateIntervention(intervention.id));
            }
            interventions.push(intervention);
        }

        Ok(interventions)
    }

    fn intervention(
        &self,
        selection: InterventionSelection,
    ) -> Result<Intervention, InputViolation> {
        let id = selection.id.trim().to_string();
        if id.is_empty() {
            return Err(InputViolation::MissingInterventionId);
        }

        let intensity = checked_intensity(&id, selection.intensity)?;

        let mut intervention = match self.interventions.get(&id) {
            Some(known) => {
                // Catalog definitions keep their category; a supplied one must still parse.
                if let Some(raw) = selection.category.as_deref() {
                    parse_category(&id, raw)?;
                }
                known.clone()
            }
            None => {
                let (Some(name), Some(raw)) =
                    (selection.name.as_deref(), selection.category.as_deref())
                else {
                    return Err(InputViolation::UnknownIntervention(id));
                };
                let category = parse_category(&id, raw)?;
                Intervention {
                    id: id.clone(),
                    name: name.trim().to_string(),
                    category,
                    description: selection.description.clone().unwrap_or_default(),
                    intensity,
                    active: selection.active,
                }
            }
        };

        intervention.intensity = intensity;
        intervention.active = selection.active;
        Ok(intervention)
    }
}

fn checked_intensity(id: &str, intensity: i64) -> Result<u8, InputViolation> {
    u8::try_from(intensity)
        .ok()
        .filter(|value| *value <= MAX_INTENSITY)
        .ok_or_else(|| InputViolation::IntensityOutOfRange {
            id: id.to_string(),
            intensity,
        })
}

fn parse_category(id: &str, raw: &str) -> Result<InterventionCategory, InputViolation> {
    InterventionCategory::parse(raw).ok_or_else(|| InputViolation::UnknownCategory {
        id: id.to_string(),
        category: raw.to_string(),
    })
}

/// Checks applied to engine inputs regardless of how they were built.
pub fn validate_inputs(
    region: &Region,
    interventions: &[Intervention],
) -> Result<(), InputViolation> {
    if region.id.trim().is_empty() && region.name.trim().is_empty() {
        return Err(InputViolation::MissingRegion);
    }

    for (field, value) in [
        ("mortality", region.baseline_mortality),
        ("GDP per capita", region.baseline_gdp),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(InputViolation::InvalidRegionValue {
                region: region.name.clone(),
                field,
                value,
            });
        }
    }

    let mut seen = BTreeSet::new();
    for intervention in interventions {
        if intervention.id.trim().is_empty() {
            return Err(InputViolation::MissingInterventionId);
        }
        if intervention.intensity > MAX_INTENSITY {
            return Err(InputViolation::IntensityOutOfRange {
                id: intervention.id.clone(),
                intensity: i64::from(intervention.intensity),
            });
        }
        if intervention.active && !seen.insert(intervention.id.as_str()) {
            return Err(InputViolation::DuplicateIntervention(intervention.id.clone()));
        }
    }

    Ok(())
}
