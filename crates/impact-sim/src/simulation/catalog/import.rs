use super::super::domain::Region;
use super::RegionCatalog;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read region catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid region catalog CSV: {}", err),
            CatalogImportError::InvalidRow { line, reason } => {
                write!(f, "invalid region catalog row at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads extra catalog regions from a CSV export with the columns
/// `id,name,population,mortality,gdp,description,countries`.
pub struct RegionCatalogImporter;

impl RegionCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        base: &RegionCatalog,
    ) -> Result<RegionCatalog, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, base)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        base: &RegionCatalog,
    ) -> Result<RegionCatalog, CatalogImportError> {
        let regions = parse_regions(reader)?;
        Ok(base.with_overrides(regions))
    }
}

fn parse_regions<R: Read>(reader: R) -> Result<Vec<Region>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut regions = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let mut row: RegionRow = record.deserialize(Some(&headers))?;
        row.line = record.position().map(|position| position.line()).unwrap_or(0);
        regions.push(row.into_region()?);
    }

    Ok(regions)
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    #[serde(skip)]
    line: u64,
    id: String,
    name: String,
    population: u64,
    mortality: f64,
    gdp: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    countries: Option<String>,
}

impl RegionRow {
    fn into_region(self) -> Result<Region, CatalogImportError> {
        let line = self.line;
        let invalid = move |reason: String| CatalogImportError::InvalidRow { line, reason };

        if self.id.is_empty() {
            return Err(invalid("region id is empty".to_string()));
        }
        if self.population == 0 {
            return Err(invalid(format!("region '{}' has zero population", self.id)));
        }
        if !self.mortality.is_finite() || self.mortality <= 0.0 {
            return Err(invalid(format!(
                "region '{}' mortality must be positive, found {}",
                self.id, self.mortality
            )));
        }
        if !self.gdp.is_finite() || self.gdp <= 0.0 {
            return Err(invalid(format!(
                "region '{}' GDP per capita must be positive, found {}",
                self.id, self.gdp
            )));
        }

        let countries = self
            .countries
            .as_deref()
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|country| !country.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let name = if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name
        };

        Ok(Region {
            id: self.id,
            name,
            population: self.population,
            baseline_mortality: self.mortality,
            baseline_gdp: self.gdp,
            description: self.description.unwrap_or_default(),
            estimated: false,
            countries,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}
