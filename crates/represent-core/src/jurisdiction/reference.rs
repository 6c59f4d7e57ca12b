//! Reference data - Canadian geographic tables behind the identity resolver
//!
//! Tables come from the OCD division identifiers for `country-ca` and from
//! the Statistics Canada census type tables. They are fetched once through a
//! [`ReferenceSource`] by [`ReferenceData::load`] and are read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use csv::StringRecord;
use tracing::{debug, info};

use crate::{Error, Result};

pub const COUNTRY_DIVISION_ID: &str = "ocd-division/country:ca";

/// A reference table, by file name under the source's base location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    ProvincesAndTerritories,
    CensusDivisions,
    CensusSubdivisions,
    MontrealBoroughs,
    CensusSubdivisionUrls,
    MontrealBoroughUrls,
    CensusDivisionTypes,
    CensusSubdivisionTypes,
}

impl Dataset {
    pub const ALL: [Dataset; 8] = [
        Dataset::ProvincesAndTerritories,
        Dataset::CensusDivisions,
        Dataset::CensusSubdivisions,
        Dataset::MontrealBoroughs,
        Dataset::CensusSubdivisionUrls,
        Dataset::MontrealBoroughUrls,
        Dataset::CensusDivisionTypes,
        Dataset::CensusSubdivisionTypes,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::ProvincesAndTerritories => "ca_provinces_and_territories.csv",
            Dataset::CensusDivisions => "ca_census_divisions.csv",
            Dataset::CensusSubdivisions => "ca_census_subdivisions.csv",
            Dataset::MontrealBoroughs => "census_subdivision-montreal-boroughs.csv",
            Dataset::CensusSubdivisionUrls => "ca_census_subdivisions-url.csv",
            Dataset::MontrealBoroughUrls => "census_subdivision-montreal-boroughs-url.csv",
            Dataset::CensusDivisionTypes => "census_division_types.csv",
            Dataset::CensusSubdivisionTypes => "census_subdivision_types.csv",
        }
    }

    /// Copy shipped with the crate, for tables the OCD repository lacks
    pub fn bundled(self) -> Option<&'static str> {
        match self {
            Dataset::CensusDivisionTypes => {
                Some(include_str!("../../data/census_division_types.csv"))
            }
            Dataset::CensusSubdivisionTypes => {
                Some(include_str!("../../data/census_subdivision_types.csv"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ── Sources ───────────────────────────────────────────────

/// Where reference tables are read from
pub trait ReferenceSource {
    /// Raw CSV text of one dataset, header row included
    fn fetch(&self, dataset: Dataset) -> Result<String>;
}

/// Blocking HTTP source rooted at a base URL
pub struct HttpSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl ReferenceSource for HttpSource {
    fn fetch(&self, dataset: Dataset) -> Result<String> {
        if let Some(bundled) = dataset.bundled() {
            return Ok(bundled.to_string());
        }
        let url = format!("{}/{}", self.base_url, dataset.file_name());
        debug!(%url, "fetching reference dataset");
        let reference_error = |reason: String| Error::Reference {
            dataset: dataset.to_string(),
            reason,
        };
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| reference_error(format!("failed fetching {url}: {err}")))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|err| reference_error(format!("failed reading {url}: {err}")))
    }
}

/// Local directory holding the dataset files
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReferenceSource for DirectorySource {
    fn fetch(&self, dataset: Dataset) -> Result<String> {
        let path = self.dir.join(dataset.file_name());
        if path.is_file() {
            return Ok(fs::read_to_string(&path)?);
        }
        dataset
            .bundled()
            .map(str::to_string)
            .ok_or_else(|| Error::Reference {
                dataset: dataset.to_string(),
                reason: format!("{} not found", path.display()),
            })
    }
}

/// In-memory source, mostly for embedding fixed tables
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<Dataset, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dataset: Dataset, csv: &str) -> Self {
        self.tables.insert(dataset, csv.to_string());
        self
    }
}

impl ReferenceSource for MemorySource {
    fn fetch(&self, dataset: Dataset) -> Result<String> {
        match self.tables.get(&dataset) {
            Some(csv) => Ok(csv.clone()),
            None => dataset
                .bundled()
                .map(str::to_string)
                .ok_or_else(|| Error::Reference {
                    dataset: dataset.to_string(),
                    reason: "not provided".to_string(),
                }),
        }
    }
}

// ── Reference data bundle ─────────────────────────────────

/// Immutable bundle of every table the resolver consults
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// SGC code (`24`) → province or territory division id
    province_codes: BTreeMap<String, String>,
    /// Division id → name
    names: HashMap<String, String>,
    /// Census division/subdivision id → type code
    division_types: HashMap<String, String>,
    /// Census division/subdivision id → English type name
    type_names: HashMap<String, String>,
    /// Division id → official website
    urls: HashMap<String, String>,
}

impl ReferenceData {
    /// One-time load of every dataset from `source`
    ///
    /// Fails if any dataset is unavailable or malformed, or if a census
    /// division or subdivision uses a type code with no known name.
    pub fn load(source: &dyn ReferenceSource) -> Result<Self> {
        let mut data = ReferenceData::default();
        data.names
            .insert(COUNTRY_DIVISION_ID.to_string(), "Canada".to_string());

        for record in read_rows(source, Dataset::ProvincesAndTerritories)? {
            let id = column(&record, 0, Dataset::ProvincesAndTerritories)?;
            let name = column(&record, 1, Dataset::ProvincesAndTerritories)?;
            let code = column(&record, 4, Dataset::ProvincesAndTerritories)?;
            data.province_codes.insert(code.to_string(), id.to_string());
            data.names.insert(id.to_string(), name.to_string());
        }

        for record in read_rows(source, Dataset::MontrealBoroughs)? {
            let id = column(&record, 0, Dataset::MontrealBoroughs)?;
            let name = column(&record, 1, Dataset::MontrealBoroughs)?;
            data.names.insert(id.to_string(), name.to_string());
        }

        let division_type_names = read_type_names(source, Dataset::CensusDivisionTypes)?;
        data.load_census_table(source, Dataset::CensusDivisions, &division_type_names)?;
        let subdivision_type_names = read_type_names(source, Dataset::CensusSubdivisionTypes)?;
        data.load_census_table(source, Dataset::CensusSubdivisions, &subdivision_type_names)?;

        for dataset in [Dataset::CensusSubdivisionUrls, Dataset::MontrealBoroughUrls] {
            for record in read_rows(source, dataset)? {
                let id = column(&record, 0, dataset)?;
                let url = column(&record, 1, dataset)?;
                data.urls.insert(id.to_string(), url.to_string());
            }
        }

        info!(
            divisions = data.names.len(),
            urls = data.urls.len(),
            "loaded reference data"
        );
        Ok(data)
    }

    fn load_census_table(
        &mut self,
        source: &dyn ReferenceSource,
        dataset: Dataset,
        type_names: &HashMap<String, String>,
    ) -> Result<()> {
        for record in read_rows(source, dataset)? {
            let id = column(&record, 0, dataset)?;
            let name = column(&record, 1, dataset)?;
            let type_code = column(&record, 3, dataset)?;
            let type_name = type_names.get(type_code).ok_or_else(|| Error::MissingReference {
                table: type_table_name(dataset),
                key: type_code.to_string(),
            })?;
            self.names.insert(id.to_string(), name.to_string());
            self.division_types.insert(id.to_string(), type_code.to_string());
            self.type_names.insert(id.to_string(), type_name.clone());
        }
        Ok(())
    }

    /// Name of a division
    pub fn name(&self, division_id: &str) -> Result<&str> {
        lookup(&self.names, "division names", division_id)
    }

    /// Division id of the province or territory with SGC code `code`
    pub fn province_division_id(&self, code: &str) -> Result<&str> {
        self.province_codes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingReference {
                table: "province and territory codes",
                key: code.to_string(),
            })
    }

    /// SGC code of a province or territory division
    pub fn province_code(&self, division_id: &str) -> Result<&str> {
        self.province_codes
            .iter()
            .find(|(_, id)| id.as_str() == division_id)
            .map(|(code, _)| code.as_str())
            .ok_or_else(|| Error::MissingReference {
                table: "province and territory codes",
                key: division_id.to_string(),
            })
    }

    /// Census type code of a census division or subdivision
    pub fn division_type(&self, division_id: &str) -> Result<&str> {
        lookup(&self.division_types, "census division types", division_id)
    }

    /// English census type name of a census division or subdivision
    pub fn type_name(&self, division_id: &str) -> Result<&str> {
        lookup(&self.type_names, "census type names", division_id)
    }

    pub fn url(&self, division_id: &str) -> Option<&str> {
        self.urls
            .get(division_id)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

fn lookup<'a>(
    map: &'a HashMap<String, String>,
    table: &'static str,
    key: &str,
) -> Result<&'a str> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| Error::MissingReference {
            table,
            key: key.to_string(),
        })
}

fn type_table_name(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::CensusDivisions => "census division type names",
        _ => "census subdivision type names",
    }
}

fn read_rows(source: &dyn ReferenceSource, dataset: Dataset) -> Result<Vec<StringRecord>> {
    let text = source.fetch(dataset)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(dataset = dataset.file_name(), rows = records.len(), "read reference dataset");
    Ok(records)
}

fn column<'r>(record: &'r StringRecord, index: usize, dataset: Dataset) -> Result<&'r str> {
    record.get(index).ok_or_else(|| Error::Reference {
        dataset: dataset.to_string(),
        reason: format!("row {:?} has no column {}", record, index),
    })
}

/// Type code → English type name; `Town / Ville` keeps `Town`
fn read_type_names(
    source: &dyn ReferenceSource,
    dataset: Dataset,
) -> Result<HashMap<String, String>> {
    let mut names = HashMap::new();
    for record in read_rows(source, dataset)? {
        let code = column(&record, 0, dataset)?;
        let title = column(&record, 1, dataset)?;
        names.insert(code.to_string(), english_title(title).to_string());
    }
    Ok(names)
}

fn english_title(title: &str) -> &str {
    match title.find(" /") {
        Some(index) if title.len() > index + 2 => &title[..index],
        _ => title,
    }
}
