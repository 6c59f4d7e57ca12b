//! Jurisdiction registry - the manifest of scraper modules and its tidy check
//!
//! The manifest is a JSON array of [`JurisdictionRecord`]s. Each record
//! declares what it scrapes through `provides`, so callers test membership
//! instead of probing for scraper classes.
//!
//! # Tidy
//!
//! [`Registry::tidy`] resolves the expected identity of every record and
//! accumulates all discrepancies rather than stopping at the first one.
//! Structural problems (duplicate ids, ambiguous divisions) are fatal and
//! returned as errors; field mismatches become [`Finding`]s.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{JurisdictionIdentity, Resolver};
use crate::{Error, Result};

// ── Records ───────────────────────────────────────────────

/// Kind of data a jurisdiction module scrapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperType {
    Bills,
    Events,
    People,
    Speeches,
    Votes,
}

impl ScraperType {
    pub const ALL: [ScraperType; 5] = [
        ScraperType::Bills,
        ScraperType::Events,
        ScraperType::People,
        ScraperType::Speeches,
        ScraperType::Votes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScraperType::Bills => "bills",
            ScraperType::Events => "events",
            ScraperType::People => "people",
            ScraperType::Speeches => "speeches",
            ScraperType::Votes => "votes",
        }
    }

    fn class_suffix(self) -> &'static str {
        match self {
            ScraperType::Bills => "Bill",
            ScraperType::Events => "Event",
            ScraperType::People => "Person",
            ScraperType::Speeches => "Speech",
            ScraperType::Votes => "Vote",
        }
    }
}

impl fmt::Display for ScraperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraper module as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRecord {
    pub module_name: String,
    pub class_name: String,
    pub jurisdiction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Page the people scraper starts from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council_page: Option<String>,
    #[serde(default)]
    pub provides: Vec<ScraperType>,
}

impl JurisdictionRecord {
    pub fn provides(&self, scraper: ScraperType) -> bool {
        self.provides.contains(&scraper)
    }

    /// `VancouverPersonScraper`, or `None` if the module lacks that scraper
    pub fn scraper_class_name(&self, scraper: ScraperType) -> Option<String> {
        self.provides(scraper)
            .then(|| format!("{}{}Scraper", self.class_name, scraper.class_suffix()))
    }

    pub fn is_aggregation(&self) -> bool {
        self.module_name.ends_with("_municipalities")
    }

    pub fn is_candidates(&self) -> bool {
        self.module_name.ends_with("_candidates")
    }

    /// Division id from `division_id` or `geographic_code`; exactly one
    /// must be set
    pub fn resolved_division_id(&self, resolver: &Resolver) -> Result<String> {
        match (&self.division_id, self.geographic_code) {
            (Some(division_id), None) => Ok(division_id.clone()),
            (None, Some(code)) => resolver.division_id_for_geographic_code(&code.to_string()),
            (Some(_), Some(_)) => Err(Error::Validation(format!(
                "{}: set division_id or geographic_code, not both",
                self.module_name
            ))),
            (None, None) => Err(Error::Validation(format!(
                "{}: no division_id or geographic_code",
                self.module_name
            ))),
        }
    }

    /// Manifest entry for a new module scraping people
    pub fn scaffold(identity: &JurisdictionIdentity) -> Self {
        let geographic_code = identity
            .geographic_code
            .as_deref()
            .and_then(|code| code.parse::<u32>().ok());
        Self {
            module_name: identity.module_name.clone(),
            class_name: identity.class_name.clone(),
            jurisdiction_id: identity.jurisdiction_id.clone(),
            division_id: geographic_code.is_none().then(|| identity.division_id.clone()),
            geographic_code,
            division_name: Some(identity.division_name.clone()),
            name: Some(identity.display_name.clone()),
            url: Some(identity.url.clone()).filter(|url| !url.is_empty()),
            council_page: None,
            provides: vec![ScraperType::People],
        }
    }
}

// ── Registry ──────────────────────────────────────────────

/// Ordered collection of manifest records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    records: Vec<JurisdictionRecord>,
}

impl Registry {
    pub fn new(records: Vec<JurisdictionRecord>) -> Self {
        Self { records }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let registry = Self::from_json(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), records = registry.len(), "loaded manifest");
        Ok(registry)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    pub fn records(&self) -> &[JurisdictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, module_name: &str) -> Option<&JurisdictionRecord> {
        self.records.iter().find(|r| r.module_name == module_name)
    }

    /// Records providing `scraper`, in manifest order
    pub fn providing(&self, scraper: ScraperType) -> impl Iterator<Item = &JurisdictionRecord> {
        self.records.iter().filter(move |r| r.provides(scraper))
    }

    /// Check every record against the identity derived from its division
    ///
    /// # Errors
    /// Duplicate jurisdiction ids, duplicate division ids within the
    /// aggregate or the non-aggregate set, records setting both or neither
    /// of `division_id` and `geographic_code`, and resolution failures.
    pub fn tidy(&self, resolver: &Resolver) -> Result<TidyReport> {
        let mut report = TidyReport::default();
        let mut jurisdiction_ids = BTreeSet::new();
        let mut division_ids = BTreeSet::new();
        let mut aggregation_division_ids = BTreeSet::new();

        for (index, record) in self.records.iter().enumerate() {
            if record.is_candidates() {
                debug!(module_name = %record.module_name, "skipping candidates module");
                report.skipped += 1;
                continue;
            }

            if !jurisdiction_ids.insert(record.jurisdiction_id.as_str()) {
                return Err(Error::DuplicateJurisdiction(record.jurisdiction_id.clone()));
            }

            let division_id = record.resolved_division_id(resolver)?;
            let aggregation = record.is_aggregation();
            let seen = if aggregation {
                &mut aggregation_division_ids
            } else {
                &mut division_ids
            };
            if !seen.insert(division_id.clone()) {
                return Err(Error::DuplicateDivision {
                    module_name: record.module_name.clone(),
                    division_id,
                });
            }

            let expected = resolver.resolve(&division_id, aggregation)?;
            check_record(index, record, &expected, &mut report);
            report.checked += 1;
        }

        info!(
            checked = report.checked,
            errors = report.errors().len(),
            warnings = report.warnings().len(),
            "tidied manifest"
        );
        Ok(report)
    }
}

// ── Tidy report ───────────────────────────────────────────

/// Severity level for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Record field a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ModuleName,
    ClassName,
    JurisdictionId,
    DivisionName,
    Name,
    Url,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::ModuleName => write!(f, "module_name"),
            Field::ClassName => write!(f, "class_name"),
            Field::JurisdictionId => write!(f, "jurisdiction_id"),
            Field::DivisionName => write!(f, "division_name"),
            Field::Name => write!(f, "name"),
            Field::Url => write!(f, "url"),
        }
    }
}

/// One field that disagrees with the derived identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Position of the record in the manifest
    pub record: usize,
    pub module_name: String,
    pub severity: Severity,
    pub field: Field,
    pub actual: Option<String>,
    pub expected: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let actual = self.actual.as_deref().unwrap_or("<unset>");
        if self.field == Field::Url && self.expected.is_empty() {
            write!(f, "{} [url] {}: {} has no reference URL", prefix, self.module_name, actual)
        } else {
            write!(
                f,
                "{} [{}] {}: expected {:?}, found {:?}",
                prefix, self.field, self.module_name, self.expected, actual
            )
        }
    }
}

/// Result of a tidy pass: accumulates all findings
#[derive(Debug, Clone, Default, Serialize)]
pub struct TidyReport {
    pub findings: Vec<Finding>,
    pub checked: usize,
    pub skipped: usize,
}

impl TidyReport {
    /// Returns true if no errors were found (warnings are OK)
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn errors(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .collect()
    }

    /// Rewrite every error-level field to its expected value
    ///
    /// Warnings are left alone. Returns the number of fields rewritten.
    pub fn apply(&self, registry: &mut Registry) -> usize {
        let mut rewritten = 0;
        for finding in self.errors() {
            let Some(record) = registry.records.get_mut(finding.record) else {
                continue;
            };
            let value = finding.expected.clone();
            match finding.field {
                Field::ModuleName => record.module_name = value,
                Field::ClassName => record.class_name = value,
                Field::JurisdictionId => record.jurisdiction_id = value,
                Field::DivisionName => record.division_name = Some(value),
                Field::Name => record.name = Some(value),
                Field::Url => record.url = Some(value),
            }
            rewritten += 1;
        }
        rewritten
    }

    fn push(&mut self, record: usize, module_name: &str, severity: Severity, field: Field, actual: Option<&str>, expected: &str) {
        self.findings.push(Finding {
            record,
            module_name: module_name.to_string(),
            severity,
            field,
            actual: actual.map(str::to_string),
            expected: expected.to_string(),
        });
    }
}

fn check_record(index: usize, record: &JurisdictionRecord, expected: &JurisdictionIdentity, report: &mut TidyReport) {
    let module = record.module_name.as_str();
    let url = record.url.as_deref().filter(|url| !url.is_empty());

    if url.is_some() && expected.url.is_empty() {
        report.push(index, module, Severity::Warning, Field::Url, url, "");
    }
    if record.name.as_deref() != Some(expected.display_name.as_str()) {
        report.push(index, module, Severity::Warning, Field::Name, record.name.as_deref(), &expected.display_name);
    }
    if record.class_name != expected.class_name {
        report.push(index, module, Severity::Error, Field::ClassName, Some(record.class_name.as_str()), &expected.class_name);
    }
    if record.jurisdiction_id != expected.jurisdiction_id {
        report.push(
            index,
            module,
            Severity::Error,
            Field::JurisdictionId,
            Some(record.jurisdiction_id.as_str()),
            &expected.jurisdiction_id,
        );
    }
    if record.division_name.as_deref() != Some(expected.division_name.as_str()) {
        report.push(
            index,
            module,
            Severity::Error,
            Field::DivisionName,
            record.division_name.as_deref(),
            &expected.division_name,
        );
    }
    if !expected.url.is_empty() && url != Some(expected.url.as_str()) {
        report.push(index, module, Severity::Error, Field::Url, url, &expected.url);
    }
    if record.module_name != expected.module_name {
        report.push(index, module, Severity::Error, Field::ModuleName, Some(module), &expected.module_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jurisdiction::{DirectorySource, ReferenceData};

    fn resolver() -> Resolver {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/reference");
        Resolver::new(ReferenceData::load(&DirectorySource::new(dir)).unwrap())
    }

    fn vancouver() -> serde_json::Value {
        serde_json::json!({
            "module_name": "ca_bc_vancouver",
            "class_name": "Vancouver",
            "jurisdiction_id": "ocd-jurisdiction/country:ca/csd:5915022/council",
            "geographic_code": 5915022,
            "division_name": "Vancouver",
            "name": "Vancouver City Council",
            "url": "http://vancouver.ca",
            "council_page": "http://vancouver.ca/your-government/vancouver-city-council.aspx",
            "provides": ["people"]
        })
    }

    fn registry(records: Vec<serde_json::Value>) -> Registry {
        Registry::from_json(&serde_json::Value::Array(records).to_string()).unwrap()
    }

    // ── Records ────────────────────────────────────────

    #[test]
    fn test_provides_and_scraper_class_names() {
        let reg = registry(vec![vancouver()]);
        let record = &reg.records()[0];
        assert!(record.provides(ScraperType::People));
        assert!(!record.provides(ScraperType::Bills));
        assert_eq!(
            record.scraper_class_name(ScraperType::People).as_deref(),
            Some("VancouverPersonScraper")
        );
        assert_eq!(record.scraper_class_name(ScraperType::Votes), None);
        assert_eq!(reg.providing(ScraperType::People).count(), 1);
    }

    #[test]
    fn test_lookup_by_module_name() {
        let record: JurisdictionRecord = serde_json::from_value(vancouver()).unwrap();
        let reg = Registry::new(vec![record]);
        assert_eq!(reg.len(), 1);
        assert!(reg.get("ca_bc_vancouver").is_some());
        assert!(reg.get("ca_bc").is_none());

        let provided: Vec<String> = ScraperType::ALL
            .iter()
            .filter(|s| reg.records()[0].provides(**s))
            .map(|s| s.to_string())
            .collect();
        assert_eq!(provided, vec!["people"]);
    }

    #[test]
    fn test_aggregation_and_candidates() {
        let mut record: JurisdictionRecord = serde_json::from_value(vancouver()).unwrap();
        assert!(!record.is_aggregation());
        record.module_name = "ca_ns_municipalities".to_string();
        assert!(record.is_aggregation());
        record.module_name = "ca_candidates".to_string();
        assert!(record.is_candidates());
    }

    #[test]
    fn test_scaffold() {
        let identity = resolver().resolve_identifier("3530004", false).unwrap();
        let record = JurisdictionRecord::scaffold(&identity);
        assert_eq!(record.module_name, "ca_on_north_dumfries");
        assert_eq!(record.geographic_code, Some(3530004));
        assert_eq!(record.division_id, None);
        assert_eq!(record.name.as_deref(), Some("North Dumfries Township Council"));
        assert_eq!(record.url, None);
        assert_eq!(record.provides, vec![ScraperType::People]);
    }

    #[test]
    fn test_scaffold_borough_keeps_division_id() {
        let identity = resolver()
            .resolve("ocd-division/country:ca/csd:2466023/arrondissement:outremont", false)
            .unwrap();
        let record = JurisdictionRecord::scaffold(&identity);
        assert_eq!(record.geographic_code, None);
        assert_eq!(record.division_id.as_deref(), Some(identity.division_id.as_str()));
    }

    #[test]
    fn test_json_round_trip_preserves_manifest() {
        let reg = registry(vec![vancouver()]);
        let again = Registry::from_json(&reg.to_json().unwrap()).unwrap();
        assert_eq!(reg, again);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jurisdictions.json");
        let reg = registry(vec![vancouver()]);
        reg.save(&path).unwrap();
        assert_eq!(Registry::load(&path).unwrap(), reg);
    }

    // ── Tidy ───────────────────────────────────────────

    #[test]
    fn test_tidy_clean_manifest() {
        let report = registry(vec![vancouver()]).tidy(&resolver()).unwrap();
        assert!(report.is_valid());
        assert!(report.findings.is_empty());
        assert_eq!(report.checked, 1);
    }

    #[test]
    fn test_tidy_reports_mismatches() {
        let mut record = vancouver();
        record["class_name"] = "VancouverCity".into();
        record["name"] = "Council of Vancouver".into();
        record["url"] = "http://old.vancouver.ca".into();
        let report = registry(vec![record]).tidy(&resolver()).unwrap();

        assert!(!report.is_valid());
        let errors: Vec<Field> = report.errors().iter().map(|f| f.field).collect();
        assert_eq!(errors, vec![Field::ClassName, Field::Url]);
        let warnings: Vec<Field> = report.warnings().iter().map(|f| f.field).collect();
        assert_eq!(warnings, vec![Field::Name]);
    }

    #[test]
    fn test_url_without_reference_is_a_warning() {
        let record = serde_json::json!({
            "module_name": "ca_on_north_dumfries",
            "class_name": "NorthDumfries",
            "jurisdiction_id": "ocd-jurisdiction/country:ca/csd:3530004/council",
            "geographic_code": 3530004,
            "division_name": "North Dumfries",
            "name": "North Dumfries Township Council",
            "url": "http://www.northdumfries.ca",
            "provides": ["people"]
        });
        let report = registry(vec![record]).tidy(&resolver()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.warnings()[0].field, Field::Url);
        assert!(report.warnings()[0].to_string().contains("no reference URL"));
    }

    #[test]
    fn test_tidy_fix_applies_expected_values() {
        let mut record = vancouver();
        record["module_name"] = "ca_vancouver".into();
        record["jurisdiction_id"] = "ocd-jurisdiction/country:ca/csd:5915022".into();
        record["division_name"] = "City of Vancouver".into();
        let mut reg = registry(vec![record]);
        let resolver = resolver();

        let report = reg.tidy(&resolver).unwrap();
        assert_eq!(report.errors().len(), 3);
        assert_eq!(report.apply(&mut reg), 3);

        let fixed = &reg.records()[0];
        assert_eq!(fixed.module_name, "ca_bc_vancouver");
        assert_eq!(fixed.jurisdiction_id, "ocd-jurisdiction/country:ca/csd:5915022/council");
        assert_eq!(fixed.division_name.as_deref(), Some("Vancouver"));
        assert!(reg.tidy(&resolver).unwrap().is_valid());
    }

    #[test]
    fn test_duplicate_jurisdiction_is_fatal() {
        let mut other = vancouver();
        other["module_name"] = "ca_bc_vancouver_2".into();
        let err = registry(vec![vancouver(), other]).tidy(&resolver()).unwrap_err();
        assert!(matches!(err, Error::DuplicateJurisdiction(_)));
    }

    #[test]
    fn test_duplicate_division_is_fatal() {
        let mut other = vancouver();
        other["module_name"] = "ca_bc_vancouver_2".into();
        other["jurisdiction_id"] = "ocd-jurisdiction/country:ca/csd:5915022/council2".into();
        let err = registry(vec![vancouver(), other]).tidy(&resolver()).unwrap_err();
        assert!(matches!(err, Error::DuplicateDivision { division_id, .. }
            if division_id == "ocd-division/country:ca/csd:5915022"));
    }

    #[test]
    fn test_aggregate_may_share_division_with_legislature() {
        let records = vec![
            serde_json::json!({
                "module_name": "ca_pe",
                "class_name": "PrinceEdwardIsland",
                "jurisdiction_id": "ocd-jurisdiction/country:ca/province:pe/legislature",
                "geographic_code": 11,
                "division_name": "Prince Edward Island",
                "name": "Legislative Assembly of Prince Edward Island",
                "provides": ["people"]
            }),
            serde_json::json!({
                "module_name": "ca_pe_municipalities",
                "class_name": "PrinceEdwardIslandMunicipalities",
                "jurisdiction_id": "ocd-jurisdiction/country:ca/province:pe/municipalities",
                "division_id": "ocd-division/country:ca/province:pe",
                "division_name": "Prince Edward Island",
                "name": "Prince Edward Island Municipalities",
                "provides": ["people"]
            }),
        ];
        let report = registry(records).tidy(&resolver()).unwrap();
        assert!(report.is_valid(), "{:?}", report.findings);
        assert_eq!(report.checked, 2);
    }

    #[test]
    fn test_both_division_and_code_is_fatal() {
        let mut record = vancouver();
        record["division_id"] = "ocd-division/country:ca/csd:5915022".into();
        let err = registry(vec![record]).tidy(&resolver()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_candidates_are_skipped() {
        let record = serde_json::json!({
            "module_name": "ca_candidates",
            "class_name": "CanadaCandidates",
            "jurisdiction_id": "ocd-jurisdiction/country:ca/candidates",
            "provides": ["people"]
        });
        let report = registry(vec![record]).tidy(&resolver()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.checked, 0);
    }
}
