//! Identity resolver - division id + aggregation flag → [`JurisdictionIdentity`]
//!
//! Dispatches on the type tag of the division id's last segment:
//!
//! | Tag | Module | Display name | Scope |
//! |---|---|---|---|
//! | `country` | `ca` | House of Commons | legislature |
//! | `province`, `territory` | `ca_<id>` | Legislative Assembly of … | legislature / municipalities |
//! | `cd` | `ca_<pt>_<slug>` | `<Name> <Type> Council` | council |
//! | `csd` | `ca_<pt>_<slug>` | `<Name> <Type> Council`, or French in Québec | council |
//! | `arrondissement` | `ca_<pt>_<city>_<borough>` | Conseil d'arrondissement … | council |

use tracing::debug;

use super::reference::{ReferenceData, COUNTRY_DIVISION_ID};
use super::{class_name, jurisdiction_id, slug, split_jurisdiction_id, JurisdictionIdentity, JurisdictionScope};
use crate::{Error, Result};

/// SGC prefix of Québec census codes
const QUEBEC_CODE: &str = "24";

/// Resolves jurisdiction identities against loaded reference data
#[derive(Debug, Clone)]
pub struct Resolver {
    reference: ReferenceData,
}

/// Per-branch results, before the shared fields are filled in
struct Branch {
    module_name: String,
    display_name: String,
    geographic_code: Option<String>,
    division_type: Option<String>,
    scope: JurisdictionScope,
}

impl Resolver {
    pub fn new(reference: ReferenceData) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Derive the identity of the jurisdiction for `division_id`
    ///
    /// # Errors
    /// `UnrecognizedDivisionType` for an unknown type tag,
    /// `InvalidDivisionId` for a malformed id, and `MissingReference` when
    /// the reference data lacks a row the derivation needs.
    pub fn resolve(&self, division_id: &str, aggregation: bool) -> Result<JurisdictionIdentity> {
        let sections: Vec<&str> = division_id.split('/').collect();
        let last = sections.last().copied().unwrap_or_default();
        let (ocd_type, ocd_type_id) = last
            .split_once(':')
            .ok_or_else(|| Error::InvalidDivisionId(division_id.to_string()))?;

        let branch = match ocd_type {
            "country" => Branch {
                module_name: "ca".to_string(),
                display_name: "House of Commons".to_string(),
                geographic_code: Some("1".to_string()),
                division_type: None,
                scope: JurisdictionScope::Legislature,
            },
            "province" | "territory" => self.province(division_id, ocd_type_id, aggregation)?,
            "cd" => self.census_division(division_id, ocd_type_id)?,
            "csd" => self.census_subdivision(division_id, ocd_type_id)?,
            "arrondissement" => self.borough(division_id, &sections)?,
            _ => {
                return Err(Error::UnrecognizedDivisionType {
                    division_id: division_id.to_string(),
                    ocd_type: ocd_type.to_string(),
                })
            }
        };

        let division_name = self.reference.name(division_id)?.to_string();
        let mut class = class_name(&division_name);
        if aggregation {
            class.push_str("Municipalities");
        }

        debug!(division_id, module_name = %branch.module_name, "resolved jurisdiction");
        Ok(JurisdictionIdentity {
            module_name: branch.module_name,
            class_name: class,
            jurisdiction_id: jurisdiction_id(division_id, branch.scope),
            division_id: division_id.to_string(),
            division_name,
            display_name: branch.display_name,
            geographic_code: branch.geographic_code,
            division_type: branch.division_type,
            url: self.reference.url(division_id).unwrap_or_default().to_string(),
        })
    }

    /// Map a Standard Geographical Classification code to a division id
    ///
    /// One digit is the country, two a province or territory, four a census
    /// division and seven a census subdivision.
    pub fn division_id_for_geographic_code(&self, code: &str) -> Result<String> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidGeographicCode(code.to_string()));
        }
        match code.len() {
            1 => Ok(COUNTRY_DIVISION_ID.to_string()),
            2 => Ok(self.reference.province_division_id(code)?.to_string()),
            4 => Ok(format!("{}/cd:{}", COUNTRY_DIVISION_ID, code)),
            7 => Ok(format!("{}/csd:{}", COUNTRY_DIVISION_ID, code)),
            _ => Err(Error::InvalidGeographicCode(code.to_string())),
        }
    }

    /// Resolve a geographic code, a division id or a jurisdiction id
    ///
    /// A jurisdiction id ending in `/municipalities` implies aggregation.
    pub fn resolve_identifier(&self, identifier: &str, aggregation: bool) -> Result<JurisdictionIdentity> {
        let identifier = identifier.trim();
        if identifier.chars().all(|c| c.is_ascii_digit()) {
            let division_id = self.division_id_for_geographic_code(identifier)?;
            return self.resolve(&division_id, aggregation);
        }
        let (division_id, implied) = split_jurisdiction_id(identifier);
        self.resolve(&division_id, aggregation || implied)
    }

    // ── Branches ──────────────────────────────────────────

    fn province(&self, division_id: &str, type_id: &str, aggregation: bool) -> Result<Branch> {
        let name = self.reference.name(division_id)?;
        let (module_name, display_name, scope) = if aggregation {
            (
                format!("ca_{}_municipalities", type_id),
                format!("{} Municipalities", name),
                JurisdictionScope::Municipalities,
            )
        } else {
            let display_name = match type_id {
                "nl" | "ns" => format!("{} House of Assembly", name),
                "qc" => "Assemblée nationale du Québec".to_string(),
                _ => format!("Legislative Assembly of {}", name),
            };
            (format!("ca_{}", type_id), display_name, JurisdictionScope::Legislature)
        };
        Ok(Branch {
            module_name,
            display_name,
            geographic_code: Some(self.reference.province_code(division_id)?.to_string()),
            division_type: None,
            scope,
        })
    }

    fn census_division(&self, division_id: &str, code: &str) -> Result<Branch> {
        let name = self.reference.name(division_id)?;
        let infix = match self.reference.type_name(division_id)? {
            "Regional municipality" => "Regional",
            other => other,
        };
        Ok(Branch {
            module_name: format!("ca_{}_{}", self.province_type_id(code)?, slug(name)),
            display_name: format!("{} {} Council", name, infix),
            geographic_code: Some(code.to_string()),
            division_type: Some(self.reference.division_type(division_id)?.to_string()),
            scope: JurisdictionScope::Council,
        })
    }

    fn census_subdivision(&self, division_id: &str, code: &str) -> Result<Branch> {
        let name = self.reference.name(division_id)?;
        let display_name = if code.starts_with(QUEBEC_CODE) {
            format!("Conseil municipal {}", french_of(name))
        } else {
            let infix = match self.reference.type_name(division_id)? {
                "Municipality" | "Specialized municipality" => "Municipal",
                "Regional municipality" => "Regional",
                other => other,
            };
            format!("{} {} Council", name, infix)
        };
        Ok(Branch {
            module_name: format!("ca_{}_{}", self.province_type_id(code)?, slug(name)),
            display_name,
            geographic_code: Some(code.to_string()),
            division_type: Some(self.reference.division_type(division_id)?.to_string()),
            scope: JurisdictionScope::Council,
        })
    }

    fn borough(&self, division_id: &str, sections: &[&str]) -> Result<Branch> {
        let invalid = || Error::InvalidDivisionId(division_id.to_string());
        let parent = sections.len().checked_sub(1).ok_or_else(invalid)?;
        let parent_id = sections[..parent].join("/");
        let (_, subdivision_code) = parent
            .checked_sub(1)
            .and_then(|index| sections[index].split_once(':'))
            .ok_or_else(invalid)?;
        let city = self.reference.name(&parent_id)?;
        let name = self.reference.name(division_id)?;

        let display_name = match name.strip_prefix("Le ") {
            Some(rest) => format!("Conseil d'arrondissement du {}", rest),
            None => format!("Conseil d'arrondissement {}", french_of(name)),
        };
        Ok(Branch {
            module_name: format!(
                "ca_{}_{}_{}",
                self.province_type_id(subdivision_code)?,
                slug(city),
                slug(name)
            ),
            display_name,
            geographic_code: None,
            division_type: None,
            scope: JurisdictionScope::Council,
        })
    }

    /// `24…` → `qc`: the province or territory holding a census code
    fn province_type_id(&self, code: &str) -> Result<&str> {
        let prefix = code
            .get(..2)
            .ok_or_else(|| Error::InvalidGeographicCode(code.to_string()))?;
        let province_id = self.reference.province_division_id(prefix)?;
        Ok(province_id.rsplit(':').next().unwrap_or(province_id))
    }
}

fn starts_with_vowel(name: &str) -> bool {
    name.chars()
        .next()
        .map(|c| super::ascii_fold(&c.to_string()))
        .is_some_and(|folded| matches!(folded.as_str(), "A" | "E" | "I" | "O" | "U"))
}

/// `de X`, or `d'X` before a vowel
fn french_of(name: &str) -> String {
    if starts_with_vowel(name) {
        format!("d'{}", name)
    } else {
        format!("de {}", name)
    }
}
