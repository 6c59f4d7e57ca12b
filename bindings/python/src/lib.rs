//! Python bindings for Represent
//!
//! Thin wrapper around `represent-core` with no logic of its own, so Python
//! scrapers normalize exactly as the Rust tooling does.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use represent_core::{RawContact, RawPerson};

/// Collapse whitespace, drop zero-width spaces, normalize apostrophes.
///
/// Idempotent: clean_string(clean_string(x)) == clean_string(x)
#[pyfunction]
fn clean_string(s: &str) -> String {
    represent_core::clean_string(s)
}

/// clean_string, then drop one leading honorific and a trailing ", Ph.D".
#[pyfunction]
fn clean_name(s: &str) -> String {
    represent_core::clean_name(s)
}

/// Canonicalize a NANP number to 1-AAA-BBB-CCCC[ xEXT].
///
/// Input that is not exactly one number with at most one extension is
/// returned unchanged.
#[pyfunction]
fn clean_telephone_number(s: &str) -> String {
    represent_core::clean_telephone_number(s)
}

/// Abbreviate the province and format the postal code of an address.
#[pyfunction]
fn clean_address(s: &str) -> String {
    represent_core::clean_address(s)
}

/// Classify and canonicalize one contact detail.
///
/// Args:
///     contact_type: raw contact label ("Bus.", "Téléphone", ...)
///     value: raw contact value
///     note: raw note label, optional
///
/// Returns:
///     JSON string: {"type": "...", "value": "...", "note": "..." | null}
#[pyfunction]
#[pyo3(signature = (contact_type, value, note=None))]
fn clean_contact(contact_type: &str, value: &str, note: Option<&str>) -> PyResult<String> {
    let contact = represent_core::clean_contact(&RawContact::new(contact_type, value, note));
    serde_json::to_string(&contact)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Normalize one scraped person record.
///
/// Args:
///     json: JSON string of {name, post_id, role, party?, gender?, image?,
///           contacts, links, sources}
///
/// Returns:
///     JSON string of the normalized person
///
/// Raises:
///     ValueError: If the record is not valid JSON or lacks a required field
#[pyfunction]
fn clean_person(json: &str) -> PyResult<String> {
    let raw: RawPerson =
        serde_json::from_str(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&raw.build())
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Represent Python module - scraper normalization
#[pymodule]
fn represent(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(clean_string, m)?)?;
    m.add_function(wrap_pyfunction!(clean_name, m)?)?;
    m.add_function(wrap_pyfunction!(clean_telephone_number, m)?)?;
    m.add_function(wrap_pyfunction!(clean_address, m)?)?;
    m.add_function(wrap_pyfunction!(clean_contact, m)?)?;
    m.add_function(wrap_pyfunction!(clean_person, m)?)?;
    Ok(())
}
