//! Error types for the Represent core
//!
//! Malformed phone numbers, malformed addresses and unclassified contact
//! labels are never errors: those pass through unchanged. Everything here
//! stops processing of one jurisdiction or one batch.

use std::io;

use thiserror::Error;

/// Represent core error types
#[derive(Debug, Error)]
pub enum Error {
    /// Division id whose last segment carries an unknown type tag
    #[error("{division_id}: unrecognized OCD type {ocd_type}")]
    UnrecognizedDivisionType {
        division_id: String,
        ocd_type: String,
    },

    /// Division id that is not a `/`-separated list of `type:id` segments
    #[error("invalid division id: {0}")]
    InvalidDivisionId(String),

    /// Standard Geographical Classification code of an unsupported length
    #[error("unrecognized geographic code {0}")]
    InvalidGeographicCode(String),

    /// Reference table has no row for the requested key
    #[error("no entry for {key} in {table}")]
    MissingReference { table: &'static str, key: String },

    /// Two configured jurisdictions share a jurisdiction id
    #[error("duplicate jurisdiction_id {0}")]
    DuplicateJurisdiction(String),

    /// Two configured jurisdictions of the same scope share a division id
    #[error("{module_name}: duplicate division_id {division_id}")]
    DuplicateDivision {
        module_name: String,
        division_id: String,
    },

    /// Registry entry that cannot be validated
    #[error("validation error: {0}")]
    Validation(String),

    /// Reference dataset could not be fetched or read
    #[error("reference data {dataset}: {reason}")]
    Reference { dataset: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Represent operations
pub type Result<T> = std::result::Result<T, Error>;
