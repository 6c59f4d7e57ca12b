//! Represent Core - normalization for Canadian elected-official scrapers
//!
//! Site scrapers hand over raw strings; this crate turns them into canonical
//! person records and derives the identity of every jurisdiction from its
//! OCD division id.
//!
//! # Architecture
//!
//! ```text
//! RawPerson → Text Normalizer → Contact Classifier → Phone / Address → Person
//!
//! ReferenceSource → ReferenceData → Resolver → JurisdictionIdentity
//!                                      ↓
//!                              Registry::tidy → TidyReport
//! ```
//!
//! # Guarantees
//!
//! - **Idempotent**: every normalizer returns its own output unchanged
//! - **Total**: unparseable phones and addresses pass through, never fail
//! - **Deterministic**: resolution is a pure function of id and reference data

pub mod address;
pub mod config;
pub mod contact;
pub mod error;
pub mod jurisdiction;
pub mod person;
pub mod phone;
pub mod text;

pub use address::clean_address;
pub use config::ReferenceConfig;
pub use contact::{clean_contact, Contact, ContactNote, ContactType, RawContact};
pub use error::{Error, Result};
pub use jurisdiction::{JurisdictionIdentity, ReferenceData, Registry, Resolver};
pub use person::{Link, Person, RawLink, RawPerson};
pub use phone::clean_telephone_number;
pub use text::{clean_name, clean_string};
