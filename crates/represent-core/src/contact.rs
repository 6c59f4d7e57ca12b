//! Contact classifier - raw contact labels to canonical type and note
//!
//! Scrapers hand over whatever label the site uses ("Bus.", "Téléphone
//! (bureau)", "Home Phone*"). Two independent tables resolve it: one to a
//! [`ContactType`], one to a [`ContactNote`]. Many labels collapse to
//! `voice` but still name where the number rings.

use std::fmt;

use crate::address::clean_address;
use crate::phone::clean_telephone_number;
use crate::text::clean_string;

// ── Types ─────────────────────────────────────────────────

/// Canonical contact detail type
///
/// Labels that are neither in the classification table nor already
/// canonical are kept, lowercased, as [`ContactType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContactType {
    Address,
    Voice,
    Fax,
    Cell,
    Email,
    Video,
    Pager,
    Text,
    Other(String),
}

impl ContactType {
    pub fn as_str(&self) -> &str {
        match self {
            ContactType::Address => "address",
            ContactType::Voice => "voice",
            ContactType::Fax => "fax",
            ContactType::Cell => "cell",
            ContactType::Email => "email",
            ContactType::Video => "video",
            ContactType::Pager => "pager",
            ContactType::Text => "text",
            ContactType::Other(label) => label,
        }
    }

    /// Types whose values are telephone numbers
    pub fn is_telephony(&self) -> bool {
        matches!(
            self,
            ContactType::Text
                | ContactType::Voice
                | ContactType::Fax
                | ContactType::Cell
                | ContactType::Video
                | ContactType::Pager
        )
    }
}

impl From<String> for ContactType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "address" => ContactType::Address,
            "voice" => ContactType::Voice,
            "fax" => ContactType::Fax,
            "cell" => ContactType::Cell,
            "email" => ContactType::Email,
            "video" => ContactType::Video,
            "pager" => ContactType::Pager,
            "text" => ContactType::Text,
            _ => ContactType::Other(label),
        }
    }
}

impl From<ContactType> for String {
    fn from(contact_type: ContactType) -> Self {
        match contact_type {
            ContactType::Other(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a contact detail reaches the official
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContactNote {
    Legislature,
    Office,
    Residence,
    /// Unclassified note, passed through as scraped (cleaned)
    Other(String),
}

impl ContactNote {
    pub fn as_str(&self) -> &str {
        match self {
            ContactNote::Legislature => "legislature",
            ContactNote::Office => "office",
            ContactNote::Residence => "residence",
            ContactNote::Other(label) => label,
        }
    }
}

impl From<String> for ContactNote {
    fn from(label: String) -> Self {
        match label.as_str() {
            "legislature" => ContactNote::Legislature,
            "office" => ContactNote::Office,
            "residence" => ContactNote::Residence,
            _ => ContactNote::Other(label),
        }
    }
}

impl From<ContactNote> for String {
    fn from(note: ContactNote) -> Self {
        match note {
            ContactNote::Other(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContactNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact detail as scraped, before classification
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawContact {
    #[serde(rename = "type")]
    pub contact_type: String,
    pub value: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl RawContact {
    pub fn new(contact_type: &str, value: &str, note: Option<&str>) -> Self {
        Self {
            contact_type: contact_type.to_string(),
            value: value.to_string(),
            note: note.map(str::to_string),
        }
    }
}

/// Normalized contact detail
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub value: String,
    pub note: Option<ContactNote>,
}

// ── Classification tables ─────────────────────────────────

fn mapped_type(label: &str) -> Option<ContactType> {
    let contact_type = match label {
        "Address" => ContactType::Address,
        "bb" | "Cell" | "Cell Phone" | "Téléphone (cellulaire)" => ContactType::Cell,
        "Email" => ContactType::Email,
        "Fax" => ContactType::Fax,
        "bus" | "Bus" | "Bus." | "Business" | "Home" | "Home Phone" | "Home Phone*"
        | "Office" | "ph" | "Phone" | "Res" | "Res/Bus" | "Residence" | "Téléphone (bureau)"
        | "Téléphone (résidence)" | "Téléphone (résidence et bureau)" | "Voice Mail"
        | "Work" => ContactType::Voice,
        _ => return None,
    };
    Some(contact_type)
}

/// `Some(None)` means the label is known and carries no note (email)
fn mapped_note(label: &str) -> Option<Option<ContactNote>> {
    let note = match label {
        "Email" => None,
        "bus" | "Bus" | "Bus." | "Business" | "Res/Bus" => Some(ContactNote::Office),
        "Home" | "Home Phone" | "Home Phone*" | "Res" | "Residence"
        | "Téléphone (résidence)" => Some(ContactNote::Residence),
        "Address" | "bb" | "Cell" | "Cell Phone" | "Fax" | "ph" | "Phone" | "Office"
        | "Téléphone (bureau)" | "Téléphone (cellulaire)" | "Téléphone (résidence et bureau)"
        | "Voice Mail" | "Work" => Some(ContactNote::Legislature),
        _ => return None,
    };
    Some(note)
}

// ── Public API ────────────────────────────────────────────

/// Resolve a raw type label to its canonical type
///
/// ```
/// use represent_core::contact::{classify_type, ContactType};
///
/// assert_eq!(classify_type("Bus."), ContactType::Voice);
/// assert_eq!(classify_type("Téléphone (cellulaire)"), ContactType::Cell);
/// assert_eq!(classify_type("FAX"), ContactType::Fax);
/// ```
pub fn classify_type(label: &str) -> ContactType {
    let label = clean_string(label);
    mapped_type(&label).unwrap_or_else(|| ContactType::from(label.to_lowercase()))
}

/// Resolve a raw note label to its canonical note
///
/// Unknown labels pass through as [`ContactNote::Other`]; blank labels and
/// `Email` carry no note.
pub fn classify_note(label: &str) -> Option<ContactNote> {
    let label = clean_string(label);
    if label.is_empty() {
        return None;
    }
    match mapped_note(&label) {
        Some(note) => note,
        None => Some(ContactNote::from(label)),
    }
}

/// Canonicalize a contact value for an already-classified type
pub fn clean_contact_value(contact_type: &ContactType, value: &str) -> String {
    if contact_type.is_telephony() {
        clean_telephone_number(&clean_string(value))
    } else if *contact_type == ContactType::Address {
        clean_address(value)
    } else {
        clean_string(value)
    }
}

/// Run the full classification pipeline over one raw contact
///
/// A contact scraped without a note takes the note its type label implies,
/// when the label is in the note table.
///
/// ```
/// use represent_core::contact::{clean_contact, ContactNote, ContactType, RawContact};
///
/// let contact = clean_contact(&RawContact::new("Home Phone", "(902) 555-0000", None));
/// assert_eq!(contact.contact_type, ContactType::Voice);
/// assert_eq!(contact.value, "1-902-555-0000");
/// assert_eq!(contact.note, Some(ContactNote::Residence));
/// ```
pub fn clean_contact(raw: &RawContact) -> Contact {
    let contact_type = classify_type(&raw.contact_type);
    let note = match raw.note.as_deref() {
        Some(label) => classify_note(label),
        None => mapped_note(&clean_string(&raw.contact_type)).flatten(),
    };
    let value = clean_contact_value(&contact_type, &raw.value);
    Contact {
        contact_type,
        value,
        note,
    }
}
