//! Person/contact record builder
//!
//! Every string a scraper hands over passes through the text normalizer;
//! contacts additionally pass through the classifier and canonicalizers.
//! A [`Person`] is built in one scrape pass and handed to the sink as JSON.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::contact::{clean_contact, Contact, ContactType, RawContact};
use crate::text::{clean_name, clean_string};

/// Link attached to a person (personal site, social media)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub note: Option<String>,
    pub url: String,
}

/// Normalized elected official
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Person {
    pub name: String,
    pub post_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub sources: Vec<String>,
}

fn twitter_handle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@[A-Za-z]+$").expect("twitter handle pattern is valid"))
}

impl Person {
    /// Start a record; the name loses honorifics, post and role are cleaned
    pub fn new(name: &str, post_id: &str, role: &str) -> Self {
        Self {
            name: clean_name(name),
            post_id: clean_string(post_id),
            role: clean_string(role),
            party: None,
            gender: None,
            image: None,
            contacts: Vec::new(),
            links: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn set_party(&mut self, party: &str) {
        self.party = Some(clean_string(party));
    }

    pub fn set_image(&mut self, image: &str) {
        self.image = Some(clean_string(image));
    }

    /// `M` and `F` become `male` and `female`; anything else is kept cleaned
    pub fn set_gender(&mut self, gender: &str) {
        let gender = clean_string(gender);
        self.gender = Some(match gender.as_str() {
            "M" => "male".to_string(),
            "F" => "female".to_string(),
            _ => gender,
        });
    }

    /// Classify and canonicalize one contact detail
    pub fn add_contact(&mut self, contact_type: &str, value: &str, note: Option<&str>) {
        self.push_contact(&RawContact::new(contact_type, value, note));
    }

    fn push_contact(&mut self, raw: &RawContact) {
        let contact = clean_contact(raw);
        if let ContactType::Other(ref label) = contact.contact_type {
            warn!(person = %self.name, contact_type = %label, "unclassified contact type");
        }
        self.contacts.push(contact);
    }

    /// Add a link; bare `www.` hosts get `http://`, `@handle` becomes a
    /// Twitter URL
    pub fn add_link(&mut self, url: &str, note: Option<&str>) {
        let url = if url.starts_with("www.") {
            format!("http://{}", url)
        } else if twitter_handle_re().is_match(url) {
            format!("https://twitter.com/{}", &url[1..])
        } else {
            url.to_string()
        };
        self.links.push(Link {
            note: note.map(str::to_string),
            url,
        });
    }

    pub fn add_source(&mut self, url: &str) {
        self.sources.push(url.to_string());
    }
}

/// Raw link as scraped
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawLink {
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Person tuple as produced by a site scraper
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawPerson {
    pub name: String,
    pub post_id: String,
    pub role: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub contacts: Vec<RawContact>,
    #[serde(default)]
    pub links: Vec<RawLink>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl RawPerson {
    /// Normalize into a [`Person`], keeping contact, link and source order
    pub fn build(&self) -> Person {
        let mut person = Person::new(&self.name, &self.post_id, &self.role);
        if let Some(party) = &self.party {
            person.set_party(party);
        }
        if let Some(gender) = &self.gender {
            person.set_gender(gender);
        }
        if let Some(image) = &self.image {
            person.set_image(image);
        }
        for contact in &self.contacts {
            person.push_contact(contact);
        }
        for link in &self.links {
            person.add_link(&link.url, link.note.as_deref());
        }
        for source in &self.sources {
            person.add_source(source);
        }
        person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactNote;

    #[test]
    fn test_new_cleans_name_post_and_role() {
        let person = Person::new("  Mayor  Naheed Nenshi ", " Ward\u{200B} 7 ", "Councillor ");
        assert_eq!(person.name, "Naheed Nenshi");
        assert_eq!(person.post_id, "Ward 7");
        assert_eq!(person.role, "Councillor");
    }

    #[test]
    fn test_gender_letters_are_expanded() {
        let mut person = Person::new("A", "B", "MLA");
        person.set_gender("M");
        assert_eq!(person.gender.as_deref(), Some("male"));
        person.set_gender(" F ");
        assert_eq!(person.gender.as_deref(), Some("female"));
        person.set_gender("non-binary");
        assert_eq!(person.gender.as_deref(), Some("non-binary"));
    }

    #[test]
    fn test_links() {
        let mut person = Person::new("A", "B", "MLA");
        person.add_link("www.example.ca", None);
        person.add_link("@JaneDoe", Some("twitter"));
        person.add_link("@jane_doe", None);
        person.add_link("https://example.ca/bio", Some("bio"));

        let urls: Vec<&str> = person.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://www.example.ca",
                "https://twitter.com/JaneDoe",
                "@jane_doe",
                "https://example.ca/bio",
            ]
        );
        assert_eq!(person.links[1].note.as_deref(), Some("twitter"));
    }

    #[test]
    fn test_contacts_keep_order() {
        let mut person = Person::new("A", "B", "MLA");
        person.add_contact("email", "a@example.ca", None);
        person.add_contact("Bus.", "902 555 0100", Some("Bus."));
        person.add_contact("Twitter", "@a", None);

        let types: Vec<&str> = person.contacts.iter().map(|c| c.contact_type.as_str()).collect();
        assert_eq!(types, vec!["email", "voice", "twitter"]);
        assert_eq!(person.contacts[1].value, "1-902-555-0100");
        assert_eq!(person.contacts[1].note, Some(ContactNote::Office));
    }

    #[test]
    fn test_raw_person_build() {
        let raw: RawPerson = serde_json::from_value(serde_json::json!({
            "name": "Hon. Jane Doe",
            "post_id": "Halifax  Needham",
            "role": "MLA",
            "party": "Nova Scotia New Democratic Party",
            "gender": "F",
            "image": "http://nslegislature.ca/jane.jpg",
            "contacts": [
                {"type": "Home Phone", "value": "(902) 555-0000"},
                {"type": "email", "value": "jane@example.ca", "note": null},
                {"type": "address", "value": "PO Box 1617, Halifax, Nova Scotia B3J 2Y3", "note": "legislature"}
            ],
            "links": [{"url": "www.janedoe.ca"}],
            "sources": ["http://nslegislature.ca/index.php/people/members/"]
        }))
        .unwrap();

        let person = raw.build();
        assert_eq!(person.name, "Jane Doe");
        assert_eq!(person.post_id, "Halifax Needham");
        assert_eq!(person.gender.as_deref(), Some("female"));
        assert_eq!(person.contacts.len(), 3);
        assert_eq!(person.contacts[0].contact_type, ContactType::Voice);
        assert_eq!(person.contacts[0].value, "1-902-555-0000");
        assert_eq!(person.contacts[0].note, Some(ContactNote::Residence));
        assert_eq!(person.contacts[2].value, "PO Box 1617, Halifax  NS  B3J 2Y3");
        assert_eq!(person.links[0].url, "http://www.janedoe.ca");
        assert_eq!(person.sources.len(), 1);
    }

    #[test]
    fn test_person_json_shape() {
        let mut person = Person::new("Jane Doe", "Ward 1", "Councillor");
        person.add_contact("voice", "613-555-0100", Some("legislature"));
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["contacts"][0]["type"], "voice");
        assert_eq!(json["contacts"][0]["note"], "legislature");
        assert!(json.get("party").is_none());
        assert!(json["image"].is_null());
    }
}
