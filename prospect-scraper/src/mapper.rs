//! Best-effort field extraction from a rendered profile page.
//!
//! Each field has its own heuristic and its own failure mode: a heuristic
//! that finds nothing yields the unavailable sentinel, never an error, and
//! fields do not depend on one another. Mapping a record cannot fail.

use crate::record::{Field, ProfileRecord};
use scraper::{Html, Selector};

/// Ordinal tokens the site renders for connection distance.
const DEGREE_TOKENS: &[&str] = &["1st", "2nd", "3rd", "4th"];

/// Country-name substrings accepted by the location heuristic when the
/// text carries no comma. Best effort; a location like "Berlin Area"
/// will be missed and degrade to the sentinel.
const COUNTRY_TOKENS: &[&str] = &[
    "United States",
    "United Kingdom",
    "United",
    "Canada",
    "Australia",
    "Germany",
    "France",
    "India",
];

/// Build a record for `profile_path` containing the absolute URL plus
/// only the requested fields.
pub fn map_profile(
    base_url: &str,
    profile_path: &str,
    html: &str,
    fields: &[Field],
) -> ProfileRecord {
    let document = Html::parse_document(html);
    let mut record = ProfileRecord::new(format!("{}{}", base_url, profile_path));

    for field in fields {
        match field {
            Field::Url => {}
            Field::Name => record.push(Field::Name, extract_name(&document)),
            Field::ConnectionDegree => {
                record.push(Field::ConnectionDegree, extract_degree(&document))
            }
            Field::Country => record.push(Field::Country, extract_country(&document)),
            // Not exposed on public profiles; recorded as unavailable so
            // downstream consumers see a stable column set.
            Field::Email => record.push(Field::Email, None),
            Field::Phone => record.push(Field::Phone, None),
        }
    }

    record
}

/// First top-level heading is the display name.
fn extract_name(document: &Html) -> Option<String> {
    let heading = Selector::parse("h1").unwrap();

    document.select(&heading).next().and_then(|el| {
        let text = collapse(el.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    })
}

/// First short fragment matching an ordinal-degree token near the top of
/// the profile.
fn extract_degree(document: &Html) -> Option<String> {
    let spots = Selector::parse("span, div").unwrap();

    document.select(&spots).find_map(|el| {
        let text = collapse(el.text().collect::<String>());
        DEGREE_TOKENS.contains(&text.as_str()).then_some(text)
    })
}

/// First fragment that looks like a location: either "City, Country" or a
/// bare known country name.
fn extract_country(document: &Html) -> Option<String> {
    let spots = Selector::parse("span, li").unwrap();

    document.select(&spots).find_map(|el| {
        let text = collapse(el.text().collect::<String>());
        if text.is_empty() || text.len() > 120 {
            return None;
        }
        let looks_like_location =
            text.contains(',') || COUNTRY_TOKENS.iter().any(|c| text.contains(c));
        looks_like_location.then_some(text)
    })
}

fn collapse(text: String) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
