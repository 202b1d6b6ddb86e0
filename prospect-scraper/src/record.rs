use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentinel written when a field's heuristic finds nothing on the page.
pub const UNAVAILABLE: &str = "N/A";

/// Allow-listed output fields a profile record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Url,
    Name,
    ConnectionDegree,
    Country,
    Email,
    Phone,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Name => "name",
            Field::ConnectionDegree => "connection_degree",
            Field::Country => "country",
            Field::Email => "email",
            Field::Phone => "phone",
        }
    }

    pub fn parse(s: &str) -> Option<Field> {
        match s.trim() {
            "url" => Some(Field::Url),
            "name" => Some(Field::Name),
            "connection_degree" => Some(Field::ConnectionDegree),
            "country" => Some(Field::Country),
            "email" => Some(Field::Email),
            "phone" => Some(Field::Phone),
            _ => None,
        }
    }
}

/// Parse a comma-separated field allow-list. Unknown names are skipped,
/// not errors, so a stale configuration still produces a usable record.
pub fn parse_fields(list: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    for name in list.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match Field::parse(name) {
            Some(field) if !fields.contains(&field) => fields.push(field),
            Some(_) => {}
            None => debug!("Ignoring unknown output field '{}'", name),
        }
    }
    fields
}

/// One extracted profile: requested fields in a stable order, each either
/// a value or the unavailable sentinel. The absolute URL is always first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    values: Vec<(Field, String)>,
}

impl ProfileRecord {
    pub fn new(url: String) -> Self {
        Self {
            values: vec![(Field::Url, url)],
        }
    }

    /// Append a field value; the URL slot set at construction wins over a
    /// requested `url` field so the column never duplicates.
    pub fn push(&mut self, field: Field, value: Option<String>) {
        if field == Field::Url {
            return;
        }
        self.values
            .push((field, value.unwrap_or_else(|| UNAVAILABLE.to_string())));
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.values.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn row(&self) -> Vec<&str> {
        self.values.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}
