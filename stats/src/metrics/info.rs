use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// Fields that appear before any `# Section` header end up here.
const DEFAULT_SECTION: &str = "default";

/// One `# Name` block of an `INFO` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoSection {
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Parsed reply of the Redis `INFO` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisInfo {
    sections: Vec<InfoSection>,
}

impl RedisInfo {
    pub fn parse(raw: &str) -> Self {
        let mut sections: Vec<InfoSection> = Vec::new();

        for line in raw.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('#') {
                sections.push(InfoSection {
                    name: header.trim().to_lowercase(),
                    fields: BTreeMap::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                trace!(line, "Skipping INFO line without a separator");
                continue;
            };

            if sections.is_empty() {
                sections.push(InfoSection {
                    name: DEFAULT_SECTION.to_string(),
                    fields: BTreeMap::new(),
                });
            }
            if let Some(section) = sections.last_mut() {
                section.fields.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Self { sections }
    }

    pub fn sections(&self) -> &[InfoSection] {
        &self.sections
    }

    /// Section names are matched case-insensitively.
    pub fn section(&self, name: &str) -> Option<&InfoSection> {
        let name = name.to_lowercase();
        self.sections.iter().find(|section| section.name == name)
    }

    /// Looks the field up in every section, first match wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find_map(|section| section.fields.get(key))
            .map(String::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    pub fn keyspace(&self) -> Vec<KeyspaceEntry> {
        self.section("keyspace")
            .map(|section| {
                section
                    .fields
                    .iter()
                    .filter_map(|(name, value)| KeyspaceEntry::parse(name, value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A `db0:keys=1,expires=0,avg_ttl=0` line of the keyspace section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceEntry {
    pub db: u32,
    pub keys: u64,
    pub expires: u64,
    pub avg_ttl: u64,
}

impl KeyspaceEntry {
    pub fn parse(name: &str, value: &str) -> Option<Self> {
        let db = name.strip_prefix("db")?.parse().ok()?;
        let mut entry = Self {
            db,
            ..Default::default()
        };

        for pair in value.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let Ok(value) = value.trim().parse::<u64>() else {
                continue;
            };
            match key.trim() {
                "keys" => entry.keys = value,
                "expires" => entry.expires = value,
                "avg_ttl" => entry.avg_ttl = value,
                _ => {}
            }
        }

        Some(entry)
    }
}
