use serde::{
    Deserialize,
    Serialize,
};
use std::str::FromStr as _;
use strum::{
    Display,
    EnumString,
};

/// Name of the variable selecting the runtime environment.
pub const ENV_VAR: &str = "ENV";

/// Runtime environment, read from `ENV`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENV_VAR).ok().as_deref())
    }

    /// Unset and empty values mean development. Unknown values fall back to development too.
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Development,
            Some(value) => Self::from_str(value).unwrap_or_else(|_| {
                warn!(value, "Unknown {ENV_VAR} value, falling back to development");
                Self::Development
            }),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unset_or_empty_is_development() {
        assert_eq!(Environment::from_value(None), Environment::Development);
        assert_eq!(Environment::from_value(Some("")), Environment::Development);
        assert_eq!(Environment::from_value(Some("  ")), Environment::Development);
    }

    #[test]
    fn parses_known_environments() {
        assert_eq!(Environment::from_value(Some("production")), Environment::Production);
        assert_eq!(Environment::from_value(Some("PRODUCTION")), Environment::Production);
        assert_eq!(Environment::from_value(Some("test")), Environment::Test);
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn unknown_environment_falls_back() {
        assert_eq!(Environment::from_value(Some("staging")), Environment::Development);
    }
}
