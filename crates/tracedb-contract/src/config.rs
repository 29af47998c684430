use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracedb_core::error::{ErrorClass, ErrorOrigin, InternalError};

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse contract config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config field '{0}' must not be empty")]
    Empty(&'static str),

    #[error("config field '{0}' must be greater than zero")]
    Zero(&'static str),

    #[error("default_page_size ({default}) exceeds max_page_size ({max})")]
    PageSizeBounds { default: u32, max: u32 },
}

///
/// ContractConfig
///
/// Process-wide contract settings, built once and passed by reference.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    /// Role attribute required by privileged entry points.
    pub admin_role: String,

    /// Organization that must own every part before an asset is assembled.
    pub assembly_organization: String,

    /// Page size used when a caller does not pass one.
    pub default_page_size: u32,

    pub max_page_size: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            admin_role: "admin".to_string(),
            assembly_organization: "Brand-Org".to_string(),
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl ContractConfig {
    /// Parse and validate a TOML document; missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_role.trim().is_empty() {
            return Err(ConfigError::Empty("admin_role"));
        }
        if self.assembly_organization.trim().is_empty() {
            return Err(ConfigError::Empty("assembly_organization"));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Zero("default_page_size"));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Zero("max_page_size"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::PageSizeBounds {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }

        Ok(())
    }

    /// Resolve a caller page size: `None` takes the default, zero and
    /// anything above the maximum are rejected.
    pub fn page_size(&self, requested: Option<u32>) -> Result<u32, InternalError> {
        match requested {
            None => Ok(self.default_page_size),
            Some(0) => Err(InternalError::new(
                ErrorClass::MalformedQuery,
                ErrorOrigin::Cursor,
                "page size must be a positive integer",
            )),
            Some(size) if size > self.max_page_size => Err(InternalError::new(
                ErrorClass::MalformedQuery,
                ErrorOrigin::Cursor,
                format!("page size {size} exceeds the maximum of {}", self.max_page_size),
            )),
            Some(size) => Ok(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_takes_defaults() {
        let config = ContractConfig::from_toml_str("").unwrap();
        assert_eq!(config, ContractConfig::default());
    }

    #[test]
    fn partial_document_overrides_named_keys() {
        let config = ContractConfig::from_toml_str(
            r#"
            admin_role = "operator"
            max_page_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.admin_role, "operator");
        assert_eq!(config.assembly_organization, "Brand-Org");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for source in [
            r#"admin_role = """#,
            r#"assembly_organization = "  ""#,
            "default_page_size = 0",
            "max_page_size = 0",
            "default_page_size = 50\nmax_page_size = 20",
        ] {
            assert!(ContractConfig::from_toml_str(source).is_err(), "source: {source}");
        }
    }

    #[test]
    fn unknown_keys_and_bad_types_fail_to_parse() {
        let err = ContractConfig::from_toml_str("page_limit = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = ContractConfig::from_toml_str(r#"max_page_size = "many""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn page_size_resolution() {
        let config = ContractConfig::default();

        assert_eq!(config.page_size(None).unwrap(), 10);
        assert_eq!(config.page_size(Some(3)).unwrap(), 3);
        assert_eq!(config.page_size(Some(100)).unwrap(), 100);
        assert_eq!(
            config.page_size(Some(0)).unwrap_err().class,
            ErrorClass::MalformedQuery
        );
        assert_eq!(
            config.page_size(Some(101)).unwrap_err().class,
            ErrorClass::MalformedQuery
        );
    }
}
