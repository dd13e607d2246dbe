use crate::core::geo::EARTH_RADIUS_KM;
use crate::domain::model::UserInfo;
use crate::utils::error::{ParkingError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub earth_radius_km: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub sender: String,
    pub recovery_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl ParkingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ParkingError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ParkingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ParkingError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.logging.format).unwrap_or(LogFormat::Compact)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.auth.token_ttl_minutes)
    }
}

impl Validate for ParkingConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("store.data_path", &self.store.data_path)?;
        validation::validate_range("geo.earth_radius_km", self.geo.earth_radius_km, 1.0, 100_000.0)?;
        validation::validate_range("auth.token_ttl_minutes", self.auth.token_ttl_minutes, 1, 10_080)?;
        validation::validate_email("mail.sender", &self.mail.sender)?;
        validation::validate_url("mail.recovery_base_url", &self.mail.recovery_base_url)?;

        if LogFormat::parse(&self.logging.format).is_none() {
            return Err(ParkingError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.logging.format.clone(),
                reason: "Valid formats: compact, json".to_string(),
            });
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ParkingError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        for user in &self.users {
            validation::validate_email("users.email", &user.email)?;
            validation::validate_non_empty_string("users.name", &user.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[store]
data_path = "./data/slots.json"

[mail]
sender = "noreply@parking.example"
recovery_base_url = "https://parking.example"

[[users]]
email = "ada@parking.example"
name = "Ada"
surname = "Lovelace"
"#;

    #[test]
    fn test_parse_basic_config_with_defaults() {
        let config = ParkingConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.store.data_path, "./data/slots.json");
        assert_eq!(config.geo.earth_radius_km, 6371.0);
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].surname.as_deref(), Some("Lovelace"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PARKING_TEST_DATA_PATH", "/var/lib/parking/slots.json");

        let toml_content = r#"
[store]
data_path = "${PARKING_TEST_DATA_PATH}"

[mail]
sender = "noreply@parking.example"
recovery_base_url = "https://parking.example"
"#;

        let config = ParkingConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.data_path, "/var/lib/parking/slots.json");

        std::env::remove_var("PARKING_TEST_DATA_PATH");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[store]
data_path = "./slots.json"

[mail]
sender = "noreply@parking.example"
recovery_base_url = "invalid-url"
"#;
        let config = ParkingConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let mut config = ParkingConfig::from_toml_str(BASIC).unwrap();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = ParkingConfig::from_toml_str(BASIC).unwrap();
        config.auth.token_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = ParkingConfig::from_toml_str("[store]\ndata_path = \"x\"\n");
        assert!(matches!(
            result,
            Err(ParkingError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ParkingConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.mail.sender, "noreply@parking.example");
    }
}
