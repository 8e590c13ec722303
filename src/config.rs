use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings read from the deployment secrets.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub require_ssl: bool,
    pub max_connections: u32,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_ssl: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            allowed_origins: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup("DB_REQUIRE_SSL") {
            let flag = value.trim().to_ascii_lowercase();
            settings.require_ssl = match flag.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DB_REQUIRE_SSL",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("DB_MAX_CONNECTIONS") {
            settings.max_connections = value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "DB_MAX_CONNECTIONS",
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup("CORS_ALLOWED_ORIGINS") {
            settings.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(settings)
    }

    pub fn connection_string(&self, base: &str) -> String {
        if !self.require_ssl || base.contains("sslmode=") {
            base.to_string()
        } else if base.contains('?') {
            format!("{}&sslmode=require", base)
        } else {
            format!("{}?sslmode=require", base)
        }
    }
}
