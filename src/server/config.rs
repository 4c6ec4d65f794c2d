use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::db::services::match_service::DEFAULT_PAGE_SIZE;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_page_size")]
    pub page_size: i64,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default)]
    pub secure_cookies: bool,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    bind_addr: Option<String>,
    log_dir: Option<String>,
    page_size: Option<i64>,
    token_ttl_hours: Option<i64>,
    bcrypt_cost: Option<u32>,
    secure_cookies: Option<bool>,
}

/// One year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

fn default_database_url() -> String {
    "sqlite://matchlog.db".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Result<Self, String> {
        let final_config = ServerConfig {
            database_url: env_config.database_url.or(file_config.database_url)
                .unwrap_or_else(default_database_url),
            jwt_secret: env_config.jwt_secret.or(file_config.jwt_secret)
                .filter(|s| !s.is_empty())
                .ok_or("JWT_SECRET is required")?,
            bind_addr: env_config.bind_addr.or(file_config.bind_addr)
                .unwrap_or_else(default_bind_addr),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            page_size: env_config.page_size.or(file_config.page_size)
                .unwrap_or_else(default_page_size),
            token_ttl_hours: env_config.token_ttl_hours.or(file_config.token_ttl_hours)
                .unwrap_or_else(default_token_ttl_hours),
            bcrypt_cost: env_config.bcrypt_cost.or(file_config.bcrypt_cost)
                .unwrap_or_else(default_bcrypt_cost),
            secure_cookies: env_config.secure_cookies.or(file_config.secure_cookies)
                .unwrap_or(false),
        };

        if final_config.page_size < 1 {
            return Err(format!("PAGE_SIZE must be positive, got {}", final_config.page_size));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&final_config.token_ttl_hours) {
            return Err(format!(
                "TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {}",
                final_config.token_ttl_hours
            ));
        }
        if !(4..=31).contains(&final_config.bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be between 4 and 31, got {}", final_config.bcrypt_cost));
        }

        Ok(final_config)
    }

    /// Configuration used by tests: in-memory friendly defaults and the cheapest bcrypt cost.
    pub fn for_tests(jwt_secret: &str) -> Self {
        ServerConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: jwt_secret.to_string(),
            bind_addr: default_bind_addr(),
            log_dir: default_log_dir(),
            page_size: default_page_size(),
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: 4,
            secure_cookies: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(toml_src: &str) -> PartialServerConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_defaults_apply_when_only_secret_given() {
        let config = ServerConfig::merge(
            PartialServerConfig::default(),
            partial(r#"jwt_secret = "s3cret""#),
        )
        .unwrap();
        assert_eq!(config.database_url, "sqlite://matchlog.db");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.token_ttl_hours, 24);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = partial(
            r#"
            jwt_secret = "from-file"
            page_size = 50
            log_dir = "/var/log/matchlog"
            "#,
        );
        let env = PartialServerConfig {
            jwt_secret: Some("from-env".to_string()),
            page_size: Some(10),
            ..Default::default()
        };
        let config = ServerConfig::merge(env, file).unwrap();
        assert_eq!(config.jwt_secret, "from-env");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.log_dir, "/var/log/matchlog");
    }

    #[test]
    fn test_secret_is_required() {
        let err = ServerConfig::merge(PartialServerConfig::default(), PartialServerConfig::default())
            .unwrap_err();
        assert!(err.contains("JWT_SECRET"));
        assert!(ServerConfig::merge(PartialServerConfig::default(), partial(r#"jwt_secret = """#)).is_err());
    }

    #[test]
    fn test_rejects_nonsensical_values() {
        assert!(ServerConfig::merge(
            PartialServerConfig::default(),
            partial("jwt_secret = \"x\"\npage_size = 0"),
        )
        .is_err());
        assert!(ServerConfig::merge(
            PartialServerConfig::default(),
            partial("jwt_secret = \"x\"\nbcrypt_cost = 2"),
        )
        .is_err());
    }

    #[test]
    fn test_token_ttl_must_be_within_bounds() {
        for ttl in ["0", "-1", "8761", "9223372036854775807"] {
            let err = ServerConfig::merge(
                PartialServerConfig::default(),
                partial(&format!("jwt_secret = \"x\"\ntoken_ttl_hours = {ttl}")),
            )
            .unwrap_err();
            assert!(err.contains("TOKEN_TTL_HOURS"), "{ttl}: {err}");
        }
        let config = ServerConfig::merge(
            PartialServerConfig::default(),
            partial("jwt_secret = \"x\"\ntoken_ttl_hours = 8760"),
        )
        .unwrap();
        assert_eq!(config.token_ttl_hours, MAX_TOKEN_TTL_HOURS);
    }
}
