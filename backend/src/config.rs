//! # Configuration
//!
//! All settings come from environment variables, read once at startup through
//! the `config` crate's `Environment` source and deserialized with serde.
//!
//! | variable | meaning |
//! |---|---|
//! | `DB_DRIVER` | `postgres` (default) or `sqlite` |
//! | `DB_USERNAME`, `DB_PASSWORD`, `SERVER_HOST`, `DB_PORT`, `DB_NAME`, `DB_SSLMODE` | PostgreSQL connection, all required |
//! | `DB_PATH` | SQLite database file, required for `sqlite` |
//! | `HTTP_HOST`, `HTTP_PORT` | listen address, default `127.0.0.1:8080` |
//! | `CSV_DELIMITER` | `comma`, `semicolon` or `auto` (default) |
//!
//! Any missing or malformed value is a [`ConfigError`]; `main` treats it as fatal.

use common::parse::Delimiter;
use config::{Config, Environment};
use serde::Deserialize;
use sqlx::postgres::PgSslMode;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not read environment: {0}")]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub http: HttpSettings,
    pub csv_delimiter: Delimiter,
}

#[derive(Debug, Clone)]
pub enum DatabaseSettings {
    Postgres(PostgresSettings),
    Sqlite { path: PathBuf },
}

#[derive(Clone)]
pub struct PostgresSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl_mode: PgSslMode,
}

// Keeps the password out of startup logs.
impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

/// Raw view of the environment. Keys are lower-cased by `Environment`.
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    db_driver: Option<String>,
    db_username: Option<String>,
    db_password: Option<String>,
    server_host: Option<String>,
    db_port: Option<String>,
    db_name: Option<String>,
    db_sslmode: Option<String>,
    db_path: Option<String>,
    http_host: Option<String>,
    http_port: Option<String>,
    csv_delimiter: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = Config::builder()
            .add_source(Environment::default())
            .build()?;
        Self::from_config(source)
    }

    pub fn from_config(source: Config) -> Result<Self, ConfigError> {
        let raw: RawEnv = source.try_deserialize()?;
        raw.into_settings()
    }
}

impl RawEnv {
    fn into_settings(self) -> Result<Settings, ConfigError> {
        let database = match non_empty(self.db_driver.clone()).as_deref() {
            None | Some("postgres") | Some("postgresql") => {
                DatabaseSettings::Postgres(self.postgres()?)
            }
            Some("sqlite") => match non_empty(self.db_path.clone()) {
                Some(path) => DatabaseSettings::Sqlite {
                    path: PathBuf::from(path),
                },
                None => return Err(ConfigError::Missing(vec!["DB_PATH"])),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "DB_DRIVER",
                    value: other.to_string(),
                    reason: "expected 'postgres' or 'sqlite'".to_string(),
                })
            }
        };

        let http = HttpSettings {
            host: non_empty(self.http_host).unwrap_or_else(|| "127.0.0.1".to_string()),
            port: match non_empty(self.http_port) {
                Some(port) => parse_port("HTTP_PORT", port)?,
                None => 8080,
            },
        };

        let csv_delimiter = match non_empty(self.csv_delimiter) {
            Some(value) => Delimiter::from_str(&value).map_err(|reason| ConfigError::Invalid {
                var: "CSV_DELIMITER",
                value,
                reason,
            })?,
            None => Delimiter::Auto,
        };

        Ok(Settings {
            database,
            http,
            csv_delimiter,
        })
    }

    fn postgres(&self) -> Result<PostgresSettings, ConfigError> {
        let required = [
            ("DB_USERNAME", &self.db_username),
            ("DB_PASSWORD", &self.db_password),
            ("SERVER_HOST", &self.server_host),
            ("DB_PORT", &self.db_port),
            ("DB_NAME", &self.db_name),
            ("DB_SSLMODE", &self.db_sslmode),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        let ssl_raw = value(&self.db_sslmode);
        let ssl_mode = PgSslMode::from_str(&ssl_raw).map_err(|e| ConfigError::Invalid {
            var: "DB_SSLMODE",
            value: ssl_raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(PostgresSettings {
            username: value(&self.db_username),
            password: value(&self.db_password),
            host: value(&self.server_host),
            port: parse_port("DB_PORT", value(&self.db_port))?,
            database: value(&self.db_name),
            ssl_mode,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_port(var: &'static str, value: String) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in vars {
            builder = builder.set_override(*key, *value).unwrap();
        }
        Settings::from_config(builder.build().unwrap())
    }

    const POSTGRES: [(&str, &str); 6] = [
        ("db_username", "shipper"),
        ("db_password", "secret"),
        ("server_host", "db.internal"),
        ("db_port", "5432"),
        ("db_name", "shipments"),
        ("db_sslmode", "disable"),
    ];

    #[test]
    fn complete_postgres_environment() {
        let settings = settings(&POSTGRES).unwrap();
        match settings.database {
            DatabaseSettings::Postgres(pg) => {
                assert_eq!(pg.host, "db.internal");
                assert_eq!(pg.port, 5432);
                assert_eq!(pg.database, "shipments");
                assert!(matches!(pg.ssl_mode, PgSslMode::Disable));
                assert!(!format!("{:?}", pg).contains("secret"));
            }
            other => panic!("unexpected database settings {:?}", other),
        }
        assert_eq!(
            settings.http,
            HttpSettings {
                host: "127.0.0.1".into(),
                port: 8080
            }
        );
        assert_eq!(settings.csv_delimiter, Delimiter::Auto);
    }

    #[test]
    fn every_missing_variable_is_named() {
        let vars: Vec<_> = POSTGRES
            .iter()
            .copied()
            .filter(|(k, _)| *k != "db_password" && *k != "db_sslmode")
            .collect();
        match settings(&vars) {
            Err(ConfigError::Missing(names)) => {
                assert_eq!(names, vec!["DB_PASSWORD", "DB_SSLMODE"])
            }
            other => panic!("expected missing variables, got {:?}", other),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = POSTGRES.to_vec();
        vars[0] = ("db_username", "");
        assert!(matches!(settings(&vars), Err(ConfigError::Missing(names)) if names == vec!["DB_USERNAME"]));
    }

    #[test]
    fn bad_port_and_ssl_mode_are_rejected() {
        let mut vars = POSTGRES.to_vec();
        vars[3] = ("db_port", "fifty");
        assert!(matches!(settings(&vars), Err(ConfigError::Invalid { var: "DB_PORT", .. })));

        let mut vars = POSTGRES.to_vec();
        vars[5] = ("db_sslmode", "sometimes");
        assert!(matches!(settings(&vars), Err(ConfigError::Invalid { var: "DB_SSLMODE", .. })));
    }

    #[test]
    fn sqlite_needs_only_a_path() {
        let settings = settings(&[
            ("db_driver", "sqlite"),
            ("db_path", "/tmp/shipments.sqlite"),
            ("http_port", "9000"),
            ("csv_delimiter", "semicolon"),
        ])
        .unwrap();
        assert!(matches!(settings.database, DatabaseSettings::Sqlite { ref path } if path.ends_with("shipments.sqlite")));
        assert_eq!(settings.http.port, 9000);
        assert_eq!(settings.csv_delimiter, Delimiter::Semicolon);

        assert!(matches!(
            self::settings(&[("db_driver", "sqlite")]),
            Err(ConfigError::Missing(names)) if names == vec!["DB_PATH"]
        ));
    }

    #[test]
    fn unknown_driver_and_delimiter() {
        assert!(matches!(
            settings(&[("db_driver", "oracle")]),
            Err(ConfigError::Invalid { var: "DB_DRIVER", .. })
        ));
        let mut vars = POSTGRES.to_vec();
        vars.push(("csv_delimiter", "pipe"));
        assert!(matches!(settings(&vars), Err(ConfigError::Invalid { var: "CSV_DELIMITER", .. })));
    }
}
