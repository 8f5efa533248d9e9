//! Pipeline configuration.
//!
//! Everything the run needs is gathered once into a [`PipelineConfig`] and passed
//! by reference into each step, so tests can point the pipeline at a scratch
//! database, a loopback HTTP server, or temporary directories.
//!
//! Database credentials come from a dotenv-style file with these keys:
//!
//! | key         | meaning           |
//! |-------------|-------------------|
//! | `public_ip` | database host     |
//! | `port`      | database port     |
//! | `db_name`   | database name     |
//! | `user_name` | login role        |
//! | `password`  | login password    |

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use shared_utils::{config::ConfigError, env::EnvFile};

use crate::db::ident::TableName;
use crate::errors::EtlResult;

/// Daily reference rates published by the European Central Bank.
pub const ECB_DAILY_ZIP_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref.zip?0eb5bbd3afa62ca5cb9e7bd516a160fd";

/// Default location of the credentials file.
pub const DEFAULT_ENV_FILE: &str = ".env";
/// Directory holding the DDL fragments.
pub const DEFAULT_SCHEMA_DIR: &str = "sql/schemas";
/// Directory receiving the dated CSV snapshots.
pub const DEFAULT_EXPORT_DIR: &str = "data/exchange_rates";
/// DDL creating the rates table.
pub const RATES_SCHEMA_FILE: &str = "ecb_exchange_rates.sql";
/// DDL adding the converted column to the orders table.
pub const ORDERS_SCHEMA_FILE: &str = "add_converted_amount_column_to_orders.sql";
/// Table receiving the fetched rates.
pub const RATES_TABLE: &str = "ecb_exchange_rates";
/// Externally owned orders table.
pub const ORDERS_TABLE: &str = "orders";

const DEFAULT_PORT: u16 = 5432;

/// Connection parameters for the relational store.
#[derive(Clone)]
pub struct DbConfig {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Database name.
    pub db_name: String,
    /// Login role.
    pub user: String,
    /// Login password; never printed.
    pub password: SecretString,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl DbConfig {
    /// Builds the config from any key lookup (an env file, the process env, a map in tests).
    ///
    /// An empty `port` falls back to 5432.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require =
            |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()));

        let port_raw = require("port")?;
        let port = match port_raw.trim() {
            "" => DEFAULT_PORT,
            p => p.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "port".to_string(),
                reason: format!("{p:?}: {e}"),
            })?,
        };

        Ok(Self {
            host: require("public_ip")?,
            port,
            db_name: require("db_name")?,
            user: require("user_name")?,
            password: SecretString::new(require("password")?.into()),
        })
    }

    /// Reads the five connection keys from an env file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let env = EnvFile::load(path)?;
        Self::from_lookup(|key| env.get(key).map(str::to_string))
    }

    /// libpq key/value connection string. Contains the password in clear text.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote_conninfo(&self.host),
            self.port,
            quote_conninfo(&self.db_name),
            quote_conninfo(&self.user),
            quote_conninfo(self.password.expose_secret()),
        )
    }

    /// Credential-free description used in logs and errors.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db_name)
    }
}

// libpq conninfo values: single-quoted, with `\` and `'` backslash-escaped.
fn quote_conninfo(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Everything a run needs, built once at process start.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Database credentials.
    pub db: DbConfig,
    /// URL of the zipped CSV publication.
    pub source_url: String,
    /// Directory the DDL fragments are read from.
    pub schema_dir: PathBuf,
    /// Directory the dated snapshot is written to.
    pub export_dir: PathBuf,
    /// DDL file applied before writing rates.
    pub rates_schema_file: String,
    /// DDL file applied before converting orders.
    pub orders_schema_file: String,
    /// Rates table.
    pub rates_table: TableName,
    /// Orders table.
    pub orders_table: TableName,
}

impl PipelineConfig {
    /// Config with every default except the database credentials.
    pub fn with_defaults(db: DbConfig) -> EtlResult<Self> {
        Ok(Self {
            db,
            source_url: ECB_DAILY_ZIP_URL.to_string(),
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            rates_schema_file: RATES_SCHEMA_FILE.to_string(),
            orders_schema_file: ORDERS_SCHEMA_FILE.to_string(),
            rates_table: TableName::parse(RATES_TABLE)?,
            orders_table: TableName::parse(ORDERS_TABLE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full() -> Vec<(&'static str, &'static str)> {
        vec![
            ("public_ip", "10.1.2.3"),
            ("port", "6543"),
            ("db_name", "shop"),
            ("user_name", "etl"),
            ("password", "s3cret"),
        ]
    }

    #[test]
    fn from_lookup_reads_all_keys() {
        let cfg = DbConfig::from_lookup(lookup_from(&full())).unwrap();
        assert_eq!(cfg.host, "10.1.2.3");
        assert_eq!(cfg.port, 6543);
        assert_eq!(cfg.db_name, "shop");
        assert_eq!(cfg.user, "etl");
        assert_eq!(cfg.password.expose_secret(), "s3cret");
        assert_eq!(cfg.target(), "10.1.2.3:6543/shop");
    }

    #[test]
    fn missing_key_is_reported() {
        let pairs: Vec<_> = full().into_iter().filter(|(k, _)| *k != "user_name").collect();
        match DbConfig::from_lookup(lookup_from(&pairs)) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "user_name"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bad_port_is_invalid_and_blank_port_defaults() {
        let mut pairs = full();
        pairs[1] = ("port", "not-a-port");
        assert!(matches!(
            DbConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::InvalidValue { .. })
        ));

        pairs[1] = ("port", " ");
        let cfg = DbConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(cfg.port, 5432);
    }

    #[test]
    fn debug_output_redacts_password() {
        let cfg = DbConfig::from_lookup(lookup_from(&full())).unwrap();
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("[REDACTED]"));
    }

    #[test]
    fn connection_string_escapes_quotes_and_backslashes() {
        let mut pairs = full();
        pairs[4] = ("password", r"it's a \ pass");
        let cfg = DbConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            cfg.connection_string(),
            r"host='10.1.2.3' port=6543 dbname='shop' user='etl' password='it\'s a \\ pass'"
        );
    }

    #[test]
    fn from_env_file_uses_dotenv_keys() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "public_ip=db.internal\nport=5432\ndb_name=orders\nuser_name=etl\npassword=pw"
        )
        .unwrap();

        let cfg = DbConfig::from_env_file(file.path()).unwrap();
        assert_eq!(cfg.target(), "db.internal:5432/orders");

        let pipeline = PipelineConfig::with_defaults(cfg).unwrap();
        assert_eq!(pipeline.rates_table.as_str(), "ecb_exchange_rates");
        assert_eq!(pipeline.orders_table.as_str(), "orders");
        assert_eq!(pipeline.export_dir, PathBuf::from("data/exchange_rates"));
    }
}
