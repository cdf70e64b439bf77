pub mod toml_config;

use crate::domain::catalog::Catalog;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{self, Validate};
use std::collections::HashMap;
use std::time::Duration;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Where enrollment rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Sheet {
        read_url: String,
        append_url: Option<String>,
        credential: Option<String>,
    },
    CsvFile {
        path: String,
    },
}

impl Validate for StoreSettings {
    fn validate(&self) -> Result<()> {
        match self {
            StoreSettings::Sheet {
                read_url,
                append_url,
                credential,
            } => {
                validation::validate_url("store.read_url", read_url)?;
                if let Some(url) = append_url {
                    validation::validate_url("store.append_url", url)?;
                }
                if let Some(token) = credential {
                    validation::validate_non_empty_string("store.credential", token)?;
                    if token.contains("${") {
                        tracing::warn!("⚠️ store.credential still contains an unresolved ${{...}} placeholder");
                    }
                }
                Ok(())
            }
            StoreSettings::CsvFile { path } => validation::validate_path("store.path", path),
        }
    }
}

/// Plain ledger settings, used by the CLI and by tests.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub catalog: Catalog,
    pub request_timeout: Duration,
    pub serialize_writes: bool,
    pub read_only: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            serialize_writes: true,
            read_only: false,
        }
    }
}

impl ConfigProvider for LedgerConfig {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn serialize_writes(&self) -> bool {
        self.serialize_writes
    }

    fn read_only(&self) -> bool {
        self.read_only
    }
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            return Err(LedgerError::ConfigError {
                message: "the elective catalog is empty".to_string(),
            });
        }
        validation::validate_range(
            "request_timeout_seconds",
            self.request_timeout.as_secs(),
            1,
            MAX_TIMEOUT_SECONDS,
        )
    }
}

/// 解析 `--capacity "Financial Modeling=5"`
pub fn parse_capacity_override(value: &str) -> std::result::Result<(String, u32), String> {
    let (name, capacity) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=CAPACITY, got '{}'", value))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing elective name in '{}'", value));
    }
    let capacity = capacity
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid capacity in '{}': {}", value, e))?;
    Ok((name.to_string(), capacity))
}

/// Rejects overrides that name an elective the catalog does not offer.
pub fn check_overrides(catalog_names: &[String], overrides: &HashMap<String, u32>) -> Result<()> {
    for name in overrides.keys() {
        if !catalog_names.iter().any(|n| n == name) {
            return Err(LedgerError::InvalidConfigValueError {
                field: "capacity".to_string(),
                value: name.clone(),
                reason: "No such elective in the catalog".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "elective-ledger")]
#[command(about = "Elective seat registration against a shared enrollment sheet")]
pub struct CliConfig {
    /// Path to a TOML configuration file; replaces the store flags, other
    /// flags given alongside it override the file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Published CSV export of the enrollment sheet
    #[arg(long)]
    pub sheet_url: Option<String>,

    /// Endpoint accepting `{"values": [[...]]}` appends
    #[arg(long)]
    pub append_url: Option<String>,

    /// Bearer token of the shared service credential
    #[arg(long)]
    pub credential: Option<String>,

    /// Local CSV file used instead of a sheet
    #[arg(long)]
    pub csv_path: Option<String>,

    /// Store request timeout [default: 10]
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Seats per elective without an override [default: 60]
    #[arg(long)]
    pub default_capacity: Option<u32>,

    /// Per-elective capacity, e.g. --capacity "Financial Modeling=5"
    #[arg(long = "capacity", value_parser = parse_capacity_override)]
    pub capacities: Vec<(String, u32)>,

    /// Validate submissions without writing them
    #[arg(long)]
    pub read_only: bool,

    /// Do not serialize reload/validate/append across concurrent submissions
    #[arg(long)]
    pub no_serialize: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List electives that still have seats
    Seats {
        #[arg(long)]
        json: bool,
    },
    /// Submit an elective registration
    Submit {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        prn: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Elective id, name, or seat label; pass twice
        #[arg(long = "elective")]
        electives: Vec<String>,
    },
    /// Report electives whose enrollment exceeds capacity
    Audit,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let names: Vec<String> = crate::domain::catalog::DEFAULT_ELECTIVES
            .iter()
            .map(|n| n.to_string())
            .collect();
        let overrides: HashMap<String, u32> = self.capacities.iter().cloned().collect();
        check_overrides(&names, &overrides)?;

        let default_capacity = self
            .default_capacity
            .unwrap_or(crate::domain::catalog::DEFAULT_CAPACITY);
        let timeout_seconds = self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let config = LedgerConfig {
            catalog: Catalog::new(names, default_capacity, &overrides),
            request_timeout: Duration::from_secs(timeout_seconds),
            serialize_writes: !self.no_serialize,
            read_only: self.read_only,
        };
        config.validate()?;
        Ok(config)
    }

    /// 命令列參數覆蓋 TOML 檔案中的設定
    pub fn apply_to(&self, config: &mut TomlConfig) {
        if self.read_only {
            config.set_read_only(true);
        }
        if self.no_serialize {
            config.set_serialize_writes(false);
        }
        if let Some(seconds) = self.timeout_seconds {
            config.set_timeout_seconds(seconds);
        }
        if let Some(capacity) = self.default_capacity {
            config.set_default_capacity(capacity);
        }
        for (elective, capacity) in &self.capacities {
            config.set_capacity_override(elective.clone(), *capacity);
        }

        let ignored: Vec<&str> = [
            ("--sheet-url", self.sheet_url.is_some()),
            ("--append-url", self.append_url.is_some()),
            ("--credential", self.credential.is_some()),
            ("--csv-path", self.csv_path.is_some()),
        ]
        .into_iter()
        .filter_map(|(flag, set)| set.then_some(flag))
        .collect();
        if !ignored.is_empty() {
            tracing::warn!(
                "⚠️ Store flags {} are ignored when --config is given",
                ignored.join(", ")
            );
        }
    }

    pub fn store_settings(&self) -> Result<StoreSettings> {
        let settings = match (&self.sheet_url, &self.csv_path) {
            (Some(_), Some(_)) => {
                return Err(LedgerError::ConfigError {
                    message: "use either --sheet-url or --csv-path, not both".to_string(),
                })
            }
            (Some(url), None) => StoreSettings::Sheet {
                read_url: url.clone(),
                append_url: self.append_url.clone(),
                credential: self.credential.clone(),
            },
            (None, Some(path)) => StoreSettings::CsvFile { path: path.clone() },
            (None, None) => {
                return Err(LedgerError::MissingConfigError {
                    field: "--sheet-url or --csv-path".to_string(),
                })
            }
        };
        settings.validate()?;
        Ok(settings)
    }
}
