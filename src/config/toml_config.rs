use crate::config::{check_overrides, StoreSettings, DEFAULT_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS};
use crate::domain::catalog::{Catalog, DEFAULT_CAPACITY, DEFAULT_ELECTIVES};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env placeholder pattern compiles"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub form: Option<FormConfig>,
    pub store: StoreConfig,
    pub catalog: Option<CatalogConfig>,
    pub ledger: Option<LedgerSection>,

    #[serde(skip)]
    resolved_catalog: Catalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    pub title: Option<String>,
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub r#type: String,
    pub read_url: Option<String>,
    pub append_url: Option<String>,
    pub credential: Option<String>,
    pub path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub default_capacity: Option<u32>,
    pub electives: Option<Vec<String>>,
    pub capacity_overrides: Option<HashMap<String, u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    pub serialize_writes: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LedgerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，並建立選課目錄
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.resolved_catalog = config.build_catalog();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${SHEET_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn elective_names(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .and_then(|c| c.electives.clone())
            .unwrap_or_else(|| DEFAULT_ELECTIVES.iter().map(|n| n.to_string()).collect())
    }

    fn overrides(&self) -> HashMap<String, u32> {
        self.catalog
            .as_ref()
            .and_then(|c| c.capacity_overrides.clone())
            .unwrap_or_default()
    }

    fn build_catalog(&self) -> Catalog {
        let default_capacity = self
            .catalog
            .as_ref()
            .and_then(|c| c.default_capacity)
            .unwrap_or(DEFAULT_CAPACITY);
        Catalog::new(self.elective_names(), default_capacity, &self.overrides())
    }

    pub fn title(&self) -> &str {
        self.form
            .as_ref()
            .and_then(|f| f.title.as_deref())
            .unwrap_or("Elective Selection Form")
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.form
            .get_or_insert(FormConfig {
                title: None,
                read_only: None,
            })
            .read_only = Some(read_only);
    }

    pub fn set_serialize_writes(&mut self, serialize: bool) {
        self.ledger
            .get_or_insert(LedgerSection {
                serialize_writes: None,
            })
            .serialize_writes = Some(serialize);
    }

    pub fn set_timeout_seconds(&mut self, seconds: u64) {
        self.store.timeout_seconds = Some(seconds);
    }

    pub fn set_default_capacity(&mut self, capacity: u32) {
        self.catalog_section().default_capacity = Some(capacity);
        self.resolved_catalog = self.build_catalog();
    }

    pub fn set_capacity_override(&mut self, elective: impl Into<String>, capacity: u32) {
        self.catalog_section()
            .capacity_overrides
            .get_or_insert_with(HashMap::new)
            .insert(elective.into(), capacity);
        self.resolved_catalog = self.build_catalog();
    }

    fn catalog_section(&mut self) -> &mut CatalogConfig {
        self.catalog.get_or_insert(CatalogConfig {
            default_capacity: None,
            electives: None,
            capacity_overrides: None,
        })
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.store.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn store_settings(&self) -> Result<StoreSettings> {
        match self.store.r#type.as_str() {
            "sheet" => Ok(StoreSettings::Sheet {
                read_url: self.store.read_url.clone().ok_or_else(|| {
                    LedgerError::MissingConfigError {
                        field: "store.read_url".to_string(),
                    }
                })?,
                append_url: self.store.append_url.clone(),
                credential: self.store.credential.clone(),
            }),
            "csv" => Ok(StoreSettings::CsvFile {
                path: self.store.path.clone().ok_or_else(|| LedgerError::MissingConfigError {
                    field: "store.path".to_string(),
                })?,
            }),
            other => Err(LedgerError::InvalidConfigValueError {
                field: "store.type".to_string(),
                value: other.to_string(),
                reason: "Unsupported store type. Valid types: sheet, csv".to_string(),
            }),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.store_settings()?.validate()?;

        validation::validate_range(
            "store.timeout_seconds",
            self.timeout_seconds(),
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        let names = self.elective_names();
        if names.is_empty() {
            return Err(LedgerError::ConfigError {
                message: "catalog.electives is empty".to_string(),
            });
        }
        validation::validate_unique_names("catalog.electives", &names)?;
        check_overrides(&names, &self.overrides())?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog(&self) -> &Catalog {
        &self.resolved_catalog
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn serialize_writes(&self) -> bool {
        self.ledger
            .as_ref()
            .and_then(|l| l.serialize_writes)
            .unwrap_or(true)
    }

    fn read_only(&self) -> bool {
        self.form.as_ref().and_then(|f| f.read_only).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
