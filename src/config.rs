// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use crate::domain::model::{PosSettings, UserRole};
use crate::domain::service::DEFAULT_SPLIT_TOLERANCE;
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;

/// Register process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Register configuration
    pub pos: PosConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Register configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosConfig {
    /// Currency used until settings say otherwise (e.g., "TZS", "KES")
    pub currency: String,

    /// Tax rate percentage
    pub tax_rate: Decimal,

    /// Apply tax at checkout
    pub enable_tax: bool,

    /// Allowed gap between split payment entries and the total
    pub split_tolerance: Decimal,

    /// Settings file; in-memory settings when absent
    pub settings_path: Option<String>,

    /// Role of the operator running the register
    pub cashier_role: UserRole,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

/// Decimal from an environment variable, `default` when unset
fn decimal_var(name: &str, raw: Option<String>, default: Decimal) -> AppResult<Decimal> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a decimal number, got {:?}", name, raw))),
        None => Ok(default),
    }
}

impl Config {
    /// Load from the JSON file named by `POS_CONFIG_PATH`, or from the
    /// environment when it is not set
    pub fn load() -> AppResult<Self> {
        dotenv().ok();

        match env::var("POS_CONFIG_PATH") {
            Ok(path) => {
                log::debug!("Loading configuration from {}", path);
                Self::from_file(path)
            }
            Err(_) => Self::from_env(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let split_tolerance = decimal_var(
            "POS_SPLIT_TOLERANCE",
            env::var("POS_SPLIT_TOLERANCE").ok(),
            DEFAULT_SPLIT_TOLERANCE,
        )?;
        let tax_rate = decimal_var("POS_TAX_RATE", env::var("POS_TAX_RATE").ok(), Decimal::new(18, 0))?;

        let cashier_role = match env::var("POS_CASHIER_ROLE") {
            Ok(raw) => raw
                .parse::<UserRole>()
                .map_err(|e| AppError::Config(format!("POS_CASHIER_ROLE: {}", e)))?,
            Err(_) => UserRole::Cashier,
        };

        // Create register config
        let pos_config = PosConfig {
            currency: env::var("POS_CURRENCY").unwrap_or_else(|_| "TZS".to_string()),
            tax_rate,
            // tax is only on when explicitly enabled
            enable_tax: env::var("POS_ENABLE_TAX")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            split_tolerance,
            settings_path: env::var("POS_SETTINGS_PATH").ok(),
            cashier_role,
        };

        // Create Logging config
        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            pos: pos_config,
            logging: logging_config,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a register configuration saved as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as JSON, creating missing directories
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values the register cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if self.pos.split_tolerance < Decimal::ZERO {
            return Err(AppError::Config("POS_SPLIT_TOLERANCE cannot be negative".to_string()));
        }
        if self.pos.tax_rate < Decimal::ZERO || self.pos.tax_rate > Decimal::ONE_HUNDRED {
            return Err(AppError::Config(format!(
                "POS_TAX_RATE must be between 0 and 100, got {}",
                self.pos.tax_rate
            )));
        }
        if self.pos.currency.trim().is_empty() {
            return Err(AppError::Config("POS_CURRENCY cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Settings to start from when no settings file exists yet
    pub fn initial_settings(&self) -> PosSettings {
        let mut settings = PosSettings::default();
        settings.general.currency = self.pos.currency.clone();
        settings.general.tax_rate = self.pos.tax_rate;
        settings.general.enable_tax = self.pos.enable_tax;
        settings.permissions.default_role = self.pos.cashier_role;
        settings
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.try_init().map_err(|e| {
            AppError::Config(format!("Failed to initialize logger: {}", e))
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pos: PosConfig {
                currency: "TZS".to_string(),
                tax_rate: Decimal::new(18, 0),
                enable_tax: false,
                split_tolerance: DEFAULT_SPLIT_TOLERANCE,
                settings_path: None,
                cashier_role: UserRole::Cashier,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("pos_core_config_{}.json", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.pos.currency = "KES".to_string();
        config.pos.split_tolerance = dec!(1);
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.pos.currency, "KES");
        assert_eq!(loaded.pos.split_tolerance, dec!(1));
        assert_eq!(loaded.pos.cashier_role, UserRole::Cashier);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/pos_core.json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_initial_settings_follow_config() {
        let mut config = Config::default();
        config.pos.enable_tax = true;
        config.pos.tax_rate = dec!(16);
        let settings = config.initial_settings();
        assert_eq!(settings.general.effective_tax_rate(), dec!(16));
        assert_eq!(settings.general.currency, "TZS");
    }

    #[test]
    fn test_invalid_decimal_vars_are_rejected() {
        assert_eq!(decimal_var("POS_TAX_RATE", None, dec!(18)).unwrap(), dec!(18));
        assert_eq!(decimal_var("POS_TAX_RATE", Some(" 16 ".to_string()), dec!(18)).unwrap(), dec!(16));

        let err = decimal_var("POS_TAX_RATE", Some("eighteen".to_string()), dec!(18)).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("POS_TAX_RATE")));
        assert!(decimal_var("POS_SPLIT_TOLERANCE", Some("".to_string()), dec!(0.01)).is_err());
    }

    #[test]
    fn test_out_of_range_values_fail_validation() {
        let mut config = Config::default();
        config.pos.tax_rate = dec!(120);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = Config::default();
        config.pos.split_tolerance = dec!(-0.5);
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("pos_core_config_{}.json", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.pos.tax_rate = dec!(-1);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert!(matches!(Config::from_file(&path), Err(AppError::Config(_))));
        let _ = std::fs::remove_file(path);
    }
}
