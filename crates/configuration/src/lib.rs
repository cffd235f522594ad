use config::{Environment, File, FileFormat};
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod mail;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use mail::MailSettings;
pub use settings::{DeliverySettings, LoggingSettings, ProviderSettings, ReportSettings, Settings};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_MAIL_CONFIG_PATH: &str = "mailing_params.json";

/// Locations of the two configuration files.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigPaths {
    /// Report, provider, delivery and logging settings (TOML, optional).
    #[cfg_attr(feature = "clap", arg(long = "config", global = true, default_value = DEFAULT_CONFIG_PATH))]
    pub settings: PathBuf,

    /// SMTP parameters (JSON).
    #[cfg_attr(feature = "clap", arg(long = "mail-config", global = true, default_value = DEFAULT_MAIL_CONFIG_PATH))]
    pub mail: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            settings: PathBuf::from(DEFAULT_CONFIG_PATH),
            mail: PathBuf::from(DEFAULT_MAIL_CONFIG_PATH),
        }
    }
}

/// Loads the application settings.
///
/// The TOML file is optional; every key has a default. Environment variables
/// such as `REPORT__DELIVERY__ENABLED=false` override file values.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("REPORT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    tracing::debug!(path = %path.display(), currencies = ?settings.report.currencies, "Loaded settings.");

    Ok(settings)
}

/// Loads the SMTP parameters.
///
/// The JSON file is required. `MAILING__PASSWORD` (also read from `.env` by the
/// binary) overrides the stored password so it can be kept out of the file.
pub fn load_mail_settings(path: &Path) -> Result<MailSettings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Json).required(true))
        .add_source(
            Environment::with_prefix("MAILING")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mail = builder.try_deserialize::<MailSettings>()?;
    mail.validate()?;
    tracing::debug!(path = %path.display(), server = %mail.server, port = mail.port, "Loaded mailing parameters.");

    Ok(mail)
}
