use threader::Config;

/// Names a TOML file to read settings from.
pub const CONFIG_FILE_VAR: &str = "THREADER_CONFIG_FILE";

/// Prefix of environment variables that override individual settings,
/// e.g. `THREADER_ALLOW_FORCED_TERMINATION=false`.
pub const ENV_PREFIX: &str = "THREADER";

#[derive(Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Install a `tracing` subscriber at this level; leave logging to the
    /// host when unset.
    pub log_level: Option<String>,
    pub allow_forced_termination: bool,
    pub exit_code: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: None,
            // Hosts calling killThread expect it to work on every platform
            allow_forced_termination: true,
            exit_code: Config::default().exit_code,
        }
    }
}

impl Settings {
    pub fn cancellation(&self) -> Config {
        Config {
            allow_forced_termination: self.allow_forced_termination,
            exit_code: self.exit_code,
        }
    }
}

pub fn load() -> Result<Settings, config::ConfigError> {
    let mut b = config::Config::builder();

    if let Ok(source) = std::env::var(CONFIG_FILE_VAR) {
        b = b.add_source(config::File::with_name(&source).format(config::FileFormat::Toml));
    }

    b = b.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .ignore_empty(true),
    );

    b.build()?.try_deserialize()
}

pub fn init_logger(settings: &Settings) -> Result<(), config::ConfigError> {
    let Some(log_level) = &settings.log_level else {
        return Ok(());
    };

    let log_level = log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|e| config::ConfigError::Message(format!("Invalid 'log_level' value: {e}")))?;

    // The host may already have installed its own subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(
            log_level > tracing_subscriber::filter::LevelFilter::from_level(tracing::Level::INFO),
        )
        .try_init();
    Ok(())
}
